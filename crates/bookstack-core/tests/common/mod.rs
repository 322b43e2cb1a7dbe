//! Shared helpers for live-sync integration tests

use std::time::Duration;

use tokio::sync::watch;

/// Wait until the watched value satisfies the predicate, or panic after 5s.
pub async fn wait_for<T, F>(rx: &mut watch::Receiver<T>, mut pred: F) -> T
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let current = rx.borrow();
                if pred(&current) {
                    return current.clone();
                }
            }
            rx.changed().await.expect("watch channel closed");
        }
    })
    .await
    .expect("condition not reached within 5s")
}
