//! Identity collaborator
//!
//! Supplies the current user id or none; transitions of this value reset all
//! per-user state in the session layer.

use bookstack_domain::UserId;
use tokio::sync::watch;

/// Handle through which the authentication layer publishes sign-in state.
pub struct Identity {
    tx: watch::Sender<Option<UserId>>,
}

impl Identity {
    pub fn new(initial: Option<UserId>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn signed_out() -> Self {
        Self::new(None)
    }

    pub fn sign_in(&self, user: UserId) {
        tracing::info!(user = %user, "Signed in");
        self.tx.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        tracing::info!("Signed out");
        self.tx.send_replace(None);
    }

    pub fn current(&self) -> Option<UserId> {
        self.tx.borrow().clone()
    }

    /// Watch sign-in transitions. The receiver always holds the latest value.
    pub fn watch(&self) -> watch::Receiver<Option<UserId>> {
        self.tx.subscribe()
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::signed_out()
    }
}
