//! Validation for canonical records

use crate::book::CanonicalBook;
use serde::{Deserialize, Serialize};

/// Severity of a validation issue
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ValidationSeverity {
    Error,
    Warning,
}

/// A validation error or warning
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    pub severity: ValidationSeverity,
}

/// Validate a canonical record before it is written to the catalog
pub fn validate_canonical(book: &CanonicalBook) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if book.item_id.as_str().is_empty() {
        issues.push(ValidationIssue {
            field: "item_id".to_string(),
            message: "Item id is required".to_string(),
            severity: ValidationSeverity::Error,
        });
    }

    if book.title.is_empty() {
        issues.push(ValidationIssue {
            field: "title".to_string(),
            message: "Title is required".to_string(),
            severity: ValidationSeverity::Error,
        });
    }

    if book.authors.is_empty() {
        issues.push(ValidationIssue {
            field: "authors".to_string(),
            message: "Authors are recommended".to_string(),
            severity: ValidationSeverity::Warning,
        });
    }

    if book.authors.iter().any(|a| a.trim().is_empty()) {
        issues.push(ValidationIssue {
            field: "authors".to_string(),
            message: "Author names must not be blank".to_string(),
            severity: ValidationSeverity::Error,
        });
    }

    issues
}

/// True when no issue has `Error` severity
pub fn is_storable(issues: &[ValidationIssue]) -> bool {
    !issues
        .iter()
        .any(|i| i.severity == ValidationSeverity::Error)
}
