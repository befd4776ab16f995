//! The fixed, ordered set of fields an intake collects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// A required intake field.
///
/// Declaration order is the canonical order: prompts, summaries and the
/// persisted row all list fields in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Name,
    Phone,
    DateOfIssue,
    ReferenceId,
    IssueDescription,
}

impl FieldName {
    /// All required fields in canonical order.
    pub const ALL: [FieldName; 5] = [
        FieldName::Name,
        FieldName::Phone,
        FieldName::DateOfIssue,
        FieldName::ReferenceId,
        FieldName::IssueDescription,
    ];

    /// Machine key used in payloads and classifier output.
    pub fn key(&self) -> &'static str {
        match self {
            FieldName::Name => "name",
            FieldName::Phone => "phone",
            FieldName::DateOfIssue => "date_of_issue",
            FieldName::ReferenceId => "reference_id",
            FieldName::IssueDescription => "issue_description",
        }
    }

    /// Label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            FieldName::Name => "Name",
            FieldName::Phone => "Phone Number",
            FieldName::DateOfIssue => "Date of Issue",
            FieldName::ReferenceId => "Reference ID",
            FieldName::IssueDescription => "Issue",
        }
    }

    /// Optional formatting hint appended to the label in prompts.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            FieldName::DateOfIssue => Some("dd-mm-yyyy"),
            FieldName::Phone => Some("10-15 digits"),
            _ => None,
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FieldName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| ValidationError::invalid_format("field", format!("unknown field '{}'", s)))
    }
}
