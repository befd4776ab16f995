//! Field record and the fill-if-empty merge.
//!
//! A [`FieldRecord`] accumulates values over a whole conversation. Extractors
//! never write to it directly; they produce a [`FieldDelta`] and the record
//! folds it in with [`FieldRecord::merge`], which only ever fills gaps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::FieldName;

/// Field values found in a single message.
///
/// An absent key means "no evidence", never "empty". Blank values are
/// rejected on insert, so every value in a delta is non-empty and trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldDelta(BTreeMap<FieldName, String>);

impl FieldDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value for `field` unless one was already found.
    ///
    /// Returns `false` when the value is blank or the field is taken; the
    /// first accepted value wins so matcher priority is preserved.
    pub fn insert(&mut self, field: FieldName, value: impl AsRef<str>) -> bool {
        let value = value.as_ref().trim();
        if value.is_empty() || self.0.contains_key(&field) {
            return false;
        }
        self.0.insert(field, value.to_string());
        true
    }

    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates in canonical field order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> {
        self.0.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// Builds a delta from pairs, silently dropping blank values.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (FieldName, S)>,
        S: AsRef<str>,
    {
        let mut delta = Self::new();
        for (field, value) in pairs {
            delta.insert(field, value);
        }
        delta
    }
}

/// The partial or complete set of values collected in a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    values: BTreeMap<FieldName, String>,
}

impl FieldRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// True when `field` holds a non-blank value.
    pub fn is_filled(&self, field: FieldName) -> bool {
        self.get(field).is_some_and(|v| !v.trim().is_empty())
    }

    /// Merges a delta with fill-if-empty semantics.
    ///
    /// Returns the fields that were newly filled, in canonical order. Fields
    /// already holding a value are left untouched no matter what the delta
    /// says.
    pub fn merge(&mut self, delta: &FieldDelta) -> Vec<FieldName> {
        let mut filled = Vec::new();
        for (field, value) in delta.iter() {
            if self.is_filled(field) {
                continue;
            }
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            self.values.insert(field, value.to_string());
            filled.push(field);
        }
        filled
    }

    /// Required fields without a value, in canonical order.
    pub fn missing(&self) -> Vec<FieldName> {
        FieldName::ALL
            .into_iter()
            .filter(|field| !self.is_filled(*field))
            .collect()
    }

    /// Required fields with a value, in canonical order.
    pub fn present(&self) -> Vec<FieldName> {
        FieldName::ALL
            .into_iter()
            .filter(|field| self.is_filled(*field))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Freezes the record once every field is filled.
    pub fn to_completed(&self) -> Option<CompletedRecord> {
        let value = |field: FieldName| self.get(field).map(str::to_string);
        Some(CompletedRecord {
            name: value(FieldName::Name)?,
            phone: value(FieldName::Phone)?,
            date_of_issue: value(FieldName::DateOfIssue)?,
            reference_id: value(FieldName::ReferenceId)?,
            issue_description: value(FieldName::IssueDescription)?,
        })
    }
}

/// A fully collected intake, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedRecord {
    pub name: String,
    pub phone: String,
    pub date_of_issue: String,
    pub reference_id: String,
    pub issue_description: String,
}

impl CompletedRecord {
    pub fn value(&self, field: FieldName) -> &str {
        match field {
            FieldName::Name => &self.name,
            FieldName::Phone => &self.phone,
            FieldName::DateOfIssue => &self.date_of_issue,
            FieldName::ReferenceId => &self.reference_id,
            FieldName::IssueDescription => &self.issue_description,
        }
    }

    /// One storage row, columns in canonical field order.
    pub fn to_row(&self) -> Vec<String> {
        FieldName::ALL
            .iter()
            .map(|field| self.value(*field).to_string())
            .collect()
    }
}
