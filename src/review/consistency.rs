use serde::{Deserialize, Serialize};

use crate::review::models::{normalize_text, DocumentDetail};

/// Extracted field compared across a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Field {
    Name,
    Address,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Address => "Address",
        }
    }

    fn value<'a>(&self, document: &'a DocumentDetail) -> Option<&'a str> {
        let raw = match self {
            Field::Name => document.name.as_deref(),
            Field::Address => document.address.as_deref(),
        };
        normalize_text(raw)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyResult {
    pub name_consistent: bool,
    pub address_consistent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Match,
    Mismatch,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentCheck {
    pub document_id: String,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldConsistency {
    pub field: Field,
    pub consistent: bool,
    /// First present value in list order; the value every document is checked against.
    pub reference: Option<String>,
    pub checks: Vec<DocumentCheck>,
}

impl FieldConsistency {
    pub fn mismatches(&self) -> impl Iterator<Item = &DocumentCheck> {
        self.checks.iter().filter(|c| c.verdict == Verdict::Mismatch)
    }

    /// Sentence shown under the batch summary.
    pub fn describe(&self) -> String {
        if self.consistent {
            format!("{} field is same in all documents", self.field.label())
        } else {
            format!("{} field is not same in all documents", self.field.label())
        }
    }
}

/// A field is consistent when every present value is identical after
/// normalization. A batch with no present values is consistent.
pub fn evaluate(documents: &[DocumentDetail], field: Field) -> FieldConsistency {
    let reference = documents.iter().find_map(|d| field.value(d));

    let checks: Vec<DocumentCheck> = documents
        .iter()
        .map(|d| {
            let verdict = match (field.value(d), reference) {
                (None, _) => Verdict::Absent,
                (Some(v), Some(r)) if v == r => Verdict::Match,
                (Some(_), _) => Verdict::Mismatch,
            };
            DocumentCheck {
                document_id: d.id().to_string(),
                verdict,
            }
        })
        .collect();

    FieldConsistency {
        field,
        consistent: checks.iter().all(|c| c.verdict != Verdict::Mismatch),
        reference: reference.map(str::to_string),
        checks,
    }
}

pub fn evaluate_batch(documents: &[DocumentDetail]) -> ConsistencyResult {
    ConsistencyResult {
        name_consistent: evaluate(documents, Field::Name).consistent,
        address_consistent: evaluate(documents, Field::Address).consistent,
    }
}
