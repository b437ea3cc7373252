use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reviewer verdict on a single document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Declined,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Approved => write!(f, "Approved"),
            Decision::Declined => write!(f, "Declined"),
        }
    }
}

impl std::str::FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Approved" => Ok(Decision::Approved),
            "Declined" => Ok(Decision::Declined),
            other => Err(format!("unknown decision {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewDecision {
    pub id: i64,
    pub document_id: String,
    pub batch_id: String,
    pub decision: Decision,
    /// Raw score the reviewer saw when deciding.
    pub score: String,
    pub note: Option<String>,
    pub decided_at: DateTime<Utc>,
}

impl ReviewDecision {
    pub fn new(document_id: &str, batch_id: &str, decision: Decision, score: &str) -> Self {
        Self {
            id: 0,
            document_id: document_id.to_string(),
            batch_id: batch_id.to_string(),
            decision,
            score: score.to_string(),
            note: None,
            decided_at: Utc::now(),
        }
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note.filter(|n| !n.trim().is_empty());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DecisionStats {
    pub total: usize,
    pub approved: usize,
    pub declined: usize,
    pub documents: usize,
}
