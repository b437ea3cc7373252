use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

use crate::{
    error::{Result, ReviewError},
    review::{
        aggregate::BatchStats,
        consistency::ConsistencyResult,
        models::{normalize_text, DocumentDetail, DocumentSummary, FileKind, Indicator},
        risk::Tier,
    },
};

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Document record as the service sends it. Extracted fields stay as raw JSON
/// so a wrong type degrades to "absent" instead of failing the whole payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDocument {
    pub id: String,
    #[serde(default)]
    pub score: Value,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub address: Value,
    #[serde(default)]
    pub address_complete: Value,
    #[serde(default)]
    pub country_name: Value,
    #[serde(default)]
    pub document_type: Value,
    #[serde(default)]
    pub summary: Value,
    #[serde(default)]
    pub indicators: Option<Vec<WireIndicator>>,
}

#[derive(Debug, Deserialize)]
pub struct WireIndicator {
    #[serde(default)]
    pub indicator_id: Value,
    #[serde(default)]
    pub category: Value,
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub description: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStats {
    pub stats: WireCounts,
    #[serde(default)]
    pub overall_status: Option<String>,
    #[serde(default)]
    pub is_consistent: Option<WireConsistency>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCounts {
    #[serde(default)]
    pub high_risk: usize,
    #[serde(default)]
    pub warning: usize,
    #[serde(default)]
    pub normal: usize,
    #[serde(default)]
    pub trusted: usize,
    #[serde(default)]
    pub total_documents: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireConsistency {
    #[serde(default)]
    pub name_consistent: Value,
    #[serde(default)]
    pub address_consistent: Value,
}

fn text_field(document_id: &str, field: &str, value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => normalize_text(Some(s)).map(str::to_string),
        other => {
            warn!(
                "Document {}: field {} has unexpected type ({}), treating as absent",
                document_id, field, other
            );
            None
        }
    }
}

fn bool_field(document_id: &str, field: &str, value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Null => None,
        Value::String(s) if normalize_text(Some(s)).is_none() => None,
        other => {
            warn!(
                "Document {}: field {} is not a boolean ({}), treating as absent",
                document_id, field, other
            );
            None
        }
    }
}

/// Raw score tag, trimmed. Anything but a string reads as an empty (unclassified) score.
fn score_field(document_id: &str, value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => {
            warn!(
                "Document {}: score has unexpected type ({}), treating as unclassified",
                document_id, other
            );
            String::new()
        }
    }
}

fn parse_timestamp(document_id: &str, raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = normalize_text(raw)?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            warn!("Document {}: unparseable createdAt {:?}: {}", document_id, raw, e);
            None
        }
    }
}

impl WireDocument {
    pub fn into_summary(self) -> DocumentSummary {
        let created_at = parse_timestamp(&self.id, self.created_at.as_deref());
        DocumentSummary {
            score: score_field(&self.id, &self.score),
            file_kind: FileKind::from_wire(self.file_type.as_deref()),
            created_at,
            file_url: normalize_text(self.file_url.as_deref()).map(str::to_string),
            status: normalize_text(self.status.as_deref()).map(str::to_string),
            id: self.id,
        }
    }

    pub fn into_detail(mut self) -> DocumentDetail {
        let id = self.id.clone();
        let name = text_field(&id, "name", &self.name);
        let address = text_field(&id, "address", &self.address);
        let address_complete = bool_field(&id, "addressComplete", &self.address_complete);
        let country_name = text_field(&id, "countryName", &self.country_name);
        let document_type = text_field(&id, "documentType", &self.document_type);
        let summary_text = text_field(&id, "summary", &self.summary);
        let indicators = self
            .indicators
            .take()
            .unwrap_or_default()
            .into_iter()
            .map(|i| i.into_indicator(&id))
            .collect();

        DocumentDetail {
            summary: self.into_summary(),
            name,
            address,
            address_complete,
            country_name,
            document_type,
            summary_text,
            indicators,
        }
    }
}

impl WireIndicator {
    fn into_indicator(self, document_id: &str) -> Indicator {
        let text = |field: &str, value: &Value| {
            text_field(document_id, field, value).unwrap_or_default()
        };
        Indicator {
            indicator_id: text("indicator_id", &self.indicator_id),
            category: text("category", &self.category),
            title: text("title", &self.title),
            description: text("description", &self.description),
        }
    }
}

impl WireStats {
    pub fn into_stats(self) -> BatchStats {
        let counts = self.stats;
        let bucketed = counts
            .high_risk
            .saturating_add(counts.warning)
            .saturating_add(counts.normal)
            .saturating_add(counts.trusted);
        // The service may report documents outside the four buckets.
        let total = counts.total_documents.max(bucketed);

        BatchStats {
            high_risk: counts.high_risk,
            warning: counts.warning,
            normal: counts.normal,
            trusted: counts.trusted,
            unclassified: total.saturating_sub(bucketed),
            total_documents: total,
            overall_status: Tier::from_score(
                self.overall_status.as_deref().map(str::trim).unwrap_or_default(),
            ),
            // Only a literal JSON `true` counts as consistent.
            is_consistent: self.is_consistent.map(|c| ConsistencyResult {
                name_consistent: c.name_consistent == Value::Bool(true),
                address_consistent: c.address_consistent == Value::Bool(true),
            }),
            skipped_details: 0,
        }
    }
}

/// Drops repeated ids after their first occurrence, keeping server order.
pub fn dedupe_documents(documents: Vec<DocumentSummary>) -> Vec<DocumentSummary> {
    let mut seen = HashSet::new();
    documents
        .into_iter()
        .filter(|d| {
            let fresh = seen.insert(d.id.clone());
            if !fresh {
                warn!("Duplicate document id {} in batch list, dropping repeat", d.id);
            }
            fresh
        })
        .collect()
}

/// `{"data": null}` is an empty batch; a body without a `data` key is malformed.
pub fn parse_document_list(body: &str) -> Result<Vec<DocumentSummary>> {
    let malformed = |reason: String| ReviewError::MalformedData(format!("document list: {}", reason));

    let mut body: Value = serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;
    let data = body
        .get_mut("data")
        .map(Value::take)
        .ok_or_else(|| malformed("missing data field".to_string()))?;
    let records: Option<Vec<WireDocument>> =
        serde_json::from_value(data).map_err(|e| malformed(e.to_string()))?;

    let documents = records
        .unwrap_or_default()
        .into_iter()
        .map(WireDocument::into_summary)
        .collect();
    Ok(dedupe_documents(documents))
}

pub fn parse_document_detail(body: &str) -> Result<DocumentDetail> {
    let envelope: Envelope<WireDocument> = serde_json::from_str(body)
        .map_err(|e| ReviewError::MalformedData(format!("document detail: {}", e)))?;
    Ok(envelope.data.into_detail())
}

pub fn parse_batch_stats(body: &str) -> Result<BatchStats> {
    let stats: WireStats = serde_json::from_str(body)
        .map_err(|e| ReviewError::MalformedData(format!("batch stats: {}", e)))?;
    Ok(stats.into_stats())
}
