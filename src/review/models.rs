use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rendered in place of any extracted field the service did not provide.
pub const NOT_FOUND: &str = "Not Found";

/// Preview strategy for a document; the core only carries it through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Document,
}

impl FileKind {
    /// Anything that is not explicitly an image is previewed as a document file.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "image" => FileKind::Image,
            _ => FileKind::Document,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Image => "IMAGE",
            FileKind::Document => "PDF",
        }
    }
}

/// One entry in a batch's document list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    pub score: String,
    pub file_kind: FileKind,
    pub created_at: Option<DateTime<Utc>>,
    pub file_url: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub indicator_id: String,
    pub category: String,
    pub title: String,
    pub description: String,
}

/// Full verification result for a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub summary: DocumentSummary,
    pub name: Option<String>,
    pub address: Option<String>,
    pub address_complete: Option<bool>,
    pub country_name: Option<String>,
    pub document_type: Option<String>,
    pub summary_text: Option<String>,
    #[serde(default)]
    pub indicators: Vec<Indicator>,
}

impl DocumentDetail {
    pub fn new(summary: DocumentSummary) -> Self {
        Self {
            summary,
            name: None,
            address: None,
            address_complete: None,
            country_name: None,
            document_type: None,
            summary_text: None,
            indicators: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.summary.id
    }

    pub fn score(&self) -> &str {
        &self.summary.score
    }

    pub fn display_name(&self) -> &str {
        display_text(self.name.as_deref())
    }

    pub fn display_address(&self) -> &str {
        display_text(self.address.as_deref())
    }

    pub fn display_country(&self) -> &str {
        display_text(self.country_name.as_deref())
    }

    pub fn display_document_type(&self) -> &str {
        display_text(self.document_type.as_deref())
    }

    pub fn display_summary(&self) -> &str {
        display_text(self.summary_text.as_deref())
    }

    pub fn display_address_complete(&self) -> &str {
        match self.address_complete {
            Some(true) => "Yes",
            Some(false) => "No",
            None => NOT_FOUND,
        }
    }
}

/// True for the null-like values the service emits for missing fields.
pub fn is_null_like(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == "null" || trimmed == "NULL"
}

/// Trims a field value and folds every null-like form into `None`.
pub fn normalize_text(value: Option<&str>) -> Option<&str> {
    match value {
        Some(v) if !is_null_like(v) => Some(v.trim()),
        _ => None,
    }
}

pub fn display_text(value: Option<&str>) -> &str {
    normalize_text(value).unwrap_or(NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_like_values_are_absent() {
        assert_eq!(normalize_text(None), None);
        assert_eq!(normalize_text(Some("null")), None);
        assert_eq!(normalize_text(Some("NULL")), None);
        assert_eq!(normalize_text(Some("   ")), None);
        assert_eq!(normalize_text(Some("  Jane Doe ")), Some("Jane Doe"));
        // Only the two exact spellings are sentinels.
        assert_eq!(normalize_text(Some("Null")), Some("Null"));
    }

    #[test]
    fn test_detail_renders_not_found() {
        let mut detail = DocumentDetail::new(DocumentSummary {
            id: "doc-1".to_string(),
            score: "NORMAL".to_string(),
            file_kind: FileKind::Image,
            created_at: None,
            file_url: None,
            status: None,
        });
        detail.address = Some("NULL".to_string());

        assert_eq!(detail.display_name(), NOT_FOUND);
        assert_eq!(detail.display_address(), NOT_FOUND);
        assert_eq!(detail.display_address_complete(), NOT_FOUND);

        detail.address_complete = Some(false);
        assert_eq!(detail.display_address_complete(), "No");
    }

    #[test]
    fn test_file_kind_from_wire() {
        assert_eq!(FileKind::from_wire(Some("image")), FileKind::Image);
        assert_eq!(FileKind::from_wire(Some("pdf")), FileKind::Document);
        assert_eq!(FileKind::from_wire(None), FileKind::Document);
    }
}
