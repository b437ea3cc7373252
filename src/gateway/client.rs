use std::borrow::Cow;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::{
    config::Config,
    error::{Result, ReviewError},
    gateway::{wire, VerificationGateway},
    review::{
        aggregate::BatchStats,
        models::{DocumentDetail, DocumentSummary},
    },
};

/// HTTP/JSON client for the verification backend.
#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.gateway.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a path and return the body, mapping transport and status failures.
    async fn fetch(&self, what: &str, path: &str) -> Result<String> {
        let url = self.url(path);
        debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ReviewError::Gateway(format!("{}: {}", what, e)))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ReviewError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ReviewError::Gateway(format!(
                "{}: HTTP {}: {}",
                what, status, body
            )));
        }

        resp.text()
            .await
            .map_err(|e| ReviewError::Gateway(format!("{}: reading body: {}", what, e)))
    }
}

/// Percent-encode an id as a single path segment. Empty and dot-segment ids
/// resolve to a different route and are rejected.
fn segment<'a>(what: &str, id: &'a str) -> Result<Cow<'a, str>> {
    if matches!(id, "" | "." | "..") {
        return Err(ReviewError::NotFound(format!("{} {:?}", what, id)));
    }
    Ok(urlencoding::encode(id))
}

fn submissions_path(batch_id: &str) -> Result<String> {
    Ok(format!("/api/documents/{}/submissions", segment("batch", batch_id)?))
}

fn detail_path(document_id: &str) -> Result<String> {
    Ok(format!("/api/documents/detail/{}", segment("document", document_id)?))
}

fn stats_path(batch_id: &str) -> Result<String> {
    Ok(format!("/api/documents/{}/stats", segment("batch", batch_id)?))
}

#[async_trait]
impl VerificationGateway for HttpGateway {
    async fn get_batch_documents(&self, batch_id: &str) -> Result<Vec<DocumentSummary>> {
        let path = submissions_path(batch_id)?;
        let body = self.fetch(&format!("batch {}", batch_id), &path).await?;
        let documents = wire::parse_document_list(&body)?;
        debug!("Batch {} returned {} documents", batch_id, documents.len());
        Ok(documents)
    }

    async fn get_document_detail(&self, document_id: &str) -> Result<DocumentDetail> {
        let path = detail_path(document_id)?;
        let body = self.fetch(&format!("document {}", document_id), &path).await?;
        wire::parse_document_detail(&body)
    }

    async fn get_batch_stats(&self, batch_id: &str) -> Result<BatchStats> {
        let path = stats_path(batch_id)?;
        let body = self.fetch(&format!("stats for batch {}", batch_id), &path).await?;
        wire::parse_batch_stats(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> Config {
        toml::from_str(&format!("[gateway]\nbase_url = \"{}\"\n", base_url)).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let gateway = HttpGateway::new(&config("http://localhost:5000/")).unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:5000");
        assert_eq!(
            gateway.url("/api/documents/u1/stats"),
            "http://localhost:5000/api/documents/u1/stats"
        );
    }

    #[test]
    fn test_ids_stay_inside_their_path_segment() {
        let gateway = HttpGateway::new(&config("http://localhost:5000")).unwrap();

        let url = gateway.url(&detail_path("../u1/stats?x=1#y").unwrap());
        let parsed = reqwest::Url::parse(&url).unwrap();
        assert_eq!(parsed.path(), "/api/documents/detail/..%2Fu1%2Fstats%3Fx%3D1%23y");
        assert_eq!(parsed.query(), None);
        assert_eq!(parsed.fragment(), None);

        let url = gateway.url(&stats_path("u1/../../admin").unwrap());
        let parsed = reqwest::Url::parse(&url).unwrap();
        assert!(parsed.path().starts_with("/api/documents/"));
        assert!(parsed.path().ends_with("/stats"));
        assert_eq!(parsed.path_segments().unwrap().count(), 4);

        assert_eq!(submissions_path("u1").unwrap(), "/api/documents/u1/submissions");
    }

    #[test]
    fn test_dot_and_empty_ids_are_rejected() {
        for id in ["", ".", ".."] {
            assert!(matches!(detail_path(id), Err(ReviewError::NotFound(_))));
            assert!(matches!(stats_path(id), Err(ReviewError::NotFound(_))));
        }
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_recoverable() {
        // Port 9 (discard) on localhost is not serving HTTP.
        let gateway = HttpGateway::new(&config("http://127.0.0.1:9")).unwrap();
        let err = gateway.get_batch_documents("u1").await.unwrap_err();
        assert!(matches!(err, ReviewError::Gateway(_)));
        assert!(err.is_recoverable());
    }
}
