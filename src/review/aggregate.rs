use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::Result,
    gateway::VerificationGateway,
    review::{
        consistency::{evaluate_batch, ConsistencyResult},
        models::{DocumentDetail, DocumentSummary},
        risk::Tier,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub high_risk: usize,
    pub warning: usize,
    pub normal: usize,
    pub trusted: usize,
    /// Documents whose score matched no known tier.
    pub unclassified: usize,
    pub total_documents: usize,
    pub overall_status: Tier,
    /// `None` when only list entries were aggregated, or when some details
    /// could not be loaded.
    pub is_consistent: Option<ConsistencyResult>,
    /// Documents whose detail failed to load during a local computation.
    #[serde(default)]
    pub skipped_details: usize,
}

/// Where batch statistics come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StatsSource {
    /// Pre-aggregated statistics from the service.
    Remote,
    /// Computed here from the list and every document's detail.
    Local,
    /// Remote, falling back to local when the service fails.
    Auto,
}

impl BatchStats {
    /// Tier buckets in display order, paired with their labels.
    pub fn buckets(&self) -> [(&'static str, usize); 4] {
        [
            ("High Risk", self.high_risk),
            ("Warning", self.warning),
            ("Normal", self.normal),
            ("Trusted", self.trusted),
        ]
    }

    pub fn percent_of_total(&self, count: usize) -> f64 {
        if self.total_documents == 0 {
            0.0
        } else {
            (count as f64 / self.total_documents as f64) * 100.0
        }
    }
}

/// Worst tier wins: HIGH_RISK, then WARNING (unclassified counts as
/// warning-like), then TRUSTED only if every document is trusted, else NORMAL.
pub fn overall_status<I>(tiers: I) -> Tier
where
    I: IntoIterator<Item = Tier>,
{
    let mut any = false;
    let mut any_warning = false;
    let mut all_trusted = true;

    for tier in tiers {
        any = true;
        match tier {
            Tier::HighRisk => return Tier::HighRisk,
            Tier::Warning | Tier::Unclassified => any_warning = true,
            _ => {}
        }
        all_trusted &= tier.is_trusted();
    }

    if any_warning {
        Tier::Warning
    } else if any && all_trusted {
        Tier::Trusted
    } else {
        Tier::Normal
    }
}

/// Tier counts and overall status for a batch list.
pub fn aggregate(documents: &[DocumentSummary]) -> BatchStats {
    let mut stats = BatchStats {
        high_risk: 0,
        warning: 0,
        normal: 0,
        trusted: 0,
        unclassified: 0,
        total_documents: documents.len(),
        overall_status: Tier::Normal,
        is_consistent: None,
        skipped_details: 0,
    };

    let tiers: Vec<Tier> = documents.iter().map(|d| Tier::from_score(&d.score)).collect();
    for tier in &tiers {
        match tier {
            Tier::HighRisk => stats.high_risk += 1,
            Tier::Warning => stats.warning += 1,
            Tier::Normal => stats.normal += 1,
            Tier::Trusted | Tier::LowRisk => stats.trusted += 1,
            Tier::Unclassified => stats.unclassified += 1,
        }
    }
    stats.overall_status = overall_status(tiers);

    stats
}

/// Counts plus name/address consistency over fully loaded documents.
pub fn aggregate_details(details: &[DocumentDetail]) -> BatchStats {
    let summaries: Vec<DocumentSummary> = details.iter().map(|d| d.summary.clone()).collect();
    let mut stats = aggregate(&summaries);
    stats.is_consistent = Some(evaluate_batch(details));
    stats
}

/// Load statistics for a batch from the chosen source.
pub async fn collect_stats<G>(gateway: &G, batch_id: &str, source: StatsSource) -> Result<BatchStats>
where
    G: VerificationGateway + ?Sized,
{
    match source {
        StatsSource::Remote => gateway.get_batch_stats(batch_id).await,
        StatsSource::Local => collect_local(gateway, batch_id).await,
        StatsSource::Auto => match gateway.get_batch_stats(batch_id).await {
            Ok(stats) => Ok(stats),
            Err(e) => {
                warn!(
                    "Remote stats for batch {} unavailable ({}), computing locally",
                    batch_id, e
                );
                collect_local(gateway, batch_id).await
            }
        },
    }
}

/// Fetch a batch list and every document's detail concurrently. Details that
/// fail to load are skipped with a warning.
pub async fn load_details<G>(
    gateway: &G,
    batch_id: &str,
) -> Result<(Vec<DocumentSummary>, Vec<DocumentDetail>)>
where
    G: VerificationGateway + ?Sized,
{
    let summaries = gateway.get_batch_documents(batch_id).await?;

    let results = join_all(
        summaries
            .iter()
            .map(|s| gateway.get_document_detail(&s.id)),
    )
    .await;

    let mut details = Vec::with_capacity(summaries.len());
    for (summary, result) in summaries.iter().zip(results) {
        match result {
            Ok(detail) => details.push(detail),
            Err(e) => warn!("Skipping document {} in consistency check: {}", summary.id, e),
        }
    }

    Ok((summaries, details))
}

async fn collect_local<G>(gateway: &G, batch_id: &str) -> Result<BatchStats>
where
    G: VerificationGateway + ?Sized,
{
    let (summaries, details) = load_details(gateway, batch_id).await?;

    info!(
        "Computed stats for batch {} from {} documents ({} details)",
        batch_id,
        summaries.len(),
        details.len()
    );

    // Tiers come from the list so a failed detail fetch does not drop a document.
    let mut stats = aggregate(&summaries);
    stats.skipped_details = summaries.len().saturating_sub(details.len());
    if stats.skipped_details == 0 {
        stats.is_consistent = Some(evaluate_batch(&details));
    } else {
        warn!(
            "Batch {}: {} details missing, consistency left undecided",
            batch_id, stats.skipped_details
        );
    }
    Ok(stats)
}
