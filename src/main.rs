use std::{fs::OpenOptions, sync::Arc, sync::Mutex};

use clap::Parser;
use colored::*;
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use upload_review::{
    cli::{Cli, Commands, OutputFormat},
    config::Config,
    error::{Result, ReviewError},
    gateway::{HttpGateway, VerificationGateway},
    review::{
        classify, collect_stats, evaluate, load_details, title_case, BatchStats, Classification,
        ConsistencyResult, DocumentDetail, DocumentSummary, Field, ReviewSession, StatsSource,
    },
    storage::{Database, Decision, ReviewDecision},
    tui, utils,
};

const DEFAULT_LOG_FILTER: &str = "upload_review=debug,info";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load_from(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", format!("Failed to load configuration: {:#}", e).red());
            std::process::exit(1);
        }
    };

    let tui_mode = matches!(cli.command, Commands::Tui { .. });
    if let Err(e) = init_logging(&config, tui_mode) {
        eprintln!("{}", format!("Failed to open log file: {}", e).red());
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Tui { batch_id } => {
            info!("Starting review screen for batch {}", batch_id);
            tui::run_tui(config, batch_id).await
        }

        Commands::List { batch_id, format } => list_documents(&config, &batch_id, format).await,

        Commands::Show { document_id, format } => {
            show_document(&config, &document_id, format).await
        }

        Commands::Stats { batch_id, source, format } => {
            let source = source.unwrap_or(config.ui.default_stats_source);
            show_stats(&config, &batch_id, source, format).await
        }

        Commands::Consistency { batch_id, format } => {
            show_consistency(&config, &batch_id, format).await
        }

        Commands::Decide { document_id, batch, decision, note, yes } => {
            record_decision(&config, &document_id, &batch, decision.into(), note, yes).await
        }

        Commands::History { batch, limit, format } => {
            show_history(&config, batch.as_deref(), limit, format)
        }

        Commands::Init => initialize(&config),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

/// Logs go to stderr, or to the configured file while the terminal UI owns the screen.
fn init_logging(config: &Config, tui_mode: bool) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if tui_mode {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.logging.file)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

#[derive(Serialize)]
struct Classified<'a, T> {
    #[serde(flatten)]
    document: &'a T,
    classification: Classification,
}

async fn list_documents(config: &Config, batch_id: &str, format: OutputFormat) -> Result<()> {
    let gateway = Arc::new(HttpGateway::new(config)?);
    let session = ReviewSession::new(gateway);
    session.load_batch(batch_id).await;

    let snapshot = session.snapshot();
    if let Some(reason) = snapshot.list_error() {
        return Err(ReviewError::Gateway(reason.to_string()));
    }
    let documents = snapshot.documents();

    if format == OutputFormat::Json {
        let listed: Vec<_> = documents
            .iter()
            .map(|document| Classified {
                document,
                classification: classify(&document.score),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(());
    }

    println!("{}", format!("=== Batch {} ===", batch_id).cyan().bold());
    if snapshot.no_documents_found() {
        println!("{}", "No documents found".yellow());
        return Ok(());
    }

    print_document_table(documents);

    let stats = snapshot.summary_stats();
    println!(
        "\n{} documents: {} high risk, {} warning, {} normal, {} trusted",
        stats.total_documents, stats.high_risk, stats.warning, stats.normal, stats.trusted
    );
    if stats.unclassified > 0 {
        println!("{} with an unrecognized score", stats.unclassified.to_string().yellow());
    }
    Ok(())
}

fn print_document_table(documents: &[DocumentSummary]) {
    let widths = [28, 14, 9, 6, 24];
    utils::print_table_border(90);
    utils::print_table_row(&["Document", "Score", "Verified", "Type", "Uploaded"], &widths);
    utils::print_table_border(90);

    for document in documents {
        let classification = classify(&document.score);
        utils::print_table_row(
            &[
                &utils::truncate(&document.id, widths[0]),
                &utils::format_score(&document.score),
                &format!("{}%", classification.verified_percent),
                document.file_kind.label(),
                &utils::format_optional_timestamp(document.created_at.as_ref()),
            ],
            &widths,
        );
    }
    utils::print_table_border(90);
}

async fn show_document(config: &Config, document_id: &str, format: OutputFormat) -> Result<()> {
    let gateway = HttpGateway::new(config)?;
    let detail = gateway.get_document_detail(document_id).await?;

    if format == OutputFormat::Json {
        let classified = Classified {
            document: &detail,
            classification: classify(detail.score()),
        };
        println!("{}", serde_json::to_string_pretty(&classified)?);
        return Ok(());
    }

    print_detail(&detail);

    if let Ok(db) = Database::new(&config.database.path) {
        match db.latest_decision(document_id) {
            Ok(Some(decision)) => println!(
                "\nDecision:         {} ({})",
                decision.decision,
                utils::format_timestamp(&decision.decided_at)
            ),
            Ok(None) => println!("\nDecision:         {}", "Pending".dimmed()),
            Err(e) => warn!("Could not read decision for {}: {}", document_id, e),
        }
    }
    Ok(())
}

fn print_detail(detail: &DocumentDetail) {
    let classification = classify(detail.score());

    println!("{}", format!("=== Document {} ===", detail.id()).cyan().bold());
    println!(
        "Score:            {} {} ({}% verified)",
        classification.icon.glyph(),
        utils::format_score(detail.score()),
        classification.verified_percent
    );
    println!("Name:             {}", detail.display_name());
    println!("Address:          {}", detail.display_address());
    println!("Address complete: {}", detail.display_address_complete());
    println!("Country:          {}", detail.display_country());
    println!("Document type:    {}", detail.display_document_type());
    println!("File type:        {}", detail.summary.file_kind.label());
    println!(
        "Uploaded:         {}",
        utils::format_optional_timestamp(detail.summary.created_at.as_ref())
    );
    println!("\nSummary:\n  {}", detail.display_summary());

    if detail.indicators.is_empty() {
        println!("\n{}", "No indicators reported".dimmed());
        return;
    }

    println!("\n{}", "Indicators:".yellow());
    for indicator in &detail.indicators {
        println!(
            "  [{}] {} ({})",
            title_case(&indicator.category).yellow(),
            indicator.title.bold(),
            indicator.indicator_id
        );
        println!("      {}", indicator.description);
    }
}

async fn show_stats(
    config: &Config,
    batch_id: &str,
    source: StatsSource,
    format: OutputFormat,
) -> Result<()> {
    let gateway = HttpGateway::new(config)?;
    let stats = collect_stats(&gateway, batch_id, source).await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    print_stats(batch_id, &stats);
    Ok(())
}

fn print_stats(batch_id: &str, stats: &BatchStats) {
    println!("{}", format!("=== Batch {} Statistics ===", batch_id).cyan().bold());
    println!("\nDocuments:  {}", stats.total_documents);
    for (label, count) in stats.buckets() {
        println!(
            "  {:10} {:>4}  ({:.1}%)",
            label,
            count,
            stats.percent_of_total(count)
        );
    }
    if stats.unclassified > 0 {
        println!("  {:10} {:>4}", "Other", stats.unclassified);
    }

    println!(
        "\nOverall:    {}",
        utils::format_score(stats.overall_status.as_tag())
    );

    println!("\n{}", "Consistency:".yellow());
    match &stats.is_consistent {
        Some(result) => {
            for line in consistency_lines(result) {
                println!("  {}", line);
            }
        }
        None if stats.skipped_details > 0 => println!(
            "  {}",
            format!(
                "Undecided: {} documents could not be loaded",
                stats.skipped_details
            )
            .yellow()
        ),
        None => println!("  {}", "Not checked (use --source local or auto)".dimmed()),
    }
}

fn consistency_lines(result: &ConsistencyResult) -> Vec<String> {
    [("Name", result.name_consistent), ("Address", result.address_consistent)]
        .into_iter()
        .map(|(field, consistent)| {
            if consistent {
                format!("{} {} field is same in all documents", "✓".green(), field)
            } else {
                format!("{} {} field is not same in all documents", "✗".red(), field)
            }
        })
        .collect()
}

async fn show_consistency(config: &Config, batch_id: &str, format: OutputFormat) -> Result<()> {
    let gateway = HttpGateway::new(config)?;
    let (summaries, details) = load_details(&gateway, batch_id).await?;
    let fields = [evaluate(&details, Field::Name), evaluate(&details, Field::Address)];

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&fields)?);
        return Ok(());
    }

    println!("{}", format!("=== Batch {} Consistency ===", batch_id).cyan().bold());
    if details.len() < summaries.len() {
        println!(
            "{}",
            format!(
                "{} of {} documents could not be loaded and were skipped",
                summaries.len() - details.len(),
                summaries.len()
            )
            .yellow()
        );
    }

    for field in &fields {
        let mark = if field.consistent { "✓".green() } else { "✗".red() };
        println!("\n{} {}", mark, field.describe());
        if let Some(reference) = &field.reference {
            println!("  Reference: {}", reference);
        }
        for check in field.mismatches() {
            let value = details
                .iter()
                .find(|d| d.id() == check.document_id)
                .map(|d| match field.field {
                    Field::Name => d.display_name(),
                    Field::Address => d.display_address(),
                })
                .unwrap_or_default();
            println!("  {} {}: {}", "≠".red(), check.document_id, value);
        }
    }
    Ok(())
}

async fn record_decision(
    config: &Config,
    document_id: &str,
    batch_id: &str,
    decision: Decision,
    note: Option<String>,
    yes: bool,
) -> Result<()> {
    let gateway = HttpGateway::new(config)?;
    let detail = gateway.get_document_detail(document_id).await?;
    let classification = classify(detail.score());

    println!(
        "Document {} ({}, {})",
        detail.id(),
        utils::format_score(detail.score()),
        detail.display_name()
    );

    if !yes && !utils::confirm_action(&format!("Mark this document {}?", decision)) {
        println!("Cancelled");
        return Ok(());
    }

    let db = Database::new(&config.database.path)?;
    let record = ReviewDecision::new(detail.id(), batch_id, decision, detail.score()).with_note(note);
    db.save_decision(&record)?;
    info!(
        "Recorded {} for {} in batch {} (tier {})",
        decision, document_id, batch_id, classification.tier
    );

    println!("{}", format!("✓ {} {}", decision, detail.id()).green());
    Ok(())
}

fn show_history(
    config: &Config,
    batch_id: Option<&str>,
    limit: usize,
    format: OutputFormat,
) -> Result<()> {
    let db = Database::new(&config.database.path)?;
    let decisions = db.get_decisions(batch_id, Some(limit))?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&decisions)?);
        return Ok(());
    }

    let stats = db.get_stats()?;
    println!("{}", "=== Review Decisions ===".cyan().bold());
    println!(
        "Total: {}  Approved: {}  Declined: {}  Documents: {}",
        stats.total,
        stats.approved.to_string().green(),
        stats.declined.to_string().red(),
        stats.documents
    );

    if decisions.is_empty() {
        println!("\n{}", "No decisions recorded".dimmed());
        return Ok(());
    }

    let widths = [24, 20, 12, 10, 10, 30];
    println!();
    utils::print_table_border(116);
    utils::print_table_row(
        &["Decided", "Document", "Batch", "Decision", "Score", "Note"],
        &widths,
    );
    utils::print_table_border(116);
    for entry in &decisions {
        let decision = match entry.decision {
            Decision::Approved => entry.decision.to_string().green().to_string(),
            Decision::Declined => entry.decision.to_string().red().to_string(),
        };
        utils::print_table_row(
            &[
                &utils::format_timestamp(&entry.decided_at),
                &utils::truncate(&entry.document_id, widths[1]),
                &utils::truncate(&entry.batch_id, widths[2]),
                &decision,
                &utils::format_score(&entry.score),
                &utils::truncate(entry.note.as_deref().unwrap_or(""), widths[5]),
            ],
            &widths,
        );
    }
    utils::print_table_border(116);
    Ok(())
}

fn initialize(config: &Config) -> Result<()> {
    println!("{}", "Initializing upload review...".green());
    let _db = Database::new(&config.database.path)?;
    println!("{}", "✓ Decision database ready".green());
    println!("{}", "✓ Configuration loaded".green());

    let rendered = toml::to_string_pretty(config).map_err(|e| ReviewError::Config(e.to_string()))?;
    println!("\n{}", "Configuration:".cyan());
    for line in rendered.lines() {
        println!("  {}", line);
    }

    println!("\n{}", "Ready to use! Try running:".cyan());
    println!("  {} to list a batch", "upload-review list <batch_id>".yellow());
    println!("  {} to review interactively", "upload-review tui <batch_id>".yellow());
    Ok(())
}
