//! Subcommand handlers

use anyhow::Context;
use chatguard_classifiers::lists::{self, ListSummary};
use chatguard_classifiers::Classifier;
use chatguard_core::LanguageCode;
use chatguard_escalation::{EngineConfig, InteractionHistory, ModerationEngine, NoHistory};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::cli::{Commands, GlobalArgs};
use crate::replay::{self, ContactList};

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG: &str = "chatguard.yaml";

/// Resolve the engine configuration from flags
pub fn resolve_config(global: &GlobalArgs) -> anyhow::Result<EngineConfig> {
    let mut config = match &global.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::load(DEFAULT_CONFIG)?,
    };
    if let Some(dir) = &global.lists {
        config.classifier.lists_dir = dir.clone();
    }
    Ok(config)
}

pub async fn run(command: Commands, config: EngineConfig) -> anyhow::Result<()> {
    match command {
        Commands::Classify { text, languages } => classify(&config, &text.join(" "), languages),
        Commands::Import { dataset } => import(&config, &dataset),
        Commands::Dedup { primary_map } => dedup(&config, &primary_map),
        Commands::Summary { json } => summary(&config, json),
        Commands::Replay {
            transcript,
            contacts,
        } => replay(&config, &transcript, contacts.as_deref()).await,
    }
}

fn classify(
    config: &EngineConfig,
    text: &str,
    languages: Option<Vec<LanguageCode>>,
) -> anyhow::Result<()> {
    let mut classifier_config = config.classifier.clone();
    if languages.is_some() {
        classifier_config.languages = languages;
    }
    let classifier = classifier_config.build_classifier();

    let result = classifier.classify(text);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn import(config: &EngineConfig, dataset: &Path) -> anyhow::Result<()> {
    let lists_dir = &config.classifier.lists_dir;
    let report = lists::import_dataset(dataset, lists_dir)
        .with_context(|| format!("importing {}", dataset.display()))?;

    info!(
        added = report.added,
        moved = report.moved,
        unchanged = report.unchanged,
        "Import complete"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn dedup(config: &EngineConfig, primary_map: &Path) -> anyhow::Result<()> {
    let lists_dir = &config.classifier.lists_dir;
    let content = std::fs::read_to_string(primary_map)
        .with_context(|| format!("reading {}", primary_map.display()))?;
    let primary = lists::parse_primary_map(&content)?;

    let mut lists = lists::read_lists(lists_dir);
    let removed = lists::dedup_primary(&mut lists, &primary);
    lists::write_lists(lists_dir, &lists)?;

    info!(removed, dir = %lists_dir.display(), "Dedup complete");
    println!("Removed {} non-primary entries", removed);
    Ok(())
}

fn summary(config: &EngineConfig, json: bool) -> anyhow::Result<()> {
    let store = config.classifier.load_store();
    let rows = lists::summarize(&store);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", render_summary(&rows));
    }
    Ok(())
}

/// Plain-text table of tier counts
pub fn render_summary(rows: &[ListSummary]) -> String {
    let mut out = format!(
        "{:<10} {:>6} {:>6} {:>6} {:>6}  {}\n",
        "language", "high", "medium", "low", "total", "status"
    );
    for row in rows {
        let status = match &row.status {
            chatguard_classifiers::ListStatus::Loaded { .. } => "loaded".to_string(),
            chatguard_classifiers::ListStatus::Empty => "empty".to_string(),
            chatguard_classifiers::ListStatus::Missing => "missing".to_string(),
            chatguard_classifiers::ListStatus::Malformed { reason } => format!("malformed: {reason}"),
        };
        out.push_str(&format!(
            "{:<10} {:>6} {:>6} {:>6} {:>6}  {}\n",
            row.language.name(),
            row.high,
            row.medium,
            row.low,
            row.total(),
            status
        ));
    }
    let total: usize = rows.iter().map(ListSummary::total).sum();
    out.push_str(&format!("{:<10} {:>27}\n", "total", total));
    out
}

async fn replay(
    config: &EngineConfig,
    transcript: &Path,
    contacts: Option<&Path>,
) -> anyhow::Result<()> {
    let history: Arc<dyn InteractionHistory> = match contacts {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Arc::new(ContactList::from_json(&content)?)
        }
        None => Arc::new(NoHistory),
    };
    let engine = ModerationEngine::from_config(config, history)?;

    let content = std::fs::read_to_string(transcript)
        .with_context(|| format!("reading {}", transcript.display()))?;
    let messages = replay::parse_transcript(&content, Utc::now())?;
    let records = replay::replay(&engine, messages).await?;

    for record in &records {
        println!("{}", serde_json::to_string(record)?);
    }

    let metrics = engine.metrics();
    info!(
        messages = metrics.messages_classified,
        flagged = metrics.messages_flagged,
        suppressed = metrics.notifications_suppressed,
        alerts = metrics.moderator_alerts,
        flag_rate = metrics.flag_rate(),
        audit_intact = engine.verify_audit(),
        "Replay complete"
    );
    Ok(())
}
