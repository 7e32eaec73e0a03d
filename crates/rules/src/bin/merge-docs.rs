//! merge-docs: run a merge rule over a pair of documents.
//!
//! Loads every `MergeRule` from the rules directory, picks the rule for the
//! incoming document (explicit `--rule`, else the rule for its `indexType`,
//! else `MERGE_RULE`), merges it with the stored document and prints the
//! result as JSON.
//!
//! With `--check` it only loads and validates the rules directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};

use docmerge_core::{config, Config, Document};
use docmerge_rules::engine::MergeEngine;
use docmerge_rules::expression::{ExpressionEvaluator, JinjaEvaluator};
use docmerge_rules::loader::{LoadResult, LoadStatus, RuleLoader};
use docmerge_rules::schema::MergeRule;

// ── CLI ─────────────────────────────────────────────────────────────

/// Merge an incoming document into its stored version using YAML merge rules.
#[derive(Parser, Debug)]
#[command(name = "merge-docs", version, about)]
struct Cli {
    /// Config profile (prefix for env keys, e.g. PROD -> PROD_RULES_DIR).
    #[arg(long, env = "DOCMERGE_PROFILE")]
    profile: Option<String>,

    /// Directory holding MergeRule YAML files [default: RULES_DIR or data/rules].
    #[arg(long)]
    rules_dir: Option<PathBuf>,

    /// Incoming document (JSON with `id`, `indexType`, `source`).
    #[arg(long = "new", value_name = "FILE", required_unless_present = "check")]
    new_doc: Option<PathBuf>,

    /// Stored document. Without it the incoming document is printed as is.
    #[arg(long = "existing", value_name = "FILE")]
    existing_doc: Option<PathBuf>,

    /// Rule id to apply instead of selecting by index type.
    #[arg(long)]
    rule: Option<String>,

    /// Write the merged document here instead of stdout.
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Validate the rules directory and exit.
    #[arg(long)]
    check: bool,
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    let cli = Cli::parse();

    let config = match cli.profile.as_deref() {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
    config.log_summary();

    let rules_dir = cli.rules_dir.clone().unwrap_or_else(|| config.rules_dir.clone());
    let evaluator: Arc<dyn ExpressionEvaluator> = Arc::new(JinjaEvaluator::new());
    let loader = RuleLoader::new(rules_dir.clone()).with_evaluator(Arc::clone(&evaluator));
    let results = loader
        .load_all()
        .with_context(|| format!("failed to scan rules directory {}", rules_dir.display()))?;

    if cli.check {
        return report_check(&results);
    }

    let new_path = cli.new_doc.as_deref().context("--new is required")?;
    let new_doc = read_document(new_path)?;
    let existing_doc = cli.existing_doc.as_deref().map(read_document).transpose()?;

    let explicit = cli.rule.as_deref();
    let rule = select_rule(&loader, explicit, config.default_rule.as_deref(), &new_doc)?;
    info!(rule_id = %rule.id(), id = %new_doc.id, index_type = %new_doc.index_type, "merging");

    let engine = MergeEngine::new(evaluator);
    let merged = engine.apply_rule(&rule, new_doc, existing_doc);

    let json = serde_json::to_string_pretty(&merged).context("failed to serialize merged document")?;
    match &cli.output {
        Some(path) => fs::write(path, format!("{json}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn read_document(path: &Path) -> anyhow::Result<Document> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a valid document", path.display()))
}

/// `--rule` wins, then the rule for the document's index type, then the
/// configured default.
fn select_rule(
    loader: &RuleLoader,
    explicit: Option<&str>,
    fallback: Option<&str>,
    doc: &Document,
) -> anyhow::Result<MergeRule> {
    if let Some(id) = explicit {
        return loader.get(id).with_context(|| {
            format!("no merge rule with id '{id}' in {}", loader.rules_dir().display())
        });
    }
    if let Some(rule) = loader.rule_for_index(&doc.index_type) {
        return Ok(rule);
    }
    match fallback {
        Some(id) => loader
            .get(id)
            .with_context(|| format!("default merge rule '{id}' not found")),
        None => bail!(
            "no enabled merge rule for index type '{}' (use --rule or MERGE_RULE)",
            doc.index_type
        ),
    }
}

fn report_check(results: &[LoadResult]) -> anyhow::Result<()> {
    let mut failed = 0;
    for result in results {
        match &result.status {
            LoadStatus::Loaded { rule_id } => {
                println!("ok      {rule_id} ({})", result.path.display());
            }
            LoadStatus::Failed { error } => {
                failed += 1;
                println!("FAILED  {}: {error}", result.path.display());
            }
            LoadStatus::Skipped { reason } => {
                warn!(path = %result.path.display(), %reason, "skipped");
            }
        }
    }
    let loaded = results.iter().filter(|r| r.is_loaded()).count();
    println!("{loaded} rule(s) loaded, {failed} failed");
    if failed > 0 {
        bail!("{failed} rule file(s) failed validation");
    }
    Ok(())
}
