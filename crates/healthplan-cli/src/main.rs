//! HealthPlan: health document extraction and nutrition goal planning.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use healthplan_core::HealthPlanConfig;
use healthplan_generate::{
    LLMConfig, LLMConfigUpdate, LlmGenerator, NoopGenerator, StaticGenerator, TextGenerator,
};
use healthplan_runtime::{ExtractionRequest, HealthPlanner};

mod inputs;

#[derive(Parser)]
#[command(name = "healthplan")]
#[command(about = "Health document extraction and nutrition goal planning")]
#[command(version)]
struct Cli {
    /// Data directory for uploads and stored configuration
    #[arg(long, global = true, env = "HEALTHPLAN_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract health metrics from a text document
    Extract {
        /// Plain-text document to read
        file: PathBuf,

        /// Document type label
        #[arg(long = "type", default_value = "health_document")]
        doc_type: String,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Suggest a nutrition goal from health records
    Suggest {
        /// Records as a request object, a list, a single record or `extract` output
        records: PathBuf,

        /// User profile JSON
        #[arg(long)]
        profile: Option<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Sum a week of planned meals
    Aggregate {
        /// Week plan JSON
        week: PathBuf,

        /// Goal JSON, or `suggest` output, to compare against
        #[arg(long)]
        goal: Option<PathBuf>,
    },

    /// Show or update the text-generation provider settings
    Config(ConfigArgs),
}

#[derive(Args)]
struct RunArgs {
    /// User id used for rate limiting
    #[arg(long, default_value = "local")]
    user: String,

    /// Replay this file as the generator reply instead of calling a provider
    #[arg(long)]
    reply_file: Option<PathBuf>,
}

#[derive(Args, Default)]
struct ConfigArgs {
    #[arg(long, value_parser = ["auto", "openai", "anthropic", "groq"])]
    provider: Option<String>,

    #[arg(long)]
    openai_key: Option<String>,

    #[arg(long)]
    anthropic_key: Option<String>,

    #[arg(long)]
    groq_key: Option<String>,

    #[arg(long)]
    openai_model: Option<String>,

    #[arg(long)]
    anthropic_model: Option<String>,

    #[arg(long)]
    groq_model: Option<String>,
}

impl ConfigArgs {
    fn update(&self) -> Option<LLMConfigUpdate> {
        let update = LLMConfigUpdate {
            preferred_provider: self.provider.clone(),
            openai_api_key: self.openai_key.clone(),
            anthropic_api_key: self.anthropic_key.clone(),
            groq_api_key: self.groq_key.clone(),
            openai_model: self.openai_model.clone(),
            anthropic_model: self.anthropic_model.clone(),
            groq_model: self.groq_model.clone(),
        };
        let changed = update.preferred_provider.is_some()
            || update.openai_api_key.is_some()
            || update.anthropic_api_key.is_some()
            || update.groq_api_key.is_some()
            || update.openai_model.is_some()
            || update.anthropic_model.is_some()
            || update.groq_model.is_some();
        changed.then_some(update)
    }
}

/// Provider settings as printed. Keys are reported by presence only.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigStatus {
    preferred_provider: String,
    active_provider: Option<String>,
    active_model: Option<String>,
    configured_keys: Vec<&'static str>,
}

impl ConfigStatus {
    fn from_config(config: &LLMConfig) -> Self {
        let resolved = config.resolve_provider();
        let has_key =
            |key: &Option<String>| key.as_deref().is_some_and(|k| !k.trim().is_empty());
        let configured_keys = [
            ("openai", has_key(&config.openai_api_key)),
            ("anthropic", has_key(&config.anthropic_api_key)),
            ("groq", has_key(&config.groq_api_key)),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect();
        Self {
            preferred_provider: config.preferred_provider.clone(),
            active_provider: resolved.as_ref().map(|r| r.provider.to_string()),
            active_model: resolved.map(|r| r.model),
            configured_keys,
        }
    }
}

/// Offline replay when `--reply-file` is given, else the configured provider,
/// else the no-op generator that routes everything to the fallbacks.
fn build_generator(
    config: &HealthPlanConfig,
    reply_file: Option<&Path>,
) -> anyhow::Result<Arc<dyn TextGenerator>> {
    if let Some(path) = reply_file {
        let reply = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read reply file {}", path.display()))?;
        return Ok(Arc::new(StaticGenerator::new(reply)));
    }
    let llm_config = LLMConfig::load(&config.data_paths.llm_config_file);
    match LlmGenerator::from_config(&llm_config) {
        Some(generator) => Ok(Arc::new(generator)),
        None => {
            info!("No text-generation provider configured; using rule-based fallbacks");
            Ok(Arc::new(NoopGenerator))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_extract(
    config: &HealthPlanConfig,
    file: &Path,
    doc_type: &str,
    run: &RunArgs,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let generator = build_generator(config, run.reply_file.as_deref())?;
    let planner = HealthPlanner::new(generator, config);
    let request = ExtractionRequest::new(text, doc_type);
    let response = planner.extract_document(&run.user, &request).await?;
    print_json(&response)
}

async fn run_suggest(
    config: &HealthPlanConfig,
    records: &Path,
    profile: Option<&Path>,
    run: &RunArgs,
) -> anyhow::Result<()> {
    let mut request = inputs::goal_request(inputs::read_json(records)?)?;
    if let Some(profile) = profile {
        request.user_profile = Some(inputs::profile(inputs::read_json(profile)?)?);
    }

    let generator = build_generator(config, run.reply_file.as_deref())?;
    let planner = HealthPlanner::new(generator, config);
    let response = planner.suggest_goal(&run.user, &request).await?;
    print_json(&response)
}

fn run_aggregate(
    config: &HealthPlanConfig,
    week: &Path,
    goal: Option<&Path>,
) -> anyhow::Result<()> {
    let mut request = inputs::aggregation_request(inputs::read_json(week)?)?;
    if let Some(goal) = goal {
        request.goal = Some(inputs::goal(inputs::read_json(goal)?)?);
    }

    let planner = HealthPlanner::new(Arc::new(NoopGenerator), config);
    print_json(&planner.aggregate_week(&request))
}

fn run_config(config: &HealthPlanConfig, args: &ConfigArgs) -> anyhow::Result<()> {
    let mut llm_config = LLMConfig::load(&config.data_paths.llm_config_file);
    if let Some(update) = args.update() {
        llm_config.apply_update(&update);
        llm_config.save()?;
    }
    print_json(&ConfigStatus::from_config(&llm_config))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only JSON results.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = HealthPlanConfig::from_env(&cli.data_dir)
        .with_context(|| format!("Failed to prepare data directory {}", cli.data_dir.display()))?;

    match &cli.command {
        Command::Extract { file, doc_type, run } => {
            run_extract(&config, file, doc_type, run).await
        }
        Command::Suggest { records, profile, run } => {
            run_suggest(&config, records, profile.as_deref(), run).await
        }
        Command::Aggregate { week, goal } => run_aggregate(&config, week, goal.as_deref()),
        Command::Config(args) => run_config(&config, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_extract_defaults() {
        let cli = Cli::try_parse_from(["healthplan", "extract", "report.txt"]).unwrap();
        let Command::Extract { file, doc_type, run } = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(file, PathBuf::from("report.txt"));
        assert_eq!(doc_type, "health_document");
        assert_eq!(run.user, "local");
        assert!(run.reply_file.is_none());
    }

    #[test]
    fn test_suggest_options() {
        let cli = Cli::try_parse_from([
            "healthplan",
            "suggest",
            "records.json",
            "--profile",
            "me.json",
            "--user",
            "u1",
            "--reply-file",
            "reply.txt",
            "--data-dir",
            "/tmp/hp",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/hp"));
        let Command::Suggest { records, profile, run } = cli.command else {
            panic!("expected suggest");
        };
        assert_eq!(records, PathBuf::from("records.json"));
        assert_eq!(profile, Some(PathBuf::from("me.json")));
        assert_eq!(run.user, "u1");
        assert_eq!(run.reply_file, Some(PathBuf::from("reply.txt")));
    }

    #[test]
    fn test_rejects_missing_input_and_unknown_flag() {
        assert!(Cli::try_parse_from(["healthplan", "aggregate"]).is_err());
        assert!(Cli::try_parse_from(["healthplan", "aggregate", "w.json", "--bogus"]).is_err());
        assert!(Cli::try_parse_from(["healthplan", "config", "--provider", "other"]).is_err());
    }

    #[test]
    fn test_config_update_only_when_flags_given() {
        assert!(ConfigArgs::default().update().is_none());

        let cli = Cli::try_parse_from([
            "healthplan",
            "config",
            "--provider",
            "groq",
            "--groq-key",
            "gsk-test",
        ])
        .unwrap();
        let Command::Config(args) = cli.command else {
            panic!("expected config");
        };
        let update = args.update().unwrap();
        assert_eq!(update.preferred_provider.as_deref(), Some("groq"));
        assert_eq!(update.groq_api_key.as_deref(), Some("gsk-test"));
        assert!(update.openai_api_key.is_none());
    }

    #[test]
    fn test_config_persists_and_hides_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llm-config.json");
        let args = ConfigArgs {
            provider: Some("groq".into()),
            groq_key: Some("gsk-secret".into()),
            ..Default::default()
        };

        let mut config = LLMConfig::load_with(&path, |_| None);
        config.apply_update(&args.update().unwrap());
        config.save().unwrap();

        let reloaded = LLMConfig::load_with(&path, |_| None);
        let status = ConfigStatus::from_config(&reloaded);
        assert_eq!(status.preferred_provider, "groq");
        assert_eq!(status.active_provider.as_deref(), Some("groq"));
        assert_eq!(status.configured_keys, vec!["groq"]);

        let printed = serde_json::to_string(&status).unwrap();
        assert!(!printed.contains("gsk-secret"));
    }
}
