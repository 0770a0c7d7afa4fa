use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use scigraph_ai::{HypothesisEngine, ReportRequest, ResearchReport};
use scigraph_core::config_manager::{BackendKind, ConfigManager, LoggingConfig};
use scigraph_graph::{GraphBuilder, GraphFormat, GraphStatistics, StatementStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scigraph")]
#[command(about = "SciGraph - research knowledge graphs and hypothesis generation", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./.scigraph.toml, then ~/.scigraph/config.toml)
    #[arg(short, long, global = true, env = "SCIGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Ntriples,
}

impl From<FormatArg> for GraphFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => GraphFormat::Json,
            FormatArg::Ntriples => GraphFormat::NTriples,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a knowledge graph from extracted metadata and an assessment
    Build {
        /// Paper metadata JSON
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Reproducibility assessment JSON
        #[arg(short, long)]
        reproducibility: Option<PathBuf>,

        /// Output graph file
        #[arg(short, long)]
        output: PathBuf,

        /// Output format (defaults to the output file extension)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Generate a hypothesis report from a graph
    Generate {
        /// Input graph file (.json or .nt)
        #[arg(short, long)]
        graph: PathBuf,

        /// Output report JSON
        #[arg(short, long)]
        output: PathBuf,

        /// Number of hypotheses
        #[arg(short = 'n', long)]
        num_hypotheses: Option<usize>,

        /// Research focus area
        #[arg(long)]
        focus_area: Option<String>,

        /// Generative backend: anthropic, openai, gemini or rule-based
        #[arg(long)]
        provider: Option<BackendKind>,

        /// Backend model
        #[arg(long)]
        model: Option<String>,

        /// Upper bound on the whole backend call, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Print headline statistics for a graph
    Stats {
        /// Input graph file (.json or .nt)
        #[arg(short, long)]
        graph: PathBuf,
    },

    /// Write a default config file
    Init {
        /// Where to write it (defaults to ~/.scigraph/config.toml)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { path } = &cli.command {
        return init_config(path.as_deref());
    }

    let mut manager = load_config(cli.config.as_deref(), cli.verbose)?;
    init_tracing(&manager.config().logging, cli.verbose)?;
    manager.log_summary();

    match cli.command {
        Commands::Build {
            metadata,
            reproducibility,
            output,
            format,
        } => build_graph(
            metadata.as_deref(),
            reproducibility.as_deref(),
            &output,
            format,
        ),
        Commands::Generate {
            graph,
            output,
            num_hypotheses,
            focus_area,
            provider,
            model,
            timeout_secs,
        } => {
            let config = manager.config_mut();
            if let Some(provider) = provider {
                config.llm.provider = provider;
            }
            if model.is_some() {
                config.llm.model = model;
            }
            if let Some(timeout) = timeout_secs {
                config.synthesis.backend_timeout_secs = timeout;
            }
            if let Some(n) = num_hypotheses {
                config.synthesis.num_hypotheses = n;
            }
            if focus_area.is_some() {
                config.synthesis.focus_area = focus_area;
            }
            ConfigManager::validate_config(config).context("Invalid command line options")?;

            let engine = HypothesisEngine::from_config(config);
            let request = ReportRequest::from(&config.synthesis);
            let report = engine
                .generate_report_from_file(&graph, &request)
                .await
                .with_context(|| format!("Failed to load graph {}", graph.display()))?;

            let json = report.to_json().context("Failed to serialize report")?;
            std::fs::write(&output, json)
                .with_context(|| format!("Failed to write report {}", output.display()))?;
            print_report_summary(&report, &output);
            Ok(())
        }
        Commands::Stats { graph } => {
            let store = StatementStore::from_file(&graph)
                .with_context(|| format!("Failed to load graph {}", graph.display()))?;
            print_statistics(&store.statistics());
            Ok(())
        }
        Commands::Init { .. } => Ok(()),
    }
}

/// Loads configuration under a temporary stderr subscriber, so warnings
/// raised before the configured one exists are still shown.
fn load_config(path: Option<&Path>, verbose: bool) -> Result<ConfigManager> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::with_default(bootstrap, || match path {
        Some(path) => ConfigManager::from_file(path),
        None => ConfigManager::load(),
    })
    .context("Failed to load configuration")
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { logging.level.as_str() };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match logging.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        "compact" => registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
    };
    result.context("Failed to initialise logging")
}

fn build_graph(
    metadata: Option<&Path>,
    reproducibility: Option<&Path>,
    output: &Path,
    format: Option<FormatArg>,
) -> Result<()> {
    if metadata.is_none() && reproducibility.is_none() {
        bail!("Nothing to build: pass --metadata and/or --reproducibility");
    }
    let format = match format {
        Some(arg) => GraphFormat::from(arg),
        None => GraphFormat::from_path(output).unwrap_or(GraphFormat::Json),
    };

    let mut builder = GraphBuilder::new();
    let summary = builder.load_and_process_files(metadata, reproducibility);
    builder
        .store()
        .save(output, format)
        .with_context(|| format!("Failed to write graph {}", output.display()))?;

    println!(
        "{} {} ({} papers, {} assessments)",
        "✓ Knowledge graph saved to".green().bold(),
        output.display().to_string().cyan(),
        summary.papers_added,
        summary.assessments_added
    );
    print_statistics(&builder.statistics());
    Ok(())
}

fn init_config(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => ConfigManager::user_config_path()
            .context("Could not determine the home directory; pass --path")?,
    };
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }
    ConfigManager::create_default_config(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!(
        "{} {}",
        "✓ Wrote default config to".green().bold(),
        path.display().to_string().cyan()
    );
    Ok(())
}

fn print_statistics(stats: &GraphStatistics) {
    println!("{}", "Graph statistics".cyan().bold());
    for (label, value) in [
        ("Total triples", stats.total_triples),
        ("Papers", stats.papers),
        ("Authors", stats.authors),
        ("Tools", stats.tools),
        ("Datasets", stats.datasets),
        ("Assessments", stats.assessments),
    ] {
        println!("  {}: {}", label, value.to_string().yellow());
    }
}

fn print_report_summary(report: &ResearchReport, output: &Path) {
    println!(
        "{} {}",
        "✓ Research report saved to".green().bold(),
        output.display().to_string().cyan()
    );
    println!(
        "  Generated {} hypotheses via {} synthesis",
        report.summary.total_hypotheses.to_string().yellow(),
        report.generation_method
    );
    println!(
        "  Average novelty: {}",
        format!("{:.2}", report.summary.avg_novelty_score).yellow()
    );
    for (i, h) in report.generated_hypotheses.iter().take(3).enumerate() {
        println!("  {}. {}", i + 1, h.hypothesis);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_loads_before_global_logging() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scigraph.toml");
        std::fs::write(&path, "[logging]\nformat = \"compact\"\n").unwrap();

        let manager = load_config(Some(path.as_path()), false).unwrap();
        assert_eq!(manager.config().logging.format, "compact");
        // The bootstrap subscriber is scoped, so the configured one can still install.
        init_tracing(&manager.config().logging, false).unwrap();
        manager.log_summary();

        assert!(load_config(Some(dir.path().join("absent.toml").as_path()), false).is_err());
    }
}
