use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use caseweave::cli::commands::generate::GenerateArgs;
use caseweave::cli::{CommandContext, OutputFormat};
use caseweave::types::AnalysisKind;

/// Parse analysis kind from string
fn parse_kind(s: &str) -> Result<AnalysisKind, String> {
    s.parse().map_err(|_| {
        let valid: Vec<&str> = AnalysisKind::ALL.iter().map(|k| k.as_str()).collect();
        format!("Invalid kind '{}'. Valid values: {}", s, valid.join(", "))
    })
}

#[derive(Parser)]
#[command(name = "caseweave")]
#[command(
    version,
    about = "Resilient legal case analysis for self-represented litigants"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an analysis and store it as the current version
    Generate {
        #[arg(long, help = "Case identifier")]
        case_id: i64,
        #[arg(long, short, value_parser = parse_kind, help = "Analysis kind (see `caseweave kinds`)")]
        kind: AnalysisKind,
        #[arg(long, help = "Issue category: criminal, civil, housing, contract, ...")]
        issue: String,
        #[arg(long, help = "Forum category: federal, state, municipal, tribal, ...")]
        forum: String,
        #[arg(long, short, help = "Free-text case description")]
        description: String,
        #[arg(long, help = "Proceeding type for court scripts (e.g. bail_hearing)")]
        proceeding: Option<String>,
        #[arg(long, help = "Evidence item; repeat for several")]
        evidence: Vec<String>,
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        #[arg(long, help = "Skip all providers and use the local knowledge base")]
        offline: bool,
    },

    /// Show stored analyses for a case
    Show {
        #[arg(long, help = "Case identifier")]
        case_id: i64,
        #[arg(long, short, value_parser = parse_kind, help = "Only this kind")]
        kind: Option<AnalysisKind>,
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List analysis kinds and their required fields
    Kinds,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mCaseWeave encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = match e.downcast_ref::<caseweave::CaseError>() {
                Some(err) if err.is_user_visible() => err.user_message(),
                _ => e.to_string(),
            };
            caseweave::cli::ui::Output::new().error(&message);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Generate {
            case_id,
            kind,
            issue,
            forum,
            description,
            proceeding,
            evidence,
            format,
            offline,
        } => {
            let ctx = CommandContext::load()?;
            let rt = Runtime::new()?;
            rt.block_on(caseweave::cli::commands::generate::run(
                &ctx,
                GenerateArgs {
                    case_id,
                    kind,
                    issue,
                    forum,
                    description,
                    proceeding,
                    evidence,
                    format,
                    offline,
                },
            ))?;
        }
        Commands::Show {
            case_id,
            kind,
            format,
        } => {
            let ctx = CommandContext::load()?;
            caseweave::cli::commands::show::run(&ctx, case_id, kind, format)?;
        }
        Commands::Kinds => caseweave::cli::commands::kinds::run(),
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => {
                caseweave::cli::commands::config::show(global, format)?;
            }
            ConfigAction::Path => {
                caseweave::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                if global {
                    caseweave::cli::commands::config::init_global(force)?;
                } else {
                    caseweave::cli::commands::config::init_project(force)?;
                }
            }
        },
    }

    Ok(())
}
