use anyhow::Result;
use chrono::Local;
use clap::{Parser, ValueEnum};
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::prelude::*;

use pmi_cli::{
    display_banner, export_report, handle_input_with_history, print_help, render_error,
    render_history, render_outcome, render_warnings, AnalysisHistory, SessionCommand,
};
use pmi_core::report::render_markdown;
use pmi_core::{
    AnalysisOutcome, Analyzer, Error, ErrorCategory, PromptBuilder, ResponseFormat, RetryConfig,
};
use pmi_gemini::{GeminiClient, GeminiConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Headed plain-text sections
    Sections,
    /// A single JSON object
    Json,
}

impl From<FormatArg> for ResponseFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Sections => ResponseFormat::Sections,
            FormatArg::Json => ResponseFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputArg {
    Text,
    Json,
    Markdown,
}

#[derive(Parser)]
#[command(name = "pmi")]
#[command(about = "AI-powered competitive analysis for product managers", long_about = None)]
#[command(version)]
struct Cli {
    /// Competitor name or product description. Starts an interactive session when omitted
    product: Option<String>,

    /// Gemini model to use (overrides GEMINI_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Format the model is asked to answer in
    #[arg(long, value_enum, default_value_t = FormatArg::Sections)]
    response_format: FormatArg,

    /// Language to write the analysis in
    #[arg(short, long)]
    language: Option<String>,

    /// How a one-shot analysis is printed
    #[arg(short, long, value_enum, default_value_t = OutputArg::Text)]
    output: OutputArg,

    /// Also write a Markdown report to this file or directory
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Fail on the first transient error instead of retrying once
    #[arg(long)]
    no_retry: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Logs go to stderr so one-shot JSON and Markdown output stays clean.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "pmi=debug,pmi_core=debug,pmi_gemini=debug,pmi_cli=debug"
    } else {
        "warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose),
        )
        .init();
}

fn build_analyzer(cli: &Cli) -> pmi_core::Result<Analyzer<GeminiClient>> {
    let mut config = GeminiConfig::from_env()?;
    if let Some(model) = cli.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        config = config.with_model(model);
    }

    let client = GeminiClient::new(config)?;
    let generation = client.generation_config();

    let mut prompt = PromptBuilder::new(cli.response_format.into());
    if let Some(language) = cli.language.as_deref().filter(|l| !l.trim().is_empty()) {
        prompt = prompt.with_language(language.trim());
    }

    let retry = if cli.no_retry {
        RetryConfig::disabled()
    } else {
        RetryConfig::default()
    };

    Ok(Analyzer::new(client)
        .with_prompt(prompt)
        .with_generation_config(generation)
        .with_retry(retry))
}

fn exit_code(err: &Error) -> ExitCode {
    match err.category() {
        ErrorCategory::Input | ErrorCategory::Configuration => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Configuration problems surface before any request is made
    let analyzer = match build_analyzer(&cli) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            render_error(&e);
            return Ok(exit_code(&e));
        }
    };

    if let Some(product) = cli.product.as_deref() {
        return run_once(&analyzer, product, &cli).await;
    }

    run_interactive(&analyzer).await?;
    Ok(ExitCode::SUCCESS)
}

async fn run_once(analyzer: &Analyzer<GeminiClient>, product: &str, cli: &Cli) -> Result<ExitCode> {
    if cli.output == OutputArg::Text {
        eprintln!("{} Analyzing {}...", "🔍".blue(), product.trim().bold());
    }

    let outcome = match analyzer.analyze(product).await {
        Ok(outcome) => outcome,
        Err(e) => {
            render_error(&e);
            return Ok(exit_code(&e));
        }
    };

    let now = Local::now();
    match cli.output {
        OutputArg::Text => render_outcome(&outcome),
        OutputArg::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            render_warnings(&outcome.warnings);
        }
        OutputArg::Markdown => {
            println!("{}", render_markdown(outcome.product(), &outcome.response, &now));
            render_warnings(&outcome.warnings);
        }
    }

    if let Some(target) = cli.export.as_deref() {
        match export_report(&outcome, Some(target), now).await {
            Ok(path) => eprintln!("{} Report saved to {}", "📄".green(), path.display()),
            Err(e) => {
                render_error(&e);
                return Ok(exit_code(&e));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_interactive(analyzer: &Analyzer<GeminiClient>) -> Result<()> {
    display_banner();

    let mut input_history = Vec::new();
    let mut history = AnalysisHistory::default();

    loop {
        let input = handle_input_with_history(&mut input_history).await?;

        let Some(command) =
            SessionCommand::parse_with(&input, |name| history.find(name).is_some())
        else {
            continue;
        };

        match command {
            SessionCommand::Exit => {
                println!("{}", "👋 Goodbye!".green());
                break;
            }
            SessionCommand::Help => print_help(),
            SessionCommand::History => render_history(&history),
            SessionCommand::Clear => {
                history.clear();
                println!("{}", "🧹 Session history cleared.".dimmed());
            }
            SessionCommand::Show(key) => {
                let entry = if key.is_empty() {
                    history.latest()
                } else {
                    history.lookup(&key)
                };
                match entry {
                    Some(entry) => render_outcome(&entry.outcome),
                    None => println!("{} No analysis matches '{}'. Type 'history' to list them.", "⚠️".yellow(), key),
                }
            }
            SessionCommand::Export(target) => {
                let Some(entry) = history.latest() else {
                    println!("{} Nothing to export yet. Analyze a product first.", "⚠️".yellow());
                    continue;
                };
                match export_report(&entry.outcome, target.as_deref(), Local::now()).await {
                    Ok(path) => println!("{} Report saved to {}", "📄".green(), path.display()),
                    Err(e) => render_error(&e),
                }
            }
            SessionCommand::Analyze(product) => {
                if let Some(outcome) = analyze(analyzer, &product).await {
                    render_outcome(&outcome);
                    history.record(outcome, Local::now());
                }
            }
        }
    }

    Ok(())
}

async fn analyze(analyzer: &Analyzer<GeminiClient>, product: &str) -> Option<AnalysisOutcome> {
    println!("{} Analyzing {}...", "🔍".blue(), product.bold());

    match analyzer.analyze(product).await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            tracing::debug!(error = ?e, "analysis failed");
            render_error(&e);
            None
        }
    }
}
