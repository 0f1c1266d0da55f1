//! metta-infer CLI: classify reasoning-engine output and check knowledge documents.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use metta_infer::classify::Classifier;
use metta_infer::config::InferenceConfig;
use metta_infer::knowledge::{ValidationReport, read_document};
use metta_infer::resolver::{DescriptionTemplates, EntityResolver};

#[derive(Parser)]
#[command(name = "metta-infer", version, about = "Semantic analysis of MeTTa inference output")]
struct Cli {
    /// Inference config (TOML, or JSON for a .json path) overlaying the built-in tables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify engine output into propositions, contradictions, conflicts,
    /// violations, and compliances.
    Analyze {
        /// Engine output file, or `-` for stdin.
        input: PathBuf,
    },

    /// Validate the eventualities and entities of a knowledge document.
    Validate {
        /// Knowledge document (.metta).
        file: PathBuf,
    },

    /// Print the canonical rendering of a knowledge document.
    Normalize {
        /// Knowledge document (.metta).
        file: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => InferenceConfig::load(path)?,
        None => InferenceConfig::default(),
    };

    match cli.command {
        Commands::Analyze { input } => {
            let resolver = EntityResolver::with_config(&config)?;
            let templates = DescriptionTemplates::with_config(&config);
            let output = read_input(&input)?;
            analyze(&Classifier::new(&resolver, &templates), &output);
        }

        Commands::Validate { file } => {
            let (doc, diagnostics) = read_document(&file)?;
            for diagnostic in &diagnostics {
                eprintln!("warning: {diagnostic}");
            }
            let report = ValidationReport::of(&doc.knowledge);
            if report.is_valid() {
                println!(
                    "{}: {} eventualities, {} entities, no errors",
                    file.display(),
                    doc.knowledge.eventualities.len(),
                    doc.knowledge.entities.len()
                );
            } else {
                for error in report.errors() {
                    println!("error: {error}");
                }
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Normalize { file } => {
            let (doc, diagnostics) = read_document(&file)?;
            for diagnostic in &diagnostics {
                eprintln!("warning: {diagnostic}");
            }
            print!("{doc}");
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).into_diagnostic()?;
        return Ok(text);
    }
    std::fs::read_to_string(input).into_diagnostic()
}

fn analyze(classifier: &Classifier<'_>, output: &str) {
    let result = classifier.analyze(output);
    for diagnostic in &result.diagnostics {
        eprintln!("warning: {diagnostic}");
    }
    let metrics = result.to_metrics(classifier.resolver(), classifier.templates());

    println!("Inferred facts ({}):", metrics.inferred_facts);
    for fact in &metrics.inferred_state_of_affairs {
        println!("  {fact}");
    }
    println!("Contradictions ({}):", metrics.contradictions);
    for detail in &metrics.contradiction_details {
        println!("  [{}] {}", detail.kind, detail.description);
    }
    println!("Conflicts ({}):", metrics.conflicts);
    for detail in &metrics.conflict_details {
        println!("  {}", detail.description);
    }
    println!("Violations ({}):", metrics.violations);
    for detail in &metrics.violation_details {
        println!("  {}", detail.description);
    }
    println!("Compliances ({}):", metrics.compliances);
    for detail in &metrics.compliance_details {
        println!("  {}", detail.description);
    }
    println!("Total: {}", metrics.total());
}
