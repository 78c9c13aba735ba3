use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;

use tenderwatch::providers::{HashingTfEmbedder, StaticTextExtractor};
use tenderwatch::{AnalysisConfig, AnalysisRequest, Pipeline, Providers};

/// Analysis request file: the library request plus inline document texts
/// standing in for a PDF extraction backend
#[derive(Debug, Deserialize)]
struct RequestFile {
    #[serde(flatten)]
    request: AnalysisRequest,

    /// Document handle to its text content
    #[serde(default)]
    document_texts: BTreeMap<String, String>,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let options = parse_args(&args);

    let input = options
        .input
        .context("missing required --input <FILE> argument")?;
    let raw = std::fs::read_to_string(&input)
        .with_context(|| format!("failed to read request file {input}"))?;
    let file: RequestFile =
        serde_json::from_str(&raw).with_context(|| format!("invalid request JSON in {input}"))?;

    let providers = Providers {
        extractor: Arc::new(StaticTextExtractor::new(file.document_texts)),
        embedder: Some(Arc::new(HashingTfEmbedder::default())),
        tagger: None,
        summarizer: None,
    };

    let pipeline = Pipeline::new(providers, AnalysisConfig::default())?;
    let state = pipeline.run(file.request)?;

    if options.report {
        println!("{}", tenderwatch::report::render_findings_markdown(&state));
    } else if options.pretty {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        println!("{}", serde_json::to_string(&state)?);
    }

    Ok(())
}

#[derive(Debug, Default)]
struct Options {
    input: Option<String>,
    pretty: bool,
    report: bool,
}

/// Parse command-line arguments
fn parse_args(args: &[String]) -> Options {
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--input" | "-i" => {
                if i + 1 < args.len() {
                    options.input = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--pretty" => options.pretty = true,
            "--report" => options.report = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    options
}

/// Print usage information
fn print_usage() {
    println!("tenderwatch - collusion risk screening for procurement tenders");
    println!();
    println!("USAGE:");
    println!("    tenderwatch --input <FILE> [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --input, -i <FILE>  Analysis request JSON file (required)");
    println!("    --pretty            Pretty-print the resulting state as JSON");
    println!("    --report            Print a markdown findings report instead of JSON");
    println!("    --help, -h          Print this help message");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    RUST_LOG            Logging level (default: info)");
    println!();
    println!("REQUEST FILE:");
    println!("    {{");
    println!("      \"tender_id\": \"T-2024-017\",");
    println!("      \"tender_description\": \"Road resurfacing, lot 3\",");
    println!("      \"bidders\": [");
    println!("        {{\"bidder_id\": \"b1\", \"name\": \"Acme\", \"bid_amount\": 100000,");
    println!("         \"documents\": [\"acme_offer.pdf\"],");
    println!("         \"contact\": {{\"email\": \"bids@acme.example\"}}}}");
    println!("      ],");
    println!("      \"documents\": [\"acme_offer.pdf\"],");
    println!("      \"document_texts\": {{\"acme_offer.pdf\": \"...extracted text...\"}}");
    println!("    }}");
}
