//! Batch classification of a document corpus.
//!
//! Reads documents from a JSON file (an object mapping document id to text)
//! or from a directory of `.txt` files (file stem as the id), classifies each
//! one, and writes a TSV report to stdout. Connection and pipeline settings
//! come from the same environment variables as the server.
//!
//! Usage:
//!   classify_corpus --input corpus.json > report.tsv
//!   classify_corpus --input ./documents/ > report.tsv

use std::{collections::BTreeMap, path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result, bail};
use tracing::info;

use sdg_worker::{app::ComponentRegistry, config::Config, goals::score_column};

struct Args {
    input: PathBuf,
}

fn parse_args() -> Result<Option<Args>> {
    let mut input = None;
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--input" => {
                let value = iter.next().context("--input requires a path")?;
                input = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                eprintln!("usage: classify_corpus --input <corpus.json | directory>");
                return Ok(None);
            }
            other => bail!("unknown argument: {other}"),
        }
    }
    let input = input.context("--input is required")?;
    Ok(Some(Args { input }))
}

/// Loads the corpus as ordered `(id, text)` pairs.
fn load_corpus(input: &PathBuf) -> Result<Vec<(String, String)>> {
    if input.is_dir() {
        let mut documents = BTreeMap::new();
        for entry in std::fs::read_dir(input)
            .with_context(|| format!("failed to read directory {}", input.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            let id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .with_context(|| format!("non-UTF-8 file name: {}", path.display()))?
                .to_string();
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            documents.insert(id, text);
        }
        Ok(documents.into_iter().collect())
    } else {
        let raw = std::fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?;
        let parsed: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&raw).context("corpus file must be a JSON object")?;
        parsed
            .into_iter()
            .map(|(id, value)| match value {
                serde_json::Value::String(text) => Ok((id, text)),
                _ => bail!("document {id} must map to a string"),
            })
            .collect()
    }
}

fn tsv_header() -> String {
    let mut columns = vec![
        "id".to_string(),
        "parsing_error".to_string(),
        "num_chunks".to_string(),
        "num_valid_chunks".to_string(),
        "document_top_sdg".to_string(),
    ];
    columns.extend((0..sdg_worker::goals::GOAL_COUNT).map(score_column));
    columns.join("\t")
}

async fn run(args: Args) -> Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    let registry = ComponentRegistry::build(config).map(Arc::new)?;

    let corpus = load_corpus(&args.input)?;
    info!(documents = corpus.len(), input = %args.input.display(), "classifying corpus");

    println!("{}", tsv_header());
    for (id, text) in &corpus {
        let report = registry.pipeline().classify(id, text).await?;
        let mut fields = vec![
            report.id.clone(),
            report.parsing_error.to_string(),
            report.num_chunks.to_string(),
            report.num_valid_chunks.to_string(),
            report.top_goal.to_string(),
        ];
        fields.extend(report.scores.iter().map(|score| format!("{score:.4}")));
        println!("{}", fields.join("\t"));
    }

    info!(documents = corpus.len(), "corpus classified");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => return ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
