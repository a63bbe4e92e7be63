//! Score a file of raw input records offline
//!
//! Reads one JSON object per line, runs every record through the same
//! pipeline the server uses (in parallel with Rayon) and writes one JSON
//! line per record to stdout:
//!
//!   {"line": 3, "prediction": 2771.46}
//!   {"line": 4, "error": "unknown state 'Atlantis'"}
//!
//! Usage:
//!   cargo run --bin predict_batch -- records.jsonl [--mode manual|assisted]
//!
//! Artifacts are located through the same environment variables as the
//! server (`ARTIFACT_DIR`, `SCALER_FILE`, `MODEL_FILE`); `--mode` overrides
//! `INPUT_MODE`.

use anyhow::{Context, Result};
use crop_yield_predictor::{Artifacts, InputMode, RawInput, ServerConfig, YieldPipeline};
use rayon::prelude::*;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Serialize)]
struct BatchRow {
    line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    prediction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn parse_args() -> Result<(String, Option<InputMode>)> {
    let mut args = std::env::args().skip(1);
    let mut path = None;
    let mut mode = None;

    while let Some(arg) = args.next() {
        if arg == "--mode" {
            let value = args.next().context("--mode needs a value")?;
            mode = Some(value.parse::<InputMode>()?);
        } else if path.is_none() {
            path = Some(arg);
        } else {
            anyhow::bail!("Unexpected argument '{}'", arg);
        }
    }

    let path = path.context("Usage: predict_batch <records.jsonl> [--mode manual|assisted]")?;
    Ok((path, mode))
}

fn score_line(pipeline: &YieldPipeline, line: usize, text: &str) -> BatchRow {
    let result = serde_json::from_str::<RawInput>(text)
        .map_err(|e| format!("invalid record: {}", e))
        .and_then(|input| pipeline.predict(&input).map_err(|e| e.to_string()));

    match result {
        Ok(prediction) => BatchRow { line, prediction: Some(prediction.kg_per_ha), error: None },
        Err(error) => BatchRow { line, prediction: None, error: Some(error) },
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crop_yield_predictor=info,warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let (path, mode) = parse_args()?;
    let mut config = ServerConfig::from_env()?;
    if let Some(mode) = mode {
        config.input_mode = mode;
    }

    let artifacts = Artifacts::load(&config.scaler_path(), &config.model_path())?;
    let pipeline = YieldPipeline::new(artifacts, config.input_mode)?;

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read records file: {}", path))?;

    let start = Instant::now();
    let records: Vec<(usize, &str)> = contents
        .lines()
        .enumerate()
        .map(|(idx, text)| (idx + 1, text))
        .filter(|(_, text)| !text.trim().is_empty())
        .collect();

    let rows: Vec<BatchRow> = records
        .par_iter()
        .map(|&(line, text)| score_line(&pipeline, line, text))
        .collect();

    let failed = rows.iter().filter(|r| r.error.is_some()).count();
    tracing::info!(
        "Scored {} records ({} failed) in {:?}",
        rows.len(),
        failed,
        start.elapsed()
    );

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for row in &rows {
        serde_json::to_writer(&mut out, row)?;
        writeln!(out)?;
    }
    out.flush()?;

    Ok(())
}
