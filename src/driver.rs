//! Driver - inserts a key sequence and reports the in-order sequence
//! after every step.
//!
//! Keys come from the caller or from a CSV file with a `key` column.
//! Each step is recorded as a [`StepRecord`] and written either as one
//! plain line per step or as CSV trace rows.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::arena::Key;
use crate::color::Color;
use crate::tree::{InsertOutcome, RbTree};
use crate::validate::InvariantViolation;

/// Keys inserted when none are supplied
pub const DEFAULT_SCENARIO: [Key; 6] = [0, 1, 6, 3, 2, 4];

/// Errors that can occur while running the driver
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The tree failed validation; this is a rebalancing bug
    #[error("invariant violated at step {step} (key {key}): {source}")]
    Invariant {
        step: usize,
        key: Key,
        #[source]
        source: InvariantViolation,
    },
}

/// How step records are written
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One bracketed in-order sequence per line
    #[default]
    Text,
    /// CSV rows with a header
    Csv,
}

/// Driver settings
#[derive(Clone, Debug)]
pub struct DriverConfig {
    pub keys: Vec<Key>,
    pub format: OutputFormat,
    /// Validate the whole tree after every step
    pub check: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            keys: DEFAULT_SCENARIO.to_vec(),
            format: OutputFormat::Text,
            check: true,
        }
    }
}

/// Tree state right after one insertion
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// 1-based step number
    pub step: usize,
    pub key: Key,
    pub outcome: InsertOutcome,
    pub len: usize,
    pub height: usize,
    pub root_key: Option<Key>,
    pub root_color: Option<Color>,
    /// Ascending keys after this step
    pub sequence: Vec<Key>,
}

/// Flat CSV form of a [`StepRecord`]
#[derive(Serialize)]
struct TraceRow {
    step: usize,
    key: Key,
    outcome: InsertOutcome,
    len: usize,
    height: usize,
    root_key: Option<Key>,
    root_color: Option<Color>,
    sequence: String,
}

impl From<&StepRecord> for TraceRow {
    fn from(record: &StepRecord) -> Self {
        let sequence = record
            .sequence
            .iter()
            .map(Key::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            step: record.step,
            key: record.key,
            outcome: record.outcome,
            len: record.len,
            height: record.height,
            root_key: record.root_key,
            root_color: record.root_color,
            sequence,
        }
    }
}

#[derive(Deserialize)]
struct KeyRow {
    key: Key,
}

// ============================================================================
// Input
// ============================================================================

/// Read keys from CSV with a `key` header column.
pub fn load_keys<R: Read>(reader: R) -> Result<Vec<Key>, DriverError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut keys = Vec::new();
    for row in reader.deserialize::<KeyRow>() {
        keys.push(row?.key);
    }
    Ok(keys)
}

pub fn load_keys_file(path: &Path) -> Result<Vec<Key>, DriverError> {
    let file = File::open(path)?;
    let keys = load_keys(file)?;
    info!(path = %path.display(), count = keys.len(), "loaded keys");
    Ok(keys)
}

// ============================================================================
// Execution
// ============================================================================

/// Insert `keys` one at a time, recording the tree after each insertion.
///
/// # Errors
/// With `check` set, returns [`DriverError::Invariant`] at the first
/// step that leaves the tree invalid.
pub fn run_scenario(
    tree: &mut RbTree,
    keys: &[Key],
    check: bool,
) -> Result<Vec<StepRecord>, DriverError> {
    let mut records = Vec::with_capacity(keys.len());

    for (i, &key) in keys.iter().enumerate() {
        let step = i + 1;
        let outcome = tree.insert(key);

        if check {
            tree.validate()
                .map_err(|source| DriverError::Invariant { step, key, source })?;
        }

        let root = tree.root();
        let record = StepRecord {
            step,
            key,
            outcome,
            len: tree.len(),
            height: tree.height(),
            root_key: root.map(|(k, _)| k),
            root_color: root.map(|(_, c)| c),
            sequence: tree.in_order_sequence(),
        };
        debug!(step, key, ?outcome, height = record.height, "step");
        records.push(record);
    }

    Ok(records)
}

/// Run the configured scenario and write every step to `out`.
pub fn run<W: Write>(config: &DriverConfig, out: W) -> Result<RbTree, DriverError> {
    let mut tree = RbTree::with_capacity(config.keys.len().min(u32::MAX as usize - 1) as u32);
    let records = run_scenario(&mut tree, &config.keys, config.check)?;

    match config.format {
        OutputFormat::Text => write_text(out, &records)?,
        OutputFormat::Csv => write_csv(out, &records)?,
    }

    info!(
        steps = records.len(),
        len = tree.len(),
        height = tree.height(),
        "scenario complete"
    );
    Ok(tree)
}

// ============================================================================
// Output
// ============================================================================

pub fn write_text<W: Write>(mut out: W, records: &[StepRecord]) -> Result<(), DriverError> {
    for record in records {
        writeln!(out, "{:?}", record.sequence)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_csv<W: Write>(out: W, records: &[StepRecord]) -> Result<(), DriverError> {
    let mut writer = csv::Writer::from_writer(out);
    for record in records {
        writer.serialize(TraceRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}
