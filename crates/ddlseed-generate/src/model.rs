use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ddlseed_core::DEFAULT_ROW_COUNT;

/// Attempts allowed per row before a uniqueness failure is fatal.
pub const DEFAULT_MAX_ATTEMPTS_ROW: u32 = 10;

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Row count for tables without a `count` directive.
    pub default_rows: u64,
    /// Maximum attempts to build a single row.
    pub max_attempts_row: u32,
    /// Seed for the run's random source; drawn at random when absent.
    pub seed: Option<u64>,
    /// Clock used for temporal values; the wall clock when absent.
    pub reference_time: Option<DateTime<Utc>>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            default_rows: DEFAULT_ROW_COUNT,
            max_attempts_row: DEFAULT_MAX_ATTEMPTS_ROW,
            seed: None,
            reference_time: None,
        }
    }
}

/// Summary of a filled table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableReport {
    pub schema: String,
    pub table: String,
    pub rows_requested: u64,
    pub rows_generated: u64,
    pub retries: u64,
}

/// Report for a fill run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub seed: u64,
    pub tables: Vec<TableReport>,
    pub retries_total: u64,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            tables: Vec::new(),
            retries_total: 0,
            duration_ms: 0,
        }
    }

    pub fn rows_total(&self) -> u64 {
        self.tables.iter().map(|table| table.rows_generated).sum()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
