use crate::error::{DeriveError, Result};

pub const DEFAULT_ROW_COUNT: usize = 50_000;
pub const DEFAULT_THRESHOLD: i64 = 50;
pub const DEFAULT_SENTINEL: &str = "Dropout";
pub const DEFAULT_VALUE_RANGE: (i64, i64) = (20, 80);
pub const DEFAULT_COLORS: [&str; 5] = ["red", "green", "blue", "yellow", "purple"];
pub const DEFAULT_CANDIDATES: usize = 100;
pub const DEFAULT_EXCLUSIONS: usize = 2;

/// Inputs shared by the dataset generator and the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of rows in the generated dataset
    pub row_count: usize,
    /// Cutoff on `othercolumn` separating the branches of the rule
    pub threshold: i64,
    /// Value of `column` that routes a row to the fallback branch
    pub exclude_sentinel: String,
    /// Inclusive bounds for `othercolumn` sampling
    pub value_range: (i64, i64),
    pub color_labels: Vec<String>,
    /// Size of the pool `column` values are drawn from
    pub candidate_count: usize,
    /// How many pool entries are replaced by the sentinel
    pub exclusion_count: usize,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            row_count: DEFAULT_ROW_COUNT,
            threshold: DEFAULT_THRESHOLD,
            exclude_sentinel: DEFAULT_SENTINEL.to_string(),
            value_range: DEFAULT_VALUE_RANGE,
            color_labels: DEFAULT_COLORS.iter().map(|s| s.to_string()).collect(),
            candidate_count: DEFAULT_CANDIDATES,
            exclusion_count: DEFAULT_EXCLUSIONS,
            seed: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let (lo, hi) = self.value_range;
        if lo > hi {
            return Err(DeriveError::InvalidConfig(format!(
                "value range {}..={} is empty",
                lo, hi
            )));
        }
        if self.color_labels.is_empty() {
            return Err(DeriveError::InvalidConfig(
                "at least one color label is required".to_string(),
            ));
        }
        if self.candidate_count == 0 {
            return Err(DeriveError::InvalidConfig(
                "candidate pool must not be empty".to_string(),
            ));
        }
        if self.exclusion_count > self.candidate_count {
            return Err(DeriveError::InvalidConfig(format!(
                "cannot exclude {} of {} candidates",
                self.exclusion_count, self.candidate_count
            )));
        }
        if self.exclude_sentinel.is_empty() {
            return Err(DeriveError::InvalidConfig(
                "exclusion sentinel must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
