//! Synthetic benchmarking fixture.
//!
//! Builds a DataFrame with a fixed schema (`column`, `othercolumn`, `color`)
//! and randomized content. `newcolumn` is left for the evaluator to attach.

use log::{debug, info};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::error::Result;

pub const COLUMN: &str = "column";
pub const OTHERCOLUMN: &str = "othercolumn";
pub const COLOR: &str = "color";
pub const NEWCOLUMN: &str = "newcolumn";

/// Generate a dataset of `config.row_count` rows.
///
/// `column` values are sampled with replacement from a pool of
/// `candidate_count` labels, `exclusion_count` of which are replaced by the
/// exclusion sentinel first. Values are only reproducible when a seed is set.
pub fn generate(config: &Config) -> Result<DataFrame> {
    config.validate()?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut pool: Vec<String> = (0..config.candidate_count).map(|i| i.to_string()).collect();
    let excluded = rand::seq::index::sample(&mut rng, config.candidate_count, config.exclusion_count);
    for idx in excluded.iter() {
        pool[idx] = config.exclude_sentinel.clone();
    }
    debug!(
        "Candidate pool: {} labels, {} replaced by '{}'",
        pool.len(),
        config.exclusion_count,
        config.exclude_sentinel
    );

    let n = config.row_count;
    let column: Vec<&str> = (0..n)
        .map(|_| pool[rng.gen_range(0..pool.len())].as_str())
        .collect();

    let (lo, hi) = config.value_range;
    let othercolumn: Vec<i64> = (0..n).map(|_| rng.gen_range(lo..=hi)).collect();

    let color: Vec<&str> = (0..n)
        .map(|_| config.color_labels[rng.gen_range(0..config.color_labels.len())].as_str())
        .collect();

    let df = df!(
        COLUMN => column,
        OTHERCOLUMN => othercolumn,
        COLOR => color
    )?;

    info!("Generated dataset: {} rows × {} cols", df.height(), df.width());
    Ok(df)
}

/// Build a dataset from explicit `(column, othercolumn)` pairs.
///
/// `color` is filled with a single placeholder label since no computation reads it.
pub fn from_rows(rows: &[(Option<&str>, Option<i64>)]) -> Result<DataFrame> {
    let column: Vec<Option<&str>> = rows.iter().map(|(c, _)| *c).collect();
    let othercolumn: Vec<Option<i64>> = rows.iter().map(|(_, v)| *v).collect();
    let color: Vec<&str> = vec!["none"; rows.len()];

    Ok(df!(
        COLUMN => column,
        OTHERCOLUMN => othercolumn,
        COLOR => color
    )?)
}
