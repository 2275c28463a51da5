//! Times each strategy against a fresh copy of the dataset.

use log::info;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::{DeriveError, Result};
use crate::evaluator::{self, Rule, Strategy};

/// Outcome of one timed strategy run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub strategy_name: String,
    /// Wall-clock seconds
    pub elapsed: f64,
    /// Relative to the strategy run immediately before; absent for the first
    pub speedup_percent: Option<f64>,
}

/// `(previous - current) / previous * 100`. Positive means `current` was faster.
pub fn speedup_percent(previous: f64, current: f64) -> Option<f64> {
    if previous > 0.0 {
        Some((previous - current) / previous * 100.0)
    } else {
        None
    }
}

/// Run each strategy in order and time it.
///
/// Every run starts from its own copy of `df`. Returns the records and the
/// frame produced by the last strategy.
pub fn run_strategies(
    df: &DataFrame,
    rule: &Rule,
    strategies: &[Strategy],
) -> Result<(Vec<RunRecord>, Option<DataFrame>)> {
    let mut records: Vec<RunRecord> = Vec::with_capacity(strategies.len());
    let mut last = None;
    let mut previous: Option<f64> = None;

    for &strategy in strategies {
        let input = df.clone();

        let start = Instant::now();
        let out = evaluator::evaluate(&input, rule, strategy)?;
        let elapsed = start.elapsed().as_secs_f64();

        if out.height() != input.height() {
            return Err(DeriveError::RowCountChanged {
                strategy: strategy.name().to_string(),
                before: input.height(),
                after: out.height(),
            });
        }

        let speedup = previous.and_then(|prev| speedup_percent(prev, elapsed));
        info!("{} finished in {:.6}s", strategy, elapsed);

        records.push(RunRecord {
            strategy_name: strategy.name().to_string(),
            elapsed,
            speedup_percent: speedup,
        });
        previous = Some(elapsed);
        last = Some(out);
    }

    Ok((records, last))
}

/// First row where a strategy disagrees with the row loop.
///
/// When the columns differ in length, `row` is the first row present in only
/// one of them and the missing side reads as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub strategy: Strategy,
    pub row: usize,
    pub expected: Option<i64>,
    pub got: Option<i64>,
}

/// Compare a strategy's output with the reference, row by row.
pub fn first_mismatch(
    strategy: Strategy,
    reference: &[Option<i64>],
    got: &[Option<i64>],
) -> Option<Mismatch> {
    let rows = reference.len().max(got.len());
    (0..rows)
        .find(|&row| reference.get(row) != got.get(row))
        .map(|row| Mismatch {
            strategy,
            row,
            expected: reference.get(row).copied().flatten(),
            got: got.get(row).copied().flatten(),
        })
}

/// Evaluate every strategy and compare each against [`Strategy::RowLoop`].
pub fn check_equivalence(df: &DataFrame, rule: &Rule) -> Result<Option<Mismatch>> {
    let reference: Vec<Option<i64>> = evaluator::derive(df, rule, Strategy::RowLoop)?
        .into_iter()
        .collect();

    for strategy in Strategy::ALL.into_iter().skip(1) {
        let got: Vec<Option<i64>> = evaluator::derive(df, rule, strategy)?.into_iter().collect();
        if let Some(mismatch) = first_mismatch(strategy, &reference, &got) {
            return Ok(Some(mismatch));
        }
    }

    Ok(None)
}
