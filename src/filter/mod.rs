//! Order-preserving row filters.

use polars::prelude::*;
use regex::Regex;

use crate::error::{DeriveError, Result};

/// Keep the rows where `mask` is true. Null mask entries drop the row.
pub fn filter_rows(df: &DataFrame, mask: &BooleanChunked) -> Result<DataFrame> {
    if mask.len() != df.height() {
        return Err(DeriveError::InvalidConfig(format!(
            "mask has {} entries but the dataset has {} rows",
            mask.len(),
            df.height()
        )));
    }
    Ok(df.filter(mask)?)
}

/// Keep the rows whose text in `column` contains any of `words`.
///
/// Words match literally. Null text never matches, and an empty word list
/// keeps nothing.
pub fn keep_matching(df: &DataFrame, column: &str, words: &[&str]) -> Result<DataFrame> {
    let series = df
        .column(column)
        .map_err(|_| DeriveError::ColumnNotFound(column.to_string()))?
        .as_materialized_series();
    let text = series.str().map_err(|_| DeriveError::TypeMismatch {
        column: column.to_string(),
        expected: "String".to_string(),
        got: format!("{:?}", series.dtype()),
    })?;

    let mask: BooleanChunked = if words.is_empty() {
        BooleanChunked::full(PlSmallStr::from("mask"), false, df.height())
    } else {
        let pattern = words
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|");
        let re = Regex::new(&pattern)?;
        text.into_iter()
            .map(|opt| opt.map_or(false, |s| re.is_match(s)))
            .collect()
    };

    filter_rows(df, &mask)
}

/// Keep the rows where columns `a` and `b` hold different values.
///
/// A null differs from any value, and two nulls are equal.
pub fn keep_differing(df: &DataFrame, a: &str, b: &str) -> Result<DataFrame> {
    let left = df
        .column(a)
        .map_err(|_| DeriveError::ColumnNotFound(a.to_string()))?
        .as_materialized_series();
    let right = df
        .column(b)
        .map_err(|_| DeriveError::ColumnNotFound(b.to_string()))?
        .as_materialized_series();

    let mask = left.not_equal_missing(right)?;
    filter_rows(df, &mask)
}
