pub mod rule;

use log::debug;
use polars::prelude::*;
use std::fmt;
use std::str::FromStr;

use crate::dataset::{COLUMN, NEWCOLUMN, OTHERCOLUMN};
use crate::error::{DeriveError, Result};

pub use rule::{Branch, CmpOp, Rule, RulePreset};

/// The four interchangeable ways of computing `newcolumn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Visit rows by index with ordinary branching
    RowLoop,
    /// Apply the rule as a pure per-row function
    RowMap,
    /// Compose single-condition selections, one pass per branch
    SingleSelect,
    /// One fused multi-condition selection
    MultiSelect,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::RowLoop,
        Strategy::RowMap,
        Strategy::SingleSelect,
        Strategy::MultiSelect,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::RowLoop => "row-loop",
            Strategy::RowMap => "row-map",
            Strategy::SingleSelect => "single-select",
            Strategy::MultiSelect => "multi-select",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "row-loop" | "a" | "A" => Ok(Strategy::RowLoop),
            "row-map" | "b" | "B" => Ok(Strategy::RowMap),
            "single-select" | "c" | "C" => Ok(Strategy::SingleSelect),
            "multi-select" | "d" | "D" => Ok(Strategy::MultiSelect),
            other => Err(format!(
                "unknown strategy '{}' (expected row-loop, row-map, single-select or multi-select)",
                other
            )),
        }
    }
}

/// The two input columns, normalized to the types the rule works on.
pub struct Inputs {
    pub column: StringChunked,
    pub othercolumn: Int64Chunked,
}

impl Inputs {
    /// Pull `column` and `othercolumn` out of a dataset.
    ///
    /// Numeric or categorical `column` values are compared by their text form.
    /// `othercolumn` must be an integer type.
    pub fn extract(df: &DataFrame) -> Result<Self> {
        let column = df
            .column(COLUMN)
            .map_err(|_| DeriveError::ColumnNotFound(COLUMN.to_string()))?
            .as_materialized_series();
        let othercolumn = df
            .column(OTHERCOLUMN)
            .map_err(|_| DeriveError::ColumnNotFound(OTHERCOLUMN.to_string()))?
            .as_materialized_series();

        use polars::datatypes::DataType as PDT;
        let column = match column.dtype() {
            PDT::String => column.str()?.clone(),
            PDT::Int8
            | PDT::Int16
            | PDT::Int32
            | PDT::Int64
            | PDT::UInt8
            | PDT::UInt16
            | PDT::UInt32
            | PDT::UInt64
            | PDT::Float32
            | PDT::Float64
            | PDT::Boolean
            | PDT::Categorical(_, _)
            | PDT::Null => column.cast(&PDT::String)?.str()?.clone(),
            other => {
                return Err(DeriveError::TypeMismatch {
                    column: COLUMN.to_string(),
                    expected: "text, number or category".to_string(),
                    got: format!("{:?}", other),
                })
            }
        };
        let othercolumn = match othercolumn.dtype() {
            PDT::Int64 => othercolumn.i64()?.clone(),
            PDT::Int8
            | PDT::Int16
            | PDT::Int32
            | PDT::UInt8
            | PDT::UInt16
            | PDT::UInt32
            | PDT::Null => othercolumn.cast(&PDT::Int64)?.i64()?.clone(),
            // values above i64::MAX fail the cast instead of becoming null
            PDT::UInt64 => othercolumn.strict_cast(&PDT::Int64)?.i64()?.clone(),
            other => {
                return Err(DeriveError::TypeMismatch {
                    column: OTHERCOLUMN.to_string(),
                    expected: "integer (floats unsupported)".to_string(),
                    got: format!("{:?}", other),
                })
            }
        };

        Ok(Self { column, othercolumn })
    }

    pub fn len(&self) -> usize {
        self.othercolumn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows the branches apply to: `column` present and not the sentinel.
    fn included_mask(&self, sentinel: &str) -> BooleanChunked {
        let present = self.column.is_not_null();
        let not_sentinel = self.column.not_equal_missing(sentinel);
        &present & &not_sentinel
    }

    /// Rows where `othercolumn` satisfies a branch; a null value never does.
    fn branch_mask(&self, branch: &Branch) -> Result<BooleanChunked> {
        let t = branch.threshold;
        let raw = match branch.op {
            CmpOp::Lt => self.othercolumn.lt(t),
            CmpOp::Le => self.othercolumn.lt_eq(t),
            CmpOp::Eq => self.othercolumn.equal(t),
            CmpOp::Ge => self.othercolumn.gt_eq(t),
            CmpOp::Gt => self.othercolumn.gt(t),
        };
        Ok(raw.fill_null_with_values(false)?)
    }
}

/// Compute `newcolumn` with one strategy and return a copy of `df` carrying it.
///
/// The input frame is never modified and the row count is preserved.
pub fn evaluate(df: &DataFrame, rule: &Rule, strategy: Strategy) -> Result<DataFrame> {
    let values = derive(df, rule, strategy)?;
    let mut out = df.clone();
    out.with_column(values.into_series())?;
    Ok(out)
}

/// Compute `newcolumn` without attaching it.
pub fn derive(df: &DataFrame, rule: &Rule, strategy: Strategy) -> Result<Int64Chunked> {
    rule.validate()?;
    let inputs = Inputs::extract(df)?;

    let values = match strategy {
        Strategy::RowLoop => row_loop(&inputs, rule),
        Strategy::RowMap => row_map(&inputs, rule),
        Strategy::SingleSelect => single_select(&inputs, rule)?,
        Strategy::MultiSelect => multi_select(&inputs, rule)?,
    };

    Ok(values.with_name(PlSmallStr::from(NEWCOLUMN)))
}

/// Strategy A: index every row and branch explicitly.
pub fn row_loop(inputs: &Inputs, rule: &Rule) -> Int64Chunked {
    let n = inputs.len();
    let mut newcolumn: Vec<Option<i64>> = Vec::with_capacity(n);

    for i in 0..n {
        let key = inputs.column.get(i);
        let other = inputs.othercolumn.get(i);

        let value = match (key, other) {
            (Some(k), Some(v)) if k != rule.exclude_sentinel => {
                let mut chosen = v;
                for branch in &rule.branches {
                    if branch.op.holds(v, branch.threshold) {
                        chosen = branch.value;
                        break;
                    }
                }
                Some(chosen)
            }
            _ => other,
        };
        newcolumn.push(value);
    }

    newcolumn.into_iter().collect()
}

/// Strategy B: map the rule over zipped rows.
pub fn row_map(inputs: &Inputs, rule: &Rule) -> Int64Chunked {
    inputs
        .column
        .into_iter()
        .zip(inputs.othercolumn.into_iter())
        .map(|(key, other)| rule.apply(key, other))
        .collect()
}

/// Strategy C: one single-condition selection per branch.
///
/// Each pass selects between the branch value and the output of all prior
/// passes, and only writes rows no earlier pass has claimed.
pub fn single_select(inputs: &Inputs, rule: &Rule) -> Result<Int64Chunked> {
    let n = inputs.len();
    let name = PlSmallStr::from(NEWCOLUMN);
    let included = inputs.included_mask(&rule.exclude_sentinel);

    let mut claimed = BooleanChunked::full(name.clone(), false, n);
    let mut result = inputs.othercolumn.clone();

    for (pass, branch) in rule.branches.iter().enumerate() {
        let unclaimed = !&claimed;
        let hits = &(&included & &inputs.branch_mask(branch)?) & &unclaimed;
        let value = Int64Chunked::full(name.clone(), branch.value, n);

        result = value.zip_with(&hits, &result)?;
        claimed = &claimed | &hits;

        debug!(
            "single-select pass {}: othercolumn {} {} -> {} ({} rows)",
            pass + 1,
            branch.op.symbol(),
            branch.threshold,
            branch.value,
            hits.sum().unwrap_or(0)
        );
    }

    Ok(result)
}

/// Strategy D: a single `when/then/otherwise` chain evaluated by the lazy engine.
pub fn multi_select(inputs: &Inputs, rule: &Rule) -> Result<Int64Chunked> {
    let frame = DataFrame::new(vec![
        inputs.column.clone().with_name(PlSmallStr::from(COLUMN)).into_series().into(),
        inputs
            .othercolumn
            .clone()
            .with_name(PlSmallStr::from(OTHERCOLUMN))
            .into_series()
            .into(),
    ])?;

    let included = col(COLUMN)
        .is_not_null()
        .and(col(COLUMN).neq_missing(lit(rule.exclude_sentinel.as_str())));

    let conditions: Vec<(Expr, i64)> = rule
        .branches
        .iter()
        .map(|b| (included.clone().and(branch_expr(b)), b.value))
        .collect();

    let mut pairs = conditions.into_iter();
    let (first_cond, first_value) = pairs.next().ok_or_else(|| {
        DeriveError::InvalidRule("rule needs at least one branch".to_string())
    })?;
    let head = when(first_cond).then(lit(first_value));

    let selection = match pairs.next() {
        None => head.otherwise(col(OTHERCOLUMN)),
        Some((cond, value)) => {
            let mut chain = head.when(cond).then(lit(value));
            for (cond, value) in pairs {
                chain = chain.when(cond).then(lit(value));
            }
            chain.otherwise(col(OTHERCOLUMN))
        }
    };

    debug!("multi-select: {} conditions in one pass", rule.branches.len());

    let out = frame
        .lazy()
        .select([selection.cast(DataType::Int64).alias(NEWCOLUMN)])
        .collect()?;

    Ok(out
        .column(NEWCOLUMN)?
        .as_materialized_series()
        .i64()?
        .clone())
}

fn branch_expr(branch: &Branch) -> Expr {
    let other = col(OTHERCOLUMN);
    let t = lit(branch.threshold);
    match branch.op {
        CmpOp::Lt => other.lt(t),
        CmpOp::Le => other.lt_eq(t),
        CmpOp::Eq => other.eq(t),
        CmpOp::Ge => other.gt_eq(t),
        CmpOp::Gt => other.gt(t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::from_rows;

    fn values(ca: &Int64Chunked) -> Vec<Option<i64>> {
        ca.into_iter().collect()
    }

    fn scenario() -> DataFrame {
        from_rows(&[
            (Some("Dropout"), Some(30)),
            (Some("X"), Some(70)),
            (Some("X"), Some(40)),
            (Some("X"), Some(50)),
        ])
        .unwrap()
    }

    #[test]
    fn test_scenario_all_strategies() {
        let df = scenario();
        let rule = Rule::split("Dropout", 50);
        for strategy in Strategy::ALL {
            let got = derive(&df, &rule, strategy).unwrap();
            assert_eq!(
                values(&got),
                vec![Some(30), Some(100), Some(0), Some(100)],
                "strategy {}",
                strategy
            );
        }
    }

    #[test]
    fn test_evaluate_attaches_column() {
        let df = scenario();
        let out = evaluate(&df, &Rule::split("Dropout", 50), Strategy::MultiSelect).unwrap();
        assert_eq!(out.height(), df.height());
        assert_eq!(out.width(), df.width() + 1);
        assert!(out.column(NEWCOLUMN).is_ok());
        assert!(df.column(NEWCOLUMN).is_err());
    }

    #[test]
    fn test_nulls_agree_across_strategies() {
        let df = from_rows(&[
            (None, Some(90)),
            (Some("X"), None),
            (None, None),
            (Some("Dropout"), None),
            (Some("Y"), Some(10)),
        ])
        .unwrap();
        let rule = Rule::three_way("Dropout", 50);
        let expected = vec![Some(90), None, None, None, Some(0)];
        for strategy in Strategy::ALL {
            assert_eq!(values(&derive(&df, &rule, strategy).unwrap()), expected, "{}", strategy);
        }
    }

    #[test]
    fn test_overlapping_branches_first_match() {
        let df = from_rows(&[(Some("X"), Some(15)), (Some("X"), Some(5)), (Some("X"), Some(-3))]).unwrap();
        let rule = Rule {
            exclude_sentinel: "Dropout".to_string(),
            branches: vec![Branch::new(CmpOp::Ge, 10, 1), Branch::new(CmpOp::Ge, 0, 2)],
        };
        for strategy in Strategy::ALL {
            assert_eq!(
                values(&derive(&df, &rule, strategy).unwrap()),
                vec![Some(1), Some(2), Some(-3)],
                "{}",
                strategy
            );
        }
    }

    #[test]
    fn test_single_branch_rule() {
        let df = scenario();
        let rule = Rule {
            exclude_sentinel: "Dropout".to_string(),
            branches: vec![Branch::new(CmpOp::Gt, 60, 1)],
        };
        for strategy in Strategy::ALL {
            assert_eq!(
                values(&derive(&df, &rule, strategy).unwrap()),
                vec![Some(30), Some(1), Some(40), Some(50)],
                "{}",
                strategy
            );
        }
    }

    #[test]
    fn test_missing_othercolumn_is_fatal() {
        let df = df!("column" => &["X"], "color" => &["red"]).unwrap();
        let err = derive(&df, &Rule::split("Dropout", 50), Strategy::RowLoop).unwrap_err();
        assert!(matches!(err, DeriveError::ColumnNotFound(ref c) if c == OTHERCOLUMN));
    }

    #[test]
    fn test_float_othercolumn_rejected() {
        let df = df!("column" => &["X"], "othercolumn" => &[1.5f64]).unwrap();
        let err = derive(&df, &Rule::split("Dropout", 50), Strategy::RowMap).unwrap_err();
        match err {
            DeriveError::TypeMismatch { column, expected, .. } => {
                assert_eq!(column, OTHERCOLUMN);
                assert!(expected.contains("floats unsupported"), "{}", expected);
            }
            other => panic!("expected TypeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_u64_othercolumn_widened() {
        let df = df!("column" => &["X", "X", "Dropout"], "othercolumn" => &[60u64, 10, 7]).unwrap();
        for strategy in Strategy::ALL {
            assert_eq!(
                values(&derive(&df, &Rule::split("Dropout", 50), strategy).unwrap()),
                vec![Some(100), Some(0), Some(7)],
                "{}",
                strategy
            );
        }
    }

    #[test]
    fn test_u64_othercolumn_overflow_fails() {
        let df = df!("column" => &["X"], "othercolumn" => &[u64::MAX]).unwrap();
        let err = derive(&df, &Rule::split("Dropout", 50), Strategy::RowLoop).unwrap_err();
        assert!(matches!(err, DeriveError::PolarsError(_)), "{:?}", err);
    }

    #[test]
    fn test_numeric_column_compared_as_text() {
        let df = df!("column" => &[1i64, 2], "othercolumn" => &[60i32, 10]).unwrap();
        for strategy in Strategy::ALL {
            assert_eq!(
                values(&derive(&df, &Rule::split("Dropout", 50), strategy).unwrap()),
                vec![Some(100), Some(0)]
            );
        }
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("row-loop".parse::<Strategy>(), Ok(Strategy::RowLoop));
        assert_eq!("D".parse::<Strategy>(), Ok(Strategy::MultiSelect));
        assert!("vectorized".parse::<Strategy>().is_err());
    }
}
