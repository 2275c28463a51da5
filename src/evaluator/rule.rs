use std::fmt;
use std::str::FromStr;

use crate::error::{DeriveError, Result};

/// Comparison of `othercolumn` against a branch threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl CmpOp {
    #[inline]
    pub fn holds(self, value: i64, threshold: i64) -> bool {
        match self {
            CmpOp::Lt => value < threshold,
            CmpOp::Le => value <= threshold,
            CmpOp::Eq => value == threshold,
            CmpOp::Ge => value >= threshold,
            CmpOp::Gt => value > threshold,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Eq => "==",
            CmpOp::Ge => ">=",
            CmpOp::Gt => ">",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub op: CmpOp,
    pub threshold: i64,
    pub value: i64,
}

impl Branch {
    pub fn new(op: CmpOp, threshold: i64, value: i64) -> Self {
        Self { op, threshold, value }
    }
}

/// Piecewise rule for `newcolumn`.
///
/// Branches only apply to rows whose `column` is present and differs from
/// the sentinel. The first matching branch wins; every other row keeps
/// `othercolumn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub exclude_sentinel: String,
    pub branches: Vec<Branch>,
}

impl Rule {
    /// `>= threshold` maps to 100, `< threshold` to 0.
    pub fn split(sentinel: &str, threshold: i64) -> Self {
        Self {
            exclude_sentinel: sentinel.to_string(),
            branches: vec![
                Branch::new(CmpOp::Ge, threshold, 100),
                Branch::new(CmpOp::Lt, threshold, 0),
            ],
        }
    }

    /// `> threshold` maps to 100, `== threshold` to 50, `< threshold` to 0.
    pub fn three_way(sentinel: &str, threshold: i64) -> Self {
        Self {
            exclude_sentinel: sentinel.to_string(),
            branches: vec![
                Branch::new(CmpOp::Gt, threshold, 100),
                Branch::new(CmpOp::Eq, threshold, 50),
                Branch::new(CmpOp::Lt, threshold, 0),
            ],
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.branches.is_empty() {
            return Err(DeriveError::InvalidRule(
                "rule needs at least one branch".to_string(),
            ));
        }
        if self.exclude_sentinel.is_empty() {
            return Err(DeriveError::InvalidRule(
                "exclusion sentinel must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the branches apply to a row. A missing value counts as excluded.
    #[inline]
    pub fn is_included(&self, column: Option<&str>) -> bool {
        matches!(column, Some(c) if c != self.exclude_sentinel)
    }

    /// Evaluate the rule for a single row.
    pub fn apply(&self, column: Option<&str>, othercolumn: Option<i64>) -> Option<i64> {
        if !self.is_included(column) {
            return othercolumn;
        }
        let value = othercolumn?;
        let chosen = self
            .branches
            .iter()
            .find(|b| b.op.holds(value, b.threshold))
            .map_or(value, |b| b.value);
        Some(chosen)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.branches.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "othercolumn {} {} -> {}", b.op.symbol(), b.threshold, b.value)?;
        }
        write!(f, ", else othercolumn (column == '{}')", self.exclude_sentinel)
    }
}

/// Named rules selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulePreset {
    Split,
    ThreeWay,
}

impl RulePreset {
    pub fn build(self, sentinel: &str, threshold: i64) -> Rule {
        match self {
            RulePreset::Split => Rule::split(sentinel, threshold),
            RulePreset::ThreeWay => Rule::three_way(sentinel, threshold),
        }
    }
}

impl FromStr for RulePreset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "split" => Ok(RulePreset::Split),
            "three-way" => Ok(RulePreset::ThreeWay),
            other => Err(format!(
                "unknown rule '{}' (expected 'split' or 'three-way')",
                other
            )),
        }
    }
}
