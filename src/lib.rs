pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod filter;
pub mod harness;
pub mod report;

pub use config::Config;
pub use error::{DeriveError, Result};
pub use evaluator::{derive, evaluate, Rule, RulePreset, Strategy};
pub use harness::{check_equivalence, first_mismatch, run_strategies, speedup_percent, Mismatch, RunRecord};
