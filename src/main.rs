use clap::Parser;
use colored::*;
use derived_column::config::{self, Config};
use derived_column::error::Result;
use derived_column::{dataset, report, run_strategies, RulePreset, Strategy};
use polars::prelude::*;

#[derive(Parser)]
#[command(name = "dcol")]
#[command(about = "Derived Column - compare row-wise and vectorized evaluation", long_about = None)]
#[command(version)]
struct Cli {
    /// Number of rows to generate
    #[arg(short = 'n', long, default_value_t = config::DEFAULT_ROW_COUNT)]
    rows: usize,

    /// Cutoff on othercolumn
    #[arg(short, long, default_value_t = config::DEFAULT_THRESHOLD)]
    threshold: i64,

    /// Value of column that routes a row to the fallback branch
    #[arg(long, default_value = config::DEFAULT_SENTINEL)]
    sentinel: String,

    /// Lower bound for othercolumn
    #[arg(long, default_value_t = config::DEFAULT_VALUE_RANGE.0, allow_hyphen_values = true)]
    min_value: i64,

    /// Upper bound for othercolumn (inclusive)
    #[arg(long, default_value_t = config::DEFAULT_VALUE_RANGE.1, allow_hyphen_values = true)]
    max_value: i64,

    /// Color labels, comma separated
    #[arg(long, value_delimiter = ',')]
    colors: Option<Vec<String>>,

    /// Random seed for a reproducible dataset
    #[arg(short, long)]
    seed: Option<u64>,

    /// Rule to evaluate: split or three-way
    #[arg(short, long, default_value = "split")]
    rule: RulePreset,

    /// Strategies to run, in order (default: all four)
    #[arg(long = "strategy", value_name = "STRATEGY")]
    strategies: Vec<Strategy>,

    /// Print run records as JSON
    #[arg(long)]
    json: bool,

    /// Write the last evaluated dataset as CSV
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e.display_friendly());
        std::process::exit(if e.is_config_error() { 2 } else { 1 });
    }
}

fn run(cli: Cli) -> Result<()> {
    let defaults = Config::default();
    let config = Config {
        row_count: cli.rows,
        threshold: cli.threshold,
        exclude_sentinel: cli.sentinel,
        value_range: (cli.min_value, cli.max_value),
        color_labels: cli.colors.unwrap_or(defaults.color_labels),
        seed: cli.seed,
        ..defaults
    };

    let df = dataset::generate(&config)?;
    let rule = cli.rule.build(&config.exclude_sentinel, config.threshold);

    if cli.verbose {
        println!(
            "Dataset: {} rows × {} cols, rule: {}",
            df.height(),
            df.width(),
            rule
        );
    }

    let strategies = if cli.strategies.is_empty() {
        Strategy::ALL.to_vec()
    } else {
        cli.strategies
    };

    let (records, last) = run_strategies(&df, &rule, &strategies)?;

    if cli.json {
        println!("{}", report::render_json(&records)?);
    } else {
        print!("{}", report::render(&records));
    }

    if let (Some(output_path), Some(mut out)) = (cli.output, last) {
        let mut file = std::fs::File::create(&output_path)?;
        CsvWriter::new(&mut file).finish(&mut out)?;

        if cli.verbose {
            println!(
                "Output written: {} rows × {} cols to {}",
                out.height(),
                out.width(),
                output_path
            );
        }
    }

    Ok(())
}
