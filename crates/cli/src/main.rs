//! custdedup CLI
//!
//! Deduplicate, validate, clean and replicate customer tables

mod config;
mod report;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use custdedup_core::{
    replicate, DedupConfig, DedupReport, Deduplicator, KeyNormalization, ReplicationPlan, Table,
};
use custdedup_formats::dates::{self, DEFAULT_DATE_FORMAT};
use custdedup_formats::{open_table, save_table};
use custdedup_validate::{CustomerValidator, TableValidation, ValidatorConfig};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::PipelineConfig;
use report::Summary;

#[derive(Parser)]
#[command(name = "custdedup")]
#[command(version, about = "Customer table deduplication and cleaning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output statistics in JSON format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep one row per customer identity
    Dedup {
        /// Input table (CSV or JSONL, optionally .gz)
        #[arg(short, long)]
        input: PathBuf,

        /// Output table
        #[arg(short, long)]
        output: PathBuf,

        /// Identity column
        #[arg(short, long, default_value = "email")]
        key: String,

        /// Column whose highest value wins among duplicates
        #[arg(short, long, default_value = "total_orders")]
        tie_break: String,

        /// How identity keys are compared
        #[arg(long, value_enum, default_value_t = Normalization::TrimLowercase)]
        normalization: Normalization,

        /// Also write dropped rows to <output stem>.removed.jsonl
        #[arg(long)]
        log_removed: bool,

        /// Show statistics without writing output
        #[arg(long)]
        dry_run: bool,
    },

    /// Check customer records against field rules
    Validate {
        /// Input table
        #[arg(short, long)]
        input: PathBuf,

        /// Validator settings (YAML or TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum number of failing rows to print
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Scale a table out with disjoint ID ranges per copy
    Replicate {
        /// Input table
        #[arg(short, long)]
        input: PathBuf,

        /// Output table
        #[arg(short, long)]
        output: PathBuf,

        /// Number of copies
        #[arg(short, long)]
        factor: usize,

        /// Built-in ID layout
        #[arg(long, value_enum)]
        preset: Option<Preset>,

        /// Integer ID column and stride, as COLUMN=STRIDE
        #[arg(long = "offset", value_parser = parse_offset)]
        offsets: Vec<(String, u64)>,

        /// String ID column to suffix with the copy number
        #[arg(long = "suffix")]
        suffixes: Vec<String>,
    },

    /// Normalize a date column, nulling values that do not parse
    CleanDates {
        /// Input table
        #[arg(short, long)]
        input: PathBuf,

        /// Output table
        #[arg(short, long)]
        output: PathBuf,

        /// Date column
        #[arg(short, long)]
        column: String,

        /// strftime format of the stored dates
        #[arg(short, long, default_value = DEFAULT_DATE_FORMAT)]
        format: String,
    },

    /// Run clean-dates, validate and dedup from a config file
    Pipeline {
        /// Input table
        #[arg(short, long)]
        input: PathBuf,

        /// Output table
        #[arg(short, long)]
        output: PathBuf,

        /// Pipeline config file (YAML or TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Show statistics without writing output
        #[arg(long)]
        dry_run: bool,
    },

    /// Write the default customer pipeline config
    InitConfig {
        /// Destination (.yaml, .yml or .toml)
        #[arg(value_name = "FILE")]
        output: PathBuf,
    },

    /// Print the first rows of a table
    Inspect {
        /// Path to the table
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Number of rows to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Count rows in a table
    Count {
        /// Path to the table
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Normalization {
    Exact,
    Lowercase,
    TrimLowercase,
}

impl From<Normalization> for KeyNormalization {
    fn from(n: Normalization) -> Self {
        match n {
            Normalization::Exact => KeyNormalization::Exact,
            Normalization::Lowercase => KeyNormalization::Lowercase,
            Normalization::TrimLowercase => KeyNormalization::TrimLowercase,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    Customers,
    Orders,
    OrderItems,
}

fn parse_offset(s: &str) -> std::result::Result<(String, u64), String> {
    let (column, stride) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=STRIDE, got `{}`", s))?;
    let stride = stride
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("invalid stride `{}`: {}", stride, e))?;
    Ok((column.trim().to_string(), stride))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so --json reports on stdout stay parseable
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_ansi(!cli.json)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Dedup {
            input,
            output,
            key,
            tie_break,
            normalization,
            log_removed,
            dry_run,
        } => {
            let config = DedupConfig {
                key_column: key,
                tie_break_column: tie_break,
                normalization: normalization.into(),
            };
            dedup(input, output, config, log_removed, dry_run, cli.json)?;
        }
        Commands::Validate {
            input,
            config,
            limit,
        } => {
            validate(input, config, limit, cli.json)?;
        }
        Commands::Replicate {
            input,
            output,
            factor,
            preset,
            offsets,
            suffixes,
        } => {
            let plan = build_plan(factor, preset, offsets, suffixes);
            replicate_table(input, output, plan, cli.json)?;
        }
        Commands::CleanDates {
            input,
            output,
            column,
            format,
        } => {
            clean_dates(input, output, column, format, cli.json)?;
        }
        Commands::Pipeline {
            input,
            output,
            config,
            dry_run,
        } => {
            run_pipeline(input, output, config, dry_run, cli.json)?;
        }
        Commands::InitConfig { output } => {
            PipelineConfig::default_customers().save(&output)?;
            info!("Wrote default pipeline config to {:?}", output);
        }
        Commands::Inspect { input, limit } => {
            inspect_table(input, limit)?;
        }
        Commands::Count { input } => {
            count_rows(input, cli.json)?;
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

fn dedup(
    input: PathBuf,
    output: PathBuf,
    config: DedupConfig,
    log_removed: bool,
    dry_run: bool,
    json_output: bool,
) -> Result<()> {
    info!("Starting deduplication");
    info!("  Input: {:?}", input);
    info!("  Key: {} ({:?})", config.key_column, config.normalization);
    info!("  Tie-break: {}", config.tie_break_column);

    let table = open_table(&input)?;
    let report = Deduplicator::new(config)
        .deduplicate(&table)
        .with_context(|| format!("Failed to deduplicate {}", input.display()))?;

    let removed_output = removed_path(&output);
    if !dry_run {
        save_table(&output, &report.table)?;
        if log_removed {
            write_removed_log(&removed_output, &table, &report)?;
        }
    }

    let stats = &report.stats;
    if json_output {
        let written = (!dry_run).then(|| output.to_string_lossy().into_owned());
        let removed_written =
            (!dry_run && log_removed).then(|| removed_output.to_string_lossy().into_owned());
        let summary = serde_json::json!({
            "input": input.to_string_lossy(),
            "output": written,
            "removed_output": removed_written,
            "total_rows": stats.total_seen,
            "unique_rows": stats.unique_count,
            "duplicates_removed": stats.duplicates_found,
            "rows_without_key": stats.rows_without_key,
            "deduplication_rate": stats.dedup_rate(),
            "dry_run": dry_run,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        report::print_summary_report(
            "Deduplication Complete",
            &input,
            if dry_run { None } else { Some(output.as_path()) },
            &Summary {
                total: stats.total_seen,
                kept: stats.unique_count,
                duplicates: stats.duplicates_found,
                ..Default::default()
            },
        );
        if !dry_run && log_removed {
            println!("  Removed rows: {:?}", removed_output);
        }
    }

    Ok(())
}

/// Derive the companion "removed rows" path from the clean output path.
///
/// Examples:
///   customers.csv      → customers.removed.jsonl
///   customers.jsonl.gz → customers.jsonl.removed.jsonl
fn removed_path(output: &Path) -> PathBuf {
    let stem = output.file_stem().unwrap_or_default().to_string_lossy();
    let parent = output.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("{}.removed.jsonl", stem))
}

/// One line per dropped row, pointing at its survivor
fn write_removed_log(path: &Path, input: &Table, report: &DedupReport) -> Result<()> {
    let mut writer = BufWriter::new(
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
    );
    for removed in &report.removed {
        let entry = serde_json::json!({
            "row_id": removed.row,
            "duplicate_of_row_id": removed.duplicate_of,
            "key": removed.key,
            "row": input.row_object(removed.row),
        });
        writeln!(writer, "{}", serde_json::to_string(&entry)?)?;
    }
    writer.flush()?;
    Ok(())
}

fn load_validator(config: Option<&Path>) -> Result<CustomerValidator> {
    let config = match config {
        Some(path) => config::load_validator_config(path)?,
        None => ValidatorConfig::default(),
    };
    Ok(CustomerValidator::new(config)?)
}

fn validate(
    input: PathBuf,
    config: Option<PathBuf>,
    limit: usize,
    json_output: bool,
) -> Result<()> {
    info!("Validating {:?}", input);

    let table = open_table(&input)?;
    let validator = load_validator(config.as_deref())?;
    let result = validator.validate_table(&table);

    if json_output {
        let failures: Vec<_> = result
            .failures
            .iter()
            .take(limit)
            .map(|(row, r)| serde_json::json!({ "row_id": row, "errors": r.errors() }))
            .collect();
        let summary = serde_json::json!({
            "input": input.to_string_lossy(),
            "total_rows": result.total,
            "valid_rows": result.valid_count(),
            "invalid_rows": result.failures.len(),
            "failures": failures,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_failures(&result, limit);
        println!(
            "{} of {} rows valid",
            report::format_with_commas(result.valid_count()),
            report::format_with_commas(result.total)
        );
    }

    Ok(())
}

fn print_failures(result: &TableValidation, limit: usize) {
    for (row, failure) in result.failures.iter().take(limit) {
        let messages: Vec<String> = failure.errors().iter().map(|e| e.to_string()).collect();
        println!("Row {}: {}", row, messages.join("; "));
    }
    if result.failures.len() > limit {
        println!("... {} more", result.failures.len() - limit);
    }
}

fn build_plan(
    factor: usize,
    preset: Option<Preset>,
    offsets: Vec<(String, u64)>,
    suffixes: Vec<String>,
) -> ReplicationPlan {
    let mut plan = match preset {
        Some(Preset::Customers) => ReplicationPlan::customers(factor),
        Some(Preset::Orders) => ReplicationPlan::orders(factor),
        Some(Preset::OrderItems) => ReplicationPlan::order_items(factor),
        None => ReplicationPlan::new(factor),
    };
    for (column, stride) in offsets {
        plan = plan.offset(column, stride);
    }
    for column in suffixes {
        plan = plan.suffix(column);
    }
    plan
}

fn replicate_table(
    input: PathBuf,
    output: PathBuf,
    plan: ReplicationPlan,
    json_output: bool,
) -> Result<()> {
    if plan.offsets.is_empty() && plan.suffixed.is_empty() && plan.factor > 1 {
        warn!("No ID columns given; copies will repeat the same IDs");
    }

    let table = open_table(&input)?;
    let replicated = replicate(&table, &plan)?;
    save_table(&output, &replicated)?;

    if json_output {
        let summary = serde_json::json!({
            "input": input.to_string_lossy(),
            "output": output.to_string_lossy(),
            "factor": plan.factor,
            "input_rows": table.len(),
            "output_rows": replicated.len(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Replicated {} rows x{} into {} rows: {}",
            report::format_with_commas(table.len()),
            plan.factor,
            report::format_with_commas(replicated.len()),
            output.display()
        );
    }
    Ok(())
}

fn clean_dates(
    input: PathBuf,
    output: PathBuf,
    column: String,
    format: String,
    json_output: bool,
) -> Result<()> {
    let table = open_table(&input)?;
    let result = dates::parse_date_column(&table, &column, &format)?;
    save_table(&output, &result.table)?;

    if json_output {
        let summary = serde_json::json!({
            "input": input.to_string_lossy(),
            "output": output.to_string_lossy(),
            "column": column,
            "parsed": result.parsed,
            "cleared": result.cleared,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{}: {} dates parsed, {} invalid values cleared",
            column, result.parsed, result.cleared
        );
    }
    Ok(())
}

/// Outcome of running every configured stage over one table
struct PipelineOutcome {
    table: Table,
    summary: Summary,
    validation: Option<TableValidation>,
}

fn run_stages(table: Table, config: &PipelineConfig) -> Result<PipelineOutcome> {
    let mut summary = Summary {
        total: table.len(),
        ..Default::default()
    };
    let mut table = table;

    for date in &config.dates {
        let result = dates::parse_date_column(&table, &date.column, &date.format)?;
        summary.dates_cleared += result.cleared;
        table = result.table;
    }

    let validation = match &config.validation {
        Some(rules) => {
            let result = CustomerValidator::new(rules.clone())?.validate_table(&table);
            summary.invalid = result.failures.len();
            Some(result)
        }
        None => None,
    };

    if let Some(dedup) = &config.deduplication {
        let result = Deduplicator::new(dedup.clone()).deduplicate(&table)?;
        summary.duplicates = result.stats.duplicates_found;
        table = result.table;
    }

    if let Some(plan) = &config.replication {
        table = replicate(&table, plan)?;
    }

    summary.kept = table.len();
    Ok(PipelineOutcome {
        table,
        summary,
        validation,
    })
}

fn run_pipeline(
    input: PathBuf,
    output: PathBuf,
    config_path: PathBuf,
    dry_run: bool,
    json_output: bool,
) -> Result<()> {
    info!("Running cleaning pipeline");
    info!("  Input: {:?}", input);
    info!("  Output: {:?}", output);
    info!("  Config: {:?}", config_path);

    let config = PipelineConfig::load(&config_path)?;
    if config.dates.is_empty()
        && config.validation.is_none()
        && config.deduplication.is_none()
        && config.replication.is_none()
    {
        bail!("Pipeline config {} enables no stages", config_path.display());
    }

    let table = open_table(&input)?;
    let outcome = run_stages(table, &config)?;

    if !dry_run {
        save_table(&output, &outcome.table)?;
    }

    if json_output {
        let written = (!dry_run).then(|| output.to_string_lossy().into_owned());
        let summary = serde_json::json!({
            "input": input.to_string_lossy(),
            "output": written,
            "total_rows": outcome.summary.total,
            "dates_cleared": outcome.summary.dates_cleared,
            "invalid_rows": outcome.summary.invalid,
            "duplicates_removed": outcome.summary.duplicates,
            "final_rows": outcome.summary.kept,
            "dry_run": dry_run,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        if let Some(validation) = &outcome.validation {
            print_failures(validation, 10);
        }
        report::print_summary_report(
            "Pipeline Complete",
            &input,
            if dry_run { None } else { Some(output.as_path()) },
            &outcome.summary,
        );
    }

    Ok(())
}

fn inspect_table(input: PathBuf, limit: usize) -> Result<()> {
    info!("Inspecting table: {:?}", input);

    let table = open_table(&input)?;
    println!("Columns: {}", table.columns().join(", "));
    for i in 0..table.len().min(limit) {
        if let Some(row) = table.row_object(i) {
            println!("Row #{}: {}", i, serde_json::to_string_pretty(&row)?);
        }
    }
    Ok(())
}

fn count_rows(input: PathBuf, json_output: bool) -> Result<()> {
    let table = open_table(&input)?;
    if json_output {
        println!(
            "{}",
            serde_json::json!({ "input": input.to_string_lossy(), "rows": table.len() })
        );
    } else {
        println!("Total rows: {}", report::format_with_commas(table.len()));
    }
    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
}
