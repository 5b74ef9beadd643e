//! D-PLACE data repository CLI.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use dplace_cli::commands::check::run_check;
use dplace_cli::commands::cldf::{CldfOptions, run_cldf};
use dplace_cli::commands::extract::{ExtractOptions, extract};
use dplace_cli::commands::glottolog::{run_glottolog, run_glottologbib};
use dplace_cli::commands::index::write_sources;
use dplace_cli::commands::ls::list_datasets;
use dplace_cli::commands::tdwg::assign_regions;
use dplace_cli::logging::{LogConfig, init_logging};
use dplace_cli::summary::{dataset_table, issue_table};
use dplace_ingest::Repository;
use dplace_ingest::paths::default_repos_root;
use dplace_output::ConversionOptions;
use tracing::level_filters::LevelFilter;

mod cli;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&log_config(&cli)) {
        eprintln!("error: cannot open log file: {error}");
        std::process::exit(1);
    }
    let repos = Repository::new(cli.repos.clone().unwrap_or_else(default_repos_root));
    let exit_code = match run(&cli.command, &repos) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(command: &Command, repos: &Repository) -> Result<i32> {
    match command {
        Command::Ls => {
            println!("{}", dataset_table(&list_datasets(repos)?));
        }
        Command::Check => {
            let report = run_check(repos)?;
            if !report.issues().is_empty() {
                println!("{}", issue_table(&report));
            }
            if report.has_errors() {
                println!(
                    "check failed: {} errors, {} warnings",
                    report.error_count(),
                    report.warning_count()
                );
                return Ok(1);
            }
            println!("check passed: {} warnings", report.warning_count());
        }
        Command::Extract(args) => {
            let options = ExtractOptions {
                societies: args.society.clone(),
                datasets: args.dataset.clone(),
                variables: args.variable.clone(),
                tree: args.tree.clone(),
            };
            let rows = extract(repos, &options, &args.filename)?;
            println!("wrote {rows} rows to {}", args.filename.display());
        }
        Command::Glottolog(args) => {
            let summary = run_glottolog(repos, &args.glottolog, &args.glottolog_version)?;
            println!(
                "{} languoids, {} trees written",
                summary.languoids,
                summary.trees.len()
            );
        }
        Command::Glottologbib => {
            let path = run_glottologbib(repos)?;
            println!("wrote {}", path.display());
        }
        Command::Index => {
            let path = write_sources(repos)?;
            println!("wrote {}", path.display());
        }
        Command::Tdwg => {
            let summary = assign_regions(repos)?;
            println!(
                "{} contained, {} nearest, {} unchanged",
                summary.contained, summary.nearest, summary.unchanged
            );
        }
        Command::Cldf(args) => {
            let options = CldfOptions {
                out_dir: args.out_dir.clone(),
                dataset_dir: args.dataset_dir.clone(),
                regions: args.regions.clone(),
                conversion: ConversionOptions {
                    fix_codes: args.fix_codes,
                    dev: args.dev,
                },
            };
            let violations = run_cldf(repos, &options)?;
            if !violations.is_empty() {
                for violation in &violations {
                    eprintln!("{violation}");
                }
                eprintln!("error: {} validation errors", violations.len());
                return Ok(1);
            }
            println!("wrote {}", args.out_dir.display());
        }
    }
    Ok(0)
}

/// An explicit `--log-level` beats `-v`/`-q`; either one disables `RUST_LOG`.
fn log_config(cli: &Cli) -> LogConfig {
    let explicit = cli.log_level.map(LevelFilter::from);
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig {
        level_filter: explicit.unwrap_or_else(|| cli.verbosity.tracing_level_filter()),
        use_env_filter: explicit.is_none() && !cli.verbosity.is_present(),
        with_ansi,
        format: cli.log_format.into(),
        log_file: cli.log_file.clone(),
        ..LogConfig::default()
    }
}
