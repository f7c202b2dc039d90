//! Import command handlers
//!
//! The review checkpoint of the import pipeline: `validate` prints the
//! review table and gates on the error set via its exit code, `submit`
//! runs the same pipeline and hands clean sheets to the batch submitter.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result, ensure};
use colored::*;
use log::info;

use super::ImportCommands;
use crate::api::GramsetuClient;
use crate::config::Config;
use crate::import::excel::write_validation_report;
use crate::import::{BatchSubmitter, ImportSession, SubmitOptions};

pub async fn handle_import_command(args: ImportCommands, config: Config) -> Result<ExitCode> {
    match args {
        ImportCommands::Validate {
            file,
            errors_only,
            report,
            no_color,
        } => {
            if no_color {
                colored::control::set_override(false);
            }
            handle_validate(&file, errors_only, report.as_deref())
        }
        ImportCommands::Submit {
            file,
            api_url,
            batch_size,
            no_color,
        } => {
            if no_color {
                colored::control::set_override(false);
            }
            let mut config = config;
            if let Some(url) = api_url {
                config.api.base_url = Some(url);
            }
            if let Some(size) = batch_size {
                ensure!(size > 0, "--batch-size must be at least 1");
                config.import.batch_size = size;
            }
            handle_submit(&file, &config).await
        }
    }
}

fn handle_validate(file: &Path, errors_only: bool, report: Option<&Path>) -> Result<ExitCode> {
    let session = load_session(file)?;
    print_review(&session, errors_only);

    if let Some(path) = report {
        write_validation_report(session.errors(), session.records().len(), path)?;
        println!(
            "Validation report written to {}",
            path.display().to_string().cyan()
        );
    }

    if session.can_submit() {
        println!(
            "{} {} row(s) ready to submit",
            "OK".green().bold(),
            session.records().len()
        );
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} {} error(s) across {} row(s); fix the sheet and re-run",
            "FAILED".red().bold(),
            session.errors().len(),
            session.errored_rows().len()
        );
        Ok(ExitCode::FAILURE)
    }
}

async fn handle_submit(file: &Path, config: &Config) -> Result<ExitCode> {
    let session = load_session(file)?;

    if !session.can_submit() {
        print_review(&session, true);
        session.ensure_submittable()?;
    }

    let base_url = config.require_base_url()?;
    let batch_size = config.import.batch_size;
    info!("submitting to {} in batches of {}", base_url, batch_size);

    let client = GramsetuClient::new(base_url);
    let submitter = BatchSubmitter::new(&client, SubmitOptions { batch_size });
    let progress = submitter.progress();
    let total = session.records().len();

    println!("Submitting {} record(s) in batches of {}...", total, batch_size);
    let summary = submitter
        .submit_with(session.records(), |report| {
            let processed = progress.snapshot().processed();
            println!(
                "  batch {}/{}: {} ok, {} failed  ({}/{} processed)",
                report.batch, report.total_batches, report.succeeded, report.failed, processed, total
            );
        })
        .await;

    if summary.all_succeeded() {
        println!(
            "{} all {} record(s) submitted",
            "OK".green().bold(),
            summary.total
        );
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} {} succeeded, {} failed; correct the sheet and re-run to retry",
            "PARTIAL".yellow().bold(),
            summary.succeeded,
            summary.failed
        );
        Ok(ExitCode::FAILURE)
    }
}

/// Read the sheet bytes and run parse, map and validate. Read failures get
/// the same fatal treatment as parse failures.
fn load_session(path: &Path) -> Result<ImportSession> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read spreadsheet: {}", path.display()))?;
    ImportSession::load(&bytes).with_context(|| format!("Failed to import {}", path.display()))
}

/// Print the review table (all rows or errors-only) followed by the
/// validation errors, 1-based row numbers throughout.
fn print_review(session: &ImportSession, errors_only: bool) {
    let rows = session.preview_rows(errors_only);

    if rows.is_empty() {
        if errors_only && !session.records().is_empty() {
            println!("No rows with validation errors.");
        } else {
            println!("Sheet contains no resident rows.");
        }
    } else {
        println!(
            "{}",
            format!(
                "{:<5} {:<24} {:<12} {:<14} {}",
                "Row", "Name", "Mobile", "Aadhaar", "Email"
            )
            .bold()
        );
        for (index, record) in &rows {
            println!(
                "{:<5} {:<24} {:<12} {:<14} {}",
                index + 1,
                record.name,
                record.mobile_no,
                record.aadhaar_no,
                record.email
            );
        }
    }

    if !session.errors().is_empty() {
        println!();
        for error in session.errors() {
            println!("  {} {}", "error:".red(), error);
        }
    }
}
