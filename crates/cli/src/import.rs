//! `egrid import`: load a Forms export or the participant list into the database.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use evalgrid_core::{ImportSummary, SheetRow};
use evalgrid_io::upload::check_upload;
use evalgrid_io::UploadGuard;
use evalgrid_recon::{import_evaluations, import_participants};

use crate::exit_codes::{EXIT_PARTIAL_IMPORT, EXIT_USAGE};
use crate::{App, CliError};

#[derive(Subcommand)]
pub enum ImportCommands {
    /// Import evaluations from a Forms export (.xlsx, .xls or .csv)
    #[command(after_help = "\
Examples:
  egrid import evaluations responses.xlsx
  egrid import evaluations uploads/excelFile-1718000000.xlsx --consume --json")]
    Evaluations {
        /// Spreadsheet to import
        file: PathBuf,

        /// Delete the file afterwards, whether or not the import succeeds
        #[arg(long)]
        consume: bool,
    },

    /// Import or update the participant registry
    #[command(after_help = "\
Examples:
  egrid import participants members.xlsx")]
    Participants {
        /// Spreadsheet to import
        file: PathBuf,

        /// Delete the file afterwards, whether or not the import succeeds
        #[arg(long)]
        consume: bool,
    },
}

pub fn cmd_import(app: &App, cmd: ImportCommands) -> Result<(), CliError> {
    let (file, consume, kind) = match cmd {
        ImportCommands::Evaluations { file, consume } => (file, consume, Kind::Evaluations),
        ImportCommands::Participants { file, consume } => (file, consume, Kind::Participants),
    };

    // Armed before any check so a rejected upload is still removed.
    let guard = consume.then(|| UploadGuard::new(&file));

    let rows = read_upload(&file, consume, app.settings.max_upload_bytes)?;
    let layout = app.layout()?;
    let cap = app.settings.max_error_samples;

    let summary = match kind {
        Kind::Evaluations => import_evaluations(&app.store, &rows, &layout, cap),
        Kind::Participants => import_participants(&app.store, &rows, &layout.participants, cap),
    };
    drop(guard);

    report(app, kind, &summary)?;
    if summary.is_partial() {
        return Err(CliError { code: EXIT_PARTIAL_IMPORT, message: String::new(), hint: None });
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum Kind {
    Evaluations,
    Participants,
}

fn read_upload(file: &Path, consume: bool, max_bytes: u64) -> Result<Vec<SheetRow>, CliError> {
    if consume {
        check_upload(file, max_bytes).map_err(|e| CliError {
            code: EXIT_USAGE,
            message: format!("{}: {e}", file.display()),
            hint: None,
        })?;
    }
    evalgrid_io::sheet::read_rows(file).map_err(|e| CliError {
        code: EXIT_USAGE,
        message: format!("cannot read {}: {e}", file.display()),
        hint: Some("supported formats: .xlsx, .xls, .csv, .tsv".into()),
    })
}

fn report(app: &App, kind: Kind, summary: &ImportSummary) -> Result<(), CliError> {
    if app.json {
        return app.print_json(summary);
    }

    let what = match kind {
        Kind::Evaluations => "evaluations",
        Kind::Participants => "participants",
    };
    println!("imported {what}: {}", summary.summary());
    for err in &summary.errors {
        println!("  {err}");
    }
    let hidden = summary.error_count.saturating_sub(summary.errors.len());
    if hidden > 0 {
        println!("  ... and {hidden} more");
    }
    Ok(())
}
