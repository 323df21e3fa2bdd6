//! `egrid corrections`: the submitter's view of flagged evaluatee names.

use clap::Subcommand;

use evalgrid_recon::{correct_name, correction_stats, list_needing_correction};

use crate::{print_records, App, CliError};

#[derive(Subcommand)]
pub enum CorrectionCommands {
    /// List your evaluations whose evaluatee name needs correcting
    List {
        /// Submitter email
        #[arg(long, env = "EGRID_EMAIL")]
        email: String,
    },

    /// Replace the evaluatee name of one of your evaluations
    #[command(after_help = "\
Examples:
  egrid corrections fix 42 --email a@example.com --name '鈴木 一郎'")]
    Fix {
        /// Evaluation id
        id: i64,

        /// Submitter email
        #[arg(long, env = "EGRID_EMAIL")]
        email: String,

        /// Official name from the participant list
        #[arg(long)]
        name: String,
    },

    /// Counters over your evaluations
    Stats {
        /// Submitter email
        #[arg(long, env = "EGRID_EMAIL")]
        email: String,
    },
}

pub fn cmd_corrections(app: &App, cmd: CorrectionCommands) -> Result<(), CliError> {
    match cmd {
        CorrectionCommands::List { email } => {
            let records = list_needing_correction(&app.store, &email)?;
            if app.json {
                return app.print_json(&records);
            }
            if records.is_empty() {
                println!("no evaluations need correction");
                return Ok(());
            }
            print_records(&records);
            Ok(())
        }
        CorrectionCommands::Fix { id, email, name } => {
            let record = correct_name(&app.store, id, &email, &name)?;
            if app.json {
                return app.print_json(&record);
            }
            println!(
                "evaluation {}: evaluatee is now '{}' (originally '{}')",
                record.id,
                record.evaluatee_name,
                record.original_evaluatee_name.as_deref().unwrap_or(&record.evaluatee_name)
            );
            Ok(())
        }
        CorrectionCommands::Stats { email } => {
            let stats = correction_stats(&app.store, &email)?;
            if app.json {
                return app.print_json(&stats);
            }
            println!("total:            {}", stats.total);
            println!("needs correction: {}", stats.needs_correction);
            println!("invalid names:    {}", stats.invalid_names);
            println!("valid names:      {}", stats.valid_names);
            Ok(())
        }
    }
}
