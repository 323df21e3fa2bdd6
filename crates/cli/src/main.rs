// EvalGrid CLI - peer-evaluation import, name reconciliation and correction

mod corrections;
mod exit_codes;
mod import;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use evalgrid_config::Settings;
use evalgrid_core::{Category, EvalError, EvaluationRecord, EvaluationSettings, ReceivedFilter};
use evalgrid_io::SqliteStore;
use evalgrid_recon::registry::{list_mappings, list_participants, put_mapping};
use evalgrid_recon::views::{categories, list_given, list_received, list_weeks, overview, update_settings};
use evalgrid_recon::{ImportLayout, Reconciler};

use corrections::CorrectionCommands;
use exit_codes::{eval_exit_code, EXIT_ERROR, EXIT_STORAGE, EXIT_SUCCESS, EXIT_USAGE};
use import::ImportCommands;

#[derive(Parser)]
#[command(name = "egrid")]
#[command(about = "Peer-evaluation import, name reconciliation and correction")]
#[command(version)]
struct Cli {
    /// SQLite database (overrides `database.path` in settings)
    #[arg(long, global = true, env = "EGRID_DB", value_name = "PATH")]
    db: Option<PathBuf>,

    /// Settings file (default: <config dir>/evalgrid/settings.json)
    #[arg(long, global = true, env = "EGRID_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import spreadsheets
    #[command(subcommand)]
    Import(ImportCommands),

    /// Validate evaluatee names that have not been checked yet
    #[command(after_help = "\
Exact participant names are accepted as-is; registered variants are
rewritten to the official name; anything else is flagged for correction.
Already-checked evaluations are never revisited.")]
    Reconcile,

    /// Review and fix flagged evaluatee names
    #[command(subcommand)]
    Corrections(CorrectionCommands),

    /// Evaluations addressed to a person
    #[command(after_help = "\
Examples:
  egrid received --name '鈴木 一郎'
  egrid received --name '鈴木 一郎' --category value_practice --week 2024-W23")]
    Received {
        /// Official name of the evaluatee
        #[arg(long)]
        name: String,

        /// Restrict to one category key (see `egrid categories`)
        #[arg(long)]
        category: Option<Category>,

        /// Restrict to one week
        #[arg(long)]
        week: Option<String>,
    },

    /// Evaluations you submitted
    Given {
        /// Submitter email
        #[arg(long, env = "EGRID_EMAIL")]
        email: String,
    },

    /// Edit content, anonymity or visibility of one of your evaluations
    #[command(after_help = "\
Examples:
  egrid settings 42 --email a@example.com --anonymous false
  egrid settings 42 --email a@example.com --content 'rewritten text' --hidden true")]
    Settings {
        /// Evaluation id
        id: i64,

        /// Submitter email
        #[arg(long, env = "EGRID_EMAIL")]
        email: String,

        /// New evaluation text
        #[arg(long)]
        content: Option<String>,

        /// Show the evaluation without the submitter's name
        #[arg(long)]
        anonymous: Option<bool>,

        /// Hide the evaluation from the evaluatee
        #[arg(long)]
        hidden: Option<bool>,
    },

    /// Weeks that have evaluations, newest first
    Weeks,

    /// Evaluation categories
    Categories,

    /// Totals across the database
    Overview,

    /// Official participant names
    Participants,

    /// Manage name variants
    #[command(subcommand)]
    Mapping(MappingCommands),
}

#[derive(Subcommand)]
enum MappingCommands {
    /// Register a variant spelling of an official name
    #[command(after_help = "\
Examples:
  egrid mapping add 'すずき' '鈴木 一郎'")]
    Add {
        /// Name as typed in the form
        variant: String,

        /// Official name it stands for
        official: String,
    },

    /// List registered variants
    List,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,evalgrid_recon=info,evalgrid_io=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Static listing; no database needed.
    if let Commands::Categories = cli.command {
        let cats = categories();
        if cli.json {
            return print_json(&cats);
        }
        for c in cats {
            println!("{:<20} {}", c.key, c.name);
        }
        return Ok(());
    }

    let app = App::open(cli.db, cli.config, cli.json)?;

    match cli.command {
        Commands::Import(cmd) => import::cmd_import(&app, cmd),
        Commands::Reconcile => cmd_reconcile(&app),
        Commands::Corrections(cmd) => corrections::cmd_corrections(&app, cmd),
        Commands::Received { name, category, week } => cmd_received(&app, name, category, week),
        Commands::Given { email } => {
            let records = list_given(&app.store, &email)?;
            if app.json {
                return app.print_json(&records);
            }
            print_records(&records);
            Ok(())
        }
        Commands::Settings { id, email, content, anonymous, hidden } => {
            let settings = EvaluationSettings { content, is_anonymous: anonymous, is_hidden: hidden };
            let record = update_settings(&app.store, id, &email, &settings)?;
            if app.json {
                return app.print_json(&record);
            }
            println!(
                "evaluation {} updated (anonymous: {}, hidden: {})",
                record.id, record.is_anonymous, record.is_hidden
            );
            Ok(())
        }
        Commands::Weeks => {
            let weeks = list_weeks(&app.store)?;
            if app.json {
                return app.print_json(&weeks);
            }
            for week in weeks {
                println!("{week}");
            }
            Ok(())
        }
        Commands::Overview => {
            let o = overview(&app.store)?;
            if app.json {
                return app.print_json(&o);
            }
            println!("evaluations:            {}", o.evaluations);
            println!("weeks:                  {}", o.weeks);
            println!("participants:           {}", o.participants);
            println!("name mappings:          {}", o.mappings);
            println!("pending reconciliation: {}", o.pending_reconciliation);
            println!("needing correction:     {}", o.needing_correction);
            Ok(())
        }
        Commands::Participants => {
            let participants = list_participants(&app.store)?;
            if app.json {
                return app.print_json(&participants);
            }
            for p in participants {
                match p.email {
                    Some(email) => println!("{}\t{}", p.official_name, email),
                    None => println!("{}", p.official_name),
                }
            }
            Ok(())
        }
        Commands::Mapping(MappingCommands::Add { variant, official }) => {
            let mapping = put_mapping(&app.store, &variant, &official)?;
            if app.json {
                return app.print_json(&mapping);
            }
            println!("'{}' -> '{}'", mapping.variant_name, mapping.official_name);
            Ok(())
        }
        Commands::Mapping(MappingCommands::List) => {
            let mappings = list_mappings(&app.store)?;
            if app.json {
                return app.print_json(&mappings);
            }
            for m in mappings {
                println!("{}\t-> {}", m.variant_name, m.official_name);
            }
            Ok(())
        }
        Commands::Categories => Ok(()),
    }
}

// ============================================================================
// Shared state
// ============================================================================

pub struct App {
    pub settings: Settings,
    pub store: SqliteStore,
    pub json: bool,
}

impl App {
    fn open(db: Option<PathBuf>, settings_path: Option<PathBuf>, json: bool) -> Result<Self, CliError> {
        let settings = match settings_path {
            Some(path) => Settings::load_from(&path),
            None => Settings::load(),
        };
        let db_path = db.unwrap_or_else(|| settings.effective_database_path());

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CliError {
                code: EXIT_STORAGE,
                message: format!("cannot create {}: {e}", parent.display()),
                hint: None,
            })?;
        }
        log::debug!("using database {}", db_path.display());

        let store = SqliteStore::open(&db_path)
            .map_err(|e| CliError::from(EvalError::from(e)).with_hint("check --db or database.path in settings"))?;
        Ok(Self { settings, store, json })
    }

    /// Header layout from `import.layoutFile`, or the Forms defaults.
    pub fn layout(&self) -> Result<ImportLayout, CliError> {
        match &self.settings.layout_file {
            Some(path) => ImportLayout::from_file(path).map_err(|e| CliError {
                code: EXIT_USAGE,
                message: format!("{}: {e}", path.display()),
                hint: Some("fix or remove import.layoutFile in settings".into()),
            }),
            None => Ok(ImportLayout::default()),
        }
    }

    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), CliError> {
        print_json(value)
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value).map_err(|e| CliError::general(e.to_string()))?;
    println!("{out}");
    Ok(())
}

pub fn print_records(records: &[EvaluationRecord]) {
    for r in records {
        let flag = if r.needs_name_correction { " [needs correction]" } else { "" };
        println!(
            "#{:<6} {:<10} {:<20} -> {}{}",
            r.id,
            r.week,
            r.category.key(),
            r.evaluatee_name,
            flag
        );
        println!("        {}", r.content);
    }
}

// ============================================================================
// reconcile / received
// ============================================================================

fn cmd_reconcile(app: &App) -> Result<(), CliError> {
    let outcome = Reconciler::new(app.settings.strict_mappings).run(&app.store)?;
    if outcome.failed > 0 {
        log::warn!("{} evaluations could not be updated; rerun reconcile to retry", outcome.failed);
    }
    if app.json {
        return app.print_json(&outcome);
    }
    println!(
        "validated {} evaluations: {} valid, {} need correction",
        outcome.validated, outcome.valid, outcome.invalid
    );
    if outcome.failed > 0 {
        println!("{} left unchecked after errors", outcome.failed);
    }
    Ok(())
}

fn cmd_received(
    app: &App,
    name: String,
    category: Option<Category>,
    week: Option<String>,
) -> Result<(), CliError> {
    let filter = ReceivedFilter { category, week };
    let received = list_received(&app.store, &name, &filter, &app.settings.anonymous_label)?;
    if app.json {
        return app.print_json(&received);
    }
    for r in received {
        println!("{:<10} {:<20} from {}", r.week, r.category.key(), r.display_name);
        println!("        {}", r.content);
    }
    Ok(())
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<EvalError> for CliError {
    fn from(err: EvalError) -> Self {
        Self { code: eval_exit_code(&err), message: err.to_string(), hint: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from(["egrid", "reconcile", "--db", "/tmp/x.db", "--json"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert!(matches!(cli.command, Commands::Reconcile));
    }

    #[test]
    fn received_parses_category_key() {
        let cli = Cli::try_parse_from([
            "egrid", "received", "--name", "Suzuki", "--category", "value_promotion",
        ])
        .unwrap();
        match cli.command {
            Commands::Received { category, week, .. } => {
                assert_eq!(category, Some(Category::ValuePromotion));
                assert_eq!(week, None);
            }
            _ => panic!("expected received"),
        }
        assert!(Cli::try_parse_from(["egrid", "received", "--name", "S", "--category", "nope"]).is_err());
    }

    #[test]
    fn settings_flags_are_optional_booleans() {
        let cli = Cli::try_parse_from([
            "egrid", "settings", "7", "--email", "a@co.com", "--anonymous", "false",
        ])
        .unwrap();
        match cli.command {
            Commands::Settings { id, anonymous, hidden, content, .. } => {
                assert_eq!(id, 7);
                assert_eq!(anonymous, Some(false));
                assert_eq!(hidden, None);
                assert_eq!(content, None);
            }
            _ => panic!("expected settings"),
        }
    }

    #[test]
    fn consume_is_per_import() {
        let cli = Cli::try_parse_from(["egrid", "import", "evaluations", "in.xlsx", "--consume"]).unwrap();
        match cli.command {
            Commands::Import(ImportCommands::Evaluations { file, consume }) => {
                assert_eq!(file, PathBuf::from("in.xlsx"));
                assert!(consume);
            }
            _ => panic!("expected import evaluations"),
        }
    }

    #[test]
    fn service_errors_keep_their_message() {
        let err = CliError::from(EvalError::NotFoundOrForbidden);
        assert_eq!(err.code, exit_codes::EXIT_NOT_FOUND);
        assert_eq!(err.message, "evaluation not found or not permitted");
    }

    #[test]
    fn import_consumes_file_and_reports_partial() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("upload.csv");
        std::fs::write(
            &file,
            "メール,名前,実施週：週を選択してください,氏名,具体的な行動内容\n\
             a@co.com,Aoki,W1,Suzuki,thanks\n\
             b@co.com,Baba,,Sato,thanks\n",
        )
        .unwrap();

        let app = App {
            settings: Settings::default(),
            store: SqliteStore::open_in_memory().unwrap(),
            json: true,
        };
        let err = import::cmd_import(
            &app,
            ImportCommands::Evaluations { file: file.clone(), consume: true },
        )
        .unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_PARTIAL_IMPORT);
        assert!(!file.exists());
        assert_eq!(list_weeks(&app.store).unwrap(), vec!["W1".to_string()]);
    }

    #[test]
    fn rejected_upload_is_still_removed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("upload.txt");
        std::fs::write(&file, "not a spreadsheet").unwrap();

        let app = App {
            settings: Settings::default(),
            store: SqliteStore::open_in_memory().unwrap(),
            json: false,
        };
        let err = import::cmd_import(&app, ImportCommands::Participants { file: file.clone(), consume: true })
            .unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
        assert!(!file.exists());
    }
}
