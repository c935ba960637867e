use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use hypertrack_client::assistant::Assistant;
use hypertrack_client::identity::http::HttpIdentityProvider;
use hypertrack_client::identity::{Credentials, IdentityError, IdentityProvider, Registration};
use hypertrack_client::net::api::{ApiClient, ApiError};
use hypertrack_client::net::types::Record;
use hypertrack_client::quiz::{Quiz, QuizError};
use hypertrack_client::records::{
    BpEntry, COMMON_SYMPTOMS, Collection, Entry, FoodEntry, JournalEntry, MedicationEntry, Records, SymptomEntry,
};
use hypertrack_client::route::{RouteSegment, Screen, redirect_for};
use hypertrack_client::session::{Session, SessionError, SessionManager};
use hypertrack_client::token_store::TokenFile;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::Level;
use uuid::Uuid;

const LIST_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day] [hour]:[minute]");

const EMERGENCY_GUIDANCE: &str = "\
HYPERTENSIVE CRISIS
If your blood pressure is higher than 180/120 mmHg, you may be in danger.

Check for symptoms:
  - Severe chest pain
  - Severe headache with confusion
  - Nausea and vomiting
  - Severe anxiety
  - Shortness of breath
  - Seizures or unresponsiveness

What to do:
  1. Wait 5 minutes and test again.
  2. If readings remain high, contact a doctor immediately.
  3. If you have the symptoms above, call Emergency Services (112).";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("not signed in; run `hypertrack login` first")]
    SignedOut,
    #[error("already signed in as {0}; run `hypertrack logout` first")]
    SignedIn(String),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "hypertrack", about = "Blood pressure and heart health tracker")]
struct Cli {
    #[arg(long, env = "HYPERTRACK_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[arg(long, env = "HYPERTRACK_SESSION_FILE", default_value = ".hypertrack-session")]
    session_file: String,

    /// Log debug output to stderr.
    #[arg(long, short, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and sign in.
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "HYPERTRACK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "HYPERTRACK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Whoami,
    /// Change the display name.
    Rename {
        name: String,
    },
    Bp(BpCommand),
    Med(MedCommand),
    Food(FoodCommand),
    Symptom(SymptomCommand),
    Journal(JournalCommand),
    /// Print the shareable health report.
    Report,
    /// Ask the health assistant.
    Chat {
        message: String,
    },
    /// Tip based on recent readings.
    Tip,
    Quiz,
    /// What to do during a hypertensive crisis.
    Emergency,
    /// Delete every record in the account.
    Reset {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct BpCommand {
    #[command(subcommand)]
    command: BpSubcommand,
}

#[derive(Subcommand, Debug)]
enum BpSubcommand {
    Add { systolic: i64, diastolic: i64 },
    List(ListArgs),
}

#[derive(Args, Debug)]
struct MedCommand {
    #[command(subcommand)]
    command: MedSubcommand,
}

#[derive(Subcommand, Debug)]
enum MedSubcommand {
    Add {
        name: String,
        #[arg(long, default_value = "")]
        dosage: String,
        #[arg(long, default_value = "")]
        instructions: String,
        #[arg(long, default_value_t = false)]
        reminder: bool,
    },
    List(ListArgs),
    Remove { id: Uuid },
}

#[derive(Args, Debug)]
struct FoodCommand {
    #[command(subcommand)]
    command: FoodSubcommand,
}

#[derive(Subcommand, Debug)]
enum FoodSubcommand {
    Add {
        meal: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    List(ListArgs),
}

#[derive(Args, Debug)]
struct SymptomCommand {
    #[command(subcommand)]
    command: SymptomSubcommand,
}

#[derive(Subcommand, Debug)]
enum SymptomSubcommand {
    Add {
        symptom: String,
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(i64).range(1..=5))]
        severity: i64,
        #[arg(long, default_value = "")]
        notes: String,
    },
    List(ListArgs),
}

#[derive(Args, Debug)]
struct JournalCommand {
    #[command(subcommand)]
    command: JournalSubcommand,
}

#[derive(Subcommand, Debug)]
enum JournalSubcommand {
    Add { text: String },
    List(ListArgs),
    Remove { id: Uuid },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long)]
    limit: Option<u32>,

    /// Print raw records as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl Command {
    /// Screen this command stands in for. `None` runs in any session state.
    fn screen(&self) -> Option<Screen> {
        match self {
            Self::Signup { .. } => Some(Screen::Signup),
            Self::Login { .. } => Some(Screen::Login),
            Self::Whoami => None,
            Self::Emergency => Some(Screen::Emergency),
            Self::Logout | Self::Rename { .. } | Self::Reset { .. } => Some(Screen::Profile),
            Self::Bp(BpCommand { command: BpSubcommand::Add { .. } }) => Some(Screen::BpLog),
            Self::Med(MedCommand { command: MedSubcommand::Add { .. } }) => Some(Screen::AddMedication),
            Self::Food(FoodCommand { command: FoodSubcommand::Add { .. } }) => Some(Screen::FoodLog),
            Self::Symptom(SymptomCommand { command: SymptomSubcommand::Add { .. } }) => Some(Screen::SymptomLog),
            Self::Bp(_) | Self::Med(_) | Self::Food(_) | Self::Symptom(_) | Self::Journal(_) => Some(Screen::TabGroup),
            Self::Chat { .. } | Self::Tip => Some(Screen::TabGroup),
            Self::Report => Some(Screen::Report),
            Self::Quiz => Some(Screen::Quiz),
        }
    }
}

/// Refuse a screen the route guard would redirect away from.
fn gate(session: &Session, screen: Screen) -> Result<(), CliError> {
    match redirect_for(session.status(), &RouteSegment::from(screen)) {
        None => Ok(()),
        Some(Screen::Login) => Err(CliError::SignedOut),
        Some(_) => Err(CliError::SignedIn(session.display_name().unwrap_or_default().to_owned())),
    }
}

struct App {
    sessions: SessionManager,
    records: Records,
    assistant: Assistant,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt().with_writer(io::stderr).with_max_level(level).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let api = ApiClient::new(&cli.base_url)?;
    let provider = Arc::new(HttpIdentityProvider::new(api.clone(), Some(TokenFile::new(&cli.session_file))));
    let app = App {
        sessions: SessionManager::new(provider as Arc<dyn IdentityProvider>),
        records: Records::new(api.clone()),
        assistant: Assistant::new(api),
    };

    app.sessions.initialize();
    let session = app.sessions.wait_until_ready().await?;
    if let Some(screen) = cli.command.screen() {
        gate(&session, screen)?;
    }

    let result = run_command(&app, &session, cli.command).await;
    app.sessions.shutdown();
    result
}

async fn run_command(app: &App, session: &Session, command: Command) -> Result<(), CliError> {
    match command {
        Command::Signup { name, email, password } => {
            app.sessions.sign_up(Registration::new(&name, &email, &password)?).await?;
            let session = app.sessions.wait_until(Session::is_authenticated).await?;
            println!("Welcome, {}!", session.display_name().unwrap_or_default());
            Ok(())
        }
        Command::Login { email, password } => {
            app.sessions.sign_in(Credentials::new(&email, &password)?).await?;
            let session = app.sessions.wait_until(Session::is_authenticated).await?;
            println!("Signed in as {}.", session.display_name().unwrap_or_default());
            Ok(())
        }
        Command::Logout => {
            app.sessions.sign_out().await?;
            app.sessions.wait_until(|s| !s.is_authenticated()).await?;
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => {
            match (session.display_name(), session.user_id()) {
                (Some(name), Some(id)) => println!("{name} ({id})"),
                _ => println!("Not signed in."),
            }
            Ok(())
        }
        Command::Rename { name } => {
            let user = app.records.rename(session, &name).await?;
            println!("Display name is now {}.", user.name);
            Ok(())
        }
        Command::Bp(bp) => run_bp(app, session, bp.command).await,
        Command::Med(med) => run_med(app, session, med.command).await,
        Command::Food(food) => run_food(app, session, food.command).await,
        Command::Symptom(symptom) => run_symptom(app, session, symptom.command).await,
        Command::Journal(journal) => run_journal(app, session, journal.command).await,
        Command::Report => {
            print!("{}", app.records.report(session).await?);
            Ok(())
        }
        Command::Chat { message } => {
            println!("{}", app.assistant.ask(session, &message).await?.text);
            Ok(())
        }
        Command::Tip => {
            println!("{}", app.assistant.tip(session).await?.text);
            Ok(())
        }
        Command::Quiz => run_quiz(&mut io::stdin().lock(), &mut io::stdout()),
        Command::Emergency => {
            println!("{EMERGENCY_GUIDANCE}");
            Ok(())
        }
        Command::Reset { yes } => {
            if !yes {
                println!("This deletes all of your records. Re-run with --yes to confirm.");
                return Ok(());
            }
            let deleted = app.records.reset(session).await?;
            println!("Deleted {deleted} records.");
            Ok(())
        }
    }
}

// =============================================================================
// RECORDS
// =============================================================================

async fn print_list<E: Entry>(
    app: &App,
    session: &Session,
    args: &ListArgs,
    empty: &str,
    line: impl Fn(&E) -> String,
) -> Result<(), CliError> {
    if args.json {
        let records = app.records.list_or_empty(session, E::COLLECTION, args.limit).await;
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    let entries = app.records.recent::<E>(session, args.limit).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "showing empty list");
        Vec::new()
    });
    if entries.is_empty() {
        println!("{empty}");
    }
    for (record, entry) in &entries {
        println!("{}  {}  {}", record_date(record), record.id, line(entry));
    }
    Ok(())
}

fn record_date(record: &Record) -> String {
    record
        .recorded_at
        .format(LIST_DATE)
        .unwrap_or_else(|_| record.recorded_at.date().to_string())
}

async fn run_bp(app: &App, session: &Session, command: BpSubcommand) -> Result<(), CliError> {
    match command {
        BpSubcommand::Add { systolic, diastolic } => {
            let entry = BpEntry { systolic, diastolic };
            app.records.add(session, &entry).await?;
            println!("Reading saved: {systolic}/{diastolic} mmHg.");
            if entry.is_crisis() {
                println!();
                println!("{EMERGENCY_GUIDANCE}");
            }
            Ok(())
        }
        BpSubcommand::List(args) => {
            print_list(app, session, &args, "No readings recorded.", |r: &BpEntry| {
                let flag = if r.is_crisis() { "  [CRISIS]" } else { "" };
                format!("{}/{} mmHg{flag}", r.systolic, r.diastolic)
            })
            .await
        }
    }
}

async fn run_med(app: &App, session: &Session, command: MedSubcommand) -> Result<(), CliError> {
    match command {
        MedSubcommand::Add { name, dosage, instructions, reminder } => {
            let entry = MedicationEntry { name, dosage, instructions, reminder };
            app.records.add(session, &entry).await?;
            println!("Medication added: {}.", entry.name);
            Ok(())
        }
        MedSubcommand::List(args) => {
            print_list(app, session, &args, "No medications listed.", |m: &MedicationEntry| {
                let bell = if m.reminder { " (reminder on)" } else { "" };
                format!("{} ({}): {}{bell}", m.name, m.dosage, m.instructions)
            })
            .await
        }
        MedSubcommand::Remove { id } => {
            app.records.delete(session, Collection::Medications, id).await?;
            println!("Medication removed.");
            Ok(())
        }
    }
}

async fn run_food(app: &App, session: &Session, command: FoodSubcommand) -> Result<(), CliError> {
    match command {
        FoodSubcommand::Add { meal, description } => {
            app.records.add(session, &FoodEntry { meal, description }).await?;
            println!("Meal logged.");
            Ok(())
        }
        FoodSubcommand::List(args) => {
            print_list(app, session, &args, "No meals logged.", |f: &FoodEntry| {
                format!("{} ({})", f.meal, f.description)
            })
            .await
        }
    }
}

async fn run_symptom(app: &App, session: &Session, command: SymptomSubcommand) -> Result<(), CliError> {
    match command {
        SymptomSubcommand::Add { symptom, severity, notes } => {
            if !COMMON_SYMPTOMS.iter().any(|s| s.eq_ignore_ascii_case(&symptom)) {
                tracing::debug!(%symptom, "custom symptom");
            }
            app.records.add(session, &SymptomEntry { symptom, severity, notes }).await?;
            println!("Symptom logged.");
            Ok(())
        }
        SymptomSubcommand::List(args) => {
            print_list(app, session, &args, "No symptoms logged.", |s: &SymptomEntry| {
                format!("{} (severity {}/5) {}", s.symptom, s.severity, s.notes)
            })
            .await
        }
    }
}

async fn run_journal(app: &App, session: &Session, command: JournalSubcommand) -> Result<(), CliError> {
    match command {
        JournalSubcommand::Add { text } => {
            app.records.add(session, &JournalEntry { text }).await?;
            println!("Journal entry saved.");
            Ok(())
        }
        JournalSubcommand::List(args) => {
            print_list(app, session, &args, "No journal entries yet.", |j: &JournalEntry| j.text.clone()).await
        }
        JournalSubcommand::Remove { id } => {
            app.records.delete(session, Collection::Journal, id).await?;
            println!("Journal entry deleted.");
            Ok(())
        }
    }
}

// =============================================================================
// QUIZ
// =============================================================================

/// Accept an option by its 1-based number or its text.
fn resolve_choice<'a>(options: &[&'a str], input: &'a str) -> &'a str {
    input
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i).copied())
        .unwrap_or(input)
}

fn run_quiz(input: &mut impl BufRead, out: &mut impl Write) -> Result<(), CliError> {
    let mut quiz = Quiz::new();
    let mut line = String::new();
    while let Some(question) = quiz.current() {
        writeln!(out, "\n{}", question.prompt)?;
        for (i, option) in question.options.iter().enumerate() {
            writeln!(out, "  {}. {option}", i + 1)?;
        }
        write!(out, "> ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }
        match quiz.answer(resolve_choice(question.options, &line)) {
            Ok(feedback) => {
                let verdict = if feedback.correct { "Correct!" } else { "Not quite." };
                writeln!(out, "{verdict} {}", feedback.fact)?;
            }
            Err(QuizError::UnknownOption(choice)) => {
                writeln!(out, "'{choice}' is not one of the options.")?;
            }
            Err(e) => return Err(e.into()),
        }
    }
    writeln!(out, "\nQuiz complete! You scored {} / {}.", quiz.score(), hypertrack_client::quiz::QUESTIONS.len())?;
    writeln!(out, "{}", quiz.verdict())?;
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
