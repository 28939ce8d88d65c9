mod commands;
mod render;
mod utils;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use raceteam_core::aggregate::{AttendanceBucket, SortOrder};
use raceteam_core::{EventType, RsvpStatus};
use tracing_subscriber::EnvFilter;

use commands::Team;

#[derive(Parser)]
#[command(name = "raceteam")]
#[command(about = "Team RSVPs and practice scheduling for sim-racing events")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List events with team attendance
    Events(EventsArgs),

    /// Show every member's answer for one event
    Event { id: String },

    /// Team overview
    Team,

    /// Answer for an event (available, maybe, unavailable, absent)
    Rsvp {
        event: String,

        status: RsvpStatus,

        /// Answer on behalf of this member instead of yourself
        #[arg(short, long)]
        member: Option<String>,
    },

    /// Plan practice sessions before an event
    Practice {
        #[command(subcommand)]
        command: PracticeCommands,
    },

    /// Join the team
    Register { username: String },

    /// Sign in as an existing member
    SignIn { username: String },

    SignOut,

    /// Fetch the latest team data from the shared store
    Refresh,

    /// Show the config file location and current settings
    Config,
}

#[derive(Args)]
struct EventsArgs {
    /// Show events from this date (YYYY-MM-DD, or "all" to include past events)
    #[arg(long)]
    from: Option<String>,

    /// Show events until this date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,

    /// special or get
    #[arg(long = "type")]
    event_type: Option<EventType>,

    /// Only events running this class (repeatable)
    #[arg(long = "class")]
    classes: Vec<String>,

    /// Minimum length in hours
    #[arg(long)]
    min_hours: Option<f64>,

    /// Maximum length in hours
    #[arg(long)]
    max_hours: Option<f64>,

    /// Fuzzy search on the event name
    #[arg(short, long)]
    search: Option<String>,

    /// Only events where this member gave --status
    #[arg(long, requires = "status")]
    member: Option<String>,

    #[arg(long, requires = "member")]
    status: Option<RsvpStatus>,

    /// low (<30%), medium or high (>=70%)
    #[arg(long)]
    attendance: Option<AttendanceBucket>,

    /// date or attendance
    #[arg(long, default_value = "date")]
    sort: SortOrder,

    /// Collapse "<name> - Session <n>" events to their best session
    #[arg(long)]
    sessions: bool,
}

#[derive(Subcommand)]
enum PracticeCommands {
    /// Upcoming events you are available for
    Candidates {
        #[arg(short, long)]
        member: Option<String>,
    },

    /// Best-attended practice slots for an event
    Show {
        event: String,

        /// Number of slots to list
        #[arg(short = 'n', long, default_value_t = 5)]
        top: usize,
    },

    /// Mark whether you can practice in a slot
    Set {
        event: String,

        /// Practice date (YYYY-MM-DD)
        date: NaiveDate,

        /// Time slot id, e.g. "eu"
        slot: String,

        /// Mark the slot as not available
        #[arg(long)]
        no: bool,

        #[arg(short, long)]
        member: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config => commands::config::run(),
        command => run(command).await,
    }
}

async fn run(command: Commands) -> Result<()> {
    let mut team = Team::open().await?;

    let result = match command {
        Commands::Events(args) => commands::events::run(&team, args),
        Commands::Event { id } => commands::events::show(&team, &id),
        Commands::Team => commands::team::run(&team),
        Commands::Rsvp {
            event,
            status,
            member,
        } => commands::rsvp::run(&mut team, &event, status, member.as_deref()),
        Commands::Practice { command } => match command {
            PracticeCommands::Candidates { member } => {
                commands::practice::candidates(&team, member.as_deref())
            }
            PracticeCommands::Show { event, top } => commands::practice::show(&team, &event, top),
            PracticeCommands::Set {
                event,
                date,
                slot,
                no,
                member,
            } => commands::practice::set(&mut team, &event, date, &slot, !no, member.as_deref()),
        },
        Commands::Register { username } => commands::auth::register(&mut team, &username),
        Commands::SignIn { username } => commands::auth::sign_in(&mut team, &username),
        Commands::SignOut => commands::auth::sign_out(&mut team),
        Commands::Refresh => commands::team::refresh(&mut team).await,
        Commands::Config => commands::config::run(),
    };

    // Queued writes must land before the process exits.
    team.finish().await;
    result
}
