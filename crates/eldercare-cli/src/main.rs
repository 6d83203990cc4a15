use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "eldercare", version, about = "Eldercare reminders and records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Medications, doses and intake history
    Med {
        #[command(subcommand)]
        action: commands::med::MedAction,
    },
    /// Calendar events
    Event {
        #[command(subcommand)]
        action: commands::event::EventAction,
    },
    /// Notification feed and delivery permission
    Notify {
        #[command(subcommand)]
        action: commands::notify::NotifyAction,
    },
    /// Medication and event reminders
    Remind {
        #[command(subcommand)]
        action: commands::remind::RemindAction,
    },
    /// Account management
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Cared-for person's profile
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Emergency phone directory
    Emergency {
        #[command(subcommand)]
        action: commands::emergency::EmergencyAction,
    },
    /// Reports and CSV export
    Report {
        #[command(subcommand)]
        action: commands::report::ReportAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Logs go to stderr so JSON output on stdout stays parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("ELDERCARE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn,eldercare::notice=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Config { action } => commands::config::run(action),
        Commands::Med { action } => commands::med::run(action),
        Commands::Event { action } => commands::event::run(action),
        Commands::Notify { action } => commands::notify::run(action),
        Commands::Remind { action } => commands::remind::run(action).await,
        Commands::Auth { action } => commands::auth::run(action).await,
        Commands::Profile { action } => commands::profile::run(action).await,
        Commands::Emergency { action } => commands::emergency::run(action),
        Commands::Report { action } => commands::report::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "eldercare", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
