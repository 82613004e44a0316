//! eegwa - command-line client for the EEG Web Assistant backend
//!
//! Browse recordings, request automated classification (abnormal / artifact / seizure)
//! and poll queued jobs until they settle. Account commands cover sign-in and profile edits.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eegwa_client::poller::{poll_until_settled, PollSettings};
use eegwa_client::services::SortOrder;
use eegwa_client::store::ClassificationStatus;
use eegwa_client::{ClassificationType, Session};
use eegwa_common::api::{NewUser, PasswordUpdate, PersonalInfoUpdate};
use eegwa_common::config::{CliOverrides, ClientConfig, LoggingConfig};
use eegwa_common::FailureRoute;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "eegwa", version, about = "EEG Web Assistant client")]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token from a previous sign-in
    #[arg(long, global = true)]
    token: Option<String>,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show recording metadata and classification state
    Show { recording_id: String },

    /// List recordings
    List {
        #[arg(long)]
        filter: Option<String>,
        /// newest, oldest, "subject A-Z", "subject Z-A"
        #[arg(long, default_value = "newest")]
        sort: SortOrder,
    },

    /// Request a classification and wait for it
    Classify {
        recording_id: String,
        classification_type: ClassificationType,
        #[arg(long, default_value_t = 2000)]
        poll_interval_ms: u64,
        #[arg(long, default_value_t = 300)]
        max_polls: u32,
    },

    /// Stored report filtered by probability and deviation
    Report {
        recording_id: String,
        classification_type: ClassificationType,
        /// Minimum probability (0..1)
        #[arg(long, default_value_t = 0.5)]
        min_prob: f64,
        /// Maximum standard deviation (0..1)
        #[arg(long)]
        max_std: Option<f64>,
    },

    /// Delete a stored classification report
    DeleteReport {
        recording_id: String,
        classification_type: ClassificationType,
    },

    /// Sign in and print the access token
    Login {
        username: String,
        #[arg(long, env = "EEGWA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Register {
        username: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "EEGWA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show the signed-in account
    Whoami,

    /// Change name or email; omitted fields stay as they are
    UpdateInfo {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },

    /// Delete the account and all of its recordings
    DeleteAccount {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn print_status(classification_type: ClassificationType, status: &ClassificationStatus) {
    match status {
        ClassificationStatus::Idle => println!("{:<9} idle", classification_type),
        ClassificationStatus::Pending(task_id) => {
            println!("{:<9} pending (task {})", classification_type, task_id)
        }
        ClassificationStatus::Resolved(segments) => {
            println!("{:<9} {} segments", classification_type, segments.len());
            for s in segments {
                println!(
                    "    #{:<4} {:>6}-{:<6} s  prob {:>6}%  std {:>6}%",
                    s.nr, s.start_time, s.stop_time, s.prob, s.std
                );
            }
        }
    }
}

async fn run(session: &Session, command: Command) -> eegwa_common::Result<()> {
    match command {
        Command::Show { recording_id } => {
            let recording = session.analysis.fetch_recording(&recording_id).await?;
            println!("{} ({})", recording.name, recording.id);
            println!("  created:   {}", recording.created);
            if let Some(date) = &recording.measure_date {
                println!("  measured:  {}", date);
            }
            println!("  duration:  {}", recording.duration_string());
            println!(
                "  channels:  {} @ {} Hz",
                recording.channel_amount(),
                recording.sampling_frequency
            );
            if let Some(subject) = recording.subject_full_name() {
                println!("  subject:   {}", subject);
            }
            for t in ClassificationType::ALL {
                print_status(t, &session.classification.status_of(t).await);
            }
        }
        Command::List { filter, sort } => {
            let items = session.recordings.fetch(filter.as_deref(), sort).await?;
            for item in items {
                println!(
                    "{}  {:<30}  {}  {}",
                    item.id,
                    item.name,
                    item.created,
                    item.subject_full_name.unwrap_or_default()
                );
            }
        }
        Command::Classify {
            recording_id,
            classification_type,
            poll_interval_ms,
            max_polls,
        } => {
            session.analysis.fetch_recording(&recording_id).await?;
            session
                .classification
                .request_or_fetch(&recording_id, classification_type)
                .await?;

            let settings = PollSettings {
                interval: Duration::from_millis(poll_interval_ms),
                max_polls,
            };
            let status =
                poll_until_settled(&session.classification, classification_type, settings).await?;
            print_status(classification_type, &status);
        }
        Command::Report {
            recording_id,
            classification_type,
            min_prob,
            max_std,
        } => {
            let segments = session
                .classification_api()
                .get_report(&recording_id, classification_type, min_prob, max_std)
                .await?;
            let segments = eegwa_client::models::normalize_all(&segments);
            print_status(classification_type, &ClassificationStatus::Resolved(segments));
        }
        Command::DeleteReport {
            recording_id,
            classification_type,
        } => {
            session
                .classification
                .delete_result(&recording_id, classification_type)
                .await?;
            println!("{} report deleted", classification_type);
        }
        Command::Login { username, password } => {
            let token = session.login(&username, &password).await?;
            println!("Signed in as {}", token.username);
            println!("{}", token.access_token);
        }
        Command::Register {
            username,
            first_name,
            last_name,
            email,
            password,
        } => {
            session
                .account
                .create_user(NewUser {
                    first_name,
                    last_name,
                    email,
                    username: username.clone(),
                    password,
                })
                .await?;
            println!("Account {} created", username);
        }
        Command::Whoami => {
            let user = session.account.fetch_current().await?;
            println!("{} ({} {}) <{}>", user.username, user.first_name, user.last_name, user.email);
        }
        Command::UpdateInfo {
            first_name,
            last_name,
            email,
        } => {
            let update = PersonalInfoUpdate {
                first_name,
                last_name,
                email,
            }
            .non_empty();
            if update.is_empty() {
                return Err(eegwa_common::Error::InvalidInput(
                    "Nothing to update".to_string(),
                ));
            }
            session.account.update_personal_info(update).await?;
            println!("Personal info updated");
        }
        Command::ChangePassword { current, new } => {
            session
                .account
                .update_password(PasswordUpdate {
                    current_password: current,
                    new_password: new,
                })
                .await?;
            println!("Password changed");
        }
        Command::DeleteAccount { yes } => {
            if !yes {
                return Err(eegwa_common::Error::InvalidInput(
                    "Pass --yes to delete the account".to_string(),
                ));
            }
            session.delete_account().await?;
            println!("Account deleted");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        api_url: cli.api_url.clone(),
        access_token: cli.token.clone(),
        config_path: cli.config.clone(),
    };
    let config = ClientConfig::resolve(&overrides)?;

    init_tracing(&config.logging)?;

    info!(
        "Starting eegwa v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Backend: {}", config.api_base_url);

    let session = Session::new(&config)?;

    if let Err(e) = run(&session, cli.command).await {
        error!("{}", e);
        match session.handle_failure(&e).await {
            Some(FailureRoute::SignIn) => {
                eprintln!("Token rejected ({}); run `eegwa login` and pass the new token", e);
            }
            Some(route) => eprintln!("Request failed ({}); see {}", e, route.path()),
            None => {}
        }
        return Err(e.into());
    }

    Ok(())
}
