use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{Connectivity, FormView, MessageTone, SubmissionPhase, WaitlistController};
use document_store::WaitlistBackend;
use shared::{domain::UserType, error::FormError};
use tracing_subscriber::EnvFilter;

mod settings;

use settings::load_settings;

#[derive(Parser, Debug)]
#[command(about = "Join the Gravity waitlist from the command line")]
struct Cli {
    /// Settings file; defaults to ./waitlist.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the document store is reachable.
    Probe,
    /// Submit one waitlist entry.
    Join {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value_t = UserType::Individual)]
        user_type: UserType,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let cli = Cli::parse();

    let backend_config = load_settings(cli.config.as_deref())?.into_backend_config()?;
    tracing::debug!(config = ?backend_config, "loaded settings");
    let backend = WaitlistBackend::new(&backend_config)?;
    let mut controller = WaitlistController::new(Arc::new(backend));

    let connectivity = controller.connect().await;
    print_connection(connectivity);

    match cli.command {
        Command::Probe => Ok(if connectivity == Connectivity::Connected {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }),
        Command::Join {
            name,
            email,
            user_type,
        } => Ok(match join(&mut controller, name, email, user_type).await {
            JoinOutcome::Joined => ExitCode::SUCCESS,
            JoinOutcome::Rejected | JoinOutcome::Failed | JoinOutcome::Unavailable => {
                ExitCode::FAILURE
            }
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinOutcome {
    Joined,
    /// The draft failed validation.
    Rejected,
    Failed,
    /// Valid draft, but the store was unreachable at startup.
    Unavailable,
}

/// Fills the form and submits it once. Validation runs even when the store is
/// unreachable so the user sees what to fix first.
async fn join(
    controller: &mut WaitlistController,
    name: String,
    email: String,
    user_type: UserType,
) -> JoinOutcome {
    controller.set_name(name);
    controller.set_email(email);
    controller.set_user_type(user_type);

    let outcome = match controller.submit().await {
        SubmissionPhase::Succeeded => JoinOutcome::Joined,
        SubmissionPhase::Failed(FormError::Validation(_)) => JoinOutcome::Rejected,
        SubmissionPhase::Failed(FormError::Submission(_)) => JoinOutcome::Failed,
        SubmissionPhase::Idle | SubmissionPhase::Validating | SubmissionPhase::Submitting => {
            JoinOutcome::Unavailable
        }
    };

    print_message(&controller.view());
    if outcome == JoinOutcome::Unavailable {
        eprintln!("Submission disabled: the waitlist service is unreachable.");
    }
    outcome
}

fn print_connection(connectivity: Connectivity) {
    match connectivity {
        Connectivity::Unknown => {}
        Connectivity::Connected => println!("Connection Status: Connected"),
        Connectivity::Disconnected => println!("Connection Status: Not Connected - check logs"),
    }
}

fn print_message(view: &FormView) {
    let Some(message) = &view.message else {
        return;
    };
    match message.tone {
        MessageTone::Success => println!("{}", message.text),
        MessageTone::Error => eprintln!("{}", message.text),
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
