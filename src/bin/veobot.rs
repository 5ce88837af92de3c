use clap::{Parser, Subcommand};
use veobot::client::http::HttpGenerationClient;
use veobot::config::Settings;
use veobot::config::loader::load_settings_from_yaml;
use veobot::dispatch::Dispatcher;
use veobot::notify::Notifier;
use veobot::notify::console::ConsoleNotifier;
use veobot::notify::messages::Messages;
use veobot::runtime::registry::TaskRegistry;
use veobot::runtime::runner::{Admission, Outcome, TaskRunner};
use veobot::runtime::task::ClientId;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn, error};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read `<chat-id> <text>` lines from stdin and answer on stdout
    Console {
        /// Path to the settings YAML file
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Override service.base_url
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Generate one video for a prompt and wait for the result
    Generate {
        /// Prompt text, without the trigger prefix
        #[arg(long, short)]
        prompt: String,

        /// Path to the settings YAML file
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Override service.base_url
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Load and validate a settings file
    CheckConfig {
        /// Path to the settings YAML file
        #[arg(long, short)]
        config: PathBuf,
    },
}

fn load_settings(config: Option<&PathBuf>, base_url: Option<String>) -> Result<Settings> {
    let mut settings = match config {
        Some(path) => load_settings_from_yaml(&path.to_string_lossy())?,
        None => Settings::default(),
    };
    if let Some(url) = base_url {
        settings.service.base_url = url;
    }
    settings.validate()?;
    Ok(settings)
}

fn build_dispatcher(settings: &Settings) -> Dispatcher {
    let service = Arc::new(HttpGenerationClient::with_settings(&settings.service));
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier::new(Messages::from_settings(settings)));
    let registry = Arc::new(TaskRegistry::new());
    let runner = Arc::new(TaskRunner::from_settings(settings, service, registry, notifier.clone()));
    Dispatcher::new(runner, notifier, settings.bot.trigger.clone())
}

async fn run_console(settings: Settings) -> Result<()> {
    info!(base_url = %settings.service.base_url, trigger = %settings.bot.trigger, "Console transport ready");
    let dispatcher = build_dispatcher(&settings);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();

    while let Some(line) = lines.next_line().await? {
        reap_finished(&mut in_flight);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((chat, text)) = line.split_once(char::is_whitespace) else {
            warn!(line, "Expected `<chat-id> <text>`, ignoring line");
            continue;
        };

        if let Some(Admission::Accepted(handle)) = dispatcher.handle(ClientId::from(chat), text).await {
            // Runs already on the runtime; the set only collects the result.
            in_flight.spawn(async move { handle.await });
        }
    }

    info!(count = in_flight.len(), "Input closed, waiting for running tasks");
    while let Some(joined) = in_flight.join_next().await {
        log_joined(joined);
    }
    Ok(())
}

type Joined = Result<Result<Outcome, JoinError>, JoinError>;

/// Drops finished tasks so a long session does not accumulate handles.
fn reap_finished(in_flight: &mut JoinSet<Result<Outcome, JoinError>>) -> usize {
    let mut reaped = 0;
    while let Some(joined) = in_flight.try_join_next() {
        log_joined(joined);
        reaped += 1;
    }
    reaped
}

fn log_joined(joined: Joined) {
    match joined.and_then(|inner| inner) {
        Ok(outcome) => debug!(state = ?outcome.state(), "Task finished"),
        Err(e) => error!("Task panicked: {}", e),
    }
}

async fn run_generate(settings: Settings, prompt: String) -> Result<ExitCode> {
    let dispatcher = build_dispatcher(&settings);
    let client = ClientId::from("cli");

    match dispatcher.runner().submit(client, &prompt).await {
        Admission::Rejected(reason) => {
            warn!("Request rejected: {}", reason);
            Ok(ExitCode::from(2))
        }
        Admission::Accepted(handle) => match handle.await? {
            Outcome::Succeeded(artifact) => {
                info!(artifact = %artifact, "Generation succeeded");
                Ok(ExitCode::SUCCESS)
            }
            outcome => {
                warn!(state = ?outcome.state(), "Generation did not produce a video");
                Ok(ExitCode::FAILURE)
            }
        },
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Console { config, base_url } => {
            let settings = load_settings(config.as_ref(), base_url)?;
            run_console(settings).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Generate { prompt, config, base_url } => {
            let settings = load_settings(config.as_ref(), base_url)?;
            run_generate(settings, prompt).await
        }
        Commands::CheckConfig { config } => {
            let settings = load_settings(Some(&config), None)?;
            info!(
                base_url = %settings.service.base_url,
                trigger = %settings.bot.trigger,
                worst_case_wait = ?settings.polling.worst_case_wait(),
                "Settings are valid"
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reaping_removes_only_finished_tasks() {
        let mut in_flight = JoinSet::new();
        let done = tokio::spawn(async { Outcome::Failed });
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let pending = tokio::spawn(async move {
            let _ = rx.await;
            Outcome::Exhausted
        });
        in_flight.spawn(async move { done.await });
        in_flight.spawn(async move { pending.await });

        while in_flight.len() == 2 {
            reap_finished(&mut in_flight);
            tokio::task::yield_now().await;
        }
        assert_eq!(in_flight.len(), 1);

        tx.send(()).unwrap();
        let last = in_flight.join_next().await.unwrap().unwrap().unwrap();
        assert_eq!(last, Outcome::Exhausted);
        assert!(in_flight.is_empty());
    }

    #[test]
    fn base_url_override_applies_before_validation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("veobot.yaml");
        std::fs::write(&path, "service:\n  base_url: \"\"\n").unwrap();

        assert!(load_settings(Some(&path), None).is_err());
        let settings = load_settings(Some(&path), Some("http://localhost:8080/api".to_string())).unwrap();
        assert_eq!(settings.service.base_url, "http://localhost:8080/api");
    }
}
