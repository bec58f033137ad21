use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::io::Read;
use std::path::{Path, PathBuf};

use rocketchat_notifier::config::{Settings, SETTINGS_FIELDS};
use rocketchat_notifier::event::StageEvent;
use rocketchat_notifier::notify::{compose, Notification};
use rocketchat_notifier::{Delivery, Notifier};

use crate::output::{bright_green, bright_red, settings_fields_table};

#[derive(Parser)]
#[command(name = "rocketchat-notifier")]
#[command(author, version, about = "CI stage notifications for Rocket.Chat", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (TOML, JSON or YAML)
    #[arg(short, long, global = true, env = "ROCKETCHAT_NOTIFIER_CONFIG")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Send the notification for a stage-status event
    Notify {
        /// Event JSON file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        event: String,
    },
    /// Print the message an event would produce without sending it
    Preview {
        #[arg(short, long, default_value = "-")]
        event: String,
    },
    /// List the settings fields
    Settings {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Check the settings file for missing or malformed values
    Validate,
    /// Log in, fetch the bot account and log out again
    CheckConnection,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        Settings::load(self.config.as_deref())
    }

    fn emit(&self, value: &impl serde::Serialize) -> Result<()> {
        let json_output = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, json_output)?;
            info!("Output written to: {}", output_path.display());
        } else {
            println!("{}", json_output);
        }

        Ok(())
    }

    async fn execute_notify(&self, event: &str) -> Result<()> {
        let settings = self.settings()?;
        let event = read_event(event)?;
        let notifier = Notifier::new(settings)?;

        let delivery = notifier.notify(&event).await;
        if let Err(e) = notifier.shutdown().await {
            warn!("Logout failed: {e}");
        }

        match delivery.context("Failed to deliver notification")? {
            Delivery::Sent => eprintln!("{}", bright_green("Notification sent")),
            Delivery::Skipped => eprintln!("Event filtered out, nothing sent"),
        }
        Ok(())
    }

    fn execute_preview(&self, event: &str) -> Result<()> {
        let settings = self.settings()?;
        let event = read_event(event)?;

        match compose(&event, &settings) {
            Notification::Composed(message) => self.emit(&message),
            Notification::FilteredOut => {
                eprintln!("Event filtered out, nothing would be sent");
                Ok(())
            }
        }
    }

    fn execute_settings(&self, json: bool) -> Result<()> {
        if json {
            return self.emit(&SETTINGS_FIELDS);
        }
        println!("{}", settings_fields_table(SETTINGS_FIELDS));
        Ok(())
    }

    fn execute_validate(&self) -> Result<()> {
        let errors = self.settings()?.validation_errors();
        if errors.is_empty() {
            eprintln!("{}", bright_green("Settings are valid"));
            return Ok(());
        }

        for error in &errors {
            eprintln!("{}", bright_red(error));
        }
        anyhow::bail!("{} invalid setting(s)", errors.len())
    }

    async fn execute_check_connection(&self) -> Result<()> {
        let settings = self.settings()?;
        let room_name = settings.room.clone();
        let notifier = Notifier::new(settings)?;
        let client = notifier.client();
        info!("Checking connection to {}", client.dispatcher().api_url());

        let me = client.me().await.context("Failed to log in")?;
        let room = client.channel_info(&room_name).await;
        notifier.shutdown().await.context("Failed to log out")?;

        eprintln!(
            "{} {}",
            bright_green("Connected as"),
            me.username.as_deref().unwrap_or(&me.id)
        );
        match room {
            Ok(room) => eprintln!("Room: {}", room.name.as_deref().unwrap_or(&room.id)),
            Err(e) => warn!("Room lookup failed: {e}"),
        }
        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Notify { event } => self.execute_notify(event).await,
            Commands::Preview { event } => self.execute_preview(event),
            Commands::Settings { json } => self.execute_settings(*json),
            Commands::Validate => self.execute_validate(),
            Commands::CheckConnection => self.execute_check_connection().await,
        }
    }
}

fn read_event(source: &str) -> Result<StageEvent> {
    let body = if source == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("Failed to read event from stdin")?;
        body
    } else {
        std::fs::read_to_string(Path::new(source))
            .with_context(|| format!("Failed to read event file: {source}"))?
    };

    StageEvent::from_json(&body).context("Failed to parse stage-status event")
}
