use log::{debug, info};

use crate::config::Settings;
use crate::error::Result;
use crate::event::StageEvent;
use crate::notify::{compose, Notification};
use crate::rocketchat::RocketChatClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Skipped,
}

/// Filters, composes and posts stage notifications to the configured room.
pub struct Notifier {
    settings: Settings,
    client: RocketChatClient,
}

impl Notifier {
    /// # Errors
    ///
    /// Returns a configuration error when a required setting is blank or a
    /// URL is malformed; nothing is sent in that case.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let client = RocketChatClient::new(
            &settings.api_url,
            &settings.api_user,
            &settings.api_key,
            settings.request_timeout(),
        )?;

        Ok(Self { settings, client })
    }

    pub fn client(&self) -> &RocketChatClient {
        &self.client
    }

    pub async fn notify(&self, event: &StageEvent) -> Result<Delivery> {
        let pipeline = &event.pipeline;
        match compose(event, &self.settings) {
            Notification::FilteredOut => {
                debug!("No notification for {}", pipeline.stage_locator());
                Ok(Delivery::Skipped)
            }
            Notification::Composed(message) => {
                self.client.post_message(&self.settings.room, &message).await?;
                info!(
                    "Notified {} about {} ({})",
                    self.settings.room,
                    pipeline.stage_locator(),
                    pipeline.stage.state
                );
                Ok(Delivery::Sent)
            }
        }
    }

    /// Best-effort logout; the local session is cleared either way.
    pub async fn shutdown(&self) -> Result<()> {
        self.client.logout().await
    }
}
