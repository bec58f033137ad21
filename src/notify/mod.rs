mod render;
mod links;
mod pattern;
mod whitelist;

use crate::config::Settings;
use crate::event::StageEvent;
use crate::rocketchat::ChatMessage;

use whitelist::is_whitelisted;

/// Outcome of turning a stage event into a notification.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The event passed the whitelist and should be sent.
    Composed(ChatMessage),
    /// No whitelist entry covers the event; nothing is sent.
    FilteredOut,
}

/// Filters the event against the whitelist for its stage state and, if it
/// passes, composes the message to post.
pub fn compose(event: &StageEvent, settings: &Settings) -> Notification {
    if !is_whitelisted(event, settings) {
        return Notification::FilteredOut;
    }

    Notification::Composed(render::build_message(
        &event.pipeline,
        &settings.go_server_url,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures::settings;
    use crate::event::fixtures::{job, stage_event};
    use crate::event::{JobResult, StageState};

    #[test]
    fn test_rejected_event_produces_no_message() {
        let settings = settings("http://ci.example.com", "http://chat.example.com");
        let event = stage_event("build-main", StageState::Failed, vec![]);

        assert_eq!(compose(&event, &settings), Notification::FilteredOut);
    }

    #[test]
    fn test_building_is_filtered_regardless_of_whitelist() {
        let mut settings = settings("http://ci.example.com", "http://chat.example.com");
        settings.passed_pipelines_whitelist = Some("*".to_string());
        settings.failed_pipelines_whitelist = Some("*".to_string());
        settings.cancelled_pipelines_whitelist = Some("*".to_string());
        let event = stage_event("build-main", StageState::Building, vec![]);

        assert_eq!(compose(&event, &settings), Notification::FilteredOut);
    }

    #[test]
    fn test_whitelisted_event_is_composed() {
        let mut settings = settings("http://ci.example.com", "http://chat.example.com");
        settings.failed_pipelines_whitelist = Some("build-*, release-?".to_string());
        let event = stage_event(
            "release-1",
            StageState::Failed,
            vec![job("unit", JobResult::Failed), job("lint", JobResult::Passed)],
        );

        let Notification::Composed(message) = compose(&event, &settings) else {
            panic!("expected a composed message");
        };
        assert!(message.text.ends_with("has state: Failed"));
        assert_eq!(message.attachments[0].fields[1].title, "Failed Jobs");
        assert_eq!(message.attachments[0].fields[1].value.lines().count(), 1);
    }
}
