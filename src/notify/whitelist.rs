use log::{debug, error, warn};

use super::pattern;
use crate::config::WhitelistSource;
use crate::event::{StageEvent, StageState};

/// Decides whether the event's pipeline group is whitelisted for its stage outcome.
///
/// Only terminal outcomes (passed, failed, cancelled) can be whitelisted. A
/// whitelist that cannot be read is treated as empty, so a broken setting
/// never produces a notification.
pub fn is_whitelisted(event: &StageEvent, source: &dyn WhitelistSource) -> bool {
    let pipeline = &event.pipeline;
    let state = pipeline.stage.state;

    if !matches!(
        state,
        StageState::Passed | StageState::Failed | StageState::Cancelled
    ) {
        warn!(
            "Skipping stage {}/{}: no whitelist applies to state {state}",
            pipeline.name, pipeline.stage.name
        );
        return false;
    }

    let whitelist = match source.pipelines_whitelist(state) {
        Ok(whitelist) => whitelist.unwrap_or_default(),
        Err(e) => {
            error!("Failed to load whitelist for {state} pipelines, treating it as empty: {e}");
            String::new()
        }
    };

    let whitelisted = group_matches(&pipeline.group, &whitelist);
    if !whitelisted {
        warn!(
            "Skipping stage {}/{}: group '{}' is not whitelisted for {state} pipelines",
            pipeline.name, pipeline.stage.name, pipeline.group
        );
    }
    whitelisted
}

/// Tests `group` against a comma-separated list of glob patterns.
pub fn group_matches(group: &str, whitelist: &str) -> bool {
    if whitelist.trim().is_empty() {
        return false;
    }

    whitelist.split(',').map(str::trim).any(|candidate| {
        debug!("Checking pipeline group '{group}' against '{candidate}'");
        pattern::matches(group, candidate)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::{NotifierError, Result};
    use crate::event::fixtures::stage_event;

    struct BrokenSettings;

    impl WhitelistSource for BrokenSettings {
        fn pipelines_whitelist(&self, _state: StageState) -> Result<Option<String>> {
            Err(NotifierError::Config("unreadable plugin settings".to_string()))
        }
    }

    fn settings_with_all(whitelist: &str) -> Settings {
        Settings {
            passed_pipelines_whitelist: Some(whitelist.to_string()),
            failed_pipelines_whitelist: Some(whitelist.to_string()),
            cancelled_pipelines_whitelist: Some(whitelist.to_string()),
            ..Settings::default()
        }
    }

    #[test]
    fn test_group_matches_pattern_list() {
        let whitelist = "build-*, release-?";
        assert!(group_matches("build-main", whitelist));
        assert!(group_matches("release-1", whitelist));
        assert!(!group_matches("releases-1", whitelist));
        assert!(!group_matches("other", whitelist));
    }

    #[test]
    fn test_tokens_are_trimmed_and_star_is_a_catch_all() {
        assert!(group_matches("deploy", "  build-* ,   deploy  "));
        assert!(group_matches("anything", "build-*, *"));
        assert!(!group_matches("deploy", "build-*,,"));
    }

    #[test]
    fn test_empty_whitelist_matches_nothing() {
        assert!(!group_matches("", ""));
        assert!(!group_matches("build", "  "));
    }

    #[test]
    fn test_building_is_never_whitelisted() {
        let settings = settings_with_all("*");
        let event = stage_event("build-main", StageState::Building, vec![]);
        assert!(!is_whitelisted(&event, &settings));
    }

    #[test]
    fn test_whitelist_follows_stage_state_only() {
        let settings = Settings {
            passed_pipelines_whitelist: Some("passing-*".to_string()),
            failed_pipelines_whitelist: Some("failing-*".to_string()),
            ..Settings::default()
        };

        assert!(is_whitelisted(
            &stage_event("failing-a", StageState::Failed, vec![]),
            &settings
        ));
        assert!(!is_whitelisted(
            &stage_event("passing-a", StageState::Failed, vec![]),
            &settings
        ));
        assert!(is_whitelisted(
            &stage_event("passing-a", StageState::Passed, vec![]),
            &settings
        ));
    }

    #[test]
    fn test_unset_whitelist_drops_event() {
        let settings = Settings::default();
        let event = stage_event("anything", StageState::Cancelled, vec![]);
        assert!(!is_whitelisted(&event, &settings));
    }

    #[test]
    fn test_unreadable_whitelist_fails_closed() {
        let event = stage_event("build-main", StageState::Failed, vec![]);
        assert!(!is_whitelisted(&event, &BrokenSettings));
    }
}
