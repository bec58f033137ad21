use log::error;
use url::Url;

use crate::event::{Job, Pipeline};

/// Link to the stage details page.
///
/// e.g. <http://ci.example.com/go/pipelines/demo/5/build/2>
pub fn stage_url(server_url: &str, pipeline: &Pipeline) -> String {
    absolute_link(
        "stage",
        format!(
            "{}/go/pipelines/{}",
            base(server_url),
            pipeline.stage_locator()
        ),
    )
}

/// Link to the value stream map of a pipeline run.
///
/// e.g. <http://ci.example.com/go/pipelines/value_stream_map/demo/5>
pub fn value_stream_map_url(server_url: &str, pipeline: &Pipeline) -> String {
    absolute_link(
        "value stream map",
        format!(
            "{}/go/pipelines/value_stream_map/{}/{}",
            base(server_url),
            pipeline.name,
            pipeline.counter
        ),
    )
}

/// Link to the console tab of a job.
///
/// e.g. <http://ci.example.com/go/tab/build/detail/demo/5/build/2/unit#tab-console>
pub fn job_console_url(server_url: &str, pipeline: &Pipeline, job: &Job) -> String {
    absolute_link(
        "job console",
        format!(
            "{}/go/tab/build/detail/{}/{}#tab-console",
            base(server_url),
            pipeline.stage_locator(),
            job.name
        ),
    )
}

fn base(server_url: &str) -> &str {
    server_url.trim().trim_end_matches('/')
}

// Parsing percent-encodes and removes dot segments. A link that cannot be
// formed degrades to "" so the rest of the message is still sent.
fn absolute_link(target: &str, raw: String) -> String {
    match Url::parse(&raw) {
        Ok(url) => url.to_string(),
        Err(e) => {
            error!("Failed to form a URL to {target} from '{raw}': {e}");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::fixtures::{job, stage_event};
    use crate::event::{JobResult, StageState};

    fn pipeline() -> Pipeline {
        stage_event("g", StageState::Failed, vec![]).pipeline
    }

    #[test]
    fn test_stage_url() {
        assert_eq!(
            stage_url("http://ci.example.com", &pipeline()),
            "http://ci.example.com/go/pipelines/demo/5/build/2"
        );
    }

    #[test]
    fn test_trailing_slash_on_server_url() {
        assert_eq!(
            stage_url("http://ci.example.com/", &pipeline()),
            "http://ci.example.com/go/pipelines/demo/5/build/2"
        );
    }

    #[test]
    fn test_value_stream_map_url() {
        assert_eq!(
            value_stream_map_url("https://ci.example.com:8154", &pipeline()),
            "https://ci.example.com:8154/go/pipelines/value_stream_map/demo/5"
        );
    }

    #[test]
    fn test_job_console_url_is_encoded() {
        let job = job("unit tests", JobResult::Failed);
        assert_eq!(
            job_console_url("http://ci.example.com", &pipeline(), &job),
            "http://ci.example.com/go/tab/build/detail/demo/5/build/2/unit%20tests#tab-console"
        );
    }

    #[test]
    fn test_dot_segments_are_removed() {
        assert_eq!(
            stage_url("http://ci.example.com/proxy/..", &pipeline()),
            "http://ci.example.com/go/pipelines/demo/5/build/2"
        );
    }

    #[test]
    fn test_malformed_server_url_degrades_to_empty() {
        assert_eq!(stage_url("not a url", &pipeline()), "");
        assert_eq!(value_stream_map_url("", &pipeline()), "");
    }
}
