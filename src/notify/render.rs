use super::links::{job_console_url, stage_url, value_stream_map_url};
use crate::event::{Job, JobResult, Pipeline};
use crate::rocketchat::{Attachment, AttachmentField, ChatMessage};

/// Builds the chat message for a whitelisted stage event.
///
/// The message reads `Stage [<locator>](<stage url>) has state: <state>` and
/// carries one attachment with a short "Label" field linking to the value
/// stream map, followed by a "`<state>` Jobs" field listing every failed or
/// cancelled job in event order.
pub fn build_message(pipeline: &Pipeline, server_url: &str) -> ChatMessage {
    let mut message = ChatMessage::new(top_line(pipeline, server_url));

    let label = AttachmentField::new(
        "Label",
        format!(
            "[{}]({})",
            pipeline.label(),
            value_stream_map_url(server_url, pipeline)
        ),
    )
    .short();
    let jobs = AttachmentField::new(
        format!("{} Jobs", pipeline.stage.state),
        changed_jobs_text(pipeline, server_url),
    );

    message.add_attachment(Attachment {
        fields: vec![label, jobs],
    });
    message
}

pub fn top_line(pipeline: &Pipeline, server_url: &str) -> String {
    format!(
        "Stage [{}]({}) has state: {}",
        pipeline.stage_locator(),
        stage_url(server_url, pipeline),
        pipeline.stage.state
    )
}

/// One ` - [<job>](<console url>) <outcome>` line per failed or cancelled job.
pub fn changed_jobs_text(pipeline: &Pipeline, server_url: &str) -> String {
    pipeline
        .stage
        .jobs
        .iter()
        .filter_map(|job| {
            outcome(job).map(|outcome| {
                format!(
                    " - [{}]({}) {outcome}",
                    job.name,
                    job_console_url(server_url, pipeline, job)
                )
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn outcome(job: &Job) -> Option<&'static str> {
    match job.result {
        JobResult::Failed => Some("failed"),
        JobResult::Cancelled => Some("was cancelled"),
        JobResult::Passed | JobResult::Unknown => None,
    }
}
