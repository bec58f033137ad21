use serde::{Deserialize, Deserializer};
use std::fmt;

/// A stage-status notification as delivered by the CI server.
///
/// The payload nests the stage inside the pipeline:
/// `{"pipeline": {"name", "counter", "group", "label", "stage": {...}}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StageEvent {
    pub pipeline: Pipeline,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pipeline {
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub counter: String,
    #[serde(default)]
    pub group: String,
    /// Falls back to the counter when the server omits it.
    #[serde(default)]
    label: Option<String>,
    pub stage: Stage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Stage {
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub counter: String,
    pub state: StageState,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub name: String,
    #[serde(default)]
    pub result: JobResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum StageState {
    Building,
    Passed,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum JobResult {
    Passed,
    Failed,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

impl StageEvent {
    /// Parses the raw JSON body of a stage-status request.
    pub fn from_json(body: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(body)?)
    }
}

impl Pipeline {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.counter)
    }

    /// `<pipeline>/<counter>/<stage>/<stage counter>`
    pub fn stage_locator(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.name, self.counter, self.stage.name, self.stage.counter
        )
    }
}

impl fmt::Display for StageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Building => "Building",
            Self::Passed => "Passed",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

// Counters arrive as strings from the server but as numbers from some hand-written fixtures.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}
