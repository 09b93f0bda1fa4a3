use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

mod azure;
mod error;
mod wait;

pub use azure::AzureAvatarClient;
pub use error::ClientError;
pub use wait::{
    submit_and_wait, wait_for_completion, JobEvent, JobEventSender, WaitOptions,
    DEFAULT_POLL_INTERVAL,
};


// Fixed synthesis defaults. The batch avatar submission body is constant
// apart from the input text.
const DISPLAY_NAME: &str = "Simple avatar synthesis";
const DESCRIPTION: &str = "Simple avatar synthesis description";
const VOICE: &str = "en-US-JennyNeural";
const AVATAR_CHARACTER: &str = "lisa";
const AVATAR_STYLE: &str = "graceful-sitting";
const VIDEO_FORMAT: &str = "webm";
const VIDEO_CODEC: &str = "vp9";
const SUBTITLE_TYPE: &str = "soft_embedded";
const BACKGROUND_COLOR: &str = "transparent";

/// Batch avatar synthesis request body, field names per the service wire
/// format.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    pub display_name: String,
    pub description: String,
    pub text_type: String,
    pub synthesis_config: VoiceConfig,
    pub inputs: Vec<SynthesisInput>,
    pub properties: AvatarProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceConfig {
    pub voice: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SynthesisInput {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarProperties {
    pub customized: bool,
    pub talking_avatar_character: String,
    pub talking_avatar_style: String,
    pub video_format: String,
    pub video_codec: String,
    pub subtitle_type: String,
    pub background_color: String,
}

impl SynthesisRequest {
    /// Build a plain-text submission with the fixed voice and avatar persona.
    pub fn plain_text(text: &str) -> Self {
        Self {
            display_name: DISPLAY_NAME.to_string(),
            description: DESCRIPTION.to_string(),
            text_type: "PlainText".to_string(),
            synthesis_config: VoiceConfig {
                voice: VOICE.to_string(),
            },
            inputs: vec![SynthesisInput {
                text: text.to_string(),
            }],
            properties: AvatarProperties {
                customized: false,
                talking_avatar_character: AVATAR_CHARACTER.to_string(),
                talking_avatar_style: AVATAR_STYLE.to_string(),
                video_format: VIDEO_FORMAT.to_string(),
                video_codec: VIDEO_CODEC.to_string(),
                subtitle_type: SUBTITLE_TYPE.to_string(),
                background_color: BACKGROUND_COLOR.to_string(),
            },
        }
    }
}

/// Service-defined job status. The status set is open; only `Succeeded` and
/// `Failed` are terminal, anything else means the job is still in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus(pub String);

impl JobStatus {
    pub const SUCCEEDED: &'static str = "Succeeded";
    pub const FAILED: &'static str = "Failed";

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_terminal(&self) -> bool {
        self.0 == Self::SUCCEEDED || self.0 == Self::FAILED
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        JobStatus(s.to_string())
    }
}

/// Read-through view of a server-side job as returned by `list`. The client
/// only observes jobs, it never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<String>,
}

/// Outcome of a single status fetch. `Succeeded` carries the download URL so
/// callers cannot mistake a URL for a status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Pending(JobStatus),
    Succeeded(String),
    Failed,
}

#[async_trait]
pub trait SynthesisJobClient: Send + Sync {
    /// Submit a new batch synthesis job, returning the server-assigned job id.
    async fn submit(&self, text: &str) -> Result<String, ClientError>;

    /// Fetch the current state of a job.
    async fn poll(&self, job_id: &str) -> Result<PollOutcome, ClientError>;

    /// Enumerate previously submitted jobs, paged by `(skip, top)`.
    async fn list(&self, skip: u32, top: u32) -> Result<Vec<JobSummary>, ClientError>;
}
