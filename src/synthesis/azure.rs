use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::{debug, error, info};

use super::error::ClientError;
use super::{JobStatus, JobSummary, PollOutcome, SynthesisJobClient, SynthesisRequest};
use crate::config::Credentials;

/// Host suffix of the speech service; the region supplies the prefix.
const SERVICE_HOST: &str = "customvoice.api.speech.microsoft.com";
const API_PATH: &str = "api/texttospeech/3.1-preview1";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Client for the batch avatar synthesis API. Each call issues a fresh
/// authenticated request; nothing is cached between calls and no call is
/// retried.
#[derive(Debug)]
pub struct AzureAvatarClient {
    http_client: HttpClient,
    credentials: Credentials,
    endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct JobResponse {
    status: JobStatus,
    #[serde(default)]
    outputs: Option<JobOutputs>,
}

#[derive(Debug, Deserialize)]
struct JobOutputs {
    result: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    values: Vec<JobSummary>,
}

impl AzureAvatarClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            http_client: HttpClient::new(),
            credentials,
            endpoint: None,
        }
    }

    /// Send requests to `endpoint` instead of the regional service host.
    /// Tests point this at a local listener.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), API_PATH),
            None => format!(
                "https://{}.{}/{}",
                self.credentials.region, SERVICE_HOST, API_PATH
            ),
        }
    }

    /// Reject incomplete input before any request goes out.
    fn validate(&self, text: &str) -> Result<(), ClientError> {
        if self.credentials.subscription_key.trim().is_empty() {
            return Err(ClientError::Validation("subscription key".to_string()));
        }
        if text.trim().is_empty() {
            return Err(ClientError::Validation("text".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SynthesisJobClient for AzureAvatarClient {
    async fn submit(&self, text: &str) -> Result<String, ClientError> {
        self.validate(text)?;

        let url = format!("{}/batchsynthesis/talkingavatar", self.base_url());
        let request = SynthesisRequest::plain_text(text);
        let response = self
            .http_client
            .post(&url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.credentials.subscription_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "failed to submit batch avatar synthesis job: {}", body);
            return Err(ClientError::Submission {
                status: status.as_u16(),
                body,
            });
        }

        let submitted: SubmitResponse = response.json().await?;
        info!(job_id = %submitted.id, "batch avatar synthesis job submitted");
        Ok(submitted.id)
    }

    async fn poll(&self, job_id: &str) -> Result<PollOutcome, ClientError> {
        let url = format!(
            "{}/batchsynthesis/talkingavatar/{}",
            self.base_url(),
            urlencoding::encode(job_id)
        );
        let response = self
            .http_client
            .get(&url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.credentials.subscription_key)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), job_id, "failed to get batch synthesis job: {}", body);
            return Err(ClientError::Poll {
                status: status.as_u16(),
                body,
            });
        }

        let job: JobResponse = response.json().await?;
        debug!(job_id, status = %job.status, "fetched batch synthesis job");

        match job.status.as_str() {
            JobStatus::SUCCEEDED => {
                match job.outputs.and_then(|outputs| outputs.result) {
                    Some(result_url) => {
                        info!(job_id, "batch synthesis job succeeded, download URL: {}", result_url);
                        Ok(PollOutcome::Succeeded(result_url))
                    }
                    // The service contract says a succeeded job always has a
                    // result URL; a body without one is malformed.
                    None => Err(ClientError::Poll {
                        status: status.as_u16(),
                        body: "job reported Succeeded without an outputs.result URL".to_string(),
                    }),
                }
            }
            JobStatus::FAILED => Ok(PollOutcome::Failed),
            _ => Ok(PollOutcome::Pending(job.status)),
        }
    }

    async fn list(&self, skip: u32, top: u32) -> Result<Vec<JobSummary>, ClientError> {
        let url = format!(
            "{}/batchsynthesis/talkingavatar?skip={}&top={}",
            self.base_url(),
            skip,
            top
        );
        let response = self
            .http_client
            .get(&url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.credentials.subscription_key)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "failed to list batch synthesis jobs: {}", body);
            return Err(ClientError::List {
                status: status.as_u16(),
                body,
            });
        }

        let page: ListResponse = response.json().await?;
        info!("listed {} batch synthesis jobs", page.values.len());
        Ok(page.values)
    }
}
