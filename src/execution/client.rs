use super::model::{ExecutionRequest, ExecutionResponse};
use super::ExecutionError;
use crate::config::RunnerConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A remote service that compiles and runs a program against a stdin.
///
/// Implementations must return promptly with [`ExecutionError::Cancelled`]
/// once `cancel` fires.
#[async_trait]
pub trait Sandbox: Send + Sync {
    async fn submit(
        &self,
        request: &ExecutionRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResponse, ExecutionError>;
}

/// Client for the Judge0 submissions API.
///
/// With `wait` on, one `POST /submissions?wait=true` returns the finished
/// submission. Otherwise (or when the server answers before the run ends)
/// the returned token is polled with `GET /submissions/{token}`.
#[derive(Debug, Clone)]
pub struct Judge0Client {
    http: Client,
    base: Url,
    config: RunnerConfig,
    poll_interval: Duration,
}

impl Judge0Client {
    pub fn new(config: RunnerConfig) -> Result<Self, ExecutionError> {
        config
            .validate()
            .map_err(|e| ExecutionError::Client(e.to_string()))?;
        let base = config
            .base_url()
            .map_err(|e| ExecutionError::Client(e.to_string()))?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ExecutionError::Client(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base,
            config,
            poll_interval: POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// `{base}/submissions[/{token}]?base64_encoded=..[&wait=..]`
    fn endpoint(&self, token: Option<&str>) -> Result<Url, ExecutionError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ExecutionError::Client(format!("{} cannot be used as a base URL", self.base)))?
            .pop_if_empty()
            .push("submissions")
            .extend(token);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("base64_encoded", bool_str(self.config.base64_encoded));
            if token.is_none() {
                query.append_pair("wait", bool_str(self.config.wait));
            }
        }
        Ok(url)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<ExecutionResponse, ExecutionError> {
        let builder = match &self.config.api_key {
            Some(key) => builder.header(self.config.api_key_header.as_str(), key.as_str()),
            None => builder,
        };
        let response = builder.send().await.map_err(ExecutionError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = status.as_u16(), "sandbox returned an error status");
            return Err(ExecutionError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<ExecutionResponse>().await.map_err(|e| {
            ExecutionError::InvalidResponse(format!("Failed to parse sandbox response as JSON: {}", e))
        })
    }

    async fn run(&self, request: &ExecutionRequest) -> Result<ExecutionResponse, ExecutionError> {
        let body = if self.config.base64_encoded {
            request.encoded()
        } else {
            request.clone()
        };

        let url = self.endpoint(None)?;
        let mut response = self.send(self.http.post(url).json(&body)).await?;

        let finished = response.status.as_ref().is_some_and(|s| !s.is_pending());
        if !finished {
            let token = response.token.clone().ok_or_else(|| {
                ExecutionError::InvalidResponse("Sandbox returned neither a result nor a token".to_string())
            })?;
            response = self.poll(&token).await?;
        }

        response.base64_encoded = self.config.base64_encoded;
        Ok(response)
    }

    async fn poll(&self, token: &str) -> Result<ExecutionResponse, ExecutionError> {
        let url = self.endpoint(Some(token))?;
        loop {
            let response = self.send(self.http.get(url.clone())).await?;
            match &response.status {
                Some(status) if !status.is_pending() => return Ok(response),
                status => {
                    debug!(token, status = ?status, "submission still pending");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}

#[async_trait]
impl Sandbox for Judge0Client {
    #[instrument(skip_all, fields(language_id = request.language_id, stdin_len = request.stdin.len()))]
    async fn submit(
        &self,
        request: &ExecutionRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResponse, ExecutionError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("submission cancelled");
                Err(ExecutionError::Cancelled)
            }
            result = self.run(request) => {
                if let Ok(response) = &result {
                    debug!(status = response.status_description(), "submission finished");
                }
                result
            }
        }
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
