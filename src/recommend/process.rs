use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use super::error::RecommendError;
use super::extract::{parse_document, ExtractError};
use super::types::RecommendationDocument;
use crate::config::RecommenderConfig;

#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(&self, query: &str) -> Result<RecommendationDocument, RecommendError>;
}

#[derive(Debug)]
pub struct RecommenderOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitStatus,
}

impl RecommenderOutput {
    // What the caller gets to see when the output is unusable.
    fn diagnostic(&self, reason: &ExtractError) -> String {
        if !self.stdout.is_empty() {
            self.stdout.clone()
        } else if !self.stderr.is_empty() {
            self.stderr.clone()
        } else {
            reason.to_string()
        }
    }
}

/// Runs the recommender as `program args... <query>`, one process per call.
pub struct ProcessRecommender {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl ProcessRecommender {
    pub fn new(config: &RecommenderConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            permits: Arc::new(Semaphore::new(config.max_processes.max(1))),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Waiting for a free process slot counts against the same timeout as
    /// the run itself.
    pub async fn run(&self, query: &str) -> Result<RecommenderOutput, RecommendError> {
        let deadline = tokio::time::Instant::now() + self.timeout;

        let _permit = match tokio::time::timeout_at(deadline, self.permits.acquire()).await {
            Ok(permit) => permit.map_err(|e| RecommendError::Io(std::io::Error::other(e)))?,
            Err(_) => {
                warn!(program = %self.program, timeout = ?self.timeout, "Timed out waiting for a recommender slot");
                return Err(RecommendError::Timeout(self.timeout));
            }
        };

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(query)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| RecommendError::Spawn {
            program: self.program.clone(),
            source: e,
        })?;

        let start = Instant::now();
        // Dropping the child on timeout (or when the request goes away) kills it.
        let output = match tokio::time::timeout_at(deadline, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(program = %self.program, timeout = ?self.timeout, "Recommender timed out");
                return Err(RecommendError::Timeout(self.timeout));
            }
        };

        debug!(
            program = %self.program,
            status = %output.status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            stdout_len = output.stdout.len(),
            "Recommender finished"
        );

        Ok(RecommenderOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status,
        })
    }
}

#[async_trait]
impl Recommender for ProcessRecommender {
    async fn recommend(&self, query: &str) -> Result<RecommendationDocument, RecommendError> {
        let output = self.run(query).await?;

        if !output.stderr.is_empty() {
            warn!(stderr = %output.stderr.trim_end(), "Recommender stderr");
        }
        if !output.status.success() {
            warn!(status = %output.status, "Recommender exited with failure status");
        }

        parse_document(&output.stdout).map_err(|e| {
            error!(error = %e, "Failed to parse recommender output");
            RecommendError::Script {
                details: output.diagnostic(&e),
            }
        })
    }
}
