// src/jobs/backend.rs
//! Storage seam for tracked jobs, with the REST implementation
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::ApiClient;
use crate::jobs::model::{Job, JobPatch, NewJob};

/// Remote store for tracked jobs. `JobTracker` only talks to this seam, so
/// tests can drive it with a scripted backend.
#[async_trait]
pub trait JobsBackend: Send + Sync {
    async fn list(&self) -> Result<Vec<Job>>;
    async fn get(&self, id: &str) -> Result<Job>;
    async fn create(&self, job: &NewJob) -> Result<Job>;
    async fn update(&self, id: &str, patch: &JobPatch) -> Result<Job>;
    async fn delete(&self, id: &str) -> Result<()>;
}

pub struct RestJobsBackend {
    client: Arc<ApiClient>,
}

impl RestJobsBackend {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobsBackend for RestJobsBackend {
    async fn list(&self) -> Result<Vec<Job>> {
        self.client.get("/jobs").await
    }

    async fn get(&self, id: &str) -> Result<Job> {
        self.client.get(&format!("/jobs/{}", id)).await
    }

    async fn create(&self, job: &NewJob) -> Result<Job> {
        self.client.post_json("/jobs", job).await
    }

    async fn update(&self, id: &str, patch: &JobPatch) -> Result<Job> {
        self.client.patch_json(&format!("/jobs/{}", id), patch).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("/jobs/{}", id)).await
    }
}
