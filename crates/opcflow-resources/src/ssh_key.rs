//! VM SSH public key of a database service instance
//!
//! The key endpoint has no per-item path: reads go to the collection
//! endpoint and updates post a new key, which starts an asynchronous job.

use opcflow_core::{
    Client, Named, PathContext, ResourceClient, ResourceDescriptor, Result, StateClassifier,
    resource_state, wait_for_state, weak,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const SSH_KEY: ResourceDescriptor = ResourceDescriptor::new(
    "SSH public key",
    "/paas/api/v1.1/instancemgmt/{tenant}/services/dbaas/instances/{service}/credentials/crednames/vmspublickey",
    "/paas/api/v1.1/instancemgmt/{tenant}/services/dbaas/instances/{service}/credentials/crednames/vmspublickey",
);

pub const JOB: ResourceDescriptor = ResourceDescriptor::new(
    "job",
    "/paas/api/v1.1/activitylogs/{tenant}/jobs",
    "/paas/api/v1.1/activitylogs/{tenant}/job/{name}",
);

resource_state! {
    pub enum JobStatus {
        New => "NEW",
        Running => "RUNNING" | "IN PROGRESS" | "IN_PROGRESS",
        Succeeded => "SUCCEEDED" | "SUCCEED",
        Failed => "FAILED",
    }
}

pub fn job_classifier() -> StateClassifier<JobStatus> {
    StateClassifier::new([JobStatus::Succeeded], [JobStatus::Failed])
}

#[derive(Debug, Clone, Serialize)]
struct SetKeyRequest<'a> {
    #[serde(rename = "public-key")]
    public_key: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SshKeyInfo {
    #[serde(alias = "cred_name")]
    pub credential_name: String,
    #[serde(alias = "cred_type")]
    pub credential_type: String,
    pub public_key: String,
    pub compute_key_name: String,
    pub description: String,
    pub identity_domain: String,
    pub last_update_time: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SetKeyResponse {
    #[serde(deserialize_with = "weak::string")]
    job_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Job {
    #[serde(deserialize_with = "weak::string")]
    pub job_id: String,
    pub status: JobStatus,
    pub operation_type: String,
    pub summary_message: String,
}

impl Named for Job {
    fn name(&self) -> &str {
        &self.job_id
    }
}

pub struct SshKeys {
    client: Client,
    keys: ResourceClient,
    jobs: ResourceClient,
}

impl SshKeys {
    pub fn new(client: &Client) -> Self {
        Self {
            client: client.clone(),
            keys: client.resource(SSH_KEY),
            jobs: client.resource(JOB),
        }
    }

    fn context(&self, instance: &str) -> PathContext {
        self.client.context().service(instance)
    }

    pub async fn get(&self, instance: &str) -> Result<SshKeyInfo> {
        self.keys.read(&self.context(instance), "").await
    }

    /// Replace the instance's VM public key and wait for the update job
    pub async fn set(&self, instance: &str, public_key: &str) -> Result<SshKeyInfo> {
        let ctx = self.context(instance);
        let response: SetKeyResponse = self
            .keys
            .create(&ctx, &SetKeyRequest { public_key })
            .await?;
        info!("Updating SSH public key of {}", instance);

        if response.job_id.is_empty() {
            warn!(
                "No job returned for SSH key update of {}, skipping the wait",
                instance
            );
        } else {
            let spec = self.client.poll_spec(format!(
                "SSH key update job {} on {}",
                response.job_id, instance
            ));
            let _: Job = wait_for_state(
                &self.jobs,
                &ctx,
                &response.job_id,
                &spec,
                &job_classifier(),
                |job: &Job| job.status.clone(),
            )
            .await?;
        }

        self.get(instance).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::client;
    use opcflow_core::OpcError;
    use opcflow_core::testing::ScriptedBackend;
    use serde_json::json;
    use std::sync::Arc;

    const KEY_URL: &str = "https://api.example.com/paas/api/v1.1/instancemgmt/idcs-dom/services/dbaas/instances/db1/credentials/crednames/vmspublickey";

    #[tokio::test(start_paused = true)]
    async fn test_set_key_waits_for_job() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .respond_json(202, json!({"jobId": 4211, "status": "New"}))
                .respond_json(200, json!({"jobId": 4211, "status": "RUNNING"}))
                .respond_json(200, json!({"jobId": "4211", "status": "SUCCEED"}))
                .respond_json(
                    200,
                    json!({
                        "credName": "vmspublickey",
                        "public-key": "ssh-rsa BBBB",
                        "credType": "SSH"
                    }),
                ),
        );
        let keys = SshKeys::new(&client(backend.clone()));

        let key = keys.set("db1", "ssh-rsa BBBB").await.unwrap();
        assert_eq!(key.public_key, "ssh-rsa BBBB");
        assert_eq!(key.credential_name, "vmspublickey");

        let requests = backend.requests();
        assert_eq!(requests[0].url, KEY_URL);
        assert_eq!(
            requests[0].body.as_deref(),
            Some(br#"{"public-key":"ssh-rsa BBBB"}"#.as_slice())
        );
        assert_eq!(
            requests[1].url,
            "https://api.example.com/paas/api/v1.1/activitylogs/idcs-dom/job/4211"
        );
        assert_eq!(requests[3].url, KEY_URL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_is_an_error() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .respond_json(202, json!({"job_id": "7"}))
                .respond_json(200, json!({"job_id": "7", "status": "FAILED"})),
        );
        let keys = SshKeys::new(&client(backend));

        let err = keys.set("db1", "ssh-rsa CCCC").await.unwrap_err();
        assert!(matches!(err, OpcError::State { ref resource, .. } if resource == "job 7"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_key_without_job_reads_key_back() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .respond(202, "")
                .respond_json(
                    200,
                    json!({"credName": "vmspublickey", "publicKey": "ssh-rsa DDDD"}),
                ),
        );
        let keys = SshKeys::new(&client(backend.clone()));

        let key = keys.set("db1", "ssh-rsa DDDD").await.unwrap();
        assert_eq!(key.public_key, "ssh-rsa DDDD");

        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.url == KEY_URL));
    }
}
