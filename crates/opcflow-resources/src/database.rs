//! Database service instance client

use opcflow_core::{
    Client, Named, OpcError, ResourceClient, ResourceDescriptor, Result, StateClassifier,
    resource_state, wait_for_deletion, wait_for_state, weak,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

pub const DATABASE_INSTANCE: ResourceDescriptor = ResourceDescriptor::new(
    "database service instance",
    "/paas/service/dbcs/api/v1.1/instances/{tenant}",
    "/paas/service/dbcs/api/v1.1/instances/{tenant}/{name}",
)
.with_items_key("services");

resource_state! {
    pub enum DatabaseState {
        Running => "Running",
        InProgress => "In Progress",
        Configuring => "Configuring",
        Maintenance => "Maintenance",
        Starting => "Starting",
        Stopping => "Stopping",
        Stopped => "Stopped",
        Terminating => "Terminating",
        Failed => "Failed",
    }
}

pub fn running_classifier() -> StateClassifier<DatabaseState> {
    StateClassifier::new(
        [DatabaseState::Running],
        [DatabaseState::Failed, DatabaseState::Stopped],
    )
}

pub fn terminated_classifier() -> StateClassifier<DatabaseState> {
    StateClassifier::new(Vec::new(), [DatabaseState::Failed])
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabaseInput {
    pub service_name: String,
    /// e.g. `19.0.0.0`
    pub version: String,
    /// `SE`, `EE`, `EE_HP`, `EE_EP`
    pub edition: String,
    pub level: String,
    pub shape: String,
    pub subscription_type: String,
    pub vm_public_key_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Per-database parameter blocks, passed through as-is
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseInstance {
    pub service_name: String,
    pub status: DatabaseState,
    pub version: String,
    pub edition: String,
    pub level: String,
    pub shape: String,
    pub subscription_type: String,
    pub description: Option<String>,
    pub connect_descriptor: String,
    pub em_url: String,
    pub glassfish_url: String,
    #[serde(deserialize_with = "weak::number")]
    pub num_ip_reservations: u32,
    pub identity_domain: String,
}

impl Named for DatabaseInstance {
    fn name(&self) -> &str {
        &self.service_name
    }
}

pub struct Databases {
    client: Client,
    resources: ResourceClient,
}

impl Databases {
    pub fn new(client: &Client) -> Self {
        Self {
            client: client.clone(),
            resources: client.resource(DATABASE_INSTANCE),
        }
    }

    /// Create an instance and wait until it is Running.
    ///
    /// If the instance fails or times out before reaching Running it is
    /// deleted again and the original error is returned.
    pub async fn create(&self, input: &CreateDatabaseInput) -> Result<DatabaseInstance> {
        let ctx = self.client.context();
        let name = input.service_name.as_str();
        let _: Value = self.resources.create(&ctx, input).await?;
        info!("Requested database service instance {}", name);

        let spec = self
            .client
            .poll_spec(format!("database service instance {} to be running", name));
        let result = wait_for_state(
            &self.resources,
            &ctx,
            name,
            &spec,
            &running_classifier(),
            |db: &DatabaseInstance| db.status.clone(),
        )
        .await;

        match result {
            Ok(instance) => Ok(instance),
            Err(err @ (OpcError::State { .. } | OpcError::Timeout { .. })) => {
                warn!("Database service instance {} did not start: {}", name, err);
                if let Err(cleanup) = self.delete(name).await {
                    error!(
                        "Failed to clean up database service instance {}: {}",
                        name, cleanup
                    );
                }
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn get(&self, name: &str) -> Result<Option<DatabaseInstance>> {
        self.resources.lookup(&self.client.context(), name).await
    }

    pub async fn list(&self) -> Result<Vec<DatabaseInstance>> {
        self.resources.list(&self.client.context()).await
    }

    /// Delete and wait until the instance disappears. Deleting an absent one succeeds.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let ctx = self.client.context();
        self.resources.delete(&ctx, name).await?;
        info!("Deleting database service instance {}", name);

        let spec = self
            .client
            .poll_spec(format!("database service instance {} to be deleted", name));
        wait_for_deletion(
            &self.resources,
            &ctx,
            name,
            &spec,
            &terminated_classifier(),
            |db: &DatabaseInstance| db.status.clone(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::client;
    use opcflow_core::HttpRequest;
    use opcflow_core::testing::ScriptedBackend;
    use serde_json::json;
    use std::sync::Arc;

    fn method_of(request: &HttpRequest) -> String {
        request.method.as_str().to_string()
    }

    fn input() -> CreateDatabaseInput {
        CreateDatabaseInput {
            service_name: "db1".to_string(),
            version: "19.0.0.0".to_string(),
            edition: "EE".to_string(),
            level: "PAAS".to_string(),
            shape: "VM.Standard2.1".to_string(),
            subscription_type: "HOURLY".to_string(),
            vm_public_key_text: "ssh-rsa AAAA".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_waits_for_running() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .respond(202, "")
                .respond(404, "not yet")
                .respond_json(200, json!({"service_name": "db1", "status": "In Progress"}))
                .respond_json(
                    200,
                    json!({
                        "SERVICE_NAME": "db1",
                        "status": "Running",
                        "connect_descriptor": "db1:1521/pdb1",
                        "num_ip_reservations": "1"
                    }),
                ),
        );
        let dbs = Databases::new(&client(backend.clone()));

        let db = dbs.create(&input()).await.unwrap();
        assert_eq!(db.status, DatabaseState::Running);
        assert_eq!(db.connect_descriptor, "db1:1521/pdb1");
        assert_eq!(db.num_ip_reservations, 1);
        assert_eq!(
            backend.requests()[0].url,
            "https://api.example.com/paas/service/dbcs/api/v1.1/instances/idcs-dom"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_create_is_cleaned_up() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .respond(202, "")
                .respond_json(200, json!({"serviceName": "db1", "status": "Failed"}))
                .respond(202, "")
                .respond(404, ""),
        );
        let dbs = Databases::new(&client(backend.clone()));

        let err = dbs.create(&input()).await.unwrap_err();
        assert!(matches!(err, OpcError::State { ref state, .. } if state == "Failed"));

        let methods: Vec<String> = backend.requests().iter().map(method_of).collect();
        assert_eq!(methods, vec!["POST", "GET", "DELETE", "GET"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_error_during_wait_is_not_compensated() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .respond(202, "")
                .respond(500, "internal"),
        );
        let dbs = Databases::new(&client(backend.clone()));

        let err = dbs.create(&input()).await.unwrap_err();
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_list_reads_services_wrapper() {
        let backend = Arc::new(ScriptedBackend::new().respond_json(
            200,
            json!({"uri": "x", "services": [
                {"serviceName": "db1", "status": "Running"},
                {"serviceName": "db2", "status": "Stopped"}
            ]}),
        ));
        let dbs = Databases::new(&client(backend));

        let all = dbs.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].status, DatabaseState::Stopped);
    }
}
