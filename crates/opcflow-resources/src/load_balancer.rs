//! Load balancer (VLBR) client

use crate::lbaas::{self, LbaasResource, LbaasState};
use opcflow_core::{
    Client, Named, PathContext, Projection, ResourceClient, ResourceDescriptor, Result, weak,
};
use serde::{Deserialize, Serialize};

pub const VLBR_MEDIA_TYPE: &str = "application/vnd.com.oracle.oracloud.lbaas.VLBR+json";

pub const LOAD_BALANCER: ResourceDescriptor =
    ResourceDescriptor::new("load balancer", "/{region}/vlbrs", "/{region}/vlbrs/{name}")
        .with_media_type(VLBR_MEDIA_TYPE);

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoadBalancerInput {
    pub name: String,
    pub region: String,
    /// `INTERNET_FACING` or `INTERNAL`
    pub scheme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_load_balancer: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permitted_clients: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permitted_methods: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLoadBalancerInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permitted_clients: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permitted_methods: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoadBalancerInfo {
    pub name: String,
    pub region: String,
    pub state: LbaasState,
    pub scheme: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "weak::boolean")]
    pub disabled: bool,
    pub canonical_host_name: String,
    pub uri: String,
    #[serde(deserialize_with = "weak::string_list")]
    pub permitted_clients: Vec<String>,
    #[serde(deserialize_with = "weak::string_list")]
    pub permitted_methods: Vec<String>,
    #[serde(deserialize_with = "weak::string_list")]
    pub tags: Vec<String>,
}

impl Named for LoadBalancerInfo {
    fn name(&self) -> &str {
        &self.name
    }
}

impl LbaasResource for LoadBalancerInfo {
    fn state(&self) -> &LbaasState {
        &self.state
    }
}

pub struct LoadBalancers {
    client: Client,
    resources: ResourceClient,
}

impl LoadBalancers {
    pub fn new(client: &Client) -> Self {
        Self {
            client: client.clone(),
            resources: client.resource(LOAD_BALANCER),
        }
    }

    fn context(&self, region: &str) -> PathContext {
        self.client.context().region(region)
    }

    /// Create a load balancer and wait until it is CREATED or HEALTHY
    pub async fn create(&self, input: &CreateLoadBalancerInput) -> Result<LoadBalancerInfo> {
        let ctx = self.context(&input.region);
        lbaas::create_and_wait(&self.client, &self.resources, &ctx, &input.name, input).await
    }

    pub async fn get(&self, region: &str, name: &str) -> Result<Option<LoadBalancerInfo>> {
        self.resources.lookup(&self.context(region), name).await
    }

    pub async fn get_detailed(&self, region: &str, name: &str) -> Result<LoadBalancerInfo> {
        self.resources
            .read_with_projection(&self.context(region), name, Projection::Detailed)
            .await
    }

    pub async fn list(&self, region: &str) -> Result<Vec<LoadBalancerInfo>> {
        self.resources.list(&self.context(region)).await
    }

    /// Apply a partial update and wait for the modification to settle
    pub async fn update(
        &self,
        region: &str,
        name: &str,
        input: &UpdateLoadBalancerInput,
    ) -> Result<LoadBalancerInfo> {
        let ctx = self.context(region);
        lbaas::patch_and_wait(&self.client, &self.resources, &ctx, name, input).await
    }

    /// Delete and wait until the load balancer is gone. Deleting an absent one succeeds.
    pub async fn delete(&self, region: &str, name: &str) -> Result<()> {
        let ctx = self.context(region);
        lbaas::delete_and_wait::<LoadBalancerInfo>(&self.client, &self.resources, &ctx, name)
            .await
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

    fn input() -> CreateLoadBalancerInput {
        CreateLoadBalancerInput {
            name: "lb1".to_string(),
            region: "uscom-central-1".to_string(),
            scheme: "INTERNET_FACING".to_string(),
            permitted_methods: vec!["GET".to_string(), "POST".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_create_body_skips_unset_fields() {
        let body = serde_json::to_value(input()).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "lb1",
                "region": "uscom-central-1",
                "scheme": "INTERNET_FACING",
                "permittedMethods": ["GET", "POST"]
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_waits_until_healthy() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .respond_json(202, json!({"name": "lb1", "state": "CREATION_IN_PROGRESS"}))
                .respond_json(200, json!({"name": "lb1", "state": "CREATION_IN_PROGRESS"}))
                .respond_json(
                    200,
                    json!({
                        "name": "lb1",
                        "state": "HEALTHY",
                        "canonicalHostName": "lb1-dom.balancer.example.com",
                        "disabled": "false"
                    }),
                ),
        );
        let lbs = LoadBalancers::new(&client(backend.clone()));

        let lb = lbs.create(&input()).await.unwrap();
        assert_eq!(lb.state, LbaasState::Healthy);
        assert_eq!(lb.canonical_host_name, "lb1-dom.balancer.example.com");
        assert!(!lb.disabled);

        let requests = backend.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(
            requests[0].url,
            "https://api.example.com/uscom-central-1/vlbrs"
        );
        assert_eq!(
            requests[1].url,
            "https://api.example.com/uscom-central-1/vlbrs/lb1"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_failure_state_stops_polling() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .respond_json(202, json!({}))
                .respond_json(200, json!({"name": "lb1", "state": "CREATION_FAILED"})),
        );
        let lbs = LoadBalancers::new(&client(backend.clone()));

        let err = lbs.create(&input()).await.unwrap_err();
        assert!(matches!(err, OpcError::State { ref state, .. } if state == "CREATION_FAILED"));
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_uses_patch_override() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .respond_json(200, json!({"name": "lb1", "state": "MODIFICATION_IN_PROGRESS"}))
                .respond_json(200, json!({"name": "lb1", "state": "HEALTHY", "disabled": true})),
        );
        let lbs = LoadBalancers::new(&client(backend.clone()));

        let update = UpdateLoadBalancerInput {
            disabled: Some(true),
            ..Default::default()
        };
        let lb = lbs.update("uscom-central-1", "lb1", &update).await.unwrap();
        assert!(lb.disabled);

        let sent = &backend.requests()[0];
        assert_eq!(sent.header("X-HTTP-Method-Override"), Some("PATCH"));
        assert_eq!(sent.body.as_deref(), Some(br#"{"disabled":true}"#.as_slice()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_already_absent() {
        let backend = Arc::new(ScriptedBackend::new().always(404, "no such vlbr"));
        let lbs = LoadBalancers::new(&client(backend.clone()));

        lbs.delete("uscom-central-1", "lb1").await.unwrap();
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_waits_for_deleted_state() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .respond(204, "")
                .respond_json(200, json!({"name": "lb1", "state": "DELETION_IN_PROGRESS"}))
                .respond_json(200, json!({"name": "lb1", "state": "DELETED"})),
        );
        let lbs = LoadBalancers::new(&client(backend.clone()));

        lbs.delete("uscom-central-1", "lb1").await.unwrap();
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn test_get_detailed_uses_projection() {
        let backend = Arc::new(
            ScriptedBackend::new().respond_json(200, json!({"name": "lb1", "state": "HEALTHY"})),
        );
        let lbs = LoadBalancers::new(&client(backend.clone()));

        lbs.get_detailed("uscom-central-1", "lb1").await.unwrap();
        assert!(backend.requests()[0].url.ends_with("/vlbrs/lb1?projection=DETAILED"));
    }
}
