//! Load balancer policy client
//!
//! Policy bodies differ per policy type, so type-specific settings are
//! carried as free-form JSON next to the common fields.

use crate::lbaas::{self, LbaasResource, LbaasState};
use opcflow_core::{Client, Named, PathContext, ResourceClient, ResourceDescriptor, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const POLICY_MEDIA_TYPE: &str = "application/vnd.com.oracle.oracloud.lbaas.Policy+json";

pub const POLICY: ResourceDescriptor = ResourceDescriptor::new(
    "policy",
    "/{region}/vlbrs/{service}/policies",
    "/{region}/vlbrs/{service}/policies/{name}",
)
.with_media_type(POLICY_MEDIA_TYPE);

#[derive(Debug, Clone, Default, Serialize)]
pub struct PolicyInput {
    pub name: String,
    /// e.g. `LoadBalancingMechanismPolicy`, `SetRequestHeaderPolicy`
    #[serde(rename = "type")]
    pub policy_type: String,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolicyInfo {
    pub name: String,
    pub state: LbaasState,
    #[serde(rename = "type")]
    pub policy_type: String,
    pub uri: String,
}

impl Named for PolicyInfo {
    fn name(&self) -> &str {
        &self.name
    }
}

impl LbaasResource for PolicyInfo {
    fn state(&self) -> &LbaasState {
        &self.state
    }
}

pub struct Policies {
    client: Client,
    resources: ResourceClient,
}

impl Policies {
    pub fn new(client: &Client) -> Self {
        Self {
            client: client.clone(),
            resources: client.resource(POLICY),
        }
    }

    fn context(&self, region: &str, load_balancer: &str) -> PathContext {
        self.client.context().region(region).service(load_balancer)
    }

    pub async fn create(
        &self,
        region: &str,
        load_balancer: &str,
        input: &PolicyInput,
    ) -> Result<PolicyInfo> {
        let ctx = self.context(region, load_balancer);
        lbaas::create_and_wait(&self.client, &self.resources, &ctx, &input.name, input).await
    }

    pub async fn get(
        &self,
        region: &str,
        load_balancer: &str,
        name: &str,
    ) -> Result<Option<PolicyInfo>> {
        self.resources
            .lookup(&self.context(region, load_balancer), name)
            .await
    }

    pub async fn update(
        &self,
        region: &str,
        load_balancer: &str,
        input: &PolicyInput,
    ) -> Result<PolicyInfo> {
        let ctx = self.context(region, load_balancer);
        lbaas::patch_and_wait(&self.client, &self.resources, &ctx, &input.name, input).await
    }

    pub async fn delete(&self, region: &str, load_balancer: &str, name: &str) -> Result<()> {
        let ctx = self.context(region, load_balancer);
        lbaas::delete_and_wait::<PolicyInfo>(&self.client, &self.resources, &ctx, name).await
    }
}
