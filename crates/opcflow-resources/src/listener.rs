//! Listener client. Listeners live under a load balancer.

use crate::lbaas::{self, LbaasResource, LbaasState};
use opcflow_core::{Client, Named, PathContext, ResourceClient, ResourceDescriptor, Result, weak};
use serde::{Deserialize, Serialize};

pub const LISTENER_MEDIA_TYPE: &str = "application/vnd.com.oracle.oracloud.lbaas.Listener+json";

pub const LISTENER: ResourceDescriptor = ResourceDescriptor::new(
    "listener",
    "/{region}/vlbrs/{service}/listeners",
    "/{region}/vlbrs/{service}/listeners/{name}",
)
.with_media_type(LISTENER_MEDIA_TYPE);

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerInput {
    pub name: String,
    pub port: u16,
    /// `HTTP` or `HTTPS`
    pub balancer_protocol: String,
    pub server_protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_server_pool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path_prefixes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ssl_certificates: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub virtual_hosts: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListenerInfo {
    pub name: String,
    pub state: LbaasState,
    #[serde(deserialize_with = "weak::number")]
    pub port: u16,
    pub balancer_protocol: String,
    pub server_protocol: String,
    pub origin_server_pool: Option<String>,
    #[serde(deserialize_with = "weak::boolean")]
    pub disabled: bool,
    #[serde(deserialize_with = "weak::string_list")]
    pub path_prefixes: Vec<String>,
    #[serde(deserialize_with = "weak::string_list")]
    pub policies: Vec<String>,
    #[serde(deserialize_with = "weak::string_list")]
    pub virtual_hosts: Vec<String>,
    pub uri: String,
}

impl Named for ListenerInfo {
    fn name(&self) -> &str {
        &self.name
    }
}

impl LbaasResource for ListenerInfo {
    fn state(&self) -> &LbaasState {
        &self.state
    }
}

pub struct Listeners {
    client: Client,
    resources: ResourceClient,
}

impl Listeners {
    pub fn new(client: &Client) -> Self {
        Self {
            client: client.clone(),
            resources: client.resource(LISTENER),
        }
    }

    fn context(&self, region: &str, load_balancer: &str) -> PathContext {
        self.client.context().region(region).service(load_balancer)
    }

    pub async fn create(
        &self,
        region: &str,
        load_balancer: &str,
        input: &ListenerInput,
    ) -> Result<ListenerInfo> {
        let ctx = self.context(region, load_balancer);
        lbaas::create_and_wait(&self.client, &self.resources, &ctx, &input.name, input).await
    }

    pub async fn get(
        &self,
        region: &str,
        load_balancer: &str,
        name: &str,
    ) -> Result<Option<ListenerInfo>> {
        self.resources
            .lookup(&self.context(region, load_balancer), name)
            .await
    }

    /// Replace the listener definition and wait for it to settle
    pub async fn update(
        &self,
        region: &str,
        load_balancer: &str,
        input: &ListenerInput,
    ) -> Result<ListenerInfo> {
        let ctx = self.context(region, load_balancer);
        lbaas::patch_and_wait(&self.client, &self.resources, &ctx, &input.name, input).await
    }

    pub async fn delete(&self, region: &str, load_balancer: &str, name: &str) -> Result<()> {
        let ctx = self.context(region, load_balancer);
        lbaas::delete_and_wait::<ListenerInfo>(&self.client, &self.resources, &ctx, name).await
    }
}
