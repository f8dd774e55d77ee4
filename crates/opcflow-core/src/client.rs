//! Shared client: immutable configuration plus one transport

use crate::auth::{AuthScheme, Authenticator, Credentials};
use crate::error::{OpcError, Result};
use crate::path::{PathContext, ResourceDescriptor};
use crate::poll::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT, PollSpec};
use crate::resource::ResourceClient;
use crate::transport::{DEFAULT_MAX_RETRIES, HttpBackend, ReqwestBackend, Transport};
use std::sync::Arc;
use std::time::Duration;

/// Everything needed to talk to one service endpoint
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub credentials: Credentials,
    pub auth: AuthScheme,
    pub region: Option<String>,
    pub max_retries: u32,
    pub request_timeout: Option<Duration>,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            auth: AuthScheme::Basic,
            region: None,
            max_retries: DEFAULT_MAX_RETRIES,
            request_timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

/// Read-only after construction; cheap to clone and safe to share between
/// independent calls.
#[derive(Clone)]
pub struct Client {
    transport: Transport,
    region: Option<String>,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl Client {
    /// Build a client backed by `reqwest`
    pub fn new(config: ClientConfig) -> Result<Self> {
        let backend = ReqwestBackend::new(config.request_timeout)?;
        Self::with_backend(config, Arc::new(backend))
    }

    pub fn with_backend(config: ClientConfig, backend: Arc<dyn HttpBackend>) -> Result<Self> {
        if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
            return Err(OpcError::InvalidConfig(format!(
                "endpoint must be an http(s) URL: {}",
                config.base_url
            )));
        }
        let authenticator = Authenticator::new(config.credentials, config.auth);
        let transport = Transport::new(config.base_url, authenticator, backend)
            .with_max_retries(config.max_retries);
        Ok(Self {
            transport,
            region: config.region,
            poll_interval: config.poll_interval,
            poll_timeout: config.poll_timeout,
        })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn identity_domain(&self) -> &str {
        self.transport.authenticator().credentials().identity_domain()
    }

    /// Operations for one resource type
    pub fn resource(&self, descriptor: ResourceDescriptor) -> ResourceClient {
        ResourceClient::new(self.transport.clone(), descriptor)
    }

    /// Context with this client's identity domain and default region filled in
    pub fn context(&self) -> PathContext {
        let ctx = PathContext::new().tenant(self.identity_domain());
        match &self.region {
            Some(region) => ctx.region(region.clone()),
            None => ctx,
        }
    }

    /// Poll descriptor with the configured interval and timeout
    pub fn poll_spec(&self, description: impl Into<String>) -> PollSpec {
        PollSpec::new(description, self.poll_interval, self.poll_timeout)
    }
}
