//! Generic create/read/update/delete against a [`ResourceDescriptor`]

use crate::decode::{decode, decode_value};
use crate::error::Result;
use crate::path::{PathContext, Projection, ResourceDescriptor};
use crate::transport::{HttpResponse, METHOD_OVERRIDE_HEADER, Transport};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Items that can be picked out of a collection listing by name
pub trait Named {
    fn name(&self) -> &str;
}

/// Operations for one resource type, bound to a shared transport
#[derive(Clone)]
pub struct ResourceClient {
    transport: Transport,
    descriptor: ResourceDescriptor,
}

impl ResourceClient {
    pub fn new(transport: Transport, descriptor: ResourceDescriptor) -> Self {
        Self {
            transport,
            descriptor,
        }
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    /// "load balancer lb1"
    pub fn label(&self, name: &str) -> String {
        format!("{} {}", self.descriptor.kind, name)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        extra: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        let mut headers: Vec<(&str, &str)> = Vec::with_capacity(extra.len() + 2);
        if let Some(media_type) = self.descriptor.media_type {
            headers.push(("Accept", media_type));
            if body.is_some() {
                headers.push(("Content-Type", media_type));
            }
        }
        headers.extend_from_slice(extra);
        self.transport.execute(method, path, body, &headers).await
    }

    fn path_for(&self, ctx: &PathContext, name: &str) -> Result<String> {
        if name.is_empty() {
            self.descriptor.container_path(ctx)
        } else {
            self.descriptor.resource_path(ctx, name)
        }
    }

    /// POST to the collection endpoint
    pub async fn create<B, T>(&self, ctx: &PathContext, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let path = self.descriptor.container_path(ctx)?;
        let body = serde_json::to_value(body)?;
        debug!(kind = self.descriptor.kind, %path, "Creating resource");
        let response = self.send(Method::POST, &path, Some(&body), &[]).await?;
        decode(&response.body)
    }

    /// GET a single item, or the collection when `name` is empty
    pub async fn read<T: DeserializeOwned>(&self, ctx: &PathContext, name: &str) -> Result<T> {
        let path = self.path_for(ctx, name)?;
        let response = self.send(Method::GET, &path, None, &[]).await?;
        decode(&response.body)
    }

    pub async fn read_with_projection<T: DeserializeOwned>(
        &self,
        ctx: &PathContext,
        name: &str,
        projection: Projection,
    ) -> Result<T> {
        let path = projection.apply(&self.path_for(ctx, name)?);
        let response = self.send(Method::GET, &path, None, &[]).await?;
        decode(&response.body)
    }

    /// GET the collection and decode its items.
    ///
    /// Accepts a bare array or an object holding the array under the
    /// descriptor's `items_key` (`items` when unset).
    pub async fn list<T: DeserializeOwned>(&self, ctx: &PathContext) -> Result<Vec<T>> {
        let listing: Value = self.read(ctx, "").await?;
        let key = self.descriptor.items_key.unwrap_or("items");
        let items = match listing {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove(key) {
                Some(Value::Array(items)) => items,
                Some(Value::Null) | None => Vec::new(),
                Some(single) => vec![single],
            },
            Value::Null => Vec::new(),
            other => vec![other],
        };
        items.into_iter().map(decode_value).collect()
    }

    /// Linear search of the collection by name.
    ///
    /// For APIs without a single-item endpoint; cost grows with the size of
    /// the remote collection.
    pub async fn find<T>(&self, ctx: &PathContext, name: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Named,
    {
        let items: Vec<T> = self.list(ctx).await?;
        Ok(items.into_iter().find(|item| item.name() == name))
    }

    /// Fetch one item, mapping absence to `None`
    pub async fn lookup<T>(&self, ctx: &PathContext, name: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Named,
    {
        if self.descriptor.listing_only {
            return self.find(ctx, name).await;
        }
        match self.read(ctx, name).await {
            Ok(item) => Ok(Some(item)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// PUT to the item endpoint
    pub async fn update<B, T>(&self, ctx: &PathContext, name: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let path = self.path_for(ctx, name)?;
        let body = serde_json::to_value(body)?;
        debug!(kind = self.descriptor.kind, %path, "Updating resource");
        let response = self.send(Method::PUT, &path, Some(&body), &[]).await?;
        decode(&response.body)
    }

    /// PATCH emulated as POST with `X-HTTP-Method-Override: PATCH`
    pub async fn patch<B, T>(&self, ctx: &PathContext, name: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let path = self.path_for(ctx, name)?;
        let body = serde_json::to_value(body)?;
        debug!(kind = self.descriptor.kind, %path, "Patching resource");
        let response = self
            .send(
                Method::POST,
                &path,
                Some(&body),
                &[(METHOD_OVERRIDE_HEADER, "PATCH")],
            )
            .await?;
        decode(&response.body)
    }

    /// DELETE the item. An already-absent item (404) counts as deleted.
    pub async fn delete(&self, ctx: &PathContext, name: &str) -> Result<()> {
        let path = self.descriptor.resource_path(ctx, name)?;
        debug!(kind = self.descriptor.kind, %path, "Deleting resource");
        match self.send(Method::DELETE, &path, None, &[]).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!(kind = self.descriptor.kind, name, "Already absent");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
