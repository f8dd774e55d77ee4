//! Templated resource addressing
//!
//! Paths are written with named placeholders, e.g.
//! `/paas/service/dbcs/api/v1.1/instances/{tenant}/{name}`, and rendered
//! against a [`PathContext`] supplied per call.

use crate::error::{OpcError, Result};
use std::borrow::Cow;
use std::fmt;

/// A path with `{region}`, `{tenant}`, `{service}` and `{name}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate(Cow<'static, str>);

impl PathTemplate {
    pub const fn from_static(template: &'static str) -> Self {
        Self(Cow::Borrowed(template))
    }

    pub fn new(template: impl Into<String>) -> Self {
        Self(Cow::Owned(template.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute every placeholder. Values are percent-encoded as path segments.
    pub fn render(&self, ctx: &PathContext, name: Option<&str>) -> Result<String> {
        let mut out = String::with_capacity(self.0.len());
        let mut rest = self.0.as_ref();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| {
                OpcError::Template(format!("unclosed placeholder in '{}'", self.0))
            })?;
            let key = &after[..close];
            let value = match key {
                "region" => ctx.region.as_deref(),
                "tenant" => ctx.tenant.as_deref(),
                "service" => ctx.service.as_deref(),
                "name" => name,
                other => {
                    return Err(OpcError::Template(format!(
                        "unknown placeholder '{{{}}}' in '{}'",
                        other, self.0
                    )));
                }
            };
            let value = value.filter(|v| !v.is_empty()).ok_or_else(|| {
                OpcError::Template(format!("no value for '{{{}}}' in '{}'", key, self.0))
            })?;
            out.push_str(&urlencoding::encode(value));
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity, region and parent-service context for one call.
///
/// Passed explicitly on every operation; the shared client never stores it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathContext {
    pub tenant: Option<String>,
    pub region: Option<String>,
    /// Parent service instance or parent resource (e.g. the load balancer of a listener)
    pub service: Option<String>,
}

impl PathContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }
}

/// Collection and single-item endpoints for one resource type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Human-readable kind used in log lines and error messages
    pub kind: &'static str,
    pub container: PathTemplate,
    pub resource: PathTemplate,
    /// Vendor media type sent as `Content-Type` and `Accept`, if the API wants one
    pub media_type: Option<&'static str>,
    /// Key holding the item array in a collection response (after key normalization)
    pub items_key: Option<&'static str>,
    /// The API has no single-item GET; reads search the collection instead
    pub listing_only: bool,
}

impl ResourceDescriptor {
    pub const fn new(kind: &'static str, container: &'static str, resource: &'static str) -> Self {
        Self {
            kind,
            container: PathTemplate::from_static(container),
            resource: PathTemplate::from_static(resource),
            media_type: None,
            items_key: None,
            listing_only: false,
        }
    }

    pub const fn with_media_type(mut self, media_type: &'static str) -> Self {
        self.media_type = Some(media_type);
        self
    }

    pub const fn with_items_key(mut self, items_key: &'static str) -> Self {
        self.items_key = Some(items_key);
        self
    }

    pub const fn listing_only(mut self) -> Self {
        self.listing_only = true;
        self
    }

    pub fn container_path(&self, ctx: &PathContext) -> Result<String> {
        self.container.render(ctx, None)
    }

    pub fn resource_path(&self, ctx: &PathContext, name: &str) -> Result<String> {
        self.resource.render(ctx, Some(name))
    }
}

/// Response verbosity for read requests, sent as `?projection=<LEVEL>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    Minimal,
    Console,
    #[default]
    Full,
    Detailed,
}

impl Projection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Projection::Minimal => "MINIMAL",
            Projection::Console => "CONSOLE",
            Projection::Full => "FULL",
            Projection::Detailed => "DETAILED",
        }
    }

    pub fn apply(&self, path: &str) -> String {
        let sep = if path.contains('?') { '&' } else { '?' };
        format!("{}{}projection={}", path, sep, self.as_str())
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DB: ResourceDescriptor = ResourceDescriptor::new(
        "database service instance",
        "/paas/service/dbcs/api/v1.1/instances/{tenant}",
        "/paas/service/dbcs/api/v1.1/instances/{tenant}/{name}",
    );

    #[test]
    fn test_render_container_and_resource() {
        let ctx = PathContext::new().tenant("idcs-abc");
        assert_eq!(
            DB.container_path(&ctx).unwrap(),
            "/paas/service/dbcs/api/v1.1/instances/idcs-abc"
        );
        assert_eq!(
            DB.resource_path(&ctx, "db1").unwrap(),
            "/paas/service/dbcs/api/v1.1/instances/idcs-abc/db1"
        );
    }

    #[test]
    fn test_render_encodes_values() {
        let template = PathTemplate::from_static("/{region}/vlbrs/{name}");
        let ctx = PathContext::new().region("uscom-central-1");
        assert_eq!(
            template.render(&ctx, Some("my lb/1")).unwrap(),
            "/uscom-central-1/vlbrs/my%20lb%2F1"
        );
    }

    #[test]
    fn test_render_missing_value_fails() {
        let err = DB.container_path(&PathContext::new()).unwrap_err();
        assert!(matches!(err, OpcError::Template(ref msg) if msg.contains("{tenant}")));

        let err = DB
            .resource_path(&PathContext::new().tenant("t"), "")
            .unwrap_err();
        assert!(matches!(err, OpcError::Template(_)));
    }

    #[test]
    fn test_render_rejects_unknown_placeholder() {
        let template = PathTemplate::new("/x/{zone}");
        let err = template.render(&PathContext::new(), None).unwrap_err();
        assert!(matches!(err, OpcError::Template(ref msg) if msg.contains("{zone}")));

        let template = PathTemplate::new("/x/{tenant");
        assert!(template.render(&PathContext::new().tenant("t"), None).is_err());
    }

    #[test]
    fn test_projection_query() {
        assert_eq!(Projection::Minimal.apply("/a/b"), "/a/b?projection=MINIMAL");
        assert_eq!(
            Projection::Detailed.apply("/a/b?outputLevel=x"),
            "/a/b?outputLevel=x&projection=DETAILED"
        );
    }
}
