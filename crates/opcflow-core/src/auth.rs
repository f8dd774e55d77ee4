//! Credentials and per-service request authentication

use crate::transport::HttpRequest;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;

/// Header carrying the identity domain for bearer-authenticated services
pub const TENANT_HEADER: &str = "X-ID-TENANT-NAME";

/// Account credentials, fixed for the lifetime of a client
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    identity_domain: String,
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(
        identity_domain: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            identity_domain: identity_domain.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn identity_domain(&self) -> &str {
        &self.identity_domain
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity_domain", &self.identity_domain)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authentication scheme expected by the target service
#[derive(Clone, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Basic base64(username:password)`
    Basic,
    /// `Authorization: Bearer <token>` plus the tenant header
    Bearer { token: String },
}

impl fmt::Debug for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthScheme::Basic => write!(f, "Basic"),
            AuthScheme::Bearer { .. } => write!(f, "Bearer(<redacted>)"),
        }
    }
}

/// Attaches exactly one authentication scheme to outgoing requests.
///
/// Runs after the request has been logged, so nothing it adds reaches
/// diagnostic output.
#[derive(Debug, Clone)]
pub struct Authenticator {
    credentials: Credentials,
    scheme: AuthScheme,
}

impl Authenticator {
    pub fn new(credentials: Credentials, scheme: AuthScheme) -> Self {
        Self {
            credentials,
            scheme,
        }
    }

    pub fn basic(credentials: Credentials) -> Self {
        Self::new(credentials, AuthScheme::Basic)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn scheme(&self) -> &AuthScheme {
        &self.scheme
    }

    pub fn apply(&self, request: &mut HttpRequest) {
        match &self.scheme {
            AuthScheme::Basic => {
                let raw = format!(
                    "{}:{}",
                    self.credentials.username, self.credentials.password
                );
                request.set_header("Authorization", format!("Basic {}", STANDARD.encode(raw)));
            }
            AuthScheme::Bearer { token } => {
                request.set_header("Authorization", format!("Bearer {}", token));
                request.set_header(TENANT_HEADER, self.credentials.identity_domain.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    fn credentials() -> Credentials {
        Credentials::new("idcs-123", "admin@example.com", "s3cret")
    }

    #[test]
    fn test_basic_auth_header() {
        let mut request = HttpRequest::new(Method::GET, "https://api.example.com/x");
        Authenticator::basic(credentials()).apply(&mut request);

        let expected = format!("Basic {}", STANDARD.encode("admin@example.com:s3cret"));
        assert_eq!(request.header("Authorization"), Some(expected.as_str()));
        assert_eq!(request.header(TENANT_HEADER), None);
    }

    #[test]
    fn test_bearer_auth_adds_tenant_header() {
        let mut request = HttpRequest::new(Method::GET, "https://api.example.com/x");
        let auth = Authenticator::new(
            credentials(),
            AuthScheme::Bearer {
                token: "tok".to_string(),
            },
        );
        auth.apply(&mut request);

        assert_eq!(request.header("Authorization"), Some("Bearer tok"));
        assert_eq!(request.header(TENANT_HEADER), Some("idcs-123"));
    }

    #[test]
    fn test_debug_output_hides_secrets() {
        let auth = Authenticator::new(
            credentials(),
            AuthScheme::Bearer {
                token: "tok-abc".to_string(),
            },
        );
        let rendered = format!("{:?}", auth);
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("tok-abc"));
        assert!(rendered.contains("admin@example.com"));
    }
}
