//! Lenient response decoding
//!
//! Remote payloads drift between API versions, so decoding follows one
//! fixed policy:
//!
//! - object keys are normalized to `snake_case` first (`serviceName`,
//!   `ServiceName` and `SERVICE_NAME` all become `service_name`)
//! - unknown fields are ignored
//! - missing fields take their `Default` (targets use `#[serde(default)]`)
//! - scalars may arrive wrapped in strings; the [`weak`] adapters accept
//!   `"8080"` for a number, `"true"` for a bool, a bare value for a list,
//!   and treat `null` as the default

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Decode a response body. An empty body decodes as `{}`.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Map::new())
    } else {
        serde_json::from_slice(body)?
    };
    decode_value(value)
}

pub fn decode_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(normalize_keys(value))?)
}

/// Recursively rewrite every object key to `snake_case`
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (to_snake_case(&k), normalize_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

fn to_snake_case(key: &str) -> String {
    if !key.chars().any(|c| c.is_ascii_lowercase()) {
        return key.to_ascii_lowercase().replace(['-', ' '], "_");
    }

    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' {
            out.push('_');
            continue;
        }
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `deserialize_with` adapters for loosely typed scalars
pub mod weak {
    use serde::de::{self, Deserialize, Deserializer};
    use serde_json::Value;
    use std::fmt::Display;
    use std::str::FromStr;

    fn scalar_to_string(value: Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            other => Some(other.to_string()),
        }
    }

    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(scalar_to_string(value).unwrap_or_default())
    }

    pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr + Default,
        T::Err: Display,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(T::default()),
            Value::Number(n) => n.to_string().parse().map_err(de::Error::custom),
            Value::String(s) if s.trim().is_empty() => Ok(T::default()),
            Value::String(s) => s.trim().parse().map_err(de::Error::custom),
            other => Err(de::Error::custom(format!("expected a number, got {}", other))),
        }
    }

    pub fn boolean<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(b),
            Value::Number(n) => Ok(n.as_i64().is_some_and(|v| v != 0)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "enabled" => Ok(true),
                "false" | "no" | "0" | "disabled" | "" => Ok(false),
                other => Err(de::Error::custom(format!("expected a boolean, got '{}'", other))),
            },
            other => Err(de::Error::custom(format!("expected a boolean, got {}", other))),
        }
    }

    /// Accepts a list, a single bare value, or `null`
    pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items.into_iter().filter_map(scalar_to_string).collect(),
            other => scalar_to_string(other).into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Listener {
        name: String,
        #[serde(deserialize_with = "weak::number")]
        port: u16,
        #[serde(deserialize_with = "weak::boolean")]
        disabled: bool,
        #[serde(deserialize_with = "weak::string_list")]
        virtual_hosts: Vec<String>,
        description: Option<String>,
        balancer_protocol: String,
    }

    #[test]
    fn test_unknown_fields_ignored_and_missing_defaulted() {
        let body = br#"{
            "name": "http-listener",
            "port": 80,
            "disabled": false,
            "virtualHosts": ["a.example.com"],
            "balancerProtocol": "HTTP",
            "uri": "https://api.example.com/vlbrs/lb1/listeners/http-listener",
            "extra": {"nested": true}
        }"#;

        let listener: Listener = decode(body).unwrap();
        assert_eq!(
            listener,
            Listener {
                name: "http-listener".to_string(),
                port: 80,
                disabled: false,
                virtual_hosts: vec!["a.example.com".to_string()],
                description: None,
                balancer_protocol: "HTTP".to_string(),
            }
        );
    }

    #[test]
    fn test_scalars_wrapped_in_strings() {
        let body = br#"{"Name":"l","PORT":"8443","disabled":"true","virtual_hosts":"only.example.com","description":null}"#;
        let listener: Listener = decode(body).unwrap();
        assert_eq!(listener.name, "l");
        assert_eq!(listener.port, 8443);
        assert!(listener.disabled);
        assert_eq!(listener.virtual_hosts, vec!["only.example.com".to_string()]);
        assert_eq!(listener.description, None);
    }

    #[test]
    fn test_empty_body_decodes_to_default() {
        let listener: Listener = decode(b"  ").unwrap();
        assert_eq!(listener, Listener::default());
    }

    #[test]
    fn test_bad_number_is_an_error() {
        assert!(decode::<Listener>(br#"{"port":"eighty"}"#).is_err());
    }

    #[test]
    fn test_snake_case_normalization() {
        assert_eq!(to_snake_case("serviceName"), "service_name");
        assert_eq!(to_snake_case("ServiceName"), "service_name");
        assert_eq!(to_snake_case("SERVICE_NAME"), "service_name");
        assert_eq!(to_snake_case("IPAddress"), "ip_address");
        assert_eq!(to_snake_case("canonical-host-name"), "canonical_host_name");
        assert_eq!(to_snake_case("job_id"), "job_id");
        assert_eq!(to_snake_case("URI"), "uri");
        assert_eq!(to_snake_case("vmsPublicKey"), "vms_public_key");
    }
}
