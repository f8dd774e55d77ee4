//! Mapping remote status values onto reconciliation outcomes
//!
//! Every resource type defines its own closed state enum with an
//! `Unrecognized` fallback. A [`StateClassifier`] built from a desired set and
//! an error set turns any state into one [`Classification`].

use crate::error::{OpcError, Result};
use std::fmt;
use tracing::warn;

/// Implemented by each resource type's state enum
pub trait ResourceState: Clone + PartialEq + fmt::Display {
    /// True for values the client does not know about
    fn is_unrecognized(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Ready,
    Pending,
    NotFound,
    Failed { resource: String, state: String },
}

impl Classification {
    /// Probe form: `Ok(true)` when done, `Ok(false)` to keep waiting.
    ///
    /// `NotFound` keeps waiting. Deletion waits treat it as done before
    /// reaching this point.
    pub fn into_probe(self) -> Result<bool> {
        match self {
            Classification::Ready => Ok(true),
            Classification::Pending | Classification::NotFound => Ok(false),
            Classification::Failed { resource, state } => Err(OpcError::State { resource, state }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StateClassifier<S> {
    desired: Vec<S>,
    error: Vec<S>,
}

impl<S: ResourceState> StateClassifier<S> {
    pub fn new(desired: impl IntoIterator<Item = S>, error: impl IntoIterator<Item = S>) -> Self {
        Self {
            desired: desired.into_iter().collect(),
            error: error.into_iter().collect(),
        }
    }

    pub fn classify(&self, resource: &str, state: &S) -> Classification {
        if self.desired.contains(state) {
            return Classification::Ready;
        }
        if self.error.contains(state) {
            return Classification::Failed {
                resource: resource.to_string(),
                state: state.to_string(),
            };
        }
        if state.is_unrecognized() {
            warn!(
                resource,
                state = %state,
                "Unrecognized resource state, continuing to wait"
            );
        }
        Classification::Pending
    }

    /// Classify the result of a lookup. `None` (absent or not listed yet)
    /// is `NotFound`.
    pub fn classify_lookup(&self, resource: &str, state: Option<&S>) -> Classification {
        match state {
            Some(state) => self.classify(resource, state),
            None => Classification::NotFound,
        }
    }
}

/// Declare a closed state enum for a resource type.
///
/// Each variant maps to its wire value (plus optional aliases), matched
/// case-insensitively. Anything else lands in `Unrecognized`, which is also
/// the `Default`. Serde support decodes with the lenient string policy.
///
/// ```ignore
/// resource_state! {
///     pub enum JobStatus {
///         Running => "RUNNING",
///         Succeeded => "SUCCEEDED" | "SUCCEED",
///         Failed => "FAILED",
///     }
/// }
/// ```
#[macro_export]
macro_rules! resource_state {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A value this client does not know about
            Unrecognized(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $wire, )+
                    $name::Unrecognized(raw) => raw.as_str(),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                let value = value.trim();
                $(
                    if value.eq_ignore_ascii_case($wire)
                        $( || value.eq_ignore_ascii_case($alias) )*
                    {
                        return $name::$variant;
                    }
                )+
                $name::Unrecognized(value.to_string())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::Unrecognized(String::new())
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::state::ResourceState for $name {
            fn is_unrecognized(&self) -> bool {
                matches!(self, $name::Unrecognized(_))
            }
        }

        impl $crate::__serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> $crate::__serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__serde::Deserializer<'de>,
            {
                $crate::decode::weak::string(deserializer).map(|raw| $name::from(raw.as_str()))
            }
        }
    };
}
