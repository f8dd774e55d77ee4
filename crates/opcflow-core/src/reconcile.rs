//! Probes that combine a read with a state classifier

use crate::error::Result;
use crate::path::PathContext;
use crate::poll::{PollSpec, poll};
use crate::resource::{Named, ResourceClient};
use crate::state::{Classification, ResourceState, StateClassifier};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Poll until the resource reaches a desired state and return it.
///
/// A resource that is not visible yet keeps the wait going.
pub async fn wait_for_state<T, S, F>(
    resources: &ResourceClient,
    ctx: &PathContext,
    name: &str,
    spec: &PollSpec,
    classifier: &StateClassifier<S>,
    state_of: F,
) -> Result<T>
where
    T: DeserializeOwned + Named,
    S: ResourceState,
    F: Fn(&T) -> S,
{
    let label = resources.label(name);
    let label = label.as_str();
    let state_of = &state_of;

    poll(spec, move || async move {
        let resource = resources.lookup::<T>(ctx, name).await?;
        let state = resource.as_ref().map(state_of);
        match classifier.classify_lookup(label, state.as_ref()) {
            Classification::Ready => Ok(resource),
            Classification::NotFound => {
                debug!(resource = label, "Not visible yet");
                Ok(None)
            }
            other => other.into_probe().map(|_| None),
        }
    })
    .await
}

/// Poll until the resource is gone (404 or missing from its listing) or
/// reports a desired terminal state such as `DELETED`.
pub async fn wait_for_deletion<T, S, F>(
    resources: &ResourceClient,
    ctx: &PathContext,
    name: &str,
    spec: &PollSpec,
    classifier: &StateClassifier<S>,
    state_of: F,
) -> Result<()>
where
    T: DeserializeOwned + Named,
    S: ResourceState,
    F: Fn(&T) -> S,
{
    let label = resources.label(name);
    let label = label.as_str();
    let state_of = &state_of;

    poll(spec, move || async move {
        let resource = resources.lookup::<T>(ctx, name).await?;
        let state = resource.as_ref().map(state_of);
        match classifier.classify_lookup(label, state.as_ref()) {
            Classification::NotFound => Ok(Some(())),
            other => other.into_probe().map(|done| done.then_some(())),
        }
    })
    .await
}
