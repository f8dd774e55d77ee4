//! Shared lifecycle for load balancers and their listeners and policies

use opcflow_core::{
    Client, Named, PathContext, ResourceClient, Result, StateClassifier, resource_state,
    wait_for_deletion, wait_for_state,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

resource_state! {
    /// Lifecycle state reported by the load balancer service
    pub enum LbaasState {
        CreationInProgress => "CREATION_IN_PROGRESS",
        Created => "CREATED",
        Healthy => "HEALTHY",
        CreationFailed => "CREATION_FAILED",
        ModificationInProgress => "MODIFICATION_IN_PROGRESS",
        ModificationFailed => "MODIFICATION_FAILED",
        DeletionInProgress => "DELETION_IN_PROGRESS",
        Deleted => "DELETED",
        DeletionFailed => "DELETION_FAILED",
        /// Needs administrator intervention
        Abandon => "ABANDON",
        Pause => "PAUSE",
    }
}

/// Implemented by every payload that carries an [`LbaasState`]
pub trait LbaasResource: DeserializeOwned + Named {
    fn state(&self) -> &LbaasState;
}

pub fn create_classifier() -> StateClassifier<LbaasState> {
    StateClassifier::new(
        [LbaasState::Created, LbaasState::Healthy],
        [LbaasState::CreationFailed, LbaasState::Abandon],
    )
}

pub fn update_classifier() -> StateClassifier<LbaasState> {
    StateClassifier::new(
        [LbaasState::Created, LbaasState::Healthy],
        [LbaasState::ModificationFailed, LbaasState::Abandon],
    )
}

pub fn delete_classifier() -> StateClassifier<LbaasState> {
    StateClassifier::new(
        [LbaasState::Deleted],
        [LbaasState::DeletionFailed, LbaasState::Abandon],
    )
}

pub(crate) async fn create_and_wait<B, T>(
    client: &Client,
    resources: &ResourceClient,
    ctx: &PathContext,
    name: &str,
    body: &B,
) -> Result<T>
where
    B: Serialize + ?Sized,
    T: LbaasResource,
{
    let _: Value = resources.create(ctx, body).await?;
    info!("Created {}, waiting for it to become ready", resources.label(name));

    let spec = client.poll_spec(format!("{} to be created", resources.label(name)));
    wait_for_state(resources, ctx, name, &spec, &create_classifier(), |r: &T| {
        r.state().clone()
    })
    .await
}

pub(crate) async fn patch_and_wait<B, T>(
    client: &Client,
    resources: &ResourceClient,
    ctx: &PathContext,
    name: &str,
    body: &B,
) -> Result<T>
where
    B: Serialize + ?Sized,
    T: LbaasResource,
{
    let _: Value = resources.patch(ctx, name, body).await?;
    info!("Updated {}, waiting for the change to apply", resources.label(name));

    let spec = client.poll_spec(format!("{} to be updated", resources.label(name)));
    wait_for_state(resources, ctx, name, &spec, &update_classifier(), |r: &T| {
        r.state().clone()
    })
    .await
}

pub(crate) async fn delete_and_wait<T>(
    client: &Client,
    resources: &ResourceClient,
    ctx: &PathContext,
    name: &str,
) -> Result<()>
where
    T: LbaasResource,
{
    resources.delete(ctx, name).await?;
    info!("Deleting {}", resources.label(name));

    let spec = client.poll_spec(format!("{} to be deleted", resources.label(name)));
    wait_for_deletion(resources, ctx, name, &spec, &delete_classifier(), |r: &T| {
        r.state().clone()
    })
    .await
}
