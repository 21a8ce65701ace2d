//! One-shot mutation commands.
//!
//! Each command runs a single controller mutation without loading a page
//! first, so the only request made is the mutation itself.

use serde::de::DeserializeOwned;

use crate::error::{DeskError, Result};
use crate::remote::Transition;
use crate::resources::{Resource, ResourceKind};

use super::{CommandOutput, Session, render_item, with_resource};

fn parse_payload<T: DeserializeOwned>(data: &str) -> Result<T> {
    serde_json::from_str(data)
        .map_err(|e| DeskError::validation("data", format!("invalid JSON payload: {e}")))
}

fn print_item<R: Resource>(session: &Session<R>, item: &R::Item, json: bool) -> Result<()> {
    session.flush_successes();
    let value = serde_json::to_value(item)?;
    let text = render_item(&value);
    CommandOutput::new(value).with_text(text).print(json)
}

/// Create an item from a JSON payload
pub async fn cmd_create(kind: ResourceKind, data: &str, json: bool) -> Result<()> {
    with_resource!(kind, R => create::<R>(data, json).await)
}

async fn create<R: Resource>(data: &str, json: bool) -> Result<()> {
    let draft: R::Draft = parse_payload(data)?;
    let session = Session::<R>::connect()?;
    let item = session.controller.create(draft).await?;
    print_item(&session, &item, json)
}

/// Update an item with a partial JSON payload
pub async fn cmd_update(kind: ResourceKind, id: &str, data: &str, json: bool) -> Result<()> {
    with_resource!(kind, R => update::<R>(id, data, json).await)
}

async fn update<R: Resource>(id: &str, data: &str, json: bool) -> Result<()> {
    let patch: R::Patch = parse_payload(data)?;
    let session = Session::<R>::connect()?;
    let item = session.controller.update(id, patch).await?;
    print_item(&session, &item, json)
}

/// Delete an item
pub async fn cmd_delete(kind: ResourceKind, id: &str, json: bool) -> Result<()> {
    with_resource!(kind, R => delete::<R>(id, json).await)
}

async fn delete<R: Resource>(id: &str, json: bool) -> Result<()> {
    let session = Session::<R>::connect()?;
    session.controller.delete(id).await?;
    session.flush_successes();
    CommandOutput::new(serde_json::json!({
        "resource": R::NAME,
        "id": id,
        "deleted": true,
    }))
    .with_text(format!("Deleted {id}"))
    .print(json)
}

/// Approve, reject, activate, or deactivate an item
pub async fn cmd_transition(
    kind: ResourceKind,
    id: &str,
    transition: Transition,
    json: bool,
) -> Result<()> {
    with_resource!(kind, R => apply_transition::<R>(id, transition, json).await)
}

async fn apply_transition<R: Resource>(id: &str, transition: Transition, json: bool) -> Result<()> {
    let session = Session::<R>::connect()?;
    let item = session.controller.transition(id, transition).await?;
    print_item(&session, &item, json)
}
