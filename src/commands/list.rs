use crate::cli::ListArgs;
use crate::error::{DeskError, Result};
use crate::resources::{Resource, ResourceKind};

use super::{CommandOutput, Session, page_json, render_item, render_page, with_resource};

/// List one page of a resource
pub async fn cmd_list(kind: ResourceKind, args: ListArgs, json: bool) -> Result<()> {
    with_resource!(kind, R => list_page::<R>(args, json).await)
}

async fn list_page<R: Resource>(args: ListArgs, json: bool) -> Result<()> {
    let session = Session::<R>::connect()?;
    session.apply_args(&args).await?;
    session.controller.mount().await?;

    let snapshot = session.controller.snapshot();
    CommandOutput::new(page_json(&snapshot)?)
        .with_text(render_page(&snapshot))
        .print(json)
}

/// Show one item found through the collection search
pub async fn cmd_show(kind: ResourceKind, id: &str, json: bool) -> Result<()> {
    with_resource!(kind, R => show_item::<R>(id, json).await)
}

async fn show_item<R: Resource>(id: &str, json: bool) -> Result<()> {
    let session = Session::<R>::connect()?;
    session.controller.commit_search(id).await?;
    session.controller.mount().await?;

    let item = session
        .controller
        .find(id)
        .ok_or_else(|| DeskError::NotFound(id.to_string()))?;
    let value = serde_json::to_value(&item)?;
    let text = render_item(&value);
    CommandOutput::new(value).with_text(text).print(json)
}
