//! Command handlers for the `marketdesk` binary.

mod browse;
mod config;
mod list;
mod mutate;

pub use browse::cmd_browse;
pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use list::{cmd_list, cmd_show};
pub use mutate::{cmd_create, cmd_delete, cmd_transition, cmd_update};

use std::sync::Arc;

use owo_colors::OwoColorize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::ListArgs;
use crate::config::Config;
use crate::error::{DeskError, Result};
use crate::list::{ListController, ListSnapshot};
use crate::notify::{ToastLevel, ToastQueue};
use crate::remote::HttpCollection;
use crate::resources::{FilterSet, Resource, Sort, SortDirection};

/// Run `$body` with `$R` bound to the resource type selected by `$kind`.
macro_rules! with_resource {
    ($kind:expr, $R:ident => $body:expr) => {{
        use $crate::resources::{ResourceKind, ads, admins, events, highlights, listings, packages, reviews};
        match $kind {
            ResourceKind::Listings => {
                type $R = listings::Listings;
                $body
            }
            ResourceKind::Events => {
                type $R = events::Events;
                $body
            }
            ResourceKind::Packages => {
                type $R = packages::Packages;
                $body
            }
            ResourceKind::Ads => {
                type $R = ads::Ads;
                $body
            }
            ResourceKind::Highlights => {
                type $R = highlights::Highlights;
                $body
            }
            ResourceKind::Admins => {
                type $R = admins::Admins;
                $body
            }
            ResourceKind::Reviews => {
                type $R = reviews::Reviews;
                $body
            }
        }
    }};
}

pub(crate) use with_resource;

/// Output produced by a command: always a JSON value, optionally a
/// human-readable rendering used when `--json` is not set.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, json: bool) -> Result<()> {
        match (json, self.text) {
            (false, Some(text)) => println!("{text}"),
            _ => println!("{}", serde_json::to_string_pretty(&self.json)?),
        }
        Ok(())
    }
}

/// A controller wired to the configured API, plus the toasts it produces.
pub(crate) struct Session<R: Resource> {
    pub controller: ListController<R>,
    pub toasts: Arc<ToastQueue>,
    pub config: Config,
}

impl<R: Resource> Session<R> {
    pub fn connect() -> Result<Self> {
        let config = Config::load()?;
        let endpoint = Arc::new(HttpCollection::<R>::from_config(&config)?);
        let credentials = Arc::new(config.clone());
        let toasts = Arc::new(ToastQueue::new());
        let controller = ListController::with_page_size(
            endpoint,
            credentials,
            toasts.clone(),
            config.page_size(R::NAME, R::PAGE_SIZE),
        );
        Ok(Self {
            controller,
            toasts,
            config,
        })
    }

    /// Apply `--search`, `--filter`, ordering and `--page` before the first fetch.
    pub async fn apply_args(&self, args: &ListArgs) -> Result<()> {
        if let Some(search) = &args.search {
            self.controller.commit_search(search.as_str()).await?;
        }

        let mut filters = R::Filters::default();
        for raw in &args.filters {
            let (key, value) = parse_filter_arg(raw)?;
            filters.set(key, value)?;
        }
        self.controller.on_filters_change(filters).await?;

        if let Some(sort) = sort_from_args::<R>(args)? {
            self.controller.on_sort_change(sort).await?;
        }

        // Last, since the changes above go back to page 1
        self.controller.seek_page(args.page);
        Ok(())
    }

    /// Print pending success toasts to stderr. Errors travel as the
    /// command's `Err` and are printed by `main`.
    pub fn flush_successes(&self) {
        for toast in self.toasts.drain() {
            if toast.level == ToastLevel::Success {
                eprintln!("{} {}", "✓".green(), toast.message);
            }
        }
    }

    /// Print every pending toast to stderr.
    pub fn flush_all(&self) {
        for toast in self.toasts.drain() {
            match toast.level {
                ToastLevel::Success => eprintln!("{} {}", "✓".green(), toast.message),
                ToastLevel::Error => eprintln!("{} {}", "error:".red(), toast.message),
            }
        }
    }
}

/// Split a `key=value` filter argument.
pub(crate) fn parse_filter_arg(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => Err(DeskError::validation(
            "filter",
            format!("invalid filter '{raw}', expected key=value"),
        )),
    }
}

/// Sort requested on the command line, if any.
pub(crate) fn sort_from_args<R: Resource>(args: &ListArgs) -> Result<Option<Sort>> {
    let mut sort = match &args.order_by {
        Some(key) => Sort::parse(key)?,
        None if args.desc || args.asc => R::default_sort(),
        None => return Ok(None),
    };
    if args.desc {
        sort.direction = SortDirection::Desc;
    } else if args.asc {
        sort.direction = SortDirection::Asc;
    }
    Ok(Some(sort))
}

/// Render the loaded page as a table with a paging footer.
pub(crate) fn render_page<R: Resource>(snapshot: &ListSnapshot<R>) -> String {
    if snapshot.items.is_empty() {
        return format!("No {} found", R::NAME).dimmed().to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(R::columns().iter().map(|c| c.to_string()));
    for item in &snapshot.items {
        builder.push_record(R::row(item));
    }
    let mut table = builder.build();
    table.with(Style::modern());

    let mut footer = format!(
        "Page {} of {} ({} {})",
        snapshot.page, snapshot.total_pages, snapshot.count, R::NAME
    );
    if !snapshot.search.is_empty() {
        footer.push_str(&format!(", search \"{}\"", snapshot.search));
    }
    let filters = snapshot.filters.to_params();
    if !filters.is_empty() {
        let rendered: Vec<String> = filters.iter().map(|(k, v)| format!("{k}={v}")).collect();
        footer.push_str(&format!(", {}", rendered.join(" ")));
    }
    footer.push_str(&format!(", ordering {}", snapshot.sort));

    format!("{table}\n{}", footer.dimmed())
}

/// JSON rendering of the loaded page
pub(crate) fn page_json<R: Resource>(snapshot: &ListSnapshot<R>) -> Result<Value> {
    Ok(serde_json::json!({
        "resource": R::NAME,
        "items": serde_json::to_value(&snapshot.items)?,
        "count": snapshot.count,
        "page": snapshot.page,
        "total_pages": snapshot.total_pages,
        "page_size": snapshot.page_size,
    }))
}

/// Key/value rendering of one item
pub(crate) fn render_item(value: &Value) -> String {
    let Value::Object(fields) = value else {
        return value.to_string();
    };
    let width = fields.keys().map(|k| k.len()).max().unwrap_or(0);
    fields
        .iter()
        .map(|(key, value)| {
            let shown = match value {
                Value::Null => "-".dimmed().to_string(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{:width$}  {}", key.cyan(), shown, width = width)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::listings::Listings;

    #[test]
    fn test_parse_filter_arg() {
        assert_eq!(parse_filter_arg("city=Faro").unwrap(), ("city", "Faro"));
        assert_eq!(parse_filter_arg("city=").unwrap(), ("city", ""));
        assert!(parse_filter_arg("city").is_err());
        assert!(parse_filter_arg("=Faro").is_err());
    }

    #[test]
    fn test_sort_from_args() {
        let args = ListArgs::default();
        assert!(sort_from_args::<Listings>(&args).unwrap().is_none());

        let args = ListArgs {
            asc: true,
            ..Default::default()
        };
        assert_eq!(
            sort_from_args::<Listings>(&args).unwrap(),
            Some(Sort::asc("created_at"))
        );

        let args = ListArgs {
            order_by: Some("name".to_string()),
            desc: true,
            ..Default::default()
        };
        assert_eq!(
            sort_from_args::<Listings>(&args).unwrap(),
            Some(Sort::desc("name"))
        );
    }

    #[test]
    fn test_render_item_lists_fields() {
        let value = serde_json::json!({"id": "p1", "name": "Beach Hut", "city": null});
        let text = render_item(&value);
        assert!(text.contains("Beach Hut"));
        assert!(text.contains("p1"));
    }
}
