//! Typed resource catalog.
//!
//! Each admin screen manages one [`Resource`]: an item type keyed by a stable
//! string id, a filter set with one canonical default, create/update
//! payloads, and the status transitions the backend supports for it.

pub mod ads;
pub mod admins;
pub mod events;
pub mod highlights;
pub mod listings;
pub mod packages;
pub mod reviews;

use std::fmt;

use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Result};
use crate::remote::Transition;

/// Anything the list controller can key by id.
pub trait Identified {
    fn id(&self) -> &str;
}

/// Named filter criteria for a resource.
///
/// `Default` is the resource's documented default filter set; a reset always
/// restores exactly that value. Filter sets are replaced wholesale on change.
pub trait FilterSet: Clone + fmt::Debug + Default + PartialEq + Send + Sync + 'static {
    /// Keys accepted by [`FilterSet::set`]
    const KEYS: &'static [&'static str];

    /// Query pairs for the criteria that are set
    fn to_params(&self) -> Vec<(String, String)>;

    /// Set one criterion from a `key=value` pair. An empty value clears it.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Sort direction for the ordering field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Ordering field plus direction; rendered as a single signed sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// `field` for ascending, `-field` for descending
    pub fn ordering(&self) -> String {
        match self.direction {
            SortDirection::Asc => self.field.clone(),
            SortDirection::Desc => format!("-{}", self.field),
        }
    }

    /// Parse a signed sort key such as `-created_at`
    pub fn parse(key: &str) -> Result<Self> {
        let key = key.trim();
        let (field, direction) = match key.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (key.strip_prefix('+').unwrap_or(key), SortDirection::Asc),
        };
        if field.is_empty() {
            return Err(DeskError::required("ordering"));
        }
        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ordering())
    }
}

/// One admin-managed collection.
pub trait Resource: Send + Sync + 'static {
    type Item: Identified + Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;
    type Filters: FilterSet;
    type Draft: Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static;
    type Patch: Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static;

    /// Name used on the command line and in config
    const NAME: &'static str;
    /// Collection path under the API base URL
    const PATH: &'static str;
    /// Singular label for notifications
    const LABEL: &'static str;
    const PAGE_SIZE: u32;
    const TRANSITIONS: &'static [&'static str];

    fn default_sort() -> Sort;

    /// Client-side checks run before a create call
    fn validate_draft(_draft: &Self::Draft) -> Result<()> {
        Ok(())
    }

    /// Client-side checks run before an update call
    fn validate_patch(_patch: &Self::Patch) -> Result<()> {
        Ok(())
    }

    fn supports(transition: &Transition) -> bool {
        Self::TRANSITIONS.contains(&transition.action())
    }

    /// Short human label for an item, used in notifications and tables
    fn title(item: &Self::Item) -> String;

    /// Columns shown in list tables
    fn columns() -> &'static [&'static str];

    /// Cell values matching [`Resource::columns`]
    fn row(item: &Self::Item) -> Vec<String>;
}

/// Resource selector for the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Listings,
    Events,
    Packages,
    Ads,
    Highlights,
    Admins,
    Reviews,
}

impl ResourceKind {
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Listings => listings::Listings::NAME,
            ResourceKind::Events => events::Events::NAME,
            ResourceKind::Packages => packages::Packages::NAME,
            ResourceKind::Ads => ads::Ads::NAME,
            ResourceKind::Highlights => highlights::Highlights::NAME,
            ResourceKind::Admins => admins::Admins::NAME,
            ResourceKind::Reviews => reviews::Reviews::NAME,
        }
    }
}

/// Reject an empty (or whitespace-only) required string field.
pub fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DeskError::required(field));
    }
    Ok(())
}

/// Like [`require_text`] for optional patch fields: only a present but blank
/// value is rejected.
pub fn reject_blank(field: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(v) => require_text(field, v),
        None => Ok(()),
    }
}

/// Parse a boolean filter value; an empty value clears the filter.
pub fn parse_bool_filter(key: &str, value: &str) -> Result<Option<bool>> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "true" | "yes" | "1" => Ok(Some(true)),
        "false" | "no" | "0" => Ok(Some(false)),
        other => Err(DeskError::validation(
            key,
            format!("invalid {key} '{other}', expected true or false"),
        )),
    }
}

/// Parse a `YYYY-MM-DD` filter value; an empty value clears the filter.
pub fn parse_date_filter(key: &str, value: &str) -> Result<Option<jiff::civil::Date>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value.parse::<jiff::civil::Date>().map(Some).map_err(|_| {
        DeskError::validation(key, format!("invalid {key} '{value}', expected YYYY-MM-DD"))
    })
}

/// Trim a text filter value; an empty value clears the filter.
pub fn parse_text_filter(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub(crate) fn unknown_filter<F: FilterSet>(key: &str) -> DeskError {
    DeskError::validation(
        key,
        format!(
            "unknown filter '{key}', expected one of: {}",
            F::KEYS.join(", ")
        ),
    )
}

pub(crate) fn flag(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

/// Moderation state shared by listings, events, ads, and reviews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

enum_display_fromstr!(ModerationStatus, "status", {
    Pending => "PENDING",
    Approved => "APPROVED",
    Rejected => "REJECTED",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_ordering_sign() {
        assert_eq!(Sort::desc("created_at").ordering(), "-created_at");
        assert_eq!(Sort::asc("email").ordering(), "email");
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!(Sort::parse("-start_date").unwrap(), Sort::desc("start_date"));
        assert_eq!(Sort::parse("+name").unwrap(), Sort::asc("name"));
        assert_eq!(Sort::parse("name").unwrap(), Sort::asc("name"));
        assert!(Sort::parse("-").is_err());
    }

    #[test]
    fn test_require_text() {
        assert!(require_text("name", "Sunset Villa").is_ok());
        let err = require_text("name", "   ").unwrap_err();
        assert_eq!(err.user_message(), "name required");
        assert!(reject_blank("name", None).is_ok());
        assert!(reject_blank("name", Some("")).is_err());
    }

    #[test]
    fn test_bool_filter_values() {
        assert_eq!(parse_bool_filter("is_active", "true").unwrap(), Some(true));
        assert_eq!(parse_bool_filter("is_active", "No").unwrap(), Some(false));
        assert_eq!(parse_bool_filter("is_active", "").unwrap(), None);
        assert!(parse_bool_filter("is_active", "maybe").is_err());
    }

    #[test]
    fn test_date_filter_values() {
        let date = parse_date_filter("starts_after", "2024-07-01")
            .unwrap()
            .unwrap();
        assert_eq!(date.to_string(), "2024-07-01");
        assert!(parse_date_filter("starts_after", "07/01/2024").is_err());
        assert_eq!(parse_date_filter("starts_after", " ").unwrap(), None);
    }

    #[test]
    fn test_moderation_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&ModerationStatus::Rejected).unwrap(),
            "\"REJECTED\""
        );
        assert_eq!(
            "approved".parse::<ModerationStatus>().unwrap(),
            ModerationStatus::Approved
        );
        assert_eq!(ModerationStatus::Pending.to_string(), "PENDING");
    }
}
