//! Events submitted by organisers.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Result};

use super::{
    FilterSet, Identified, ModerationStatus, Resource, Sort, parse_date_filter,
    parse_text_filter, reject_blank, require_text, unknown_filter,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub start_date: Option<Date>,
    #[serde(default)]
    pub end_date: Option<Date>,
    #[serde(default)]
    pub status: ModerationStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

impl Identified for Event {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilters {
    pub status: Option<ModerationStatus>,
    pub starts_after: Option<Date>,
    pub starts_before: Option<Date>,
}

impl FilterSet for EventFilters {
    const KEYS: &'static [&'static str] = &["status", "starts_after", "starts_before"];

    fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(status) = self.status {
            params.push(("status".to_string(), status.to_string()));
        }
        if let Some(date) = self.starts_after {
            params.push(("starts_after".to_string(), date.to_string()));
        }
        if let Some(date) = self.starts_before {
            params.push(("starts_before".to_string(), date.to_string()));
        }
        params
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "status" => {
                self.status = parse_text_filter(value).map(|v| v.parse()).transpose()?;
            }
            "starts_after" => self.starts_after = parse_date_filter(key, value)?,
            "starts_before" => self.starts_before = parse_date_filter(key, value)?,
            _ => return Err(unknown_filter::<Self>(key)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,
}

fn check_date_order(start: Option<Date>, end: Option<Date>) -> Result<()> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(DeskError::validation(
            "end_date",
            "end_date must not be before start_date",
        )),
        _ => Ok(()),
    }
}

pub struct Events;

impl Resource for Events {
    type Item = Event;
    type Filters = EventFilters;
    type Draft = EventDraft;
    type Patch = EventPatch;

    const NAME: &'static str = "events";
    const PATH: &'static str = "events";
    const LABEL: &'static str = "Event";
    const PAGE_SIZE: u32 = 10;
    const TRANSITIONS: &'static [&'static str] = &["approve", "reject"];

    fn default_sort() -> Sort {
        Sort::desc("start_date")
    }

    fn validate_draft(draft: &EventDraft) -> Result<()> {
        require_text("name", &draft.name)?;
        check_date_order(draft.start_date, draft.end_date)
    }

    fn validate_patch(patch: &EventPatch) -> Result<()> {
        reject_blank("name", patch.name.as_deref())?;
        check_date_order(patch.start_date, patch.end_date)
    }

    fn title(item: &Event) -> String {
        item.name.clone()
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Venue", "Starts", "Status"]
    }

    fn row(item: &Event) -> Vec<String> {
        vec![
            item.id.clone(),
            item.name.clone(),
            item.venue.clone().unwrap_or_default(),
            item.start_date.map(|d| d.to_string()).unwrap_or_default(),
            item.status.to_string(),
        ]
    }
}
