//! Listings (places) managed by hosts and moderated by admins.

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::{
    FilterSet, Identified, ModerationStatus, Resource, Sort, flag, parse_bool_filter,
    parse_text_filter, reject_blank, require_text, unknown_filter,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub status: ModerationStatus,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Identified for Listing {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilters {
    pub is_active: Option<bool>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub status: Option<ModerationStatus>,
}

impl FilterSet for ListingFilters {
    const KEYS: &'static [&'static str] = &["is_active", "category", "city", "status"];

    fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(active) = self.is_active {
            params.push(("is_active".to_string(), active.to_string()));
        }
        if let Some(category) = &self.category {
            params.push(("category".to_string(), category.clone()));
        }
        if let Some(city) = &self.city {
            params.push(("city".to_string(), city.clone()));
        }
        if let Some(status) = self.status {
            params.push(("status".to_string(), status.to_string()));
        }
        params
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "is_active" => self.is_active = parse_bool_filter(key, value)?,
            "category" => self.category = parse_text_filter(value),
            "city" => self.city = parse_text_filter(value),
            "status" => {
                self.status = parse_text_filter(value).map(|v| v.parse()).transpose()?;
            }
            _ => return Err(unknown_filter::<Self>(key)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub struct Listings;

impl Resource for Listings {
    type Item = Listing;
    type Filters = ListingFilters;
    type Draft = ListingDraft;
    type Patch = ListingPatch;

    const NAME: &'static str = "listings";
    const PATH: &'static str = "places";
    const LABEL: &'static str = "Listing";
    const PAGE_SIZE: u32 = 10;
    const TRANSITIONS: &'static [&'static str] = &["approve", "reject", "activate", "deactivate"];

    fn default_sort() -> Sort {
        Sort::desc("created_at")
    }

    fn validate_draft(draft: &ListingDraft) -> Result<()> {
        require_text("name", &draft.name)
    }

    fn validate_patch(patch: &ListingPatch) -> Result<()> {
        reject_blank("name", patch.name.as_deref())
    }

    fn title(item: &Listing) -> String {
        item.name.clone()
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "City", "Category", "Status", "Active"]
    }

    fn row(item: &Listing) -> Vec<String> {
        vec![
            item.id.clone(),
            item.name.clone(),
            item.city.clone().unwrap_or_default(),
            item.category.clone().unwrap_or_default(),
            item.status.to_string(),
            flag(item.is_active),
        ]
    }
}
