//! Paid ad placements.

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::{
    FilterSet, Identified, ModerationStatus, Resource, Sort, parse_text_filter, reject_blank,
    require_text, unknown_filter,
};

/// Where an ad is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Home,
    Search,
    Sidebar,
}

enum_display_fromstr!(Placement, "placement", {
    Home => "home",
    Search => "search",
    Sidebar => "sidebar",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub placement: Option<Placement>,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub status: ModerationStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

impl Identified for Ad {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdFilters {
    pub status: Option<ModerationStatus>,
    pub placement: Option<Placement>,
}

impl FilterSet for AdFilters {
    const KEYS: &'static [&'static str] = &["status", "placement"];

    fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(status) = self.status {
            params.push(("status".to_string(), status.to_string()));
        }
        if let Some(placement) = self.placement {
            params.push(("placement".to_string(), placement.to_string()));
        }
        params
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "status" => {
                self.status = parse_text_filter(value).map(|v| v.parse()).transpose()?;
            }
            "placement" => {
                self.placement = parse_text_filter(value).map(|v| v.parse()).transpose()?;
            }
            _ => return Err(unknown_filter::<Self>(key)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

pub struct Ads;

impl Resource for Ads {
    type Item = Ad;
    type Filters = AdFilters;
    type Draft = AdDraft;
    type Patch = AdPatch;

    const NAME: &'static str = "ads";
    const PATH: &'static str = "ads";
    const LABEL: &'static str = "Ad";
    const PAGE_SIZE: u32 = 10;
    const TRANSITIONS: &'static [&'static str] = &["approve", "reject"];

    fn default_sort() -> Sort {
        Sort::desc("created_at")
    }

    fn validate_draft(draft: &AdDraft) -> Result<()> {
        require_text("title", &draft.title)
    }

    fn validate_patch(patch: &AdPatch) -> Result<()> {
        reject_blank("title", patch.title.as_deref())
    }

    fn title(item: &Ad) -> String {
        item.title.clone()
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Title", "Placement", "Status"]
    }

    fn row(item: &Ad) -> Vec<String> {
        vec![
            item.id.clone(),
            item.title.clone(),
            item.placement.map(|p| p.to_string()).unwrap_or_default(),
            item.status.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_filter_parses_case_insensitively() {
        let mut filters = AdFilters::default();
        filters.set("placement", "Sidebar").unwrap();
        assert_eq!(filters.placement, Some(Placement::Sidebar));
        assert!(filters.set("placement", "footer").is_err());
    }

    #[test]
    fn test_draft_requires_title() {
        let err = Ads::validate_draft(&AdDraft::default()).unwrap_err();
        assert_eq!(err.user_message(), "title required");
    }
}
