//! Curated highlights shown on the home screen, ordered by position.

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::{
    FilterSet, Identified, Resource, Sort, flag, parse_bool_filter, reject_blank, require_text,
    unknown_filter,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

impl Identified for Highlight {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightFilters {
    pub is_active: Option<bool>,
}

impl FilterSet for HighlightFilters {
    const KEYS: &'static [&'static str] = &["is_active"];

    fn to_params(&self) -> Vec<(String, String)> {
        self.is_active
            .map(|active| vec![("is_active".to_string(), active.to_string())])
            .unwrap_or_default()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "is_active" => self.is_active = parse_bool_filter(key, value)?,
            _ => return Err(unknown_filter::<Self>(key)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighlightDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighlightPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

pub struct Highlights;

impl Resource for Highlights {
    type Item = Highlight;
    type Filters = HighlightFilters;
    type Draft = HighlightDraft;
    type Patch = HighlightPatch;

    const NAME: &'static str = "highlights";
    const PATH: &'static str = "highlights";
    const LABEL: &'static str = "Highlight";
    const PAGE_SIZE: u32 = 12;
    const TRANSITIONS: &'static [&'static str] = &["activate", "deactivate"];

    fn default_sort() -> Sort {
        Sort::asc("position")
    }

    fn validate_draft(draft: &HighlightDraft) -> Result<()> {
        require_text("title", &draft.title)
    }

    fn validate_patch(patch: &HighlightPatch) -> Result<()> {
        reject_blank("title", patch.title.as_deref())
    }

    fn title(item: &Highlight) -> String {
        item.title.clone()
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Pos", "Title", "Active"]
    }

    fn row(item: &Highlight) -> Vec<String> {
        vec![
            item.id.clone(),
            item.position.map(|p| p.to_string()).unwrap_or_default(),
            item.title.clone(),
            flag(item.is_active),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sort_is_ascending_position() {
        assert_eq!(Highlights::default_sort().ordering(), "position");
    }

    #[test]
    fn test_is_active_filter() {
        let mut filters = HighlightFilters::default();
        filters.set("is_active", "false").unwrap();
        assert_eq!(
            filters.to_params(),
            vec![("is_active".to_string(), "false".to_string())]
        );
        filters.set("is_active", "").unwrap();
        assert!(filters.is_default());
    }
}
