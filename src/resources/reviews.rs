//! Guest reviews. Moderated only; never created from the console.

use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Result};

use super::{
    FilterSet, Identified, ModerationStatus, Resource, Sort, parse_text_filter, unknown_filter,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub status: ModerationStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

impl Identified for Review {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilters {
    pub status: Option<ModerationStatus>,
    pub rating: Option<u8>,
}

impl FilterSet for ReviewFilters {
    const KEYS: &'static [&'static str] = &["status", "rating"];

    fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(status) = self.status {
            params.push(("status".to_string(), status.to_string()));
        }
        if let Some(rating) = self.rating {
            params.push(("rating".to_string(), rating.to_string()));
        }
        params
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "status" => {
                self.status = parse_text_filter(value).map(|v| v.parse()).transpose()?;
            }
            "rating" => {
                self.rating = match parse_text_filter(value) {
                    None => None,
                    Some(v) => match v.parse::<u8>() {
                        Ok(n) if (1..=5).contains(&n) => Some(n),
                        _ => {
                            return Err(DeskError::validation(
                                key,
                                format!("invalid rating '{v}', expected 1 to 5"),
                            ));
                        }
                    },
                };
            }
            _ => return Err(unknown_filter::<Self>(key)),
        }
        Ok(())
    }
}

/// Reviews are written by guests; the console only moderates them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewDraft {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

pub struct Reviews;

impl Resource for Reviews {
    type Item = Review;
    type Filters = ReviewFilters;
    type Draft = ReviewDraft;
    type Patch = ReviewPatch;

    const NAME: &'static str = "reviews";
    const PATH: &'static str = "reviews";
    const LABEL: &'static str = "Review";
    const PAGE_SIZE: u32 = 10;
    const TRANSITIONS: &'static [&'static str] = &["approve", "reject"];

    fn default_sort() -> Sort {
        Sort::desc("created_at")
    }

    fn validate_draft(_draft: &ReviewDraft) -> Result<()> {
        Err(DeskError::validation(
            "resource",
            "reviews cannot be created from the console",
        ))
    }

    fn title(item: &Review) -> String {
        match &item.author {
            Some(author) => format!("review by {author}"),
            None => format!("review {}", item.id),
        }
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Author", "Rating", "Status", "Excerpt"]
    }

    fn row(item: &Review) -> Vec<String> {
        let excerpt: String = item.body.chars().take(40).collect();
        vec![
            item.id.clone(),
            item.author.clone().unwrap_or_default(),
            item.rating.map(|r| r.to_string()).unwrap_or_default(),
            item.status.to_string(),
            excerpt,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_is_refused() {
        let err = Reviews::validate_draft(&ReviewDraft::default()).unwrap_err();
        assert!(matches!(err, DeskError::Validation { ref field, .. } if field == "resource"));
    }

    #[test]
    fn test_rating_bounds() {
        let mut filters = ReviewFilters::default();
        filters.set("rating", "5").unwrap();
        assert_eq!(filters.rating, Some(5));
        assert!(filters.set("rating", "0").is_err());
        assert!(filters.set("rating", "six").is_err());
        filters.set("rating", "").unwrap();
        assert!(filters.is_default());
    }
}
