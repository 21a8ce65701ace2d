//! Trip packages sold through the marketplace.

use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Result};

use super::{
    FilterSet, Identified, Resource, Sort, flag, parse_bool_filter, parse_text_filter,
    reject_blank, require_text, unknown_filter,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub is_active: bool,
}

impl Identified for Package {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFilters {
    pub is_active: Option<bool>,
    pub destination: Option<String>,
}

impl FilterSet for PackageFilters {
    const KEYS: &'static [&'static str] = &["is_active", "destination"];

    fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(active) = self.is_active {
            params.push(("is_active".to_string(), active.to_string()));
        }
        if let Some(destination) = &self.destination {
            params.push(("destination".to_string(), destination.clone()));
        }
        params
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "is_active" => self.is_active = parse_bool_filter(key, value)?,
            "destination" => self.destination = parse_text_filter(value),
            _ => return Err(unknown_filter::<Self>(key)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackagePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

fn check_price(price: Option<f64>) -> Result<()> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => {
            Err(DeskError::validation("price", "price must be zero or more"))
        }
        _ => Ok(()),
    }
}

pub struct Packages;

impl Resource for Packages {
    type Item = Package;
    type Filters = PackageFilters;
    type Draft = PackageDraft;
    type Patch = PackagePatch;

    const NAME: &'static str = "packages";
    const PATH: &'static str = "packages";
    const LABEL: &'static str = "Package";
    const PAGE_SIZE: u32 = 12;
    const TRANSITIONS: &'static [&'static str] = &["activate", "deactivate"];

    fn default_sort() -> Sort {
        Sort::desc("created_at")
    }

    fn validate_draft(draft: &PackageDraft) -> Result<()> {
        require_text("name", &draft.name)?;
        check_price(draft.price)
    }

    fn validate_patch(patch: &PackagePatch) -> Result<()> {
        reject_blank("name", patch.name.as_deref())?;
        check_price(patch.price)
    }

    fn title(item: &Package) -> String {
        item.name.clone()
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Name", "Destination", "Days", "Price", "Active"]
    }

    fn row(item: &Package) -> Vec<String> {
        vec![
            item.id.clone(),
            item.name.clone(),
            item.destination.clone().unwrap_or_default(),
            item.duration_days.map(|d| d.to_string()).unwrap_or_default(),
            item.price.map(|p| format!("{p:.2}")).unwrap_or_default(),
            flag(item.is_active),
        ]
    }
}
