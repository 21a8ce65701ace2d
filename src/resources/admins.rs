//! Console administrator accounts.

use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Result};

use super::{
    FilterSet, Identified, Resource, Sort, flag, parse_bool_filter, parse_text_filter,
    reject_blank, require_text, unknown_filter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    Superadmin,
    Moderator,
    Support,
}

enum_display_fromstr!(AdminRole, "role", {
    Superadmin => "superadmin",
    Moderator => "moderator",
    Support => "support",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<AdminRole>,
    #[serde(default)]
    pub is_active: bool,
}

impl Identified for Admin {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminFilters {
    pub role: Option<AdminRole>,
    pub is_active: Option<bool>,
}

impl FilterSet for AdminFilters {
    const KEYS: &'static [&'static str] = &["role", "is_active"];

    fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(role) = self.role {
            params.push(("role".to_string(), role.to_string()));
        }
        if let Some(active) = self.is_active {
            params.push(("is_active".to_string(), active.to_string()));
        }
        params
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "role" => self.role = parse_text_filter(value).map(|v| v.parse()).transpose()?,
            "is_active" => self.is_active = parse_bool_filter(key, value)?,
            _ => return Err(unknown_filter::<Self>(key)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminDraft {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<AdminRole>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<AdminRole>,
}

fn check_email(email: &str) -> Result<()> {
    require_text("email", email)?;
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(DeskError::validation(
            "email",
            format!("invalid email '{email}'"),
        )),
    }
}

pub struct Admins;

impl Resource for Admins {
    type Item = Admin;
    type Filters = AdminFilters;
    type Draft = AdminDraft;
    type Patch = AdminPatch;

    const NAME: &'static str = "admins";
    const PATH: &'static str = "admins";
    const LABEL: &'static str = "Admin";
    const PAGE_SIZE: u32 = 10;
    const TRANSITIONS: &'static [&'static str] = &["activate", "deactivate"];

    fn default_sort() -> Sort {
        Sort::asc("email")
    }

    fn validate_draft(draft: &AdminDraft) -> Result<()> {
        check_email(&draft.email)?;
        require_text("name", &draft.name)
    }

    fn validate_patch(patch: &AdminPatch) -> Result<()> {
        if let Some(email) = &patch.email {
            check_email(email)?;
        }
        reject_blank("name", patch.name.as_deref())
    }

    fn title(item: &Admin) -> String {
        item.email.clone()
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Email", "Name", "Role", "Active"]
    }

    fn row(item: &Admin) -> Vec<String> {
        vec![
            item.id.clone(),
            item.email.clone(),
            item.name.clone(),
            item.role.map(|r| r.to_string()).unwrap_or_default(),
            flag(item.is_active),
        ]
    }
}
