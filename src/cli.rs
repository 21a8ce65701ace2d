use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;

use crate::remote::Transition;
use crate::resources::ResourceKind;

#[derive(Parser)]
#[command(name = "marketdesk")]
#[command(about = "Admin console for the marketplace back office")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Query options shared by `list` and `browse`
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Free-text search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Filter criterion as key=value (repeatable)
    #[arg(short, long = "filter", value_name = "KEY=VALUE", action = clap::ArgAction::Append)]
    pub filters: Vec<String>,

    /// Ordering field; a leading '-' sorts descending
    #[arg(long, value_name = "FIELD", allow_hyphen_values = true)]
    pub order_by: Option<String>,

    /// Sort descending
    #[arg(long, conflicts_with = "asc")]
    pub desc: bool,

    /// Sort ascending
    #[arg(long)]
    pub asc: bool,

    /// Page to show (clamped to the last page)
    #[arg(short, long, default_value = "1")]
    pub page: u32,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List one page of a resource
    #[command(visible_alias = "ls")]
    List {
        resource: ResourceKind,

        #[command(flatten)]
        args: ListArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one item
    Show {
        resource: ResourceKind,

        /// Item ID
        #[arg(value_parser = parse_item_id)]
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create an item from a JSON payload
    Create {
        resource: ResourceKind,

        /// JSON object with the item fields
        #[arg(short, long)]
        data: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update an item with a partial JSON payload
    Update {
        resource: ResourceKind,

        /// Item ID
        #[arg(value_parser = parse_item_id)]
        id: String,

        /// JSON object with the fields to change
        #[arg(short, long)]
        data: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete an item
    Delete {
        resource: ResourceKind,

        /// Item ID
        #[arg(value_parser = parse_item_id)]
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Approve a pending item
    Approve {
        resource: ResourceKind,

        /// Item ID
        #[arg(value_parser = parse_item_id)]
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reject a pending item with a reason
    Reject {
        resource: ResourceKind,

        /// Item ID
        #[arg(value_parser = parse_item_id)]
        id: String,

        /// Reason shown to the submitter
        #[arg(short, long, default_value = "")]
        reason: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Activate an item
    Activate {
        resource: ResourceKind,

        /// Item ID
        #[arg(value_parser = parse_item_id)]
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Deactivate an item
    Deactivate {
        resource: ResourceKind,

        /// Item ID
        #[arg(value_parser = parse_item_id)]
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive line-driven browser (/text to search, :q to quit)
    Browse {
        resource: ResourceKind,

        #[command(flatten)]
        args: ListArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (api.base_url, api.timeout, auth.token, search.debounce_ms, page_size.<resource>)
        key: String,
        /// Value to set
        value: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get a configuration value
    Get {
        /// Configuration key (api.base_url, api.timeout, auth.token, search.debounce_ms, page_size.<resource>)
        key: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self) -> crate::error::Result<()> {
        use crate::commands::{
            cmd_browse, cmd_config_get, cmd_config_set, cmd_config_show, cmd_create, cmd_delete,
            cmd_list, cmd_show, cmd_transition, cmd_update,
        };

        match self {
            Commands::List {
                resource,
                args,
                json,
            } => cmd_list(resource, args, json).await,
            Commands::Show { resource, id, json } => cmd_show(resource, &id, json).await,
            Commands::Create {
                resource,
                data,
                json,
            } => cmd_create(resource, &data, json).await,
            Commands::Update {
                resource,
                id,
                data,
                json,
            } => cmd_update(resource, &id, &data, json).await,
            Commands::Delete { resource, id, json } => cmd_delete(resource, &id, json).await,
            Commands::Approve { resource, id, json } => {
                cmd_transition(resource, &id, Transition::Approve, json).await
            }
            Commands::Reject {
                resource,
                id,
                reason,
                json,
            } => cmd_transition(resource, &id, Transition::Reject { reason }, json).await,
            Commands::Activate { resource, id, json } => {
                cmd_transition(resource, &id, Transition::Activate, json).await
            }
            Commands::Deactivate { resource, id, json } => {
                cmd_transition(resource, &id, Transition::Deactivate, json).await
            }
            Commands::Browse { resource, args } => cmd_browse(resource, args).await,

            Commands::Config { action } => match action {
                ConfigAction::Show { json } => cmd_config_show(json),
                ConfigAction::Set { key, value, json } => cmd_config_set(&key, &value, json),
                ConfigAction::Get { key, json } => cmd_config_get(&key, json),
            },

            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

fn parse_item_id(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("ID cannot be empty".to_string());
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err("ID cannot contain whitespace".to_string());
    }
    Ok(trimmed.to_string())
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "marketdesk", &mut io::stdout());
}
