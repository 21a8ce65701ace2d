//! Line-driven interactive browser.
//!
//! Reads commands from stdin and re-renders the table whenever the
//! controller reports a settled fetch or an in-place patch. Lines starting
//! with `/` feed the debounced search, so typing several searches in quick
//! succession issues a single request.

use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use crate::cli::ListArgs;
use crate::error::{DeskError, Result};
use crate::list::{ListController, ListEvent};
use crate::resources::{Resource, ResourceKind, Sort};

use super::{Session, parse_filter_arg, render_page, with_resource};

const HELP: &str = "\
/text      search (debounced); a bare / clears the search
:n  :p     next / previous page
:g N       go to page N
:f k=v     set a filter (empty value clears it)
:o FIELD   order by FIELD (prefix with - for descending)
:r         reset search, filters and ordering
:l         reload the current page
:h         this help
:q         quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum BrowseCommand {
    Search(String),
    Next,
    Previous,
    GoTo(u32),
    Filter(String, String),
    Order(String),
    Reset,
    Reload,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
fn parse_line(line: &str) -> Result<Option<BrowseCommand>> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(None);
    }
    if let Some(search) = line.strip_prefix('/') {
        return Ok(Some(BrowseCommand::Search(search.to_string())));
    }

    let line = line.trim();
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };

    let command = match cmd {
        ":n" => BrowseCommand::Next,
        ":p" => BrowseCommand::Previous,
        ":g" => {
            let page = rest.parse::<u32>().map_err(|_| {
                DeskError::validation("page", format!("invalid page '{rest}'"))
            })?;
            BrowseCommand::GoTo(page)
        }
        ":f" => {
            let (key, value) = parse_filter_arg(rest)?;
            BrowseCommand::Filter(key.to_string(), value.to_string())
        }
        ":o" => {
            if rest.is_empty() {
                return Err(DeskError::required("ordering"));
            }
            BrowseCommand::Order(rest.to_string())
        }
        ":r" => BrowseCommand::Reset,
        ":l" => BrowseCommand::Reload,
        ":h" | "?" => BrowseCommand::Help,
        ":q" => BrowseCommand::Quit,
        other => {
            return Err(DeskError::validation(
                "command",
                format!("unknown command '{other}', type :h for help"),
            ));
        }
    };
    Ok(Some(command))
}

/// Interactive browser over one resource
pub async fn cmd_browse(kind: ResourceKind, args: ListArgs) -> Result<()> {
    with_resource!(kind, R => browse::<R>(args).await)
}

async fn browse<R: Resource>(args: ListArgs) -> Result<()> {
    let session = Session::<R>::connect()?;
    session.apply_args(&args).await?;

    let mut events = session.controller.subscribe();
    let debouncer = session
        .controller
        .search_debouncer(session.config.debounce());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("{}", "Type :h for help, :q to quit".dimmed());
    session.controller.mount().await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Ok(Some(BrowseCommand::Quit)) => break,
                    Ok(Some(BrowseCommand::Search(raw))) => debouncer.set(raw),
                    Ok(Some(command)) => {
                        // Failures are reported through the toast queue
                        let _ = execute(&session.controller, command).await;
                    }
                    Ok(None) => {}
                    Err(e) => eprintln!("{} {}", "error:".red(), e.user_message()),
                }
                session.flush_all();
            }
            event = events.recv() => {
                match event {
                    Ok(ListEvent::Loaded { .. } | ListEvent::Patched) => {
                        println!("{}", render_page(&session.controller.snapshot()));
                    }
                    Ok(ListEvent::SelectionChanged) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "browse view lagged behind list events");
                    }
                    Err(RecvError::Closed) => break,
                }
                session.flush_all();
            }
        }
    }

    session.controller.unmount();
    drop(debouncer);
    Ok(())
}

async fn execute<R: Resource>(controller: &ListController<R>, command: BrowseCommand) -> Result<()> {
    match command {
        BrowseCommand::Next => controller.next_page().await,
        BrowseCommand::Previous => controller.previous_page().await,
        BrowseCommand::GoTo(page) => controller.go_to_page(page).await,
        BrowseCommand::Filter(key, value) => controller.set_filter(&key, &value).await,
        BrowseCommand::Order(key) => match Sort::parse(&key) {
            Ok(sort) => controller.on_sort_change(sort).await,
            Err(e) => {
                eprintln!("{} {}", "error:".red(), e.user_message());
                Err(e)
            }
        },
        BrowseCommand::Reset => controller.on_reset().await,
        BrowseCommand::Reload => controller.refresh().await,
        BrowseCommand::Help => {
            println!("{HELP}");
            Ok(())
        }
        BrowseCommand::Search(_) | BrowseCommand::Quit => Ok(()),
    }
}
