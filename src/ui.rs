// UI layer: one handler per subcommand.
// Each handler calls the API client, checks the logical `status` of the
// result, then prints either pretty JSON or a short text rendering. The
// text renderers are plain functions returning `String` so they can be
// tested without a terminal.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::api::ApiClient;
use crate::cli::{Command, FolderCommand, ItemCommand, TransferCommand};
use crate::error::{ApiError, ErrorKind};
use crate::types::{
    Breadcrumb, CacheCheckResult, FolderListing, ItemDetails, ItemKind, ItemListAllResult,
    StatusTagged, TransferList,
};

/// Dispatch a parsed command.
pub async fn run(api: &ApiClient, command: Command) -> Result<()> {
    match command {
        Command::Services => {
            let services = with_spinner("Fetching services...", false, api.services_list())
                .await
                .context("Failed to fetch services")?;
            print_json(&services)
        }
        Command::Cache {
            urls,
            details,
            output,
        } => {
            let cache = with_spinner(
                "Checking cache...",
                output.json,
                api.cache_check(urls.as_slice()),
            )
            .await
            .and_then(StatusTagged::into_success)
            .context("Failed to check cache")?;
            if output.json {
                return print_json(&cache);
            }
            print!("{}", render_cache(&cache, details));
            Ok(())
        }
        Command::Folder(cmd) => run_folder(api, cmd).await,
        Command::Item(cmd) => run_item(api, cmd).await,
        Command::Transfer(cmd) => run_transfer(api, cmd).await,
    }
}

async fn run_folder(api: &ApiClient, cmd: FolderCommand) -> Result<()> {
    match cmd {
        FolderCommand::List {
            folder_id,
            include_breadcrumbs,
            output,
        } => {
            let listing = with_spinner(
                "Listing folder...",
                output.json,
                api.folder_list(folder_id.as_deref(), include_breadcrumbs),
            )
            .await
            .and_then(StatusTagged::into_success)
            .context("Failed to list folder")?;
            if output.json {
                return print_json(&listing);
            }
            println!("Items in folder {}:", folder_id.as_deref().unwrap_or("Root"));
            if let Some(trail) = listing.breadcrumbs.as_deref().filter(|b| !b.is_empty()) {
                println!("{}", render_breadcrumbs(trail));
            }
            print!("{}", render_listing(&listing));
            Ok(())
        }
        FolderCommand::Create {
            name,
            parent_id,
            output,
        } => {
            let created = with_spinner(
                "Creating folder...",
                output.json,
                api.folder_create(&name, parent_id.as_deref()),
            )
            .await
            .and_then(StatusTagged::into_success)
            .context("Failed to create folder")?;
            if output.json {
                return print_json(&created);
            }
            println!(
                "Folder created: {} ({})",
                name,
                created.id.as_deref().unwrap_or("unknown id")
            );
            Ok(())
        }
        FolderCommand::Rename {
            folder_id,
            new_name,
            output,
        } => {
            let renamed = with_spinner(
                "Renaming folder...",
                output.json,
                api.folder_rename(&folder_id, &new_name),
            )
            .await
            .and_then(StatusTagged::into_success)
            .context("Failed to rename folder")?;
            if output.json {
                return print_json(&renamed);
            }
            println!("Folder renamed: {folder_id} -> {new_name}");
            Ok(())
        }
        FolderCommand::Delete {
            folder_id,
            yes,
            output,
        } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete folder {folder_id} and everything in it?"))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("Aborted.");
                    return Ok(());
                }
            }
            let deleted = with_spinner("Deleting folder...", output.json, api.folder_delete(&folder_id))
                .await
                .and_then(StatusTagged::into_success)
                .context("Failed to delete folder")?;
            if output.json {
                return print_json(&deleted);
            }
            println!("Folder deleted: {folder_id}");
            Ok(())
        }
        FolderCommand::Search { query, output } => {
            let results = with_spinner("Searching...", output.json, api.folder_search(&query))
                .await
                .and_then(StatusTagged::into_success)
                .context("Failed to search folders")?;
            if output.json {
                return print_json(&results);
            }
            println!("Search results for \"{query}\":");
            print!("{}", render_listing(&results));
            Ok(())
        }
    }
}

async fn run_item(api: &ApiClient, cmd: ItemCommand) -> Result<()> {
    match cmd {
        ItemCommand::Listall { output } => {
            let items = with_spinner("Listing all items...", output.json, api.item_listall())
                .await
                .and_then(StatusTagged::into_success)
                .context("Failed to list all items")?;
            if output.json {
                return print_json(&items);
            }
            print!("{}", render_all_items(&items));
            Ok(())
        }
        ItemCommand::Details { item_id, output } => {
            let details = with_spinner("Fetching item...", output.json, api.item_details(&item_id))
                .await
                .and_then(StatusTagged::into_success)
                .context("Failed to get item details")?;
            if output.json {
                return print_json(&details);
            }
            println!("Item details for {item_id}:");
            print!("{}", render_details(&details)?);
            Ok(())
        }
        ItemCommand::StreamLink { item_id } => {
            let details = with_spinner("Fetching item...", true, api.item_details(&item_id))
                .await
                .and_then(StatusTagged::into_success)
                .context("Failed to get stream link")?;
            let link = details
                .playable_link()
                .with_context(|| format!("Item {item_id} has no stream or download link"))?;
            println!("{link}");
            Ok(())
        }
    }
}

async fn run_transfer(api: &ApiClient, cmd: TransferCommand) -> Result<()> {
    match cmd {
        TransferCommand::List { output } => {
            let list = with_spinner("Listing transfers...", output.json, api.transfer_list())
                .await
                .and_then(StatusTagged::into_success)
                .context("Failed to list transfers")?;
            if output.json {
                return print_json(&list);
            }
            print!("{}", render_transfers(&list));
            Ok(())
        }
        TransferCommand::Create {
            url,
            folder_id,
            output,
        } => {
            let created = with_spinner(
                "Creating transfer...",
                output.json,
                api.transfer_create(&url, folder_id.as_deref()),
            )
            .await
            .and_then(StatusTagged::into_success)
            .context("Failed to create transfer")?;
            if output.json {
                return print_json(&created);
            }
            println!(
                "Transfer created: {} ({})",
                created.name.as_deref().unwrap_or(&url),
                created.id.as_deref().unwrap_or("unknown id")
            );
            Ok(())
        }
    }
}

/// Run `fut` behind a stderr spinner. JSON output stays spinner-free so
/// it can be piped.
async fn with_spinner<T, F>(message: &str, quiet: bool, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    if quiet {
        return fut.await;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = fut.await;
    spinner.finish_and_clear();
    result
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

/// Strip line breaks the API sometimes leaves in file names.
pub fn clean_name(name: &str) -> String {
    name.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}

pub fn render_cache(cache: &CacheCheckResult, details: bool) -> String {
    let mut out = String::new();
    for entry in cache.entries() {
        let state = if entry.cached {
            "Cached".green()
        } else {
            "Not cached".red()
        };
        let name = if entry.filename.is_empty() {
            "(unknown)".to_string()
        } else {
            clean_name(entry.filename)
        };
        out.push_str(&format!("- {name} ({state})\n"));
        if details {
            out.push_str(&format!(
                "    transcoded: {}, size: {}\n",
                entry.transcoded,
                if entry.filesize.is_empty() { "-" } else { entry.filesize }
            ));
        }
    }
    out
}

pub fn render_listing(listing: &FolderListing) -> String {
    listing
        .content
        .iter()
        .map(|item| {
            let suffix = if item.kind == ItemKind::Folder { "/" } else { "" };
            format!("- {}{} ({})\n", clean_name(&item.name), suffix, item.id)
        })
        .collect()
}

pub fn render_breadcrumbs(trail: &[Breadcrumb]) -> String {
    trail
        .iter()
        .map(|b| clean_name(&b.name))
        .collect::<Vec<_>>()
        .join(" / ")
}

pub fn render_all_items(items: &ItemListAllResult) -> String {
    items
        .files
        .iter()
        .map(|file| format!("- {} ({})\n", clean_name(&file.path), file.id))
        .collect()
}

/// Every present field as `- key: value`, sorted by key.
pub fn render_details(details: &ItemDetails) -> Result<String> {
    let value = serde_json::to_value(details).context("Failed to serialize item details")?;
    let mut out = String::new();
    if let serde_json::Value::Object(map) = value {
        for (key, value) in map {
            let text = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            out.push_str(&format!("- {key}: {text}\n"));
        }
    }
    Ok(out)
}

pub fn render_transfers(list: &TransferList) -> String {
    if list.transfers.is_empty() {
        return "No transfers.\n".to_string();
    }
    list.transfers
        .iter()
        .map(|t| {
            let name = t.name.as_deref().or(t.src.as_deref()).unwrap_or("(unnamed)");
            let progress = t
                .progress
                .map(|p| format!(" {:.0}%", p * 100.0))
                .unwrap_or_default();
            format!("- {} [{}{}] ({})\n", clean_name(name), t.status, progress, t.id)
        })
        .collect()
}

/// Print an error for the user and return the process exit code.
pub fn report_error(err: &anyhow::Error) -> i32 {
    eprint!("{} {}", "Error:".red().bold(), render_error(err));
    err.downcast_ref::<ApiError>()
        .map(|api_err| exit_code(api_err.kind()))
        .unwrap_or(1)
}

/// The full cause chain on one line, then one line per validation issue.
pub fn render_error(err: &anyhow::Error) -> String {
    let mut out = format!("{err:#}\n");
    if let Some(ApiError::Validation(issues)) = err.downcast_ref::<ApiError>() {
        out.push_str("Unexpected fields in the API response:\n");
        for issue in issues {
            out.push_str(&format!("  {issue}\n"));
        }
    }
    out
}

pub fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Config | ErrorKind::Precondition => 2,
        _ => 1,
    }
}
