//! Command-line grammar for `premiumize-cli`.

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "premiumize-cli",
    about = "A CLI for Premiumize.me",
    version,
    long_about = "Talks to the Premiumize.me API.\nSet PREMIUMIZE_API_KEY in the environment or a .env file."
)]
pub struct Cli {
    /// Build requests but do not send them
    #[arg(long, global = true)]
    pub dryrun: bool,

    /// Log requests and responses to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// `-j/--json` shared by every command that prints a result.
#[derive(Debug, Clone, Copy, Args)]
pub struct Output {
    /// Output in JSON format
    #[arg(short, long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List available services
    Services,
    /// Check whether URLs are cached
    Cache {
        /// URLs to check
        #[arg(required = true)]
        urls: Vec<String>,
        /// Show transcoded flag and size for each URL
        #[arg(short, long)]
        details: bool,
        #[command(flatten)]
        output: Output,
    },
    /// Manage folders
    #[command(subcommand)]
    Folder(FolderCommand),
    /// Manage items in folders
    #[command(subcommand)]
    Item(ItemCommand),
    /// Manage transfers
    #[command(subcommand, visible_alias = "transfers")]
    Transfer(TransferCommand),
}

#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// List items in a folder
    #[command(visible_alias = "ls")]
    List {
        /// ID of the folder to list (default: root)
        folder_id: Option<String>,
        /// Include breadcrumbs in the output
        #[arg(short = 'b', long)]
        include_breadcrumbs: bool,
        #[command(flatten)]
        output: Output,
    },
    /// Create a new folder
    Create {
        /// Name of the new folder
        name: String,
        /// ID of the parent folder
        parent_id: Option<String>,
        #[command(flatten)]
        output: Output,
    },
    /// Rename a folder
    Rename {
        /// ID of the folder to rename
        folder_id: String,
        /// New name for the folder
        new_name: String,
        #[command(flatten)]
        output: Output,
    },
    /// Delete a folder
    #[command(visible_aliases = ["rm", "del"])]
    Delete {
        /// ID of the folder to delete
        folder_id: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
        #[command(flatten)]
        output: Output,
    },
    /// Search for items in all folders, including root
    Search {
        /// Search query
        query: String,
        #[command(flatten)]
        output: Output,
    },
}

#[derive(Debug, Subcommand)]
pub enum ItemCommand {
    /// List all items in all folders
    #[command(visible_aliases = ["list", "ls"])]
    Listall {
        #[command(flatten)]
        output: Output,
    },
    /// Get details of an item
    Details {
        /// ID of the item
        item_id: String,
        #[command(flatten)]
        output: Output,
    },
    /// Print the stream link of an item
    StreamLink {
        /// ID of the item
        item_id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum TransferCommand {
    /// List all transfers
    List {
        #[command(flatten)]
        output: Output,
    },
    /// Create a new transfer
    Create {
        /// URL to transfer
        url: String,
        /// Folder to save the download into
        #[arg(long)]
        folder_id: Option<String>,
        #[command(flatten)]
        output: Output,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn grammar_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn aliases_resolve() {
        let cli = Cli::parse_from(["premiumize-cli", "folder", "rm", "abc", "-y"]);
        match cli.command {
            Command::Folder(FolderCommand::Delete { folder_id, yes, .. }) => {
                assert_eq!(folder_id, "abc");
                assert!(yes);
            }
            other => panic!("unexpected {other:?}"),
        }

        let cli = Cli::parse_from(["premiumize-cli", "transfers", "list", "--json"]);
        assert!(matches!(
            cli.command,
            Command::Transfer(TransferCommand::List { output: Output { json: true } })
        ));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["premiumize-cli", "item", "ls", "--dryrun", "-v"]);
        assert!(cli.dryrun);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Item(ItemCommand::Listall { .. })));
    }

    #[test]
    fn cache_requires_a_url() {
        assert!(Cli::try_parse_from(["premiumize-cli", "cache"]).is_err());
        let cli = Cli::try_parse_from(["premiumize-cli", "cache", "a", "b", "-d"]).unwrap();
        match cli.command {
            Command::Cache { urls, details, output } => {
                assert_eq!(urls, vec!["a", "b"]);
                assert!(details);
                assert!(!output.json);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
