//! Command-line surface of the binary.
//!
//! Each subcommand drives the same controllers a page would: `list` runs the list
//! controller, `create`/`duplicate`/`update` bootstrap an article page from the
//! backend's props, apply the requested edits and submit, `delete` walks the
//! confirmation dialog.

/// Create, duplicate, update and show commands
pub mod form;
/// List and delete commands
pub mod list;

use crate::{backend::ArticleBackend, config::AppConfig, core::listing::SortColumn, errors::Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "article-desk")]
#[command(about = "Browse and author packaging articles", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List articles
    List(ListArgs),

    /// Show an article as the edit page would load it
    Show {
        /// Article uuid
        uuid: String,
    },

    /// Create a new article
    Create {
        /// Offer the article belongs to
        #[arg(long)]
        offer: Option<String>,

        #[command(flatten)]
        edits: EditArgs,
    },

    /// Create a new article starting from a copy of another
    Duplicate {
        /// Uuid of the article to copy
        source: String,

        #[command(flatten)]
        edits: EditArgs,
    },

    /// Edit an existing article
    Update {
        /// Article uuid
        uuid: String,

        #[command(flatten)]
        edits: EditArgs,
    },

    /// Delete an article after confirmation
    Delete {
        /// Article uuid
        uuid: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Default, Args)]
pub struct ListArgs {
    /// Free-text search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only articles of this offer
    #[arg(long)]
    pub offer: Option<String>,

    /// Only articles of this category
    #[arg(long)]
    pub category: Option<String>,

    /// Sort column (code/description/offer/category/created_at)
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<SortColumn>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Query string of a shared list link; overrides the other filters
    #[arg(long)]
    pub query: Option<String>,

    /// Print each row's action menu
    #[arg(long)]
    pub actions: bool,
}

#[derive(Debug, Default, Args)]
pub struct EditArgs {
    /// Set a field, flag or approval (e.g. `code=ART-1`, `visible=yes`,
    /// `quality_approval_date=2024-05-01`)
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// Add a reference row (e.g. `materials=<uuid>`)
    #[arg(long = "add", value_name = "RELATION=UUID", value_parser = parse_assignment)]
    pub add: Vec<(String, String)>,

    /// Add a machinery parameter
    #[arg(long = "machinery", value_name = "UUID=VALUE", value_parser = parse_assignment)]
    pub machinery: Vec<(String, String)>,

    /// Add a check-material row; an empty unit keeps the offer's unit of measure
    #[arg(long = "check-material", value_name = "MATERIAL:UNIT:EXPECTED:EFFECTIVE")]
    pub check_materials: Vec<String>,

    /// Remove every row of a relation before adding
    #[arg(long = "clear", value_name = "RELATION")]
    pub clear: Vec<String>,

    /// File to upload as the article's attachment
    #[arg(long)]
    pub attach: Option<PathBuf>,

    /// Print the request body instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

/// Splits `key=value`. The value may itself contain `=`.
pub fn parse_assignment(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_sort(raw: &str) -> std::result::Result<SortColumn, String> {
    SortColumn::from_wire(raw).ok_or_else(|| format!("unknown sort column `{raw}`"))
}

/// Runs one command against `backend`.
pub async fn run<B: ArticleBackend>(cli: Cli, config: &AppConfig, backend: &B) -> Result<()> {
    match cli.command {
        Commands::List(args) => list::list(backend, &args, config.list.per_page).await,
        Commands::Show { uuid } => form::show(backend, &uuid).await,
        Commands::Create { offer, edits } => form::create(backend, offer.as_deref(), &edits).await,
        Commands::Duplicate { source, edits } => form::duplicate(backend, &source, &edits).await,
        Commands::Update { uuid, edits } => form::update(backend, &uuid, &edits).await,
        Commands::Delete { uuid, yes } => list::delete(backend, &uuid, yes).await,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::FakeBackend;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("notes=a=b").unwrap(),
            ("notes".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_assignment("code=").unwrap(),
            ("code".to_string(), String::new())
        );
        assert!(parse_assignment("code").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_cli_parses_edits() {
        let cli = Cli::try_parse_from([
            "article-desk",
            "update",
            "art-1",
            "--set",
            "code=ART-2",
            "--add",
            "materials=mat-3",
            "--machinery",
            "mach-speed=14",
            "--dry-run",
        ])
        .unwrap();

        let Commands::Update { uuid, edits } = cli.command else {
            panic!("expected update");
        };
        assert_eq!(uuid, "art-1");
        assert_eq!(edits.set, vec![("code".to_string(), "ART-2".to_string())]);
        assert_eq!(edits.add.len(), 1);
        assert_eq!(edits.machinery[0].1, "14");
        assert!(edits.dry_run);
    }

    #[test]
    fn test_cli_rejects_unknown_sort() {
        assert!(Cli::try_parse_from(["article-desk", "list", "--sort", "weight"]).is_err());
        assert!(Cli::try_parse_from(["article-desk", "list", "--sort", "code", "--desc"]).is_ok());
    }

    #[tokio::test]
    async fn test_run_dispatches_to_backend() -> Result<()> {
        let backend = FakeBackend::new().with_articles(&["A-1"]);
        let config = AppConfig::default();

        let cli = Cli::try_parse_from(["article-desk", "delete", "uuid-A-1", "--yes"]).unwrap();
        run(cli, &config, &backend).await?;
        assert_eq!(backend.deleted(), vec!["uuid-A-1".to_string()]);

        let cli = Cli::try_parse_from(["article-desk", "update", "art-1", "--set", "visible=no"])
            .unwrap();
        run(cli, &config, &backend).await?;
        assert_eq!(backend.updated()[0].1.get("visible"), Some("0"));
        Ok(())
    }
}
