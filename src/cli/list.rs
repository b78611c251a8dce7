//! Article list commands.

use super::ListArgs;
use crate::{
    backend::ArticleBackend,
    core::listing::{DeleteDialog, Filters, ListController, SortDirection, non_empty, row_actions},
    entities::{ArticleSummary, Paginated},
    errors::{Error, Result},
};
use dialoguer::Confirm;
use std::fmt::Write;
use tracing::info;

/// Filters requested on the command line. A `--query` link wins over the
/// individual options; `per_page` fills in when the query leaves it unset.
/// Blank options count as unset.
#[must_use]
pub fn filters_from_args(args: &ListArgs, per_page: Option<u32>) -> Filters {
    let mut filters = match &args.query {
        Some(query) => Filters::from_query(query),
        None => Filters {
            search: args.search.as_deref().and_then(non_empty),
            offer: args.offer.as_deref().and_then(non_empty),
            category: args.category.as_deref().and_then(non_empty),
            sort: args.sort,
            direction: if args.desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            },
            page: args.page.max(1),
            per_page: None,
        },
    };
    filters.per_page = filters.per_page.or(per_page);
    filters
}

#[must_use]
pub fn format_row(row: &ArticleSummary) -> String {
    let mut line = format!("{:<16} {}", row.code, row.description);
    if let Some(offer) = &row.offer {
        let _ = write!(line, "  [offer {}]", offer.code);
    }
    if let Some(category) = &row.category {
        let _ = write!(line, "  [{category}]");
    }
    if !row.visible {
        line.push_str("  (hidden)");
    }
    if row.has_attachment {
        line.push_str("  +attachment");
    }
    line
}

#[must_use]
pub fn format_footer(page: &Paginated<ArticleSummary>) -> String {
    format!(
        "Page {}/{} ({} article{})",
        page.current_page,
        page.last_page.max(1),
        page.total,
        if page.total == 1 { "" } else { "s" }
    )
}

pub async fn list<B: ArticleBackend>(
    backend: &B,
    args: &ListArgs,
    per_page: Option<u32>,
) -> Result<()> {
    let mut controller = ListController::new(filters_from_args(args, per_page));
    let request = controller.refresh();
    controller.load(backend, request).await;

    if let Some(message) = controller.error() {
        return Err(Error::ListUnavailable {
            message: message.to_string(),
        });
    }

    let page = controller.result();
    if page.data.is_empty() {
        println!("No articles found.");
    }
    for row in &page.data {
        println!("{}  {}", row.uuid, format_row(row));
        if args.actions {
            for link in row_actions(row) {
                match link.href {
                    Some(href) => println!("    {}: {href}", link.action.label()),
                    None => println!("    {}", link.action.label()),
                }
            }
        }
    }
    println!("{}", format_footer(page));

    let query = controller.query_string();
    if !query.is_empty() {
        println!("Link: ?{query}");
    }
    Ok(())
}

/// Deletes after confirmation. A failed deletion keeps the dialog open and asks
/// again; with `assume_yes` it fails instead of prompting.
pub async fn delete<B: ArticleBackend>(backend: &B, uuid: &str, assume_yes: bool) -> Result<()> {
    let mut dialog = DeleteDialog::default();
    dialog.open(uuid);

    loop {
        if !assume_yes {
            let prompt = match &dialog {
                DeleteDialog::Confirming {
                    error: Some(error), ..
                } => format!("Deletion failed ({error}). Retry?"),
                _ => format!("Delete article {uuid}?"),
            };
            if !Confirm::new().with_prompt(prompt).default(false).interact()? {
                dialog.cancel();
                info!(article = uuid, "deletion cancelled");
                println!("Cancelled.");
                return Ok(());
            }
        }

        if dialog.confirm_and_delete(backend).await {
            println!("Deleted {uuid}.");
            return Ok(());
        }

        if assume_yes {
            let message = match &dialog {
                DeleteDialog::Confirming {
                    error: Some(error), ..
                } => error.clone(),
                _ => String::new(),
            };
            return Err(Error::DeleteFailed {
                uuid: uuid.to_string(),
                message,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::listing::SortColumn,
        entities::OfferRef,
        test_utils::{FakeBackend, summary},
    };

    #[test]
    fn test_filters_from_args() {
        let args = ListArgs {
            search: Some("tray".to_string()),
            sort: Some(SortColumn::Description),
            desc: true,
            page: 0,
            ..ListArgs::default()
        };
        let filters = filters_from_args(&args, Some(25));
        assert_eq!(filters.search.as_deref(), Some("tray"));
        assert_eq!(filters.direction, SortDirection::Desc);
        assert_eq!(filters.page, 1);
        assert_eq!(filters.per_page, Some(25));
    }

    #[test]
    fn test_blank_options_are_omitted() {
        let args = ListArgs {
            search: Some(String::new()),
            offer: Some("  ".to_string()),
            category: Some(" cat-1 ".to_string()),
            ..ListArgs::default()
        };
        let filters = filters_from_args(&args, None);
        assert_eq!(filters.search, None);
        assert_eq!(filters.offer, None);
        assert_eq!(filters.to_query(), vec![("category", "cat-1".to_string())]);
    }

    #[test]
    fn test_query_overrides_options() {
        let args = ListArgs {
            search: Some("ignored".to_string()),
            query: Some("?offer=offer-1&page=2&per_page=5".to_string()),
            ..ListArgs::default()
        };
        let filters = filters_from_args(&args, Some(25));
        assert_eq!(filters.search, None);
        assert_eq!(filters.offer.as_deref(), Some("offer-1"));
        assert_eq!(filters.page, 2);
        assert_eq!(filters.per_page, Some(5));
    }

    #[test]
    fn test_format_row_and_footer() {
        let mut row = summary("A-1");
        row.offer = Some(OfferRef {
            uuid: "offer-1".to_string(),
            code: "OF-1".to_string(),
        });
        row.visible = false;
        let line = format_row(&row);
        assert!(line.starts_with("A-1"));
        assert!(line.contains("[offer OF-1]"));
        assert!(line.ends_with("(hidden)"));

        let page = Paginated {
            data: vec![row],
            total: 1,
            ..Paginated::default()
        };
        assert_eq!(format_footer(&page), "Page 1/1 (1 article)");
    }

    #[tokio::test]
    async fn test_list_runs_against_backend() -> Result<()> {
        let backend = FakeBackend::new().with_articles(&["A-1", "B-1"]);
        let args = ListArgs {
            search: Some("B".to_string()),
            actions: true,
            ..ListArgs::default()
        };
        list(&backend, &args, None).await
    }

    #[tokio::test]
    async fn test_delete_without_prompt() {
        let backend = FakeBackend::new().with_articles(&["A-1"]);
        delete(&backend, "uuid-A-1", true).await.unwrap();
        assert_eq!(backend.deleted(), vec!["uuid-A-1".to_string()]);

        let result = delete(&backend, "uuid-A-1", true).await;
        assert!(matches!(result, Err(Error::DeleteFailed { .. })));
    }
}
