//! Backend boundary - Everything authoritative lives behind this trait.
//!
//! Persistence, validation, search/sort/pagination and file storage are done by
//! the backend. The form core only builds request bodies, reads page props, and
//! interprets the answers.

/// HTTP implementation of the backend
pub mod http;
/// Resource paths
pub mod routes;

pub use http::HttpBackend;

use crate::{
    core::{listing::Filters, serialize::FormBody, validation::ErrorMap},
    entities::{ArticleSummary, CreatePageProps, EditPageProps, Paginated},
    errors::Result,
};

/// Answer to a create or update
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Saved; the page navigates to `redirect`
    Saved { redirect: String },
    /// Refused with field-keyed messages
    Rejected(ErrorMap),
}

/// Operations the article pages need from the backend
#[allow(async_fn_in_trait)]
pub trait ArticleBackend {
    /// Filtered, sorted, paginated article rows.
    async fn list_articles(&self, filters: &Filters) -> Result<Paginated<ArticleSummary>>;

    /// Props of the create page, optionally for an offer or duplicating a source.
    async fn create_page(
        &self,
        offer_uuid: Option<&str>,
        source_uuid: Option<&str>,
    ) -> Result<CreatePageProps>;

    async fn edit_page(&self, article_uuid: &str) -> Result<EditPageProps>;

    async fn create_article(&self, body: &FormBody) -> Result<SubmitOutcome>;

    async fn update_article(&self, article_uuid: &str, body: &FormBody) -> Result<SubmitOutcome>;

    async fn delete_article(&self, article_uuid: &str) -> Result<()>;

    /// Download link of an article's stored attachment.
    fn attachment_url(&self, article_uuid: &str) -> String;
}
