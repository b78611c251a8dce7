//! Entity module - Contains the wire models exchanged with the article backend.
//! These types mirror the JSON payloads of the list, create, and edit endpoints.
//! None of them is mutated by the form core; drafts are built from them instead.

pub mod article;
pub mod catalog;
pub mod listing;
pub mod props;

pub use article::{Approval, Article, CheckMaterialRef, MachineryRef, RelationRef, SourceArticle};
pub use catalog::{Catalogs, ListOption, LookupEntry, Machinery, Offer};
pub use listing::{ArticleSummary, OfferRef, Paginated};
pub use props::{CreatePageProps, EditPageProps, MediaValues};
