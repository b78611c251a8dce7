//! Article list controller.
//!
//! Holds the list filters (search, offer, category, sort column and direction,
//! page), keeps them in sync with a navigable query string, and sequences the read
//! requests issued when they change. Display filters update immediately; the
//! result set only changes when the matching response arrives. Responses to
//! superseded requests are dropped, so out-of-order arrival can't resurrect an old
//! view.

use crate::{
    backend::{ArticleBackend, routes},
    entities::{ArticleSummary, Paginated},
    errors::Result,
};
use reqwest::Url;
use tracing::{debug, info, warn};

// Only used to borrow `Url`'s query encoding for bare query strings.
const QUERY_BASE: &str = "http://list.local/";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    fn from_wire(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Sortable list columns
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortColumn {
    Code,
    Description,
    Offer,
    Category,
    CreatedAt,
}

impl SortColumn {
    pub const ALL: [Self; 5] = [
        Self::Code,
        Self::Description,
        Self::Offer,
        Self::Category,
        Self::CreatedAt,
    ];

    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Description => "description",
            Self::Offer => "offer",
            Self::Category => "category",
            Self::CreatedAt => "created_at",
        }
    }

    #[must_use]
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.wire_name() == value)
    }
}

/// Filter state of the list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filters {
    pub search: Option<String>,
    pub offer: Option<String>,
    pub category: Option<String>,
    pub sort: Option<SortColumn>,
    pub direction: SortDirection,
    pub page: u32,
    pub per_page: Option<u32>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            search: None,
            offer: None,
            category: None,
            sort: None,
            direction: SortDirection::Asc,
            page: 1,
            per_page: None,
        }
    }
}

pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Filters {
    /// Request parameters. Unset filters are omitted rather than sent empty.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        if let Some(offer) = &self.offer {
            query.push(("offer", offer.clone()));
        }
        if let Some(category) = &self.category {
            query.push(("category", category.clone()));
        }
        if let Some(sort) = self.sort {
            query.push(("sort", sort.wire_name().to_string()));
            query.push(("direction", self.direction.wire_name().to_string()));
        }
        if self.page > 1 {
            query.push(("page", self.page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            query.push(("per_page", per_page.to_string()));
        }
        query
    }

    /// Encoded query string, suitable for the address bar or a shared link.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let Ok(mut url) = Url::parse(QUERY_BASE) else {
            return String::new();
        };
        url.query_pairs_mut()
            .extend_pairs(self.to_query())
            .finish();
        url.query().unwrap_or_default().to_string()
    }

    /// Parses a query string (with or without the leading `?`). Unknown keys and
    /// malformed values are ignored.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut filters = Self::default();
        let query = query.trim_start_matches('?');
        let Ok(url) = Url::parse(&format!("{QUERY_BASE}?{query}")) else {
            return filters;
        };
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "search" => filters.search = non_empty(&value),
                "offer" => filters.offer = non_empty(&value),
                "category" => filters.category = non_empty(&value),
                "sort" => filters.sort = SortColumn::from_wire(&value),
                "direction" => {
                    filters.direction = SortDirection::from_wire(&value).unwrap_or_default();
                }
                "page" => filters.page = value.parse().ok().filter(|p| *p > 0).unwrap_or(1),
                "per_page" => filters.per_page = value.parse().ok().filter(|p| *p > 0),
                _ => {}
            }
        }
        filters
    }

    /// Same column flips the direction; a new column starts ascending.
    pub fn toggle_sort(&mut self, column: SortColumn) {
        if self.sort == Some(column) {
            self.direction = self.direction.flipped();
        } else {
            self.sort = Some(column);
            self.direction = SortDirection::Asc;
        }
        self.page = 1;
    }
}

/// A read the caller should perform and report back with `complete`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListRequest {
    pub seq: u64,
    pub filters: Filters,
}

/// State of the article list page
#[derive(Clone, Debug)]
pub struct ListController {
    display: Filters,
    applied: Filters,
    awaiting: Option<ListRequest>,
    issued: u64,
    search_pending: bool,
    result: Paginated<ArticleSummary>,
    error: Option<String>,
}

impl ListController {
    #[must_use]
    pub fn new(initial: Filters) -> Self {
        Self {
            display: initial.clone(),
            applied: initial,
            awaiting: None,
            issued: 0,
            search_pending: false,
            result: Paginated::default(),
            error: None,
        }
    }

    /// Controller restored from a navigable query string.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        Self::new(Filters::from_query(query))
    }

    /// Filters the controls currently show
    #[must_use]
    pub const fn display(&self) -> &Filters {
        &self.display
    }

    /// Filters of the result set currently shown
    #[must_use]
    pub const fn applied(&self) -> &Filters {
        &self.applied
    }

    #[must_use]
    pub const fn result(&self) -> &Paginated<ArticleSummary> {
        &self.result
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.awaiting.is_some()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Query string to mirror into the address bar.
    #[must_use]
    pub fn query_string(&self) -> String {
        self.display.to_query_string()
    }

    fn issue(&mut self) -> ListRequest {
        self.issued += 1;
        self.search_pending = false;
        let request = ListRequest {
            seq: self.issued,
            filters: self.display.clone(),
        };
        debug!(seq = request.seq, query = %self.query_string(), "issuing list request");
        self.awaiting = Some(request.clone());
        request
    }

    /// Request for the current filters, used on first load and to refresh.
    pub fn refresh(&mut self) -> ListRequest {
        self.issue()
    }

    /// Updates the search box. While a request is in flight the change is held
    /// and sent once that request completes, so at most one search is pending.
    pub fn set_search(&mut self, text: &str) -> Option<ListRequest> {
        self.display.search = non_empty(text);
        self.display.page = 1;
        if self.is_loading() {
            self.search_pending = true;
            None
        } else {
            Some(self.issue())
        }
    }

    pub fn set_offer(&mut self, offer: Option<&str>) -> ListRequest {
        self.display.offer = offer.and_then(non_empty);
        self.display.page = 1;
        self.issue()
    }

    pub fn set_category(&mut self, category: Option<&str>) -> ListRequest {
        self.display.category = category.and_then(non_empty);
        self.display.page = 1;
        self.issue()
    }

    pub fn toggle_sort(&mut self, column: SortColumn) -> ListRequest {
        self.display.toggle_sort(column);
        self.issue()
    }

    pub fn go_to_page(&mut self, page: u32) -> ListRequest {
        self.display.page = page.max(1);
        self.issue()
    }

    /// Back/forward navigation or an opened link: adopt the query's filters.
    pub fn navigate(&mut self, query: &str) -> ListRequest {
        let per_page = self.display.per_page;
        self.display = Filters::from_query(query);
        self.display.per_page = self.display.per_page.or(per_page);
        self.issue()
    }

    /// Reports the outcome of request `seq`. Superseded responses are ignored.
    /// Returns the follow-up request when a search edit was held back.
    pub fn complete(
        &mut self,
        seq: u64,
        result: Result<Paginated<ArticleSummary>>,
    ) -> Option<ListRequest> {
        let Some(request) = self.awaiting.take_if(|r| r.seq == seq) else {
            debug!(seq, latest = self.issued, "dropping stale list response");
            return None;
        };

        match result {
            Ok(page) => {
                info!(seq, rows = page.data.len(), total = page.total, "list loaded");
                self.applied = request.filters;
                self.result = page;
                self.error = None;
            }
            Err(e) => {
                warn!(seq, "list request failed: {}", e);
                self.error = Some(e.to_string());
                if !self.search_pending {
                    self.display = self.applied.clone();
                }
            }
        }

        if self.search_pending {
            Some(self.issue())
        } else {
            None
        }
    }

    /// Performs `request` and any follow-up it triggers.
    pub async fn load<B: ArticleBackend>(&mut self, backend: &B, request: ListRequest) {
        let mut next = Some(request);
        while let Some(request) = next {
            let result = backend.list_articles(&request.filters).await;
            next = self.complete(request.seq, result);
        }
    }
}

/// Entry of a list row's action menu
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowAction {
    View,
    ViewOffer,
    Edit,
    Duplicate,
    CreateOrder,
    Delete,
}

impl RowAction {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::View => "View",
            Self::ViewOffer => "View offer",
            Self::Edit => "Edit",
            Self::Duplicate => "Duplicate",
            Self::CreateOrder => "Create order",
            Self::Delete => "Delete",
        }
    }
}

/// Action menu entry with its target. Delete has no target: it opens the
/// confirmation dialog instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowActionLink {
    pub action: RowAction,
    pub href: Option<String>,
}

/// Fixed action menu of a list row. The offer entry only appears when the row
/// has a parent offer.
#[must_use]
pub fn row_actions(row: &ArticleSummary) -> Vec<RowActionLink> {
    let link = |action, href: String| RowActionLink {
        action,
        href: Some(href),
    };
    let mut actions = vec![link(RowAction::View, routes::article(&row.uuid))];
    if let Some(offer) = &row.offer {
        actions.push(link(RowAction::ViewOffer, routes::offer(&offer.uuid)));
    }
    actions.extend([
        link(RowAction::Edit, routes::edit_article(&row.uuid)),
        link(RowAction::Duplicate, routes::duplicate_article(&row.uuid)),
        link(RowAction::CreateOrder, routes::create_order(&row.uuid)),
        RowActionLink {
            action: RowAction::Delete,
            href: None,
        },
    ]);
    actions
}

/// State of the delete confirmation dialog
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DeleteDialog {
    #[default]
    Closed,
    Confirming {
        uuid: String,
        error: Option<String>,
    },
    Deleting {
        uuid: String,
    },
}

impl DeleteDialog {
    pub fn open(&mut self, uuid: &str) {
        *self = Self::Confirming {
            uuid: uuid.to_string(),
            error: None,
        };
    }

    /// Closes the dialog unless a deletion is running.
    pub fn cancel(&mut self) {
        if !matches!(self, Self::Deleting { .. }) {
            *self = Self::Closed;
        }
    }

    #[must_use]
    pub const fn can_confirm(&self) -> bool {
        matches!(self, Self::Confirming { .. })
    }

    /// Moves to `Deleting` and returns the uuid to delete.
    pub fn confirm(&mut self) -> Option<String> {
        let Self::Confirming { uuid, .. } = self else {
            return None;
        };
        let uuid = std::mem::take(uuid);
        *self = Self::Deleting { uuid: uuid.clone() };
        Some(uuid)
    }

    /// Success closes the dialog; failure reopens it with the error so the
    /// user can retry.
    pub fn finish(&mut self, result: Result<()>) -> bool {
        let Self::Deleting { uuid } = self else {
            return false;
        };
        match result {
            Ok(()) => {
                info!(article = %uuid, "article deleted");
                *self = Self::Closed;
                true
            }
            Err(e) => {
                warn!(article = %uuid, "article deletion failed: {}", e);
                let uuid = std::mem::take(uuid);
                *self = Self::Confirming {
                    uuid,
                    error: Some(e.to_string()),
                };
                false
            }
        }
    }

    /// Confirms and performs the deletion. Returns whether the article is gone.
    pub async fn confirm_and_delete<B: ArticleBackend>(&mut self, backend: &B) -> bool {
        let Some(uuid) = self.confirm() else {
            return false;
        };
        let result = backend.delete_article(&uuid).await;
        self.finish(result)
    }
}
