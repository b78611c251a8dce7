//! Article page controller - Create, duplicate and edit pages.
//!
//! A page is bootstrapped once from the backend's props into a `PageConfig` (the
//! resolved, read-only configuration) and an `ArticleDraft` (the editable state).
//! Submitting walks the page through `Pristine -> Editing -> Submitting` and then
//! either `Succeeded` or back to `Editing` with the backend's errors merged in.

use crate::{
    backend::{ArticleBackend, SubmitOutcome},
    core::{
        derived::Productivity,
        draft::{ArticleDraft, FormAction, RelationKind, TextField},
        rows::RowId,
        serialize::{FormBody, serialize},
        validation::{ErrorMap, Touched},
        value_kind::ValueKind,
    },
    entities::{Catalogs, CreatePageProps, EditPageProps, MediaValues, Offer},
    errors::{Error, Result},
};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Error map key used for failures that belong to no single field
pub const FORM_ERROR_KEY: &str = "form";

/// What the page is doing with the article
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Create,
    Duplicate { source_uuid: String },
    Edit { article_uuid: String },
}

/// Submission lifecycle of one page visit
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Pristine,
    Editing,
    Submitting,
    Succeeded { redirect: String },
}

/// Everything the page reads but never edits, resolved once at load time.
#[derive(Clone, Debug)]
pub struct PageConfig {
    pub mode: Mode,
    pub catalogs: Catalogs,
    /// Offer the article belongs to, when known
    pub offer: Option<Offer>,
    pub media_values: MediaValues,
    /// Server figure shown while actual pieces/hour/station can't be computed
    pub actual_fallback: Option<f64>,
    machinery_kinds: HashMap<String, ValueKind>,
}

impl PageConfig {
    #[must_use]
    pub fn new(
        mode: Mode,
        catalogs: Catalogs,
        offer: Option<Offer>,
        media_values: MediaValues,
        actual_fallback: Option<f64>,
    ) -> Self {
        let machinery_kinds = catalogs
            .machinery
            .iter()
            .map(|m| (m.uuid.clone(), ValueKind::decode_opt(m.value_type.as_deref())))
            .collect();
        Self {
            mode,
            catalogs,
            offer,
            media_values,
            actual_fallback,
            machinery_kinds,
        }
    }

    /// Configuration of the create page, fresh or duplicating.
    #[must_use]
    pub fn for_create(props: &CreatePageProps) -> Self {
        let mode = props
            .source_article
            .as_ref()
            .map_or(Mode::Create, |source| Mode::Duplicate {
                source_uuid: source.uuid.clone(),
            });
        let offer = props.offer.clone().or_else(|| {
            props
                .source_article
                .as_ref()
                .and_then(|s| s.offer_uuid.as_deref())
                .and_then(|uuid| props.catalogs.offer(uuid))
                .cloned()
        });
        Self::new(mode, props.catalogs.clone(), offer, props.media_values, None)
    }

    #[must_use]
    pub fn for_edit(props: &EditPageProps) -> Self {
        let offer = props
            .article
            .offer_uuid
            .as_deref()
            .and_then(|uuid| props.catalogs.offer(uuid))
            .cloned();
        Self::new(
            Mode::Edit {
                article_uuid: props.article.uuid.clone(),
            },
            props.catalogs.clone(),
            offer,
            props.media_values,
            props.actual_pieces_per_hour_station,
        )
    }

    /// Decoded value kind of a machinery entity; unknown entities are read-only.
    #[must_use]
    pub fn machinery_kind(&self, uuid: &str) -> ValueKind {
        self.machinery_kinds.get(uuid).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn default_unit_of_measure(&self) -> Option<&str> {
        self.offer.as_ref().and_then(|o| o.unit_of_measure.as_deref())
    }
}

/// State of one create/duplicate/edit page visit
#[derive(Clone, Debug)]
pub struct ArticlePage {
    config: PageConfig,
    draft: ArticleDraft,
    phase: Phase,
    touched: Touched,
    server_errors: ErrorMap,
}

impl ArticlePage {
    fn with(config: PageConfig, draft: ArticleDraft) -> Self {
        Self {
            config,
            draft,
            phase: Phase::Pristine,
            touched: Touched::default(),
            server_errors: ErrorMap::new(),
        }
    }

    /// Builds the create page. A source article makes it a duplicate; otherwise the
    /// draft is prefilled from the offer, if any.
    #[must_use]
    pub fn create(props: &CreatePageProps) -> Self {
        let config = PageConfig::for_create(props);
        let draft = match (&props.source_article, &config.offer) {
            (Some(source), _) => ArticleDraft::duplicate_of(source, &config),
            (None, Some(offer)) => ArticleDraft::from_offer(offer),
            (None, None) => ArticleDraft::blank(),
        };
        debug!(mode = ?config.mode, "create page bootstrapped");
        Self::with(config, draft)
    }

    #[must_use]
    pub fn edit(props: &EditPageProps) -> Self {
        let config = PageConfig::for_edit(props);
        let draft = ArticleDraft::from_article(&props.article, &config);
        debug!(article = %props.article.uuid, "edit page bootstrapped");
        Self::with(config, draft)
    }

    #[must_use]
    pub const fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub const fn draft(&self) -> &ArticleDraft {
        &self.draft
    }

    #[must_use]
    pub const fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.phase, Phase::Submitting)
    }

    /// Applies an edit to the draft. The first successful edit moves a pristine
    /// page to `Editing`.
    pub fn dispatch(&mut self, action: FormAction) -> bool {
        let changed = self.draft.apply(action, &self.config);
        if changed && self.phase == Phase::Pristine {
            self.phase = Phase::Editing;
        }
        changed
    }

    /// Appends a row to `kind` and returns its id, for callers that fill the row in
    /// right away.
    pub fn add_row(&mut self, kind: RelationKind) -> RowId {
        let id = self.draft.add_row(kind, &self.config);
        if self.phase == Phase::Pristine {
            self.phase = Phase::Editing;
        }
        id
    }

    /// Records that `field` lost focus; its error is shown from now on.
    pub fn blur(&mut self, field: &str) {
        self.touched.blur(field);
    }

    /// Errors to display: touched client errors unioned with the last server errors.
    #[must_use]
    pub fn visible_errors(&self) -> ErrorMap {
        let client = self.touched.visible(&self.draft.client_errors());
        ErrorMap::merge(&client, &self.server_errors)
    }

    #[must_use]
    pub fn productivity(&self) -> Productivity {
        Productivity::resolve(
            &self.config.media_values,
            self.draft.text(TextField::ActualBoxesPerHourPiece),
            self.draft.text(TextField::PiecesPerPackage),
            self.config.actual_fallback,
        )
    }

    /// Download link of the stored attachment, only on the edit page and only when
    /// the article has one.
    pub fn attachment_link<B: ArticleBackend>(&self, backend: &B) -> Option<String> {
        match (&self.config.mode, &self.draft.existing_attachment) {
            (Mode::Edit { article_uuid }, Some(_)) => Some(backend.attachment_url(article_uuid)),
            _ => None,
        }
    }

    /// Starts a submission and returns the body to send. Refused while another
    /// submission of this page is in flight, and once the page has been saved.
    pub fn begin_submit(&mut self) -> Result<FormBody> {
        match self.phase {
            Phase::Submitting => return Err(Error::SubmissionInFlight),
            Phase::Succeeded { .. } => return Err(Error::AlreadySaved),
            Phase::Pristine | Phase::Editing => {}
        }
        self.touched.touch_all();
        self.phase = Phase::Submitting;
        Ok(serialize(&self.draft))
    }

    /// Completes a submission with the backend's answer.
    pub fn finish_submit(&mut self, result: Result<SubmitOutcome>) {
        match result {
            Ok(SubmitOutcome::Saved { redirect }) => {
                info!(%redirect, "article saved");
                self.server_errors = ErrorMap::new();
                self.phase = Phase::Succeeded { redirect };
            }
            Ok(SubmitOutcome::Rejected(errors)) => {
                info!(count = errors.len(), "article rejected by backend");
                self.server_errors = errors;
                self.phase = Phase::Editing;
            }
            Err(e) => {
                warn!("article submission failed: {}", e);
                let mut errors = ErrorMap::new();
                errors.insert(FORM_ERROR_KEY, e.to_string());
                self.server_errors = errors;
                self.phase = Phase::Editing;
            }
        }
    }

    /// Sends the draft as a create or an update depending on the page mode.
    #[instrument(skip(self, backend), fields(mode = ?self.config.mode))]
    pub async fn submit<B: ArticleBackend>(&mut self, backend: &B) -> Result<&Phase> {
        let body = self.begin_submit()?;
        let result = match &self.config.mode {
            Mode::Create | Mode::Duplicate { .. } => backend.create_article(&body).await,
            Mode::Edit { article_uuid } => backend.update_article(article_uuid, &body).await,
        };
        self.finish_submit(result);
        Ok(&self.phase)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::draft::FlagField;
    use crate::test_utils::{FakeBackend, create_props, edit_props, sample_catalogs};

    #[test]
    fn test_create_page_from_offer() {
        let catalogs = sample_catalogs();
        let props = create_props(Some(catalogs.offers[0].clone()), None);
        let page = ArticlePage::create(&props);

        assert_eq!(page.config().mode, Mode::Create);
        assert_eq!(page.phase(), &Phase::Pristine);
        assert_eq!(page.draft().text(TextField::Offer), "offer-1");
        assert_eq!(page.productivity().actual_pieces_per_hour_station, "0.00000");
    }

    #[test]
    fn test_create_page_with_source_duplicates() {
        let props = create_props(None, Some(crate::test_utils::sample_article()));
        let page = ArticlePage::create(&props);

        assert_eq!(
            page.config().mode,
            Mode::Duplicate {
                source_uuid: "art-1".to_string()
            }
        );
        // The offer is resolved from the source article.
        assert_eq!(page.config().default_unit_of_measure(), Some("kg"));
    }

    #[test]
    fn test_dispatch_moves_to_editing() {
        let mut page = ArticlePage::create(&create_props(None, None));
        assert!(!page.dispatch(FormAction::RemoveRow(RelationKind::Materials, RowId::new(3))));
        assert_eq!(page.phase(), &Phase::Pristine);

        assert!(page.dispatch(FormAction::SetFlag(FlagField::Visible, true)));
        assert_eq!(page.phase(), &Phase::Editing);
    }

    #[test]
    fn test_add_row_returns_fresh_id() {
        let mut page = ArticlePage::edit(&edit_props());
        let id = page.add_row(RelationKind::Materials);

        assert_eq!(id, RowId::new(2));
        assert_eq!(page.phase(), &Phase::Editing);
        assert!(page.dispatch(FormAction::SetReference(
            RelationKind::Materials,
            id,
            "mat-3".to_string()
        )));
    }

    #[test]
    fn test_errors_surface_after_blur() {
        let mut page = ArticlePage::create(&create_props(None, None));
        assert!(page.visible_errors().is_empty());

        page.blur("code");
        assert!(page.visible_errors().contains("code"));
        assert!(!page.visible_errors().contains("description"));

        page.dispatch(FormAction::SetText(TextField::Code, "ART-9".to_string()));
        assert!(!page.visible_errors().contains("code"));
    }

    #[test]
    fn test_edit_productivity_falls_back_to_server_value() {
        let mut page = ArticlePage::edit(&edit_props());
        assert_eq!(page.productivity().actual_pieces_per_hour_station, "25.00000");

        page.dispatch(FormAction::SetText(
            TextField::ActualBoxesPerHourPiece,
            String::new(),
        ));
        assert_eq!(page.productivity().actual_pieces_per_hour_station, "18.00000");
    }

    #[test]
    fn test_attachment_link_only_on_edit_with_attachment() {
        let backend = FakeBackend::new();
        let page = ArticlePage::edit(&edit_props());
        assert_eq!(
            page.attachment_link(&backend).as_deref(),
            Some("http://fake/articles/art-1/attachment")
        );

        let create = ArticlePage::create(&create_props(None, Some(crate::test_utils::sample_article())));
        assert_eq!(create.attachment_link(&backend), None);
    }

    #[test]
    fn test_reentrant_submit_is_blocked() {
        let mut page = ArticlePage::create(&create_props(None, None));
        page.begin_submit().unwrap();
        assert!(page.is_submitting());
        assert!(matches!(page.begin_submit(), Err(Error::SubmissionInFlight)));
    }

    #[test]
    fn test_rejection_returns_to_editing_with_merged_errors() {
        let mut page = ArticlePage::create(&create_props(None, None));
        page.begin_submit().unwrap();

        let mut server = ErrorMap::new();
        server.insert("code", "The code has already been taken.");
        server.insert("offer_uuid", "The offer is required.");
        page.finish_submit(Ok(SubmitOutcome::Rejected(server)));

        assert_eq!(page.phase(), &Phase::Editing);
        let errors = page.visible_errors();
        // Submitting touched every field, so the client message wins for `code`.
        assert_eq!(errors.get("code"), Some("This field is required."));
        assert_eq!(errors.get("offer_uuid"), Some("The offer is required."));
    }

    #[test]
    fn test_transport_failure_returns_to_editing() {
        let mut page = ArticlePage::create(&create_props(None, None));
        page.begin_submit().unwrap();
        page.finish_submit(Err(Error::Backend {
            status: 500,
            message: "boom".to_string(),
        }));

        assert_eq!(page.phase(), &Phase::Editing);
        assert!(page.visible_errors().contains(FORM_ERROR_KEY));
        assert!(page.begin_submit().is_ok());
    }

    #[tokio::test]
    async fn test_submit_create_succeeds() -> Result<()> {
        let backend = FakeBackend::new();
        let mut page = ArticlePage::create(&create_props(None, None));
        page.dispatch(FormAction::SetText(TextField::Code, "ART-9".to_string()));
        page.dispatch(FormAction::SetText(TextField::Description, "Box".to_string()));

        let phase = page.submit(&backend).await?.clone();

        assert!(matches!(phase, Phase::Succeeded { .. }));
        let created = backend.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].get("code"), Some("ART-9"));
        assert_eq!(created[0].get("visible"), Some("0"));
        Ok(())
    }

    #[tokio::test]
    async fn test_saved_page_does_not_submit_again() -> Result<()> {
        let backend = FakeBackend::new();
        let mut page = ArticlePage::create(&create_props(None, None));
        page.dispatch(FormAction::SetText(TextField::Code, "ART-9".to_string()));
        page.dispatch(FormAction::SetText(TextField::Description, "Box".to_string()));
        page.submit(&backend).await?;

        assert!(matches!(page.submit(&backend).await, Err(Error::AlreadySaved)));
        assert!(matches!(page.phase(), Phase::Succeeded { .. }));
        assert_eq!(backend.created().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_edit_updates_article() -> Result<()> {
        let backend = FakeBackend::new();
        let mut page = ArticlePage::edit(&edit_props());
        page.dispatch(FormAction::SetFlag(FlagField::Visible, false));

        page.submit(&backend).await?;

        let updated = backend.updated();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].0, "art-1");
        assert_eq!(updated[0].1.get("visible"), Some("0"));
        assert!(updated[0].1.attachment.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_backend_rejection_is_reported() -> Result<()> {
        let backend = FakeBackend::new().rejecting("code", "The code has already been taken.");
        let mut page = ArticlePage::edit(&edit_props());

        let phase = page.submit(&backend).await?.clone();

        assert_eq!(phase, Phase::Editing);
        assert_eq!(
            page.visible_errors().get("code"),
            Some("The code has already been taken.")
        );
        Ok(())
    }
}
