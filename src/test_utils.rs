//! Shared test utilities.
//!
//! Catalog and article fixtures with known contents, page configurations built
//! from them, and an in-memory `FakeBackend` that records every write.

#![allow(clippy::unwrap_used)]

use crate::{
    backend::{ArticleBackend, SubmitOutcome, routes},
    core::{
        listing::Filters,
        page::{Mode, PageConfig},
        serialize::FormBody,
        validation::ErrorMap,
    },
    entities::{
        Approval, Article, ArticleSummary, Catalogs, CreatePageProps, EditPageProps, ListOption,
        LookupEntry, Machinery, MachineryRef, MediaValues, Offer, Paginated, RelationRef,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use std::sync::Mutex;

fn lookup(uuid: &str, name: &str) -> LookupEntry {
    LookupEntry {
        uuid: uuid.to_string(),
        code: None,
        name: name.to_string(),
    }
}

/// Catalogs used across tests.
///
/// # Contents
/// * offer `offer-1`: unit of measure `kg`, 10 pieces per package
/// * machinery `mach-color`: enumerated `rosso,verde,blu`
/// * machinery `mach-speed`: numeric
/// * materials `mat-1`, `mat-2`
pub fn sample_catalogs() -> Catalogs {
    Catalogs {
        offers: vec![Offer {
            uuid: "offer-1".to_string(),
            code: "OF-1".to_string(),
            description: Some("Tray offer".to_string()),
            unit_of_measure: Some("kg".to_string()),
            pieces_per_package: Some(10.0),
        }],
        categories: vec![lookup("cat-1", "Trays")],
        machinery: vec![
            Machinery {
                uuid: "mach-color".to_string(),
                name: "Color".to_string(),
                value_type: Some("rosso,verde,blu".to_string()),
            },
            Machinery {
                uuid: "mach-speed".to_string(),
                name: "Speed".to_string(),
                value_type: Some("numero".to_string()),
            },
        ],
        materials: vec![lookup("mat-1", "Film"), lookup("mat-2", "Carton")],
        critical_issues: vec![lookup("ci-1", "Sharp edges")],
        lot_attributions: vec![ListOption {
            key: "daily".to_string(),
            label: "Daily".to_string(),
        }],
        ..Catalogs::default()
    }
}

/// An existing article, `art-1`, belonging to `offer-1`.
///
/// # Defaults
/// * production approval granted on 2024-03-01
/// * attachment `datasheet.pdf`
/// * machinery `mach-color = 0`, `mach-speed = 12`
/// * materials `mat-1`, `mat-2`
/// * 2.5 actual boxes/hour/piece, 10 pieces per package
pub fn sample_article() -> Article {
    Article {
        uuid: "art-1".to_string(),
        code: "ART-001".to_string(),
        description: "Tray 30x20".to_string(),
        offer_uuid: Some("offer-1".to_string()),
        unit_of_measure: Some("kg".to_string()),
        pieces_per_package: Some("10".to_string()),
        actual_boxes_per_hour_piece: Some("2.5".to_string()),
        visible: true,
        production_approval: Approval {
            approved: true,
            employee: Some("Rossi".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 3, 1),
            notes: None,
        },
        attachment: Some("datasheet.pdf".to_string()),
        machinery: vec![
            MachineryRef {
                machinery_uuid: "mach-color".to_string(),
                value: Some("0".to_string()),
            },
            MachineryRef {
                machinery_uuid: "mach-speed".to_string(),
                value: Some("12".to_string()),
            },
        ],
        materials: vec![
            RelationRef {
                uuid: "mat-1".to_string(),
            },
            RelationRef {
                uuid: "mat-2".to_string(),
            },
        ],
        ..Article::default()
    }
}

/// Create-page configuration over the sample catalogs.
pub fn create_config(offer: Option<Offer>) -> PageConfig {
    PageConfig::new(
        Mode::Create,
        sample_catalogs(),
        offer,
        MediaValues::default(),
        None,
    )
}

/// Edit-page configuration for `sample_article`.
pub fn edit_config() -> PageConfig {
    PageConfig::for_edit(&edit_props())
}

pub fn create_props(offer: Option<Offer>, source_article: Option<Article>) -> CreatePageProps {
    CreatePageProps {
        catalogs: sample_catalogs(),
        offer,
        source_article,
        media_values: MediaValues {
            expected_boxes_per_hour_piece: Some(3.0),
            expected_pieces_per_hour_station: Some(30.0),
        },
    }
}

/// Edit props for `sample_article`; the server's actual figure is 18.
pub fn edit_props() -> EditPageProps {
    EditPageProps {
        article: sample_article(),
        catalogs: sample_catalogs(),
        media_values: MediaValues::default(),
        actual_pieces_per_hour_station: Some(18.0),
    }
}

/// List row whose uuid is `uuid-{code}`.
pub fn summary(code: &str) -> ArticleSummary {
    ArticleSummary {
        uuid: format!("uuid-{code}"),
        code: code.to_string(),
        description: format!("{code} description"),
        visible: true,
        ..ArticleSummary::default()
    }
}

/// In-memory backend that records writes.
#[derive(Debug, Default)]
pub struct FakeBackend {
    articles: Mutex<Vec<ArticleSummary>>,
    rejection: Option<ErrorMap>,
    created: Mutex<Vec<FormBody>>,
    updated: Mutex<Vec<(String, FormBody)>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the index with one row per code.
    pub fn with_articles(self, codes: &[&str]) -> Self {
        *self.articles.lock().unwrap() = codes.iter().map(|c| summary(c)).collect();
        self
    }

    /// Makes every create and update come back rejected with `message` on `field`.
    pub fn rejecting(mut self, field: &str, message: &str) -> Self {
        let mut errors = ErrorMap::new();
        errors.insert(field, message);
        self.rejection = Some(errors);
        self
    }

    pub fn created(&self) -> Vec<FormBody> {
        self.created.lock().unwrap().clone()
    }

    pub fn updated(&self) -> Vec<(String, FormBody)> {
        self.updated.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    fn outcome(&self, redirect: String) -> SubmitOutcome {
        self.rejection
            .clone()
            .map_or(SubmitOutcome::Saved { redirect }, SubmitOutcome::Rejected)
    }
}

impl ArticleBackend for FakeBackend {
    async fn list_articles(&self, filters: &Filters) -> Result<Paginated<ArticleSummary>> {
        let data: Vec<ArticleSummary> = self
            .articles
            .lock()
            .unwrap()
            .iter()
            .filter(|a| {
                filters
                    .search
                    .as_deref()
                    .is_none_or(|term| a.code.contains(term))
            })
            .cloned()
            .collect();
        Ok(Paginated {
            total: data.len() as u64,
            per_page: filters.per_page.unwrap_or(20),
            data,
            ..Paginated::default()
        })
    }

    async fn create_page(
        &self,
        offer_uuid: Option<&str>,
        source_uuid: Option<&str>,
    ) -> Result<CreatePageProps> {
        let source = match source_uuid {
            Some("art-1") => Some(sample_article()),
            Some(uuid) => {
                return Err(Error::ArticleNotFound {
                    uuid: uuid.to_string(),
                });
            }
            None => None,
        };
        let offer = offer_uuid.and_then(|uuid| sample_catalogs().offer(uuid).cloned());
        Ok(create_props(offer, source))
    }

    async fn edit_page(&self, article_uuid: &str) -> Result<EditPageProps> {
        if article_uuid == "art-1" {
            Ok(edit_props())
        } else {
            Err(Error::ArticleNotFound {
                uuid: article_uuid.to_string(),
            })
        }
    }

    async fn create_article(&self, body: &FormBody) -> Result<SubmitOutcome> {
        self.created.lock().unwrap().push(body.clone());
        Ok(self.outcome(routes::article("art-new")))
    }

    async fn update_article(&self, article_uuid: &str, body: &FormBody) -> Result<SubmitOutcome> {
        self.updated
            .lock()
            .unwrap()
            .push((article_uuid.to_string(), body.clone()));
        Ok(self.outcome(routes::article(article_uuid)))
    }

    async fn delete_article(&self, article_uuid: &str) -> Result<()> {
        let mut articles = self.articles.lock().unwrap();
        let before = articles.len();
        articles.retain(|a| a.uuid != article_uuid);
        if articles.len() == before {
            return Err(Error::ArticleNotFound {
                uuid: article_uuid.to_string(),
            });
        }
        self.deleted.lock().unwrap().push(article_uuid.to_string());
        Ok(())
    }

    fn attachment_url(&self, article_uuid: &str) -> String {
        format!("http://fake{}", routes::attachment(article_uuid))
    }
}
