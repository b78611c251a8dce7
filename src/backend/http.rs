//! HTTP backend client built on `reqwest`.
//!
//! Reads go out as JSON GETs; creates and updates as multipart bodies so a newly
//! chosen attachment can ride along. Redirects are not followed: a `Location`
//! header on a submit is the page the user navigates to next.

use super::{ArticleBackend, SubmitOutcome, routes};
use crate::{
    config::BackendConfig,
    core::{
        listing::Filters,
        serialize::{ATTACHMENT_FIELD, FormBody},
        validation::ErrorMap,
    },
    entities::{ArticleSummary, CreatePageProps, EditPageProps, Paginated},
    errors::{Error, Result},
};
use reqwest::{
    Client, RequestBuilder, Response, StatusCode, Url,
    header::{ACCEPT, LOCATION},
    multipart::{Form, Part},
    redirect::Policy,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Form field carrying the real verb of an update. Multipart bodies are sent as
/// `POST` because form backends do not parse them on `PUT`.
const METHOD_OVERRIDE_FIELD: &str = "_method";

/// Body of a 422 answer
#[derive(Debug, Deserialize)]
struct ValidationFailure {
    #[serde(default)]
    errors: ErrorMap,
}

/// Optional JSON body of a successful submit
#[derive(Debug, Deserialize)]
struct SavedBody {
    redirect: Option<String>,
}

/// Article backend reached over HTTP
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Builds a client for `config.base_url`.
    ///
    /// # Errors
    /// Returns an error if the base URL does not parse or the client can't be built.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        Url::parse(&config.base_url).map_err(|e| Error::Config {
            message: format!("Invalid backend URL `{}`: {e}", config.base_url),
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .redirect(Policy::none())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        missing: impl FnOnce() -> Error,
    ) -> Result<T> {
        let response = self
            .client
            .get(self.url(path))
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(missing()),
            status if status.is_success() => Ok(response.json().await?),
            status => Err(backend_error(status, response).await),
        }
    }

    async fn send_submit(&self, request: RequestBuilder, body: &FormBody) -> Result<SubmitOutcome> {
        let response = request
            .header(ACCEPT, "application/json")
            .multipart(multipart(body)?)
            .send()
            .await?;
        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().await?;
        interpret_submit(status, location.as_deref(), &text)
    }
}

async fn backend_error(status: StatusCode, response: Response) -> Error {
    let message = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), "backend error: {}", message);
    Error::Backend {
        status: status.as_u16(),
        message,
    }
}

/// Builds the multipart form of a request body.
fn multipart(body: &FormBody) -> Result<Form> {
    let mut form = body
        .fields
        .iter()
        .fold(Form::new(), |form, (key, value)| {
            form.text(key.clone(), value.clone())
        });
    if let Some(attachment) = &body.attachment {
        let mut part = Part::bytes(attachment.bytes.clone()).file_name(attachment.file_name.clone());
        if let Some(mime) = &attachment.mime {
            part = part.mime_str(mime)?;
        }
        form = form.part(ATTACHMENT_FIELD, part);
    }
    Ok(form)
}

fn with_method_override(body: &FormBody, method: &str) -> FormBody {
    let mut body = body.clone();
    body.fields.push((METHOD_OVERRIDE_FIELD.to_string(), method.to_string()));
    body
}

/// Maps a submit response to its outcome: success or redirect saves, 422 carries
/// field errors, anything else is a backend failure.
fn interpret_submit(status: StatusCode, location: Option<&str>, text: &str) -> Result<SubmitOutcome> {
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        let failure: ValidationFailure = serde_json::from_str(text)?;
        return Ok(SubmitOutcome::Rejected(failure.errors));
    }
    if status.is_success() || status.is_redirection() {
        let redirect = location
            .map(str::to_string)
            .or_else(|| {
                serde_json::from_str::<SavedBody>(text)
                    .ok()
                    .and_then(|b| b.redirect)
            })
            .unwrap_or_else(routes::articles);
        return Ok(SubmitOutcome::Saved { redirect });
    }
    Err(Error::Backend {
        status: status.as_u16(),
        message: text.to_string(),
    })
}

impl ArticleBackend for HttpBackend {
    #[instrument(skip(self), fields(query = %filters.to_query_string()))]
    async fn list_articles(&self, filters: &Filters) -> Result<Paginated<ArticleSummary>> {
        let page: Paginated<ArticleSummary> = self
            .get_json(&routes::articles(), &filters.to_query(), || Error::Backend {
                status: 404,
                message: "article index not found".to_string(),
            })
            .await?;
        debug!(rows = page.data.len(), total = page.total, "fetched article page");
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn create_page(
        &self,
        offer_uuid: Option<&str>,
        source_uuid: Option<&str>,
    ) -> Result<CreatePageProps> {
        let mut query = Vec::new();
        if let Some(offer) = offer_uuid {
            query.push(("offer", offer.to_string()));
        }
        if let Some(source) = source_uuid {
            query.push(("source", source.to_string()));
        }
        self.get_json(&routes::create_article(), &query, || Error::ArticleNotFound {
            uuid: source_uuid.unwrap_or_default().to_string(),
        })
        .await
    }

    #[instrument(skip(self))]
    async fn edit_page(&self, article_uuid: &str) -> Result<EditPageProps> {
        self.get_json(&routes::edit_article(article_uuid), &[], || {
            Error::ArticleNotFound {
                uuid: article_uuid.to_string(),
            }
        })
        .await
    }

    #[instrument(skip(self, body), fields(fields = body.fields.len()))]
    async fn create_article(&self, body: &FormBody) -> Result<SubmitOutcome> {
        info!("creating article");
        let request = self.client.post(self.url(&routes::articles()));
        self.send_submit(request, body).await
    }

    #[instrument(skip(self, body), fields(fields = body.fields.len()))]
    async fn update_article(&self, article_uuid: &str, body: &FormBody) -> Result<SubmitOutcome> {
        info!("updating article");
        let request = self.client.post(self.url(&routes::article(article_uuid)));
        self.send_submit(request, &with_method_override(body, "PUT")).await
    }

    #[instrument(skip(self))]
    async fn delete_article(&self, article_uuid: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&routes::article(article_uuid)))
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::ArticleNotFound {
                uuid: article_uuid.to_string(),
            }),
            status if status.is_success() || status.is_redirection() => {
                info!("article deleted");
                Ok(())
            }
            status => Err(backend_error(status, response).await),
        }
    }

    fn attachment_url(&self, article_uuid: &str) -> String {
        self.url(&routes::attachment(article_uuid))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn backend(base_url: &str) -> HttpBackend {
        HttpBackend::new(&BackendConfig {
            base_url: base_url.to_string(),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_urls_join_without_double_slashes() {
        let backend = backend("https://erp.example.com/app/");
        assert_eq!(
            backend.attachment_url("art-1"),
            "https://erp.example.com/app/articles/art-1/attachment"
        );
        assert_eq!(backend.url(&routes::articles()), "https://erp.example.com/app/articles");
    }

    #[test]
    fn test_invalid_base_url_is_a_config_error() {
        let result = HttpBackend::new(&BackendConfig {
            base_url: "not a url".to_string(),
            timeout_seconds: 5,
        });
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_redirect_location_wins() {
        let outcome = interpret_submit(StatusCode::FOUND, Some("/articles/art-9"), "").unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Saved {
                redirect: "/articles/art-9".to_string()
            }
        );
    }

    #[test]
    fn test_json_redirect_and_default() {
        let outcome =
            interpret_submit(StatusCode::CREATED, None, r#"{"redirect": "/articles/x"}"#).unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Saved {
                redirect: "/articles/x".to_string()
            }
        );

        let outcome = interpret_submit(StatusCode::NO_CONTENT, None, "").unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Saved {
                redirect: "/articles".to_string()
            }
        );
    }

    #[test]
    fn test_unprocessable_entity_carries_field_errors() {
        let body = r#"{"message": "Invalid data.", "errors": {"code": ["The code has already been taken."]}}"#;
        let SubmitOutcome::Rejected(errors) =
            interpret_submit(StatusCode::UNPROCESSABLE_ENTITY, None, body).unwrap()
        else {
            panic!("expected a rejection");
        };
        assert_eq!(errors.get("code"), Some("The code has already been taken."));
    }

    #[test]
    fn test_server_errors_are_backend_failures() {
        let result = interpret_submit(StatusCode::INTERNAL_SERVER_ERROR, None, "oops");
        assert!(matches!(result, Err(Error::Backend { status: 500, .. })));
    }

    #[test]
    fn test_update_body_carries_method_override() {
        let body = FormBody {
            fields: vec![("code".to_string(), "A".to_string())],
            attachment: None,
        };
        let body = with_method_override(&body, "PUT");
        assert_eq!(body.get("code"), Some("A"));
        assert_eq!(body.get("_method"), Some("PUT"));
    }

    #[test]
    fn test_multipart_accepts_attachment_mime() {
        let body = FormBody {
            fields: vec![("code".to_string(), "A".to_string())],
            attachment: Some(crate::core::serialize::Attachment {
                file_name: "datasheet.pdf".to_string(),
                mime: Some("application/pdf".to_string()),
                bytes: vec![0x25, 0x50],
            }),
        };
        assert!(multipart(&body).is_ok());
    }
}
