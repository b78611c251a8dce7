//! Resource paths shared by the HTTP client and the list's action menu.

#[must_use]
pub fn articles() -> String {
    "/articles".to_string()
}

#[must_use]
pub fn article(uuid: &str) -> String {
    format!("/articles/{uuid}")
}

#[must_use]
pub fn edit_article(uuid: &str) -> String {
    format!("/articles/{uuid}/edit")
}

#[must_use]
pub fn create_article() -> String {
    "/articles/create".to_string()
}

#[must_use]
pub fn duplicate_article(uuid: &str) -> String {
    format!("/articles/create?source={uuid}")
}

#[must_use]
pub fn attachment(uuid: &str) -> String {
    format!("/articles/{uuid}/attachment")
}

#[must_use]
pub fn offer(uuid: &str) -> String {
    format!("/offers/{uuid}")
}

#[must_use]
pub fn create_order(article_uuid: &str) -> String {
    format!("/orders/create?article={article_uuid}")
}
