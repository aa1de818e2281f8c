pub mod facebook;

use async_trait::async_trait;
use serde::Deserialize;

/// A page (property) the user manages.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Page access token; some page nodes only expose the linked account under it.
    #[serde(default)]
    pub access_token: Option<String>,
}

/// A page together with the business account nested under it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub page_id: String,
    pub page_name: Option<String>,
    pub business_account_id: Option<String>,
}

/// Calls made against the provider's Graph API during the OAuth flow.
#[async_trait]
pub trait GraphApi: Send + Sync {
    /// Authorization code to short-lived user token.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> anyhow::Result<String>;

    /// Short-lived user token to long-lived user token.
    async fn exchange_long_lived(&self, short_lived_token: &str) -> anyhow::Result<String>;

    async fn list_pages(&self, token: &str) -> anyhow::Result<Vec<Page>>;

    /// Linked business account id of one page, read with `token`.
    async fn page_business_account(
        &self,
        page_id: &str,
        token: &str,
    ) -> anyhow::Result<Option<String>>;

    /// User-level aggregate listing of linked business accounts.
    async fn user_business_accounts(&self, token: &str) -> anyhow::Result<Vec<String>>;

    /// User node with the linked account nested inside the page list.
    async fn nested_page_accounts(&self, token: &str) -> anyhow::Result<Vec<PageLink>>;

    async fn account_username(
        &self,
        business_account_id: &str,
        token: &str,
    ) -> anyhow::Result<Option<String>>;
}
