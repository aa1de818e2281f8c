//! Authorization-code flow for linking a business account.
//!
//! 1. code → short-lived user token
//! 2. short-lived → long-lived token
//! 3. long-lived token → linked business account id (ordered lookup strategies)
//! 4. display name (best effort)
//! 5. upsert into the accounts document

use chrono::Utc;

use crate::models::{AccountRecord, Accounts};
use crate::services::graph::GraphApi;
use crate::store::JsonStore;

/// Permissions requested on the consent screen.
pub const SCOPES: &[&str] = &[
    "instagram_basic",
    "instagram_content_publish",
    "pages_show_list",
    "pages_read_engagement",
    "business_management",
];

#[derive(Debug, thiserror::Error)]
pub enum AuthFlowError {
    #[error("authorization code exchange failed: {0}")]
    CodeExchange(String),

    #[error("long-lived token exchange failed: {0}")]
    LongLivedExchange(String),

    #[error("no linked business account found")]
    NoLinkedAccount,
}

/// Business account found by a lookup strategy, with the page it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedAccount {
    pub business_account_id: String,
    pub page_id: Option<String>,
    pub page_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedAccount {
    pub id: String,
    pub username: String,
    pub page_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    /// Each managed page, read with the user token then the page token.
    PageLookup,
    /// User-level aggregate field listing linked accounts.
    UserAggregate,
    /// Linked field nested inside the user's page list.
    NestedPages,
}

impl LookupStrategy {
    pub const ORDER: [LookupStrategy; 3] = [
        LookupStrategy::PageLookup,
        LookupStrategy::UserAggregate,
        LookupStrategy::NestedPages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LookupStrategy::PageLookup => "page_lookup",
            LookupStrategy::UserAggregate => "user_aggregate",
            LookupStrategy::NestedPages => "nested_pages",
        }
    }

    /// Errors from individual calls are logged and treated as "not found".
    pub async fn attempt(&self, graph: &dyn GraphApi, token: &str) -> Option<LinkedAccount> {
        match self {
            LookupStrategy::PageLookup => page_lookup(graph, token).await,
            LookupStrategy::UserAggregate => match graph.user_business_accounts(token).await {
                Ok(ids) => ids.into_iter().next().map(|id| LinkedAccount {
                    business_account_id: id,
                    page_id: None,
                    page_name: None,
                }),
                Err(e) => {
                    tracing::warn!(strategy = self.as_str(), error = %format!("{e:#}"), "lookup failed");
                    None
                }
            },
            LookupStrategy::NestedPages => match graph.nested_page_accounts(token).await {
                Ok(pages) => pages.into_iter().find_map(|page| {
                    Some(LinkedAccount {
                        business_account_id: page.business_account_id?,
                        page_id: Some(page.page_id),
                        page_name: page.page_name,
                    })
                }),
                Err(e) => {
                    tracing::warn!(strategy = self.as_str(), error = %format!("{e:#}"), "lookup failed");
                    None
                }
            },
        }
    }
}

async fn page_lookup(graph: &dyn GraphApi, token: &str) -> Option<LinkedAccount> {
    let pages = match graph.list_pages(token).await {
        Ok(pages) => pages,
        Err(e) => {
            tracing::warn!(strategy = "page_lookup", error = %format!("{e:#}"), "failed to list pages");
            return None;
        }
    };
    tracing::debug!(count = pages.len(), "listed pages");

    for page in pages {
        let tokens = std::iter::once(token).chain(page.access_token.as_deref());
        for candidate in tokens {
            match graph.page_business_account(&page.id, candidate).await {
                Ok(Some(id)) => {
                    return Some(LinkedAccount {
                        business_account_id: id,
                        page_id: Some(page.id),
                        page_name: page.name,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(page_id = %page.id, error = %format!("{e:#}"), "page lookup failed");
                }
            }
        }
    }
    None
}

/// Runs the strategies in order and stops at the first hit.
pub async fn resolve_linked_account(graph: &dyn GraphApi, token: &str) -> Option<LinkedAccount> {
    for strategy in LookupStrategy::ORDER {
        if let Some(found) = strategy.attempt(graph, token).await {
            tracing::info!(
                strategy = strategy.as_str(),
                business_account_id = %found.business_account_id,
                "resolved linked business account"
            );
            return Some(found);
        }
        tracing::debug!(strategy = strategy.as_str(), "strategy found nothing");
    }
    None
}

pub fn placeholder_name(business_account_id: &str) -> String {
    format!("ig_{business_account_id}")
}

pub fn consent_url(app_id: &str, redirect_uri: &str, api_version: &str) -> String {
    format!(
        "https://www.facebook.com/{}/dialog/oauth?client_id={}&redirect_uri={}&scope={}&response_type=code",
        api_version,
        urlencoding::encode(app_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&SCOPES.join(",")),
    )
}

/// Inserts or refreshes a record. Buckets already stored for the id are kept.
pub fn upsert_account(
    accounts: &mut Accounts,
    linked: &LinkedAccount,
    access_token: String,
    username: String,
) {
    let buckets = accounts
        .get(&linked.business_account_id)
        .map(|existing| existing.buckets.clone())
        .unwrap_or_default();

    accounts.insert(
        linked.business_account_id.clone(),
        AccountRecord {
            access_token,
            username,
            page_id: linked.page_id.clone(),
            page_name: linked.page_name.clone(),
            buckets,
            updated_at: Utc::now(),
        },
    );
}

/// Full callback flow. Nothing is written unless steps 1-3 succeed.
pub async fn complete_authorization(
    graph: &dyn GraphApi,
    store: &JsonStore,
    code: &str,
    redirect_uri: &str,
) -> Result<ConnectedAccount, AuthFlowError> {
    let short_lived = graph
        .exchange_code(code, redirect_uri)
        .await
        .map_err(|e| AuthFlowError::CodeExchange(format!("{e:#}")))?;
    tracing::debug!("exchanged authorization code");

    let long_lived = graph
        .exchange_long_lived(&short_lived)
        .await
        .map_err(|e| AuthFlowError::LongLivedExchange(format!("{e:#}")))?;
    tracing::debug!("obtained long-lived token");

    let linked = resolve_linked_account(graph, &long_lived)
        .await
        .ok_or(AuthFlowError::NoLinkedAccount)?;
    let id = linked.business_account_id.clone();

    let username = match graph.account_username(&id, &long_lived).await {
        Ok(Some(name)) => name,
        Ok(None) => placeholder_name(&id),
        Err(e) => {
            tracing::warn!(business_account_id = %id, error = %format!("{e:#}"), "failed to fetch username");
            placeholder_name(&id)
        }
    };

    let mut accounts = store.load_accounts();
    upsert_account(&mut accounts, &linked, long_lived, username.clone());
    store.save_accounts(&accounts);

    tracing::info!(business_account_id = %id, username = %username, "account connected");

    Ok(ConnectedAccount {
        id,
        username,
        page_name: linked.page_name,
    })
}
