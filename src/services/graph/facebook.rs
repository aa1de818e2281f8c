use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;

use super::{GraphApi, Page, PageLink};

const GRAPH_HOST: &str = "https://graph.facebook.com";

pub struct FacebookGraph {
    app_id: String,
    app_secret: String,
    base_url: String,
    client: reqwest::Client,
}

impl FacebookGraph {
    pub fn new(app_id: String, app_secret: String, api_version: &str) -> Self {
        Self {
            app_id,
            app_secret,
            base_url: format!("{GRAPH_HOST}/{api_version}"),
            client: reqwest::Client::new(),
        }
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> anyhow::Result<Value> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.fetch(self.client.get(&url).query(query), path).await
    }

    /// `label` names the call in errors; URLs are stripped since they carry secrets.
    async fn fetch(&self, request: reqwest::RequestBuilder, label: &str) -> anyhow::Result<Value> {
        let resp = request
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("failed to call Graph API {label}"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| e.without_url())
            .context("failed to read Graph API response")?;

        if !status.is_success() {
            anyhow::bail!("Graph API error ({status}): {body}");
        }

        parse_body(&body)
    }

    async fn token_request(&self, query: &[(&str, &str)]) -> anyhow::Result<String> {
        let data = self.get_json("oauth/access_token", query).await?;
        data["access_token"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing access_token in response: {data}"))
    }
}

fn nested_id(node: &Value, field: &str) -> Option<String> {
    node[field]["id"].as_str().map(|s| s.to_string())
}

/// Max `paging.next` links followed when listing pages.
const MAX_PAGE_REQUESTS: usize = 20;

fn parse_body(body: &str) -> anyhow::Result<Value> {
    serde_json::from_str(body)
        .with_context(|| format!("failed to parse Graph API response: {body}"))
}

fn next_page(data: &Value) -> Option<String> {
    data["paging"]["next"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn parse_pages(data: &Value) -> anyhow::Result<Vec<Page>> {
    let list = data
        .get("data")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("missing data in page list: {data}"))?;
    serde_json::from_value(list).context("failed to parse page list")
}

fn parse_aggregate_accounts(data: &Value) -> Vec<String> {
    data["instagram_business_accounts"]["data"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["id"].as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_nested_pages(data: &Value) -> Vec<PageLink> {
    data["accounts"]["data"]
        .as_array()
        .map(|pages| {
            pages
                .iter()
                .filter_map(|page| {
                    Some(PageLink {
                        page_id: page["id"].as_str()?.to_string(),
                        page_name: page["name"].as_str().map(|s| s.to_string()),
                        business_account_id: nested_id(page, "instagram_business_account"),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl GraphApi for FacebookGraph {
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> anyhow::Result<String> {
        self.token_request(&[
            ("client_id", self.app_id.as_str()),
            ("client_secret", self.app_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("code", code),
        ])
        .await
    }

    async fn exchange_long_lived(&self, short_lived_token: &str) -> anyhow::Result<String> {
        self.token_request(&[
            ("grant_type", "fb_exchange_token"),
            ("client_id", self.app_id.as_str()),
            ("client_secret", self.app_secret.as_str()),
            ("fb_exchange_token", short_lived_token),
        ])
        .await
    }

    async fn list_pages(&self, token: &str) -> anyhow::Result<Vec<Page>> {
        let mut data = self
            .get_json(
                "me/accounts",
                &[
                    ("fields", "id,name,access_token"),
                    ("limit", "100"),
                    ("access_token", token),
                ],
            )
            .await?;
        let mut pages = parse_pages(&data)?;

        for _ in 1..MAX_PAGE_REQUESTS {
            let Some(next) = next_page(&data) else {
                break;
            };
            data = self.fetch(self.client.get(&next), "me/accounts (next)").await?;
            pages.extend(parse_pages(&data)?);
        }
        if next_page(&data).is_some() {
            tracing::warn!(count = pages.len(), "page list truncated");
        }

        Ok(pages)
    }

    async fn page_business_account(
        &self,
        page_id: &str,
        token: &str,
    ) -> anyhow::Result<Option<String>> {
        let data = self
            .get_json(
                page_id,
                &[("fields", "instagram_business_account"), ("access_token", token)],
            )
            .await?;
        Ok(nested_id(&data, "instagram_business_account"))
    }

    async fn user_business_accounts(&self, token: &str) -> anyhow::Result<Vec<String>> {
        let data = self
            .get_json(
                "me",
                &[
                    ("fields", "instagram_business_accounts{id}"),
                    ("access_token", token),
                ],
            )
            .await?;
        Ok(parse_aggregate_accounts(&data))
    }

    async fn nested_page_accounts(&self, token: &str) -> anyhow::Result<Vec<PageLink>> {
        let data = self
            .get_json(
                "me",
                &[
                    ("fields", "accounts{id,name,instagram_business_account{id}}"),
                    ("access_token", token),
                ],
            )
            .await?;
        Ok(parse_nested_pages(&data))
    }

    async fn account_username(
        &self,
        business_account_id: &str,
        token: &str,
    ) -> anyhow::Result<Option<String>> {
        let data = self
            .get_json(
                business_account_id,
                &[("fields", "username,name"), ("access_token", token)],
            )
            .await?;
        Ok(data["username"]
            .as_str()
            .or_else(|| data["name"].as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_pages() {
        let data = json!({
            "data": [
                {"id": "101", "name": "Studio One", "access_token": "EAAP-page"},
                {"id": "102"}
            ],
            "paging": {"cursors": {}}
        });

        let pages = parse_pages(&data).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].name.as_deref(), Some("Studio One"));
        assert_eq!(pages[0].access_token.as_deref(), Some("EAAP-page"));
        assert_eq!(pages[1].id, "102");
        assert_eq!(pages[1].access_token, None);
    }

    #[test]
    fn test_parse_pages_missing_data() {
        assert!(parse_pages(&json!({"error": {"message": "bad"}})).is_err());
    }

    #[test]
    fn test_next_page() {
        let data = json!({
            "data": [],
            "paging": {"next": "https://graph.facebook.com/v19.0/me/accounts?after=QVFI"}
        });
        assert_eq!(
            next_page(&data).as_deref(),
            Some("https://graph.facebook.com/v19.0/me/accounts?after=QVFI")
        );
        assert_eq!(next_page(&json!({"data": [], "paging": {"cursors": {}}})), None);
    }

    #[test]
    fn test_parse_body_error_keeps_body() {
        let err = parse_body("<html>maintenance</html>").unwrap_err();
        let rendered = format!("{err:#}");
        assert!(rendered.contains("failed to parse Graph API response"));
        assert!(rendered.contains("<html>maintenance</html>"));
        assert!(rendered.contains("expected value"));
    }

    #[test]
    fn test_parse_aggregate_accounts() {
        let data = json!({
            "id": "u1",
            "instagram_business_accounts": {"data": [{"id": "1784"}, {"id": "1785"}]}
        });
        assert_eq!(parse_aggregate_accounts(&data), vec!["1784", "1785"]);
        assert!(parse_aggregate_accounts(&json!({"id": "u1"})).is_empty());
    }

    #[test]
    fn test_parse_nested_pages() {
        let data = json!({
            "accounts": {"data": [
                {"id": "101", "name": "No Link"},
                {"id": "102", "name": "Linked", "instagram_business_account": {"id": "1784"}}
            ]}
        });

        let pages = parse_nested_pages(&data);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].business_account_id, None);
        assert_eq!(
            pages[1],
            PageLink {
                page_id: "102".to_string(),
                page_name: Some("Linked".to_string()),
                business_account_id: Some("1784".to_string()),
            }
        );
    }
}
