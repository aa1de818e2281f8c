use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Accounts document: business-account id to record.
pub type Accounts = BTreeMap<String, AccountRecord>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub access_token: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_name: Option<String>,
    #[serde(default)]
    pub buckets: Vec<serde_json::Value>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Page that yielded a linked business account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AccountRecord {
    pub fn page_info(&self) -> Option<PageInfo> {
        self.page_id.as_ref().map(|id| PageInfo {
            id: id.clone(),
            name: self.page_name.clone(),
        })
    }
}
