//! Supabase client: GoTrue for token verification, PostgREST for rows.
//!
//! Endpoints used:
//!   GET    {url}/auth/v1/user           — resolve a user access token
//!   POST   {url}/rest/v1/{table}        — insert a row
//!   GET    {url}/rest/v1/{queries}      — list a user's history
//!   DELETE {url}/rest/v1/{queries}      — delete one of a user's rows

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;
use tracing::instrument;

use crate::error::{Result, StoreError};
use crate::identity::IdentityProvider;
use crate::records::StoredQuery;
use crate::store::RecordStore;

pub struct SupabaseClient {
    pub base_url: String,
    pub queries_table: String,
    anon_key: SecretString,
    service_role_key: SecretString,
    client: reqwest::Client,
}

impl SupabaseClient {
    /// Every request is bounded, so a hung auth or REST call cannot pin a
    /// background write or a history request forever.
    pub fn new(
        base_url: impl Into<String>,
        anon_key: SecretString,
        service_role_key: SecretString,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            queries_table: crate::records::TABLE_QUERIES.to_string(),
            anon_key,
            service_role_key,
            client,
        })
    }

    pub fn with_queries_table(mut self, table: impl Into<String>) -> Self {
        self.queries_table = table.into();
        self
    }

    /// Row operations run with the service role; ownership is enforced by the filters.
    fn service(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let key = self.service_role_key.expose_secret();
        req.header("apikey", key).bearer_auth(key)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

async fn check_response_status(resp: reqwest::Response) -> Result<String> {
    let status = resp.status().as_u16();
    let body = resp.text().await?;
    if status >= 400 {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|json| {
                json["message"]
                    .as_str()
                    .or_else(|| json["msg"].as_str())
                    .or_else(|| json["error_description"].as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.trim().to_string());
        return Err(StoreError::Api { status, message });
    }
    Ok(body)
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    #[instrument(skip_all)]
    async fn verify_token(&self, token: &str) -> Result<String> {
        let resp = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(token)
            .send()
            .await?;

        if matches!(resp.status().as_u16(), 401 | 403) {
            return Err(StoreError::Unauthorized);
        }
        let body = check_response_status(resp).await?;
        let user: Value = serde_json::from_str(&body)?;
        user["id"]
            .as_str()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or(StoreError::Unauthorized)
    }
}

#[async_trait]
impl RecordStore for SupabaseClient {
    #[instrument(skip(self, row))]
    async fn insert(&self, table: &str, row: Value) -> Result<()> {
        let resp = self
            .service(self.client.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;
        check_response_status(resp).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_queries(&self, user_id: &str, limit: usize) -> Result<Vec<StoredQuery>> {
        let params = [
            ("select", "*".to_string()),
            ("user_id", format!("eq.{user_id}")),
            ("order", "created_at.desc".to_string()),
            ("limit", limit.to_string()),
        ];
        let resp = self
            .service(self.client.get(self.table_url(&self.queries_table)))
            .query(&params)
            .send()
            .await?;
        let body = check_response_status(resp).await?;
        Ok(serde_json::from_str(&body)?)
    }

    #[instrument(skip(self))]
    async fn delete_query(&self, user_id: &str, id: &str) -> Result<bool> {
        let params = [("id", format!("eq.{id}")), ("user_id", format!("eq.{user_id}"))];
        let resp = self
            .service(self.client.delete(self.table_url(&self.queries_table)))
            .query(&params)
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let body = check_response_status(resp).await?;
        let deleted: Vec<Value> = serde_json::from_str(&body)?;
        Ok(!deleted.is_empty())
    }
}
