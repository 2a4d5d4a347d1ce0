// src/repositories/supabase_gateway.rs
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde_json::{json, Value};
use urlencoding::encode;

use crate::config::Settings;
use crate::repositories::gateway::{DataGateway, Filter, GatewayError, Select};

/// `DataGateway` backed by a Supabase project: PostgREST for tables and the
/// storage API for photos. Requests use the service role key, so this must
/// only ever run server-side.
#[derive(Clone)]
pub struct SupabaseGateway {
    client: Client,
    base_url: String,         // e.g. https://xyz.supabase.co
    service_role_key: String, // SUPABASE_SERVICE_ROLE_KEY
    anon_key: Option<String>,
}

impl SupabaseGateway {
    pub fn new(settings: &Settings) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .user_agent("keluhan-be/0.1")
            .timeout(settings.http_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: settings.supabase_url.trim_end_matches('/').to_string(),
            service_role_key: settings.service_role_key.clone(),
            anon_key: settings.anon_key.clone(),
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, encode_path(path))
    }

    fn headers(&self) -> Result<HeaderMap, GatewayError> {
        let mut headers = HeaderMap::new();
        // apikey must be present; fall back to the service key when no anon key is configured
        let apikey = self.anon_key.as_deref().unwrap_or(&self.service_role_key);
        headers.insert("apikey", header_value(apikey)?);
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", self.service_role_key))?,
        );
        Ok(headers)
    }

    fn filter_pairs(filters: &[Filter]) -> Vec<(String, String)> {
        filters.iter().map(Filter::to_query_pair).collect()
    }

    async fn read_rows(resp: Response) -> Result<Vec<Value>, GatewayError> {
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(GatewayError::from_response(status.as_u16(), &text));
        }
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn expect_success(resp: Response) -> Result<(), GatewayError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let text = resp.text().await.unwrap_or_default();
        Err(GatewayError::from_response(status.as_u16(), &text))
    }
}

fn header_value(raw: &str) -> Result<HeaderValue, GatewayError> {
    HeaderValue::from_str(raw).map_err(|e| GatewayError::Other(format!("invalid header value: {}", e)))
}

/// Percent-encode each segment of an object path, keeping the separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|seg| encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl DataGateway for SupabaseGateway {
    async fn select(&self, table: &str, query: &Select) -> Result<Vec<Value>, GatewayError> {
        let url = self.rest_url(table);
        let pairs = query.to_query_pairs();
        debug!("GET {} {:?}", url, pairs);

        let resp = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .query(&pairs)
            .send()
            .await?;

        Self::read_rows(resp).await
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, GatewayError> {
        let url = self.rest_url(table);
        debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;

        Self::read_rows(resp)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Other(format!("empty response from insert into {}", table)))
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, GatewayError> {
        let url = self.rest_url(table);
        let pairs = Self::filter_pairs(filters);
        debug!("PATCH {} {:?}", url, pairs);

        let resp = self
            .client
            .patch(&url)
            .headers(self.headers()?)
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=representation")
            .query(&pairs)
            .json(&patch)
            .send()
            .await?;

        Self::read_rows(resp).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, GatewayError> {
        // PostgREST refuses unfiltered deletes only when configured to; never send one
        if filters.is_empty() {
            return Err(GatewayError::Other(format!("refusing unfiltered delete on {}", table)));
        }

        let url = self.rest_url(table);
        let pairs = Self::filter_pairs(filters);
        debug!("DELETE {} {:?}", url, pairs);

        let resp = self
            .client
            .delete(&url)
            .headers(self.headers()?)
            .header("Prefer", "return=representation")
            .query(&pairs)
            .send()
            .await?;

        Self::read_rows(resp).await
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), GatewayError> {
        let url = self.object_url(bucket, path);
        debug!("UPLOAD {} ({} bytes, {})", url, bytes.len(), content_type);

        let resp = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .header(CONTENT_TYPE, content_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        Self::expect_success(resp).await
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), GatewayError> {
        if paths.is_empty() {
            return Ok(());
        }

        let url = format!("{}/storage/v1/object/{}", self.base_url, bucket);
        debug!("REMOVE {} {:?}", url, paths);

        let resp = self
            .client
            .delete(&url)
            .headers(self.headers()?)
            .header(CONTENT_TYPE, "application/json")
            .json(&json!({ "prefixes": paths }))
            .send()
            .await?;

        Self::expect_success(resp).await
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket,
            encode_path(path)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings() -> Settings {
        Settings {
            supabase_url: "https://demo.supabase.co/".to_string(),
            service_role_key: "service-role-key-value".to_string(),
            anon_key: None,
            photo_bucket: "gambarkeluhan".to_string(),
            session_secret: "secret".to_string(),
            session_ttl: chrono::Duration::hours(1),
            http_timeout: Duration::from_secs(5),
            port: 8080,
            allowed_origins: vec![],
        }
    }

    #[test]
    fn public_url_follows_bucket_scheme() {
        let gw = SupabaseGateway::new(&settings()).unwrap();
        assert_eq!(
            gw.public_url("gambarkeluhan", "keluhan/17-abc.png"),
            "https://demo.supabase.co/storage/v1/object/public/gambarkeluhan/keluhan/17-abc.png"
        );
        assert_eq!(gw.rest_url("keluhan"), "https://demo.supabase.co/rest/v1/keluhan");
    }

    #[test]
    fn object_paths_are_percent_encoded_per_segment() {
        assert_eq!(encode_path("keluhan/foto saya.jpg"), "keluhan/foto%20saya.jpg");
    }

    #[test]
    fn headers_fall_back_to_service_key() {
        let gw = SupabaseGateway::new(&settings()).unwrap();
        let headers = gw.headers().unwrap();
        assert_eq!(headers.get("apikey").unwrap(), "service-role-key-value");
        assert_eq!(
            headers.get(AUTHORIZATION).unwrap(),
            "Bearer service-role-key-value"
        );
    }
}
