//! S3 website redirect backend
//!
//! Writes redirects the way S3 static website hosting expects them: a
//! metadata-replacing self-copy of the source object carrying
//! `x-amz-website-redirect-location`. Talks plain HTTP to an S3-compatible
//! endpoint (or a signing gateway in front of one) with optional bearer
//! auth; CDN invalidation is a JSON POST to a configured endpoint.

use crate::config::DEFAULT_BUCKET;
use crate::error::StorageError;
use crate::storage::StorageClient;
use kgh_manifest::DEFAULT_PUBLIC_BASE_URL;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Default storage endpoint
pub const DEFAULT_ENDPOINT: &str = "https://s3.amazonaws.com";

/// Backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3StorageConfig {
    /// S3-compatible endpoint
    pub endpoint: String,
    /// Bucket holding the published objects
    pub bucket: String,
    /// URL prefix under which bucket objects are served
    pub public_base_url: String,
    /// Mark redirect objects world-readable
    pub public_read: bool,
    /// Invalidation endpoint; invalidation is skipped when unset
    pub cdn_endpoint: Option<String>,
}

impl Default for S3StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            public_read: true,
            cdn_endpoint: None,
        }
    }
}

/// `StorageClient` over an S3-compatible HTTP API
#[derive(Debug, Clone)]
pub struct S3WebsiteStorage {
    config: S3StorageConfig,
    bearer_token: Option<String>,
    client: Client,
}

impl S3WebsiteStorage {
    /// Create backend
    #[must_use]
    pub fn new(config: S3StorageConfig) -> Self {
        Self {
            config,
            bearer_token: None,
            client: Client::new(),
        }
    }

    /// With bearer token for the storage and CDN endpoints
    #[must_use]
    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token.filter(|t| !t.is_empty());
        self
    }

    /// Backend configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &S3StorageConfig {
        &self.config
    }

    /// Bucket object key addressed by a public URL or path
    ///
    /// # Errors
    /// `InvalidPath` for absolute URLs outside the public base, or paths
    /// naming no object.
    pub fn object_key(&self, path: &str) -> Result<String, StorageError> {
        let relative = match path.strip_prefix(&self.config.public_base_url) {
            Some(rest) => rest,
            None if is_absolute_url(path) => return Err(StorageError::InvalidPath(path.to_string())),
            None => path,
        };
        let key = relative.trim_start_matches('/');
        if key.is_empty() {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(key.to_string())
    }

    /// Value for `x-amz-website-redirect-location`
    ///
    /// Targets inside the public base become site-relative paths; other
    /// absolute URLs are kept as they are.
    #[must_use]
    pub fn redirect_location(&self, target: &str) -> String {
        if let Some(rest) = target.strip_prefix(&self.config.public_base_url) {
            return format!("/{}", rest.trim_start_matches('/'));
        }
        if is_absolute_url(target) || target.starts_with('/') {
            return target.to_string();
        }
        format!("/{target}")
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.bucket,
            key
        )
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait::async_trait]
impl StorageClient for S3WebsiteStorage {
    async fn put_redirect(&self, source_path: &str, target_path: &str) -> Result<(), StorageError> {
        let key = self.object_key(source_path)?;
        let location = self.redirect_location(target_path);
        tracing::debug!(bucket = %self.config.bucket, %key, %location, "put redirect");

        let mut req = self
            .client
            .put(self.object_url(&key))
            .header("x-amz-copy-source", format!("/{}/{}", self.config.bucket, key))
            .header("x-amz-metadata-directive", "REPLACE")
            .header("x-amz-website-redirect-location", location);
        if self.config.public_read {
            req = req.header("x-amz-acl", "public-read");
        }

        let resp = self.authorize(req).send().await?;
        check_status(resp).await
    }

    async fn invalidate(&self, path: &str) -> Result<(), StorageError> {
        let Some(cdn) = &self.config.cdn_endpoint else {
            tracing::debug!(path, "no CDN endpoint configured, skipping invalidation");
            return Ok(());
        };
        let key = self.object_key(path)?;
        let body = serde_json::json!({ "paths": [format!("/{key}")] });

        let resp = self.authorize(self.client.post(cdn).json(&body)).send().await?;
        check_status(resp).await
    }
}

fn is_absolute_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

async fn check_status(resp: reqwest::Response) -> Result<(), StorageError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(StorageError::Rejected {
        status: status.as_u16(),
        body,
    })
}
