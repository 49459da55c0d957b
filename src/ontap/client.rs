//! Filer management REST client
//!
//! Implements [`VolumePager`] over `GET /api/storage/volumes`, following
//! `_links.next` until the filer reports no further page.

use crate::domain::ports::{PageControl, PageError, RawVolumePage, VolumePager};
use crate::error::{Error, Result};
use crate::filer::query::{AttributeGroup, AttributeQuery};
use crate::ontap::types::{ErrorResponse, VolumeCollection};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

const VOLUMES_PATH: &str = "/api/storage/volumes";

// =============================================================================
// Configuration
// =============================================================================

/// Connection settings for one filer
#[derive(Debug, Clone)]
pub struct OntapConfig {
    /// Management host name or address
    pub host: String,
    /// Basic auth user
    pub username: String,
    /// Basic auth password
    pub password: String,
    /// Skip TLS certificate verification
    pub insecure_tls: bool,
    /// Bound on a single page request
    pub timeout: Duration,
}

impl Default for OntapConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            username: "admin".to_string(),
            password: String::new(),
            insecure_tls: true,
            timeout: Duration::from_secs(30),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Outcome of a single page request
enum PageFetch {
    /// Page and the href of its successor
    Page(RawVolumePage, Option<String>),
    /// The request could not be completed
    Failed(String),
}

/// REST client for one filer
pub struct OntapClient {
    filer: String,
    base_url: String,
    config: OntapConfig,
    http: reqwest::Client,
}

impl OntapClient {
    /// Create a client; no request is made until the first listing
    pub fn new(filer: impl Into<String>, config: OntapConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.insecure_tls)
            .timeout(config.timeout)
            .build()?;

        let has_scheme = config.host.starts_with("http://") || config.host.starts_with("https://");
        let base_url = if has_scheme {
            config.host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", config.host)
        };

        Ok(Self {
            filer: filer.into(),
            base_url,
            config,
            http,
        })
    }

    /// URL of the first page of a listing
    pub fn first_page_url(&self, query: &AttributeQuery) -> String {
        debug_assert!(
            [AttributeGroup::Identity, AttributeGroup::Space, AttributeGroup::Efficiency]
                .into_iter()
                .all(|group| query.requests_group(group)),
            "volume query must request every attribute group"
        );

        let mut url = format!(
            "{}{}?fields={}&max_records={}",
            self.base_url,
            VOLUMES_PATH,
            urlencoding::encode(&query.fields()),
            query.page_size
        );
        if let Some(filter) = &query.filter {
            let (key, value) = filter.param();
            url.push_str(&format!("&{}={}", key, urlencoding::encode(value)));
        }
        url
    }

    /// Absolute URL of a relative `_links` href
    pub fn resolve(&self, href: &str) -> String {
        format!("{}{}", self.base_url, href)
    }

    async fn fetch_page(&self, url: &str) -> Result<PageFetch> {
        debug!(filer = %self.filer, url, "requesting volume page");

        let response = match self
            .http
            .get(url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Ok(PageFetch::Failed(e.to_string())),
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Connection {
                filer: self.filer.clone(),
                reason: format!("authentication rejected ({})", status),
            });
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return Ok(PageFetch::Failed(e.to_string())),
        };

        if !status.is_success() {
            let error = serde_json::from_slice::<ErrorResponse>(&body)
                .map(|r| PageError::from(r.error))
                .unwrap_or_else(|_| PageError {
                    code: status.as_u16().to_string(),
                    reason: status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string(),
                });
            return Ok(PageFetch::Page(
                RawVolumePage {
                    entries: Vec::new(),
                    error: Some(error),
                },
                None,
            ));
        }

        let collection: VolumeCollection = match serde_json::from_slice(&body) {
            Ok(collection) => collection,
            Err(e) => return Ok(PageFetch::Failed(format!("malformed volume page: {}", e))),
        };
        debug!(
            filer = %self.filer,
            records = collection.num_records.unwrap_or(collection.records.len() as u64),
            "volume page decoded"
        );

        let next = collection.next_href().map(|href| self.resolve(href));
        Ok(PageFetch::Page(collection.into_page(), next))
    }
}

#[async_trait]
impl VolumePager for OntapClient {
    async fn list_volumes(
        &self,
        query: &AttributeQuery,
        handler: &mut (dyn FnMut(RawVolumePage) -> PageControl + Send),
    ) -> Result<()> {
        let mut next = Some(self.first_page_url(query));
        let mut first = true;

        while let Some(url) = next.take() {
            let page = match self.fetch_page(&url).await? {
                PageFetch::Page(page, successor) => {
                    next = successor;
                    page
                }
                // Nothing delivered yet: the listing never started
                PageFetch::Failed(reason) if first => {
                    return Err(Error::Connection {
                        filer: self.filer.clone(),
                        reason,
                    });
                }
                PageFetch::Failed(reason) => RawVolumePage::failed("transport", reason),
            };
            first = false;

            if handler(page) == PageControl::Stop {
                break;
            }
        }

        Ok(())
    }
}
