//! Volume enumeration pipeline
//!
//! query builder → paged listing driver → record extractor, with the comment
//! tag parser invoked per record. One [`Filer`] enumerates one filer.

pub mod extract;
pub mod pager;
pub mod query;
pub mod tag;

#[cfg(test)]
pub(crate) mod testing;

pub use extract::{extract, ROOT_VOLUME_NAME};
pub use pager::list_all_pages;
pub use query::{AttributeGroup, AttributeQuery, VolumeAttribute, VserverFilter};
pub use tag::{parse_tag, ShareTag};

use crate::domain::ports::{VolumePager, VolumeRecord};
use crate::error::Result;
use std::sync::Arc;
use tracing::instrument::WithSubscriber;
use tracing::{info, info_span, Dispatch, Instrument};

/// Paging settings for one enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Records per page hint
    pub page_size: u32,
    /// Page cap; zero or negative is unbounded
    pub max_pages: i64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            page_size: 500,
            max_pages: 0,
        }
    }
}

/// One filer: its connection, scope, and log sink
#[derive(Clone)]
pub struct Filer {
    name: String,
    pager: Arc<dyn VolumePager>,
    vserver: Option<VserverFilter>,
    log_sink: Dispatch,
}

impl Filer {
    /// Create a filer logging to the dispatcher current at construction
    pub fn new(name: impl Into<String>, pager: Arc<dyn VolumePager>) -> Self {
        Self {
            name: name.into(),
            pager,
            vserver: None,
            log_sink: tracing::dispatcher::get_default(|dispatch| dispatch.clone()),
        }
    }

    /// Restrict enumeration to one virtual server
    pub fn with_vserver(mut self, vserver: Option<VserverFilter>) -> Self {
        self.vserver = vserver;
        self
    }

    /// Route this filer's log events to `sink`
    pub fn with_log_sink(mut self, sink: impl Into<Dispatch>) -> Self {
        self.log_sink = sink.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enumerate all volumes of this filer
    ///
    /// Only a connection fault fails the call. A page-level error truncates
    /// the listing and the pages received before it are still returned.
    pub async fn volumes(&self, settings: PollSettings) -> Result<Vec<VolumeRecord>> {
        let query = AttributeQuery::new(settings.page_size, self.vserver.clone());

        async {
            let span = info_span!("filer", filer = %self.name);
            self.enumerate(&query, settings.max_pages)
                .instrument(span)
                .await
        }
        .with_subscriber(self.log_sink.clone())
        .await
    }

    async fn enumerate(&self, query: &AttributeQuery, max_pages: i64) -> Result<Vec<VolumeRecord>> {
        let pages = list_all_pages(self.pager.as_ref(), query, max_pages).await?;
        let records = extract(pages);
        info!(volumes = records.len(), "enumerated filer volumes");
        Ok(records)
    }
}

impl std::fmt::Debug for Filer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filer")
            .field("name", &self.name)
            .field("vserver", &self.vserver)
            .finish()
    }
}
