//! Poll Collector
//!
//! Enumerates every configured filer once per cycle. Filers are polled
//! concurrently; each one owns its connection and paging state, so nothing
//! is shared between them but the metrics sink.

use crate::config::ExporterConfig;
use crate::domain::ports::VolumeRecord;
use crate::error::Result;
use crate::exporter::VolumeMetrics;
use crate::filer::{Filer, PollSettings};
use crate::ontap::OntapClient;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Result of one filer's enumeration within a cycle
#[derive(Debug)]
pub struct FilerPoll {
    pub filer: String,
    pub result: Result<Vec<VolumeRecord>>,
}

/// Polls a fixed set of filers and feeds the metrics sink
pub struct Collector {
    filers: Vec<Filer>,
    settings: PollSettings,
    metrics: Arc<VolumeMetrics>,
}

impl Collector {
    pub fn new(filers: Vec<Filer>, settings: PollSettings, metrics: Arc<VolumeMetrics>) -> Self {
        Self {
            filers,
            settings,
            metrics,
        }
    }

    /// Build one REST-backed filer per configuration entry
    pub fn from_config(
        config: &ExporterConfig,
        settings: PollSettings,
        metrics: Arc<VolumeMetrics>,
    ) -> Result<Self> {
        let filers = config
            .filers
            .iter()
            .map(|filer| {
                let client = OntapClient::new(filer.name.clone(), filer.connection())?;
                Ok(Filer::new(filer.name.clone(), Arc::new(client))
                    .with_vserver(filer.vserver_filter()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(filers, settings, metrics))
    }

    pub fn filers(&self) -> &[Filer] {
        &self.filers
    }

    /// Poll every filer once and update metrics
    ///
    /// A failing filer is logged and counted; the others are unaffected.
    pub async fn poll_once(&self) -> Vec<FilerPoll> {
        let polls = join_all(self.filers.iter().map(|filer| async move {
            FilerPoll {
                filer: filer.name().to_string(),
                result: filer.volumes(self.settings).await,
            }
        }))
        .await;

        for poll in &polls {
            match &poll.result {
                Ok(records) => self.metrics.observe(&poll.filer, records),
                Err(e) => {
                    if e.is_transient() {
                        warn!(filer = %poll.filer, "Filer poll failed: {}", e);
                    } else {
                        error!(filer = %poll.filer, "Filer poll failed: {}", e);
                    }
                    self.metrics.record_poll_error(&poll.filer);
                }
            }
        }

        polls
    }

    /// Poll on a fixed interval, forever
    pub async fn run(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let polls = self.poll_once().await;
            let volumes: usize = polls
                .iter()
                .filter_map(|p| p.result.as_ref().ok())
                .map(Vec::len)
                .sum();
            info!(filers = polls.len(), volumes, "Poll cycle complete");
        }
    }
}
