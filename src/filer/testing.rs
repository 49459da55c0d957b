//! Test doubles shared by the pipeline tests

use crate::domain::ports::{
    PageControl, RawVolumeEntry, RawVolumePage, VolumeEfficiencyAttributes, VolumeIdAttributes,
    VolumePager, VolumeSpaceAttributes,
};
use crate::error::{Error, Result};
use crate::filer::query::AttributeQuery;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

/// In-memory pager replaying a fixed page sequence
pub struct StaticPager {
    pages: Vec<RawVolumePage>,
    unreachable: bool,
    delivered: AtomicUsize,
}

impl StaticPager {
    pub fn new(pages: Vec<RawVolumePage>) -> Self {
        Self {
            pages,
            unreachable: false,
            delivered: AtomicUsize::new(0),
        }
    }

    /// A pager whose listing cannot be started
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::new(Vec::new())
        }
    }

    /// Pages handed to the handler by the last listing
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VolumePager for StaticPager {
    async fn list_volumes(
        &self,
        _query: &AttributeQuery,
        handler: &mut (dyn FnMut(RawVolumePage) -> PageControl + Send),
    ) -> Result<()> {
        if self.unreachable {
            return Err(Error::Connection {
                filer: "static".into(),
                reason: "connection refused".into(),
            });
        }

        self.delivered.store(0, Ordering::SeqCst);
        for page in self.pages.iter().cloned() {
            self.delivered.fetch_add(1, Ordering::SeqCst);
            if handler(page) == PageControl::Stop {
                break;
            }
        }
        Ok(())
    }
}

/// Raw entry with fixed space figures and efficiency data
pub fn entry(name: &str, comment: &str) -> RawVolumeEntry {
    RawVolumeEntry {
        id: VolumeIdAttributes {
            name: name.to_string(),
            owning_vserver_name: "ma_vs1".to_string(),
            owning_vserver_uuid: "4c1f6a3e-2b1d-11e9-8d5a-00a098d6a1f0".to_string(),
            comment: comment.to_string(),
            volume_type: "rw".to_string(),
        },
        space: VolumeSpaceAttributes {
            size: 107374182400,
            size_total: "102005473280".to_string(),
            size_available: "91804925952".to_string(),
            size_used: "10200547328".to_string(),
            size_used_by_snapshots: "1048576".to_string(),
            size_available_for_snapshots: "5367660544".to_string(),
            snapshot_reserve_size: "5368709120".to_string(),
            percentage_size_used: "10".to_string(),
        },
        efficiency: Some(VolumeEfficiencyAttributes {
            percentage_compression_space_saved: "12".to_string(),
            percentage_deduplication_space_saved: "3".to_string(),
            percentage_total_space_saved: "15".to_string(),
        }),
    }
}

/// Log event recorded by [`CapturedEvents`]
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Layer recording every event it sees
#[derive(Clone, Default)]
pub struct CapturedEvents(Arc<Mutex<Vec<CapturedEvent>>>);

impl CapturedEvents {
    /// Subscriber that records into this capture
    pub fn subscriber(&self) -> impl Subscriber + Send + Sync + 'static {
        tracing_subscriber::registry().with(self.clone())
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.0.lock().clone()
    }

    /// Events at `level` whose message contains `needle`
    pub fn matching(&self, level: Level, needle: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level && e.message.contains(needle))
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for CapturedEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        self.0.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }
}
