//! Wire types of the filer's volume collection endpoint
//!
//! Numeric values are kept as the exact decimal text the filer sent.

use crate::domain::ports::{
    PageError, RawVolumeEntry, RawVolumePage, VolumeEfficiencyAttributes, VolumeIdAttributes,
    VolumeSpaceAttributes,
};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One page of `GET /api/storage/volumes`
#[derive(Debug, Default, Deserialize)]
pub struct VolumeCollection {
    #[serde(default)]
    pub records: Vec<Volume>,
    #[serde(default)]
    pub num_records: Option<u64>,
    #[serde(rename = "_links", default)]
    pub links: Option<CollectionLinks>,
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

impl VolumeCollection {
    /// Relative href of the next page, if any
    pub fn next_href(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|links| links.next.as_ref())
            .map(|next| next.href.as_str())
    }

    /// Convert into a pipeline page
    pub fn into_page(self) -> RawVolumePage {
        match self.error {
            Some(error) => RawVolumePage::failed(error.code, error.message),
            None => RawVolumePage::new(self.records.into_iter().map(Into::into).collect()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CollectionLinks {
    #[serde(default)]
    pub next: Option<Href>,
}

#[derive(Debug, Deserialize)]
pub struct Href {
    pub href: String,
}

/// Error object the filer returns instead of records
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default, deserialize_with = "decimal")]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Error-only response body
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

impl From<ErrorBody> for PageError {
    fn from(body: ErrorBody) -> Self {
        PageError {
            code: body.code,
            reason: body.message,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Volume {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(rename = "type", default)]
    pub volume_type: String,
    #[serde(default)]
    pub svm: Svm,
    #[serde(default)]
    pub space: Space,
    #[serde(default)]
    pub efficiency: Option<Efficiency>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Svm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uuid: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Space {
    #[serde(default)]
    pub size: i64,
    #[serde(default, deserialize_with = "decimal")]
    pub afs_total: String,
    #[serde(default, deserialize_with = "decimal")]
    pub available: String,
    #[serde(default, deserialize_with = "decimal")]
    pub used: String,
    #[serde(default, deserialize_with = "decimal")]
    pub percent_used: String,
    #[serde(default)]
    pub snapshot: SnapshotSpace,
}

#[derive(Debug, Default, Deserialize)]
pub struct SnapshotSpace {
    #[serde(default, deserialize_with = "decimal")]
    pub used: String,
    #[serde(default, deserialize_with = "decimal")]
    pub reserve_available: String,
    #[serde(default, deserialize_with = "decimal")]
    pub reserve_size: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Efficiency {
    #[serde(default)]
    pub space_savings: Option<SpaceSavings>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SpaceSavings {
    #[serde(default, deserialize_with = "decimal")]
    pub compression_percent: String,
    #[serde(default, deserialize_with = "decimal")]
    pub dedupe_percent: String,
    #[serde(default, deserialize_with = "decimal")]
    pub total_percent: String,
}

impl From<Volume> for RawVolumeEntry {
    fn from(volume: Volume) -> Self {
        let Volume {
            name,
            comment,
            volume_type,
            svm,
            space,
            efficiency,
        } = volume;

        RawVolumeEntry {
            id: VolumeIdAttributes {
                name,
                owning_vserver_name: svm.name,
                owning_vserver_uuid: svm.uuid,
                comment,
                volume_type,
            },
            space: VolumeSpaceAttributes {
                size: space.size,
                size_total: space.afs_total,
                size_available: space.available,
                size_used: space.used,
                size_used_by_snapshots: space.snapshot.used,
                size_available_for_snapshots: space.snapshot.reserve_available,
                snapshot_reserve_size: space.snapshot.reserve_size,
                percentage_size_used: space.percent_used,
            },
            efficiency: efficiency
                .and_then(|e| e.space_savings)
                .map(|savings| VolumeEfficiencyAttributes {
                    percentage_compression_space_saved: savings.compression_percent,
                    percentage_deduplication_space_saved: savings.dedupe_percent,
                    percentage_total_space_saved: savings.total_percent,
                }),
        }
    }
}

/// Accept a JSON number or string and keep its decimal text unchanged
fn decimal<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(D::Error::custom(format!(
            "expected decimal number, found {}",
            other
        ))),
    }
}
