//! Volume Record Extractor
//!
//! Flattens listing pages into one [`VolumeRecord`] per raw entry, in page
//! order then entry order. Space figures are copied verbatim.

use crate::domain::ports::{RawVolumeEntry, RawVolumePage, VolumeRecord};
use crate::filer::tag::{parse_tag, ShareTag};
use tracing::{debug, info};

/// Name of the per-vserver administrative volume, which never carries a tag
pub const ROOT_VOLUME_NAME: &str = "root";

/// Map all pages into records
pub fn extract(pages: Vec<RawVolumePage>) -> Vec<VolumeRecord> {
    pages
        .into_iter()
        .flat_map(|page| page.entries)
        .map(to_record)
        .collect()
}

fn to_record(entry: RawVolumeEntry) -> VolumeRecord {
    let RawVolumeEntry { id, space, efficiency } = entry;

    debug!(
        volume = %id.name,
        vserver = %id.owning_vserver_name,
        vserver_uuid = %id.owning_vserver_uuid,
        volume_type = %id.volume_type,
        comment = %id.comment,
        size = space.size,
        size_total = %space.size_total,
        size_available = %space.size_available,
        size_used = %space.size_used,
        percentage_size_used = %space.percentage_size_used,
        "volume attributes"
    );

    let efficiency = efficiency.unwrap_or_else(|| {
        debug!(volume = %id.name, "volume has no storage efficiency data");
        Default::default()
    });

    let tag = if id.comment.is_empty() {
        if id.name != ROOT_VOLUME_NAME {
            info!(
                volume = %id.name,
                vserver = %id.owning_vserver_name,
                "volume has no comment"
            );
        }
        ShareTag::default()
    } else {
        parse_tag(&id.comment)
    };

    VolumeRecord {
        vserver: id.owning_vserver_name,
        volume: id.name,
        size: space.size,
        size_total: space.size_total,
        size_available: space.size_available,
        size_used: space.size_used,
        size_used_by_snapshots: space.size_used_by_snapshots,
        size_available_for_snapshots: space.size_available_for_snapshots,
        snapshot_reserve_size: space.snapshot_reserve_size,
        percentage_size_used: space.percentage_size_used,
        percentage_compression_space_saved: efficiency.percentage_compression_space_saved,
        percentage_deduplication_space_saved: efficiency.percentage_deduplication_space_saved,
        percentage_total_space_saved: efficiency.percentage_total_space_saved,
        share_id: tag.share_id,
        share_name: tag.share_name,
        project_id: tag.project_id,
    }
}
