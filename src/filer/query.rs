//! Attribute Query Builder
//!
//! The listing protocol only returns requested attribute groups; anything
//! outside the allow-list comes back absent. The allow-list therefore names
//! every field the extractor reads.

/// Attribute groups of a volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeGroup {
    Identity,
    Space,
    Efficiency,
}

/// A single selectable volume attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeAttribute {
    Name,
    OwningVserverName,
    OwningVserverUuid,
    Comment,
    VolumeType,
    Size,
    SizeTotal,
    SizeAvailable,
    SizeUsed,
    SizeUsedBySnapshots,
    SizeAvailableForSnapshots,
    SnapshotReserveSize,
    PercentageSizeUsed,
    PercentageCompressionSpaceSaved,
    PercentageDeduplicationSpaceSaved,
    PercentageTotalSpaceSaved,
}

impl VolumeAttribute {
    /// Every attribute the record extractor consumes
    pub const ALL: [VolumeAttribute; 16] = [
        VolumeAttribute::Name,
        VolumeAttribute::OwningVserverName,
        VolumeAttribute::OwningVserverUuid,
        VolumeAttribute::Comment,
        VolumeAttribute::VolumeType,
        VolumeAttribute::Size,
        VolumeAttribute::SizeTotal,
        VolumeAttribute::SizeAvailable,
        VolumeAttribute::SizeUsed,
        VolumeAttribute::SizeUsedBySnapshots,
        VolumeAttribute::SizeAvailableForSnapshots,
        VolumeAttribute::SnapshotReserveSize,
        VolumeAttribute::PercentageSizeUsed,
        VolumeAttribute::PercentageCompressionSpaceSaved,
        VolumeAttribute::PercentageDeduplicationSpaceSaved,
        VolumeAttribute::PercentageTotalSpaceSaved,
    ];

    /// Group this attribute belongs to
    pub fn group(&self) -> AttributeGroup {
        match self {
            VolumeAttribute::Name
            | VolumeAttribute::OwningVserverName
            | VolumeAttribute::OwningVserverUuid
            | VolumeAttribute::Comment
            | VolumeAttribute::VolumeType => AttributeGroup::Identity,
            VolumeAttribute::PercentageCompressionSpaceSaved
            | VolumeAttribute::PercentageDeduplicationSpaceSaved
            | VolumeAttribute::PercentageTotalSpaceSaved => AttributeGroup::Efficiency,
            _ => AttributeGroup::Space,
        }
    }

    /// Dotted field path in the filer's volume resource
    pub fn path(&self) -> &'static str {
        match self {
            VolumeAttribute::Name => "name",
            VolumeAttribute::OwningVserverName => "svm.name",
            VolumeAttribute::OwningVserverUuid => "svm.uuid",
            VolumeAttribute::Comment => "comment",
            VolumeAttribute::VolumeType => "type",
            VolumeAttribute::Size => "space.size",
            VolumeAttribute::SizeTotal => "space.afs_total",
            VolumeAttribute::SizeAvailable => "space.available",
            VolumeAttribute::SizeUsed => "space.used",
            VolumeAttribute::SizeUsedBySnapshots => "space.snapshot.used",
            VolumeAttribute::SizeAvailableForSnapshots => "space.snapshot.reserve_available",
            VolumeAttribute::SnapshotReserveSize => "space.snapshot.reserve_size",
            VolumeAttribute::PercentageSizeUsed => "space.percent_used",
            VolumeAttribute::PercentageCompressionSpaceSaved => {
                "efficiency.space_savings.compression_percent"
            }
            VolumeAttribute::PercentageDeduplicationSpaceSaved => {
                "efficiency.space_savings.dedupe_percent"
            }
            VolumeAttribute::PercentageTotalSpaceSaved => "efficiency.space_savings.total_percent",
        }
    }
}

/// Restricts a listing to the volumes of one virtual server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VserverFilter {
    Uuid(String),
    Name(String),
}

impl VserverFilter {
    /// Query parameter name and value
    pub fn param(&self) -> (&'static str, &str) {
        match self {
            VserverFilter::Uuid(uuid) => ("svm.uuid", uuid),
            VserverFilter::Name(name) => ("svm.name", name),
        }
    }
}

/// Field selection and filter for a paged volume listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeQuery {
    /// Optional restriction to one virtual server
    pub filter: Option<VserverFilter>,
    /// Attributes the filer must return
    pub attributes: Vec<VolumeAttribute>,
    /// Records per page hint
    pub page_size: u32,
}

impl AttributeQuery {
    /// Build the volume query with the full extractor allow-list
    pub fn new(page_size: u32, filter: Option<VserverFilter>) -> Self {
        Self {
            filter,
            attributes: VolumeAttribute::ALL.to_vec(),
            page_size,
        }
    }

    /// Whether any attribute of a group is in the allow-list
    pub fn requests_group(&self, group: AttributeGroup) -> bool {
        self.attributes.iter().any(|a| a.group() == group)
    }

    /// Comma-separated field paths of the allow-list
    pub fn fields(&self) -> String {
        self.attributes
            .iter()
            .map(VolumeAttribute::path)
            .collect::<Vec<_>>()
            .join(",")
    }
}
