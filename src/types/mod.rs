use std::fmt;

pub mod error;
pub mod token;

/// One deletable entity in the bucket: a plain object, a specific object
/// version, or a delete marker. Markers and versions share the same shape,
/// keyed by key + version id. The bucket itself is carried by the storage
/// handle, not by the job.
///
/// Jobs are transient: created by the pagination producer, consumed exactly
/// once by a worker, then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeletionJob {
    pub key: String,
    pub version_id: Option<String>,
    pub kind: JobKind,
}

/// What a [`DeletionJob`] refers to. Only used for log lines and phase
/// bookkeeping; the delete request is identical for all three kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Marker,
    Version,
    Object,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Marker => write!(f, "marker"),
            JobKind::Version => write!(f, "version"),
            JobKind::Object => write!(f, "object"),
        }
    }
}

impl DeletionJob {
    pub fn marker(key: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: Some(version_id.into()),
            kind: JobKind::Marker,
        }
    }

    pub fn version(key: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: Some(version_id.into()),
            kind: JobKind::Version,
        }
    }

    pub fn object(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: None,
            kind: JobKind::Object,
        }
    }
}

/// Continuation cursor for the ListObjectVersions pagination protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionsCursor {
    pub key_marker: Option<String>,
    pub version_id_marker: Option<String>,
}

/// One page of a versions-and-markers listing.
///
/// A page with no entries is valid and still flows through the phase barrier
/// as a no-op drain.
#[derive(Debug, Clone, Default)]
pub struct VersionsPage {
    pub markers: Vec<DeletionJob>,
    pub versions: Vec<DeletionJob>,
    pub next: Option<VersionsCursor>,
}

/// One page of a plain-objects listing.
#[derive(Debug, Clone, Default)]
pub struct ObjectsPage {
    pub objects: Vec<DeletionJob>,
    pub next: Option<String>,
}

/// Per-job result reported by the delete executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The delete call succeeded, possibly after transient failures.
    Deleted { attempts: u32 },
    /// Every attempt up to the retry budget failed. The job is logged and
    /// dropped; the run continues.
    Abandoned { attempts: u32 },
    /// The run was cancelled before the job could complete.
    Cancelled,
}

/// Aggregate counts for a completed (or aborted) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NukeSummary {
    pub deleted: u64,
    pub abandoned: u64,
}

/// Shared run counters, accumulated atomically by all workers.
///
/// Outcomes are otherwise only surfaced through logging; this report exists
/// so the final log line can state how many jobs were deleted and how many
/// were abandoned after exhausting their retry budget.
#[derive(Debug, Default)]
pub struct NukeStatsReport {
    deleted: std::sync::atomic::AtomicU64,
    abandoned: std::sync::atomic::AtomicU64,
}

impl NukeStatsReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_deleted(&self) {
        self.deleted
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn record_abandoned(&self) {
        self.abandoned
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> NukeSummary {
        NukeSummary {
            deleted: self.deleted.load(std::sync::atomic::Ordering::SeqCst),
            abandoned: self.abandoned.load(std::sync::atomic::Ordering::SeqCst),
        }
    }
}
