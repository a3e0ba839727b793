//! Shared test utilities for the s3nuke library crate.
//!
//! Provides an in-memory [`MockStore`] with scripted listing pages and
//! injectable failures, plus the dummy tracing subscriber helper used by
//! every test module.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;

use tracing::Level;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context as LayerContext, Layer};

use crate::storage::ObjectStore;
use crate::types::{DeletionJob, ObjectsPage, VersionsCursor, VersionsPage};

/// Initialise a dummy tracing subscriber for tests.
///
/// Uses `try_init` so that only the first call in a process actually
/// installs the subscriber; subsequent calls are silently ignored.
pub(crate) fn init_dummy_tracing_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("dummy=trace")
        .try_init();
}

/// One captured tracing event: level plus the formatted message.
#[derive(Debug, Clone)]
pub(crate) struct CapturedLog {
    pub(crate) level: Level,
    pub(crate) message: String,
}

/// Tracing layer recording every event for later assertions.
///
/// Install with [`LogCapture::set_default`] and keep the returned guard
/// alive; the capture is thread-local, so assert only on events emitted
/// from the test's own task.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogCapture {
    logs: Arc<Mutex<Vec<CapturedLog>>>,
}

impl LogCapture {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_default(&self) -> tracing::subscriber::DefaultGuard {
        use tracing_subscriber::layer::SubscriberExt;

        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    /// Number of captured events at `level` whose message contains `needle`.
    pub(crate) fn count(&self, level: Level, needle: &str) -> usize {
        self.logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| log.level == level && log.message.contains(needle))
            .count()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: LayerContext<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.logs.lock().unwrap().push(CapturedLog {
            level: *event.metadata().level(),
            message: visitor.0,
        });
    }
}

/// One observable interaction with the mock backend, in call order.
///
/// Delete events are recorded for every attempt, including attempts that
/// were scripted to fail, so tests can assert both ordering and retry
/// counts from a single log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreEvent {
    Delete {
        key: String,
        version_id: Option<String>,
    },
    DeleteBucket,
}

#[derive(Debug)]
enum FailurePlan {
    Times(u32),
    Always,
}

#[derive(Debug, Default)]
struct Inner {
    versions_pages: Vec<(Vec<DeletionJob>, Vec<DeletionJob>)>,
    objects_pages: Vec<Vec<DeletionJob>>,
    delete_failures: HashMap<String, FailurePlan>,
    fail_versions_listing_at: Option<usize>,
    fail_objects_listing_at: Option<usize>,
    fail_bucket_delete: bool,
    events: Vec<StoreEvent>,
}

/// In-memory [`ObjectStore`] with scripted pages and failure injection.
///
/// Clones share state, so a test can hand one clone to the pipeline and
/// keep another to inspect the recorded events afterwards.
#[derive(Debug, Clone)]
pub(crate) struct MockStore {
    bucket: String,
    inner: Arc<Mutex<Inner>>,
}

impl MockStore {
    /// A store with no versions pages and no objects pages.
    pub(crate) fn empty(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Append one versions-listing page of delete markers and versions.
    pub(crate) fn push_versions_page(
        &self,
        markers: Vec<DeletionJob>,
        versions: Vec<DeletionJob>,
    ) {
        self.inner
            .lock()
            .unwrap()
            .versions_pages
            .push((markers, versions));
    }

    /// Append one objects-listing page.
    pub(crate) fn push_objects_page(&self, objects: Vec<DeletionJob>) {
        self.inner.lock().unwrap().objects_pages.push(objects);
    }

    /// Fail the next `count` delete attempts for `key`, then succeed.
    pub(crate) fn fail_times(&self, key: &str, count: u32) {
        self.inner
            .lock()
            .unwrap()
            .delete_failures
            .insert(key.to_string(), FailurePlan::Times(count));
    }

    /// Fail every delete attempt for `key`.
    pub(crate) fn fail_always(&self, key: &str) {
        self.inner
            .lock()
            .unwrap()
            .delete_failures
            .insert(key.to_string(), FailurePlan::Always);
    }

    /// Fail the versions listing when it asks for the page at `page_index`.
    pub(crate) fn fail_versions_listing_at(&self, page_index: usize) {
        self.inner.lock().unwrap().fail_versions_listing_at = Some(page_index);
    }

    /// Fail the objects listing when it asks for the page at `page_index`.
    pub(crate) fn fail_objects_listing_at(&self, page_index: usize) {
        self.inner.lock().unwrap().fail_objects_listing_at = Some(page_index);
    }

    /// Fail the final DeleteBucket call.
    pub(crate) fn fail_bucket_delete(&self) {
        self.inner.lock().unwrap().fail_bucket_delete = true;
    }

    /// Every delete attempt observed so far, in call order.
    pub(crate) fn delete_calls(&self) -> Vec<(String, Option<String>)> {
        self.inner
            .lock()
            .unwrap()
            .events
            .iter()
            .filter_map(|event| match event {
                StoreEvent::Delete { key, version_id } => {
                    Some((key.clone(), version_id.clone()))
                }
                StoreEvent::DeleteBucket => None,
            })
            .collect()
    }

    /// Full interaction log, in call order.
    pub(crate) fn events(&self) -> Vec<StoreEvent> {
        self.inner.lock().unwrap().events.clone()
    }

    /// Whether DeleteBucket was called.
    pub(crate) fn bucket_deleted(&self) -> bool {
        self.inner
            .lock()
            .unwrap()
            .events
            .contains(&StoreEvent::DeleteBucket)
    }
}

// Page cursors encode the index of the next scripted page.
fn versions_cursor(page_index: usize) -> VersionsCursor {
    VersionsCursor {
        key_marker: Some(page_index.to_string()),
        version_id_marker: None,
    }
}

fn cursor_index(cursor: &Option<VersionsCursor>) -> Result<usize> {
    match cursor {
        None => Ok(0),
        Some(cursor) => cursor
            .key_marker
            .as_deref()
            .ok_or_else(|| anyhow!("cursor without key marker"))?
            .parse()
            .map_err(|_| anyhow!("unparsable cursor")),
    }
}

#[async_trait]
impl ObjectStore for MockStore {
    async fn list_versions_page(&self, cursor: Option<VersionsCursor>) -> Result<VersionsPage> {
        let page_index = cursor_index(&cursor)?;
        let inner = self.inner.lock().unwrap();

        if inner.fail_versions_listing_at == Some(page_index) {
            bail!("injected versions listing failure");
        }

        let Some((markers, versions)) = inner.versions_pages.get(page_index) else {
            return Ok(VersionsPage::default());
        };

        let next = if page_index + 1 < inner.versions_pages.len() {
            Some(versions_cursor(page_index + 1))
        } else {
            None
        };

        Ok(VersionsPage {
            markers: markers.clone(),
            versions: versions.clone(),
            next,
        })
    }

    async fn list_objects_page(&self, continuation: Option<String>) -> Result<ObjectsPage> {
        let page_index: usize = match continuation {
            None => 0,
            Some(token) => token.parse().map_err(|_| anyhow!("unparsable token"))?,
        };
        let inner = self.inner.lock().unwrap();

        if inner.fail_objects_listing_at == Some(page_index) {
            bail!("injected objects listing failure");
        }

        let Some(objects) = inner.objects_pages.get(page_index) else {
            return Ok(ObjectsPage::default());
        };

        let next = if page_index + 1 < inner.objects_pages.len() {
            Some((page_index + 1).to_string())
        } else {
            None
        };

        Ok(ObjectsPage {
            objects: objects.clone(),
            next,
        })
    }

    async fn delete_entry(&self, key: &str, version_id: Option<String>) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.events.push(StoreEvent::Delete {
            key: key.to_string(),
            version_id,
        });

        match inner.delete_failures.get_mut(key) {
            Some(FailurePlan::Always) => bail!("injected delete failure for {key}"),
            Some(FailurePlan::Times(remaining)) => {
                if *remaining > 0 {
                    *remaining -= 1;
                    bail!("injected delete failure for {key}");
                }
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn delete_bucket(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.events.push(StoreEvent::DeleteBucket);

        if inner.fail_bucket_delete {
            bail!("injected bucket delete failure");
        }
        Ok(())
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
