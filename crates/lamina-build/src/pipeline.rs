//! Concurrent build pipeline: fan-out over source files, fan-in of results.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::{self, Sender};
use tokio::sync::Notify;

use lamina_render::{render_document, Highlighter, PageOptions};

use crate::report;
use crate::walker::{self, EntryKind, ExcludeRules};

/// Configuration for one build run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Source tree root
    pub source_dir: PathBuf,

    /// Destination tree root, created if absent
    pub dest_dir: PathBuf,

    /// Directory exclusion rules
    pub rules: ExcludeRules,

    /// Head references for rendered pages
    pub page: PageOptions,

    /// Log and skip failed files instead of aborting the run
    pub keep_going: bool,

    /// Result channel capacity; a full channel blocks producers
    pub channel_capacity: usize,
}

impl BuildOptions {
    pub fn new(source_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        let dest_dir = dest_dir.into();
        Self {
            source_dir: source_dir.into(),
            rules: ExcludeRules::new(&dest_dir),
            dest_dir,
            page: PageOptions::default(),
            keep_going: false,
            channel_capacity: 64,
        }
    }
}

/// Result of a build run.
#[derive(Debug)]
pub struct BuildSummary {
    /// Markdown pages rendered
    pub pages: usize,

    /// Binary assets copied
    pub assets: usize,

    /// Files skipped after a failure (always 0 unless `keep_going`)
    pub failures: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Destination root
    pub dest_dir: PathBuf,
}

/// Errors that abort a build run.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to walk source tree: {0}")]
    Walk(String),

    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to render {path}: {message}")]
    Render { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("Build task failed: {0}")]
    Task(String),
}

/// The outcome record for one processed source entry.
#[derive(Debug)]
pub struct RenderResult {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub kind: EntryKind,
    pub error: Option<BuildError>,
}

/// Count of spawned tasks still running.
///
/// Producers increment on spawn and decrement on completion; the closer task
/// awaits `settled` before dropping the last result sender. Closing the
/// stream is never the producers' or the consumer's job.
#[derive(Default)]
struct Outstanding {
    count: AtomicUsize,
    notify: Notify,
}

impl Outstanding {
    fn increment(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    fn decrement(&self) {
        if self.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.notify.notify_waiters();
        }
    }

    async fn settled(&self) {
        loop {
            // Register before checking so a final decrement is never missed.
            let notified = self.notify.notified();
            if self.count.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}

struct BuildContext {
    options: BuildOptions,
    highlighter: Highlighter,
}

impl BuildContext {
    /// Map a source path to its destination, swapping markdown to `.html`.
    fn dest_path(&self, source: &Path, kind: EntryKind) -> PathBuf {
        let relative = source
            .strip_prefix(&self.options.source_dir)
            .unwrap_or(source);
        let mut dest = self.options.dest_dir.join(relative);
        if kind == EntryKind::Markdown {
            dest.set_extension("html");
        }
        dest
    }
}

/// Site builder: walks the source tree, renders markdown concurrently,
/// copies assets, and reports every processed file.
pub struct SiteBuilder {
    ctx: Arc<BuildContext>,
}

impl SiteBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            ctx: Arc::new(BuildContext {
                options,
                highlighter: Highlighter::new(),
            }),
        }
    }

    /// Run the build, writing the report to stderr.
    pub async fn build(&self) -> Result<BuildSummary, BuildError> {
        let start = Instant::now();
        let options = &self.ctx.options;

        fs::create_dir_all(&options.dest_dir).map_err(|e| BuildError::Write {
            path: options.dest_dir.display().to_string(),
            message: e.to_string(),
        })?;

        let (tx, rx) = mpsc::channel(options.channel_capacity);
        let outstanding = Arc::new(Outstanding::default());

        let producer = tokio::spawn(produce(
            Arc::clone(&self.ctx),
            tx.clone(),
            Arc::clone(&outstanding),
        ));

        // The closer owns the last sender. It closes the stream only after
        // enumeration has finished and every spawned task has reported.
        let closer = tokio::spawn(async move {
            let walked = match producer.await {
                Ok(result) => result,
                Err(e) => Err(BuildError::Task(e.to_string())),
            };
            outstanding.settled().await;
            drop(tx);
            walked
        });

        let results = report::drain(rx).await;

        report::write_report(&results, &mut io::stderr().lock()).map_err(|e| {
            BuildError::Write {
                path: "<stderr>".to_string(),
                message: e.to_string(),
            }
        })?;

        closer
            .await
            .map_err(|e| BuildError::Task(e.to_string()))??;

        let mut summary = BuildSummary {
            pages: 0,
            assets: 0,
            failures: 0,
            duration_ms: 0,
            dest_dir: options.dest_dir.clone(),
        };

        for result in results {
            match result.error {
                None => match result.kind {
                    EntryKind::Markdown => summary.pages += 1,
                    EntryKind::Asset => summary.assets += 1,
                    EntryKind::Ignored => {}
                },
                Some(error) => {
                    if !options.keep_going {
                        return Err(error);
                    }
                    tracing::warn!("Skipped {}: {}", result.source.display(), error);
                    summary.failures += 1;
                }
            }
        }

        summary.duration_ms = start.elapsed().as_millis() as u64;
        Ok(summary)
    }
}

/// Enumerate the source tree, copying assets inline and spawning one task
/// per markdown file. Each non-ignored entry produces exactly one result.
async fn produce(
    ctx: Arc<BuildContext>,
    tx: Sender<RenderResult>,
    outstanding: Arc<Outstanding>,
) -> Result<(), BuildError> {
    for entry in walker::walk(&ctx.options.source_dir, &ctx.options.rules) {
        let entry = entry.map_err(|e| BuildError::Walk(e.to_string()))?;

        match entry.kind {
            EntryKind::Ignored => continue,

            EntryKind::Asset => {
                let dest = ctx.dest_path(&entry.path, EntryKind::Asset);
                let error = copy_asset(&entry.path, &dest).err();
                let result = RenderResult {
                    source: entry.path,
                    dest,
                    kind: EntryKind::Asset,
                    error,
                };
                if tx.send(result).await.is_err() {
                    tracing::warn!("Result stream closed while producing");
                }
            }

            EntryKind::Markdown => {
                outstanding.increment();
                let ctx = Arc::clone(&ctx);
                let tx = tx.clone();
                let outstanding = Arc::clone(&outstanding);

                tokio::spawn(async move {
                    #[cfg(test)]
                    task_jitter(&entry.path).await;

                    let dest = ctx.dest_path(&entry.path, EntryKind::Markdown);
                    let error = render_page(&ctx, &entry.path, &dest).await.err();
                    let result = RenderResult {
                        source: entry.path,
                        dest,
                        kind: EntryKind::Markdown,
                        error,
                    };
                    if tx.send(result).await.is_err() {
                        tracing::warn!("Result stream closed while producing");
                    }
                    outstanding.decrement();
                });
            }
        }
    }

    Ok(())
}

/// Randomize per-task timing so test runs explore different interleavings.
#[cfg(test)]
async fn task_jitter(path: &Path) {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    if let Ok(now) = SystemTime::now().duration_since(UNIX_EPOCH) {
        now.subsec_nanos().hash(&mut hasher);
    }

    tokio::time::sleep(Duration::from_millis(hasher.finish() % 16)).await;
}

/// Copy one asset byte for byte, synchronously on the enumerating task.
fn copy_asset(source: &Path, dest: &Path) -> Result<(), BuildError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::Write {
            path: parent.display().to_string(),
            message: e.to_string(),
        })?;
    }

    fs::copy(source, dest).map_err(|e| BuildError::Write {
        path: dest.display().to_string(),
        message: e.to_string(),
    })?;

    Ok(())
}

/// Render one markdown file to a highlighted HTML document on disk.
///
/// Runs on a spawned task; file I/O goes through `tokio::fs` so it never
/// blocks a runtime worker thread.
async fn render_page(ctx: &BuildContext, source: &Path, dest: &Path) -> Result<(), BuildError> {
    let text = tokio::fs::read_to_string(source)
        .await
        .map_err(|e| BuildError::Read {
            path: source.display().to_string(),
            message: e.to_string(),
        })?;

    let page = render_document(&text, source, &ctx.options.page);

    let html = ctx
        .highlighter
        .rewrite(&page.html)
        .map_err(|e| BuildError::Render {
            path: source.display().to_string(),
            message: e.to_string(),
        })?;

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| BuildError::Write {
                path: parent.display().to_string(),
                message: e.to_string(),
            })?;
    }

    tokio::fs::write(dest, html)
        .await
        .map_err(|e| BuildError::Write {
            path: dest.display().to_string(),
            message: e.to_string(),
        })?;

    Ok(())
}
