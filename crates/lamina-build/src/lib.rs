//! Concurrent site build engine for lamina.
//!
//! Walks a source tree, renders every markdown file to HTML on its own task,
//! copies binary assets, and collects one result per file on a bounded
//! stream that a dedicated coordinator closes once all tasks have finished.

pub mod pipeline;
pub mod report;
pub mod walker;

pub use pipeline::{BuildError, BuildOptions, BuildSummary, RenderResult, SiteBuilder};
pub use walker::{classify, walk, EntryKind, ExcludeRules, SourceEntry};
