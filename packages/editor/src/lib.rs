//! # Mindmap Editor
//!
//! Keeps a mindmap's text and its tree in step.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host: file / editor buffer (text)           │
//! └─────────────────────────────────────────────┘
//!        │ text_changed             ▲ write-back
//!        ▼                          │
//! ┌─────────────────────────────────────────────┐
//! │ SyncCoordinator (actor)                     │
//! │  - debounce, generations                    │
//! │  - parse → validate on the blocking pool    │
//! │  - mutate: flush pending text → edit →      │
//! │    serialize → text_changed                 │
//! └─────────────────────────────────────────────┘
//!        │ Publication (watch)      ▲ mutate
//!        ▼                          │
//! ┌─────────────────────────────────────────────┐
//! │ renderer: read-only document + errors       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Text is the source of truth**: tree edits are serialized and fed back
//!    in as text
//! 2. **Immutable snapshots**: published documents are never changed in place
//! 3. **Latest wins**: results for superseded text are discarded
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mindmap_editor::{Mutation, SyncConfig, SyncCoordinator};
//!
//! let (sync, mut writeback) = SyncCoordinator::spawn(SyncConfig::new(Format::Yaml));
//! let mut publications = sync.subscribe();
//!
//! sync.text_changed(std::fs::read_to_string("plan.yaml")?).await?;
//! publications.changed().await?;
//!
//! let text = sync
//!     .mutate(Mutation::AddTag { node_id: "root".into(), tag: "q3".into() })
//!     .await?;
//! ```

mod clock;
mod coordinator;
mod document;
mod errors;
mod mutations;
mod pipeline;

pub use clock::{Clock, FixedClock, SystemClock};
pub use coordinator::{
    PublicationReceiver, SyncConfig, SyncCoordinator, SyncEvent, DEFAULT_DEBOUNCE,
};
pub use document::Snapshot;
pub use errors::EditorError;
pub use mutations::{
    add_child, add_sibling, add_tag, remove_tag, set_custom_field, toggle_collapse, update_fields,
    Mutation, MutationError, NodePatch,
};
pub use pipeline::{
    ParseJob, ParseOutcome, ParseStep, Publication, SchemaStep, SyncPhase, SyncState,
    ValidateJob, ValidateOutcome,
};

// Re-export common types for convenience
pub use mindmap_parser::{Format, MindmapDocument, MindmapNode};
