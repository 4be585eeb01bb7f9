//! # Sync Pipeline
//!
//! The text → tree state machine behind the coordinator:
//!
//! ```text
//! Idle ─text─► Debouncing ─timer─► Parsing ─ok─► Validating ─► Published
//!                  ▲                  │                            │
//!                  └──── new text ────┴──────── parse error ───────┘
//! ```
//!
//! `SyncState` owns no timers or threads. The coordinator decides when the
//! debounce window is over, runs the [`ParseJob`] and [`ValidateJob`] it hands
//! out, and feeds their outcomes back. Every accepted text bumps the
//! generation; outcomes from an older generation are dropped.

use crate::document::Snapshot;
use mindmap_parser::{parse, CustomSchema, Format, MindmapDocument, ParseError};
use mindmap_validator::{validate_document, ValidationResult};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Debouncing,
    Parsing,
    Validating,
    Published,
}

/// What consumers see after every parse
#[derive(Debug, Clone)]
pub struct Publication {
    /// Increases by one with every publication
    pub sequence: u64,

    /// Generation of the text this reflects
    pub generation: u64,

    /// The text that was parsed
    pub source: String,

    /// Latest good document and its index. After a failed parse this is
    /// the previous document.
    pub snapshot: Option<Snapshot>,

    pub parse_errors: Vec<ParseError>,

    pub validation: ValidationResult,
}

impl Publication {
    pub fn document(&self) -> Option<&Arc<MindmapDocument>> {
        self.snapshot.as_ref().map(|s| &s.document)
    }

    pub fn index(&self) -> Option<&mindmap_parser::NodeIndex> {
        self.snapshot.as_ref().map(|s| &s.index)
    }

    /// Whether `source` parsed
    pub fn parsed(&self) -> bool {
        self.parse_errors.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.parsed() && self.validation.valid
    }

    pub fn error_count(&self) -> usize {
        self.parse_errors.len() + self.validation.errors.len()
    }
}

/// Parse work for one generation
#[derive(Debug, Clone)]
pub struct ParseJob {
    pub generation: u64,
    pub source: String,
    pub format: Format,
}

impl ParseJob {
    pub fn run(self) -> ParseOutcome {
        let started = Instant::now();
        let result = parse(&self.source, self.format);
        tracing::debug!(
            generation = self.generation,
            format = %self.format,
            elapsed = ?started.elapsed(),
            "parsed text"
        );

        ParseOutcome {
            generation: self.generation,
            source: self.source,
            result,
        }
    }
}

#[derive(Debug)]
pub struct ParseOutcome {
    pub generation: u64,
    pub source: String,
    pub result: Result<Option<MindmapDocument>, Vec<ParseError>>,
}

/// Validation work for a freshly parsed document
#[derive(Debug, Clone)]
pub struct ValidateJob {
    pub generation: u64,
    pub source: String,
    pub document: Arc<MindmapDocument>,
    pub schema: Option<CustomSchema>,
}

impl ValidateJob {
    pub fn run(self) -> ValidateOutcome {
        let snapshot = Snapshot::new(self.document);
        let validation = validate_document(&snapshot.document, &snapshot.index, self.schema.as_ref());

        ValidateOutcome {
            generation: self.generation,
            source: self.source,
            snapshot,
            validation,
        }
    }
}

#[derive(Debug)]
pub struct ValidateOutcome {
    pub generation: u64,
    pub source: String,
    pub snapshot: Snapshot,
    pub validation: ValidationResult,
}

/// Result of feeding a parse outcome back
#[derive(Debug)]
pub enum ParseStep {
    /// A newer text has arrived since
    Stale,
    /// Nothing left to do; publish this
    Publish(Arc<Publication>),
    /// Run this, then call [`SyncState::validated`]
    Validate(ValidateJob),
}

/// Follow-up work after a schema change
#[derive(Debug)]
pub enum SchemaStep {
    /// The next parse will use the new schema
    Nothing,
    /// Restart the debounce window for the current text
    Debounce,
    /// Run this, then call [`SyncState::validated`]
    Validate(ValidateJob),
}

#[derive(Debug)]
pub struct SyncState {
    phase: SyncPhase,
    generation: u64,
    sequence: u64,
    /// Most recently accepted text, pending or published
    current: Option<String>,
    /// Accepted text waiting for the debounce window to close
    pending: bool,
    format: Format,
    /// Schema set by the host; wins over the one embedded in the document
    schema: Option<CustomSchema>,
    published: Option<Arc<Publication>>,
}

impl SyncState {
    pub fn new(format: Format) -> Self {
        Self {
            phase: SyncPhase::Idle,
            generation: 0,
            sequence: 0,
            current: None,
            pending: false,
            format,
            schema: None,
            published: None,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn published(&self) -> Option<&Arc<Publication>> {
        self.published.as_ref()
    }

    /// Accept new text. Returns false when it matches the text already
    /// pending or published, in which case nothing changes.
    pub fn text_changed(&mut self, text: String) -> bool {
        if self.current.as_deref() == Some(text.as_str()) {
            return false;
        }

        self.current = Some(text);
        self.restart();
        true
    }

    /// Replace the host schema. A published document is re-validated
    /// without parsing its text again; a parse still to come picks the new
    /// schema up on its own.
    pub fn set_schema(&mut self, schema: Option<CustomSchema>) -> SchemaStep {
        self.schema = schema;

        match self.phase {
            SyncPhase::Idle | SyncPhase::Debouncing | SyncPhase::Parsing => SchemaStep::Nothing,
            // the running validation captured the old schema
            SyncPhase::Validating => {
                self.restart();
                SchemaStep::Debounce
            }
            SyncPhase::Published => {
                let Some(publication) = self.published.clone() else {
                    return SchemaStep::Nothing;
                };
                let document = match &publication.snapshot {
                    Some(snapshot) if publication.parsed() => snapshot.document.clone(),
                    _ => return SchemaStep::Nothing,
                };

                self.generation += 1;
                self.phase = SyncPhase::Validating;
                SchemaStep::Validate(ValidateJob {
                    generation: self.generation,
                    source: publication.source.clone(),
                    schema: self.schema_for(&document),
                    document,
                })
            }
        }
    }

    fn schema_for(&self, document: &MindmapDocument) -> Option<CustomSchema> {
        self.schema.clone().or_else(|| document.schema.clone())
    }

    /// Switch formats and re-run the current text
    pub fn set_format(&mut self, format: Format) -> bool {
        if self.format == format {
            return false;
        }
        self.format = format;
        self.rerun()
    }

    fn rerun(&mut self) -> bool {
        if self.current.is_none() {
            return false;
        }
        self.restart();
        true
    }

    fn restart(&mut self) {
        self.generation += 1;
        self.pending = true;
        self.phase = SyncPhase::Debouncing;
    }

    /// The debounce window closed: hand out the parse for the pending text
    pub fn begin_parse(&mut self) -> Option<ParseJob> {
        if !self.pending {
            return None;
        }
        let source = self.current.clone()?;

        self.pending = false;
        self.phase = SyncPhase::Parsing;
        Some(ParseJob {
            generation: self.generation,
            source,
            format: self.format,
        })
    }

    /// Whether the latest publication reflects the accepted text
    pub fn is_settled(&self) -> bool {
        self.current.is_none()
            || self
                .published
                .as_ref()
                .is_some_and(|p| p.generation == self.generation)
    }

    /// Parse and validate the accepted text on the spot, superseding any
    /// debounce window or job in flight. Returns the publication when one
    /// was made.
    pub fn flush(&mut self) -> Option<Arc<Publication>> {
        if self.is_settled() {
            return None;
        }
        if !self.pending {
            self.restart();
        }

        let job = self.begin_parse()?;
        match self.parsed(job.run()) {
            ParseStep::Stale => None,
            ParseStep::Publish(publication) => Some(publication),
            ParseStep::Validate(job) => self.validated(job.run()),
        }
    }

    pub fn parsed(&mut self, outcome: ParseOutcome) -> ParseStep {
        if self.is_stale(outcome.generation) {
            return ParseStep::Stale;
        }

        match outcome.result {
            Ok(Some(document)) => {
                self.phase = SyncPhase::Validating;
                let schema = self.schema_for(&document);
                ParseStep::Validate(ValidateJob {
                    generation: outcome.generation,
                    source: outcome.source,
                    document: Arc::new(document),
                    schema,
                })
            }
            Ok(None) => ParseStep::Publish(self.publish(
                outcome.generation,
                outcome.source,
                None,
                Vec::new(),
                ValidationResult::ok(),
            )),
            Err(errors) => {
                tracing::warn!(
                    generation = outcome.generation,
                    errors = errors.len(),
                    "parse failed, keeping previous document"
                );
                let previous = self.published.as_ref().and_then(|p| p.snapshot.clone());
                ParseStep::Publish(self.publish(
                    outcome.generation,
                    outcome.source,
                    previous,
                    errors,
                    ValidationResult::ok(),
                ))
            }
        }
    }

    pub fn validated(&mut self, outcome: ValidateOutcome) -> Option<Arc<Publication>> {
        if self.is_stale(outcome.generation) {
            return None;
        }

        Some(self.publish(
            outcome.generation,
            outcome.source,
            Some(outcome.snapshot),
            Vec::new(),
            outcome.validation,
        ))
    }

    fn is_stale(&self, generation: u64) -> bool {
        if generation == self.generation {
            return false;
        }
        tracing::debug!(
            generation,
            current = self.generation,
            "dropping stale result"
        );
        true
    }

    fn publish(
        &mut self,
        generation: u64,
        source: String,
        snapshot: Option<Snapshot>,
        parse_errors: Vec<ParseError>,
        validation: ValidationResult,
    ) -> Arc<Publication> {
        self.sequence += 1;
        self.phase = SyncPhase::Published;

        let publication = Arc::new(Publication {
            sequence: self.sequence,
            generation,
            source,
            snapshot,
            parse_errors,
            validation,
        });
        tracing::info!(
            sequence = publication.sequence,
            generation,
            nodes = publication.document().map_or(0, |d| d.node_count()),
            errors = publication.error_count(),
            "published"
        );

        self.published = Some(publication.clone());
        publication
    }
}
