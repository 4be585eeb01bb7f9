//! # Sync Coordinator
//!
//! One actor task per open document. Hosts talk to it through a
//! [`SyncCoordinator`] handle; every request becomes a [`SyncEvent`] on a
//! single channel, so text edits, tree edits and parse completions are
//! handled one at a time in arrival order.
//!
//! Parsing and validation run on the blocking pool. Their results come
//! back as events carrying the generation they were started for, and the
//! [`SyncState`] drops any that a newer text has overtaken.

use crate::clock::{Clock, SystemClock};
use crate::errors::EditorError;
use crate::mutations::{Mutation, MutationError};
use crate::pipeline::{
    ParseOutcome, ParseStep, Publication, SchemaStep, SyncState, ValidateJob, ValidateOutcome,
};
use mindmap_parser::{serialize_like, CustomSchema, Format};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Coordinator settings
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Quiet period after the last text change before parsing
    pub debounce: Duration,
    pub format: Format,
}

impl SyncConfig {
    pub fn new(format: Format) -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            format,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(Format::default())
    }
}

/// Everything the actor reacts to
#[derive(Debug)]
pub enum SyncEvent {
    TextChanged(String),
    Mutate {
        mutation: Mutation,
        reply: oneshot::Sender<Result<String, EditorError>>,
    },
    SetSchema(Option<CustomSchema>),
    SetFormat(Format),
    ParseCompleted(ParseOutcome),
    ValidateCompleted(ValidateOutcome),
    Shutdown,
}

pub type PublicationReceiver = watch::Receiver<Option<Arc<Publication>>>;

/// Handle to a running coordinator. Cheap to clone; the actor stops when
/// the last handle is dropped or [`SyncCoordinator::shutdown`] is called.
#[derive(Debug, Clone)]
pub struct SyncCoordinator {
    events: mpsc::Sender<SyncEvent>,
    publications: PublicationReceiver,
}

impl SyncCoordinator {
    /// Start the actor on the current runtime. The receiver yields the
    /// text of every completed mutation for the host to persist.
    pub fn spawn(config: SyncConfig) -> (Self, mpsc::UnboundedReceiver<String>) {
        Self::spawn_with_clock(config, Arc::new(SystemClock))
    }

    pub fn spawn_with_clock(
        config: SyncConfig,
        clock: Arc<dyn Clock>,
    ) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (events_tx, events_rx) = mpsc::channel(100);
        let (publish_tx, publish_rx) = watch::channel(None);
        let (writeback_tx, writeback_rx) = mpsc::unbounded_channel();

        let actor = CoordinatorActor {
            state: SyncState::new(config.format),
            debounce: config.debounce,
            deadline: None,
            events: events_rx,
            completions: events_tx.downgrade(),
            publish: publish_tx,
            writeback: writeback_tx,
            clock,
        };
        tokio::spawn(actor.run());

        let handle = Self {
            events: events_tx,
            publications: publish_rx,
        };
        (handle, writeback_rx)
    }

    /// Report new text from the host
    pub async fn text_changed(&self, text: impl Into<String>) -> Result<(), EditorError> {
        self.events.send(SyncEvent::TextChanged(text.into())).await?;
        Ok(())
    }

    /// Apply a tree edit to the published document and return the new text
    pub async fn mutate(&self, mutation: Mutation) -> Result<String, EditorError> {
        let (reply, response) = oneshot::channel();
        self.events.send(SyncEvent::Mutate { mutation, reply }).await?;
        response.await?
    }

    /// Set the schema to validate against; `None` falls back to the
    /// document's own schema
    pub async fn set_schema(&self, schema: Option<CustomSchema>) -> Result<(), EditorError> {
        self.events.send(SyncEvent::SetSchema(schema)).await?;
        Ok(())
    }

    pub async fn set_format(&self, format: Format) -> Result<(), EditorError> {
        self.events.send(SyncEvent::SetFormat(format)).await?;
        Ok(())
    }

    pub async fn shutdown(&self) -> Result<(), EditorError> {
        self.events.send(SyncEvent::Shutdown).await?;
        Ok(())
    }

    pub fn subscribe(&self) -> PublicationReceiver {
        self.publications.clone()
    }

    /// Most recent publication, if any
    pub fn latest(&self) -> Option<Arc<Publication>> {
        self.publications.borrow().clone()
    }
}

struct CoordinatorActor {
    state: SyncState,
    debounce: Duration,
    /// When the pending text should be parsed
    deadline: Option<Instant>,
    events: mpsc::Receiver<SyncEvent>,
    /// Weak so the channel closes once every handle is gone
    completions: mpsc::WeakSender<SyncEvent>,
    publish: watch::Sender<Option<Arc<Publication>>>,
    writeback: mpsc::UnboundedSender<String>,
    clock: Arc<dyn Clock>,
}

impl CoordinatorActor {
    async fn run(mut self) {
        loop {
            let deadline = self.deadline;

            tokio::select! {
                biased;

                event = self.events.recv() => {
                    let Some(event) = event else {
                        break;
                    };
                    if self.handle_event(event) {
                        break;
                    }
                }

                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.deadline = None;
                    self.start_parse();
                }
            }
        }

        tracing::debug!("sync coordinator stopped");
    }

    /// Returns true when the actor should stop
    fn handle_event(&mut self, event: SyncEvent) -> bool {
        match event {
            SyncEvent::TextChanged(text) => {
                if self.state.text_changed(text) {
                    self.schedule();
                }
            }
            SyncEvent::Mutate { mutation, reply } => {
                let result = self.mutate(&mutation);
                if let Err(e) = &result {
                    tracing::debug!(target_id = mutation.target(), error = %e, "mutation rejected");
                }
                let _ = reply.send(result);
            }
            SyncEvent::SetSchema(schema) => match self.state.set_schema(schema) {
                SchemaStep::Nothing => {}
                SchemaStep::Debounce => self.schedule(),
                SchemaStep::Validate(job) => self.start_validate(job),
            },
            SyncEvent::SetFormat(format) => {
                if self.state.set_format(format) {
                    self.schedule();
                }
            }
            SyncEvent::ParseCompleted(outcome) => match self.state.parsed(outcome) {
                ParseStep::Stale => {}
                ParseStep::Publish(publication) => self.publish(publication),
                ParseStep::Validate(job) => self.start_validate(job),
            },
            SyncEvent::ValidateCompleted(outcome) => {
                if let Some(publication) = self.state.validated(outcome) {
                    self.publish(publication);
                }
            }
            SyncEvent::Shutdown => return true,
        }

        false
    }

    /// (Re)start the debounce window
    fn schedule(&mut self) {
        self.deadline = Some(Instant::now() + self.debounce);
    }

    fn start_parse(&mut self) {
        let Some(job) = self.state.begin_parse() else {
            return;
        };

        let completions = self.completions.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = job.run();
            if let Some(tx) = completions.upgrade() {
                let _ = tx.blocking_send(SyncEvent::ParseCompleted(outcome));
            }
        });
    }

    fn start_validate(&self, job: ValidateJob) {
        let completions = self.completions.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = job.run();
            if let Some(tx) = completions.upgrade() {
                let _ = tx.blocking_send(SyncEvent::ValidateCompleted(outcome));
            }
        });
    }

    fn publish(&mut self, publication: Arc<Publication>) {
        self.publish.send_replace(Some(publication));
    }

    /// Edit the tree of the newest accepted text, then treat the result
    /// like a host edit. Text still inside the debounce window is parsed
    /// first so earlier edits are never overwritten.
    fn mutate(&mut self, mutation: &Mutation) -> Result<String, EditorError> {
        if let Some(publication) = self.state.flush() {
            self.deadline = None;
            self.publish(publication);
        }

        let publication = self
            .state
            .published()
            .cloned()
            .ok_or(MutationError::NoDocument)?;
        if !publication.parsed() {
            return Err(MutationError::TextHasErrors.into());
        }
        let snapshot = publication.snapshot.as_ref().ok_or(MutationError::NoDocument)?;

        let document = mutation.apply(snapshot, self.clock.as_ref())?;
        let text = serialize_like(&document, self.state.format(), Some(&publication.source))?;

        if self.state.text_changed(text.clone()) {
            self.schedule();
        }
        if self.writeback.send(text.clone()).is_err() {
            tracing::debug!("write-back receiver dropped");
        }

        Ok(text)
    }
}
