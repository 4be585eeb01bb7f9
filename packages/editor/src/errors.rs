//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] mindmap_parser::SerializeError),

    #[error("Sync coordinator has shut down")]
    ChannelClosed,
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for EditorError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        EditorError::ChannelClosed
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for EditorError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        EditorError::ChannelClosed
    }
}
