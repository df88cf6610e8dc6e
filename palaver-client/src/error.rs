use std::sync::Arc;

use crate::{
    api::{self, CommentId, ContentError, ReplyId},
    IntentKind,
};

/// Failure talking to the remote data store
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] api::Error),

    #[error("server answered with status {0}")]
    Status(u16),

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed decoding server response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// An intent that was refused locally, before reaching the network
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum IntentError {
    #[error(transparent)]
    InvalidContent(#[from] ContentError),

    #[error("comment {0} not found")]
    CommentNotFound(CommentId),

    #[error("reply {1} not found in comment {0}")]
    ReplyNotFound(CommentId, ReplyId),

    #[error("{session} is not allowed to modify content written by {author}")]
    PermissionDenied { session: String, author: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Rejected(#[from] IntentError),

    #[error("could not load comments: {0}")]
    Load(Arc<Error>),

    #[error("{kind} failed: {source}")]
    Write {
        kind: IntentKind,
        #[source]
        source: Error,
    },
}

impl From<ContentError> for SubmitError {
    fn from(e: ContentError) -> SubmitError {
        SubmitError::Rejected(IntentError::InvalidContent(e))
    }
}
