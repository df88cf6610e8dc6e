use anyhow::{anyhow, Context};
use serde_json::json;

use crate::CommentId;

/// Errors the store reports back to clients
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Comment {0} not found")]
    CommentNotFound(CommentId),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::CommentNotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::CommentNotFound(id) => json!({
                "message": "comment not found",
                "type": "not-found",
                "id": id,
            }),
            Error::InvalidBody(msg) => json!({
                "message": msg,
                "type": "invalid-body",
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let message = || {
            String::from(
                data.get("message")
                    .and_then(|msg| msg.as_str())
                    .unwrap_or(""),
            )
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(message()),
                "not-found" => Error::CommentNotFound(CommentId(
                    data.get("id")
                        .and_then(|id| id.as_u64())
                        .ok_or_else(|| anyhow!("error is a not-found without a proper id"))?,
                )),
                "invalid-body" => Error::InvalidBody(message()),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}
