use std::{fmt, str::FromStr};

use uuid::Uuid;

use crate::{DisplayDate, User};

/// Identifier of a top-level comment, assigned by the store
#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentId(pub u64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CommentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<CommentId, Self::Err> {
        Ok(CommentId(s.parse()?))
    }
}

/// Identifier of a reply, generated client-side.
///
/// Replies created by this crate always carry a textual uuid, but seeded
/// stores are known to use plain numbers, so both are kept as-is.
#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum ReplyId {
    Number(u64),
    Text(String),
}

impl ReplyId {
    pub fn generate() -> ReplyId {
        ReplyId::Text(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ReplyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyId::Number(n) => n.fmt(f),
            ReplyId::Text(t) => t.fmt(f),
        }
    }
}

impl FromStr for ReplyId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<ReplyId, Self::Err> {
        Ok(match s.parse() {
            Ok(n) => ReplyId::Number(n),
            Err(_) => ReplyId::Text(String::from(s)),
        })
    }
}

impl From<&str> for ReplyId {
    fn from(s: &str) -> ReplyId {
        ReplyId::Text(String::from(s))
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub created_at: DisplayDate,
    pub score: u64,
    pub user: User,

    /// Direct replies and replies-to-replies, all flattened in here
    #[serde(default)]
    pub replies: Vec<Reply>,
}

impl Comment {
    pub fn reply(&self, id: &ReplyId) -> Option<&Reply> {
        self.replies.iter().find(|r| r.id == *id)
    }
}

/// A comment as submitted for creation, before the store assigned it an id
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: String,
    pub created_at: DisplayDate,
    pub score: u64,
    pub user: User,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

impl NewComment {
    pub fn new(user: User, content: String, created_at: DisplayDate) -> NewComment {
        NewComment {
            content,
            created_at,
            score: 0,
            user,
            replies: Vec::new(),
        }
    }

    pub fn with_id(self, id: CommentId) -> Comment {
        Comment {
            id,
            content: self.content,
            created_at: self.created_at,
            score: self.score,
            user: self.user,
            replies: self.replies,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: ReplyId,
    pub content: String,
    pub created_at: DisplayDate,
    pub score: u64,

    /// Username of the author this reply answers, frozen at creation
    pub replying_to: String,
    pub user: User,
}
