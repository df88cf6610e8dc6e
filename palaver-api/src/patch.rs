use crate::{Comment, CommentId, DisplayDate, Reply, User};

/// Body of a `PATCH /comments/{id}`.
///
/// Only the fields that are set get serialized, and the store merges exactly
/// those into the existing record.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPatch {
    /// Sent along with full-record patches, never applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CommentId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DisplayDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replies: Option<Vec<Reply>>,
}

impl CommentPatch {
    pub fn content(content: String) -> CommentPatch {
        CommentPatch {
            content: Some(content),
            ..CommentPatch::default()
        }
    }

    pub fn score(score: u64) -> CommentPatch {
        CommentPatch {
            score: Some(score),
            ..CommentPatch::default()
        }
    }

    pub fn replies(replies: Vec<Reply>) -> CommentPatch {
        CommentPatch {
            replies: Some(replies),
            ..CommentPatch::default()
        }
    }

    pub fn full(comment: Comment) -> CommentPatch {
        CommentPatch {
            id: Some(comment.id),
            content: Some(comment.content),
            created_at: Some(comment.created_at),
            score: Some(comment.score),
            user: Some(comment.user),
            replies: Some(comment.replies),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.created_at.is_none()
            && self.score.is_none()
            && self.user.is_none()
            && self.replies.is_none()
    }

    pub fn apply_to(self, comment: &mut Comment) {
        if let Some(content) = self.content {
            comment.content = content;
        }
        if let Some(created_at) = self.created_at {
            comment.created_at = created_at;
        }
        if let Some(score) = self.score {
            comment.score = score;
        }
        if let Some(user) = self.user {
            comment.user = user;
        }
        if let Some(replies) = self.replies {
            comment.replies = replies;
        }
    }
}
