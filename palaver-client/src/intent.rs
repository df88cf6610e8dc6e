use std::fmt;

use crate::{
    api::{
        validate_content, Comment, CommentId, CommentPatch, ContentError, DisplayDate, NewComment,
        Reply, ReplyId,
    },
    CommentTree, IntentError, Session,
};

pub fn upvote(score: u64) -> u64 {
    score.saturating_add(1)
}

/// Votes never bring a score below zero
pub fn downvote(score: u64) -> u64 {
    score.saturating_sub(1)
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IntentKind {
    AddComment,
    AddReply,
    AddNestedReply,
    EditComment,
    EditReply,
    DeleteComment,
    DeleteReply,
    UpvoteComment,
    DownvoteComment,
    UpvoteReply,
    DownvoteReply,
}

impl IntentKind {
    /// What the intent's content is, as named in user-facing messages
    pub fn subject(self) -> &'static str {
        match self {
            IntentKind::AddComment
            | IntentKind::EditComment
            | IntentKind::DeleteComment
            | IntentKind::UpvoteComment
            | IntentKind::DownvoteComment => "Comment",
            IntentKind::AddReply
            | IntentKind::AddNestedReply
            | IntentKind::EditReply
            | IntentKind::DeleteReply
            | IntentKind::UpvoteReply
            | IntentKind::DownvoteReply => "Reply",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            IntentKind::AddComment => "Comment successfully added",
            IntentKind::AddReply | IntentKind::AddNestedReply => "Reply successfully added",
            IntentKind::EditComment => "Comment updated successfully",
            IntentKind::EditReply => "Reply updated successfully",
            IntentKind::DeleteComment => "Comment successfully deleted",
            IntentKind::DeleteReply => "Reply successfully deleted",
            IntentKind::UpvoteComment => "Comment upvoted",
            IntentKind::DownvoteComment => "Comment downvoted",
            IntentKind::UpvoteReply => "Reply upvoted",
            IntentKind::DownvoteReply => "Reply downvoted",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            IntentKind::AddComment => "There was an error when trying to add the comment",
            IntentKind::AddReply | IntentKind::AddNestedReply => {
                "There was an error when trying to add the reply"
            }
            IntentKind::EditComment => "There was an error when trying to update the comment",
            IntentKind::EditReply => "There was an error when trying to update the reply",
            IntentKind::DeleteComment => "There was an error when trying to delete the comment",
            IntentKind::DeleteReply => "There was an error when trying to delete the reply",
            IntentKind::UpvoteComment => "There was an error when trying to upvote the comment",
            IntentKind::DownvoteComment => {
                "There was an error when trying to downvote the comment"
            }
            IntentKind::UpvoteReply => "There was an error when trying to upvote the reply",
            IntentKind::DownvoteReply => "There was an error when trying to downvote the reply",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IntentKind::AddComment => "add comment",
            IntentKind::AddReply => "add reply",
            IntentKind::AddNestedReply => "add nested reply",
            IntentKind::EditComment => "edit comment",
            IntentKind::EditReply => "edit reply",
            IntentKind::DeleteComment => "delete comment",
            IntentKind::DeleteReply => "delete reply",
            IntentKind::UpvoteComment => "upvote comment",
            IntentKind::DownvoteComment => "downvote comment",
            IntentKind::UpvoteReply => "upvote reply",
            IntentKind::DownvoteReply => "downvote reply",
        })
    }
}

/// A user action against the comment list
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Intent {
    AddComment {
        content: String,
    },
    AddReply {
        comment: CommentId,
        content: String,
    },
    /// Reply to a reply; lands flattened in the same comment's replies
    AddNestedReply {
        comment: CommentId,
        reply: ReplyId,
        content: String,
    },
    EditComment {
        comment: CommentId,
        content: String,
    },
    EditReply {
        comment: CommentId,
        reply: ReplyId,
        content: String,
    },
    DeleteComment {
        comment: CommentId,
    },
    DeleteReply {
        comment: CommentId,
        reply: ReplyId,
    },
    UpvoteComment {
        comment: CommentId,
    },
    DownvoteComment {
        comment: CommentId,
    },
    UpvoteReply {
        comment: CommentId,
        reply: ReplyId,
    },
    DownvoteReply {
        comment: CommentId,
        reply: ReplyId,
    },
}

/// Values an intent stamps on the records it creates
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stamp {
    pub date: DisplayDate,
    pub reply_id: ReplyId,
}

impl Stamp {
    pub fn now() -> Stamp {
        Stamp {
            date: DisplayDate::today(),
            reply_id: ReplyId::generate(),
        }
    }
}

/// What an intent submits to the store
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Write {
    Create(NewComment),
    Delete(CommentId),
    Patch(CommentId, CommentPatch),
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::AddComment { .. } => IntentKind::AddComment,
            Intent::AddReply { .. } => IntentKind::AddReply,
            Intent::AddNestedReply { .. } => IntentKind::AddNestedReply,
            Intent::EditComment { .. } => IntentKind::EditComment,
            Intent::EditReply { .. } => IntentKind::EditReply,
            Intent::DeleteComment { .. } => IntentKind::DeleteComment,
            Intent::DeleteReply { .. } => IntentKind::DeleteReply,
            Intent::UpvoteComment { .. } => IntentKind::UpvoteComment,
            Intent::DownvoteComment { .. } => IntentKind::DownvoteComment,
            Intent::UpvoteReply { .. } => IntentKind::UpvoteReply,
            Intent::DownvoteReply { .. } => IntentKind::DownvoteReply,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Intent::AddComment { content }
            | Intent::AddReply { content, .. }
            | Intent::AddNestedReply { content, .. }
            | Intent::EditComment { content, .. }
            | Intent::EditReply { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Checks the content preconditions, which need no state at all
    pub fn validate(&self) -> Result<(), ContentError> {
        match self.content() {
            Some(content) => validate_content(content),
            None => Ok(()),
        }
    }

    /// Computes the write this intent performs against the current comments
    pub fn compute(
        &self,
        tree: &CommentTree,
        session: &Session,
        stamp: Stamp,
    ) -> Result<Write, IntentError> {
        self.validate()?;
        Ok(match self {
            Intent::AddComment { content } => Write::Create(NewComment::new(
                session.user().clone(),
                content.clone(),
                stamp.date,
            )),
            Intent::AddReply { comment, content } => {
                let c = find_comment(tree, *comment)?;
                let replying_to = c.user.username.clone();
                append_reply(c, session, stamp, content, replying_to)
            }
            Intent::AddNestedReply {
                comment,
                reply,
                content,
            } => {
                let c = find_comment(tree, *comment)?;
                let replying_to = find_reply(tree, *comment, reply)?.user.username.clone();
                append_reply(c, session, stamp, content, replying_to)
            }
            Intent::EditComment { comment, content } => {
                let c = find_comment(tree, *comment)?;
                session.check_owns(&c.user)?;
                Write::Patch(c.id, CommentPatch::content(content.clone()))
            }
            Intent::EditReply {
                comment,
                reply,
                content,
            } => {
                let c = find_comment(tree, *comment)?;
                session.check_owns(&find_reply(tree, *comment, reply)?.user)?;
                let replies = c
                    .replies
                    .iter()
                    .map(|r| match r.id == *reply {
                        true => Reply {
                            content: content.clone(),
                            ..r.clone()
                        },
                        false => r.clone(),
                    })
                    .collect();
                Write::Patch(c.id, CommentPatch::replies(replies))
            }
            Intent::DeleteComment { comment } => {
                let c = find_comment(tree, *comment)?;
                session.check_owns(&c.user)?;
                Write::Delete(c.id)
            }
            Intent::DeleteReply { comment, reply } => {
                let c = find_comment(tree, *comment)?;
                session.check_owns(&find_reply(tree, *comment, reply)?.user)?;
                let replies = c
                    .replies
                    .iter()
                    .filter(|r| r.id != *reply)
                    .cloned()
                    .collect();
                Write::Patch(c.id, CommentPatch::replies(replies))
            }
            Intent::UpvoteComment { comment } => {
                let c = find_comment(tree, *comment)?;
                Write::Patch(c.id, CommentPatch::score(upvote(c.score)))
            }
            Intent::DownvoteComment { comment } => {
                let c = find_comment(tree, *comment)?;
                Write::Patch(c.id, CommentPatch::score(downvote(c.score)))
            }
            Intent::UpvoteReply { comment, reply } => vote_reply(tree, *comment, reply, upvote)?,
            Intent::DownvoteReply { comment, reply } => {
                vote_reply(tree, *comment, reply, downvote)?
            }
        })
    }
}

fn find_comment(tree: &CommentTree, id: CommentId) -> Result<&Comment, IntentError> {
    tree.find_comment(id)
        .ok_or(IntentError::CommentNotFound(id))
}

fn find_reply<'a>(
    tree: &'a CommentTree,
    comment: CommentId,
    reply: &ReplyId,
) -> Result<&'a Reply, IntentError> {
    tree.find_reply(comment, reply)
        .ok_or_else(|| IntentError::ReplyNotFound(comment, reply.clone()))
}

fn append_reply(
    c: &Comment,
    session: &Session,
    stamp: Stamp,
    content: &str,
    replying_to: String,
) -> Write {
    let mut replies = c.replies.clone();
    replies.push(Reply {
        id: stamp.reply_id,
        content: String::from(content),
        created_at: stamp.date,
        score: 0,
        replying_to,
        user: session.user().clone(),
    });
    Write::Patch(c.id, CommentPatch::replies(replies))
}

/// Reply votes resubmit the whole comment record
fn vote_reply(
    tree: &CommentTree,
    comment: CommentId,
    reply: &ReplyId,
    vote: fn(u64) -> u64,
) -> Result<Write, IntentError> {
    find_reply(tree, comment, reply)?;
    let mut c = find_comment(tree, comment)?.clone();
    for r in c.replies.iter_mut().filter(|r| r.id == *reply) {
        r.score = vote(r.score);
    }
    Ok(Write::Patch(c.id, CommentPatch::full(c)))
}
