use std::collections::HashMap;

use crate::{
    api::{Comment, CommentId, Reply, ReplyId, Time},
    OrderExt,
};

/// Read-side view of the comment list, in canonical order, with keyed lookups
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommentTree {
    comments: Vec<Comment>,
    by_id: HashMap<CommentId, usize>,
    replies: HashMap<(CommentId, ReplyId), usize>,
}

impl CommentTree {
    /// Builds the tree from a store response, applying the canonical order
    pub fn from_response(mut comments: Vec<Comment>, now: Time) -> CommentTree {
        comments.sort_canonical(now);
        CommentTree::from_sorted(comments)
    }

    /// Builds the tree keeping `comments` in the given order
    pub fn from_sorted(comments: Vec<Comment>) -> CommentTree {
        let mut by_id = HashMap::with_capacity(comments.len());
        let mut replies = HashMap::new();
        for (i, c) in comments.iter().enumerate() {
            // on duplicate ids, the first one in order is the one found, and
            // the others' replies are unreachable
            if by_id.contains_key(&c.id) {
                continue;
            }
            by_id.insert(c.id, i);
            for (j, r) in c.replies.iter().enumerate() {
                replies.entry((c.id, r.id.clone())).or_insert(j);
            }
        }
        CommentTree {
            comments,
            by_id,
            replies,
        }
    }

    pub fn find_comment(&self, id: CommentId) -> Option<&Comment> {
        self.by_id.get(&id).map(|&i| &self.comments[i])
    }

    /// Finds a reply, only if it is part of the given comment's replies
    pub fn find_reply(&self, comment: CommentId, reply: &ReplyId) -> Option<&Reply> {
        let c = self.find_comment(comment)?;
        self.replies
            .get(&(comment, reply.clone()))
            .map(|&j| &c.replies[j])
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Comment> {
        self.comments.iter()
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

impl<'a> IntoIterator for &'a CommentTree {
    type Item = &'a Comment;
    type IntoIter = std::slice::Iter<'a, Comment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
