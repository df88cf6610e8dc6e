use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;

use crate::{
    api::{Comment, CommentId, CommentPatch, NewComment, User},
    CommentTree, Config, Error, Query, QueryState, Remote, ResourceKey, Write,
};

/// Caching layer in front of the remote data store.
///
/// Queries are cached per resource key and deduplicated while in flight.
/// Mutations never touch the cache directly: on success they invalidate the
/// comments and wait for the refetch, on failure they leave it alone.
pub struct SyncClient<R> {
    remote: Arc<R>,
    comments: Query<CommentTree>,
    user: Query<User>,
}

impl<R: Remote> SyncClient<R> {
    pub fn new(remote: R, config: &Config) -> SyncClient<R> {
        SyncClient {
            remote: Arc::new(remote),
            comments: Query::new(ResourceKey::Comments, config.max_age),
            user: Query::new(ResourceKey::CurrentUser, config.max_age),
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// The comment list, in canonical order
    pub async fn fetch_comments(&self) -> Result<Arc<CommentTree>, Arc<Error>> {
        let remote = self.remote.clone();
        self.comments
            .get(move || async move {
                let comments = remote.fetch_comments().await?;
                Ok(CommentTree::from_response(comments, Utc::now()))
            })
            .await
    }

    pub async fn fetch_user(&self) -> Result<Arc<User>, Arc<Error>> {
        let remote = self.remote.clone();
        self.user
            .get(move || async move { remote.fetch_user().await })
            .await
    }

    pub fn subscribe_comments(&self) -> watch::Receiver<QueryState<CommentTree>> {
        self.comments.subscribe()
    }

    pub fn subscribe_user(&self) -> watch::Receiver<QueryState<User>> {
        self.user.subscribe()
    }

    pub fn cached_comments(&self) -> Option<Arc<CommentTree>> {
        self.comments.cached()
    }

    pub fn invalidate(&self, key: ResourceKey) {
        match key {
            ResourceKey::Comments => self.comments.invalidate(),
            ResourceKey::CurrentUser => self.user.invalidate(),
        }
    }

    pub async fn create_comment(&self, comment: NewComment) -> Result<Comment, Error> {
        let created = self.remote.create_comment(comment).await?;
        tracing::info!(id = %created.id, "created comment");
        self.refresh_after_mutation().await;
        Ok(created)
    }

    pub async fn delete_comment(&self, id: CommentId) -> Result<(), Error> {
        self.remote.delete_comment(id).await?;
        tracing::info!(%id, "deleted comment");
        self.refresh_after_mutation().await;
        Ok(())
    }

    pub async fn patch_comment(&self, id: CommentId, patch: CommentPatch) -> Result<Comment, Error> {
        let patched = self.remote.patch_comment(id, patch).await?;
        tracing::info!(%id, "patched comment");
        self.refresh_after_mutation().await;
        Ok(patched)
    }

    pub async fn write(&self, write: Write) -> Result<(), Error> {
        match write {
            Write::Create(c) => self.create_comment(c).await.map(|_| ()),
            Write::Delete(id) => self.delete_comment(id).await,
            Write::Patch(id, patch) => self.patch_comment(id, patch).await.map(|_| ()),
        }
    }

    async fn refresh_after_mutation(&self) {
        self.comments.invalidate();
        // a failure here is already logged by the query, and the last good
        // value stays available
        let _ = self.fetch_comments().await;
    }
}
