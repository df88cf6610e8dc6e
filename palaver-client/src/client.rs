use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    api::User, CommentTree, Config, Error, Intent, LogNotifier, Notification, Notifier,
    QueryState, Remote, Session, Stamp, SubmitError, SyncClient,
};

/// Entry point for a presentation layer: read the comments, submit intents.
///
/// Every submitted intent that reaches the network ends with exactly one
/// notification, success or failure.
pub struct Client<R> {
    sync: SyncClient<R>,
    notifier: Box<dyn Notifier>,
}

impl<R: Remote> Client<R> {
    pub fn new(remote: R, config: &Config) -> Client<R> {
        Client::with_notifier(remote, config, LogNotifier)
    }

    pub fn with_notifier(remote: R, config: &Config, notifier: impl 'static + Notifier) -> Client<R> {
        Client {
            sync: SyncClient::new(remote, config),
            notifier: Box::new(notifier),
        }
    }

    pub fn sync(&self) -> &SyncClient<R> {
        &self.sync
    }

    pub async fn comments(&self) -> Result<Arc<CommentTree>, Arc<Error>> {
        self.sync.fetch_comments().await
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<CommentTree>> {
        self.sync.subscribe_comments()
    }

    pub async fn current_user(&self) -> Result<Arc<User>, Arc<Error>> {
        self.sync.fetch_user().await
    }

    /// Session of the store's current user
    pub async fn session(&self) -> Result<Session, Arc<Error>> {
        Ok(Session::new(User::clone(&*self.current_user().await?)))
    }

    pub async fn submit(&self, session: &Session, intent: Intent) -> Result<(), SubmitError> {
        self.submit_stamped(session, intent, Stamp::now()).await
    }

    /// Like [`Client::submit`], with the values new records get stamped with
    pub async fn submit_stamped(
        &self,
        session: &Session,
        intent: Intent,
        stamp: Stamp,
    ) -> Result<(), SubmitError> {
        let kind = intent.kind();
        // content is checked before anything, so invalid input never costs a request
        intent.validate()?;
        let tree = match intent {
            // a new comment only needs the session
            Intent::AddComment { .. } => Arc::new(CommentTree::default()),
            _ => match self.sync.fetch_comments().await {
                Ok(tree) => tree,
                Err(e) => {
                    self.notifier.notify(Notification::failure(kind));
                    return Err(SubmitError::Load(e));
                }
            },
        };
        let write = intent.compute(&tree, session, stamp).map_err(|e| {
            tracing::debug!(%kind, %e, "intent rejected");
            e
        })?;
        match self.sync.write(write).await {
            Ok(()) => {
                self.notifier.notify(Notification::success(kind));
                Ok(())
            }
            Err(source) => {
                tracing::warn!(%kind, %source, "intent failed");
                self.notifier.notify(Notification::failure(kind));
                Err(SubmitError::Write { kind, source })
            }
        }
    }
}
