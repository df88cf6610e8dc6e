use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::{
    api::{self, Comment, CommentId, CommentPatch, NewComment, User},
    Error,
};

/// Access to the remote data store
#[async_trait]
pub trait Remote: 'static + Send + Sync {
    async fn fetch_comments(&self) -> Result<Vec<Comment>, Error>;
    async fn fetch_user(&self) -> Result<User, Error>;
    async fn create_comment(&self, comment: NewComment) -> Result<Comment, Error>;
    async fn delete_comment(&self, id: CommentId) -> Result<(), Error>;
    async fn patch_comment(&self, id: CommentId, patch: CommentPatch) -> Result<Comment, Error>;
}

#[async_trait]
impl<R: Remote> Remote for Arc<R> {
    async fn fetch_comments(&self) -> Result<Vec<Comment>, Error> {
        (**self).fetch_comments().await
    }

    async fn fetch_user(&self) -> Result<User, Error> {
        (**self).fetch_user().await
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, Error> {
        (**self).create_comment(comment).await
    }

    async fn delete_comment(&self, id: CommentId) -> Result<(), Error> {
        (**self).delete_comment(id).await
    }

    async fn patch_comment(&self, id: CommentId, patch: CommentPatch) -> Result<Comment, Error> {
        (**self).patch_comment(id, patch).await
    }
}

/// The store as served over REST
#[derive(Clone, Debug)]
pub struct HttpRemote {
    client: reqwest::Client,
    host: String,
}

impl HttpRemote {
    pub fn new(host: impl Into<String>) -> HttpRemote {
        HttpRemote::with_client(reqwest::Client::new(), host)
    }

    pub fn with_client(client: reqwest::Client, host: impl Into<String>) -> HttpRemote {
        let mut host = host.into();
        while host.ends_with('/') {
            host.pop();
        }
        HttpRemote { client, host }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn comments_url(&self) -> String {
        format!("{}/comments", self.host)
    }

    fn comment_url(&self, id: CommentId) -> String {
        format!("{}/comments/{}", self.host, id)
    }

    /// Sends the request, turning non-2xx answers into errors
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Vec<u8>, Error> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            tracing::debug!(%status, "store answered with an error");
            return Err(match api::Error::parse(&body) {
                Ok(err) => Error::Api(err),
                Err(_) => Error::Status(status.as_u16()),
            });
        }
        Ok(body.to_vec())
    }

    async fn send_json<R: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<R, Error> {
        let body = self.send(req).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl Remote for HttpRemote {
    async fn fetch_comments(&self) -> Result<Vec<Comment>, Error> {
        self.send_json(self.client.get(self.comments_url())).await
    }

    async fn fetch_user(&self) -> Result<User, Error> {
        self.send_json(self.client.get(format!("{}/currentUser", self.host)))
            .await
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, Error> {
        self.send_json(self.client.post(self.comments_url()).json(&comment))
            .await
    }

    async fn delete_comment(&self, id: CommentId) -> Result<(), Error> {
        // the body of a successful deletion carries nothing of interest
        self.send(self.client.delete(self.comment_url(id))).await?;
        Ok(())
    }

    async fn patch_comment(&self, id: CommentId, patch: CommentPatch) -> Result<Comment, Error> {
        self.send_json(self.client.patch(self.comment_url(id)).json(&patch))
            .await
    }
}
