use std::sync::Arc;

use async_trait::async_trait;
use palaver_client::{
    api::{Comment, CommentId, CommentPatch, Error, NewComment, User},
    Remote,
};
use parking_lot::Mutex;

/// In-memory remote data store, recording every request it receives
#[derive(Clone)]
pub struct MockServer(Arc<Mutex<MockDb>>);

#[derive(Debug)]
struct MockDb {
    current_user: User,
    // store order, the way the real store keeps them
    comments: Vec<Comment>,
    requests: Vec<Request>,
    fail_next: usize,
    fail_nth: Option<usize>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Request {
    FetchComments,
    FetchUser,
    CreateComment(NewComment),
    DeleteComment(CommentId),
    PatchComment(CommentId, CommentPatch),
}

impl MockDb {
    fn receive(&mut self, req: Request) -> Result<(), Error> {
        tracing::trace!(?req, "mock server received request");
        self.requests.push(req);
        match self.fail_nth.take() {
            Some(0) => return Err(Error::Unknown(String::from("injected failure"))),
            Some(n) => self.fail_nth = Some(n - 1),
            None => (),
        }
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(Error::Unknown(String::from("injected failure")));
        }
        Ok(())
    }

    fn position(&self, id: CommentId) -> Result<usize, Error> {
        self.comments
            .iter()
            .position(|c| c.id == id)
            .ok_or(Error::CommentNotFound(id))
    }
}

impl MockServer {
    pub fn new(current_user: User) -> MockServer {
        MockServer(Arc::new(Mutex::new(MockDb {
            current_user,
            comments: Vec::new(),
            requests: Vec::new(),
            fail_next: 0,
            fail_nth: None,
        })))
    }

    pub fn with_comments(self, comments: Vec<Comment>) -> MockServer {
        self.0.lock().comments = comments;
        self
    }

    /// All requests received so far, in order
    pub fn test_requests(&self) -> Vec<Request> {
        self.0.lock().requests.clone()
    }

    pub fn test_num_requests(&self) -> usize {
        self.0.lock().requests.len()
    }

    pub fn test_clear_requests(&self) {
        self.0.lock().requests.clear();
    }

    /// Make the next `n` requests fail, without touching the stored data
    pub fn test_fail_next(&self, n: usize) {
        self.0.lock().fail_next = n;
    }

    /// Make only the request `n` places from now fail, 0 being the next one
    pub fn test_fail_nth(&self, n: usize) {
        self.0.lock().fail_nth = Some(n);
    }

    /// Stored comments, in store order
    pub fn test_comments(&self) -> Vec<Comment> {
        self.0.lock().comments.clone()
    }

    pub fn list_comments(&self) -> Result<Vec<Comment>, Error> {
        let mut db = self.0.lock();
        db.receive(Request::FetchComments)?;
        Ok(db.comments.clone())
    }

    pub fn current_user(&self) -> Result<User, Error> {
        let mut db = self.0.lock();
        db.receive(Request::FetchUser)?;
        Ok(db.current_user.clone())
    }

    pub fn post_comment(&self, c: NewComment) -> Result<Comment, Error> {
        let mut db = self.0.lock();
        db.receive(Request::CreateComment(c.clone()))?;
        let id = CommentId(db.comments.iter().map(|c| c.id.0).max().unwrap_or(0) + 1);
        let c = c.with_id(id);
        db.comments.push(c.clone());
        Ok(c)
    }

    pub fn remove_comment(&self, id: CommentId) -> Result<(), Error> {
        let mut db = self.0.lock();
        db.receive(Request::DeleteComment(id))?;
        let pos = db.position(id)?;
        db.comments.remove(pos);
        Ok(())
    }

    pub fn update_comment(&self, id: CommentId, patch: CommentPatch) -> Result<Comment, Error> {
        let mut db = self.0.lock();
        db.receive(Request::PatchComment(id, patch.clone()))?;
        let pos = db.position(id)?;
        let c = &mut db.comments[pos];
        patch.apply_to(c);
        Ok(c.clone())
    }
}

#[async_trait]
impl Remote for MockServer {
    async fn fetch_comments(&self) -> Result<Vec<Comment>, palaver_client::Error> {
        // give concurrent callers a chance to pile up, like over a real network
        tokio::task::yield_now().await;
        Ok(self.list_comments()?)
    }

    async fn fetch_user(&self) -> Result<User, palaver_client::Error> {
        tokio::task::yield_now().await;
        Ok(self.current_user()?)
    }

    async fn create_comment(&self, c: NewComment) -> Result<Comment, palaver_client::Error> {
        tokio::task::yield_now().await;
        Ok(self.post_comment(c)?)
    }

    async fn delete_comment(&self, id: CommentId) -> Result<(), palaver_client::Error> {
        tokio::task::yield_now().await;
        Ok(self.remove_comment(id)?)
    }

    async fn patch_comment(
        &self,
        id: CommentId,
        patch: CommentPatch,
    ) -> Result<Comment, palaver_client::Error> {
        tokio::task::yield_now().await;
        Ok(self.update_comment(id, patch)?)
    }
}
