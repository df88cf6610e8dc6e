use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use palaver_api::{Comment, CommentId, CommentPatch, NewComment, User, UserImage};
use tokio::sync::RwLock;

use crate::Error;

/// Whole content of the store, laid out the way it is kept on disk
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub current_user: User,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Default for Snapshot {
    fn default() -> Snapshot {
        Snapshot {
            current_user: User {
                username: String::from("juliusomo"),
                image: UserImage {
                    small: String::from("./images/avatars/image-juliusomo.png"),
                    large: String::from("./images/avatars/image-juliusomo.webp"),
                },
            },
            comments: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Db(Arc<RwLock<State>>);

#[derive(Debug)]
struct State {
    snapshot: Snapshot,
    path: Option<PathBuf>,
}

impl Db {
    pub fn in_memory(snapshot: Snapshot) -> Db {
        Db(Arc::new(RwLock::new(State {
            snapshot,
            path: None,
        })))
    }

    /// Opens the store file at `path`, starting from an empty store if it
    /// does not exist yet
    pub async fn open(path: PathBuf) -> anyhow::Result<Db> {
        let snapshot = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("parsing store file {path:?}"))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(?path, "store file does not exist yet, starting empty");
                Snapshot::default()
            }
            Err(e) => return Err(e).with_context(|| format!("reading store file {path:?}")),
        };
        tracing::info!(
            ?path,
            comments = snapshot.comments.len(),
            "opened store"
        );
        Ok(Db(Arc::new(RwLock::new(State {
            snapshot,
            path: Some(path),
        }))))
    }

    pub async fn list_comments(&self) -> Vec<Comment> {
        self.0.read().await.snapshot.comments.clone()
    }

    pub async fn current_user(&self) -> User {
        self.0.read().await.snapshot.current_user.clone()
    }

    pub async fn create_comment(&self, c: NewComment) -> Result<Comment, Error> {
        self.mutate(|s| {
            let id = CommentId(s.comments.iter().map(|c| c.id.0).max().unwrap_or(0) + 1);
            let c = c.with_id(id);
            s.comments.push(c.clone());
            Ok(c)
        })
        .await
    }

    pub async fn delete_comment(&self, id: CommentId) -> Result<(), Error> {
        self.mutate(|s| {
            let pos = position(s, id)?;
            s.comments.remove(pos);
            Ok(())
        })
        .await
    }

    pub async fn patch_comment(&self, id: CommentId, patch: CommentPatch) -> Result<Comment, Error> {
        self.mutate(|s| {
            let pos = position(s, id)?;
            let c = &mut s.comments[pos];
            patch.apply_to(c);
            Ok(c.clone())
        })
        .await
    }

    /// Applies `f` to a copy of the store, committing it only once persisted
    async fn mutate<T>(&self, f: impl FnOnce(&mut Snapshot) -> Result<T, Error>) -> Result<T, Error> {
        let mut state = self.0.write().await;
        let mut next = state.snapshot.clone();
        let res = f(&mut next)?;
        if let Some(path) = &state.path {
            persist(path, &next).await?;
        }
        state.snapshot = next;
        Ok(res)
    }
}

fn position(s: &Snapshot, id: CommentId) -> Result<usize, Error> {
    s.comments
        .iter()
        .position(|c| c.id == id)
        .ok_or(Error::not_found(id))
}

async fn persist(path: &Path, snapshot: &Snapshot) -> anyhow::Result<()> {
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(snapshot).context("serializing store")?;
    tokio::fs::write(&tmp, bytes)
        .await
        .with_context(|| format!("writing store file {tmp:?}"))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("moving {tmp:?} over store file {path:?}"))?;
    Ok(())
}
