use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use palaver_api::{Comment, CommentId, CommentPatch, NewComment, User};

use crate::{Db, Error};

fn body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    body.map(|Json(b)| b)
        .map_err(|rej| Error::invalid_body(rej.body_text()))
}

pub async fn list_comments(State(db): State<Db>) -> Json<Vec<Comment>> {
    Json(db.list_comments().await)
}

pub async fn current_user(State(db): State<Db>) -> Json<User> {
    Json(db.current_user().await)
}

pub async fn create_comment(
    State(db): State<Db>,
    data: Result<Json<NewComment>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>), Error> {
    let created = db.create_comment(body(data)?).await?;
    tracing::info!(id = %created.id, "created comment");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_comment(
    State(db): State<Db>,
    Path(id): Path<CommentId>,
) -> Result<(), Error> {
    db.delete_comment(id).await?;
    tracing::info!(%id, "deleted comment");
    Ok(())
}

pub async fn patch_comment(
    State(db): State<Db>,
    Path(id): Path<CommentId>,
    data: Result<Json<CommentPatch>, JsonRejection>,
) -> Result<Json<Comment>, Error> {
    let patched = db.patch_comment(id, body(data)?).await?;
    tracing::info!(%id, "patched comment");
    Ok(Json(patched))
}
