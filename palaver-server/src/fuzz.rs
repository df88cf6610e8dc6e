#![cfg(test)]

use axum::http::{self, request};
use palaver_api::{
    CommentId, CommentPatch, DisplayDate, Error as ApiError, NewComment, Reply, ReplyId, User,
};
use palaver_mock_server::MockServer;
use bolero::generator::TypeGenerator;
use std::{fmt::Debug, panic::AssertUnwindSafe};
use tower::{Service, ServiceExt};

use crate::*;

macro_rules! do_tokio_test {
    ( $name:ident, $gen:expr, $fn:expr ) => {
        #[test]
        fn $name() {
            let runtime = AssertUnwindSafe(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed initializing tokio runtime"),
            );
            bolero::check!()
                .with_generator($gen)
                .cloned()
                .for_each(move |v| {
                    let () = runtime.block_on($fn(v));
                })
        }
    };
}

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
enum FuzzOp {
    List,
    Create {
        #[generator(bolero::generator::gen_with::<String>().len(0..40usize))]
        content: String,
    },
    Delete {
        id: u8,
    },
    Edit {
        id: u8,
        #[generator(bolero::generator::gen_with::<String>().len(0..40usize))]
        content: String,
    },
    Vote {
        id: u8,
        score: u16,
    },
    Reply {
        id: u8,
        #[generator(bolero::generator::gen_with::<String>().len(0..40usize))]
        content: String,
    },
}

async fn call<Req, Resp>(
    app: &mut Router,
    req: request::Request<axum::body::Body>,
    req_body: &Req,
) -> Result<Resp, ApiError>
where
    Req: Debug,
    Resp: 'static + for<'de> serde::Deserialize<'de>,
{
    app.ready().await.expect("waiting for app to be ready");
    let resp = app.call(req).await.expect("running request");
    let status = resp.status();
    let body = hyper::body::to_bytes(resp.into_body())
        .await
        .expect("recovering resp bytes");
    if status.is_success() {
        if std::any::TypeId::of::<Resp>() == std::any::TypeId::of::<()>() {
            // the server returns an empty body in this situation, which does not parse as json
            return Ok(serde_json::from_slice(b"null").unwrap());
        }
        return Ok(serde_json::from_slice(&body).unwrap_or_else(|err| {
            panic!(
                r#"
                    Failed parsing resp body!

                    The error is the following:
                    ---
                    {err}
                    ---

                    Response body is:
                    ---
                    {body:?}
                    ---

                    Request was:
                    ---
                    {req_body:?}
                    ---
                "#
            )
        }));
    }
    Err(ApiError::parse(&body)
        .unwrap_or_else(|err| panic!("parsing error response body {err}, body is {body:?}")))
}

async fn run_on_app<Req, Resp>(
    app: &mut Router,
    method: &str,
    uri: &str,
    body: &Req,
) -> Result<Resp, ApiError>
where
    Req: Debug + serde::Serialize,
    Resp: 'static + for<'de> serde::Deserialize<'de>,
{
    let req = request::Builder::new()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(body).expect("serializing request body to json"),
        ))
        .expect("building request");
    call(app, req, body).await
}

async fn raw_on_app(
    app: &mut Router,
    method: &str,
    uri: &str,
    body: &'static str,
) -> (http::StatusCode, Vec<u8>) {
    let req = request::Builder::new()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body))
        .expect("building request");
    app.ready().await.expect("waiting for app to be ready");
    let resp = app.call(req).await.expect("running request");
    let status = resp.status();
    let body = hyper::body::to_bytes(resp.into_body())
        .await
        .expect("recovering resp bytes");
    (status, body.to_vec())
}

fn compare<T>(name: &str, app_res: Result<T, ApiError>, mock_res: Result<T, ApiError>)
where
    T: Debug + PartialEq,
{
    assert_eq!(
        app_res, mock_res,
        "app and mock did not return the same result for {name}"
    );
}

struct ComparativeFuzzer {
    app: Router,
    mock: MockServer,
}

impl ComparativeFuzzer {
    fn new() -> ComparativeFuzzer {
        let snapshot = Snapshot::default();
        let mock = MockServer::new(snapshot.current_user.clone());
        let app = app(Db::in_memory(snapshot));
        ComparativeFuzzer { app, mock }
    }

    fn user(&self) -> User {
        Snapshot::default().current_user
    }

    async fn execute_fuzz_op(&mut self, op: FuzzOp) {
        match op {
            FuzzOp::List => compare(
                "List",
                run_on_app(&mut self.app, "GET", "/comments", &()).await,
                self.mock.list_comments(),
            ),
            FuzzOp::Create { content } => {
                let c = NewComment::new(self.user(), content, DisplayDate::from("2 days ago"));
                compare(
                    "Create",
                    run_on_app(&mut self.app, "POST", "/comments", &c).await,
                    self.mock.post_comment(c),
                )
            }
            FuzzOp::Delete { id } => {
                // small ids hit existing comments as often as missing ones
                let id = CommentId(u64::from(id % 8));
                compare(
                    "Delete",
                    run_on_app(&mut self.app, "DELETE", &format!("/comments/{id}"), &()).await,
                    self.mock.remove_comment(id),
                )
            }
            FuzzOp::Edit { id, content } => {
                let id = CommentId(u64::from(id % 8));
                let patch = CommentPatch::content(content);
                compare(
                    "Edit",
                    run_on_app(&mut self.app, "PATCH", &format!("/comments/{id}"), &patch).await,
                    self.mock.update_comment(id, patch),
                )
            }
            FuzzOp::Vote { id, score } => {
                let id = CommentId(u64::from(id % 8));
                let patch = CommentPatch::score(u64::from(score));
                compare(
                    "Vote",
                    run_on_app(&mut self.app, "PATCH", &format!("/comments/{id}"), &patch).await,
                    self.mock.update_comment(id, patch),
                )
            }
            FuzzOp::Reply { id, content } => {
                let id = CommentId(u64::from(id % 8));
                let mut replies = self
                    .mock
                    .test_comments()
                    .into_iter()
                    .find(|c| c.id == id)
                    .map(|c| c.replies)
                    .unwrap_or_default();
                replies.push(Reply {
                    id: ReplyId::generate(),
                    content,
                    created_at: DisplayDate::from("just now"),
                    score: 0,
                    replying_to: self.user().username,
                    user: self.user(),
                });
                let patch = CommentPatch::replies(replies);
                compare(
                    "Reply",
                    run_on_app(&mut self.app, "PATCH", &format!("/comments/{id}"), &patch).await,
                    self.mock.update_comment(id, patch),
                )
            }
        }
    }
}

do_tokio_test!(
    compare_with_mock,
    bolero::generator::gen_with::<Vec<FuzzOp>>().len(1..50usize),
    |test: Vec<FuzzOp>| async move {
        let mut fuzzer = ComparativeFuzzer::new();
        for op in test {
            fuzzer.execute_fuzz_op(op).await;
        }
        fuzzer.execute_fuzz_op(FuzzOp::List).await;
    }
);

#[tokio::test]
async fn current_user_is_served() {
    let mut app = app(Db::in_memory(Snapshot::default()));
    let user: User = run_on_app(&mut app, "GET", "/currentUser", &()).await.unwrap();
    assert_eq!(user, Snapshot::default().current_user);
    let (_, body) = raw_on_app(&mut app, "GET", "/currentUser", "").await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["image"]["png"], "./images/avatars/image-juliusomo.png");
    assert_eq!(json["image"]["webp"], "./images/avatars/image-juliusomo.webp");
}

#[tokio::test]
async fn missing_comments_are_404() {
    let mut app = app(Db::in_memory(Snapshot::default()));
    let (status, body) = raw_on_app(&mut app, "DELETE", "/comments/12", "").await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
    assert_eq!(
        ApiError::parse(&body).unwrap(),
        ApiError::CommentNotFound(CommentId(12))
    );
    let (status, _) = raw_on_app(&mut app, "PATCH", "/comments/12", r#"{"score":2}"#).await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_bodies_are_400() {
    let mut app = app(Db::in_memory(Snapshot::default()));
    let (status, body) = raw_on_app(&mut app, "POST", "/comments", "{ not json").await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert!(matches!(
        ApiError::parse(&body).unwrap(),
        ApiError::InvalidBody(_)
    ));
    let (status, _) = raw_on_app(&mut app, "POST", "/comments", r#"{"content":"no user"}"#).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    let comments: Vec<palaver_api::Comment> =
        run_on_app(&mut app, "GET", "/comments", &()).await.unwrap();
    assert!(comments.is_empty());
}

#[tokio::test]
async fn patch_ignores_id_changes() {
    let mut app = app(Db::in_memory(Snapshot::default()));
    let c = NewComment::new(
        Snapshot::default().current_user,
        String::from("Impressive! Though it seems the drag feature could be improved."),
        DisplayDate::from("1 month ago"),
    );
    let created: palaver_api::Comment = run_on_app(&mut app, "POST", "/comments", &c).await.unwrap();
    assert_eq!(created.id, CommentId(1));
    let (status, body) =
        raw_on_app(&mut app, "PATCH", "/comments/1", r#"{"id":7,"score":12}"#).await;
    assert_eq!(status, http::StatusCode::OK);
    let patched: palaver_api::Comment = serde_json::from_slice(&body).unwrap();
    assert_eq!(patched.id, CommentId(1));
    assert_eq!(patched.score, 12);
    assert_eq!(patched.content, created.content);
}

#[tokio::test]
async fn cors_is_permissive() {
    let mut app = app(Db::in_memory(Snapshot::default()));
    let req = request::Builder::new()
        .method("GET")
        .uri("/comments")
        .header(http::header::ORIGIN, "http://localhost:3000")
        .body(axum::body::Body::empty())
        .expect("building request");
    app.ready().await.expect("waiting for app to be ready");
    let resp = app.call(req).await.expect("running request");
    assert_eq!(
        resp.headers()
            .get(http::header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.as_bytes()),
        Some(&b"*"[..])
    );
}
