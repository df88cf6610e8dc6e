#![cfg(test)]

use palaver_api::{CommentId, DisplayDate, ReplyId};
use palaver_client::{
    Client, Config, Error as ClientError, HttpRemote, Intent, Level, Notification, Remote, Stamp,
    SubmitError,
};
use tokio::sync::mpsc;

use crate::*;

/// Serves `db` on an ephemeral port, returning its base url
fn serve(db: Db) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("binding ephemeral port");
    let addr = listener.local_addr().expect("reading bound address");
    let server = axum::Server::from_tcp(listener)
        .expect("building server from listener")
        .serve(app(db).into_make_service());
    tokio::spawn(server);
    format!("http://{addr}")
}

fn client(host: String) -> (Client<HttpRemote>, mpsc::UnboundedReceiver<Notification>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let config = Config {
        host,
        max_age: None,
    };
    let client = Client::with_notifier(HttpRemote::new(config.host.clone()), &config, tx);
    (client, rx)
}

fn stamp(reply: &str) -> Stamp {
    Stamp {
        date: DisplayDate::from("October 18, 2026"),
        reply_id: ReplyId::from(reply),
    }
}

#[tokio::test]
async fn conversation_over_http() {
    let host = serve(Db::in_memory(Snapshot::default()));
    let (client, mut notifs) = client(host);
    let session = client.session().await.unwrap();
    assert_eq!(session.username(), "juliusomo");

    client
        .submit(
            &session,
            Intent::AddComment {
                content: String::from("Woah, your project looks awesome!"),
            },
        )
        .await
        .unwrap();
    let tree = client.comments().await.unwrap();
    assert_eq!(tree.len(), 1);
    let id = tree.comments()[0].id;
    assert_eq!(id, CommentId(1));

    client
        .submit_stamped(
            &session,
            Intent::AddReply {
                comment: id,
                content: String::from("Thanks, it took a while to get right."),
            },
            stamp("first"),
        )
        .await
        .unwrap();
    client
        .submit(
            &session,
            Intent::UpvoteReply {
                comment: id,
                reply: ReplyId::from("first"),
            },
        )
        .await
        .unwrap();
    client
        .submit(
            &session,
            Intent::EditReply {
                comment: id,
                reply: ReplyId::from("first"),
                content: String::from("Thanks, it took ages to get right."),
            },
        )
        .await
        .unwrap();

    let tree = client.comments().await.unwrap();
    let reply = tree.find_reply(id, &ReplyId::from("first")).unwrap();
    assert_eq!(reply.score, 1);
    assert_eq!(reply.content, "Thanks, it took ages to get right.");
    assert_eq!(reply.replying_to, "juliusomo");

    client
        .submit(
            &session,
            Intent::DeleteReply {
                comment: id,
                reply: ReplyId::from("first"),
            },
        )
        .await
        .unwrap();
    client
        .submit(&session, Intent::DeleteComment { comment: id })
        .await
        .unwrap();
    assert!(client.comments().await.unwrap().is_empty());

    let mut levels = Vec::new();
    while let Ok(n) = notifs.try_recv() {
        levels.push(n.level);
    }
    assert_eq!(levels, vec![Level::Success; 6]);
}

#[tokio::test]
async fn store_errors_come_back_typed() {
    let host = serve(Db::in_memory(Snapshot::default()));
    let remote = HttpRemote::new(host);
    match remote.delete_comment(CommentId(3)).await {
        Err(ClientError::Api(palaver_api::Error::CommentNotFound(CommentId(3)))) => (),
        res => panic!("unexpected result {res:?}"),
    }
}

#[tokio::test]
async fn unreachable_store_notifies_failure() {
    // bind then drop, so nothing listens there anymore
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .expect("finding a free port");
    let (client, mut notifs) = client(format!("http://{addr}"));
    let session = palaver_client::Session::new(Snapshot::default().current_user);
    let res = client
        .submit(
            &session,
            Intent::UpvoteComment {
                comment: CommentId(1),
            },
        )
        .await;
    assert!(matches!(res, Err(SubmitError::Load(_))));
    assert_eq!(notifs.try_recv().unwrap().level, Level::Failure);

    let res = client
        .submit(
            &session,
            Intent::AddComment {
                content: String::from("Nobody will ever read this"),
            },
        )
        .await;
    assert!(matches!(
        res,
        Err(SubmitError::Write {
            source: ClientError::Transport(_),
            ..
        })
    ));
    assert_eq!(notifs.try_recv().unwrap().level, Level::Failure);
}
