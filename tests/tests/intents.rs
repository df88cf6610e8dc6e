use std::sync::Arc;

use palaver_api::{
    Comment, CommentId, CommentPatch, ContentError, DisplayDate, NewComment, Reply, ReplyId, User,
    UserImage,
};
use palaver_client::{
    Client, Config, Intent, IntentError, Level, Notification, Session, Stamp, SubmitError,
};
use palaver_mock_server::{MockServer, Request};
use tokio::sync::mpsc;

fn user(name: &str) -> User {
    User {
        username: String::from(name),
        image: UserImage {
            small: format!("./images/avatars/image-{name}.png"),
            large: format!("./images/avatars/image-{name}.webp"),
        },
    }
}

fn reply(id: u64, author: &str, replying_to: &str, score: u64) -> Reply {
    Reply {
        id: ReplyId::Number(id),
        content: format!("reply {id} from {author} to {replying_to}"),
        created_at: DisplayDate::from(format!("{id} weeks ago").as_str()),
        score,
        replying_to: String::from(replying_to),
        user: user(author),
    }
}

fn comment(id: u64, author: &str, score: u64, replies: Vec<Reply>) -> Comment {
    Comment {
        id: CommentId(id),
        content: format!("comment {id} from {author}"),
        created_at: DisplayDate::from("1 month ago"),
        score,
        user: user(author),
        replies,
    }
}

fn seed() -> Vec<Comment> {
    vec![
        comment(1, "amyrobson", 0, Vec::new()),
        comment(
            2,
            "maxblagun",
            5,
            vec![
                reply(3, "ramsesmiron", "maxblagun", 4),
                reply(4, "juliusomo", "ramsesmiron", 2),
            ],
        ),
    ]
}

fn stamp() -> Stamp {
    Stamp {
        date: DisplayDate::from("October 18, 2026"),
        reply_id: ReplyId::from("fresh"),
    }
}

struct Setup {
    mock: MockServer,
    client: Client<MockServer>,
    notifs: mpsc::UnboundedReceiver<Notification>,
    session: Session,
}

fn setup() -> Setup {
    let mock = MockServer::new(user("juliusomo")).with_comments(seed());
    let (tx, notifs) = mpsc::unbounded_channel();
    let client = Client::with_notifier(mock.clone(), &Config::default(), tx);
    Setup {
        mock,
        client,
        notifs,
        session: Session::new(user("juliusomo")),
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut res = Vec::new();
    while let Ok(n) = rx.try_recv() {
        res.push(n);
    }
    res
}

#[tokio::test]
async fn short_content_never_reaches_the_store() {
    let mut s = setup();
    let res = s
        .client
        .submit(
            &s.session,
            Intent::AddComment {
                content: String::from("hi there"),
            },
        )
        .await;
    assert!(matches!(
        res,
        Err(SubmitError::Rejected(IntentError::InvalidContent(
            ContentError::TooShort { len: 8, min: 10 }
        )))
    ));
    let res = s
        .client
        .submit(
            &s.session,
            Intent::EditComment {
                comment: CommentId(1),
                content: String::new(),
            },
        )
        .await;
    assert!(matches!(
        res,
        Err(SubmitError::Rejected(IntentError::InvalidContent(
            ContentError::Empty
        )))
    ));
    assert_eq!(s.mock.test_num_requests(), 0);
    assert!(drain(&mut s.notifs).is_empty());
}

#[tokio::test]
async fn upvote_submits_incremented_score_then_refetches() {
    let mut s = setup();
    s.client
        .submit(
            &s.session,
            Intent::UpvoteComment {
                comment: CommentId(2),
            },
        )
        .await
        .unwrap();
    assert_eq!(
        s.mock.test_requests(),
        vec![
            Request::FetchComments,
            Request::PatchComment(CommentId(2), CommentPatch::score(6)),
            Request::FetchComments,
        ]
    );
    let n = drain(&mut s.notifs);
    assert_eq!(n.len(), 1);
    assert_eq!(n[0].level, Level::Success);
    assert_eq!(n[0].message, "Comment upvoted");
    let tree = s.client.comments().await.unwrap();
    assert_eq!(tree.find_comment(CommentId(2)).unwrap().score, 6);
}

#[tokio::test]
async fn downvote_stops_at_zero() {
    let s = setup();
    s.client
        .submit(
            &s.session,
            Intent::DownvoteComment {
                comment: CommentId(1),
            },
        )
        .await
        .unwrap();
    assert!(s
        .mock
        .test_requests()
        .contains(&Request::PatchComment(CommentId(1), CommentPatch::score(0))));
    assert_eq!(s.mock.test_comments()[0].score, 0);
}

#[tokio::test]
async fn replies_address_the_right_author() {
    let s = setup();
    s.client
        .submit_stamped(
            &s.session,
            Intent::AddReply {
                comment: CommentId(1),
                content: String::from("Great work on this one!"),
            },
            stamp(),
        )
        .await
        .unwrap();
    let stored = s.mock.test_comments();
    let first = &stored[0];
    let added = first.reply(&ReplyId::from("fresh")).unwrap();
    assert_eq!(added.replying_to, "amyrobson");
    assert_eq!(added.user.username, "juliusomo");
    assert_eq!(added.score, 0);
    assert_eq!(added.created_at, DisplayDate::from("October 18, 2026"));

    s.client
        .submit_stamped(
            &s.session,
            Intent::AddNestedReply {
                comment: CommentId(2),
                reply: ReplyId::Number(3),
                content: String::from("I could not agree more."),
            },
            Stamp {
                reply_id: ReplyId::from("nested"),
                ..stamp()
            },
        )
        .await
        .unwrap();
    let stored = s.mock.test_comments();
    let second = &stored[1];
    assert_eq!(second.replies.len(), 3);
    assert_eq!(second.replies[2].id, ReplyId::from("nested"));
    assert_eq!(second.replies[2].replying_to, "ramsesmiron");
}

#[tokio::test]
async fn reply_votes_send_the_whole_comment() {
    let s = setup();
    s.client
        .submit(
            &s.session,
            Intent::DownvoteReply {
                comment: CommentId(2),
                reply: ReplyId::Number(3),
            },
        )
        .await
        .unwrap();
    // the whole comment goes back as displayed, oldest reply first
    let mut expected = seed().remove(1);
    expected.replies.reverse();
    expected.replies[1].score = 3;
    assert!(s
        .mock
        .test_requests()
        .contains(&Request::PatchComment(CommentId(2), CommentPatch::full(expected.clone()))));
    assert_eq!(s.mock.test_comments()[1], expected);
}

#[tokio::test]
async fn edit_and_delete_own_reply() {
    let s = setup();
    s.client
        .submit(
            &s.session,
            Intent::EditReply {
                comment: CommentId(2),
                reply: ReplyId::Number(4),
                content: String::from("Actually, I changed my mind."),
            },
        )
        .await
        .unwrap();
    let tree = s.client.comments().await.unwrap();
    let edited = tree.find_reply(CommentId(2), &ReplyId::Number(4)).unwrap();
    assert_eq!(edited.content, "Actually, I changed my mind.");
    assert_eq!(edited.score, 2);

    s.client
        .submit(
            &s.session,
            Intent::DeleteReply {
                comment: CommentId(2),
                reply: ReplyId::Number(4),
            },
        )
        .await
        .unwrap();
    let tree = s.client.comments().await.unwrap();
    assert!(tree.find_reply(CommentId(2), &ReplyId::Number(4)).is_none());
    assert!(tree.find_reply(CommentId(2), &ReplyId::Number(3)).is_some());
}

#[tokio::test]
async fn others_content_is_read_only() {
    let mut s = setup();
    let res = s
        .client
        .submit(
            &s.session,
            Intent::DeleteComment {
                comment: CommentId(1),
            },
        )
        .await;
    assert!(matches!(
        res,
        Err(SubmitError::Rejected(IntentError::PermissionDenied { .. }))
    ));
    let res = s
        .client
        .submit(
            &s.session,
            Intent::EditReply {
                comment: CommentId(2),
                reply: ReplyId::Number(3),
                content: String::from("Rewriting your words"),
            },
        )
        .await;
    assert!(matches!(
        res,
        Err(SubmitError::Rejected(IntentError::PermissionDenied { .. }))
    ));
    // only the initial load reached the store
    assert_eq!(s.mock.test_requests(), vec![Request::FetchComments]);
    assert!(drain(&mut s.notifs).is_empty());
}

#[tokio::test]
async fn missing_targets_are_rejected() {
    let s = setup();
    let res = s
        .client
        .submit(
            &s.session,
            Intent::UpvoteComment {
                comment: CommentId(42),
            },
        )
        .await;
    assert!(matches!(
        res,
        Err(SubmitError::Rejected(IntentError::CommentNotFound(CommentId(42))))
    ));
    let res = s
        .client
        .submit(
            &s.session,
            Intent::UpvoteReply {
                comment: CommentId(1),
                reply: ReplyId::Number(3),
            },
        )
        .await;
    assert!(matches!(
        res,
        Err(SubmitError::Rejected(IntentError::ReplyNotFound(CommentId(1), _)))
    ));
}

#[tokio::test]
async fn concurrent_reads_share_one_fetch() {
    let s = setup();
    let (a, b) = tokio::join!(s.client.comments(), s.client.comments());
    assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    assert_eq!(s.mock.test_num_requests(), 1);
    s.client.comments().await.unwrap();
    assert_eq!(s.mock.test_num_requests(), 1);
}

#[tokio::test]
async fn comments_come_back_best_first() {
    let s = setup();
    let tree = s.client.comments().await.unwrap();
    let ids = tree.iter().map(|c| c.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![CommentId(2), CommentId(1)]);
    // oldest reply first
    let replies = &tree.find_comment(CommentId(2)).unwrap().replies;
    assert_eq!(replies[0].id, ReplyId::Number(4));
    assert_eq!(replies[1].id, ReplyId::Number(3));
}

#[tokio::test]
async fn failed_write_notifies_and_keeps_cache() {
    let mut s = setup();
    let before = s.client.comments().await.unwrap();
    s.mock.test_fail_next(1);
    let res = s
        .client
        .submit(
            &s.session,
            Intent::AddComment {
                content: String::from("This will not make it"),
            },
        )
        .await;
    assert!(matches!(res, Err(SubmitError::Write { .. })));
    let n = drain(&mut s.notifs);
    assert_eq!(n.len(), 1);
    assert_eq!(n[0].level, Level::Failure);
    assert_eq!(
        n[0].message,
        "There was an error when trying to add the comment"
    );
    let after = s.client.sync().cached_comments().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(s.mock.test_comments(), seed());
}

#[tokio::test]
async fn failed_load_notifies() {
    let mut s = setup();
    s.mock.test_fail_next(1);
    let res = s
        .client
        .submit(
            &s.session,
            Intent::UpvoteComment {
                comment: CommentId(1),
            },
        )
        .await;
    assert!(matches!(res, Err(SubmitError::Load(_))));
    assert_eq!(drain(&mut s.notifs)[0].level, Level::Failure);
    assert_eq!(s.mock.test_requests(), vec![Request::FetchComments]);
}

#[tokio::test]
async fn observers_see_mutations() {
    let s = setup();
    let mut rx = s.client.subscribe();
    assert!(rx.borrow().ready().is_none());
    s.client.comments().await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().ready().unwrap().len(), 2);

    s.client
        .submit_stamped(
            &s.session,
            Intent::AddComment {
                content: String::from("Observers should see this one"),
            },
            stamp(),
        )
        .await
        .unwrap();
    assert!(rx.has_changed().unwrap());
    let tree = rx.borrow_and_update().ready().unwrap().clone();
    assert_eq!(tree.len(), 3);
    assert_eq!(
        s.mock.test_requests()[1],
        Request::CreateComment(NewComment::new(
            user("juliusomo"),
            String::from("Observers should see this one"),
            DisplayDate::from("October 18, 2026"),
        ))
    );
    let created = tree.find_comment(CommentId(3)).unwrap();
    assert_eq!(created.user, user("juliusomo"));
}

#[tokio::test]
async fn session_comes_from_current_user() {
    let s = setup();
    let session = s.client.session().await.unwrap();
    assert_eq!(session.user(), &user("juliusomo"));
    assert!(session.owns(&user("juliusomo")));
    assert!(!session.owns(&user("amyrobson")));
}

#[tokio::test]
async fn edit_round_trips_and_keeps_the_rest() {
    let mut own = comment(3, "juliusomo", 7, vec![reply(5, "amyrobson", "juliusomo", 1)]);
    own.content = String::from("I wrote this one myself");
    let mock = MockServer::new(user("juliusomo")).with_comments(vec![own.clone()]);
    let client = Client::new(mock.clone(), &Config::default());
    let session = client.session().await.unwrap();

    for content in ["I rewrote this one myself", "I rewrote this one myself"] {
        client
            .submit(
                &session,
                Intent::EditComment {
                    comment: CommentId(3),
                    content: String::from(content),
                },
            )
            .await
            .unwrap();
        let tree = client.comments().await.unwrap();
        let edited = tree.find_comment(CommentId(3)).unwrap();
        assert_eq!(edited.content, content);
        assert_eq!(edited.id, own.id);
        assert_eq!(edited.score, own.score);
        assert_eq!(edited.replies, own.replies);
    }
    assert_eq!(
        mock.test_requests()
            .into_iter()
            .filter(|r| matches!(r, Request::PatchComment(..)))
            .count(),
        2
    );
}

#[tokio::test]
async fn failed_refetch_after_write_still_succeeds() {
    let mut s = setup();
    let before = s.client.comments().await.unwrap();
    // the write goes through, the refetch right after it fails
    s.mock.test_fail_nth(1);
    s.client
        .submit(
            &s.session,
            Intent::UpvoteComment {
                comment: CommentId(2),
            },
        )
        .await
        .unwrap();
    assert_eq!(
        s.mock.test_requests()[1..],
        [
            Request::PatchComment(CommentId(2), CommentPatch::score(6)),
            Request::FetchComments,
        ]
    );
    let n = drain(&mut s.notifs);
    assert_eq!(n.len(), 1);
    assert_eq!(n[0].level, Level::Success);
    let cached = s.client.sync().cached_comments().unwrap();
    assert!(Arc::ptr_eq(&before, &cached));
    assert_eq!(s.mock.test_comments()[1].score, 6);

    // the stale tree gets replaced on the next read
    let tree = s.client.comments().await.unwrap();
    assert_eq!(tree.find_comment(CommentId(2)).unwrap().score, 6);
}

#[tokio::test]
async fn new_comments_do_not_need_the_list() {
    let mut s = setup();
    s.mock.test_fail_next(1);
    assert!(s.client.comments().await.is_err());
    s.mock.test_clear_requests();

    s.client
        .submit_stamped(
            &s.session,
            Intent::AddComment {
                content: String::from("Posting even though the list failed"),
            },
            stamp(),
        )
        .await
        .unwrap();
    assert_eq!(
        s.mock.test_requests(),
        vec![
            Request::CreateComment(NewComment::new(
                user("juliusomo"),
                String::from("Posting even though the list failed"),
                DisplayDate::from("October 18, 2026"),
            )),
            Request::FetchComments,
        ]
    );
    assert_eq!(drain(&mut s.notifs)[0].level, Level::Success);
    assert_eq!(s.client.comments().await.unwrap().len(), 3);
}
