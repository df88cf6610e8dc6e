//! Prints a store file full of random comments, suitable for `palaver-server --db`

use chrono::{Duration, Utc};
use palaver_api::{Comment, CommentId, DisplayDate, Reply, ReplyId, User, UserImage};
use rand::{seq::SliceRandom, Rng};

const USERNAMES: &[&str] = &["juliusomo", "amyrobson", "maxblagun", "ramsesmiron"];

const NUM_COMMENTS: u64 = 20;
const MAX_REPLIES: usize = 6;
const MAX_SCORE: u64 = 20;
const COMMENT_WORD_COUNT: usize = 25;

fn user(name: &str) -> User {
    User {
        username: String::from(name),
        image: UserImage {
            small: format!("./images/avatars/image-{name}.png"),
            large: format!("./images/avatars/image-{name}.webp"),
        },
    }
}

fn gen_user(rng: &mut impl Rng) -> User {
    user(USERNAMES[rng.gen_range(0..USERNAMES.len())])
}

fn gen_date(rng: &mut impl Rng) -> DisplayDate {
    match rng.gen_range(0..4) {
        0 => DisplayDate(format!("{} days ago", rng.gen_range(2..7))),
        1 => DisplayDate(format!("{} weeks ago", rng.gen_range(2..5))),
        2 => DisplayDate(format!("{} months ago", rng.gen_range(2..12))),
        _ => DisplayDate::on(
            (Utc::now() - Duration::days(rng.gen_range(0..1000))).date_naive(),
        ),
    }
}

fn gen_text(rng: &mut impl Rng) -> String {
    let words = rng.gen_range(3..COMMENT_WORD_COUNT);
    lipsum::lipsum_words_with_rng(rng, words)
}

fn main() {
    let mut rng = rand::thread_rng();
    let mut next_reply = 0;

    let comments = (1..=NUM_COMMENTS)
        .map(|id| {
            let author = gen_user(&mut rng);
            let mut replies: Vec<Reply> = Vec::new();
            for _ in 0..rng.gen_range(0..=MAX_REPLIES) {
                // answer either the comment or one of the replies already there
                let replying_to = match replies.choose(&mut rng) {
                    Some(r) if rng.gen_bool(0.5) => r.user.username.clone(),
                    _ => author.username.clone(),
                };
                next_reply += 1;
                replies.push(Reply {
                    id: ReplyId::Number(next_reply),
                    content: gen_text(&mut rng),
                    created_at: gen_date(&mut rng),
                    score: rng.gen_range(0..=MAX_SCORE),
                    replying_to,
                    user: gen_user(&mut rng),
                });
            }
            Comment {
                id: CommentId(id),
                content: gen_text(&mut rng),
                created_at: gen_date(&mut rng),
                score: rng.gen_range(0..=MAX_SCORE),
                user: author,
                replies,
            }
        })
        .collect::<Vec<_>>();

    let store = serde_json::json!({
        "currentUser": user(USERNAMES[0]),
        "comments": comments,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&store).expect("serializing generated store")
    );
}
