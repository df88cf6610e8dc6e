use std::cmp::Reverse;

use crate::api::{Comment, Reply, Time};

/// Canonical presentation order: comments by decreasing score, replies by
/// increasing creation date.
///
/// Sorts are stable, so equal keys keep the order the store returned them in.
/// Dates that cannot be resolved sort before every resolvable one.
pub trait OrderExt {
    fn sort_canonical(&mut self, now: Time);
}

impl OrderExt for [Comment] {
    fn sort_canonical(&mut self, now: Time) {
        for c in self.iter_mut() {
            c.replies.sort_canonical(now);
        }
        self.sort_by_key(|c| Reverse(c.score));
    }
}

impl OrderExt for [Reply] {
    fn sort_canonical(&mut self, now: Time) {
        self.sort_by_cached_key(|r| r.created_at.resolve(now));
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::api::{CommentId, DisplayDate, ReplyId, User};

    fn now() -> Time {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn reply(id: &str, date: &str) -> Reply {
        Reply {
            id: ReplyId::from(id),
            content: String::from("some reply content"),
            created_at: DisplayDate::from(date),
            score: 0,
            replying_to: String::from("amyrobson"),
            user: User::stub(),
        }
    }

    fn comment(id: u64, score: u64, replies: Vec<Reply>) -> Comment {
        Comment {
            id: CommentId(id),
            content: String::from("some comment content"),
            created_at: DisplayDate::from("1 month ago"),
            score,
            user: User::stub(),
            replies,
        }
    }

    fn ids(comments: &[Comment]) -> Vec<u64> {
        comments.iter().map(|c| c.id.0).collect()
    }

    #[test]
    fn comments_by_decreasing_score_stable() {
        let mut cs = vec![
            comment(1, 2, vec![]),
            comment(2, 12, vec![]),
            comment(3, 2, vec![]),
            comment(4, 5, vec![]),
        ];
        cs.sort_canonical(now());
        assert_eq!(ids(&cs), vec![2, 4, 1, 3]);
    }

    #[test]
    fn replies_by_increasing_date() {
        let mut cs = vec![comment(
            1,
            0,
            vec![
                reply("c", "October 18, 2026"),
                reply("a", "1 month ago"),
                reply("d", "garbled"),
                reply("b", "2 days ago"),
            ],
        )];
        cs.sort_canonical(now());
        let order: Vec<String> = cs[0].replies.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(order, vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn ordering_invariants_hold() {
        bolero::check!()
            .with_type::<Vec<(u8, Vec<u16>)>>()
            .cloned()
            .for_each(|shape| {
                let now = now();
                let mut cs = shape
                    .into_iter()
                    .enumerate()
                    .map(|(i, (score, ages))| {
                        let replies = ages
                            .into_iter()
                            .enumerate()
                            .map(|(j, age)| {
                                let date = (now - Duration::hours(i64::from(age)))
                                    .date_naive();
                                reply(&j.to_string(), DisplayDate::on(date).as_str())
                            })
                            .collect();
                        comment(i as u64, u64::from(score), replies)
                    })
                    .collect::<Vec<_>>();
                cs.sort_canonical(now);
                assert!(cs.windows(2).all(|w| w[0].score >= w[1].score));
                for c in &cs {
                    assert!(c.replies.windows(2).all(|w| {
                        w[0].created_at.resolve(now) <= w[1].created_at.resolve(now)
                    }));
                }
            });
    }
}
