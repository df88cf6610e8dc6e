use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};

pub type Time = DateTime<Utc>;

const DISPLAY_FORMAT: &str = "%B %-d, %Y";

/// Creation date as shown to users.
///
/// The store keeps whatever was displayed at creation time, so this can be a
/// long-form date ("March 5, 2024"), a timestamp, or a relative form left by
/// seed data ("2 weeks ago"). Use [`DisplayDate::resolve`] to order them.
#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct DisplayDate(pub String);

impl DisplayDate {
    pub fn today() -> DisplayDate {
        DisplayDate::on(Local::now().date_naive())
    }

    pub fn on(date: NaiveDate) -> DisplayDate {
        DisplayDate(date.format(DISPLAY_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Best-effort conversion to a point in time, relative forms being
    /// computed against `now`
    pub fn resolve(&self, now: Time) -> Option<Time> {
        let s = self.0.trim();
        if let Ok(t) = DateTime::parse_from_rfc3339(s) {
            return Some(t.with_timezone(&Utc));
        }
        for fmt in ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y"] {
            if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
                return Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?));
            }
        }
        resolve_relative(&s.to_lowercase(), now)
    }
}

impl From<&str> for DisplayDate {
    fn from(s: &str) -> DisplayDate {
        DisplayDate(String::from(s))
    }
}

fn resolve_relative(s: &str, now: Time) -> Option<Time> {
    match s {
        "just now" | "now" | "today" => return Some(now),
        "yesterday" => return now.checked_sub_signed(Duration::days(1)),
        _ => (),
    }
    let mut words = s.split_whitespace();
    let count: i64 = match words.next()? {
        "a" | "an" | "one" => 1,
        n => n.parse().ok().filter(|n| (0..1_000_000).contains(n))?,
    };
    let unit = words.next()?;
    if words.next()? != "ago" || words.next().is_some() {
        return None;
    }
    let unit_secs: i64 = match unit.strip_suffix('s').unwrap_or(unit) {
        "second" | "sec" => 1,
        "minute" | "min" => 60,
        "hour" => 60 * 60,
        "day" => 24 * 60 * 60,
        "week" => 7 * 24 * 60 * 60,
        "month" => 30 * 24 * 60 * 60,
        "year" => 365 * 24 * 60 * 60,
        _ => return None,
    };
    now.checked_sub_signed(Duration::seconds(count.checked_mul(unit_secs)?))
}
