//! Natural-language date/time phrase extraction.
//!
//! A small fixed grammar over free text: relative day words, weekday names
//! with an optional `this`/`next` qualifier, "in N days/weeks", month-name
//! dates, ISO and slash dates, and clock times that attach to an adjacent
//! date phrase. Resolution happens against an injected reference instant so
//! callers (and tests) control what "now" means.
//!
//! Calendar-invalid matches (Feb 30, hour 27) are dropped, never errors.

use std::sync::OnceLock;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::Regex;

/// One recognized date/time phrase.
#[derive(Debug, Clone, PartialEq)]
pub struct DateMatch {
    /// Byte span of the phrase in the scanned text.
    pub start: usize,
    pub end: usize,
    /// The matched substring.
    pub text: String,
    pub resolved: NaiveDateTime,
    /// True when the phrase carried an explicit clock time.
    pub has_time: bool,
}

fn date_regex() -> &'static Regex {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    DATE_RE.get_or_init(|| {
        Regex::new(
            r"(?ix)
            \b(?:
                (?P<relday>today|tomorrow|yesterday)
              | (?:(?P<qual>next|this)\s+)?(?P<weekday>monday|tuesday|wednesday|thursday|friday|saturday|sunday)
              | in\s+(?P<count>\d{1,3})\s+(?P<unit>days?|weeks?)
              | (?P<iso_y>\d{4})-(?P<iso_m>\d{2})-(?P<iso_d>\d{2})
              | (?P<month_a>january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept?|oct|nov|dec)\s+(?P<day_a>\d{1,2})(?:st|nd|rd|th)?
              | (?P<day_b>\d{1,2})(?:st|nd|rd|th)?\s+(?P<month_b>january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept?|oct|nov|dec)
              | (?P<sl_m>\d{1,2})/(?P<sl_d>\d{1,2})(?:/(?P<sl_y>\d{2,4}))?
            )\b",
        )
        .expect("date regex")
    })
}

fn time_regex() -> &'static Regex {
    static TIME_RE: OnceLock<Regex> = OnceLock::new();
    TIME_RE.get_or_init(|| {
        Regex::new(
            r"(?ix)
            \b(?:
                (?:at\s+)?(?P<h12>\d{1,2})(?::(?P<m12>\d{2}))?\s*(?P<mer>am|pm)
              | at\s+(?P<h24>\d{1,2}):(?P<m24>\d{2})
              | (?P<named>noon|midnight)
            )\b",
        )
        .expect("time regex")
    })
}

/// Scan `text` for date/time phrases, resolved against `now`.
///
/// Returns candidates in order of appearance. A clock time separated from a
/// date phrase by whitespace only is folded into that phrase; a clock time
/// with no adjacent date means today at that time.
pub fn extract(text: &str, now: NaiveDateTime) -> Vec<DateMatch> {
    let today = now.date();

    let mut dates: Vec<(usize, usize, NaiveDate)> = Vec::new();
    for caps in date_regex().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if let Some(date) = resolve_date(&caps, today) {
            dates.push((whole.start(), whole.end(), date));
        }
    }

    let mut times: Vec<(usize, usize, NaiveTime)> = Vec::new();
    for caps in time_regex().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if let Some(time) = resolve_time(&caps) {
            times.push((whole.start(), whole.end(), time));
        }
    }

    let mut used = vec![false; times.len()];
    let mut out: Vec<DateMatch> = Vec::new();

    for (ds, de, date) in dates {
        let mut start = ds;
        let mut end = de;
        let mut clock: Option<NaiveTime> = None;

        // Prefer a time trailing the date phrase ("friday at 3pm"),
        // fall back to a leading one ("3pm friday").
        for (i, (ts, te, time)) in times.iter().enumerate() {
            if used[i] || *ts < end {
                continue;
            }
            if text[end..*ts].chars().all(char::is_whitespace) {
                used[i] = true;
                end = *te;
                clock = Some(*time);
            }
            break;
        }
        if clock.is_none() {
            for (i, (ts, te, time)) in times.iter().enumerate() {
                if used[i] || *te > start {
                    continue;
                }
                if text[*te..start].chars().all(char::is_whitespace) {
                    used[i] = true;
                    start = *ts;
                    clock = Some(*time);
                    break;
                }
            }
        }

        out.push(DateMatch {
            start,
            end,
            text: text[start..end].to_string(),
            resolved: date.and_time(clock.unwrap_or(NaiveTime::MIN)),
            has_time: clock.is_some(),
        });
    }

    // Leftover times stand alone as "today at <time>".
    for (i, (ts, te, time)) in times.iter().enumerate() {
        if used[i] {
            continue;
        }
        out.push(DateMatch {
            start: *ts,
            end: *te,
            text: text[*ts..*te].to_string(),
            resolved: today.and_time(*time),
            has_time: true,
        });
    }

    out.sort_by_key(|m| m.start);
    out
}

fn resolve_date(caps: &regex::Captures, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(word) = caps.name("relday") {
        let delta = match word.as_str().to_ascii_lowercase().as_str() {
            "today" => 0,
            "tomorrow" => 1,
            _ => -1,
        };
        return today.checked_add_signed(Duration::days(delta));
    }

    if let Some(day) = caps.name("weekday") {
        let target = weekday_from_name(day.as_str())?;
        let base = (target.num_days_from_monday() as i64
            - today.weekday().num_days_from_monday() as i64)
            .rem_euclid(7);
        // Bare and "this" mean the next occurrence (1-7 days out);
        // "next" pushes a week past that same offset.
        let ahead = match caps.name("qual").map(|q| q.as_str().to_ascii_lowercase()) {
            Some(q) if q == "next" => base + 7,
            _ => {
                if base == 0 {
                    7
                } else {
                    base
                }
            }
        };
        return today.checked_add_signed(Duration::days(ahead));
    }

    if let (Some(count), Some(unit)) = (caps.name("count"), caps.name("unit")) {
        let n: i64 = count.as_str().parse().ok()?;
        let days = if unit.as_str().to_ascii_lowercase().starts_with("week") {
            n * 7
        } else {
            n
        };
        return today.checked_add_signed(Duration::days(days));
    }

    if let (Some(y), Some(m), Some(d)) = (caps.name("iso_y"), caps.name("iso_m"), caps.name("iso_d")) {
        return NaiveDate::from_ymd_opt(
            y.as_str().parse().ok()?,
            m.as_str().parse().ok()?,
            d.as_str().parse().ok()?,
        );
    }

    if let (Some(mon), Some(day)) = (caps.name("month_a"), caps.name("day_a")) {
        return month_day(mon.as_str(), day.as_str(), today);
    }
    if let (Some(day), Some(mon)) = (caps.name("day_b"), caps.name("month_b")) {
        return month_day(mon.as_str(), day.as_str(), today);
    }

    if let (Some(m), Some(d)) = (caps.name("sl_m"), caps.name("sl_d")) {
        let month: u32 = m.as_str().parse().ok()?;
        let day: u32 = d.as_str().parse().ok()?;
        return match caps.name("sl_y") {
            Some(y) => {
                let mut year: i32 = y.as_str().parse().ok()?;
                if year < 100 {
                    year += 2000;
                }
                NaiveDate::from_ymd_opt(year, month, day)
            }
            None => roll_forward(month, day, today),
        };
    }

    None
}

fn resolve_time(caps: &regex::Captures) -> Option<NaiveTime> {
    if let Some(named) = caps.name("named") {
        return if named.as_str().eq_ignore_ascii_case("noon") {
            NaiveTime::from_hms_opt(12, 0, 0)
        } else {
            NaiveTime::from_hms_opt(0, 0, 0)
        };
    }

    if let (Some(h), Some(mer)) = (caps.name("h12"), caps.name("mer")) {
        let hour: u32 = h.as_str().parse().ok()?;
        if !(1..=12).contains(&hour) {
            return None;
        }
        let minute: u32 = match caps.name("m12") {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        let hour = hour % 12 + if mer.as_str().eq_ignore_ascii_case("pm") { 12 } else { 0 };
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    if let (Some(h), Some(m)) = (caps.name("h24"), caps.name("m24")) {
        return NaiveTime::from_hms_opt(h.as_str().parse().ok()?, m.as_str().parse().ok()?, 0);
    }

    None
}

/// Yearless month/day forms mean the next occurrence: this year if not yet
/// past, otherwise next year.
fn roll_forward(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    match NaiveDate::from_ymd_opt(today.year(), month, day) {
        Some(d) if d >= today => Some(d),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

fn month_day(mon: &str, day: &str, today: NaiveDate) -> Option<NaiveDate> {
    let month = month_number(mon)?;
    let day: u32 = day.parse().ok()?;
    roll_forward(month, day, today)
}

fn month_number(name: &str) -> Option<u32> {
    const PREFIXES: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let n = name.to_ascii_lowercase();
    PREFIXES.iter().position(|p| n.starts_with(p)).map(|i| i as u32 + 1)
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name.to_ascii_lowercase().get(..3)? {
        "mon" => Some(Weekday::Mon),
        "tue" => Some(Weekday::Tue),
        "wed" => Some(Weekday::Wed),
        "thu" => Some(Weekday::Thu),
        "fri" => Some(Weekday::Fri),
        "sat" => Some(Weekday::Sat),
        "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Wednesday.
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 4)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn single(text: &str) -> DateMatch {
        let matches = extract(text, now());
        assert_eq!(matches.len(), 1, "expected one match in {:?}", text);
        matches.into_iter().next().unwrap()
    }

    #[test]
    fn test_relative_day_words() {
        assert_eq!(single("today").resolved.date(), date(2026, 3, 4));
        assert_eq!(single("tomorrow").resolved.date(), date(2026, 3, 5));
        assert_eq!(single("yesterday").resolved.date(), date(2026, 3, 3));
        assert!(!single("tomorrow").has_time);
        assert_eq!(single("tomorrow").resolved.time(), NaiveTime::MIN);
    }

    #[test]
    fn test_weekdays() {
        assert_eq!(single("friday").resolved.date(), date(2026, 3, 6));
        assert_eq!(single("this friday").resolved.date(), date(2026, 3, 6));
        assert_eq!(single("next friday").resolved.date(), date(2026, 3, 13));
        // Same weekday as today means a week out, not today.
        assert_eq!(single("wednesday").resolved.date(), date(2026, 3, 11));
        assert_eq!(single("Monday").resolved.date(), date(2026, 3, 9));
    }

    #[test]
    fn test_in_n_units() {
        assert_eq!(single("in 3 days").resolved.date(), date(2026, 3, 7));
        assert_eq!(single("in 1 day").resolved.date(), date(2026, 3, 5));
        assert_eq!(single("in 2 weeks").resolved.date(), date(2026, 3, 18));
    }

    #[test]
    fn test_month_name_dates_roll_forward() {
        assert_eq!(single("dec 25th").resolved.date(), date(2026, 12, 25));
        assert_eq!(single("march 10").resolved.date(), date(2026, 3, 10));
        // Already passed this year.
        assert_eq!(single("jan 5").resolved.date(), date(2027, 1, 5));
        assert_eq!(single("5 jan").resolved.date(), date(2027, 1, 5));
        assert_eq!(single("September 1st").resolved.date(), date(2026, 9, 1));
    }

    #[test]
    fn test_absolute_dates() {
        assert_eq!(single("2026-03-10").resolved.date(), date(2026, 3, 10));
        assert_eq!(single("3/15").resolved.date(), date(2026, 3, 15));
        // Passed slash date rolls to next year.
        assert_eq!(single("2/1").resolved.date(), date(2027, 2, 1));
        assert_eq!(single("12/31/27").resolved.date(), date(2027, 12, 31));
        assert_eq!(single("12/31/2027").resolved.date(), date(2027, 12, 31));
    }

    #[test]
    fn test_invalid_dates_are_dropped() {
        assert!(extract("2026-02-30", now()).is_empty());
        assert!(extract("13/45", now()).is_empty());
        assert!(extract("at 27:00", now()).is_empty());
        assert!(extract("nothing here", now()).is_empty());
    }

    #[test]
    fn test_time_attaches_to_trailing_date() {
        let m = single("5:30pm tomorrow");
        assert_eq!(m.resolved, date(2026, 3, 5).and_hms_opt(17, 30, 0).unwrap());
        assert!(m.has_time);
        assert_eq!(m.start, 0);
        assert_eq!(m.end, "5:30pm tomorrow".len());
    }

    #[test]
    fn test_time_attaches_to_leading_date() {
        let m = single("tomorrow at 5pm");
        assert_eq!(m.resolved, date(2026, 3, 5).and_hms_opt(17, 0, 0).unwrap());
        assert!(m.has_time);
        assert_eq!(&m.text, "tomorrow at 5pm");
    }

    #[test]
    fn test_standalone_time_means_today() {
        let m = single("at 17:45");
        assert_eq!(m.resolved, date(2026, 3, 4).and_hms_opt(17, 45, 0).unwrap());
        assert!(m.has_time);

        let m = single("noon");
        assert_eq!(m.resolved.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());

        let m = single("12am");
        assert_eq!(m.resolved.time(), NaiveTime::MIN);
    }

    #[test]
    fn test_candidates_in_order_of_appearance() {
        let matches = extract("today and friday", now());
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].resolved.date(), date(2026, 3, 4));
        assert_eq!(matches[1].resolved.date(), date(2026, 3, 6));
        assert!(matches[0].start < matches[1].start);
    }

    #[test]
    fn test_spans_are_slice_bounds() {
        let text = "review 2026-03-10 and friday at 9am please";
        for m in extract(text, now()) {
            assert!(m.start < m.end && m.end <= text.len());
            assert_eq!(&text[m.start..m.end], m.text);
        }
    }
}
