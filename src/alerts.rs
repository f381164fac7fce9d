//! Company follow-up alert computation.
//!
//! Classifies a company's current urgency into a fixed-order segment triple
//! — meeting status, task status, log recency — for at-a-glance display in
//! list and board views. Pure: filters the activity list itself, touches no
//! state, and does all day arithmetic on calendar dates so the hour of day
//! never shifts a classification.

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::types::{parse_when, Activity, ActivityKind, AlertSegment, Company, Severity};

const MEETING_ICON: &str = "calendar";
const TASK_ICON: &str = "check";
const LOG_ICON: &str = "clock";

/// Compute the `[meeting, task, log]` alert segments for a company.
///
/// `activities` may be the full unfiltered list; only those linked to
/// `company.id` count.
pub fn compute_company_alert(company: &Company, activities: &[Activity]) -> Vec<AlertSegment> {
    compute_company_alert_at(company, activities, Local::now().date_naive())
}

/// Like [`compute_company_alert`] with an explicit "today" for testing.
pub fn compute_company_alert_at(
    company: &Company,
    activities: &[Activity],
    today: NaiveDate,
) -> Vec<AlertSegment> {
    let linked: Vec<&Activity> = activities
        .iter()
        .filter(|a| a.company_id.as_deref() == Some(company.id.as_str()))
        .collect();

    vec![
        meeting_segment(&linked, today),
        task_segment(&linked, today),
        log_segment(company.last_logged_at.as_deref(), today),
    ]
}

fn meeting_segment(linked: &[&Activity], today: NaiveDate) -> AlertSegment {
    let mut upcoming: Vec<NaiveDateTime> = Vec::new();
    let mut past: Vec<NaiveDateTime> = Vec::new();
    for a in linked {
        if a.kind != ActivityKind::Meeting {
            continue;
        }
        // Meetings without a due date count for neither partition.
        let Some(due) = a.due() else { continue };
        if due.date() >= today {
            upcoming.push(due);
        } else {
            past.push(due);
        }
    }

    if let Some(next) = upcoming.iter().min() {
        let days = (next.date() - today).num_days();
        let (severity, text) = match days {
            0 => (Severity::Info, "Meeting today".to_string()),
            1 => (Severity::Info, "Meeting tomorrow".to_string()),
            n => (Severity::Neutral, format!("Meeting in {} days", n)),
        };
        segment(MEETING_ICON, severity, text)
    } else if let Some(last) = past.iter().max() {
        let days = (today - last.date()).num_days();
        segment(
            MEETING_ICON,
            Severity::Warning,
            format!("Meeting overdue by {} days", days),
        )
    } else {
        segment(MEETING_ICON, Severity::Danger, "No meeting scheduled".to_string())
    }
}

fn task_segment(linked: &[&Activity], today: NaiveDate) -> AlertSegment {
    let incomplete: Vec<&&Activity> = linked
        .iter()
        .filter(|a| a.kind == ActivityKind::Task && !a.is_completed)
        .collect();
    if incomplete.is_empty() {
        return segment(TASK_ICON, Severity::Warning, "No tasks planned".to_string());
    }

    let with_due: Vec<NaiveDateTime> = incomplete.iter().filter_map(|a| a.due()).collect();
    let future_or_today: Vec<NaiveDateTime> = with_due
        .iter()
        .copied()
        .filter(|d| d.date() >= today)
        .collect();

    // Earliest future task wins; if everything is overdue, the least
    // overdue one (closest to today) is the headline, not the worst.
    let picked = future_or_today.iter().min().or_else(|| with_due.iter().max());
    let Some(picked) = picked else {
        return segment(TASK_ICON, Severity::Warning, "Task missing due date".to_string());
    };

    let days = (picked.date() - today).num_days();
    let (severity, text) = match days {
        d if d < 0 => (Severity::Danger, format!("Task overdue by {} days", -d)),
        0 => (Severity::Success, "Task due today".to_string()),
        1 => (Severity::Success, "Task due tomorrow".to_string()),
        n => (Severity::Neutral, format!("Task due in {} days", n)),
    };
    segment(TASK_ICON, severity, text)
}

fn log_segment(last_logged_at: Option<&str>, today: NaiveDate) -> AlertSegment {
    let Some(logged) = last_logged_at.and_then(parse_when) else {
        return segment(LOG_ICON, Severity::Warning, "Not logged -1".to_string());
    };

    let days = (today - logged.date()).num_days().max(0);
    let (severity, suffix) = if days <= 10 {
        (Severity::Neutral, " -3")
    } else if days <= 15 {
        (Severity::Warning, " -2")
    } else {
        (Severity::Danger, "")
    };
    segment(LOG_ICON, severity, format!("Logged {} days ago{}", days, suffix))
}

fn segment(icon: &str, severity: Severity, text: String) -> AlertSegment {
    AlertSegment { icon: icon.to_string(), severity, text }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 4).unwrap()
    }

    fn company(last_logged_at: Option<&str>) -> Company {
        Company {
            id: "c1".to_string(),
            name: "Acme".to_string(),
            domain: None,
            last_logged_at: last_logged_at.map(String::from),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn activity(
        kind: ActivityKind,
        due_date: Option<&str>,
        is_completed: bool,
        company_id: Option<&str>,
    ) -> Activity {
        Activity {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            title: "x".to_string(),
            due_date: due_date.map(String::from),
            has_time: false,
            is_completed,
            company_id: company_id.map(String::from),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn day(offset: i64) -> String {
        (today() + Duration::days(offset)).to_string()
    }

    #[test]
    fn test_empty_company_yields_fallback_triple() {
        let segments = compute_company_alert_at(&company(None), &[], today());
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].text, "No meeting scheduled");
        assert_eq!(segments[0].severity, Severity::Danger);
        assert_eq!(segments[1].text, "No tasks planned");
        assert_eq!(segments[1].severity, Severity::Warning);
        assert_eq!(segments[2].text, "Not logged -1");
        assert_eq!(segments[2].severity, Severity::Warning);
    }

    #[test]
    fn test_unlinked_activities_are_ignored() {
        let activities = vec![
            activity(ActivityKind::Meeting, Some(&day(1)), false, Some("other")),
            activity(ActivityKind::Task, Some(&day(1)), false, None),
        ];
        let segments = compute_company_alert_at(&company(None), &activities, today());
        assert_eq!(segments[0].text, "No meeting scheduled");
        assert_eq!(segments[1].text, "No tasks planned");
    }

    #[test]
    fn test_meeting_classification() {
        for (offset, text, severity) in [
            (0, "Meeting today", Severity::Info),
            (1, "Meeting tomorrow", Severity::Info),
            (5, "Meeting in 5 days", Severity::Neutral),
        ] {
            let activities = vec![activity(
                ActivityKind::Meeting,
                Some(&day(offset)),
                false,
                Some("c1"),
            )];
            let segments = compute_company_alert_at(&company(None), &activities, today());
            assert_eq!(segments[0].text, text);
            assert_eq!(segments[0].severity, severity);
        }
    }

    #[test]
    fn test_earliest_upcoming_meeting_wins() {
        let activities = vec![
            activity(ActivityKind::Meeting, Some(&day(7)), false, Some("c1")),
            activity(ActivityKind::Meeting, Some(&day(2)), false, Some("c1")),
            activity(ActivityKind::Meeting, Some(&day(-3)), false, Some("c1")),
        ];
        let segments = compute_company_alert_at(&company(None), &activities, today());
        assert_eq!(segments[0].text, "Meeting in 2 days");
    }

    #[test]
    fn test_most_recent_past_meeting_when_none_upcoming() {
        let activities = vec![
            activity(ActivityKind::Meeting, Some(&day(-9)), false, Some("c1")),
            activity(ActivityKind::Meeting, Some(&day(-4)), false, Some("c1")),
        ];
        let segments = compute_company_alert_at(&company(None), &activities, today());
        assert_eq!(segments[0].text, "Meeting overdue by 4 days");
        assert_eq!(segments[0].severity, Severity::Warning);
    }

    #[test]
    fn test_meeting_boundary_uses_calendar_days_not_hours() {
        // 23:59 yesterday evaluated shortly after midnight: overdue by 1 day.
        let due = format!("{}T23:59:00", today() - Duration::days(1));
        let activities = vec![activity(ActivityKind::Meeting, Some(&due), false, Some("c1"))];
        let segments = compute_company_alert_at(&company(None), &activities, today());
        assert_eq!(segments[0].text, "Meeting overdue by 1 days");

        // 00:01 tomorrow is still "tomorrow", not "in 2 days".
        let due = format!("{}T00:01:00", today() + Duration::days(1));
        let activities = vec![activity(ActivityKind::Meeting, Some(&due), false, Some("c1"))];
        let segments = compute_company_alert_at(&company(None), &activities, today());
        assert_eq!(segments[0].text, "Meeting tomorrow");
    }

    #[test]
    fn test_meetings_without_due_date_fall_out() {
        let activities = vec![
            activity(ActivityKind::Meeting, None, false, Some("c1")),
            activity(ActivityKind::Meeting, Some("garbage"), false, Some("c1")),
        ];
        let segments = compute_company_alert_at(&company(None), &activities, today());
        assert_eq!(segments[0].text, "No meeting scheduled");
    }

    #[test]
    fn test_completed_tasks_are_ignored() {
        let activities = vec![activity(ActivityKind::Task, Some(&day(1)), true, Some("c1"))];
        let segments = compute_company_alert_at(&company(None), &activities, today());
        assert_eq!(segments[1].text, "No tasks planned");
    }

    #[test]
    fn test_task_missing_due_date() {
        let activities = vec![activity(ActivityKind::Task, None, false, Some("c1"))];
        let segments = compute_company_alert_at(&company(None), &activities, today());
        assert_eq!(segments[1].text, "Task missing due date");
        assert_eq!(segments[1].severity, Severity::Warning);
    }

    #[test]
    fn test_task_classification() {
        for (offset, text, severity) in [
            (0, "Task due today", Severity::Success),
            (1, "Task due tomorrow", Severity::Success),
            (6, "Task due in 6 days", Severity::Neutral),
        ] {
            let activities = vec![activity(
                ActivityKind::Task,
                Some(&day(offset)),
                false,
                Some("c1"),
            )];
            let segments = compute_company_alert_at(&company(None), &activities, today());
            assert_eq!(segments[1].text, text);
            assert_eq!(segments[1].severity, severity);
        }
    }

    #[test]
    fn test_overdue_task_tie_break_picks_least_overdue() {
        let activities = vec![
            activity(ActivityKind::Task, Some(&day(-10)), false, Some("c1")),
            activity(ActivityKind::Task, Some(&day(-3)), false, Some("c1")),
        ];
        let segments = compute_company_alert_at(&company(None), &activities, today());
        assert_eq!(segments[1].text, "Task overdue by 3 days");
        assert_eq!(segments[1].severity, Severity::Danger);
    }

    #[test]
    fn test_future_task_beats_overdue_task() {
        let activities = vec![
            activity(ActivityKind::Task, Some(&day(-2)), false, Some("c1")),
            activity(ActivityKind::Task, Some(&day(3)), false, Some("c1")),
        ];
        let segments = compute_company_alert_at(&company(None), &activities, today());
        assert_eq!(segments[1].text, "Task due in 3 days");
    }

    #[test]
    fn test_log_recency_boundaries() {
        let cases = [
            (0, "Logged 0 days ago -3", Severity::Neutral),
            (10, "Logged 10 days ago -3", Severity::Neutral),
            (11, "Logged 11 days ago -2", Severity::Warning),
            (15, "Logged 15 days ago -2", Severity::Warning),
            (16, "Logged 16 days ago", Severity::Danger),
        ];
        for (days_ago, text, severity) in cases {
            let logged = day(-days_ago);
            let segments = compute_company_alert_at(&company(Some(&logged)), &[], today());
            assert_eq!(segments[2].text, text);
            assert_eq!(segments[2].severity, severity);
        }
    }

    #[test]
    fn test_future_log_date_clamps_to_zero() {
        let segments = compute_company_alert_at(&company(Some(&day(2))), &[], today());
        assert_eq!(segments[2].text, "Logged 0 days ago -3");
    }

    #[test]
    fn test_malformed_log_date_reads_as_never_logged() {
        let segments = compute_company_alert_at(&company(Some("not-a-date")), &[], today());
        assert_eq!(segments[2].text, "Not logged -1");
    }

    #[test]
    fn test_calls_do_not_count_as_meetings_or_tasks() {
        let activities = vec![activity(ActivityKind::Call, Some(&day(1)), false, Some("c1"))];
        let segments = compute_company_alert_at(&company(None), &activities, today());
        assert_eq!(segments[0].text, "No meeting scheduled");
        assert_eq!(segments[1].text, "No tasks planned");
    }
}
