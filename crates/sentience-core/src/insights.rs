//! Derived analytics ("insights") over tasks, moods, study sessions and
//! focus sessions.
//!
//! Pure: the reference day is an argument and nothing is persisted. Windows
//! are calendar days in UTC:
//! - current week: `today - 6 ..= today`
//! - previous week: `today - 13 ..= today - 7`
//!
//! Every score is clamped to `0..=100`. Missing categories contribute zero,
//! except mood, whose average defaults to the neutral midpoint 3 of the
//! 1–5 scale.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::recorder::FocusSessionRecord;
use crate::timer::SessionKind;

const WINDOW_DAYS: i64 = 7;
const NEUTRAL_MOOD: f64 = 3.0;
const MOOD_SCALE_MAX: f64 = 5.0;
/// Points removed from mood stability per unit of standard deviation.
const MOOD_SPREAD_PENALTY: f64 = 10.0;
/// Two 25-minute work sessions a day.
const WEEKLY_FOCUS_TARGET_MIN: f64 = 350.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub date: DateTime<Utc>,
    /// 1 (low) to 5 (high).
    pub mood: u8,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    #[serde(default)]
    pub subject: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub completed: bool,
}

/// The non-focus inputs, as the CLI reads them from a snapshot file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySnapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub moods: Vec<MoodEntry>,
    #[serde(default)]
    pub study_sessions: Vec<StudySession>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeeklyTrend {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub productivity_score: u32,
    pub consistency_score: u32,
    pub study_efficiency: u32,
    pub focus_quality: u32,
    pub mood_stability: u32,
    pub weekly_trend: WeeklyTrend,
    pub overall_wellness: u32,
    pub average_mood: f64,
    pub work_minutes_week: u64,
    pub study_minutes_week: u64,
    pub active_streak_days: u32,
}

/// Window of `WINDOW_DAYS` days ending at `end` (inclusive).
#[derive(Debug, Clone, Copy)]
struct Week {
    end: NaiveDate,
}

impl Week {
    fn ending(end: NaiveDate) -> Self {
        Self { end }
    }

    fn previous(self) -> Self {
        Self {
            end: self.end - Duration::days(WINDOW_DAYS),
        }
    }

    fn contains(self, at: &DateTime<Utc>) -> bool {
        let day = at.date_naive();
        day <= self.end && day > self.end - Duration::days(WINDOW_DAYS)
    }
}

pub fn compute_insights(
    tasks: &[Task],
    moods: &[MoodEntry],
    study: &[StudySession],
    focus: &[FocusSessionRecord],
    today: NaiveDate,
) -> Insights {
    let week = Week::ending(today);

    let productivity_score = percent(
        tasks.iter().filter(|t| t.status == TaskStatus::Done).count() as f64,
        tasks.len() as f64,
    );

    let active_days = activity_days(tasks, moods, study, focus);
    let days_this_week = active_days
        .iter()
        .filter(|d| **d <= today && **d > today - Duration::days(WINDOW_DAYS))
        .count();
    let consistency_score = percent(days_this_week as f64, WINDOW_DAYS as f64);

    let study_week: Vec<&StudySession> =
        study.iter().filter(|s| week.contains(&s.date)).collect();
    let study_efficiency = percent(
        study_week.iter().filter(|s| s.completed).count() as f64,
        study_week.len() as f64,
    );
    let study_minutes_week = study_week
        .iter()
        .map(|s| u64::from(s.duration_minutes))
        .sum();

    let work_minutes_week: u64 = focus
        .iter()
        .filter(|r| r.kind == SessionKind::Work && week.contains(&r.date))
        .map(|r| u64::from(r.duration))
        .sum();
    let focus_quality = percent(work_minutes_week as f64, WEEKLY_FOCUS_TARGET_MIN);

    let mood_values: Vec<f64> = moods
        .iter()
        .filter(|m| week.contains(&m.date))
        .map(|m| f64::from(m.mood.clamp(1, 5)))
        .collect();
    let (average_mood, spread) = mean_and_stddev(&mood_values);
    let mood_stability =
        clamp_score(average_mood / MOOD_SCALE_MAX * 100.0 - spread * MOOD_SPREAD_PENALTY);

    let current = count_items(tasks, moods, study, focus, week);
    let previous = count_items(tasks, moods, study, focus, week.previous());
    let weekly_trend = match current.cmp(&previous) {
        std::cmp::Ordering::Greater => WeeklyTrend::Improving,
        std::cmp::Ordering::Less => WeeklyTrend::Declining,
        std::cmp::Ordering::Equal => WeeklyTrend::Stable,
    };

    let components = [
        productivity_score,
        consistency_score,
        study_efficiency,
        focus_quality,
        mood_stability,
    ];
    let overall_wellness = clamp_score(
        components.iter().map(|&c| f64::from(c)).sum::<f64>() / components.len() as f64,
    );

    Insights {
        productivity_score,
        consistency_score,
        study_efficiency,
        focus_quality,
        mood_stability,
        weekly_trend,
        overall_wellness,
        average_mood,
        work_minutes_week,
        study_minutes_week,
        active_streak_days: streak(&active_days, today),
    }
}

/// `compute_insights` against today's UTC date.
pub fn compute_insights_now(
    tasks: &[Task],
    moods: &[MoodEntry],
    study: &[StudySession],
    focus: &[FocusSessionRecord],
) -> Insights {
    compute_insights(tasks, moods, study, focus, Utc::now().date_naive())
}

fn activity_days(
    tasks: &[Task],
    moods: &[MoodEntry],
    study: &[StudySession],
    focus: &[FocusSessionRecord],
) -> BTreeSet<NaiveDate> {
    tasks
        .iter()
        .map(|t| t.created_at)
        .chain(moods.iter().map(|m| m.date))
        .chain(study.iter().map(|s| s.date))
        .chain(focus.iter().map(|r| r.date))
        .map(|at| at.date_naive())
        .collect()
}

fn count_items(
    tasks: &[Task],
    moods: &[MoodEntry],
    study: &[StudySession],
    focus: &[FocusSessionRecord],
    week: Week,
) -> usize {
    tasks.iter().filter(|t| week.contains(&t.created_at)).count()
        + moods.iter().filter(|m| week.contains(&m.date)).count()
        + study.iter().filter(|s| week.contains(&s.date)).count()
        + focus.iter().filter(|r| week.contains(&r.date)).count()
}

/// Consecutive active days ending today, or yesterday if today is still empty.
fn streak(active_days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut day = if active_days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };
    let mut count = 0;
    while active_days.contains(&day) {
        count += 1;
        day -= Duration::days(1);
    }
    count
}

fn mean_and_stddev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (NEUTRAL_MOOD, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

fn percent(part: f64, whole: f64) -> u32 {
    if whole <= 0.0 {
        return 0;
    }
    clamp_score(part / whole * 100.0)
}

fn clamp_score(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 10).unwrap()
    }

    fn days_ago(n: i64) -> DateTime<Utc> {
        let day = today() - Duration::days(n);
        Utc.from_utc_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
    }

    fn task(status: TaskStatus, n: i64) -> Task {
        Task {
            id: format!("t{n}"),
            title: "read chapter".into(),
            status,
            created_at: days_ago(n),
            due_date: None,
        }
    }

    fn mood(value: u8, n: i64) -> MoodEntry {
        MoodEntry {
            date: days_ago(n),
            mood: value,
            note: None,
        }
    }

    fn study(completed: bool, minutes: u32, n: i64) -> StudySession {
        StudySession {
            subject: "math".into(),
            date: days_ago(n),
            duration_minutes: minutes,
            completed,
        }
    }

    fn work(minutes: u32, n: i64) -> FocusSessionRecord {
        FocusSessionRecord {
            id: format!("w{n}-{minutes}"),
            date: days_ago(n),
            duration: minutes,
            kind: SessionKind::Work,
        }
    }

    #[test]
    fn empty_inputs_give_neutral_defaults() {
        let insights = compute_insights(&[], &[], &[], &[], today());
        assert_eq!(insights.productivity_score, 0);
        assert_eq!(insights.consistency_score, 0);
        assert_eq!(insights.study_efficiency, 0);
        assert_eq!(insights.focus_quality, 0);
        assert_eq!(insights.mood_stability, 60);
        assert_eq!(insights.overall_wellness, 12);
        assert_eq!(insights.weekly_trend, WeeklyTrend::Stable);
        assert_eq!(insights.average_mood, 3.0);
        assert_eq!(insights.active_streak_days, 0);
    }

    #[test]
    fn productivity_counts_done_tasks() {
        let tasks = vec![
            task(TaskStatus::Done, 0),
            task(TaskStatus::Done, 1),
            task(TaskStatus::InProgress, 2),
        ];
        let insights = compute_insights(&tasks, &[], &[], &[], today());
        assert_eq!(insights.productivity_score, 67);
    }

    #[test]
    fn consistency_counts_distinct_days_in_window() {
        let focus = vec![work(25, 0), work(25, 0), work(25, 3)];
        let moods = vec![mood(4, 6), mood(4, 7)];
        let insights = compute_insights(&[], &moods, &[], &focus, today());
        // Days 0, 3 and 6 are inside the window; day 7 is not.
        assert_eq!(insights.consistency_score, 43);
    }

    #[test]
    fn focus_quality_scales_to_weekly_target_and_clamps() {
        let focus = vec![work(25, 0), work(50, 1), work(100, 2)];
        assert_eq!(compute_insights(&[], &[], &[], &focus, today()).focus_quality, 50);

        let heavy: Vec<_> = (0..7).map(|n| work(120, n)).collect();
        let insights = compute_insights(&[], &[], &[], &heavy, today());
        assert_eq!(insights.focus_quality, 100);
        assert_eq!(insights.work_minutes_week, 840);
    }

    #[test]
    fn weekly_minutes_do_not_overflow() {
        let focus = vec![work(u32::MAX, 0), work(u32::MAX, 1)];
        let sessions = vec![study(true, u32::MAX, 0), study(true, u32::MAX, 1)];
        let insights = compute_insights(&[], &[], &sessions, &focus, today());
        assert_eq!(insights.work_minutes_week, 2 * u64::from(u32::MAX));
        assert_eq!(insights.study_minutes_week, 2 * u64::from(u32::MAX));
        assert_eq!(insights.focus_quality, 100);
    }

    #[test]
    fn break_sessions_do_not_count_as_focus() {
        let mut rest = work(30, 0);
        rest.kind = SessionKind::Break;
        let insights = compute_insights(&[], &[], &[], &[rest], today());
        assert_eq!(insights.focus_quality, 0);
        assert_eq!(insights.work_minutes_week, 0);
    }

    #[test]
    fn study_efficiency_is_completion_rate() {
        let sessions = vec![
            study(true, 60, 0),
            study(false, 30, 1),
            study(true, 45, 2),
            study(true, 45, 3),
            study(false, 90, 10),
        ];
        let insights = compute_insights(&[], &[], &sessions, &[], today());
        assert_eq!(insights.study_efficiency, 75);
        assert_eq!(insights.study_minutes_week, 180);
    }

    #[test]
    fn mood_stability_penalizes_spread() {
        let steady = vec![mood(4, 0), mood(4, 1), mood(4, 2)];
        assert_eq!(compute_insights(&[], &steady, &[], &[], today()).mood_stability, 80);

        let swinging = vec![mood(1, 0), mood(5, 1)];
        let insights = compute_insights(&[], &swinging, &[], &[], today());
        // mean 3 -> 60, stddev 2 -> -20
        assert_eq!(insights.mood_stability, 40);
    }

    #[test]
    fn trend_compares_with_previous_week() {
        let focus = vec![work(25, 0), work(25, 1), work(25, 8)];
        assert_eq!(
            compute_insights(&[], &[], &[], &focus, today()).weekly_trend,
            WeeklyTrend::Improving
        );

        let focus = vec![work(25, 0), work(25, 8), work(25, 9)];
        assert_eq!(
            compute_insights(&[], &[], &[], &focus, today()).weekly_trend,
            WeeklyTrend::Declining
        );
    }

    #[test]
    fn overall_wellness_is_rounded_mean() {
        let tasks = vec![task(TaskStatus::Done, 0)];
        let insights = compute_insights(&tasks, &[], &[], &[], today());
        // productivity 100, consistency 14, study 0, focus 0, mood 60
        assert_eq!(insights.consistency_score, 14);
        assert_eq!(insights.overall_wellness, 35);
    }

    #[test]
    fn streak_tolerates_quiet_today() {
        let focus = vec![work(25, 1), work(25, 2), work(25, 3), work(25, 5)];
        assert_eq!(
            compute_insights(&[], &[], &[], &focus, today()).active_streak_days,
            3
        );
    }

    #[test]
    fn snapshot_parses_camel_case_json() {
        let json = r#"{
            "tasks": [{"_id": "1", "title": "essay", "status": "in-progress", "createdAt": "2026-05-09T10:00:00Z"}],
            "moods": [{"date": "2026-05-09T20:00:00Z", "mood": 4}],
            "studySessions": [{"subject": "bio", "date": "2026-05-08T15:00:00Z", "durationMinutes": 40, "completed": true}]
        }"#;
        let snapshot: ActivitySnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.tasks[0].status, TaskStatus::InProgress);
        assert_eq!(snapshot.moods[0].mood, 4);
        assert_eq!(snapshot.study_sessions[0].duration_minutes, 40);
    }
}
