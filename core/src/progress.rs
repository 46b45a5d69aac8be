//! Derived statistics over the workout history.

use crate::storage::WorkoutLog;
use chrono::{DateTime, Datelike, Days, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Badge {
    FirstWorkout,
    TenWorkouts,
    FiftyWorkouts,
    HundredReps,
    FiveHundredReps,
    ExerciseMaster,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::FirstWorkout => "First Workout",
            Badge::TenWorkouts => "10 Workouts",
            Badge::FiftyWorkouts => "50 Workouts",
            Badge::HundredReps => "100 Reps",
            Badge::FiveHundredReps => "500 Reps",
            Badge::ExerciseMaster => "Exercise Master",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub total_workouts: usize,
    pub total_sets: u64,
    /// Reps per set multiplied by sets, summed over every log.
    pub total_reps: u64,
    pub unique_exercises: usize,
    pub badges: Vec<Badge>,
}

pub fn summarize(logs: &[WorkoutLog]) -> ProgressSummary {
    let total_workouts = logs.len();
    let total_sets = logs.iter().map(|log| u64::from(log.sets)).sum();
    let total_reps = logs
        .iter()
        .map(|log| u64::from(log.reps) * u64::from(log.sets))
        .sum();
    let unique_exercises = logs
        .iter()
        .map(|log| log.exercise_id.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let badges = [
        (Badge::FirstWorkout, total_workouts >= 1),
        (Badge::TenWorkouts, total_workouts >= 10),
        (Badge::FiftyWorkouts, total_workouts >= 50),
        (Badge::HundredReps, total_reps >= 100),
        (Badge::FiveHundredReps, total_reps >= 500),
        (Badge::ExerciseMaster, unique_exercises >= 5),
    ]
    .into_iter()
    .filter_map(|(badge, earned)| earned.then_some(badge))
    .collect();

    ProgressSummary {
        total_workouts,
        total_sets,
        total_reps,
        unique_exercises,
        badges,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    /// 0 is Sunday.
    pub day: u8,
    pub sets: u32,
    pub reps: u32,
}

/// Per-day totals for the week (Sunday through Saturday) containing `now`,
/// with days bounded by midnight in `now`'s timezone. Logs outside that
/// week are ignored.
pub fn weekly_overview<Tz: TimeZone>(logs: &[WorkoutLog], now: &DateTime<Tz>) -> [DaySummary; 7] {
    let mut week = [0u8, 1, 2, 3, 4, 5, 6].map(|day| DaySummary {
        day,
        sets: 0,
        reps: 0,
    });

    let today = now.date_naive();
    let week_start = today - Days::new(u64::from(today.weekday().num_days_from_sunday()));
    let zone = now.timezone();

    for log in logs {
        let day = log.completed_at.with_timezone(&zone).date_naive();
        let offset = (day - week_start).num_days();
        if !(0..7).contains(&offset) {
            continue;
        }
        let entry = &mut week[day.weekday().num_days_from_sunday() as usize];
        entry.sets = entry.sets.saturating_add(log.sets);
        entry.reps = entry.reps.saturating_add(log.reps.saturating_mul(log.sets));
    }
    week
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(0, 0).unwrap()
    }

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn log(exercise: &str, sets: u32, reps: u32, completed_at: DateTime<Utc>) -> WorkoutLog {
        WorkoutLog {
            id: format!("log-{exercise}-{}", completed_at.timestamp()),
            exercise_id: exercise.to_string(),
            sets,
            reps,
            duration_seconds: None,
            completed_at,
            notes: None,
        }
    }

    #[test]
    fn empty_history_earns_nothing() {
        let summary = summarize(&[]);
        assert_eq!(summary, ProgressSummary::default());
    }

    #[test]
    fn totals_multiply_reps_by_sets() {
        let logs = vec![
            log("a", 3, 10, epoch()),
            log("b", 2, 12, epoch()),
            log("a", 5, 5, epoch()),
        ];
        let summary = summarize(&logs);
        assert_eq!(summary.total_workouts, 3);
        assert_eq!(summary.total_sets, 10);
        assert_eq!(summary.total_reps, 30 + 24 + 25);
        assert_eq!(summary.unique_exercises, 2);
        assert_eq!(summary.badges, vec![Badge::FirstWorkout]);
    }

    #[test]
    fn badges_unlock_at_thresholds() {
        let logs: Vec<WorkoutLog> = (0..10)
            .map(|i| log(&format!("exercise-{}", i % 5), 1, 10, epoch()))
            .collect();
        let summary = summarize(&logs);
        assert_eq!(
            summary.badges,
            vec![
                Badge::FirstWorkout,
                Badge::TenWorkouts,
                Badge::HundredReps,
                Badge::ExerciseMaster
            ]
        );
        assert_eq!(Badge::ExerciseMaster.label(), "Exercise Master");
    }

    #[test]
    fn large_history_earns_every_badge() {
        let logs: Vec<WorkoutLog> = (0..50)
            .map(|i| log(&format!("exercise-{}", i % 6), 2, 5, epoch()))
            .collect();
        let summary = summarize(&logs);
        assert_eq!(summary.total_reps, 500);
        assert_eq!(summary.badges.len(), 6);
        assert_eq!(summary.badges.last(), Some(&Badge::ExerciseMaster));
    }

    #[test]
    fn weekly_overview_buckets_current_week_only() {
        let logs = vec![
            log("a", 3, 10, at("2024-01-07T00:00:10Z")),
            log("b", 2, 8, at("2024-01-10T01:00:00Z")),
            log("a", 1, 5, at("2024-01-10T01:01:00Z")),
            log("c", 4, 4, at("2024-01-06T23:59:00Z")),
        ];
        let week = weekly_overview(&logs, &at("2024-01-10T03:00:00Z"));

        assert_eq!(
            week[0],
            DaySummary {
                day: 0,
                sets: 3,
                reps: 30
            }
        );
        assert_eq!(
            week[3],
            DaySummary {
                day: 3,
                sets: 3,
                reps: 21
            }
        );
        assert_eq!(
            week[6],
            DaySummary {
                day: 6,
                sets: 0,
                reps: 0
            }
        );
        assert_eq!(week.iter().map(|d| d.sets).sum::<u32>(), 6);
    }

    #[test]
    fn weekly_overview_uses_local_midnight() {
        let eastern = FixedOffset::west_opt(5 * 3600).unwrap();
        // Saturday 23:30 and Sunday 00:30 local time, both on a UTC Sunday.
        let saturday_night = at("2024-01-07T04:30:00Z");
        let sunday_morning = at("2024-01-07T05:30:00Z");
        let logs = vec![
            log("a", 2, 10, saturday_night),
            log("b", 1, 6, sunday_morning),
        ];

        let now = at("2024-01-08T15:00:00Z").with_timezone(&eastern);
        let week = weekly_overview(&logs, &now);
        assert_eq!(
            week[0],
            DaySummary {
                day: 0,
                sets: 1,
                reps: 6
            }
        );
        assert_eq!(week.iter().map(|d| d.sets).sum::<u32>(), 1);

        let previous = weekly_overview(&logs, &saturday_night.with_timezone(&eastern));
        assert_eq!(
            previous[6],
            DaySummary {
                day: 6,
                sets: 2,
                reps: 20
            }
        );
        assert_eq!(previous[0].sets, 0);
    }

    #[test]
    fn weekly_overview_near_the_epoch() {
        let logs = vec![log("a", 1, 3, epoch())];
        let week = weekly_overview(&logs, &DateTime::<Utc>::from_timestamp(3600, 0).unwrap());
        // 1970-01-01 was a Thursday.
        assert_eq!(
            week[4],
            DaySummary {
                day: 4,
                sets: 1,
                reps: 3
            }
        );
    }
}
