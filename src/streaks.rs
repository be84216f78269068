//! The streak calculator: pure functions over the full completion list.
//!
//! A streak is the run of consecutive calendar days ending *today* on which
//! the habit has at least one completion. A habit completed yesterday but not
//! today reads as streak 0, not 1; the count resets the moment a day is
//! missed, which is what pushes same-day completion. Totals count duplicate
//! same-day completions independently, while completed-today is a plain
//! existence check; both halves of that asymmetry are kept on purpose.

use crate::date::{calendar_day, previous_day};
use crate::habits::stable_habit_sort;
use crate::model::{Completion, Habit};
use chrono::NaiveDate;

/// Consecutive-day streak ending at `today`. 0 when the habit has no
/// completions, and 0 when today itself has none.
pub fn current_streak(completions: &[Completion], habit_id: &str, today: NaiveDate) -> u32 {
    // Repeats are kept; presence is all the backward walk asks about.
    let completed_days: Vec<NaiveDate> = completions
        .iter()
        .filter(|c| c.habit_id == habit_id)
        .map(|c| calendar_day(&c.completion_date))
        .collect();

    if completed_days.is_empty() {
        return 0;
    }

    let mut streak = 0u32;
    let mut cursor = today;
    while completed_days.contains(&cursor) {
        streak += 1;
        match previous_day(cursor) {
            Some(prev) => cursor = prev,
            None => break,
        }
    }

    streak
}

/// Every matching record counts, including several on one day.
pub fn total_completions(completions: &[Completion], habit_id: &str) -> u32 {
    completions.iter().filter(|c| c.habit_id == habit_id).count() as u32
}

pub fn completed_today(completions: &[Completion], habit_id: &str, today: NaiveDate) -> bool {
    completions
        .iter()
        .any(|c| c.habit_id == habit_id && calendar_day(&c.completion_date) == today)
}

/// One row of the streaks view.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StreakRow {
    pub habit_id: String,
    pub name: String,
    pub category: crate::model::Category,
    pub current_streak: u32,
    pub total_completions: u32,
    pub completed_today: bool,
}

pub fn build_streaks(
    habits: &[Habit],
    completions: &[Completion],
    today: NaiveDate,
) -> Vec<StreakRow> {
    let mut sorted: Vec<Habit> = habits.to_vec();
    sorted.sort_by(stable_habit_sort);

    sorted
        .iter()
        .map(|h| StreakRow {
            habit_id: h.id.clone(),
            name: h.name.clone(),
            category: h.category,
            current_streak: current_streak(completions, &h.id, today),
            total_completions: total_completions(completions, &h.id),
            completed_today: completed_today(completions, &h.id, today),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::{day_start_timestamp, parse_day, parse_timestamp};
    use crate::model::COMPLETED_STATUS;
    use chrono::Duration;

    fn today() -> NaiveDate {
        parse_day("2026-01-31", "today").unwrap()
    }

    fn completion(habit_id: &str, day: NaiveDate, n: u32) -> Completion {
        Completion {
            id: format!("c{:06}", n),
            habit_id: habit_id.to_string(),
            completion_date: day_start_timestamp(day),
            status: COMPLETED_STATUS.to_string(),
            notes: None,
            streak_count: None,
        }
    }

    fn on_days(habit_id: &str, offsets: &[i64]) -> Vec<Completion> {
        offsets
            .iter()
            .enumerate()
            .map(|(i, off)| completion(habit_id, today() - Duration::days(*off), i as u32 + 1))
            .collect()
    }

    #[test]
    fn no_completions_is_all_zeroes() {
        let none: Vec<Completion> = Vec::new();
        assert_eq!(current_streak(&none, "h0001", today()), 0);
        assert_eq!(total_completions(&none, "h0001"), 0);
        assert!(!completed_today(&none, "h0001", today()));
    }

    #[test]
    fn today_only_is_streak_one() {
        let cs = on_days("h0001", &[0]);
        assert_eq!(current_streak(&cs, "h0001", today()), 1);
        assert!(completed_today(&cs, "h0001", today()));
    }

    #[test]
    fn three_consecutive_days_is_streak_three() {
        // Today, yesterday, the day before; nothing three days back.
        let cs = on_days("h0001", &[0, 1, 2]);
        assert_eq!(current_streak(&cs, "h0001", today()), 3);
    }

    #[test]
    fn gap_cuts_the_streak_to_one() {
        let cs = on_days("h0001", &[0, 3]);
        assert_eq!(current_streak(&cs, "h0001", today()), 1);
        assert_eq!(total_completions(&cs, "h0001"), 2);
    }

    #[test]
    fn missing_today_is_streak_zero() {
        let cs = on_days("h0001", &[1, 2]);
        assert_eq!(current_streak(&cs, "h0001", today()), 0);
        assert!(!completed_today(&cs, "h0001", today()));
        assert_eq!(total_completions(&cs, "h0001"), 2);
    }

    #[test]
    fn same_day_duplicates_count_in_total_only() {
        let cs = on_days("h0001", &[0, 0]);
        assert_eq!(total_completions(&cs, "h0001"), 2);
        assert!(completed_today(&cs, "h0001", today()));
        assert_eq!(current_streak(&cs, "h0001", today()), 1);
    }

    #[test]
    fn habits_do_not_leak_into_each_other() {
        let mut cs = on_days("h0001", &[0, 1]);
        cs.extend(on_days("h0002", &[3]));

        assert_eq!(current_streak(&cs, "h0001", today()), 2);
        assert_eq!(total_completions(&cs, "h0001"), 2);
        assert_eq!(current_streak(&cs, "h0002", today()), 0);
        assert_eq!(total_completions(&cs, "h0002"), 1);
        assert!(!completed_today(&cs, "h0002", today()));
    }

    #[test]
    fn time_of_day_and_offset_are_discarded() {
        let late = Completion {
            id: "c000001".to_string(),
            habit_id: "h0001".to_string(),
            completion_date: parse_timestamp("2026-01-31T23:59:59-05:00", "at").unwrap(),
            status: COMPLETED_STATUS.to_string(),
            notes: None,
            streak_count: None,
        };
        assert!(completed_today(&[late.clone()], "h0001", today()));
        assert_eq!(current_streak(&[late], "h0001", today()), 1);
    }

    #[test]
    fn rows_are_name_sorted() {
        use crate::habits::make_habit;
        use crate::model::Category;

        let mk = |id: &str, name: &str| {
            make_habit(
                id.to_string(),
                name,
                Category::Learning,
                None,
                day_start_timestamp(today()),
            )
            .unwrap()
        };
        let habits = vec![mk("h0001", "Stretch"), mk("h0002", "Read")];
        let cs = on_days("h0001", &[0]);

        let rows = build_streaks(&habits, &cs, today());
        assert_eq!(rows[0].name, "Read");
        assert_eq!(rows[1].name, "Stretch");
        assert_eq!(rows[1].current_streak, 1);
        assert_eq!(rows[0].current_streak, 0);
    }
}
