use crate::error::CliError;
use crate::model::{Completion, Store, COMPLETED_STATUS, COMPLETIONS};
use crate::parse::parse_completions;
use crate::store::{collection, collection_mut};
use chrono::{DateTime, FixedOffset};

/// All completion documents, parsed at the boundary. Propagates the
/// missing-collection condition; only the streaks view degrades on it.
pub fn load_completions(store: &Store) -> Result<Vec<Completion>, CliError> {
    parse_completions(collection(store, COMPLETIONS)?)
}

pub fn next_completion_id(store: &mut Store) -> String {
    let n = store.meta.next_completion_number;
    let id = format!("c{:06}", n);
    store.meta.next_completion_number = n + 1;
    id
}

/// Appends a completion record. Creates the collection on first use, and
/// deliberately allows repeat completions on the same calendar day; totals
/// count every one of them.
pub fn mark_complete(
    store: &mut Store,
    habit_id: &str,
    completion_date: DateTime<FixedOffset>,
    notes: Option<&str>,
) -> Result<Completion, CliError> {
    let completion = Completion {
        id: next_completion_id(store),
        habit_id: habit_id.to_string(),
        completion_date,
        status: COMPLETED_STATUS.to_string(),
        notes: notes.map(|s| s.to_string()),
        streak_count: None,
    };
    let doc = serde_json::to_value(&completion).map_err(|_| CliError::io("Store IO error"))?;
    collection_mut(store, COMPLETIONS).push(doc);
    Ok(completion)
}

/// A habit's completions, oldest first, id as tie-break.
pub fn completions_for_habit(completions: &[Completion], habit_id: &str) -> Vec<Completion> {
    let mut out: Vec<Completion> = completions
        .iter()
        .filter(|c| c.habit_id == habit_id)
        .cloned()
        .collect();

    out.sort_by(|a, b| {
        if a.completion_date != b.completion_date {
            a.completion_date.cmp(&b.completion_date)
        } else {
            a.id.cmp(&b.id)
        }
    });

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::{day_start_timestamp, parse_day};
    use crate::model::default_store;

    fn ts(day: &str) -> DateTime<FixedOffset> {
        day_start_timestamp(parse_day(day, "day").unwrap())
    }

    #[test]
    fn first_done_creates_the_collection() {
        let mut store = default_store();
        assert!(collection(&store, COMPLETIONS).is_err());

        let c = mark_complete(&mut store, "h0001", ts("2026-01-31"), None).unwrap();
        assert_eq!(c.id, "c000001");
        assert_eq!(c.status, "completed");
        assert!(c.streak_count.is_none());

        let loaded = load_completions(&store).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].habit_id, "h0001");
    }

    #[test]
    fn same_day_repeats_are_kept() {
        let mut store = default_store();
        mark_complete(&mut store, "h0001", ts("2026-01-31"), None).unwrap();
        mark_complete(&mut store, "h0001", ts("2026-01-31"), Some("again")).unwrap();

        let loaded = load_completions(&store).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].notes.as_deref(), Some("again"));
    }

    #[test]
    fn listing_is_date_sorted_and_filtered() {
        let mut store = default_store();
        mark_complete(&mut store, "h0001", ts("2026-02-01"), None).unwrap();
        mark_complete(&mut store, "h0002", ts("2026-01-15"), None).unwrap();
        mark_complete(&mut store, "h0001", ts("2026-01-31"), None).unwrap();

        let loaded = load_completions(&store).unwrap();
        let ours = completions_for_habit(&loaded, "h0001");
        assert_eq!(ours.len(), 2);
        assert!(ours[0].completion_date < ours[1].completion_date);
    }
}
