use crate::error::CliError;
use crate::model::{Category, Habit, Store, HABITS};
use crate::parse::{parse_habits, validate_description, validate_name};
use crate::store::{collection, collection_mut};
use chrono::{DateTime, FixedOffset};

/// All habit documents, parsed at the boundary.
pub fn load_habits(store: &Store) -> Result<Vec<Habit>, CliError> {
    parse_habits(collection(store, HABITS)?)
}

pub fn next_habit_id(store: &mut Store) -> String {
    let n = store.meta.next_habit_number;
    let id = format!("h{:04}", n);
    store.meta.next_habit_number = n + 1;
    id
}

pub fn stable_habit_sort(a: &Habit, b: &Habit) -> std::cmp::Ordering {
    let an = a.name.to_lowercase();
    let bn = b.name.to_lowercase();
    match an.cmp(&bn) {
        std::cmp::Ordering::Equal => a.id.cmp(&b.id),
        o => o,
    }
}

pub fn list_habits(habits: &[Habit], include_inactive: bool) -> Vec<Habit> {
    let mut out: Vec<Habit> = habits
        .iter()
        .filter(|h| include_inactive || h.active)
        .cloned()
        .collect();
    out.sort_by(stable_habit_sort);
    out
}

/// Resolves a selector to an index into `habits`: exact id (`h0001`) or a
/// unique case-insensitive name prefix.
pub fn select_habit(
    habits: &[Habit],
    selector: &str,
    include_inactive: bool,
) -> Result<usize, CliError> {
    let s = selector.trim();
    if s.is_empty() {
        return Err(CliError::usage("Habit selector is required"));
    }

    if s.len() == 5 && s.starts_with('h') && s[1..].chars().all(|c| c.is_ascii_digit()) {
        let idx = habits.iter().position(|h| h.id == s);
        return match idx {
            Some(i) => {
                if !include_inactive && !habits[i].active {
                    Err(CliError::not_found(format!("Habit not found: {}", selector)))
                } else {
                    Ok(i)
                }
            }
            None => Err(CliError::not_found(format!("Habit not found: {}", selector))),
        };
    }

    let prefix = s.to_lowercase();
    let mut matches: Vec<(usize, Habit)> = habits
        .iter()
        .enumerate()
        .filter(|(_, h)| include_inactive || h.active)
        .filter(|(_, h)| h.name.to_lowercase().starts_with(&prefix))
        .map(|(i, h)| (i, h.clone()))
        .collect();

    matches.sort_by(|a, b| stable_habit_sort(&a.1, &b.1));

    if matches.is_empty() {
        return Err(CliError::not_found(format!("Habit not found: {}", selector)));
    }

    if matches.len() > 1 {
        let candidates = matches
            .iter()
            .map(|(_, h)| format!("{} {}", h.id, h.name))
            .collect::<Vec<String>>()
            .join(", ");
        return Err(CliError::ambiguous(format!(
            "Ambiguous selector '{}'. Candidates: {}",
            selector, candidates
        )));
    }

    Ok(matches[0].0)
}

pub fn make_habit(
    id: String,
    name: &str,
    category: Category,
    description: Option<&str>,
    created_at: DateTime<FixedOffset>,
) -> Result<Habit, CliError> {
    let name = validate_name(name)?;
    let description = validate_description(description)?;

    Ok(Habit {
        id,
        name,
        category,
        description,
        created_at,
        updated_at: None,
        active: true,
    })
}

#[derive(Debug, Default, Clone)]
pub struct HabitUpdate {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

impl HabitUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.active.is_none()
    }
}

/// Soft update: changed fields plus `updated_at`, everything else untouched.
pub fn apply_update(
    habit: &mut Habit,
    update: &HabitUpdate,
    updated_at: DateTime<FixedOffset>,
) -> Result<(), CliError> {
    if let Some(ref name) = update.name {
        habit.name = validate_name(name)?;
    }
    if let Some(category) = update.category {
        habit.category = category;
    }
    if let Some(ref description) = update.description {
        habit.description = validate_description(Some(description))?;
    }
    if let Some(active) = update.active {
        habit.active = active;
    }
    habit.updated_at = Some(updated_at);
    Ok(())
}

pub fn push_habit(store: &mut Store, habit: &Habit) -> Result<(), CliError> {
    let doc = serde_json::to_value(habit).map_err(|_| CliError::io("Store IO error"))?;
    collection_mut(store, HABITS).push(doc);
    Ok(())
}

/// Writes an edited habit back over its document.
pub fn replace_habit(store: &mut Store, habit: &Habit) -> Result<(), CliError> {
    let doc = serde_json::to_value(habit).map_err(|_| CliError::io("Store IO error"))?;
    let docs = collection_mut(store, HABITS);
    match docs
        .iter()
        .position(|d| d.get("id").and_then(|v| v.as_str()) == Some(habit.id.as_str()))
    {
        Some(i) => {
            docs[i] = doc;
            Ok(())
        }
        None => Err(CliError::not_found(format!("Habit not found: {}", habit.id))),
    }
}

/// Hard delete. Completions referencing the habit are left behind, the same
/// way the original backend leaves them.
pub fn remove_habit(store: &mut Store, habit_id: &str) -> Result<(), CliError> {
    let docs = collection_mut(store, HABITS);
    let before = docs.len();
    docs.retain(|d| d.get("id").and_then(|v| v.as_str()) != Some(habit_id));
    if docs.len() == before {
        return Err(CliError::not_found(format!("Habit not found: {}", habit_id)));
    }
    Ok(())
}
