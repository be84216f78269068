use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use std::collections::BTreeMap;

pub const HABITS: &str = "habits";
pub const COMPLETIONS: &str = "habit_completions";

/// Marker stored on every completion document.
pub const COMPLETED_STATUS: &str = "completed";

/// On-disk store root. Collection entries are untyped documents, the way the
/// hosted backend this mimics hands them out; the typed shapes below exist
/// only past the parse boundary.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Store {
    pub version: u32,
    pub meta: Meta,
    pub collections: BTreeMap<String, Vec<Value>>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Meta {
    pub next_habit_number: u32,
    pub next_completion_number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Health,
    Productivity,
    Learning,
    Social,
    Creativity,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Health,
        Category::Productivity,
        Category::Learning,
        Category::Social,
        Category::Creativity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Health => "health",
            Category::Productivity => "productivity",
            Category::Learning => "learning",
            Category::Social => "social",
            Category::Creativity => "creativity",
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub description: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    /// Soft-delete marker. Not enforced anywhere else; inactive habits are
    /// merely hidden from default listings.
    pub active: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Completion {
    pub id: String,
    /// Weak reference: hard-deleting the habit leaves these behind.
    pub habit_id: String,
    /// When the habit was performed, not when the record was created.
    pub completion_date: DateTime<FixedOffset>,
    pub status: String,
    pub notes: Option<String>,
    /// Stored by the original backend but never read by any computation.
    pub streak_count: Option<i64>,
}

pub fn default_store() -> Store {
    let mut collections = BTreeMap::new();
    // A fresh store knows about habits only; the completions collection is
    // created by the first `done`. The streaks view degrades until then.
    collections.insert(HABITS.to_string(), Vec::new());
    Store {
        version: 1,
        meta: Meta {
            next_habit_number: 1,
            next_completion_number: 1,
        },
        collections,
    }
}
