//! Boundary between the untyped store documents and the typed model.
//!
//! Collections hold raw JSON documents; everything inward of this module
//! works with `Habit`/`Completion`. Malformed documents fail here with a
//! parse error naming the collection, index, and field instead of leaking
//! half-valid data into the computations.

use crate::date::parse_timestamp;
use crate::error::CliError;
use crate::model::{Category, Completion, Habit, COMPLETIONS, HABITS};
use chrono::{DateTime, FixedOffset};
use serde_json::Value;

pub const NAME_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 255;

/// Habit name rules, shared by the parse boundary and CLI input.
pub fn validate_name(name: &str) -> Result<String, CliError> {
    let n = name.trim();
    if n.is_empty() {
        return Err(CliError::usage("Habit name is required"));
    }
    if n.chars().count() > NAME_MAX {
        return Err(CliError::usage(format!(
            "Habit name exceeds {} characters",
            NAME_MAX
        )));
    }
    Ok(n.to_string())
}

pub fn validate_description(description: Option<&str>) -> Result<Option<String>, CliError> {
    match description {
        None => Ok(None),
        Some(d) => {
            if d.chars().count() > DESCRIPTION_MAX {
                return Err(CliError::usage(format!(
                    "Description exceeds {} characters",
                    DESCRIPTION_MAX
                )));
            }
            Ok(Some(d.to_string()))
        }
    }
}

pub fn parse_category(s: &str) -> Result<Category, CliError> {
    let wanted = s.trim().to_lowercase();
    Category::ALL
        .into_iter()
        .find(|c| c.as_str() == wanted)
        .ok_or_else(|| {
            let allowed = Category::ALL
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<&str>>()
                .join(", ");
            CliError::usage(format!("Invalid category: {} (one of: {})", s, allowed))
        })
}

fn field<'a>(doc: &'a Value, ctx: &str, key: &str) -> Result<&'a Value, CliError> {
    doc.get(key)
        .ok_or_else(|| CliError::parse(format!("{}: missing field `{}`", ctx, key)))
}

fn string_field(doc: &Value, ctx: &str, key: &str) -> Result<String, CliError> {
    field(doc, ctx, key)?
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| CliError::parse(format!("{}: field `{}` must be a string", ctx, key)))
}

fn opt_string_field(doc: &Value, ctx: &str, key: &str) -> Result<Option<String>, CliError> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(CliError::parse(format!(
            "{}: field `{}` must be a string or null",
            ctx, key
        ))),
    }
}

fn bool_field(doc: &Value, ctx: &str, key: &str) -> Result<bool, CliError> {
    field(doc, ctx, key)?
        .as_bool()
        .ok_or_else(|| CliError::parse(format!("{}: field `{}` must be a boolean", ctx, key)))
}

fn opt_int_field(doc: &Value, ctx: &str, key: &str) -> Result<Option<i64>, CliError> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_i64().map(Some).ok_or_else(|| {
            CliError::parse(format!("{}: field `{}` must be an integer or null", ctx, key))
        }),
    }
}

fn timestamp_field(
    doc: &Value,
    ctx: &str,
    key: &str,
) -> Result<DateTime<FixedOffset>, CliError> {
    let raw = string_field(doc, ctx, key)?;
    parse_timestamp(&raw, key)
        .map_err(|_| CliError::parse(format!("{}: field `{}` is not RFC3339: {}", ctx, key, raw)))
}

fn opt_timestamp_field(
    doc: &Value,
    ctx: &str,
    key: &str,
) -> Result<Option<DateTime<FixedOffset>>, CliError> {
    match opt_string_field(doc, ctx, key)? {
        None => Ok(None),
        Some(raw) => parse_timestamp(&raw, key)
            .map(Some)
            .map_err(|_| CliError::parse(format!("{}: field `{}` is not RFC3339: {}", ctx, key, raw))),
    }
}

fn required_id(doc: &Value, ctx: &str) -> Result<String, CliError> {
    let id = string_field(doc, ctx, "id")?;
    if id.trim().is_empty() {
        return Err(CliError::parse(format!("{}: field `id` is empty", ctx)));
    }
    Ok(id)
}

pub fn parse_habit(doc: &Value, ctx: &str) -> Result<Habit, CliError> {
    let name = string_field(doc, ctx, "name")?;
    validate_name(&name)
        .map_err(|_| CliError::parse(format!("{}: field `name` is invalid", ctx)))?;

    let description = opt_string_field(doc, ctx, "description")?;
    validate_description(description.as_deref())
        .map_err(|_| CliError::parse(format!("{}: field `description` is invalid", ctx)))?;

    let category_raw = string_field(doc, ctx, "category")?;
    let category = parse_category(&category_raw)
        .map_err(|_| CliError::parse(format!("{}: unknown category: {}", ctx, category_raw)))?;

    Ok(Habit {
        id: required_id(doc, ctx)?,
        name,
        category,
        description,
        created_at: timestamp_field(doc, ctx, "created_at")?,
        updated_at: opt_timestamp_field(doc, ctx, "updated_at")?,
        active: bool_field(doc, ctx, "active")?,
    })
}

pub fn parse_completion(doc: &Value, ctx: &str) -> Result<Completion, CliError> {
    Ok(Completion {
        id: required_id(doc, ctx)?,
        habit_id: string_field(doc, ctx, "habit_id")?,
        completion_date: timestamp_field(doc, ctx, "completion_date")?,
        status: string_field(doc, ctx, "status")?,
        notes: opt_string_field(doc, ctx, "notes")?,
        streak_count: opt_int_field(doc, ctx, "streak_count")?,
    })
}

pub fn parse_habits(docs: &[Value]) -> Result<Vec<Habit>, CliError> {
    docs.iter()
        .enumerate()
        .map(|(i, doc)| parse_habit(doc, &format!("{}[{}]", HABITS, i)))
        .collect()
}

pub fn parse_completions(docs: &[Value]) -> Result<Vec<Completion>, CliError> {
    docs.iter()
        .enumerate()
        .map(|(i, doc)| parse_completion(doc, &format!("{}[{}]", COMPLETIONS, i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn habit_doc() -> Value {
        json!({
            "id": "h0001",
            "name": "Stretch",
            "category": "health",
            "description": null,
            "created_at": "2026-01-31T08:00:00Z",
            "updated_at": null,
            "active": true
        })
    }

    #[test]
    fn habit_doc_round_trip() {
        let h = parse_habit(&habit_doc(), "habits[0]").unwrap();
        assert_eq!(h.id, "h0001");
        assert_eq!(h.category.as_str(), "health");
        assert!(h.active);
        assert!(h.description.is_none());
    }

    #[test]
    fn habit_doc_missing_field_is_located() {
        let mut doc = habit_doc();
        doc.as_object_mut().unwrap().remove("category");
        let err = parse_habit(&doc, "habits[2]").unwrap_err();
        assert_eq!(err.exit_code, 7);
        assert!(err.message.contains("habits[2]"));
        assert!(err.message.contains("category"));
    }

    #[test]
    fn habit_doc_rejects_unknown_category() {
        let mut doc = habit_doc();
        doc["category"] = json!("fitness");
        let err = parse_habit(&doc, "habits[0]").unwrap_err();
        assert_eq!(err.exit_code, 7);
        assert!(err.message.contains("fitness"));
    }

    #[test]
    fn habit_doc_rejects_bad_timestamp() {
        let mut doc = habit_doc();
        doc["created_at"] = json!("yesterday");
        let err = parse_habit(&doc, "habits[0]").unwrap_err();
        assert_eq!(err.exit_code, 7);
        assert!(err.message.contains("created_at"));
    }

    #[test]
    fn completion_doc_keeps_dead_streak_count() {
        let doc = json!({
            "id": "c000001",
            "habit_id": "h0001",
            "completion_date": "2026-01-31T00:00:00Z",
            "status": "completed",
            "notes": null,
            "streak_count": 7
        });
        let c = parse_completion(&doc, "habit_completions[0]").unwrap();
        assert_eq!(c.streak_count, Some(7));
        assert_eq!(c.status, "completed");
    }

    #[test]
    fn name_limits() {
        assert!(validate_name("  ").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
        assert_eq!(validate_name("  Read  ").unwrap(), "Read");
        assert!(validate_description(Some(&"x".repeat(256))).is_err());
        assert!(validate_description(Some("ok")).is_ok());
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!(parse_category("Health").unwrap().as_str(), "health");
        assert!(parse_category("sleep").is_err());
    }
}
