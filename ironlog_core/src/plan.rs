//! Plan loading and normalization.
//!
//! Plans arrive in several shapes (a plan object, a `{plan, items}` wrapper,
//! or a bare item array) with snake_case or camelCase field names and loosely
//! typed numbers. Everything is normalized here into a single [`Plan`] so the
//! engine only ever sees one canonical shape.

use crate::{Error, Plan, PlanDay, PlanItem, RepTarget, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Largest set target a single plan item may ask for
pub const MAX_TARGET_SETS: u32 = 100;

/// Anything that can supply a plan to the engine
pub trait PlanSource {
    fn load_plan(&self) -> Result<Plan>;
}

/// A plan stored as a JSON file
pub struct JsonPlanFile {
    path: PathBuf,
}

impl JsonPlanFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlanSource for JsonPlanFile {
    fn load_plan(&self) -> Result<Plan> {
        let contents = std::fs::read_to_string(&self.path)?;
        let value: Value = serde_json::from_str(&contents)?;
        let mut plan = normalize_plan(value)?;

        // Fall back to the file stem when the payload carries no identity
        if plan.id.is_empty() {
            plan.id = self
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "plan".into());
        }
        if plan.name.is_empty() {
            plan.name = plan.id.clone();
        }

        tracing::info!(
            "Loaded plan '{}' ({} items) from {:?}",
            plan.name,
            plan.items.len(),
            self.path
        );
        Ok(plan)
    }
}

// ============================================================================
// Raw payload shapes
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPayload {
    // Variant order matters: structs also deserialize from sequences, so
    // the bare array shape has to be tried first.
    Items(Vec<RawItem>),
    Wrapped {
        plan: RawPlan,
        #[serde(default, alias = "exercises")]
        items: Option<Vec<RawItem>>,
    },
    Plan(RawPlan),
}

#[derive(Debug, Deserialize)]
struct RawPlan {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, alias = "title")]
    name: Option<String>,
    #[serde(default, alias = "exercises")]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, alias = "exerciseId")]
    exercise_id: Option<Value>,
    #[serde(default, alias = "exercise_name", alias = "exerciseName")]
    name: Option<String>,
    #[serde(default)]
    day: Option<Value>,
    #[serde(default, alias = "orderIndex", alias = "position")]
    order_index: Option<Value>,
    #[serde(default, alias = "target_sets", alias = "targetSets")]
    sets: Option<Value>,
    #[serde(default, alias = "target_reps", alias = "targetReps")]
    reps: Option<Value>,
}

/// Normalize a JSON plan payload into a canonical [`Plan`].
///
/// Items are sorted by `(day, order_index)` and validated; any validation
/// problem is reported as [`Error::Plan`].
pub fn normalize_plan(value: Value) -> Result<Plan> {
    let payload: RawPayload = serde_json::from_value(value)
        .map_err(|e| Error::Plan(format!("unrecognised plan payload: {}", e)))?;

    let (id, name, raw_items) = match payload {
        RawPayload::Wrapped { plan, items } => {
            let items = items.unwrap_or(plan.items);
            (plan.id, plan.name, items)
        }
        RawPayload::Plan(plan) => (plan.id, plan.name, plan.items),
        RawPayload::Items(items) => (None, None, items),
    };

    let mut items = raw_items
        .into_iter()
        .enumerate()
        .map(|(position, raw)| normalize_item(position, raw))
        .collect::<Result<Vec<_>>>()?;

    items.sort_by_key(|item| (item.day, item.order_index));

    let plan = Plan {
        id: id.as_ref().map(value_to_string).unwrap_or_default(),
        name: name.unwrap_or_default(),
        items,
    };

    let errors = plan.validate();
    if !errors.is_empty() {
        return Err(Error::Plan(errors.join("; ")));
    }

    tracing::debug!(
        "Normalized plan '{}' with {} items over {} days",
        plan.id,
        plan.items.len(),
        plan.days().len()
    );
    Ok(plan)
}

/// Normalize a plan from JSON text
pub fn normalize_plan_str(json: &str) -> Result<Plan> {
    normalize_plan(serde_json::from_str(json)?)
}

fn normalize_item(position: usize, raw: RawItem) -> Result<PlanItem> {
    let label = format!("item {}", position + 1);

    let exercise_id = raw
        .exercise_id
        .as_ref()
        .or(raw.id.as_ref())
        .map(value_to_string)
        .ok_or_else(|| Error::Plan(format!("{}: missing exercise_id", label)))?;

    let target_sets = match raw.sets.as_ref() {
        Some(v) => value_to_u32(v, &label, "sets")?,
        None => return Err(Error::Plan(format!("{}: missing sets", label))),
    };
    if target_sets > MAX_TARGET_SETS {
        return Err(Error::Plan(format!(
            "{}: sets must be at most {}, got {}",
            label, MAX_TARGET_SETS, target_sets
        )));
    }

    let day = match raw.day.as_ref() {
        Some(v) => value_to_u32(v, &label, "day")?,
        None => 1,
    };

    let order_index = match raw.order_index.as_ref() {
        Some(v) => value_to_u32(v, &label, "order_index")?,
        None => position as u32,
    };

    let target_reps = match raw.reps {
        Some(Value::Number(n)) => RepTarget::parse(&n.to_string()),
        Some(Value::String(s)) => RepTarget::parse(&s),
        Some(Value::Null) | None => RepTarget::Text(String::new()),
        Some(other) => {
            return Err(Error::Plan(format!(
                "{}: reps must be a number or string, got {}",
                label, other
            )))
        }
    };

    let exercise_name = raw
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| exercise_id.clone());

    Ok(PlanItem {
        exercise_id,
        exercise_name,
        day,
        order_index,
        target_sets,
        target_reps,
    })
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn value_to_u32(value: &Value, label: &str, field: &str) -> Result<u32> {
    let parsed = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            Error::Plan(format!(
                "{}: {} must be a non-negative integer, got {}",
                label, field, value
            ))
        })
}

// ============================================================================
// Plan queries
// ============================================================================

impl Plan {
    /// Check structural invariants, returning one message per problem
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for item in &self.items {
            if item.exercise_id.is_empty() {
                errors.push(format!("Item '{}' has an empty exercise id", item.exercise_name));
            }
            if item.day == 0 {
                errors.push(format!(
                    "Exercise '{}' has day 0 (days are 1-based)",
                    item.exercise_id
                ));
            }
            if !seen.insert((item.day, item.order_index)) {
                errors.push(format!(
                    "Duplicate order_index {} on day {}",
                    item.order_index, item.day
                ));
            }
        }

        errors
    }

    /// Distinct training days, ascending
    pub fn days(&self) -> Vec<u32> {
        self.items
            .iter()
            .map(|item| item.day)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Select the items of one training day in execution order.
    ///
    /// An empty plan yields an empty day; otherwise an unknown day is an error.
    pub fn day(&self, day: u32) -> Result<PlanDay> {
        let mut items: Vec<PlanItem> = self
            .items
            .iter()
            .filter(|item| item.day == day)
            .cloned()
            .collect();

        if items.is_empty() && !self.items.is_empty() {
            return Err(Error::Plan(format!(
                "Plan '{}' has no day {} (available: {:?})",
                self.id,
                day,
                self.days()
            )));
        }

        items.sort_by_key(|item| item.order_index);

        Ok(PlanDay {
            plan_id: self.id.clone(),
            plan_name: self.name.clone(),
            day,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_oversized_set_target_rejected() {
        let err = normalize_plan(json!([
            {"exercise_id": "squat", "sets": 4_000_000_000u64},
            {"exercise_id": "bench", "sets": 4_000_000_000u64}
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Plan(msg) if msg.contains("at most 100")));

        let plan = normalize_plan(json!([{"exercise_id": "squat", "sets": MAX_TARGET_SETS}])).unwrap();
        assert_eq!(plan.day(1).unwrap().total_sets(), MAX_TARGET_SETS);
    }

    #[test]
    fn test_normalize_plan_object() {
        let plan = normalize_plan(json!({
            "id": 7,
            "name": "Push Pull",
            "items": [
                {"exercise_id": "row", "name": "Row", "day": 2, "order_index": 0, "sets": 3, "reps": "8-12"},
                {"exercise_id": "bench", "name": "Bench", "day": 1, "order_index": 1, "sets": 4, "reps": 6},
                {"exercise_id": "ohp", "name": "Press", "day": 1, "order_index": 0, "sets": "3", "reps": "10"}
            ]
        }))
        .unwrap();

        assert_eq!(plan.id, "7");
        assert_eq!(plan.name, "Push Pull");
        let ids: Vec<_> = plan.items.iter().map(|i| i.exercise_id.as_str()).collect();
        assert_eq!(ids, vec!["ohp", "bench", "row"]);
        assert_eq!(plan.items[0].target_sets, 3);
        assert_eq!(plan.items[1].target_reps, RepTarget::Exact(6));
        assert_eq!(plan.items[2].target_reps, RepTarget::Range { min: 8, max: 12 });
    }

    #[test]
    fn test_normalize_camel_case_wrapper() {
        let plan = normalize_plan(json!({
            "plan": {"id": "fbw", "name": "Full Body"},
            "items": [
                {"id": 1, "exerciseId": 42, "exerciseName": "Squat", "day": 1, "orderIndex": 0, "targetSets": 5, "targetReps": "5"}
            ]
        }))
        .unwrap();

        assert_eq!(plan.id, "fbw");
        assert_eq!(plan.items[0].exercise_id, "42");
        assert_eq!(plan.items[0].exercise_name, "Squat");
        assert_eq!(plan.items[0].target_sets, 5);
    }

    #[test]
    fn test_normalize_bare_array_defaults() {
        let plan = normalize_plan(json!([
            {"exercise_id": "pullup", "sets": 3},
            {"exercise_id": "dip", "name": "Dip", "sets": 2, "reps": "AMRAP"}
        ]))
        .unwrap();

        assert_eq!(plan.items.len(), 2);
        assert_eq!(plan.items[0].day, 1);
        assert_eq!(plan.items[0].order_index, 0);
        assert_eq!(plan.items[0].exercise_name, "pullup");
        assert_eq!(plan.items[1].order_index, 1);
        assert_eq!(plan.items[1].target_reps, RepTarget::Text("AMRAP".into()));
    }

    #[test]
    fn test_normalize_rejects_negative_sets() {
        let err = normalize_plan(json!([{"exercise_id": "x", "sets": -1}])).unwrap_err();
        assert!(matches!(err, Error::Plan(_)));
    }

    #[test]
    fn test_normalize_rejects_missing_exercise() {
        let err = normalize_plan(json!([{"sets": 3}])).unwrap_err();
        assert!(err.to_string().contains("missing exercise_id"));
    }

    #[test]
    fn test_normalize_rejects_duplicate_order() {
        let err = normalize_plan(json!([
            {"exercise_id": "a", "sets": 1, "order_index": 0},
            {"exercise_id": "b", "sets": 1, "order_index": 0}
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate order_index"));
    }

    #[test]
    fn test_day_selection() {
        let plan = normalize_plan(json!([
            {"exercise_id": "a", "sets": 1, "day": 1},
            {"exercise_id": "b", "sets": 1, "day": 2},
            {"exercise_id": "c", "sets": 1, "day": 2}
        ]))
        .unwrap();

        assert_eq!(plan.days(), vec![1, 2]);
        let day = plan.day(2).unwrap();
        assert_eq!(day.items.len(), 2);
        assert_eq!(day.items[0].exercise_id, "b");
        assert!(plan.day(3).is_err());
    }

    #[test]
    fn test_empty_plan_yields_empty_day() {
        let plan = normalize_plan(json!({"id": "empty", "items": []})).unwrap();
        let day = plan.day(1).unwrap();
        assert!(day.items.is_empty());
    }

    #[test]
    fn test_json_plan_file_uses_file_stem() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("legs.json");
        std::fs::write(&path, r#"[{"exercise_id": "squat", "sets": 5, "reps": 5}]"#).unwrap();

        let plan = JsonPlanFile::new(&path).load_plan().unwrap();
        assert_eq!(plan.id, "legs");
        assert_eq!(plan.name, "legs");
    }
}
