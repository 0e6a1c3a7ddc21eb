//! Built-in exercise library and plan templates.
//!
//! Two template families are provided:
//! - FBW (full body workout): every day trains legs, push, pull and core,
//!   rotating exercise variants from day to day
//! - SPLIT: days rotate through push, pull and legs

use crate::plan::PlanSource;
use crate::{Error, Plan, PlanItem, RepTarget, Result};
use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;

/// Muscle group an exercise is filed under
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MuscleGroup {
    Legs,
    Push,
    Pull,
    Core,
}

/// An entry of the built-in exercise library
#[derive(Clone, Debug)]
pub struct Exercise {
    pub id: &'static str,
    pub name: &'static str,
    pub group: MuscleGroup,
}

/// Cached exercise library - built once and reused
static EXERCISE_LIBRARY: Lazy<Vec<Exercise>> = Lazy::new(build_exercise_library);

/// Get a reference to the cached exercise library
pub fn exercise_library() -> &'static [Exercise] {
    &EXERCISE_LIBRARY
}

fn build_exercise_library() -> Vec<Exercise> {
    use MuscleGroup::*;

    let entry = |id, name, group| Exercise { id, name, group };
    vec![
        // Legs
        entry("back_squat", "Back Squat", Legs),
        entry("romanian_deadlift", "Romanian Deadlift", Legs),
        entry("bulgarian_split_squat", "Bulgarian Split Squat", Legs),
        entry("leg_press", "Leg Press", Legs),
        // Push
        entry("bench_press", "Bench Press", Push),
        entry("overhead_press", "Overhead Press", Push),
        entry("incline_db_press", "Incline Dumbbell Press", Push),
        entry("dip", "Dip", Push),
        // Pull
        entry("barbell_row", "Barbell Row", Pull),
        entry("pullup", "Pull-up", Pull),
        entry("lat_pulldown", "Lat Pulldown", Pull),
        entry("face_pull", "Face Pull", Pull),
        // Core
        entry("plank", "Plank", Core),
        entry("hanging_leg_raise", "Hanging Leg Raise", Core),
        entry("ab_wheel", "Ab Wheel Rollout", Core),
    ]
}

fn exercises_in(group: MuscleGroup) -> Vec<&'static Exercise> {
    exercise_library()
        .iter()
        .filter(|e| e.group == group)
        .collect()
}

/// Template families
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemplateKind {
    Fbw,
    Split,
}

impl TemplateKind {
    pub fn all() -> [TemplateKind; 2] {
        [TemplateKind::Fbw, TemplateKind::Split]
    }

    pub fn id(&self) -> &'static str {
        match self {
            TemplateKind::Fbw => "fbw",
            TemplateKind::Split => "split",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TemplateKind::Fbw => "Full body workout: legs, push, pull and core every day",
            TemplateKind::Split => "Push / pull / legs split",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for TemplateKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fbw" | "full_body" | "fullbody" => Ok(TemplateKind::Fbw),
            "split" | "ppl" => Ok(TemplateKind::Split),
            other => Err(Error::Plan(format!("Unknown template: {}", other))),
        }
    }
}

pub const MIN_TEMPLATE_DAYS: u32 = 1;
pub const MAX_TEMPLATE_DAYS: u32 = 6;

/// Build a plan from a template with the given number of training days.
///
/// `days` is clamped to 1..=6.
pub fn build_template(kind: TemplateKind, days: u32) -> Plan {
    let days = days.clamp(MIN_TEMPLATE_DAYS, MAX_TEMPLATE_DAYS);
    let items = match kind {
        TemplateKind::Fbw => fbw_items(days),
        TemplateKind::Split => split_items(days),
    };

    tracing::debug!("Built {} template: {} days, {} items", kind, days, items.len());

    Plan {
        id: format!("{}_{}d", kind.id(), days),
        name: match kind {
            TemplateKind::Fbw => format!("FBW {}-day", days),
            TemplateKind::Split => format!("SPLIT {}-day", days),
        },
        items,
    }
}

fn item(exercise: &Exercise, day: u32, order_index: u32, sets: u32, reps: RepTarget) -> PlanItem {
    PlanItem {
        exercise_id: exercise.id.to_string(),
        exercise_name: exercise.name.to_string(),
        day,
        order_index,
        target_sets: sets,
        target_reps: reps,
    }
}

fn fbw_items(days: u32) -> Vec<PlanItem> {
    let groups = [
        MuscleGroup::Legs,
        MuscleGroup::Push,
        MuscleGroup::Pull,
        MuscleGroup::Core,
    ];
    let mut items = Vec::new();

    for day in 1..=days {
        for (order, group) in groups.iter().enumerate() {
            let pool = exercises_in(*group);
            let exercise = pool[(day as usize - 1) % pool.len()];
            items.push(item(
                exercise,
                day,
                order as u32,
                3,
                RepTarget::Range { min: 8, max: 12 },
            ));
        }
    }

    items
}

fn split_items(days: u32) -> Vec<PlanItem> {
    const PER_DAY: usize = 3;
    let rotation = [MuscleGroup::Push, MuscleGroup::Pull, MuscleGroup::Legs];
    let mut items = Vec::new();

    for day in 1..=days {
        let slot = (day as usize - 1) % rotation.len();
        // Second pass through the rotation starts further into the pool
        let offset = (day as usize - 1) / rotation.len();
        let pool = exercises_in(rotation[slot]);

        for order in 0..PER_DAY {
            let exercise = pool[(order + offset) % pool.len()];
            items.push(item(
                exercise,
                day,
                order as u32,
                4,
                RepTarget::Range { min: 6, max: 10 },
            ));
        }
    }

    items
}

/// A template used as a plan source
#[derive(Clone, Copy, Debug)]
pub struct BuiltinPlan {
    pub kind: TemplateKind,
    pub days: u32,
}

impl BuiltinPlan {
    pub fn new(kind: TemplateKind, days: u32) -> Self {
        Self { kind, days }
    }
}

impl PlanSource for BuiltinPlan {
    fn load_plan(&self) -> Result<Plan> {
        Ok(build_template(self.kind, self.days))
    }
}
