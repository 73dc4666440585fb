//! Workbook activity catalog and progress.
//!
//! The workbook is a fixed set of modules, each holding self-reflection
//! activities rendered by one widget kind. Responses are stored as free-form
//! JSON keyed by `(user, module, activity)`; this module knows which keys are
//! valid, what shape each widget produces, and how far a user has got.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;

/// Highest value a slider activity accepts (the lowest is 0).
pub const SLIDER_MAX: i64 = 10;

/// Input widget used to answer an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Textarea,
    Slider,
    Table,
    Checkbox,
}

impl WidgetKind {
    /// Quiet period after the last edit before an autosave fires.
    pub fn debounce_delay(self) -> Duration {
        match self {
            Self::Textarea => Duration::from_millis(1000),
            Self::Table => Duration::from_millis(1500),
            Self::Slider | Self::Checkbox => Duration::from_millis(800),
        }
    }

    /// Check that `response` has the JSON shape this widget produces.
    pub fn validate(self, response: &Value) -> Result<(), CoreError> {
        let ok = match self {
            Self::Textarea => response.is_string(),
            Self::Slider => response
                .as_i64()
                .is_some_and(|v| (0..=SLIDER_MAX).contains(&v)),
            Self::Table => response
                .as_array()
                .is_some_and(|rows| rows.iter().all(Value::is_object)),
            Self::Checkbox => response.is_object() || response.is_array(),
        };
        if ok {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Response does not match a {self:?} activity"
            )))
        }
    }

    /// Whether `response` counts as a completed answer.
    pub fn is_answered(self, response: &Value) -> bool {
        match self {
            Self::Textarea => response.as_str().is_some_and(|s| !s.trim().is_empty()),
            Self::Slider => response.is_number(),
            Self::Table => response.as_array().is_some_and(|rows| {
                rows.iter()
                    .filter_map(Value::as_object)
                    .flat_map(|cells| cells.values())
                    .filter_map(Value::as_str)
                    .any(|cell| !cell.trim().is_empty())
            }),
            Self::Checkbox => match response {
                Value::Object(map) => map.values().any(|v| v.as_bool() == Some(true)),
                Value::Array(items) => !items.is_empty(),
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Activity {
    pub id: &'static str,
    pub kind: WidgetKind,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Module {
    pub id: i32,
    pub title: &'static str,
    pub activities: &'static [Activity],
}

const fn act(id: &'static str, kind: WidgetKind) -> Activity {
    Activity { id, kind }
}

use self::WidgetKind::{Checkbox, Slider, Table, Textarea};

pub static MODULES: &[Module] = &[
    Module {
        id: 1,
        title: "Autoconhecimento",
        activities: &[
            act("intencao", Textarea),
            act("satisfacao_carreira", Slider),
            act("clareza_proposito", Slider),
            act("networking", Slider),
            act("posicionamento", Slider),
            act("confianca", Slider),
            act("desafios", Textarea),
            act("porque", Textarea),
            act("visao_1ano", Textarea),
            act("visao_3anos", Textarea),
        ],
    },
    Module {
        id: 2,
        title: "Talentos e Habilidades",
        activities: &[
            act("talentos", Textarea),
            act("habilidades", Textarea),
            act("talento_unico", Textarea),
            act("bloqueios", Table),
            act("posicionamento", Textarea),
        ],
    },
    Module {
        id: 3,
        title: "Marca Pessoal",
        activities: &[
            act("valores", Textarea),
            act("palavras_chave", Textarea),
            act("persona_demografico", Textarea),
            act("persona_dores", Textarea),
            act("persona_desejos", Textarea),
            act("persona_objecoes", Textarea),
            act("proposta_valor", Textarea),
        ],
    },
    Module {
        id: 4,
        title: "Conteúdo e Presença Digital",
        activities: &[
            act("pilares", Textarea),
            act("template_legenda", Textarea),
            act("ctas", Textarea),
            act("planejamento", Table),
            act("compromissos", Checkbox),
        ],
    },
];

pub fn find_module(module_id: i32) -> Option<&'static Module> {
    MODULES.iter().find(|m| m.id == module_id)
}

/// Look up an activity, returning a validation error for unknown keys.
pub fn find_activity(module_id: i32, activity_id: &str) -> Result<&'static Activity, CoreError> {
    let module = find_module(module_id)
        .ok_or_else(|| CoreError::Validation(format!("Unknown workbook module {module_id}")))?;
    module
        .activities
        .iter()
        .find(|a| a.id == activity_id)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Unknown activity '{activity_id}' in workbook module {module_id}"
            ))
        })
}

/// Validate the key and shape of a response before it is stored.
pub fn validate_response(
    module_id: i32,
    activity_id: &str,
    response: &Value,
) -> Result<WidgetKind, CoreError> {
    let activity = find_activity(module_id, activity_id)?;
    activity.kind.validate(response)?;
    Ok(activity.kind)
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleProgress {
    pub module_id: i32,
    pub completed: usize,
    pub total: usize,
    /// Whole-number percentage, rounded down.
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkbookProgress {
    pub modules: Vec<ModuleProgress>,
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    // completed <= total, so the result is at most 100.
    (completed * 100 / total) as u8
}

/// Compute per-module and overall progress from a user's stored responses,
/// given as `(module_id, activity_id, response)` triples. Responses for
/// activities no longer in the catalog are ignored.
pub fn progress<'a, I>(responses: I) -> WorkbookProgress
where
    I: IntoIterator<Item = (i32, &'a str, &'a Value)>,
{
    let responses: Vec<_> = responses.into_iter().collect();

    let modules: Vec<ModuleProgress> = MODULES
        .iter()
        .map(|module| {
            let completed = module
                .activities
                .iter()
                .filter(|activity| {
                    responses.iter().any(|(m, a, value)| {
                        *m == module.id && *a == activity.id && activity.kind.is_answered(value)
                    })
                })
                .count();
            let total = module.activities.len();
            ModuleProgress {
                module_id: module.id,
                completed,
                total,
                percent: percent(completed, total),
            }
        })
        .collect();

    let completed = modules.iter().map(|m| m.completed).sum();
    let total = modules.iter().map(|m| m.total).sum();

    WorkbookProgress {
        modules,
        completed,
        total,
        percent: percent(completed, total),
    }
}
