use serde_json::{Map, Value, json};

use ecoquest_core::ActionKind;

/// Terminal state of an orchestrated action that passed the quota gate.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionReport {
    /// Data was fetched and points were awarded.
    Completed {
        kind: ActionKind,
        data: Value,
        points_earned: i64,
        total_points: i64,
        remaining_checks: u32,
        /// Set when the collaborator served synthetic data.
        fallback_reason: Option<String>,
    },
    /// The collaborator failed. The quota slot stays consumed; no points.
    Failed {
        kind: ActionKind,
        error: String,
        remaining_checks: u32,
    },
}

impl ActionReport {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Completed { kind, .. } | Self::Failed { kind, .. } => *kind,
        }
    }

    pub fn remaining_checks(&self) -> u32 {
        match self {
            Self::Completed {
                remaining_checks, ..
            }
            | Self::Failed {
                remaining_checks, ..
            } => *remaining_checks,
        }
    }

    /// Response body: the provider payload merged with the points fields, or
    /// the error payload.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Completed {
                data,
                points_earned,
                total_points,
                remaining_checks,
                fallback_reason,
                ..
            } => {
                let mut body = match data {
                    Value::Object(map) => map.clone(),
                    other => {
                        let mut map = Map::new();
                        map.insert("data".to_owned(), other.clone());
                        map
                    }
                };
                body.insert("points_earned".to_owned(), json!(points_earned));
                body.insert("total_points".to_owned(), json!(total_points));
                body.insert("remaining_checks".to_owned(), json!(remaining_checks));
                match fallback_reason {
                    Some(reason) => {
                        body.insert("data_source".to_owned(), json!("fallback"));
                        body.insert("fallback_reason".to_owned(), json!(reason));
                    }
                    None => {
                        body.insert("data_source".to_owned(), json!("live"));
                    }
                }
                Value::Object(body)
            }
            Self::Failed {
                error,
                remaining_checks,
                ..
            } => json!({
                "error": error,
                "remaining_checks": remaining_checks,
            }),
        }
    }
}
