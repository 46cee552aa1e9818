//! Diff engine: decide the write (if any) for one desired record.

use crate::persona;
use crate::schema::{CreateRole, DesiredRole, RemoteRole, UpdateRole};

/// What reconciliation should do for one desired record.
#[derive(Debug, Clone)]
pub enum Action {
    Create(CreateRole),
    Update { role_id: i64, patch: UpdateRole },
    NoOp,
}

/// Plan the action for `desired` given the current remote record, if any.
///
/// The personality is always regenerated from the name and compared
/// structurally against whatever the remote record holds; an out-of-band
/// remote edit therefore shows up as a diff and gets rewritten. The update
/// patch carries only description and personality - never name or id.
pub fn plan(desired: &DesiredRole, current: Option<&RemoteRole>) -> Action {
    let personality = persona::generate(&desired.name);

    let Some(current) = current else {
        return Action::Create(CreateRole {
            name: desired.name.clone(),
            description: desired.description.clone().unwrap_or_default(),
            personality,
        });
    };

    // Not supplied means "keep what the store has".
    let description = desired
        .description
        .clone()
        .unwrap_or_else(|| current.description.clone().unwrap_or_default());

    let description_matches = current.description.as_deref().unwrap_or("") == description;
    let personality_matches = current.personality == serde_json::to_value(&personality).ok();

    if description_matches && personality_matches {
        Action::NoOp
    } else {
        Action::Update {
            role_id: current.role_id,
            patch: UpdateRole {
                description,
                personality,
            },
        }
    }
}
