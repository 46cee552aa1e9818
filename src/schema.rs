//! Role record types and desired-state loading.
//!
//! The desired-state file is a JSON array of `{name, description?}` objects.
//! Everything is validated at the boundary: the reconciler only ever sees
//! well-formed [`DesiredRole`]s.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::persona::Personality;

/// A role as the remote store reports it.
///
/// `personality` is kept as raw JSON: the remote shape is arbitrary and is
/// only ever compared structurally against a freshly generated value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRole {
    pub role_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub personality: Option<Value>,
}

/// One entry of the desired-state file.
///
/// `description: None` means "not supplied": on create it defaults to empty,
/// on update it falls back to whatever the remote record currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredRole {
    pub name: String,
    pub description: Option<String>,
}

/// Body of `POST /webapi/roles`. `role_id` is never part of it; the server
/// assigns ids.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRole {
    pub name: String,
    pub description: String,
    pub personality: Personality,
}

/// Body of `PUT /webapi/roles/{role_id}` - only the two mutable fields,
/// never `name` or `role_id`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRole {
    pub description: String,
    pub personality: Personality,
}

/// Load and validate the desired-state file.
pub fn load_desired(path: &Path) -> Result<Vec<DesiredRole>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("could not read desired-state file {}", path.display()))?;
    parse_desired(&content)
        .with_context(|| format!("invalid desired-state file {}", path.display()))
}

/// Parse desired-state JSON.
///
/// Rules: the top level must be an array of objects; `name` is required and
/// non-empty after trimming; a non-string `description` is coerced to empty;
/// duplicate names are fatal. Positions in error messages are 1-based.
pub fn parse_desired(content: &str) -> Result<Vec<DesiredRole>> {
    let data: Value = serde_json::from_str(content).context("not valid JSON")?;
    let Value::Array(entries) = data else {
        bail!("top level must be a JSON array");
    };

    let mut seen = HashSet::new();
    let mut roles = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let pos = i + 1;
        let Value::Object(obj) = entry else {
            bail!("entry {pos} is not an object");
        };

        let name = match obj.get("name") {
            Some(Value::String(s)) => s.trim().to_string(),
            _ => String::new(),
        };
        if name.is_empty() {
            bail!("entry {pos} is missing a name");
        }
        if !seen.insert(name.clone()) {
            bail!("duplicate role name in desired state: {name}");
        }

        let description = match obj.get("description") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => Some(String::new()),
        };

        roles.push(DesiredRole { name, description });
    }

    Ok(roles)
}
