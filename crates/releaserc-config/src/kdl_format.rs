//! Release configuration documents in KDL form.
//!
//! ```kdl
//! branches "main" "next"
//! branch "beta" prerelease="beta" channel="beta"
//!
//! plugin "@semantic-release/commit-analyzer"
//! plugin "@semantic-release/git" {
//!     assets "package.json" "CHANGELOG.md"
//!     message "chore(release): ${nextRelease.version} [skip ci]\n\n${nextRelease.notes}"
//! }
//! ```
//!
//! A `plugin` node with properties or children becomes a configured stage.
//! Child nodes map to option keys: one argument gives a scalar, several give
//! an array, and a child block gives a nested object.

use crate::document::{build_config, non_empty_name};
use crate::{ConfigError, ConfigResult};
use kdl::{KdlDocument, KdlNode, KdlValue};
use releaserc_core::{Branch, Prerelease, ReleaseConfig, Stage, StageOptions};
use serde_json::{Number, Value};

/// Parse a release configuration from KDL text.
pub fn parse_kdl_document(kdl: &str) -> ConfigResult<ReleaseConfig> {
    let doc: KdlDocument = kdl.parse()?;

    let mut branches = Vec::new();
    let mut plugins = Vec::new();

    for node in doc.nodes() {
        match node.name().value() {
            "branches" => {
                for name in string_args(node, "branches")? {
                    branches.push(Branch::new(non_empty_name("branches", &name)?));
                }
            }
            "branch" => {
                branches.push(parse_branch(node)?);
            }
            "plugin" => {
                plugins.push(parse_plugin(node, plugins.len())?);
            }
            _ => {} // Ignore unknown nodes
        }
    }

    build_config(branches, plugins)
}

fn parse_branch(node: &KdlNode) -> ConfigResult<Branch> {
    let name = single_string_arg(node, "branch")?;
    let field = format!("branch '{}'", name);

    let prerelease = match node.get("prerelease") {
        None => None,
        Some(value) => {
            if let Some(flag) = value.as_bool() {
                Some(Prerelease::Flag(flag))
            } else if let Some(id) = value.as_string() {
                Some(Prerelease::Identifier(id.to_string()))
            } else {
                return Err(ConfigError::invalid(
                    format!("{} prerelease", field),
                    "expected a boolean or a string",
                ));
            }
        }
    };

    Ok(Branch {
        name: non_empty_name("branch", &name)?,
        channel: string_prop(node, "channel", &field)?,
        prerelease,
    })
}

fn parse_plugin(node: &KdlNode, index: usize) -> ConfigResult<Stage> {
    let field = format!("plugins[{}]", index);
    let name = single_string_arg(node, &field)?;
    let name = non_empty_name(&field, &name)?;

    let mut options = StageOptions::new();
    let mut configured = false;

    for entry in node.entries() {
        if let Some(key) = entry.name() {
            options.insert(key.value().to_string(), kdl_to_json(entry.value()));
            configured = true;
        }
    }

    if let Some(children) = node.children() {
        configured = true;
        for child in children.nodes() {
            let key = child.name().value();
            options.insert(
                key.to_string(),
                node_to_json(child, &format!("{}.{}", field, key))?,
            );
        }
    }

    Ok(if configured {
        Stage::Configured { name, options }
    } else {
        Stage::Bare(name)
    })
}

/// Convert an option node to JSON.
///
/// Properties and children make an object. Otherwise positional arguments
/// give a scalar (one) or an array (several). Mixing both forms is rejected.
fn node_to_json(node: &KdlNode, field: &str) -> ConfigResult<Value> {
    let mut args = Vec::new();
    let mut object = serde_json::Map::new();

    for entry in node.entries() {
        match entry.name() {
            Some(key) => {
                object.insert(key.value().to_string(), kdl_to_json(entry.value()));
            }
            None => args.push(kdl_to_json(entry.value())),
        }
    }

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let key = child.name().value();
            object.insert(
                key.to_string(),
                node_to_json(child, &format!("{}.{}", field, key))?,
            );
        }
    }

    if !object.is_empty() || node.children().is_some() {
        if !args.is_empty() {
            return Err(ConfigError::invalid(
                field,
                "cannot mix positional arguments with properties or children",
            ));
        }
        return Ok(Value::Object(object));
    }

    Ok(match args.len() {
        0 => Value::Null,
        1 => args.remove(0),
        _ => Value::Array(args),
    })
}

fn kdl_to_json(value: &KdlValue) -> Value {
    if let Some(s) = value.as_string() {
        Value::String(s.to_string())
    } else if let Some(b) = value.as_bool() {
        Value::Bool(b)
    } else if let Some(i) = value.as_integer() {
        i64::try_from(i)
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(i.to_string()))
    } else if let Some(f) = value.as_float() {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    } else {
        Value::Null
    }
}

// Helper functions for extracting values from KDL nodes

/// Every positional argument, each of which must be a string.
fn string_args(node: &KdlNode, field: &str) -> ConfigResult<Vec<String>> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .enumerate()
        .map(|(i, e)| {
            e.value().as_string().map(|s| s.to_string()).ok_or_else(|| {
                ConfigError::invalid(format!("{} argument {}", field, i), "expected a string")
            })
        })
        .collect()
}

/// Exactly one positional string argument.
fn single_string_arg(node: &KdlNode, field: &str) -> ConfigResult<String> {
    let mut args = string_args(node, field)?;
    match args.len() {
        0 => Err(ConfigError::MissingField(format!("{} name", field))),
        1 => Ok(args.remove(0)),
        n => Err(ConfigError::invalid(
            field,
            format!("expected a single name argument, got {}", n),
        )),
    }
}

fn string_prop(node: &KdlNode, name: &str, field: &str) -> ConfigResult<Option<String>> {
    match node.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_string()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| ConfigError::invalid(format!("{} {}", field, name), "expected a string")),
    }
}
