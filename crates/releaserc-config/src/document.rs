//! Release configuration documents in JSON form.
//!
//! The document is an object with two keys:
//!
//! ```json
//! {
//!   "branches": ["main", { "name": "beta", "prerelease": true }],
//!   "plugins": [
//!     "@semantic-release/commit-analyzer",
//!     ["@semantic-release/git", { "assets": ["CHANGELOG.md"] }]
//!   ]
//! }
//! ```
//!
//! The same validation backs `package.json` `release` keys.

use crate::{ConfigError, ConfigResult};
use releaserc_core::{Branch, Prerelease, ReleaseConfig, Stage};
use serde_json::Value;
use std::collections::HashSet;

/// Parse a release configuration from JSON text.
pub fn parse_json_document(json: &str) -> ConfigResult<ReleaseConfig> {
    let value: Value = serde_json::from_str(json)?;
    from_value(&value)
}

/// Validate an already-decoded JSON value.
pub fn from_value(value: &Value) -> ConfigResult<ReleaseConfig> {
    let object = value
        .as_object()
        .ok_or_else(|| ConfigError::invalid("document", "expected an object"))?;

    let branches = object
        .get("branches")
        .ok_or_else(|| ConfigError::MissingField("branches".to_string()))?
        .as_array()
        .ok_or_else(|| ConfigError::invalid("branches", "expected an array"))?
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_branch(index, entry))
        .collect::<ConfigResult<Vec<_>>>()?;

    let plugins = object
        .get("plugins")
        .ok_or_else(|| ConfigError::MissingField("plugins".to_string()))?
        .as_array()
        .ok_or_else(|| ConfigError::invalid("plugins", "expected an array"))?
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_stage(index, entry))
        .collect::<ConfigResult<Vec<_>>>()?;

    build_config(branches, plugins)
}

/// Final structural checks shared by every document format.
pub(crate) fn build_config(branches: Vec<Branch>, plugins: Vec<Stage>) -> ConfigResult<ReleaseConfig> {
    if branches.is_empty() {
        return Err(ConfigError::invalid(
            "branches",
            "at least one branch is required",
        ));
    }
    if plugins.is_empty() {
        return Err(ConfigError::invalid(
            "plugins",
            "at least one plugin is required",
        ));
    }

    let mut seen = HashSet::new();
    for branch in &branches {
        if !seen.insert(branch.name.as_str()) {
            return Err(ConfigError::invalid(
                "branches",
                format!("branch '{}' is listed more than once", branch.name),
            ));
        }
    }

    Ok(ReleaseConfig { branches, plugins })
}

pub(crate) fn non_empty_name(field: &str, name: &str) -> ConfigResult<String> {
    if name.trim().is_empty() {
        return Err(ConfigError::invalid(field, "name must not be empty"));
    }
    Ok(name.to_string())
}

fn parse_branch(index: usize, entry: &Value) -> ConfigResult<Branch> {
    let field = format!("branches[{}]", index);

    match entry {
        Value::String(name) => Ok(Branch::new(non_empty_name(&field, name)?)),
        Value::Object(object) => {
            let name = object
                .get("name")
                .ok_or_else(|| ConfigError::MissingField(format!("{}.name", field)))?
                .as_str()
                .ok_or_else(|| ConfigError::invalid(format!("{}.name", field), "expected a string"))?;

            let channel = match object.get("channel") {
                None | Some(Value::Null) => None,
                Some(Value::String(channel)) => Some(channel.clone()),
                Some(_) => {
                    return Err(ConfigError::invalid(
                        format!("{}.channel", field),
                        "expected a string",
                    ));
                }
            };

            let prerelease = match object.get("prerelease") {
                None | Some(Value::Null) => None,
                Some(Value::Bool(flag)) => Some(Prerelease::Flag(*flag)),
                Some(Value::String(id)) => Some(Prerelease::Identifier(id.clone())),
                Some(_) => {
                    return Err(ConfigError::invalid(
                        format!("{}.prerelease", field),
                        "expected a boolean or a string",
                    ));
                }
            };

            Ok(Branch {
                name: non_empty_name(&field, name)?,
                channel,
                prerelease,
            })
        }
        _ => Err(ConfigError::invalid(field, "expected a string or an object")),
    }
}

fn parse_stage(index: usize, entry: &Value) -> ConfigResult<Stage> {
    let field = format!("plugins[{}]", index);

    match entry {
        Value::String(name) => Ok(Stage::Bare(non_empty_name(&field, name)?)),
        Value::Array(pair) => match pair.as_slice() {
            [Value::String(name), Value::Object(options)] => Ok(Stage::Configured {
                name: non_empty_name(&field, name)?,
                options: options.clone(),
            }),
            [_, _] => Err(ConfigError::invalid(
                field,
                "expected a [string, object] pair",
            )),
            _ => Err(ConfigError::invalid(
                field,
                format!("expected a 2-element pair, got {} elements", pair.len()),
            )),
        },
        _ => Err(ConfigError::invalid(
            field,
            "expected a string or a [string, object] pair",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    const RELEASE_CONFIG: &str = r#"{
        "branches": ["main"],
        "plugins": [
            "@semantic-release/commit-analyzer",
            "@semantic-release/release-notes-generator",
            "@semantic-release/changelog",
            "@semantic-release/npm",
            "@semantic-release/github",
            ["@semantic-release/git", {
                "assets": ["package.json", "CHANGELOG.md", "README.md"],
                "message": "chore(release): ${nextRelease.version} [skip ci]\n\n${nextRelease.notes}"
            }]
        ]
    }"#;

    #[test]
    fn test_parse_release_config() {
        let config = parse_json_document(RELEASE_CONFIG).unwrap();
        assert_eq!(config.branch_names(), vec!["main"]);
        assert_eq!(config.plugins.len(), 6);

        let names: Vec<&str> = config.plugins.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "@semantic-release/commit-analyzer",
                "@semantic-release/release-notes-generator",
                "@semantic-release/changelog",
                "@semantic-release/npm",
                "@semantic-release/github",
                "@semantic-release/git",
            ]
        );

        let git = config.plugins[5].options().unwrap();
        assert_eq!(
            git["assets"],
            json!(["package.json", "CHANGELOG.md", "README.md"])
        );
        assert_eq!(
            git["message"],
            "chore(release): ${nextRelease.version} [skip ci]\n\n${nextRelease.notes}"
        );
    }

    #[test]
    fn test_order_is_preserved() {
        let doc = json!({
            "branches": ["release", "main", "next"],
            "plugins": ["z-last", "a-first", "z-last", "m-middle"]
        });

        let config = from_value(&doc).unwrap();
        assert_eq!(config.branch_names(), vec!["release", "main", "next"]);

        let names: Vec<&str> = config.plugins.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["z-last", "a-first", "z-last", "m-middle"]);
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let first = parse_json_document(RELEASE_CONFIG).unwrap();
        let second = parse_json_document(RELEASE_CONFIG).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_plugins_rejected() {
        let err = from_value(&json!({"branches": ["main"], "plugins": []})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_empty_branches_rejected() {
        let err = from_value(&json!({"branches": [], "plugins": ["a"]})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_missing_fields() {
        let err = from_value(&json!({"plugins": ["a"]})).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "branches"));

        let err = from_value(&json!({"branches": ["main"]})).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "plugins"));
    }

    #[test]
    fn test_mistyped_fields() {
        let cases = [
            json!(["main"]),
            json!({"branches": "main", "plugins": ["a"]}),
            json!({"branches": [42], "plugins": ["a"]}),
            json!({"branches": ["main"], "plugins": [{"name": "a"}]}),
            json!({"branches": ["main"], "plugins": [["a"]]}),
            json!({"branches": ["main"], "plugins": [["a", {}, {}]]}),
            json!({"branches": ["main"], "plugins": [["a", "options"]]}),
            json!({"branches": ["main"], "plugins": [[{}, "a"]]}),
            json!({"branches": ["main"], "plugins": [""]}),
        ];

        for doc in cases {
            let err = from_value(&doc).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ConfigInvalid, "document: {}", doc);
        }
    }

    #[test]
    fn test_branch_objects() {
        let doc = json!({
            "branches": [
                "main",
                {"name": "next", "channel": "next"},
                {"name": "beta", "prerelease": true},
                {"name": "alpha", "prerelease": "alpha"}
            ],
            "plugins": ["a"]
        });

        let config = from_value(&doc).unwrap();
        assert_eq!(config.branches[1].channel.as_deref(), Some("next"));
        assert!(!config.branches[1].is_prerelease());
        assert!(config.branches[2].is_prerelease());
        assert_eq!(
            config.branches[3].prerelease,
            Some(Prerelease::Identifier("alpha".to_string()))
        );
        assert!(config.is_eligible("beta"));
        assert!(!config.is_eligible("develop"));
    }

    #[test]
    fn test_duplicate_branches_rejected() {
        let doc = json!({"branches": ["main", {"name": "main"}], "plugins": ["a"]});
        let err = from_value(&doc).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "branches"));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_json_document("{ branches: [main] }").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
}
