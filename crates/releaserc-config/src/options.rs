//! Typed options for the commit-back stage.

use crate::template::TemplateContext;
use crate::{ConfigError, ConfigResult};
use releaserc_core::StageOptions;
use serde_json::Value;

/// Commit message used when the commit-back stage does not set one.
pub const DEFAULT_COMMIT_MESSAGE: &str =
    "chore(release): ${nextRelease.version} [skip ci]\n\n${nextRelease.notes}";

/// Files committed when the commit-back stage does not list any.
pub const DEFAULT_ASSETS: [&str; 4] = [
    "CHANGELOG.md",
    "package.json",
    "package-lock.json",
    "npm-shrinkwrap.json",
];

/// Options of the stage that commits release files back to the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitBackOptions {
    /// Files to stage, in configured order.
    pub assets: Vec<String>,
    /// Commit message template.
    pub message: String,
}

impl Default for CommitBackOptions {
    fn default() -> Self {
        Self {
            assets: DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect(),
            message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }
}

impl CommitBackOptions {
    /// Read options from a stage; missing keys take their defaults.
    pub fn from_options(options: &StageOptions) -> ConfigResult<Self> {
        let mut parsed = Self::default();

        match options.get("assets") {
            None | Some(Value::Null) => {}
            Some(Value::String(asset)) => parsed.assets = vec![asset.clone()],
            Some(Value::Array(items)) => {
                parsed.assets = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        item.as_str().map(|s| s.to_string()).ok_or_else(|| {
                            ConfigError::invalid(format!("assets[{}]", i), "expected a string")
                        })
                    })
                    .collect::<ConfigResult<Vec<_>>>()?;
            }
            Some(_) => {
                return Err(ConfigError::invalid(
                    "assets",
                    "expected a string or an array of strings",
                ));
            }
        }

        match options.get("message") {
            None | Some(Value::Null) => {}
            Some(Value::String(message)) => parsed.message = message.clone(),
            Some(_) => return Err(ConfigError::invalid("message", "expected a string")),
        }

        Ok(parsed)
    }

    /// Render the commit message for a release.
    pub fn render_message(&self, ctx: &TemplateContext) -> String {
        ctx.render(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateContextBuilder;
    use serde_json::json;

    fn options(value: Value) -> StageOptions {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_defaults() {
        let parsed = CommitBackOptions::from_options(&StageOptions::new()).unwrap();
        assert_eq!(parsed, CommitBackOptions::default());
        assert_eq!(parsed.assets[0], "CHANGELOG.md");
    }

    #[test]
    fn test_configured_assets_keep_order() {
        let parsed = CommitBackOptions::from_options(&options(json!({
            "assets": ["package.json", "CHANGELOG.md", "README.md"],
            "message": "release ${nextRelease.version}"
        })))
        .unwrap();

        assert_eq!(parsed.assets, vec!["package.json", "CHANGELOG.md", "README.md"]);
        assert_eq!(parsed.message, "release ${nextRelease.version}");
    }

    #[test]
    fn test_single_asset_string() {
        let parsed =
            CommitBackOptions::from_options(&options(json!({"assets": "dist/**"}))).unwrap();
        assert_eq!(parsed.assets, vec!["dist/**"]);
    }

    #[test]
    fn test_mistyped_options() {
        for value in [
            json!({"assets": 3}),
            json!({"assets": ["ok", 1]}),
            json!({"message": ["not", "a", "string"]}),
        ] {
            let err = CommitBackOptions::from_options(&options(value)).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }));
        }
    }

    #[test]
    fn test_render_default_message() {
        let ctx = TemplateContextBuilder::new()
            .with_next_release("1.2.0", "Fix bug")
            .build();

        let message = CommitBackOptions::default().render_message(&ctx);
        assert_eq!(message, "chore(release): 1.2.0 [skip ci]\n\nFix bug");
    }
}
