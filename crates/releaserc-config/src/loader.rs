//! Locating and loading the release configuration file.

use crate::document::{from_value, parse_json_document};
use crate::kdl_format::parse_kdl_document;
use crate::pipeline::compose;
use crate::registry::CollaboratorRegistry;
use crate::{ConfigError, ConfigResult};
use releaserc_core::{ReleaseConfig, ResolvedStage};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Dedicated configuration files, in search order. `package.json` with a
/// `release` key is tried after all of these.
pub const SEARCH_ORDER: [&str; 4] = [
    ".releaserc.json",
    ".releaserc",
    "release.config.json",
    "release.kdl",
];

const PACKAGE_MANIFEST: &str = "package.json";

/// Syntax of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Kdl,
    /// The `release` key of a package manifest.
    PackageJson,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        if path.file_name().and_then(|n| n.to_str()) == Some(PACKAGE_MANIFEST) {
            return ConfigFormat::PackageJson;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("kdl") => ConfigFormat::Kdl,
            _ => ConfigFormat::Json,
        }
    }
}

/// A validated configuration and its composed pipeline.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub path: PathBuf,
    /// Shared read-only for the rest of the process.
    pub config: Arc<ReleaseConfig>,
    pub stages: Vec<ResolvedStage>,
}

/// Parse document text in the given format.
pub fn parse_document(content: &str, format: ConfigFormat) -> ConfigResult<ReleaseConfig> {
    match format {
        ConfigFormat::Json => parse_json_document(content),
        ConfigFormat::Kdl => parse_kdl_document(content),
        ConfigFormat::PackageJson => {
            let manifest: Value = serde_json::from_str(content)?;
            let release = manifest
                .get("release")
                .ok_or_else(|| ConfigError::MissingField("release".to_string()))?;
            from_value(release)
        }
    }
}

/// Find the configuration file in `dir`.
pub fn discover(dir: &Path) -> ConfigResult<PathBuf> {
    for name in SEARCH_ORDER {
        let candidate = dir.join(name);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "Found release configuration");
            return Ok(candidate);
        }
    }

    let manifest = dir.join(PACKAGE_MANIFEST);
    if manifest.is_file() {
        let content = read(&manifest)?;
        match serde_json::from_str::<Value>(&content) {
            Ok(value) if value.get("release").is_some() => {
                debug!(path = %manifest.display(), "Found release key in package manifest");
                return Ok(manifest);
            }
            Ok(_) => {}
            Err(e) => debug!(path = %manifest.display(), error = %e, "Skipping unparsable package manifest"),
        }
    }

    Err(ConfigError::NotFound(dir.to_path_buf()))
}

/// Read, validate and compose the configuration at `path`.
pub fn load(path: &Path, registry: &CollaboratorRegistry) -> ConfigResult<LoadedConfig> {
    let content = read(path)?;
    let config = parse_document(&content, ConfigFormat::from_path(path))?;
    let stages = compose(&config, registry)?;

    info!(
        path = %path.display(),
        branches = config.branches.len(),
        stages = stages.len(),
        "Loaded release configuration"
    );

    Ok(LoadedConfig {
        path: path.to_path_buf(),
        config: Arc::new(config),
        stages,
    })
}

/// Discover the configuration in `dir`, then load it.
pub fn load_from_dir(dir: &Path, registry: &CollaboratorRegistry) -> ConfigResult<LoadedConfig> {
    let path = discover(dir)?;
    load(&path, registry)
}

fn read(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use tempfile::TempDir;

    const JSON_CONFIG: &str = r#"{
        "branches": ["main"],
        "plugins": [
            "@semantic-release/commit-analyzer",
            ["@semantic-release/git", {"assets": ["CHANGELOG.md"]}]
        ]
    }"#;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new(".releaserc")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a/.releaserc.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("release.kdl")), ConfigFormat::Kdl);
        assert_eq!(
            ConfigFormat::from_path(Path::new("web/package.json")),
            ConfigFormat::PackageJson
        );
    }

    #[test]
    fn test_load_json() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, ".releaserc.json", JSON_CONFIG);

        let loaded = load(&path, &CollaboratorRegistry::standard()).unwrap();
        assert_eq!(loaded.path, path);
        assert_eq!(loaded.config.branch_names(), vec!["main"]);
        assert_eq!(loaded.stages.len(), 2);
    }

    #[test]
    fn test_discover_prefers_search_order() {
        let dir = TempDir::new().unwrap();
        write(&dir, "release.kdl", "branches \"main\"\nplugin \"a\"\n");
        let expected = write(&dir, ".releaserc", JSON_CONFIG);

        assert_eq!(discover(dir.path()).unwrap(), expected);
    }

    #[test]
    fn test_discover_package_manifest() {
        let dir = TempDir::new().unwrap();
        let manifest = format!(r#"{{"name": "app", "release": {}}}"#, JSON_CONFIG);
        let path = write(&dir, "package.json", &manifest);

        assert_eq!(discover(dir.path()).unwrap(), path);
        let loaded = load_from_dir(dir.path(), &CollaboratorRegistry::standard()).unwrap();
        assert_eq!(loaded.stages[1].name, "@semantic-release/git");
    }

    #[test]
    fn test_package_manifest_without_release_key_is_ignored() {
        let dir = TempDir::new().unwrap();
        write(&dir, "package.json", r#"{"name": "app"}"#);

        let err = discover(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_load_rejects_unknown_stage() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "release.kdl",
            "branches \"main\"\nplugin \"unknown-capability\"\n",
        );

        let err = load(&path, &CollaboratorRegistry::standard()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownStage);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir.path().join("missing.json"), &CollaboratorRegistry::standard())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_reloading_yields_equal_config() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, ".releaserc.json", JSON_CONFIG);
        let registry = CollaboratorRegistry::standard();

        let first = load(&path, &registry).unwrap();
        let second = load(&path, &registry).unwrap();
        assert_eq!(first.config, second.config);
        assert_eq!(first.stages, second.stages);
    }
}
