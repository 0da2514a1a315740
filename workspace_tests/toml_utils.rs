use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum DependencyValue {
    String(String),
    Object { version: String, path: Option<String> },
    CrateObject { workspace: Option<bool>, features: Option<Vec<String>>, path: Option<String> },
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum PackageEntryValue {
    String(String),
    Object { workspace: bool },
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Package {
    version: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct WorkspaceFields {
    package: Package,
    members: Vec<String>,
    dependencies: HashMap<String, DependencyValue>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct CargoToml {
    workspace: WorkspaceFields,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct LintsEntry {
    pub(crate) workspace: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct CrateCargoToml {
    pub(crate) package: HashMap<String, PackageEntryValue>,
    pub(crate) dependencies: Option<HashMap<String, DependencyValue>>,
    pub(crate) lints: Option<LintsEntry>,
}

#[derive(Debug, PartialEq)]
pub(crate) struct LocalCrate {
    pub(crate) path: String,
    pub(crate) version: String,
}

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..")
}

pub(crate) static ROOT_TOML: LazyLock<CargoToml> = LazyLock::new(|| {
    toml::from_str(include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../Cargo.toml"))).unwrap()
});

fn path_dependencies(
    dependencies: &HashMap<String, DependencyValue>,
) -> impl Iterator<Item = LocalCrate> + '_ {
    dependencies.values().filter_map(|value| match value {
        DependencyValue::Object { path: Some(path), version } => {
            Some(LocalCrate { path: path.to_string(), version: version.to_string() })
        }
        _ => None,
    })
}

impl CargoToml {
    pub(crate) fn members(&self) -> &Vec<String> {
        &self.workspace.members
    }

    pub(crate) fn workspace_version(&self) -> &str {
        &self.workspace.package.version
    }

    pub(crate) fn workspace_path_dependencies(&self) -> impl Iterator<Item = LocalCrate> + '_ {
        path_dependencies(&self.workspace.dependencies)
    }

    /// Every member manifest, keyed by the member path.
    pub(crate) fn member_cargo_tomls(&self) -> Vec<(String, CrateCargoToml)> {
        self.members().iter().map(|member| (member.clone(), read_cargo_toml(member))).collect()
    }
}

impl CrateCargoToml {
    pub(crate) fn crate_path_dependencies(&self) -> Vec<LocalCrate> {
        self.dependencies.as_ref().map(|deps| path_dependencies(deps).collect()).unwrap_or_default()
    }

    pub(crate) fn inherits_workspace_lints(&self) -> bool {
        self.lints.as_ref().and_then(|lints| lints.workspace).unwrap_or(false)
    }
}

pub(crate) fn read_cargo_toml(member: &str) -> CrateCargoToml {
    let path = workspace_root().join(member).join("Cargo.toml");
    let content =
        fs::read_to_string(&path).unwrap_or_else(|err| panic!("Failed to read {path:?}: {err}"));
    toml::from_str(&content).unwrap_or_else(|err| panic!("Failed to parse {path:?}: {err}"))
}
