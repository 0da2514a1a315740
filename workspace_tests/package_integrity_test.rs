use std::path::Path;

use crate::toml_utils::{CrateCargoToml, PackageEntryValue, ROOT_TOML};

fn package_name(toml: &CrateCargoToml) -> Option<&str> {
    match toml.package.get("name")? {
        PackageEntryValue::String(name) => Some(name),
        PackageEntryValue::Object { .. } => None,
    }
}

#[test]
fn test_package_names_follow_directories() {
    for (member, toml) in ROOT_TOML.member_cargo_tomls() {
        let directory = Path::new(&member).file_name().and_then(|name| name.to_str());
        assert_eq!(
            package_name(&toml),
            directory,
            "Package `{member}` must be named after its directory."
        );
    }
}

#[test]
fn test_crates_share_the_report_prefix() {
    let foreign: Vec<String> = ROOT_TOML
        .member_cargo_tomls()
        .into_iter()
        .filter(|(member, _)| member.starts_with("crates/"))
        .filter(|(_, toml)| {
            !package_name(toml).is_some_and(|name| name.starts_with("scaling_report"))
        })
        .map(|(member, _)| member)
        .collect();
    assert!(foreign.is_empty(), "Crates outside the `scaling_report` family: {foreign:?}.");
}

#[test]
fn test_members_inherit_workspace_lints() {
    let crates_without_lints: Vec<_> = ROOT_TOML
        .member_cargo_tomls()
        .into_iter()
        .filter(|(_, toml)| !toml.inherits_workspace_lints())
        .map(|(path, _)| path)
        .collect();
    assert!(
        crates_without_lints.is_empty(),
        "The following crates do not set `[lints] workspace = true`: {crates_without_lints:?}."
    );
}
