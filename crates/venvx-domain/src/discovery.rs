use indexmap::IndexMap;

use crate::environment::{canonical_path, Environment};

/// Merges user-registered and detected environments into one view.
///
/// Manual entries are inserted first so they win over a detected entry at the
/// same canonical path. Output keeps insertion order: manual entries in the
/// order they were added, then detected entries in scan order.
pub fn merge_environments(
    manual: &[Environment],
    detected: &[Environment],
    active_path: Option<&str>,
) -> Vec<Environment> {
    let mut by_path: IndexMap<String, Environment> = IndexMap::new();
    for env in manual.iter().chain(detected) {
        by_path
            .entry(env.canonical_path())
            .or_insert_with(|| env.clone());
    }
    let active = active_path.map(canonical_path);
    by_path
        .into_iter()
        .map(|(key, mut env)| {
            env.is_active = active.as_deref() == Some(key.as_str());
            env
        })
        .collect()
}

/// Case-insensitive substring filter over name, kind, version and path.
///
/// Blank filters keep everything. Non-blank filters match as typed,
/// surrounding whitespace included.
pub fn filter_environments(envs: Vec<Environment>, filter: Option<&str>) -> Vec<Environment> {
    let Some(needle) = filter.filter(|text| !text.trim().is_empty()) else {
        return envs;
    };
    let needle = needle.to_lowercase();
    envs.into_iter()
        .filter(|env| environment_matches(env, &needle))
        .collect()
}

fn environment_matches(env: &Environment, needle: &str) -> bool {
    [
        env.name.as_str(),
        env.kind.as_ref(),
        env.python_version.as_str(),
        env.path.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Dedupes a scan by canonical path, keeping the first occurrence.
pub fn dedupe_by_path(envs: Vec<Environment>) -> Vec<Environment> {
    let mut seen = IndexMap::new();
    for env in envs {
        seen.entry(env.canonical_path()).or_insert(env);
    }
    seen.into_values().collect()
}

/// Result of resolving a user-supplied name or path.
#[derive(Debug, PartialEq, Eq)]
pub enum EnvLookup<'a> {
    Found(&'a Environment),
    /// The name is shared by several environments; a path is needed.
    Ambiguous(Vec<&'a Environment>),
    Missing,
}

/// Finds an environment by canonical path, falling back to an exact name.
///
/// Paths are unique after merging. Names are not (every workspace root can
/// hold a `.venv`), so a name matching more than one entry is ambiguous.
pub fn find_environment<'a>(envs: &'a [Environment], target: &str) -> EnvLookup<'a> {
    let wanted = canonical_path(target);
    if let Some(env) = envs.iter().find(|env| env.canonical_path() == wanted) {
        return EnvLookup::Found(env);
    }
    let mut named: Vec<&Environment> = envs.iter().filter(|env| env.name == target).collect();
    match named.len() {
        0 => EnvLookup::Missing,
        1 => EnvLookup::Found(named.remove(0)),
        _ => EnvLookup::Ambiguous(named),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::EnvironmentKind;
    use std::collections::HashSet;

    fn env(path: &str, kind: EnvironmentKind, version: &str) -> Environment {
        Environment::new(path, kind, Some(version.to_string()))
    }

    #[test]
    fn merge_keeps_one_entry_per_path_and_prefers_manual() {
        let manual = vec![
            env("/w/a/.venv", EnvironmentKind::Poetry, "3.11.4"),
            env("/elsewhere/env", EnvironmentKind::Venv, "3.10.1"),
        ];
        let detected = vec![
            env("/w/a/.venv/", EnvironmentKind::Venv, "3.11.4"),
            env("/w/b/venv", EnvironmentKind::Venv, "3.12.0"),
        ];
        let merged = merge_environments(&manual, &detected, None);

        let paths: Vec<String> = merged.iter().map(Environment::canonical_path).collect();
        let unique: HashSet<&String> = paths.iter().collect();
        assert_eq!(paths.len(), unique.len());
        assert_eq!(merged.len(), 3);

        let shared = merged
            .iter()
            .find(|env| env.canonical_path() == "/w/a/.venv")
            .unwrap();
        assert_eq!(shared.kind, EnvironmentKind::Poetry);
        assert_eq!(merged[0].path, "/w/a/.venv");
        assert_eq!(merged[1].path, "/elsewhere/env");
        assert_eq!(merged[2].path, "/w/b/venv");
    }

    #[test]
    fn active_flag_marks_exactly_the_canonical_match() {
        let detected = vec![
            env("/w/a/.venv", EnvironmentKind::Venv, "3.11.4"),
            env("/w/a/venv", EnvironmentKind::Venv, "3.11.4"),
        ];
        let merged = merge_environments(&[], &detected, Some("/w/a/./venv/"));
        let active: Vec<&Environment> = merged.iter().filter(|env| env.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].path, "/w/a/venv");

        let cleared = merge_environments(&[], &detected, None);
        assert!(cleared.iter().all(|env| !env.is_active));
    }

    #[test]
    fn active_path_without_match_marks_nothing() {
        let detected = vec![env("/w/a/.venv", EnvironmentKind::Venv, "3.11.4")];
        let merged = merge_environments(&[], &detected, Some("/gone/.venv"));
        assert!(merged.iter().all(|env| !env.is_active));
    }

    #[test]
    fn filter_matches_any_field_case_insensitively() {
        let envs = vec![
            env("/w/api/.venv", EnvironmentKind::Poetry, "3.11.4"),
            env("/w/web/venv", EnvironmentKind::Uv, "3.12.2"),
            env("/srv/tools/env", EnvironmentKind::Venv, "unknown"),
        ];
        let by_kind = filter_environments(envs.clone(), Some("POETRY"));
        assert_eq!(by_kind.len(), 1);
        assert_eq!(by_kind[0].path, "/w/api/.venv");

        let by_version = filter_environments(envs.clone(), Some("3.12"));
        assert_eq!(by_version.len(), 1);
        assert_eq!(by_version[0].kind, EnvironmentKind::Uv);

        let by_path = filter_environments(envs.clone(), Some("/w/"));
        assert_eq!(by_path.len(), 2);

        let by_name = filter_environments(envs.clone(), Some("VENV"));
        let expected: Vec<&str> = envs
            .iter()
            .filter(|env| {
                env.name.to_lowercase().contains("venv")
                    || env.kind.as_ref().contains("venv")
                    || env.python_version.to_lowercase().contains("venv")
                    || env.path.to_lowercase().contains("venv")
            })
            .map(|env| env.path.as_str())
            .collect();
        let got: Vec<&str> = by_name.iter().map(|env| env.path.as_str()).collect();
        assert_eq!(got, expected);

        assert_eq!(filter_environments(envs.clone(), Some("   ")).len(), 3);
        assert_eq!(filter_environments(envs, None).len(), 3);
    }

    #[test]
    fn find_environment_accepts_name_or_path() {
        let envs = vec![
            env("/w/api/.venv", EnvironmentKind::Venv, "3.11.4"),
            env("/w/web/venv", EnvironmentKind::Venv, "3.11.4"),
        ];
        assert_eq!(
            find_environment(&envs, "/w/web/venv/"),
            EnvLookup::Found(&envs[1])
        );
        assert_eq!(
            find_environment(&envs, ".venv"),
            EnvLookup::Found(&envs[0])
        );
        assert_eq!(find_environment(&envs, "missing"), EnvLookup::Missing);
    }

    #[test]
    fn shared_name_across_roots_is_ambiguous() {
        let envs = vec![
            env("/w/api/.venv", EnvironmentKind::Venv, "3.11.4"),
            env("/w/web/.venv", EnvironmentKind::Venv, "3.12.0"),
        ];
        match find_environment(&envs, ".venv") {
            EnvLookup::Ambiguous(matches) => {
                let paths: Vec<&str> = matches.iter().map(|env| env.path.as_str()).collect();
                assert_eq!(paths, vec!["/w/api/.venv", "/w/web/.venv"]);
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
        assert_eq!(
            find_environment(&envs, "/w/web/.venv"),
            EnvLookup::Found(&envs[1])
        );
    }

    #[test]
    fn filter_keeps_surrounding_whitespace_in_the_needle() {
        let envs = vec![env("/w/a/.venv", EnvironmentKind::Venv, "3.11.4")];
        assert!(filter_environments(envs.clone(), Some(".venv ")).is_empty());
        assert_eq!(filter_environments(envs, Some(".VENV")).len(), 1);
    }
}
