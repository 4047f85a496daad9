//! Action applicability and lookup.

use crate::errors::BuildError;
use crate::types::{Action, CommandEnvironment, FileSystem};

/// Actions that apply to files with `extension`, in configured order.
pub fn applicable<'a>(actions: &'a [Action], extension: &str) -> Vec<&'a Action> {
    let extension = extension.to_lowercase();
    actions
        .iter()
        .filter(|action| match &action.extensions {
            None => true,
            Some(exts) if exts.is_empty() => true,
            Some(exts) => exts.iter().any(|e| e.to_lowercase() == extension),
        })
        .collect()
}

/// Find the action called `name`. The first match wins on duplicates.
pub fn resolve_by_name<'a>(actions: &'a [Action], name: &str) -> Result<&'a Action, BuildError> {
    actions
        .iter()
        .find(|action| action.name == name)
        .ok_or_else(|| BuildError::ActionNotFound(name.to_string()))
}

/// Reject actions whose file system or command environment is not known.
pub fn ensure_supported(action: &Action) -> Result<(), BuildError> {
    if let FileSystem::Unsupported(value) = &action.file_system {
        return Err(BuildError::UnsupportedEnvironment {
            action: action.name.clone(),
            kind: "file system",
            value: value.clone(),
        });
    }
    if let CommandEnvironment::Unsupported(value) = &action.command_environment {
        return Err(BuildError::UnsupportedEnvironment {
            action: action.name.clone(),
            kind: "command environment",
            value: value.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn catalog() -> Vec<Action> {
        vec![
            Action::new("CRTBNDRPG", "CRTBNDRPG").with_extensions(&["rpgle"]),
            Action::new("ANY", "DSPLIB"),
            Action::new("CRTBNDCL", "CRTBNDCL").with_extensions(&["clle", "clp"]),
            Action::new("EMPTY", "DSPJOB").with_extensions(&[]),
            Action::new("CRTRPGMOD", "CRTRPGMOD").with_extensions(&["rpgle"]),
        ]
    }

    fn names(actions: &[&Action]) -> Vec<String> {
        actions.iter().map(|a| a.name.clone()).collect()
    }

    #[test]
    fn test_applicable_keeps_order_and_wildcards() {
        let actions = catalog();
        assert_eq!(
            names(&applicable(&actions, "rpgle")),
            vec!["CRTBNDRPG", "ANY", "EMPTY", "CRTRPGMOD"]
        );
        assert_eq!(names(&applicable(&actions, "clp")), vec!["ANY", "CRTBNDCL", "EMPTY"]);
    }

    #[test]
    fn test_applicable_lowercases_extension() {
        let actions = catalog();
        assert_eq!(
            names(&applicable(&actions, "RPGLE")),
            names(&applicable(&actions, "rpgle"))
        );
    }

    #[test]
    fn test_resolve_by_name() {
        let actions = catalog();
        assert_eq!(resolve_by_name(&actions, "CRTBNDCL").unwrap().command, "CRTBNDCL");
        assert!(matches!(
            resolve_by_name(&actions, "NOPE"),
            Err(BuildError::ActionNotFound(name)) if name == "NOPE"
        ));
    }

    #[test]
    fn test_ensure_supported() {
        assert!(ensure_supported(&Action::new("A", "X")).is_ok());

        let mut action = Action::new("A", "X");
        action.command_environment = CommandEnvironment::Unsupported("pase".to_string());
        assert!(matches!(
            ensure_supported(&action),
            Err(BuildError::UnsupportedEnvironment { kind: "command environment", ref value, .. })
                if value == "pase"
        ));

        action.file_system = FileSystem::Unsupported("ifs".to_string());
        assert!(matches!(
            ensure_supported(&action),
            Err(BuildError::UnsupportedEnvironment { kind: "file system", .. })
        ));
    }

    proptest! {
        #[test]
        fn test_applicable_is_exact_filter(
            ext in "[a-z]{1,6}",
            filters in prop::collection::vec(
                prop::option::of(prop::collection::vec("[a-z]{1,6}", 0..3)),
                0..8,
            ),
        ) {
            let actions: Vec<Action> = filters
                .iter()
                .enumerate()
                .map(|(i, f)| {
                    let mut action = Action::new(format!("A{}", i), "CMD");
                    action.extensions = f.clone();
                    action
                })
                .collect();

            let expected: Vec<String> = actions
                .iter()
                .filter(|a| a.is_wildcard() || a.extensions.as_ref().unwrap().contains(&ext))
                .map(|a| a.name.clone())
                .collect();
            prop_assert_eq!(names(&applicable(&actions, &ext)), expected);
        }
    }
}
