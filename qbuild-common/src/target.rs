//! Remote identifiers derived from a local file path.
//!
//! `src/QRPGLESRC/customer.rpgle` maps to source file `QRPGLESRC`, member
//! `CUSTOMER` and source type `rpgle`.

use crate::errors::{BuildError, IdentifierField};
use std::path::{Path, PathBuf};

/// Remote folder, member name and source type of a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    /// Immediate parent directory name.
    pub folder: String,
    /// File stem, upper-cased.
    pub name: String,
    /// Extension without the leading dot; empty when the file has none.
    pub extension: String,
    pub source_path: PathBuf,
}

impl TargetDescriptor {
    /// `LIBRARY/NAME` for messages about the built object.
    pub fn qualified_object(&self, library: &str) -> String {
        format!("{}/{}", library, self.name)
    }
}

/// Derive identifiers for the primary target, enforcing the remote limits.
///
/// Checked in the order folder, name, extension; the first violation is
/// returned and nothing further happens.
pub fn describe(path: &Path) -> Result<TargetDescriptor, BuildError> {
    let target = derive(path);
    let fields = [
        (IdentifierField::Folder, &target.folder),
        (IdentifierField::Name, &target.name),
        (IdentifierField::Extension, &target.extension),
    ];
    for (field, value) in fields {
        let length = value.chars().count();
        if length > field.max_len() {
            return Err(BuildError::IdentifierTooLong {
                field,
                value: value.clone(),
                length,
                max: field.max_len(),
            });
        }
    }
    Ok(target)
}

/// Derive identifiers without checking lengths.
///
/// Used for dependency uploads, which are not validated up front.
pub fn derive(path: &Path) -> TargetDescriptor {
    let folder = path
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = path
        .file_stem()
        .map(|n| n.to_string_lossy().to_uppercase())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    TargetDescriptor {
        folder,
        name,
        extension,
        source_path: path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_describe_basic() {
        let target = describe(Path::new("/ws/MYLIB/customer.RPGLE")).unwrap();
        assert_eq!(target.folder, "MYLIB");
        assert_eq!(target.name, "CUSTOMER");
        assert_eq!(target.extension, "RPGLE");
        assert_eq!(target.qualified_object("DEVLIB"), "DEVLIB/CUSTOMER");
    }

    #[test]
    fn test_describe_only_last_extension_is_type() {
        let target = describe(Path::new("/ws/src/pgm.test.sqlrpgle")).unwrap();
        assert_eq!(target.name, "PGM.TEST");
        assert_eq!(target.extension, "sqlrpgle".to_string());
    }

    #[test]
    fn test_describe_without_extension() {
        let target = describe(Path::new("/ws/QCLSRC/STARTUP")).unwrap();
        assert_eq!(target.extension, "");
        assert_eq!(target.name, "STARTUP");
    }

    #[test]
    fn test_folder_too_long() {
        let err = describe(Path::new("/ws/averylongfolder/a.rpgle")).unwrap_err();
        match err {
            BuildError::IdentifierTooLong {
                field,
                length,
                max,
                ..
            } => {
                assert_eq!(field, IdentifierField::Folder);
                assert_eq!(length, 15);
                assert_eq!(max, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extension_too_long() {
        let err = describe(Path::new("/ws/src/a.sqlrpgle")).unwrap_err();
        assert!(matches!(
            err,
            BuildError::IdentifierTooLong {
                field: IdentifierField::Extension,
                length: 8,
                ..
            }
        ));
    }

    #[test]
    fn test_folder_reported_before_name() {
        let err = describe(Path::new("/ws/elevenchars/elevenchars.c")).unwrap_err();
        assert!(matches!(
            err,
            BuildError::IdentifierTooLong {
                field: IdentifierField::Folder,
                ..
            }
        ));
    }

    #[test]
    fn test_derive_ignores_limits() {
        let target = derive(Path::new("/ws/averylongfolder/averylongname.sqlrpgle"));
        assert_eq!(target.folder, "averylongfolder");
        assert_eq!(target.name, "AVERYLONGNAME");
    }

    proptest! {
        #[test]
        fn test_describe_succeeds_iff_within_limits(
            folder in "[a-zA-Z0-9]{1,14}",
            name in "[a-zA-Z0-9]{1,14}",
            ext in "[a-zA-Z0-9]{1,9}",
        ) {
            let path = PathBuf::from("/ws").join(&folder).join(format!("{}.{}", name, ext));
            let within = folder.len() <= 10 && name.len() <= 10 && ext.len() <= 6;
            match describe(&path) {
                Ok(target) => {
                    prop_assert!(within);
                    prop_assert_eq!(target.name, name.to_uppercase());
                }
                Err(BuildError::IdentifierTooLong { field, .. }) => {
                    prop_assert!(!within);
                    let expected = if folder.len() > 10 {
                        IdentifierField::Folder
                    } else if name.len() > 10 {
                        IdentifierField::Name
                    } else {
                        IdentifierField::Extension
                    };
                    prop_assert_eq!(field, expected);
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }
    }
}
