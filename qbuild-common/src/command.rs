//! Command template substitution and library list construction.

use crate::target::TargetDescriptor;
use crate::types::{Action, RemoteEnvironment};

/// Library list entry replaced by the build library.
pub const BUILDLIB_VARIABLE: &str = "&BUILDLIB";
/// Library list entry replaced by the current library.
pub const CURLIB_VARIABLE: &str = "&CURLIB";

/// Placeholders recognised in command templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    BuildLib,
    Folder,
    Name,
    Ext,
}

impl Token {
    const ALL: [Token; 4] = [Token::BuildLib, Token::Folder, Token::Name, Token::Ext];

    /// Text following the `&`.
    const fn keyword(self) -> &'static str {
        match self {
            Token::BuildLib => "BUILDLIB",
            Token::Folder => "FOLDER",
            Token::Name => "NAME",
            Token::Ext => "EXT",
        }
    }

    fn value<'a>(self, values: &'a TokenValues<'a>) -> &'a str {
        match self {
            Token::BuildLib => &values.build_library,
            Token::Folder => values.folder,
            Token::Name => values.name,
            Token::Ext => values.extension,
        }
    }
}

struct TokenValues<'a> {
    build_library: String,
    folder: &'a str,
    name: &'a str,
    extension: &'a str,
}

/// A composed command and the library list it runs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltCommand {
    pub command: String,
    /// Entries in `liblist -a` order.
    pub library_list: Vec<String>,
}

/// Compose the command for `action` against `target`.
pub fn build(
    action: &Action,
    target: &TargetDescriptor,
    build_library: &str,
    environment: &RemoteEnvironment,
) -> BuiltCommand {
    let values = TokenValues {
        build_library: build_library.to_uppercase(),
        folder: &target.folder,
        name: &target.name,
        extension: &target.extension,
    };
    BuiltCommand {
        command: substitute(&action.command, &values),
        library_list: build_library_list(environment, &values.build_library),
    }
}

/// Replace every placeholder in one left-to-right pass.
///
/// Substituted text is never rescanned, so a folder named `&NAME` stays
/// `&NAME`. Unknown `&` sequences pass through untouched.
fn substitute(template: &str, values: &TokenValues<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        match Token::ALL.iter().find(|t| after.starts_with(t.keyword())) {
            Some(token) => {
                out.push_str(token.value(values));
                rest = &after[token.keyword().len()..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Reverse the configured list and resolve the special entries.
///
/// `liblist -a` adds each library to the front, so the reversed order leaves
/// the first configured library first in the job's search order.
pub fn build_library_list(environment: &RemoteEnvironment, build_library: &str) -> Vec<String> {
    environment
        .library_list
        .iter()
        .rev()
        .map(|entry| match entry.as_str() {
            BUILDLIB_VARIABLE => build_library.to_string(),
            CURLIB_VARIABLE => environment.current_library.clone(),
            _ => entry.clone(),
        })
        .collect()
}
