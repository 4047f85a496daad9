//! Shared utilities for qbuild.

use regex::Regex;
use std::sync::OnceLock;

fn find_value_end(s: &str) -> usize {
    let mut end = 0;
    let mut in_quote = None;
    let mut escaped = false;

    for c in s.chars() {
        let char_len = c.len_utf8();

        if escaped {
            escaped = false;
            end += char_len;
            continue;
        }

        if c == '\\' {
            escaped = true;
            end += char_len;
            continue;
        }

        if let Some(q) = in_quote {
            if c == q {
                in_quote = None;
            }
            end += char_len;
            continue;
        }

        if c == '"' || c == '\'' {
            in_quote = Some(c);
            end += char_len;
            continue;
        }

        if c.is_whitespace() || c == ')' {
            break;
        }

        end += char_len;
    }
    end
}

/// CL parameters and shell assignments whose values must not reach the log.
fn sensitive_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(PASSWORD|PASSWD|PWD|NEWPWD|CURPWD|TOKEN|SECRET|API_KEY|ACCESS_TOKEN)(\(|=)")
            .unwrap_or_else(|e| panic!("invalid sensitive pattern: {e}"))
    })
}

/// Mask sensitive values in a command string before logging.
///
/// Handles CL style `PASSWORD(secret)` and shell style `TOKEN=secret`,
/// keyword case-insensitively. Quoted values are masked whole.
pub fn mask_sensitive_command(cmd: &str) -> String {
    let mut result = String::with_capacity(cmd.len());
    let mut rest = cmd;

    while let Some(m) = sensitive_pattern().find(rest) {
        result.push_str(&rest[..m.end()]);
        result.push_str("***");
        let value = &rest[m.end()..];
        rest = &value[find_value_end(value)..];
    }
    result.push_str(rest);
    result
}

/// Escape `s` for use inside a double-quoted remote shell word.
pub fn escape_double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Case-insensitive substring test for ASCII needles.
pub fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_uppercase()
        .contains(&needle.to_ascii_uppercase())
}
