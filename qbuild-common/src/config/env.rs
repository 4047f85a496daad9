//! `QBUILD_*` environment overrides.
//!
//! [`EnvParser`] layers each override on top of a value that already knows
//! where it came from. A malformed override leaves that value in place and is
//! recorded, so `qbuild check` can list every bad variable in one go.

use super::source::Sourced;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("{var}='{value}' is not {expected}")]
    InvalidValue {
        var: String,
        expected: &'static str,
        value: String,
    },

    #[error("{var}={value} is outside {min}..={max}")]
    OutOfRange {
        var: String,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("{var}='{value}' is not a log level (trace, debug, info, warn, error, off)")]
    InvalidLogLevel { var: String, value: String },
}

pub struct EnvParser {
    prefix: &'static str,
    errors: Vec<EnvError>,
}

impl EnvParser {
    pub fn new() -> Self {
        Self {
            prefix: "QBUILD_",
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[EnvError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Hand the collected problems to the caller and start over.
    pub fn take_errors(&mut self) -> Vec<EnvError> {
        std::mem::take(&mut self.errors)
    }

    /// Override `current` with `<prefix><name>` when set and `parse` accepts it.
    fn layer<T>(
        &mut self,
        name: &str,
        current: Sourced<T>,
        parse: impl FnOnce(&str, String) -> Result<T, EnvError>,
    ) -> Sourced<T> {
        let var = format!("{}{}", self.prefix, name);
        let Ok(raw) = env::var(&var) else {
            return current;
        };
        match parse(&var, raw) {
            Ok(value) => Sourced::from_env(value, var),
            Err(error) => {
                self.errors.push(error);
                current
            }
        }
    }

    pub fn get_string(&mut self, name: &str, current: Sourced<String>) -> Sourced<String> {
        self.layer(name, current, |_, raw| Ok(raw))
    }

    /// `1/true/yes/on` or `0/false/no/off`, any case. Empty means false.
    pub fn get_bool(&mut self, name: &str, current: Sourced<bool>) -> Sourced<bool> {
        self.layer(name, current, |var, raw| {
            parse_flag(&raw).ok_or_else(|| EnvError::InvalidValue {
                var: var.to_string(),
                expected: "a flag (true/false, yes/no, on/off, 1/0)",
                value: raw,
            })
        })
    }

    /// A TCP port; zero is rejected.
    pub fn get_port(&mut self, name: &str, current: Sourced<u16>) -> Sourced<u16> {
        self.layer(name, current, |var, raw| {
            let number: u64 = raw.trim().parse().map_err(|_| EnvError::InvalidValue {
                var: var.to_string(),
                expected: "a port number",
                value: raw.clone(),
            })?;
            match u16::try_from(number) {
                Ok(port) if port > 0 => Ok(port),
                _ => Err(EnvError::OutOfRange {
                    var: var.to_string(),
                    value: number,
                    min: 1,
                    max: u64::from(u16::MAX),
                }),
            }
        })
    }

    /// A path with `~/` expanded. Setting the variable to an empty string
    /// clears the configured path.
    pub fn get_optional_path(
        &mut self,
        name: &str,
        current: Sourced<Option<PathBuf>>,
    ) -> Sourced<Option<PathBuf>> {
        self.layer(name, current, |_, raw| {
            let raw = raw.trim();
            Ok((!raw.is_empty()).then(|| expand_home(raw)))
        })
    }

    pub fn get_log_level(&mut self, name: &str, current: Sourced<String>) -> Sourced<String> {
        self.layer(name, current, |var, raw| {
            normalize_log_level(&raw).ok_or_else(|| EnvError::InvalidLogLevel {
                var: var.to_string(),
                value: raw,
            })
        })
    }

    /// Library names separated by commas or whitespace.
    pub fn get_library_list(
        &mut self,
        name: &str,
        current: Sourced<Vec<String>>,
    ) -> Sourced<Vec<String>> {
        self.layer(name, current, |_, raw| Ok(split_libraries(&raw)))
    }
}

impl Default for EnvParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(value: &str) -> PathBuf {
    if let Some(stripped) = value.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(value)
}

pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    let value = value.trim();
    const ON: [&str; 4] = ["1", "true", "yes", "on"];
    const OFF: [&str; 5] = ["0", "false", "no", "off", ""];
    if ON.iter().any(|v| value.eq_ignore_ascii_case(v)) {
        Some(true)
    } else if OFF.iter().any(|v| value.eq_ignore_ascii_case(v)) {
        Some(false)
    } else {
        None
    }
}

pub(crate) fn normalize_log_level(value: &str) -> Option<String> {
    const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];
    LEVELS
        .iter()
        .find(|level| value.trim().eq_ignore_ascii_case(level))
        .map(|level| (*level).to_string())
}

pub(crate) fn split_libraries(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use crate::config::ConfigSource;
    use crate::config::env_test_lock;
    use proptest::prelude::*;

    /// Run `f` with `var` set to `value`, removing it afterwards.
    fn with_var<R>(var: &str, value: &str, f: impl FnOnce() -> R) -> R {
        let _guard = env_test_lock();
        // SAFETY: env access is serialized by env_test_lock
        unsafe { env::set_var(var, value) };
        let result = f();
        // SAFETY: as above
        unsafe { env::remove_var(var) };
        result
    }

    #[test]
    fn test_flag_spellings() {
        for raw in ["1", "TRUE", "Yes", " on "] {
            let parsed = with_var("QBUILD_FLAG_ON", raw, || {
                EnvParser::new().get_bool("FLAG_ON", Sourced::default_value(false))
            });
            assert!(parsed.value, "{raw:?} should enable the flag");
            assert_eq!(parsed.source.source, ConfigSource::Environment);
        }
    }

    #[test]
    fn test_bad_flag_keeps_current_value() {
        let mut parser = EnvParser::new();
        let parsed = with_var("QBUILD_FLAG_BAD", "maybe", || {
            parser.get_bool("FLAG_BAD", Sourced::default_value(true))
        });
        assert!(parsed.value);
        assert!(parsed.is_default());
        assert!(parser.has_errors());
        assert_eq!(
            parser.errors()[0].to_string(),
            "QBUILD_FLAG_BAD='maybe' is not a flag (true/false, yes/no, on/off, 1/0)"
        );
    }

    #[test]
    fn test_port_bounds() {
        let mut parser = EnvParser::new();
        let port = with_var("QBUILD_PORT_BIG", "70000", || {
            parser.get_port("PORT_BIG", Sourced::default_value(22))
        });
        assert_eq!(port.value, 22);
        let port = with_var("QBUILD_PORT_ZERO", "0", || {
            parser.get_port("PORT_ZERO", Sourced::default_value(22))
        });
        assert_eq!(port.value, 22);
        assert!(matches!(
            parser.take_errors().as_slice(),
            [EnvError::OutOfRange { value: 70000, .. }, EnvError::OutOfRange { value: 0, .. }]
        ));

        let port = with_var("QBUILD_PORT_OK", "2222", || {
            parser.get_port("PORT_OK", Sourced::default_value(22))
        });
        assert_eq!(port.value, 2222);
        assert!(!parser.has_errors());
    }

    #[test]
    fn test_empty_path_clears_identity() {
        let current = Sourced::from_file(Some(PathBuf::from("/keys/id")), "/cfg.toml".into());
        let parsed = with_var("QBUILD_KEY_PATH", "", || {
            EnvParser::new().get_optional_path("KEY_PATH", current)
        });
        assert_eq!(parsed.value, None);
        assert_eq!(parsed.source.source, ConfigSource::Environment);
    }

    #[test]
    fn test_library_list_separators() {
        let parsed = with_var("QBUILD_LIBL_MIXED", " QGPL, &CURLIB ,,DEVLIB  QTEMP", || {
            EnvParser::new().get_library_list("LIBL_MIXED", Sourced::default_value(Vec::new()))
        });
        assert_eq!(parsed.value, vec!["QGPL", "&CURLIB", "DEVLIB", "QTEMP"]);
    }

    #[test]
    fn test_unset_keeps_file_source() {
        let _guard = env_test_lock();
        // SAFETY: env access is serialized by env_test_lock
        unsafe { env::remove_var("QBUILD_UNSET_HOST") };

        let from_file = Sourced::from_file("ibmi.example.com".to_string(), "/cfg.toml".into());
        let result = EnvParser::new().get_string("UNSET_HOST", from_file.clone());
        assert_eq!(result, from_file);
    }

    #[test]
    fn test_log_level_is_normalized() {
        let mut parser = EnvParser::new();
        let level = with_var("QBUILD_LEVEL_UPPER", "DEBUG", || {
            parser.get_log_level("LEVEL_UPPER", Sourced::default_value("info".into()))
        });
        assert_eq!(level.value, "debug");

        let level = with_var("QBUILD_LEVEL_BAD", "verbose", || {
            parser.get_log_level("LEVEL_BAD", Sourced::default_value("info".into()))
        });
        assert_eq!(level.value, "info");
        assert!(matches!(
            parser.take_errors().as_slice(),
            [EnvError::InvalidLogLevel { .. }]
        ));
    }

    proptest! {
        #[test]
        fn test_split_libraries_round_trips_names(
            names in prop::collection::vec("[A-Z0-9&]{1,10}", 0..8),
            comma in any::<bool>(),
        ) {
            let input = names.join(if comma { "," } else { " " });
            prop_assert_eq!(split_libraries(&input), names);
        }

        #[test]
        fn test_only_known_levels_normalize(s in "[a-zA-Z]{0,10}") {
            let known = ["trace", "debug", "info", "warn", "error", "off"];
            let expected = known.iter().any(|v| s.eq_ignore_ascii_case(v));
            prop_assert_eq!(normalize_log_level(&s).is_some(), expected);
        }
    }
}
