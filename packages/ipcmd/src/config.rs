// Process environment and option value parsing.

use std::env;

use crate::RunError;

/// Environment variable that supplies the semaphore identifier when `-s` is not given.
///
/// `semop` also exports it to the guarded command.
pub const SEMID_VARIABLE: &str = "IPCMD_SEMID";

/// Environment variable that supplies the message queue identifier when `-q` is not given.
pub const MSQID_VARIABLE: &str = "IPCMD_MSQID";

/// Environment variable holding the log filter directives, e.g. `IPCMD_LOG=debug`.
pub const LOG_FILTER_VARIABLE: &str = "IPCMD_LOG";

/// Permissions of a newly created IPC object unless `-m` says otherwise.
const DEFAULT_MODE: i32 = 0o600;

/// Permission bits that may be requested when creating an IPC object (read and alter/write
/// for owner, group and others).
const PERMITTED_MODE_BITS: i32 = 0o666;

/// Default identifiers inherited from the environment.
///
/// Explicit command-line options always take precedence over these.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Config {
    semid: Option<String>,
    msqid: Option<String>,
}

impl Config {
    /// Snapshots the identifier variables of the current process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            semid: env::var(SEMID_VARIABLE).ok(),
            msqid: env::var(MSQID_VARIABLE).ok(),
        }
    }

    /// Creates a configuration with the given raw identifier values, as if they came from the
    /// environment.
    #[must_use]
    pub fn new(semid: Option<String>, msqid: Option<String>) -> Self {
        Self { semid, msqid }
    }

    pub(crate) fn semid(&self, explicit: Option<i32>) -> Result<i32, RunError> {
        resolve_identifier(explicit, self.semid.as_deref(), "-s semid", SEMID_VARIABLE)
    }

    pub(crate) fn msqid(&self, explicit: Option<i32>) -> Result<i32, RunError> {
        resolve_identifier(explicit, self.msqid.as_deref(), "-q msqid", MSQID_VARIABLE)
    }
}

fn resolve_identifier(
    explicit: Option<i32>,
    inherited: Option<&str>,
    option: &'static str,
    variable: &'static str,
) -> Result<i32, RunError> {
    if let Some(identifier) = explicit {
        return Ok(identifier);
    }

    let Some(value) = inherited else {
        return Err(RunError::MissingIdentifier { option, variable });
    };

    value.parse().map_err(|inner| {
        RunError::InvalidArgument(format!(
            "invalid identifier '{value}' in {variable}: {inner}"
        ))
    })
}

/// Builds the `semget()`/`msgget()` flags for creating an object.
///
/// Creation is exclusive unless `exist_ok` is set, which is only meaningful for a keyed object
/// because a private object is always new.
pub(crate) fn creation_flags(
    keyed: bool,
    exist_ok: bool,
    mode: Option<i32>,
    key_option: &str,
) -> Result<i32, RunError> {
    if exist_ok && !keyed {
        return Err(RunError::Usage(format!("-e requires {key_option}")));
    }

    let exclusive = if exist_ok { 0 } else { libc::IPC_EXCL };

    Ok(libc::IPC_CREAT | exclusive | mode.unwrap_or(DEFAULT_MODE))
}

/// Parses an octal permission mode such as `600` or `0640`.
///
/// Only read and alter/write bits are accepted.
pub(crate) fn parse_mode(value: &str) -> Result<i32, String> {
    let mode = i32::from_str_radix(value, 8)
        .map_err(|inner| format!("invalid octal mode '{value}': {inner}"))?;

    if mode & !PERMITTED_MODE_BITS != 0 {
        return Err(format!(
            "invalid mode '{value}': only the bits of {PERMITTED_MODE_BITS:o} may be set"
        ));
    }

    Ok(mode)
}

/// Parses a hexadecimal IPC key such as `0x5100a2b3` or `5100a2b3`.
///
/// Keys are 32 bits wide; values with the high bit set wrap to a negative `key_t`.
pub(crate) fn parse_key(value: &str) -> Result<libc::key_t, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    let key = u32::from_str_radix(digits, 16)
        .map_err(|inner| format!("invalid hexadecimal key '{value}': {inner}"))?;

    Ok(libc::key_t::from_ne_bytes(key.to_ne_bytes()))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn explicit_identifier_wins() {
        let config = Config::new(Some("7".to_string()), Some("8".to_string()));

        assert_eq!(config.semid(Some(3)).unwrap(), 3);
        assert_eq!(config.msqid(Some(4)).unwrap(), 4);
        assert_eq!(config.semid(None).unwrap(), 7);
        assert_eq!(config.msqid(None).unwrap(), 8);
    }

    #[test]
    fn missing_identifier_names_option_and_variable() {
        let error = Config::default().semid(None).unwrap_err();

        assert!(matches!(
            error,
            RunError::MissingIdentifier {
                option: "-s semid",
                variable: SEMID_VARIABLE
            }
        ));
        assert_eq!(
            error.to_string(),
            "must either specify [-s semid] or set IPCMD_SEMID environment variable"
        );

        assert!(matches!(
            Config::default().msqid(None).unwrap_err(),
            RunError::MissingIdentifier {
                variable: MSQID_VARIABLE,
                ..
            }
        ));
    }

    #[test]
    fn malformed_inherited_identifier_is_rejected() {
        let config = Config::new(Some("twelve".to_string()), None);

        assert!(matches!(
            config.semid(None).unwrap_err(),
            RunError::InvalidArgument(message) if message.contains("IPCMD_SEMID")
        ));
    }

    #[test]
    fn creation() {
        assert_eq!(
            creation_flags(false, false, None, "-S").unwrap(),
            libc::IPC_CREAT | libc::IPC_EXCL | 0o600
        );
        assert_eq!(
            creation_flags(true, true, Some(0o640), "-S").unwrap(),
            libc::IPC_CREAT | 0o640
        );
        assert!(matches!(
            creation_flags(false, true, None, "-Q").unwrap_err(),
            RunError::Usage(message) if message.contains("-Q")
        ));
    }

    #[test]
    fn modes() {
        assert_eq!(parse_mode("600").unwrap(), 0o600);
        assert_eq!(parse_mode("0666").unwrap(), 0o666);
        assert_eq!(parse_mode("0").unwrap(), 0);

        parse_mode("700").unwrap_err();
        parse_mode("1600").unwrap_err();
        parse_mode("-600").unwrap_err();
        parse_mode("8").unwrap_err();
        parse_mode("").unwrap_err();
    }

    #[test]
    fn keys() {
        assert_eq!(parse_key("0x1f").unwrap(), 0x1f);
        assert_eq!(parse_key("1F").unwrap(), 0x1f);
        assert_eq!(parse_key("0XFF").unwrap(), 0xff);
        assert_eq!(parse_key("ffffffff").unwrap(), -1);

        parse_key("0x").unwrap_err();
        parse_key("0x1g").unwrap_err();
        parse_key("100000000").unwrap_err();
    }
}
