//! Mutation commands decoded at the service boundary
//!
//! Remote callers send a `(key, val)` pair. It is decoded once into a
//! [`ConfigCommand`]; nothing past this point matches on strings.
//!
//! | key | val | command |
//! |---|---|---|
//! | `title` | any text | [`ConfigCommand::SetTitle`] |
//! | `url` | URL | [`ConfigCommand::SetVideoUrl`] |
//! | `subs` | URL | [`ConfigCommand::SetSubtitleUrl`] |
//! | `start` | `YYYYmmdd HHMM` (server local time) | [`ConfigCommand::SetStartTime`] |
//! | `cdn` | `add <name> <url>` | [`BackupCommand::Append`] |
//! | `cdn` | `del <index>` | [`BackupCommand::RemoveAt`] |
//! | `cdn` | `set <index> <name> <url>` | [`BackupCommand::ReplaceAt`] |

use chrono::{Local, NaiveDateTime, TimeZone};

use crate::error::{Error, Result};

/// Wire format of the `start` value
pub const START_TIME_FORMAT: &str = "%Y%m%d %H%M";

/// A decoded configuration mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Set the display title
    SetTitle(String),
    /// Set the primary video URL
    SetVideoUrl(String),
    /// Set the subtitle URL
    SetSubtitleUrl(String),
    /// Set the start time (Unix seconds)
    SetStartTime(i64),
    /// Mutate the backup mirror list
    Backup(BackupCommand),
}

/// A backup mirror list mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupCommand {
    /// Append at the tail
    Append {
        /// Display name
        name: String,
        /// Mirror URL
        url: String,
    },
    /// Remove by position
    RemoveAt {
        /// Zero-based position
        index: usize,
    },
    /// Overwrite by position
    ReplaceAt {
        /// Zero-based position
        index: usize,
        /// Display name
        name: String,
        /// Mirror URL
        url: String,
    },
}

impl ConfigCommand {
    /// Decode a wire `(key, val)` pair
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedOption`] for an unknown key
    /// - [`Error::UnsupportedSubcommand`] for an unknown `cdn` sub-command
    /// - [`Error::Validation`] for bad arity, indices or dates
    pub fn parse(key: &str, val: &str) -> Result<Self> {
        match key {
            "title" => Ok(ConfigCommand::SetTitle(val.to_string())),
            "url" => Ok(ConfigCommand::SetVideoUrl(val.to_string())),
            "subs" => Ok(ConfigCommand::SetSubtitleUrl(val.to_string())),
            "start" => parse_start_time(val).map(ConfigCommand::SetStartTime),
            "cdn" => BackupCommand::parse(val).map(ConfigCommand::Backup),
            _ => Err(Error::unsupported_option(key, val)),
        }
    }

    /// Encode back into a wire `(key, val)` pair
    ///
    /// `SetStartTime` is rendered in server local time, minute precision.
    pub fn to_wire(&self) -> Result<(&'static str, String)> {
        Ok(match self {
            ConfigCommand::SetTitle(title) => ("title", title.clone()),
            ConfigCommand::SetVideoUrl(url) => ("url", url.clone()),
            ConfigCommand::SetSubtitleUrl(url) => ("subs", url.clone()),
            ConfigCommand::SetStartTime(secs) => {
                let local = Local
                    .timestamp_opt(*secs, 0)
                    .single()
                    .ok_or_else(|| Error::validation(format!("invalid timestamp: {}", secs)))?;
                ("start", local.format(START_TIME_FORMAT).to_string())
            }
            ConfigCommand::Backup(cmd) => ("cdn", cmd.to_wire()),
        })
    }
}

impl BackupCommand {
    /// Decode the value of a `cdn` option
    pub fn parse(val: &str) -> Result<Self> {
        let words: Vec<&str> = val.split_whitespace().collect();
        let Some((&sub, args)) = words.split_first() else {
            return Err(Error::validation("backup_urls: missing sub command"));
        };

        match (sub, args) {
            ("add", &[name, url]) => Ok(BackupCommand::Append {
                name: name.to_string(),
                url: url.to_string(),
            }),
            ("del", &[index]) => Ok(BackupCommand::RemoveAt {
                index: parse_index(index)?,
            }),
            ("set", &[index, name, url]) => Ok(BackupCommand::ReplaceAt {
                index: parse_index(index)?,
                name: name.to_string(),
                url: url.to_string(),
            }),
            ("add", _) => Err(arity("add <name> <url>", args.len())),
            ("del", _) => Err(arity("del <index>", args.len())),
            ("set", _) => Err(arity("set <index> <name> <url>", args.len())),
            _ => Err(Error::UnsupportedSubcommand(sub.to_string())),
        }
    }

    fn to_wire(&self) -> String {
        match self {
            BackupCommand::Append { name, url } => format!("add {} {}", name, url),
            BackupCommand::RemoveAt { index } => format!("del {}", index),
            BackupCommand::ReplaceAt { index, name, url } => {
                format!("set {} {} {}", index, name, url)
            }
        }
    }
}

/// Convert `YYYYmmdd HHMM` in server local time to Unix seconds
pub fn parse_start_time(val: &str) -> Result<i64> {
    let naive = NaiveDateTime::parse_from_str(val.trim(), START_TIME_FORMAT).map_err(|e| {
        Error::validation(format!(
            "time data '{}' does not match format 'YYYYmmdd HHMM': {}",
            val, e
        ))
    })?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| Error::validation(format!("'{}' does not exist in local time", val)))?;
    Ok(local.timestamp())
}

fn parse_index(raw: &str) -> Result<usize> {
    raw.parse()
        .map_err(|_| Error::validation(format!("invalid literal for index: '{}'", raw)))
}

fn arity(usage: &str, got: usize) -> Error {
    Error::validation(format!(
        "backup_urls: expected `{}`, got {} argument(s)",
        usage, got
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_options() {
        assert_eq!(
            ConfigCommand::parse("title", "Friday night").unwrap(),
            ConfigCommand::SetTitle("Friday night".to_string())
        );
        assert_eq!(
            ConfigCommand::parse("url", "https://v").unwrap(),
            ConfigCommand::SetVideoUrl("https://v".to_string())
        );
        assert_eq!(
            ConfigCommand::parse("subs", "").unwrap(),
            ConfigCommand::SetSubtitleUrl(String::new())
        );
    }

    #[test]
    fn test_start_time_uses_local_time() {
        let expected = Local
            .with_ymd_and_hms(2020, 3, 14, 20, 30, 0)
            .earliest()
            .unwrap()
            .timestamp();
        assert_eq!(
            ConfigCommand::parse("start", "20200314 2030").unwrap(),
            ConfigCommand::SetStartTime(expected)
        );
    }

    #[test]
    fn test_bad_start_time() {
        let err = ConfigCommand::parse("start", "2020-03-14").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_cdn_sub_commands() {
        assert_eq!(
            ConfigCommand::parse("cdn", "add Mirror1 https://m1").unwrap(),
            ConfigCommand::Backup(BackupCommand::Append {
                name: "Mirror1".to_string(),
                url: "https://m1".to_string(),
            })
        );
        assert_eq!(
            ConfigCommand::parse("cdn", "del 2").unwrap(),
            ConfigCommand::Backup(BackupCommand::RemoveAt { index: 2 })
        );
        assert_eq!(
            ConfigCommand::parse("cdn", "  set 0   M https://m ").unwrap(),
            ConfigCommand::Backup(BackupCommand::ReplaceAt {
                index: 0,
                name: "M".to_string(),
                url: "https://m".to_string(),
            })
        );
    }

    #[test]
    fn test_cdn_errors() {
        assert!(matches!(
            ConfigCommand::parse("cdn", "mv 1 2"),
            Err(Error::UnsupportedSubcommand(sub)) if sub == "mv"
        ));
        assert!(matches!(
            ConfigCommand::parse("cdn", "add onlyname"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            ConfigCommand::parse("cdn", "del -1"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            ConfigCommand::parse("cdn", ""),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_option() {
        let err = ConfigCommand::parse("volume", "11").unwrap_err();
        assert_eq!(err.reply_code(), 1);
    }

    #[test]
    fn test_wire_encoding_decodes_to_same_command() {
        let commands = [
            ConfigCommand::SetTitle("t".to_string()),
            ConfigCommand::Backup(BackupCommand::ReplaceAt {
                index: 3,
                name: "n".to_string(),
                url: "https://u".to_string(),
            }),
        ];
        for command in commands {
            let (key, val) = command.to_wire().unwrap();
            assert_eq!(ConfigCommand::parse(key, &val).unwrap(), command);
        }
    }
}
