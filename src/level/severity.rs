//! Severity table and backend write methods.
//!
//! # Ranks
//! ```text
//! emergency 0   system is unusable
//! alert     1   should be corrected immediately
//! critical  2   critical conditions
//! error     3   error conditions
//! warning   4   may indicate that an error will occur
//! notice    5   unusual, but not an error
//! info      6   normal operational messages
//! debug     7   useful to developers
//! ```
//!
//! # Design Decisions
//! - Lower rank = more severe
//! - Threshold check is `rank <= threshold`, so `level` names the least
//!   severe level still emitted

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Returned when a name is not one of the eight severities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0} is not a valid log level")]
pub struct UnknownLevel(pub String);

/// One of the eight ranked log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 8] = [
        Severity::Emergency,
        Severity::Alert,
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Notice,
        Severity::Info,
        Severity::Debug,
    ];

    pub const fn rank(self) -> u8 {
        self as u8
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.get(rank as usize).copied()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Emergency => "emergency",
            Severity::Alert => "alert",
            Severity::Critical => "critical",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Notice => "notice",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }

    /// Returns true if a record at this severity passes the `threshold`.
    pub const fn is_within(self, threshold: Severity) -> bool {
        self.rank() <= threshold.rank()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|severity| severity.as_str() == s)
            .ok_or_else(|| UnknownLevel(s.to_string()))
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Write methods a logger backend exposes: one per severity plus `log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogMethod {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
    Log,
}

impl LogMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            LogMethod::Emergency => "emergency",
            LogMethod::Alert => "alert",
            LogMethod::Critical => "critical",
            LogMethod::Error => "error",
            LogMethod::Warning => "warning",
            LogMethod::Notice => "notice",
            LogMethod::Info => "info",
            LogMethod::Debug => "debug",
            LogMethod::Log => "log",
        }
    }

    /// Severities at rank 3 or more severe.
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            LogMethod::Emergency | LogMethod::Alert | LogMethod::Critical | LogMethod::Error
        )
    }
}

impl From<Severity> for LogMethod {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Emergency => LogMethod::Emergency,
            Severity::Alert => LogMethod::Alert,
            Severity::Critical => LogMethod::Critical,
            Severity::Error => LogMethod::Error,
            Severity::Warning => LogMethod::Warning,
            Severity::Notice => LogMethod::Notice,
            Severity::Info => LogMethod::Info,
            Severity::Debug => LogMethod::Debug,
        }
    }
}

impl fmt::Display for LogMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_are_fixed() {
        for (rank, severity) in Severity::ALL.iter().enumerate() {
            assert_eq!(severity.rank() as usize, rank);
            assert_eq!(Severity::from_rank(rank as u8), Some(*severity));
        }
        assert_eq!(Severity::from_rank(8), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("warning".parse::<Severity>(), Ok(Severity::Warning));
        let err = "zzz".parse::<Severity>().unwrap_err();
        assert_eq!(err.to_string(), "zzz is not a valid log level");
        // Tag aliases are not severity names.
        assert!("warn".parse::<Severity>().is_err());
    }

    #[test]
    fn test_threshold_direction_every_pair() {
        for record in Severity::ALL {
            for threshold in Severity::ALL {
                let expected = record.rank() <= threshold.rank();
                assert_eq!(
                    record.is_within(threshold),
                    expected,
                    "record {record} against threshold {threshold}"
                );
            }
        }
        assert!(Severity::Emergency.is_within(Severity::Alert));
        assert!(!Severity::Info.is_within(Severity::Alert));
    }

    #[test]
    fn test_error_methods() {
        let errors: Vec<_> = Severity::ALL
            .into_iter()
            .map(LogMethod::from)
            .filter(|m| m.is_error())
            .collect();
        assert_eq!(
            errors,
            vec![LogMethod::Emergency, LogMethod::Alert, LogMethod::Critical, LogMethod::Error]
        );
        assert!(!LogMethod::Log.is_error());
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&Severity::Notice).unwrap();
        assert_eq!(json, "\"notice\"");
        let parsed: Severity = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(parsed, Severity::Critical);
        assert!(serde_json::from_str::<Severity>("\"loud\"").is_err());
    }
}
