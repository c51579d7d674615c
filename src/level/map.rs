//! Tag-to-severity mapping.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::severity::Severity;

/// Built-in tag mappings.
pub const DEFAULT_LEVEL_MAP: [(&str, Severity); 13] = [
    ("emerg", Severity::Emergency),
    ("emergency", Severity::Emergency),
    ("alert", Severity::Alert),
    ("crit", Severity::Critical),
    ("critical", Severity::Critical),
    ("err", Severity::Error),
    ("error", Severity::Error),
    ("warn", Severity::Warning),
    ("warning", Severity::Warning),
    ("notice", Severity::Notice),
    ("info", Severity::Info),
    ("log", Severity::Info),
    ("debug", Severity::Debug),
];

const UNSET: &str = "unset";

/// A user entry in `log_level_map`.
///
/// A key missing from the override table keeps its default; `Unset`
/// removes the default mapping for that tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOverride {
    Set(Severity),
    Unset,
}

impl Serialize for LevelOverride {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LevelOverride::Set(severity) => severity.serialize(serializer),
            LevelOverride::Unset => serializer.serialize_str(UNSET),
        }
    }
}

impl<'de> Deserialize<'de> for LevelOverride {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // JSON `null` unsets as well; TOML has no null so "unset" is the spelling there.
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(LevelOverride::Unset),
            Some(name) if name == UNSET => Ok(LevelOverride::Unset),
            Some(name) => name
                .parse()
                .map(LevelOverride::Set)
                .map_err(serde::de::Error::custom),
        }
    }
}

impl From<Severity> for LevelOverride {
    fn from(severity: Severity) -> Self {
        LevelOverride::Set(severity)
    }
}

/// Merged tag → severity lookup.
#[derive(Debug, Clone)]
pub struct LevelMap {
    entries: HashMap<String, Severity>,
}

impl LevelMap {
    /// Merge the defaults with user overrides.
    pub fn with_overrides(overrides: &BTreeMap<String, LevelOverride>) -> Self {
        let mut entries: HashMap<String, Severity> = DEFAULT_LEVEL_MAP
            .iter()
            .map(|(tag, severity)| (tag.to_string(), *severity))
            .collect();

        for (tag, entry) in overrides {
            match entry {
                LevelOverride::Set(severity) => {
                    entries.insert(tag.clone(), *severity);
                }
                LevelOverride::Unset => {
                    entries.remove(tag);
                }
            }
        }

        Self { entries }
    }

    pub fn get(&self, tag: &str) -> Option<Severity> {
        self.entries.get(tag).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most severe mapped severity among `tags`, or `default` if none map.
    pub fn resolve<'a, I>(&self, tags: I, default: Severity) -> Severity
    where
        I: IntoIterator<Item = &'a str>,
    {
        tags.into_iter()
            .filter_map(|tag| self.get(tag))
            .min_by_key(|severity| severity.rank())
            .unwrap_or(default)
    }
}

impl Default for LevelMap {
    fn default() -> Self {
        Self::with_overrides(&BTreeMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(entries: &[(&str, LevelOverride)]) -> BTreeMap<String, LevelOverride> {
        entries
            .iter()
            .map(|(tag, entry)| (tag.to_string(), *entry))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let map = LevelMap::default();
        assert_eq!(map.len(), DEFAULT_LEVEL_MAP.len());
        assert_eq!(map.get("emerg"), Some(Severity::Emergency));
        assert_eq!(map.get("warn"), Some(Severity::Warning));
        assert_eq!(map.get("log"), Some(Severity::Info));
        assert_eq!(map.get("foo"), None);
    }

    #[test]
    fn test_most_severe_wins_regardless_of_order() {
        let map = LevelMap::default();
        assert_eq!(map.resolve(["info", "error", "debug"], Severity::Info), Severity::Error);
        assert_eq!(map.resolve(["debug", "info", "error"], Severity::Info), Severity::Error);
        assert_eq!(map.resolve(["error", "debug", "info"], Severity::Info), Severity::Error);
        assert_eq!(map.resolve(["foo", "crit", "alert"], Severity::Debug), Severity::Alert);
    }

    #[test]
    fn test_unmapped_tags_use_default() {
        let map = LevelMap::default();
        assert_eq!(map.resolve(["foo", "bar"], Severity::Notice), Severity::Notice);
        assert_eq!(map.resolve(Vec::<&str>::new(), Severity::Emergency), Severity::Emergency);
    }

    #[test]
    fn test_overrides_and_unset() {
        let map = LevelMap::with_overrides(&overrides(&[
            ("error", LevelOverride::Unset),
            ("info", LevelOverride::Unset),
            ("debug", LevelOverride::Unset),
            ("foo", LevelOverride::Set(Severity::Critical)),
        ]));

        assert_eq!(map.get("error"), None);
        assert_eq!(map.get("err"), Some(Severity::Error));
        assert_eq!(map.get("foo"), Some(Severity::Critical));
        assert_eq!(map.resolve(["info", "error", "debug"], Severity::Alert), Severity::Alert);
    }

    #[test]
    fn test_override_replaces_default() {
        let map = LevelMap::with_overrides(&overrides(&[("warn", Severity::Error.into())]));
        assert_eq!(map.get("warn"), Some(Severity::Error));
    }

    #[test]
    fn test_deserialize_override() {
        let parsed: BTreeMap<String, LevelOverride> =
            serde_json::from_str(r#"{"a":"debug","b":"unset","c":null}"#).unwrap();
        assert_eq!(parsed["a"], LevelOverride::Set(Severity::Debug));
        assert_eq!(parsed["b"], LevelOverride::Unset);
        assert_eq!(parsed["c"], LevelOverride::Unset);

        let err = serde_json::from_str::<BTreeMap<String, LevelOverride>>(r#"{"foo":"not-valid"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("not-valid is not a valid log level"));
    }
}
