use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/xinput-tui.json";

/// Saved speed settings for one device. `speed` is the accel value directly
/// in normal mode and the transform-matrix input in extended mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub extended: bool,
}

/// Whitelist membership is an exact `(name, id)` pair match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub name: String,
    pub id: String,
}

/// The persisted config document.
///
/// Read once at startup, mutated in memory, rewritten whole after each edit.
/// All four keys are present after load; `migrate` fills defaults and
/// upgrades the legacy flat `{name: profile}` shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Config {
    pub by_name: BTreeMap<String, Profile>,
    pub by_id: BTreeMap<String, Profile>,
    #[serde(rename = "_whitelist")]
    pub whitelist: Vec<WhitelistEntry>,
    #[serde(rename = "_show_only_whitelist")]
    pub show_only_whitelist: bool,
}

/// Upgrade a raw JSON document into a complete config.
///
/// Non-object input yields the default document. A document already carrying
/// `by_id` or `by_name` keeps its parseable content and gets missing root
/// keys filled. Anything else is treated as the legacy flat shape: every
/// value that is an object mentioning `speed` or `extended` moves under
/// `by_name`; other legacy root keys are discarded.
pub fn migrate(raw: Value) -> Config {
    let Value::Object(map) = raw else {
        return Config::default();
    };

    if map.contains_key("by_name") || map.contains_key("by_id") {
        return Config {
            by_name: profiles_from(map.get("by_name")),
            by_id: profiles_from(map.get("by_id")),
            whitelist: whitelist_from(map.get("_whitelist")),
            show_only_whitelist: map
                .get("_show_only_whitelist")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        };
    }

    let mut by_name = BTreeMap::new();
    for (key, value) in &map {
        let Value::Object(entry) = value else {
            continue;
        };
        if entry.contains_key("speed") || entry.contains_key("extended") {
            by_name.insert(
                key.clone(),
                Profile {
                    speed: entry.get("speed").and_then(Value::as_f64).unwrap_or(0.0),
                    extended: entry
                        .get("extended")
                        .and_then(Value::as_bool)
                        .unwrap_or(false),
                },
            );
        }
    }

    Config {
        by_name,
        ..Config::default()
    }
}

fn profiles_from(value: Option<&Value>) -> BTreeMap<String, Profile> {
    let mut out = BTreeMap::new();
    if let Some(Value::Object(map)) = value {
        for (key, entry) in map {
            // Entries that do not parse are skipped, not fatal.
            if let Ok(profile) = serde_json::from_value::<Profile>(entry.clone()) {
                out.insert(key.clone(), profile);
            }
        }
    }
    out
}

fn whitelist_from(value: Option<&Value>) -> Vec<WhitelistEntry> {
    let mut out = Vec::new();
    if let Some(Value::Array(items)) = value {
        for item in items {
            // Entries missing name or id are skipped, not fatal.
            if let Ok(entry) = serde_json::from_value::<WhitelistEntry>(item.clone()) {
                out.push(entry);
            }
        }
    }
    out
}

impl Config {
    /// Load and migrate the document at `path`. Never fails outward: an
    /// unreadable or malformed file degrades to the default document and the
    /// file on disk is left untouched until the next save.
    pub fn load(path: &Path) -> Config {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Config::default();
            }
            Err(e) => {
                log::warn!("could not read {}: {}", path.display(), e);
                return Config::default();
            }
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(raw) => migrate(raw),
            Err(e) => {
                log::warn!(
                    "{} is not valid JSON ({}); starting from defaults",
                    path.display(),
                    e
                );
                Config::default()
            }
        }
    }

    /// Rewrite the whole document, pretty-printed so it stays hand-editable.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Resolve the profile for a device: an id match wins over a name match.
    pub fn profile_for(&self, name: &str, id: Option<&str>) -> Option<Profile> {
        if let Some(id) = id {
            if let Some(profile) = self.by_id.get(id) {
                return Some(*profile);
            }
        }
        self.by_name.get(name).copied()
    }

    pub fn whitelist_set(&self) -> HashSet<(String, String)> {
        self.whitelist
            .iter()
            .map(|entry| (entry.name.clone(), entry.id.clone()))
            .collect()
    }

    /// Toggle `(name, id)` whitelist membership.
    pub fn toggle_whitelist(&mut self, name: &str, id: &str) {
        match self
            .whitelist
            .iter()
            .position(|entry| entry.name == name && entry.id == id)
        {
            Some(idx) => {
                self.whitelist.remove(idx);
            }
            None => self.whitelist.push(WhitelistEntry {
                name: name.to_string(),
                id: id.to_string(),
            }),
        }
    }

    /// Resolve the config file location, expanding `~` and environment
    /// variables.
    pub fn resolve_path(raw: &str) -> Result<PathBuf> {
        let expanded = shellexpand::full(raw).map_err(|e| Error::Path(e.to_string()))?;
        Ok(PathBuf::from(expanded.into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_flat_document_moves_under_by_name() {
        let config = migrate(json!({
            "mouse": {"speed": 1.5, "extended": true}
        }));
        assert_eq!(
            config.by_name.get("mouse"),
            Some(&Profile {
                speed: 1.5,
                extended: true
            })
        );
        assert!(config.by_id.is_empty());
        assert!(config.whitelist.is_empty());
        assert!(!config.show_only_whitelist);
    }

    #[test]
    fn legacy_values_are_coerced_and_junk_is_dropped() {
        let config = migrate(json!({
            "touchpad": {"speed": 2},
            "trackball": {"extended": true},
            "not a profile": "hello",
            "also not": {"foo": 1}
        }));
        assert_eq!(config.by_name.len(), 2);
        assert_eq!(config.by_name["touchpad"].speed, 2.0);
        assert!(!config.by_name["touchpad"].extended);
        assert_eq!(config.by_name["trackball"].speed, 0.0);
        assert!(config.by_name["trackball"].extended);
    }

    #[test]
    fn non_object_input_yields_defaults() {
        assert_eq!(migrate(json!(null)), Config::default());
        assert_eq!(migrate(json!([1, 2, 3])), Config::default());
        assert_eq!(migrate(json!("text")), Config::default());
    }

    #[test]
    fn new_format_gets_missing_keys_filled() {
        let config = migrate(json!({
            "by_id": {"11": {"speed": -0.4, "extended": false}}
        }));
        assert_eq!(config.by_id["11"].speed, -0.4);
        assert!(config.by_name.is_empty());
        assert!(config.whitelist.is_empty());
        assert!(!config.show_only_whitelist);
    }

    #[test]
    fn migrate_is_idempotent_over_serialization() {
        let docs = [
            json!({"mouse": {"speed": 1.5, "extended": true}}),
            json!({
                "by_name": {"pad": {"speed": 0.3, "extended": false}},
                "by_id": {"9": {"speed": -1.0, "extended": true}},
                "_whitelist": [{"name": "pad", "id": "9"}],
                "_show_only_whitelist": true
            }),
        ];
        for doc in docs {
            let once = migrate(doc);
            let twice = migrate(serde_json::to_value(&once).unwrap());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn malformed_whitelist_entries_are_skipped_individually() {
        let config = migrate(json!({
            "by_name": {},
            "_whitelist": [
                {"name": "good", "id": "4"},
                {"name": "missing id"},
                {"id": "7"},
                "not even an object",
                {"name": "also good", "id": "5"}
            ]
        }));
        assert_eq!(
            config.whitelist,
            vec![
                WhitelistEntry {
                    name: "good".into(),
                    id: "4".into()
                },
                WhitelistEntry {
                    name: "also good".into(),
                    id: "5".into()
                },
            ]
        );
    }

    #[test]
    fn unparseable_profile_entries_are_skipped_individually() {
        let config = migrate(json!({
            "by_name": {
                "good": {"speed": 0.5, "extended": false},
                "bad": {"speed": "fast"}
            }
        }));
        assert_eq!(config.by_name.len(), 1);
        assert!(config.by_name.contains_key("good"));
    }

    #[test]
    fn profile_lookup_prefers_id_over_name() {
        let config = migrate(json!({
            "by_name": {"mouse": {"speed": 0.2, "extended": false}},
            "by_id": {"11": {"speed": 0.9, "extended": true}}
        }));
        let hit = config.profile_for("mouse", Some("11")).unwrap();
        assert_eq!(hit.speed, 0.9);
        assert!(hit.extended);

        let by_name = config.profile_for("mouse", Some("12")).unwrap();
        assert_eq!(by_name.speed, 0.2);

        assert!(config.profile_for("unknown", None).is_none());
    }

    #[test]
    fn toggle_whitelist_round_trips() {
        let mut config = Config::default();
        config.toggle_whitelist("mouse", "11");
        assert_eq!(config.whitelist.len(), 1);
        config.toggle_whitelist("mouse", "11");
        assert!(config.whitelist.is_empty());
    }
}
