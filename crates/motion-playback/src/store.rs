use crate::{AngleUnit, PlaybackError, Pose, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Recorded poses keyed by label.
///
/// Entries are kept as they were recorded and only validated when a pose is requested,
/// so a single malformed entry does not make the rest of the file unusable.
#[derive(Debug, Default, Clone)]
pub struct PoseStore {
    entries: Map<String, Value>,
}

impl PoseStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PlaybackError::StoreLoad {
                path: path.display().to_string(),
                reason: "file does not exist".to_string(),
            });
        }
        let raw = fs::read_to_string(path).map_err(|e| PlaybackError::StoreLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let store = Self::from_json_str(&raw).map_err(|e| match e {
            PlaybackError::StoreLoad { reason, .. } => PlaybackError::StoreLoad {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;
        tracing::debug!("loaded {} recorded poses from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw).map_err(|e| PlaybackError::StoreLoad {
            path: "<inline>".to_string(),
            reason: format!("invalid JSON: {e}"),
        })?;
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(PlaybackError::StoreLoad {
                path: "<inline>".to_string(),
                reason: format!("expected a JSON object, got {}", json_kind(&other)),
            }),
        }
    }

    pub fn insert(&mut self, label: impl Into<String>, angles: &[f64], unit: AngleUnit) {
        let entry = serde_json::json!({ "angles": angles, "unit": unit.as_str() });
        self.entries.insert(label.into(), entry);
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All labels, sorted.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.entries.keys().cloned().collect();
        labels.sort();
        labels
    }

    /// Fetch and validate the pose recorded under `label`.
    pub fn pose(&self, label: &str) -> Result<Pose> {
        let entry = self
            .entries
            .get(label)
            .ok_or_else(|| PlaybackError::NotFound(label.to_string()))?;
        let fields = entry.as_object().ok_or_else(|| {
            PlaybackError::InvalidPayload(format!(
                "pose '{label}' has invalid data type {}",
                json_kind(entry)
            ))
        })?;
        let angles = crate::units::angles_from_value(fields.get("angles")).map_err(|e| match e {
            PlaybackError::InvalidPayload(msg) => {
                PlaybackError::InvalidPayload(format!("pose '{label}': {msg}"))
            }
            other => other,
        })?;
        let unit = match fields.get("unit") {
            None | Some(Value::Null) => None,
            Some(Value::String(unit)) => Some(unit.as_str()),
            Some(other) => {
                return Err(PlaybackError::InvalidPayload(format!(
                    "pose '{label}' has a {} unit, expected a string",
                    json_kind(other)
                )))
            }
        };
        let unit = AngleUnit::parse(unit)?;
        Ok(Pose::new(label, angles, unit))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "h": {"angles": [0, 0, 0], "unit": "degrees"},
        "i": {"angles": [90, 45, 0]},
        "yes": {"angles": [0.1, 0.2, 0.3], "unit": "rad"},
        "grip": {"angles": [2048, 1024, 512], "unit": "motor_units"},
        "broken": {"angles": "nope"},
        "odd": [1, 2, 3]
    }"#;

    #[test]
    fn test_parse_and_fetch() {
        let store = PoseStore::from_json_str(SAMPLE).unwrap();
        assert_eq!(store.len(), 6);
        assert!(store.contains("yes"));

        let pose = store.pose("i").unwrap();
        assert_eq!(pose.label(), "i");
        assert_eq!(pose.angles(), &[90.0, 45.0, 0.0]);
        assert_eq!(pose.unit(), AngleUnit::Degrees);

        assert_eq!(store.pose("grip").unwrap().unit(), AngleUnit::MotorUnits);
    }

    #[test]
    fn test_labels_sorted() {
        let store = PoseStore::from_json_str(SAMPLE).unwrap();
        assert_eq!(
            store.labels(),
            vec!["broken", "grip", "h", "i", "odd", "yes"]
        );
    }

    #[test]
    fn test_malformed_entries_fail_on_access_only() {
        let store = PoseStore::from_json_str(SAMPLE).unwrap();
        assert!(matches!(
            store.pose("broken"),
            Err(PlaybackError::InvalidPayload(_))
        ));
        assert!(matches!(
            store.pose("odd"),
            Err(PlaybackError::InvalidPayload(_))
        ));
        assert!(matches!(
            store.pose("missing"),
            Err(PlaybackError::NotFound(_))
        ));
    }

    #[test]
    fn test_unknown_unit_in_entry() {
        let store = PoseStore::from_json_str(r#"{"z": {"angles": [1], "unit": "turns"}}"#).unwrap();
        assert!(matches!(
            store.pose("z"),
            Err(PlaybackError::UnsupportedUnit(_))
        ));
    }

    #[test]
    fn test_non_string_unit_rejected() {
        let store = PoseStore::from_json_str(
            r#"{"n": {"angles": [1], "unit": 5}, "b": {"angles": [1], "unit": true}, "z": {"angles": [1], "unit": null}}"#,
        )
        .unwrap();
        assert!(matches!(store.pose("n"), Err(PlaybackError::InvalidPayload(_))));
        assert!(matches!(store.pose("b"), Err(PlaybackError::InvalidPayload(_))));
        assert_eq!(store.pose("z").unwrap().unit(), AngleUnit::Degrees);
    }

    #[test]
    fn test_top_level_must_be_object() {
        assert!(matches!(
            PoseStore::from_json_str("[1, 2]"),
            Err(PlaybackError::StoreLoad { .. })
        ));
        assert!(matches!(
            PoseStore::from_json_str("{not json"),
            Err(PlaybackError::StoreLoad { .. })
        ));
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(SAMPLE.as_bytes())?;
        let store = PoseStore::load(file.path())?;
        assert_eq!(store.len(), 6);
        Ok(())
    }

    #[test]
    fn test_load_missing_file_names_path() {
        match PoseStore::load("/definitely/not/here.json") {
            Err(PlaybackError::StoreLoad { path, .. }) => {
                assert_eq!(path, "/definitely/not/here.json")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_insert_round_trips_through_pose() {
        let mut store = PoseStore::default();
        store.insert("a", &[1.0, 2.0], AngleUnit::Rad);
        let pose = store.pose("a").unwrap();
        assert_eq!(pose.angles(), &[1.0, 2.0]);
        assert_eq!(pose.unit(), AngleUnit::Rad);
    }
}
