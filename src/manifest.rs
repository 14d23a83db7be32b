use crate::error::{Result, VoicegenError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;

/// Category name -> generated file names, both in the order they were produced.
///
/// Relies on serde_json's `preserve_order` so keys come out in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Manifest(Map<String, Value>);

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure `category` has an entry, even if nothing ends up in it.
    pub fn touch(&mut self, category: &str) {
        self.entry(category);
    }

    pub fn record(&mut self, category: &str, file_name: &str) {
        if let Value::Array(files) = self.entry(category) {
            files.push(Value::from(file_name));
        }
    }

    fn entry(&mut self, category: &str) -> &mut Value {
        self.0
            .entry(category)
            .or_insert_with(|| Value::Array(Vec::new()))
    }

    pub fn files(&self, category: &str) -> Option<Vec<&str>> {
        let files = self.0.get(category)?.as_array()?;
        Some(files.iter().filter_map(Value::as_str).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| VoicegenError::io(path, e.into()))?;
        std::fs::write(path, json).map_err(|e| VoicegenError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_and_lengths_follow_input_order() {
        let mut manifest = Manifest::new();
        manifest.record("WIN_BIG", "WIN_BIG_0.wav");
        manifest.record("DEFENSE", "DEFENSE_0.wav");
        manifest.record("DEFENSE", "DEFENSE_1.wav");

        let json = serde_json::to_string_pretty(&manifest).unwrap();
        assert!(json.find("WIN_BIG").unwrap() < json.find("DEFENSE").unwrap());

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["WIN_BIG"], serde_json::json!(["WIN_BIG_0.wav"]));
        assert_eq!(
            obj["DEFENSE"],
            serde_json::json!(["DEFENSE_0.wav", "DEFENSE_1.wav"])
        );
    }

    #[test]
    fn test_later_keys_do_not_reorder() {
        let mut manifest = Manifest::new();
        for category in ["Z", "A", "M"] {
            manifest.touch(category);
        }
        manifest.record("A", "A_0.wav");

        assert_eq!(
            serde_json::to_string(&manifest).unwrap(),
            r#"{"Z":[],"A":["A_0.wav"],"M":[]}"#
        );
    }

    #[test]
    fn test_touched_category_serializes_empty() {
        let mut manifest = Manifest::new();
        manifest.touch("GAME_WIN");

        assert_eq!(manifest.files("GAME_WIN"), Some(vec![]));
        assert_eq!(manifest.files("DEFENSE"), None);
        assert_eq!(serde_json::to_string(&manifest).unwrap(), r#"{"GAME_WIN":[]}"#);
    }

    #[test]
    fn test_write_keeps_japanese_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        let mut manifest = Manifest::new();
        manifest.record("ずんだ", "ずんだ_0.wav");

        manifest.write(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("ずんだ_0.wav"));
    }
}
