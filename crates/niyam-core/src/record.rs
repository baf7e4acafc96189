use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Placeholder rendered for any absent leaf.
pub const NOT_AVAILABLE: &str = "N/A";

/// Title used when the record carries none.
pub const DEFAULT_CASE_TITLE: &str = "Consumer Case";

/// One legal case as a JSON object tree.
///
/// Sections (`Case_Summary`, `Legal_Grounds`, `Judgment_Reasoning`,
/// `Relief_Granted`, `Simulation_Metadata`) and every leaf inside them may be
/// absent. Reads never create nodes; [`CaseRecord::set`] creates missing
/// intermediate objects on the way down.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CaseRecord(Value);

impl Default for CaseRecord {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl CaseRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a parsed document. The root must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            bail!("case record must be a JSON object, got {}", kind(&value));
        }
        Ok(Self(value))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading case file {}", path.display()))?;
        let value: Value = serde_json::from_str(&data)
            .with_context(|| format!("parsing case file {}", path.display()))?;
        Self::from_value(value).with_context(|| format!("loading {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.0)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Look up a dotted path. Numeric segments index into arrays.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.0;
        for key in path.split('.') {
            current = match current {
                Value::Object(map) => map.get(key)?,
                Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Render the leaf at `path`, or [`NOT_AVAILABLE`] when absent.
    pub fn text(&self, path: &str) -> String {
        render(self.get(path))
    }

    /// Elements of the array at `path`; empty when absent or not an array.
    pub fn items(&self, path: &str) -> &[Value] {
        match self.get(path) {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }

    pub fn title(&self) -> String {
        match self.get("Case_Summary.Title") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            _ => DEFAULT_CASE_TITLE.to_string(),
        }
    }

    /// Overwrite the value at a dotted path, creating missing intermediate
    /// objects. Returns the previous value, if any.
    ///
    /// Null intermediates are replaced by empty objects. Scalars in the way,
    /// out-of-range array indices, and empty segments are rejected without
    /// touching the tree.
    pub fn set(&mut self, path: &str, value: Value) -> Result<Option<Value>> {
        let keys: Vec<&str> = path.split('.').collect();
        if keys.iter().any(|k| k.is_empty()) {
            bail!("empty segment in field path '{path}'");
        }
        let Some((last, parents)) = keys.split_last() else {
            bail!("empty field path");
        };

        set_in(&mut self.0, parents, last, value, path)
    }
}

// Failures can only happen while walking nodes that already exist, so a
// rejected path never leaves freshly created containers behind.
fn set_in(
    node: &mut Value,
    parents: &[&str],
    last: &str,
    value: Value,
    path: &str,
) -> Result<Option<Value>> {
    if node.is_null() {
        *node = Value::Object(Map::new());
    }
    let Some((key, rest)) = parents.split_first() else {
        return match node {
            Value::Object(map) => Ok(map.insert(last.to_string(), value)),
            Value::Array(items) => {
                let slot = index_mut(items, last, path)?;
                Ok(Some(std::mem::replace(slot, value)))
            },
            other => bail!("cannot set '{path}': parent is {}", kind(other)),
        };
    };
    let child = match node {
        Value::Object(map) => map
            .entry((*key).to_string())
            .or_insert_with(|| Value::Object(Map::new())),
        Value::Array(items) => index_mut(items, key, path)?,
        other => bail!("cannot descend into {} at '{key}' in '{path}'", kind(other)),
    };
    set_in(child, rest, last, value, path)
}

fn index_mut<'a>(items: &'a mut [Value], key: &str, path: &str) -> Result<&'a mut Value> {
    key.parse::<usize>()
        .ok()
        .and_then(|i| items.get_mut(i))
        .with_context(|| format!("index '{key}' out of range in '{path}'"))
}

/// Render a leaf for prompts and console output.
pub fn render(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(items)) if items.is_empty() => NOT_AVAILABLE.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| render(Some(v)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(v @ Value::Object(_)) => v.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> CaseRecord {
        CaseRecord::from_value(json!({
            "Case_Summary": {"Title": "Sharma v. PhoneMart", "Facts_of_Case": ["bought phone"]},
            "Relief_Granted": {"Primary_Relief": {"Type": "Refund", "Amount": 5000}},
            "Judgment_Reasoning": {"Issues_Framed": [{"Issue_Number": 1, "Finding": null}]}
        }))
        .unwrap()
    }

    #[test]
    fn rejects_non_object_root() {
        assert!(CaseRecord::from_value(json!([1, 2])).is_err());
        assert!(CaseRecord::from_value(json!("x")).is_err());
    }

    #[test]
    fn get_walks_objects_and_arrays() {
        let r = sample();
        assert_eq!(r.get("Relief_Granted.Primary_Relief.Amount"), Some(&json!(5000)));
        assert_eq!(r.get("Judgment_Reasoning.Issues_Framed.0.Issue_Number"), Some(&json!(1)));
        assert!(r.get("Judgment_Reasoning.Issues_Framed.3").is_none());
        assert!(r.get("Nope.Deeper").is_none());
    }

    #[test]
    fn reads_do_not_create_containers() {
        let r = sample();
        let before = r.clone();
        let _ = r.text("Legal_Grounds.Applicable_Sections");
        let _ = r.items("Simulation_Metadata.Critical_Moments");
        assert_eq!(r, before);
        assert!(r.get("Legal_Grounds").is_none());
    }

    #[test]
    fn text_renders_placeholders() {
        let r = sample();
        assert_eq!(r.text("Case_Summary.Case_Type"), NOT_AVAILABLE);
        assert_eq!(r.text("Judgment_Reasoning.Issues_Framed.0.Finding"), NOT_AVAILABLE);
        assert_eq!(r.text("Relief_Granted.Primary_Relief.Amount"), "5000");
        assert_eq!(r.text("Case_Summary.Facts_of_Case"), "bought phone");
    }

    #[test]
    fn title_falls_back_to_default() {
        assert_eq!(sample().title(), "Sharma v. PhoneMart");
        assert_eq!(CaseRecord::new().title(), DEFAULT_CASE_TITLE);
    }

    #[test]
    fn set_creates_intermediates() {
        let mut r = CaseRecord::new();
        let prev = r.set("A.B.C", json!("x")).unwrap();
        assert!(prev.is_none());
        assert_eq!(r.as_value(), &json!({"A": {"B": {"C": "x"}}}));
    }

    #[test]
    fn set_returns_previous_value() {
        let mut r = sample();
        let prev = r.set("Relief_Granted.Primary_Relief.Amount", json!(7500)).unwrap();
        assert_eq!(prev, Some(json!(5000)));
        assert_eq!(r.get("Relief_Granted.Primary_Relief.Amount"), Some(&json!(7500)));
    }

    #[test]
    fn set_replaces_null_intermediate() {
        let mut r = CaseRecord::from_value(json!({"A": null})).unwrap();
        r.set("A.B", json!(1)).unwrap();
        assert_eq!(r.as_value(), &json!({"A": {"B": 1}}));
    }

    #[test]
    fn set_indexes_existing_array_elements() {
        let mut r = sample();
        r.set("Judgment_Reasoning.Issues_Framed.0.Finding", json!("deficiency proved"))
            .unwrap();
        assert_eq!(
            r.text("Judgment_Reasoning.Issues_Framed.0.Finding"),
            "deficiency proved"
        );
    }

    #[test]
    fn set_rejects_scalar_in_path_without_mutating() {
        let mut r = sample();
        let before = r.clone();
        assert!(r.set("Case_Summary.Title.Sub", json!(1)).is_err());
        assert!(r.set("Judgment_Reasoning.Issues_Framed.9.Finding", json!(1)).is_err());
        assert_eq!(r, before);
    }

    #[test]
    fn set_rejects_empty_segments() {
        let mut r = CaseRecord::new();
        assert!(r.set("", json!(1)).is_err());
        assert!(r.set("A..B", json!(1)).is_err());
        assert_eq!(r, CaseRecord::new());
    }

    #[test]
    fn clone_is_independent() {
        let mut live = sample();
        let original = live.clone();
        live.set("Relief_Granted.Primary_Relief.Amount", json!(1)).unwrap();
        live.set("Case_Summary.Facts_of_Case.0", json!("changed")).unwrap();
        assert_eq!(original.text("Relief_Granted.Primary_Relief.Amount"), "5000");
        assert_eq!(original.text("Case_Summary.Facts_of_Case.0"), "bought phone");
    }

    #[test]
    fn load_and_save_round_trip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.json");
        sample().save(&path).unwrap();
        let loaded = CaseRecord::load(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn load_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(CaseRecord::load(&path).is_err());
    }
}
