use serde::Serialize;
use serde_json::Value;

/// Snapshot keys whose changes are surfaced as signals. Every other key in
/// the document (name, domain, country) is ignored by [`diff`].
pub const MEANINGFUL_KEYS: [&str; 5] = [
    "employees",
    "industries",
    "funding",
    "funding_stage",
    "headline",
];

/// One meaningful key whose value differs between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    pub key: String,
    pub old: Value,
    pub new: Value,
}

impl Change {
    pub fn new(key: impl Into<String>, old: Value, new: Value) -> Self {
        Self {
            key: key.into(),
            old,
            new,
        }
    }

    /// Structured details stored alongside the derived signal.
    pub fn details(&self) -> Value {
        serde_json::json!({
            "key": self.key,
            "old": self.old,
            "new": self.new,
        })
    }
}

/// Compares two snapshot documents on [`MEANINGFUL_KEYS`].
///
/// Without a previous snapshot nothing is emitted: the first capture only
/// establishes the baseline. A key missing from a document counts as
/// `null`.
///
/// ```
/// use rivalwatch_signals::diff::diff;
/// use serde_json::json;
///
/// let a = json!({"employees": 100, "country": "NL"});
/// let b = json!({"employees": 150, "country": "DE"});
/// let changes = diff(Some(&a), &b);
/// assert_eq!(changes.len(), 1);
/// assert_eq!(changes[0].key, "employees");
/// assert!(diff(None, &b).is_empty());
/// ```
pub fn diff(previous: Option<&Value>, current: &Value) -> Vec<Change> {
    let Some(previous) = previous else {
        return Vec::new();
    };

    MEANINGFUL_KEYS
        .iter()
        .filter_map(|key| {
            let old = previous.get(key).cloned().unwrap_or(Value::Null);
            let new = current.get(key).cloned().unwrap_or(Value::Null);
            (old != new).then(|| Change::new(*key, old, new))
        })
        .collect()
}
