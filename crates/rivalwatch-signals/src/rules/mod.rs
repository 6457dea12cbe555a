pub mod funding;
pub mod headcount;
pub mod headline;
pub mod industries;

use serde_json::Value;

pub(crate) fn as_text(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}
