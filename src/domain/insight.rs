// ============================================================
// INSIGHT RESULT
// ============================================================
// Validated five-field structured output from the generation
// service

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{AppError, Result};

/// Structured narrative insights for one report.
///
/// Only ever constructed through [`InsightResult::from_value`], which
/// validates the generation service's raw JSON: absent fields become empty
/// defaults, never null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightResult {
    pub summary: String,
    #[serde(default)]
    pub trends: Vec<String>,
    #[serde(default)]
    pub outliers: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl InsightResult {
    /// Validate a parsed generation response against the insight schema.
    ///
    /// Coercion policy: unknown fields are ignored; missing or null fields
    /// default to `""`/`[]`; a bare scalar where a list is expected becomes a
    /// single-element list; scalar list elements are stringified and null
    /// elements skipped; a number or bool where `summary` is expected is
    /// stringified. Arrays or objects in a scalar position, and objects
    /// inside lists, fail the whole validation.
    pub fn from_value(value: Value) -> Result<Self> {
        let obj = match value {
            Value::Object(map) => map,
            other => {
                return Err(AppError::MalformedInsight(format!(
                    "Expected a JSON object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        Ok(Self {
            summary: coerce_string(obj.get("summary"), "summary")?,
            trends: coerce_string_list(obj.get("trends"), "trends")?,
            outliers: coerce_string_list(obj.get("outliers"), "outliers")?,
            risks: coerce_string_list(obj.get("risks"), "risks")?,
            recommendations: coerce_string_list(obj.get("recommendations"), "recommendations")?,
        })
    }

    /// Condensed one-block rendering for follow-up context
    pub fn condensed(&self) -> String {
        let mut lines = Vec::new();
        if !self.summary.is_empty() {
            lines.push(format!("Summary: {}", truncate(&self.summary, 300)));
        }
        for (label, items) in [
            ("Trends", &self.trends),
            ("Outliers", &self.outliers),
            ("Risks", &self.risks),
            ("Recommendations", &self.recommendations),
        ] {
            if !items.is_empty() {
                let joined = items
                    .iter()
                    .map(|i| truncate(i, 200))
                    .collect::<Vec<_>>()
                    .join("; ");
                lines.push(format!("{}: {}", label, joined));
            }
        }
        lines.join("\n")
    }
}

fn coerce_string(value: Option<&Value>, field: &str) -> Result<String> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(AppError::MalformedInsight(format!(
            "Field '{}' must be a string, got {}",
            field,
            json_type_name(other)
        ))),
    }
}

fn coerce_string_list(value: Option<&Value>, field: &str) -> Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => out.push(s.clone()),
                    Value::Number(n) => out.push(n.to_string()),
                    Value::Bool(b) => out.push(b.to_string()),
                    Value::Null => {}
                    other => {
                        return Err(AppError::MalformedInsight(format!(
                            "Field '{}' contains a non-scalar element ({})",
                            field,
                            json_type_name(other)
                        )))
                    }
                }
            }
            Ok(out)
        }
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Number(n)) => Ok(vec![n.to_string()]),
        Some(Value::Bool(b)) => Ok(vec![b.to_string()]),
        Some(other) => Err(AppError::MalformedInsight(format!(
            "Field '{}' must be a list, got {}",
            field,
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
