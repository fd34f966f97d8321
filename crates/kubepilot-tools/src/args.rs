//! Args - Typed argument schemas for free-text tool input
//!
//! Planners hand tools a single line of text. A tool declares an ordered list of
//! named fields and the schema turns that line into typed values before the tool
//! runs. Two input shapes are accepted:
//!
//! - comma separated values, one per field, where the last field takes the remainder
//!   of the line (commas included)
//! - a JSON object keyed by field name
//!
//! Anything else is rejected with a message that names the expected fields, which the
//! dispatch loop feeds back to the model as an observation.

use crate::error::{Error, Result};
use serde::Serialize;

/// How a field's raw text is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    /// Free text, trimmed
    Text,
    /// An identifier (namespace, branch, resource type); all whitespace removed
    Name,
    /// A signed integer id
    Integer,
}

/// One named field of a schema
#[derive(Debug, Clone, Serialize)]
pub struct ArgField {
    /// Field name, as shown to the model
    pub name: String,
    /// Interpretation of the raw text
    pub kind: ArgKind,
    /// Short usage hint
    pub description: String,
}

/// A parsed field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// Text or name value
    Text(String),
    /// Integer value
    Integer(i64),
}

/// Ordered list of typed, named fields
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArgSchema {
    fields: Vec<ArgField>,
}

/// Values produced by [`ArgSchema::parse`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    values: Vec<(String, ArgValue)>,
}

const NO_INPUT: &[&str] = &["", "none", "null"];

impl ArgSchema {
    /// A schema that takes no input; whatever the model sends is ignored
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a free-text field
    #[must_use]
    pub fn text(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.field(name, ArgKind::Text, description)
    }

    /// Add an identifier field
    #[must_use]
    pub fn name(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.field(name, ArgKind::Name, description)
    }

    /// Add an integer field
    #[must_use]
    pub fn integer(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.field(name, ArgKind::Integer, description)
    }

    /// Add a field of the given kind
    #[must_use]
    pub fn field(
        mut self,
        name: impl Into<String>,
        kind: ArgKind,
        description: impl Into<String>,
    ) -> Self {
        self.fields.push(ArgField {
            name: name.into(),
            kind,
            description: description.into(),
        });
        self
    }

    /// Declared fields, in order
    #[must_use]
    pub fn fields(&self) -> &[ArgField] {
        &self.fields
    }

    /// Whether the schema takes no input
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Input format line appended to the tool description in prompts
    #[must_use]
    pub fn hint(&self) -> String {
        match self.fields.as_slice() {
            [] => "Input is ignored, use None.".to_string(),
            [only] => format!("Input should be {}.", only.description),
            fields => format!(
                "Input should be a comma separated list of {}.",
                fields
                    .iter()
                    .map(|f| f.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    fn expected(&self) -> String {
        self.fields
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parse raw tool input
    pub fn parse(&self, input: &str) -> Result<ParsedArgs> {
        if self.fields.is_empty() {
            return Ok(ParsedArgs::default());
        }

        let trimmed = strip_quotes(input.trim());
        if NO_INPUT.contains(&trimmed.to_lowercase().as_str()) {
            return Err(Error::InvalidInput(format!(
                "expected {} but got no input",
                self.expected()
            )));
        }

        if trimmed.starts_with('{') {
            if let Ok(serde_json::Value::Object(map)) =
                serde_json::from_str::<serde_json::Value>(trimmed)
            {
                if self.fields.iter().any(|f| map.contains_key(&f.name)) {
                    return self.parse_object(&map);
                }
            }
        }

        let raw: Vec<&str> = if self.fields.len() == 1 {
            vec![trimmed]
        } else {
            trimmed.splitn(self.fields.len(), ',').collect()
        };

        if raw.len() != self.fields.len() {
            return Err(Error::InvalidInput(format!(
                "expected {} comma separated values ({}) but got {}",
                self.fields.len(),
                self.expected(),
                raw.len()
            )));
        }

        let mut values = Vec::with_capacity(self.fields.len());
        for (field, raw) in self.fields.iter().zip(raw) {
            values.push((field.name.clone(), convert(field, raw)?));
        }
        Ok(ParsedArgs { values })
    }

    fn parse_object(&self, map: &serde_json::Map<String, serde_json::Value>) -> Result<ParsedArgs> {
        let mut values = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let raw = match map.get(&field.name) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Number(n)) => n.to_string(),
                Some(serde_json::Value::Bool(b)) => b.to_string(),
                Some(_) | None => {
                    return Err(Error::InvalidInput(format!(
                        "missing field `{}` (expected {})",
                        field.name,
                        self.expected()
                    )))
                }
            };
            values.push((field.name.clone(), convert(field, &raw)?));
        }
        Ok(ParsedArgs { values })
    }
}

fn strip_quotes(s: &str) -> &str {
    for quote in ['"', '\'', '`'] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return s[1..s.len() - 1].trim();
        }
    }
    s
}

/// Quotes around one comma separated value: a matched pair, or a stray quote
/// left at either end when each value was quoted separately
fn trim_field_quotes(s: &str) -> &str {
    let s = s.trim();
    for quote in ['"', '\'', '`'] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return s[1..s.len() - 1].trim();
        }
        if s.matches(quote).count() % 2 == 1 {
            if let Some(rest) = s.strip_prefix(quote) {
                return rest.trim();
            }
            if let Some(rest) = s.strip_suffix(quote) {
                return rest.trim();
            }
        }
    }
    s
}

fn convert(field: &ArgField, raw: &str) -> Result<ArgValue> {
    let value = trim_field_quotes(raw);
    match field.kind {
        ArgKind::Text => Ok(ArgValue::Text(value.to_string())),
        ArgKind::Name => {
            let name: String = value.chars().filter(|c| !c.is_whitespace()).collect();
            if name.is_empty() {
                return Err(Error::InvalidInput(format!(
                    "`{}` must not be empty",
                    field.name
                )));
            }
            Ok(ArgValue::Text(name))
        }
        ArgKind::Integer => value
            .trim_start_matches('#')
            .parse::<i64>()
            .map(ArgValue::Integer)
            .map_err(|_| {
                Error::InvalidInput(format!(
                    "`{}` must be an integer, got '{}'",
                    field.name, value
                ))
            }),
    }
}

impl ParsedArgs {
    /// Build from explicit pairs
    #[must_use]
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, ArgValue)>,
        K: Into<String>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    fn value(&self, name: &str) -> Result<&ArgValue> {
        self.values
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
            .ok_or_else(|| Error::InvalidInput(format!("missing field `{}`", name)))
    }

    /// Text value of a field
    pub fn str(&self, name: &str) -> Result<&str> {
        match self.value(name)? {
            ArgValue::Text(s) => Ok(s),
            ArgValue::Integer(_) => Err(Error::InvalidInput(format!(
                "`{}` is an integer, not text",
                name
            ))),
        }
    }

    /// Integer value of a field
    pub fn int(&self, name: &str) -> Result<i64> {
        match self.value(name)? {
            ArgValue::Integer(i) => Ok(*i),
            ArgValue::Text(s) => Err(Error::InvalidInput(format!(
                "`{}` must be an integer, got '{}'",
                name, s
            ))),
        }
    }

    /// Number of parsed values
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was parsed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pod_schema() -> ArgSchema {
        ArgSchema::none()
            .name("namespace", "the namespace")
            .name("pod_prefix", "the start of the pod name")
    }

    #[test]
    fn test_comma_separated() {
        let args = pod_schema().parse("test-bed, review-3").unwrap();
        assert_eq!(args.str("namespace").unwrap(), "test-bed");
        assert_eq!(args.str("pod_prefix").unwrap(), "review-3");
    }

    #[test]
    fn test_name_strips_inner_whitespace() {
        let args = pod_schema().parse("test bed,review 3").unwrap();
        assert_eq!(args.str("namespace").unwrap(), "testbed");
        assert_eq!(args.str("pod_prefix").unwrap(), "review3");
    }

    #[test]
    fn test_quoted_input() {
        let args = pod_schema().parse("\"default, 'web'\"").unwrap();
        assert_eq!(args.str("namespace").unwrap(), "default");
        assert_eq!(args.str("pod_prefix").unwrap(), "web");
    }

    #[test]
    fn test_each_value_quoted() {
        // The dispatch parser has already trimmed the outer quotes here
        let args = pod_schema().parse("test-bed\", \"review-3").unwrap();
        assert_eq!(args.str("namespace").unwrap(), "test-bed");
        assert_eq!(args.str("pod_prefix").unwrap(), "review-3");

        for input in [r#""test-bed", "review-3""#, "'test-bed','review-3'", "`test-bed`, review-3"] {
            let args = pod_schema().parse(input).unwrap();
            assert_eq!(args.str("namespace").unwrap(), "test-bed", "{input}");
            assert_eq!(args.str("pod_prefix").unwrap(), "review-3", "{input}");
        }
    }

    #[test]
    fn test_last_field_takes_remainder() {
        let schema = ArgSchema::none()
            .text("repository_path", "local path")
            .text("file_path", "file")
            .text("content", "file content");
        let args = schema.parse("repos/a/b, README.md, hello, world").unwrap();
        assert_eq!(args.str("content").unwrap(), "hello, world");

        let args = schema.parse("repos/a/b, hi.sh, echo \"hi\"").unwrap();
        assert_eq!(args.str("content").unwrap(), "echo \"hi\"");
    }

    #[test]
    fn test_wrong_count_names_fields() {
        let err = pod_schema().parse("default").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("namespace, pod_prefix"));
        assert!(msg.contains("got 1"));
    }

    #[test]
    fn test_no_input() {
        assert!(pod_schema().parse("None").is_err());
        assert!(pod_schema().parse("  ").is_err());
        assert!(ArgSchema::none().parse("None").unwrap().is_empty());
        assert!(ArgSchema::none().parse("anything at all").unwrap().is_empty());

        let note = ArgSchema::none().text("note", "a note");
        assert_eq!(note.parse("n/a").unwrap().str("note").unwrap(), "n/a");
    }

    #[test]
    fn test_integer_fields() {
        let schema = ArgSchema::none()
            .integer("project_id", "project")
            .integer("issue_id", "issue");
        let args = schema.parse("12, #7").unwrap();
        assert_eq!(args.int("project_id").unwrap(), 12);
        assert_eq!(args.int("issue_id").unwrap(), 7);

        let err = schema.parse("12, seven").unwrap_err();
        assert!(err.to_string().contains("`issue_id` must be an integer"));
    }

    #[test]
    fn test_json_object_input() {
        let args = pod_schema()
            .parse(r#"{"namespace": "kube-system", "pod_prefix": "coredns"}"#)
            .unwrap();
        assert_eq!(args.str("namespace").unwrap(), "kube-system");

        let err = pod_schema().parse(r#"{"namespace": "x"}"#).unwrap_err();
        assert!(err.to_string().contains("missing field `pod_prefix`"));
    }

    #[test]
    fn test_single_field_keeps_commas() {
        let schema = ArgSchema::none().text("message", "the message to send");
        let args = schema.parse("done, deployed, verified").unwrap();
        assert_eq!(args.str("message").unwrap(), "done, deployed, verified");
    }

    #[test]
    fn test_hint() {
        assert_eq!(
            pod_schema().hint(),
            "Input should be a comma separated list of namespace, pod_prefix."
        );
        assert_eq!(ArgSchema::none().hint(), "Input is ignored, use None.");
        assert_eq!(
            ArgSchema::none().text("q", "a question").hint(),
            "Input should be a question."
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(pod_schema().parse("default, ").is_err());
    }
}
