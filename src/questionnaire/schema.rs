use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Declarative description of one questionnaire field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldSchema {
    Range {
        min: f64,
        max: f64,
        default: f64,
    },
    Choice {
        choices: Vec<String>,
        #[serde(default)]
        default: Option<String>,
    },
    MultiSelect {
        choices: Vec<String>,
        #[serde(default)]
        default: Vec<String>,
    },
    Boolean {
        #[serde(default)]
        default: bool,
    },
    Color {
        #[serde(default)]
        default: Option<String>,
    },
}

impl FieldSchema {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Range { .. } => "range",
            Self::Choice { .. } => "choice",
            Self::MultiSelect { .. } => "multiSelect",
            Self::Boolean { .. } => "boolean",
            Self::Color { .. } => "color",
        }
    }

    fn validate(&self, field: &str) -> Result<(), LoadError> {
        match self {
            Self::Range { min, max, default } => {
                if !min.is_finite() || !max.is_finite() || !default.is_finite() {
                    return Err(LoadError::InvalidField {
                        field: field.to_string(),
                        message: "range bounds and default must be finite".to_string(),
                    });
                }
                if min > max {
                    return Err(LoadError::InvalidField {
                        field: field.to_string(),
                        message: format!("min ({min}) must be <= max ({max})"),
                    });
                }
                Ok(())
            }
            Self::Choice { choices, .. } | Self::MultiSelect { choices, .. } => {
                if choices.is_empty() {
                    return Err(LoadError::InvalidField {
                        field: field.to_string(),
                        message: "choice list must not be empty".to_string(),
                    });
                }
                Ok(())
            }
            Self::Boolean { .. } | Self::Color { .. } => Ok(()),
        }
    }
}

/// Field name -> field schema. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: BTreeMap<String, FieldSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: &str, field: FieldSchema) -> Self {
        self.fields.insert(name.to_string(), field);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// The built-in onboarding questionnaire.
    pub fn onboarding() -> Self {
        fn list(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        Self::new()
            .with_field(
                "intent",
                FieldSchema::Choice {
                    choices: list(&["Exploration", "Focus", "Restoration", "Play", "Creation"]),
                    default: None,
                },
            )
            .with_field(
                "rhythm",
                FieldSchema::MultiSelect {
                    choices: list(&[
                        "Early mornings",
                        "Deep work",
                        "Long walks",
                        "Late nights",
                        "Social evenings",
                        "Weekend trips",
                    ]),
                    default: Vec::new(),
                },
            )
            .with_field(
                "textures",
                FieldSchema::MultiSelect {
                    choices: list(&[
                        "Silk", "Linen", "Stone", "Moss", "Glass", "Smoke", "Sand", "Metal",
                    ]),
                    default: Vec::new(),
                },
            )
            .with_field(
                "motion",
                FieldSchema::MultiSelect {
                    choices: list(&[
                        "Ocean waves",
                        "Drifting clouds",
                        "Flickering fire",
                        "Falling rain",
                        "Spinning galaxies",
                        "Heartbeat",
                    ]),
                    default: Vec::new(),
                },
            )
            .with_field(
                "colors",
                FieldSchema::MultiSelect {
                    choices: list(&[
                        "Ocean", "Ember", "Forest", "Dusk", "Citrus", "Lavender", "Rose", "Slate",
                        "Gold", "Mint",
                    ]),
                    default: Vec::new(),
                },
            )
            .with_field(
                "tempo",
                FieldSchema::Range {
                    min: 0.0,
                    max: 10.0,
                    default: 5.0,
                },
            )
            .with_field(
                "detail",
                FieldSchema::Range {
                    min: 0.0,
                    max: 10.0,
                    default: 5.0,
                },
            )
            .with_field("night_owl", FieldSchema::Boolean { default: false })
            .with_field("accent", FieldSchema::Color { default: None })
    }

    pub fn parse_json(text: &str) -> Result<Self, LoadError> {
        let schema: Self =
            serde_json::from_str(text).map_err(|e| LoadError::Parse(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let text =
            std::fs::read_to_string(path.as_ref()).map_err(|e| LoadError::Io(e.to_string()))?;
        Self::parse_json(&text)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        for (name, field) in &self.fields {
            field.validate(name)?;
        }
        Ok(())
    }
}

/// One raw questionnaire answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl AnswerValue {
    /// Convert a loose JSON value. Lists keep their string items only. `None` when no variant fits.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Array(items) => Some(Self::List(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            )),
            Value::Null | Value::Object(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::List(_) => "list",
        }
    }
}

impl From<bool> for AnswerValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for AnswerValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for AnswerValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&[&str]> for AnswerValue {
    fn from(v: &[&str]) -> Self {
        Self::List(v.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for AnswerValue {
    fn from(v: [&str; N]) -> Self {
        Self::List(v.iter().map(|s| s.to_string()).collect())
    }
}

/// Field name -> raw answer, supplied once per session. Keys iterate in sorted order.
///
/// Deserializing never rejects a single answer: values that fit no [`AnswerValue`] are dropped
/// with a warning and the field falls back to its schema default downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<String, AnswerValue>);

impl<'de> Deserialize<'de> for AnswerMap {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self::from_json_map(raw))
    }
}

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<AnswerValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<AnswerValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&AnswerValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Sorted-key JSON form used as the fallback seed source.
    pub fn canonical_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }

    pub fn from_json_map(raw: BTreeMap<String, serde_json::Value>) -> Self {
        let mut map = BTreeMap::new();
        for (field, value) in raw {
            match AnswerValue::from_json(&value) {
                Some(answer) => {
                    if let (Some(items), AnswerValue::List(kept)) = (value.as_array(), &answer) {
                        if kept.len() != items.len() {
                            tracing::warn!(
                                field = %field,
                                dropped = items.len() - kept.len(),
                                "non-string list items dropped"
                            );
                        }
                    }
                    map.insert(field, answer);
                }
                None => {
                    tracing::warn!(field = %field, raw = %value, "unusable answer value dropped");
                }
            }
        }
        Self(map)
    }

    pub fn parse_json(text: &str) -> Result<Self, LoadError> {
        serde_json::from_str(text).map_err(|e| LoadError::Parse(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let text =
            std::fs::read_to_string(path.as_ref()).map_err(|e| LoadError::Io(e.to_string()))?;
        Self::parse_json(&text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    Io(String),
    Parse(String),
    InvalidField { field: String, message: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::InvalidField { field, message } => {
                write!(f, "invalid field '{field}': {message}")
            }
        }
    }
}

impl std::error::Error for LoadError {}
