use serde::{Deserialize, Serialize};

/// Semantic field type with its type-specific constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    Number {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default)]
        no_decimal: bool,
    },
    Bool,
    Text {
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
        #[serde(default)]
        pattern: Option<String>,
    },
    /// JSON document, bounded by a maximum encoded size in bytes.
    Json { max_size: usize },
    /// Timestamp with optional inclusive bounds (unset = unbounded).
    Date {
        #[serde(default)]
        min: Option<String>,
        #[serde(default)]
        max: Option<String>,
    },
}

impl FieldType {
    pub fn number() -> Self {
        FieldType::Number {
            min: None,
            max: None,
            no_decimal: false,
        }
    }

    pub fn text() -> Self {
        FieldType::Text {
            min: None,
            max: None,
            pattern: None,
        }
    }

    pub fn json(max_size: usize) -> Self {
        FieldType::Json { max_size }
    }

    pub fn date() -> Self {
        FieldType::Date {
            min: None,
            max: None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldType::Number { .. } => "number",
            FieldType::Bool => "bool",
            FieldType::Text { .. } => "text",
            FieldType::Json { .. } => "json",
            FieldType::Date { .. } => "date",
        }
    }
}
