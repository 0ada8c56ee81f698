use serde::{Deserialize, Serialize};

/// Type hint for one scalar value consumed by a read call.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int,
    Float,
    Double,
    Char,
    String,
    Boolean,
    Unknown,
}

impl FieldType {
    /// Maps a scanf conversion (without the leading `%`) to a type.
    ///
    /// Length modifiers are honoured: `%lf` is a double while `%f` is a float.
    pub fn from_conversion(conversion: &str) -> Self {
        let Some(last) = conversion.chars().last() else {
            return FieldType::Unknown;
        };
        let modifiers = conversion.trim_start_matches(|c: char| c.is_ascii_digit());
        let long = modifiers.starts_with('l') || modifiers.starts_with('L');
        match last {
            'd' | 'i' | 'u' | 'o' | 'x' | 'X' => FieldType::Int,
            'f' | 'e' | 'E' | 'g' | 'G' | 'a' | 'A' if long => FieldType::Double,
            'f' | 'e' | 'E' | 'g' | 'G' | 'a' | 'A' => FieldType::Float,
            'c' => FieldType::Char,
            's' | ']' => FieldType::String,
            _ => FieldType::Unknown,
        }
    }

    /// Maps a declared C/C++/Java type name to a field type.
    pub fn from_declared(type_name: &str) -> Self {
        match type_name.trim_start_matches("std::") {
            "int" | "long" | "short" | "unsigned" | "size_t" | "Integer" | "Long" | "Short"
            | "byte" | "Byte" => FieldType::Int,
            "float" | "Float" => FieldType::Float,
            "double" | "Double" => FieldType::Double,
            "char" | "Character" => FieldType::Char,
            "string" | "String" => FieldType::String,
            "bool" | "boolean" | "Boolean" => FieldType::Boolean,
            _ => FieldType::Unknown,
        }
    }

    /// Placeholder text shown in the input line while this field is pending.
    pub fn placeholder(&self) -> &'static str {
        match self {
            FieldType::Int => "<int>",
            FieldType::Float | FieldType::Double => "<number>",
            FieldType::Char => "<char>",
            FieldType::String => "<text>",
            FieldType::Boolean => "<true|false>",
            FieldType::Unknown => "<value>",
        }
    }

    /// Advisory check of a typed token. Never used to reject input.
    pub fn accepts(&self, token: &str) -> bool {
        match self {
            FieldType::Int => token.parse::<i64>().is_ok(),
            FieldType::Float | FieldType::Double => token.parse::<f64>().is_ok(),
            FieldType::Char => token.chars().count() == 1,
            FieldType::Boolean => {
                matches!(token.to_ascii_lowercase().as_str(), "true" | "false")
            }
            FieldType::String | FieldType::Unknown => true,
        }
    }
}

/// One scalar value expected by a single read call.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    #[serde(rename = "type")]
    pub kind: FieldType,
}

impl Field {
    pub fn new(kind: FieldType) -> Self {
        Self { kind }
    }
}

impl From<FieldType> for Field {
    fn from(kind: FieldType) -> Self {
        Self::new(kind)
    }
}
