use serde::{Deserialize, Serialize};
use std::fmt;

/// Source languages the detector has a scanner for.
///
/// Judge0 exposes several compiler/runtime versions per language, so more than
/// one sandbox language id maps onto the same variant.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Cpp,
    Java,
    Python,
    JavaScript,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::C,
        Language::Cpp,
        Language::Java,
        Language::Python,
        Language::JavaScript,
    ];

    pub fn from_judge0_id(id: u32) -> Option<Self> {
        match id {
            48 | 49 | 50 | 75 | 103 | 104 | 110 => Some(Language::C),
            52 | 53 | 54 | 76 | 105 => Some(Language::Cpp),
            62 | 91 => Some(Language::Java),
            70 | 71 | 92 | 100 => Some(Language::Python),
            63 | 93 | 97 | 102 => Some(Language::JavaScript),
            _ => None,
        }
    }

    /// Sandbox id used when the caller only knows the language.
    pub fn default_judge0_id(&self) -> u32 {
        match self {
            Language::C => 50,
            Language::Cpp => 54,
            Language::Java => 62,
            Language::Python => 71,
            Language::JavaScript => 63,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "c" => Some(Language::C),
            "cpp" | "c++" | "cxx" => Some(Language::Cpp),
            "java" => Some(Language::Java),
            "python" | "python3" | "py" => Some(Language::Python),
            "javascript" | "js" | "node" => Some(Language::JavaScript),
            _ => None,
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "c" | "h" => Some(Language::C),
            "cpp" | "cc" | "cxx" | "hpp" => Some(Language::Cpp),
            "java" => Some(Language::Java),
            "py" => Some(Language::Python),
            "js" | "mjs" => Some(Language::JavaScript),
            _ => None,
        }
    }

    /// Short tag used in group ids.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Python => "python",
            Language::JavaScript => "js",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Java => "Java",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
        };
        f.write_str(name)
    }
}
