//! The closed language vocabulary.
//!
//! A [`Language`] tag is the single source of truth for both the
//! highlighting class of a snippet and its sandbox eligibility. The model's
//! detection output, the stored `language` column and the sandbox all speak
//! this vocabulary; anything outside it is rejected at the boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A supported programming-language class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    Typescript,
    Ruby,
    Java,
    C,
    Cpp,
    Csharp,
    Go,
    Rust,
    Php,
    Swift,
    Kotlin,
    Bash,
    Sql,
    Html,
    Css,
}

impl Language {
    /// Every language in the vocabulary, in declaration order.
    pub const ALL: [Language; 17] = [
        Language::Python,
        Language::Javascript,
        Language::Typescript,
        Language::Ruby,
        Language::Java,
        Language::C,
        Language::Cpp,
        Language::Csharp,
        Language::Go,
        Language::Rust,
        Language::Php,
        Language::Swift,
        Language::Kotlin,
        Language::Bash,
        Language::Sql,
        Language::Html,
        Language::Css,
    ];

    /// The canonical tag, as stored and as returned by language detection.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Ruby => "ruby",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Csharp => "csharp",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Php => "php",
            Language::Swift => "swift",
            Language::Kotlin => "kotlin",
            Language::Bash => "bash",
            Language::Sql => "sql",
            Language::Html => "html",
            Language::Css => "css",
        }
    }

    /// Whether the execution sandbox can run tests for this language.
    ///
    /// Only Python is executable; every other class is highlight-only.
    pub fn is_executable(self) -> bool {
        matches!(self, Language::Python)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = CoreError;

    /// Parses a canonical tag or a common alias, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        let language = match tag.as_str() {
            "python" | "py" | "python3" => Language::Python,
            "javascript" | "js" | "node" | "nodejs" => Language::Javascript,
            "typescript" | "ts" => Language::Typescript,
            "ruby" | "rb" => Language::Ruby,
            "java" => Language::Java,
            "c" => Language::C,
            "cpp" | "c++" | "cxx" => Language::Cpp,
            "csharp" | "c#" | "cs" => Language::Csharp,
            "go" | "golang" => Language::Go,
            "rust" | "rs" => Language::Rust,
            "php" => Language::Php,
            "swift" => Language::Swift,
            "kotlin" | "kt" => Language::Kotlin,
            "bash" | "sh" | "shell" => Language::Bash,
            "sql" => Language::Sql,
            "html" => Language::Html,
            "css" => Language::Css,
            _ => {
                return Err(CoreError::UnknownLanguage {
                    tag: s.trim().to_string(),
                })
            }
        };
        Ok(language)
    }
}
