use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Display language for quiz text. Scores, ids and option values do not change with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub fn key(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Ar,
            Language::Ar => Language::En,
        }
    }

    /// Picks the variant of a text pair for this language.
    pub fn pick<'a>(&self, en: &'a str, ar: &'a str) -> &'a str {
        match self {
            Language::En => en,
            Language::Ar => ar,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "ar" | "arabic" => Ok(Language::Ar),
            _ => Err(format!("unknown language `{}` (expected en or ar)", s)),
        }
    }
}
