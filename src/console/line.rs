use serde::{Deserialize, Serialize};

/// Presentation class of a console row. Carries no behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineKind {
    System,
    UserEcho,
    Alert,
    Success,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLine {
    pub kind: LineKind,
    pub text: String,
}

impl OutputLine {
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(LineKind::System, text)
    }

    pub fn echo(text: impl Into<String>) -> Self {
        Self::new(LineKind::UserEcho, text)
    }

    pub fn alert(text: impl Into<String>) -> Self {
        Self::new(LineKind::Alert, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(LineKind::Success, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(LineKind::Info, text)
    }

    pub fn blank() -> Self {
        Self::system("")
    }
}
