use serde::{Deserialize, Serialize};

/// Who spoke a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    /// Label shown next to a turn in the transcript
    pub fn display_name(&self) -> &'static str {
        match self {
            Speaker::User => "Você",
            Speaker::Assistant => "EMI",
        }
    }
}

/// A single message in the transcript, immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Speaker,
    content: String,
}

impl Turn {
    pub fn new(role: Speaker, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Speaker::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, content)
    }

    pub fn role(&self) -> Speaker {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_role() {
        assert_eq!(Turn::user("oi").role(), Speaker::User);
        assert_eq!(Turn::assistant("olá").role(), Speaker::Assistant);
        assert_eq!(Turn::user("oi").content(), "oi");
    }

    #[test]
    fn test_speaker_serializes_lowercase() {
        let json = serde_json::to_string(&Turn::assistant("x")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"x"}"#);
    }
}
