use serde::{Deserialize, Serialize};

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Parse an external role filter value. Anything else is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// One fully materialized message, re-read from the backing file for
/// navigation. `index` is the 0-based position in the user+assistant
/// sequence; `user_turn` is the ordinal of the most recent user message at
/// or before this one (0 before any user message).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptMessage {
    pub index: usize,
    pub role: Role,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub user_turn: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_exact_names_only() {
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("assistant"), Some(Role::Assistant));
        assert_eq!(Role::parse("system"), None);
        assert_eq!(Role::parse("User"), None);
    }

    #[test]
    fn message_serializes_camel_case() {
        let message = TranscriptMessage {
            index: 3,
            role: Role::Assistant,
            text: "done".to_string(),
            timestamp: None,
            user_turn: 1,
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["userTurn"], 1);
        assert_eq!(value["role"], "assistant");
        assert!(value.get("timestamp").is_none());
    }
}
