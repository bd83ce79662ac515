//! Completion models offered to users.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A selectable chat model: a human label and the API id sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GptModel {
    Gpt4o,
    #[default]
    Gpt35Turbo,
}

impl GptModel {
    pub const ALL: [GptModel; 2] = [GptModel::Gpt4o, GptModel::Gpt35Turbo];

    pub fn label(self) -> &'static str {
        match self {
            GptModel::Gpt4o => "GPT 4o",
            GptModel::Gpt35Turbo => "GPT 3.5 Turbo",
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            GptModel::Gpt4o => "gpt-4o",
            GptModel::Gpt35Turbo => "gpt-3.5-turbo",
        }
    }

    /// Finds a model by label or API id, ignoring ASCII case and surrounding whitespace.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(name) || m.id().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for GptModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_by_label_or_id() {
        assert_eq!(GptModel::parse("GPT 4o"), Some(GptModel::Gpt4o));
        assert_eq!(GptModel::parse("gpt 3.5 turbo"), Some(GptModel::Gpt35Turbo));
        assert_eq!(GptModel::parse(" gpt-4o "), Some(GptModel::Gpt4o));
        assert_eq!(GptModel::parse("gpt-5"), None);
        assert_eq!(GptModel::parse(""), None);
    }

    #[test]
    fn test_default_and_display() {
        assert_eq!(GptModel::default(), GptModel::Gpt35Turbo);
        assert_eq!(GptModel::Gpt4o.to_string(), "GPT 4o (gpt-4o)");
    }
}
