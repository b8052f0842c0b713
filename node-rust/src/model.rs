use crate::PromptNodeError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The Claude models the node can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub enum ModelSelector {
    #[serde(rename = "Claude3 sonnet")]
    Claude3Sonnet,
    #[serde(rename = "Claude3 haiku")]
    Claude3Haiku,
}

impl ModelSelector {
    pub const ALL: [Self; 2] = [Self::Claude3Sonnet, Self::Claude3Haiku];

    /// The label shown to users of the node.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Claude3Sonnet => "Claude3 sonnet",
            Self::Claude3Haiku => "Claude3 haiku",
        }
    }

    /// The Bedrock model ID.
    #[must_use]
    pub fn model_id(self) -> &'static str {
        match self {
            Self::Claude3Sonnet => "anthropic.claude-3-sonnet-20240229-v1:0",
            Self::Claude3Haiku => "anthropic.claude-3-haiku-20240307-v1:0",
        }
    }
}

impl FromStr for ModelSelector {
    type Err = PromptNodeError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|selector| selector.label() == label)
            .ok_or_else(|| PromptNodeError::UnsupportedModel(label.to_string()))
    }
}

impl fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
