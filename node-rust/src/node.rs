use crate::{encoder, BedrockClient, ImageBatch, ModelSelector, PromptNodeResult};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    time::{SystemTime, UNIX_EPOCH},
};

pub const NODE_CLASS_NAME: &str = "Bedrock";
pub const CATEGORY: &str = "tag/bedrock";
pub const FUNCTION: &str = "invoke";

pub const DEFAULT_PROMPT: &str = "Generate prompt words based on the image, requiring a children's painting style and incorporate the phrase '(colorful, vibrant colors:1.2) (simple line art)' into the prompt. The result should only contain the stable diffusion prompt words without any other information.";

/// How the host renders and validates one input socket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InputSpec {
    /// A dropdown of fixed values.
    Choice { options: Vec<String> },
    Image,
    String {
        multiline: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct NodeInput {
    pub name: String,
    pub spec: InputSpec,
}

impl NodeInput {
    fn new(name: &str, spec: InputSpec) -> Self {
        Self {
            name: name.to_string(),
            spec,
        }
    }
}

/// The node as the host registers it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct NodeDefinition {
    pub class_name: String,
    pub category: String,
    pub function: String,
    pub output_node: bool,
    /// Ordered by socket position.
    pub required_inputs: Vec<NodeInput>,
    pub return_types: Vec<String>,
    pub return_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct NodeOutput {
    pub prompt: String,
}

/// Turns an image and an instruction into Stable Diffusion prompt words.
#[derive(Clone)]
pub struct ImagePromptNode {
    client: BedrockClient,
}

impl ImagePromptNode {
    #[must_use]
    pub fn new(client: BedrockClient) -> Self {
        Self { client }
    }

    pub fn from_env() -> PromptNodeResult<Self> {
        Ok(Self::new(BedrockClient::from_env()?))
    }

    #[must_use]
    pub fn definition() -> NodeDefinition {
        NodeDefinition {
            class_name: NODE_CLASS_NAME.to_string(),
            category: CATEGORY.to_string(),
            function: FUNCTION.to_string(),
            output_node: false,
            required_inputs: vec![
                NodeInput::new(
                    "model",
                    InputSpec::Choice {
                        options: ModelSelector::ALL
                            .iter()
                            .map(|selector| selector.label().to_string())
                            .collect(),
                    },
                ),
                NodeInput::new("image", InputSpec::Image),
                NodeInput::new(
                    "prompt",
                    InputSpec::String {
                        multiline: true,
                        default: Some(DEFAULT_PROMPT.to_string()),
                    },
                ),
            ],
            return_types: vec!["STRING".to_string()],
            return_names: vec!["prompt".to_string()],
        }
    }

    /// Change token for the host's cache. Always fresh, so the node re-runs on
    /// every queue.
    #[must_use]
    pub fn is_changed() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }

    pub async fn invoke(
        &self,
        model: &str,
        image: &ImageBatch,
        prompt: &str,
    ) -> PromptNodeResult<NodeOutput> {
        let model: ModelSelector = model.parse()?;
        let encoded = encoder::encode_batch(image)?;
        tracing::debug!(
            %model,
            frames = image.len(),
            width = image.width(),
            height = image.height(),
            "Encoded image batch"
        );

        let prompt = self.client.invoke_encoded(prompt, &encoded, model).await?;
        Ok(NodeOutput { prompt })
    }
}

/// Node class name to definition, for registration with the host.
#[must_use]
pub fn node_class_mappings() -> BTreeMap<&'static str, NodeDefinition> {
    BTreeMap::from([(NODE_CLASS_NAME, ImagePromptNode::definition())])
}
