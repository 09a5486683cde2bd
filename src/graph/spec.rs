//! Node and pipeline specifications — pure configuration.
//!
//! A `NodeSpec` carries everything the engine needs to run one step:
//! declared input/output keys, an opaque instruction text, and the tool
//! whitelist. The engine schedules and validates; it never interprets the
//! instruction text.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How a node's session is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Iterative decision-maker session that runs until it signals
    /// completion via `set_output` for every declared output key.
    EventLoop,
}

/// Immutable definition of one pipeline step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Unique within the pipeline.
    pub id: String,
    pub name: String,
    pub description: String,
    pub node_type: NodeType,
    /// Client-facing nodes must converse with the user and obtain a
    /// confirmation before they may complete.
    pub client_facing: bool,
    /// State store keys that must exist before this node runs.
    pub input_keys: Vec<String>,
    /// State store keys this node must populate before it is done.
    pub output_keys: Vec<String>,
    /// Opaque instruction text handed to the decision-maker verbatim.
    pub system_prompt: String,
    /// Tool identifiers this node may invoke. Anything else is rejected.
    pub tools: Vec<String>,
}

/// An ordered sequence of node specs.
#[derive(Debug, Clone)]
pub struct PipelineSpec {
    pub name: String,
    pub nodes: Vec<NodeSpec>,
}

impl PipelineSpec {
    /// Validate structural invariants: at least one node, unique ids,
    /// non-empty output sets, no duplicate keys within a declaration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes.is_empty() {
            return Err(ConfigError::InvalidPipeline(format!(
                "pipeline '{}' has no nodes",
                self.name
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for node in &self.nodes {
            if node.id.is_empty() {
                return Err(ConfigError::InvalidPipeline(
                    "node with empty id".to_string(),
                ));
            }
            if !seen.insert(node.id.as_str()) {
                return Err(ConfigError::InvalidPipeline(format!(
                    "duplicate node id '{}'",
                    node.id
                )));
            }
            if node.output_keys.is_empty() {
                return Err(ConfigError::InvalidPipeline(format!(
                    "node '{}' declares no output keys",
                    node.id
                )));
            }
            for keys in [&node.input_keys, &node.output_keys] {
                let mut key_seen = std::collections::HashSet::new();
                for key in keys {
                    if !key_seen.insert(key.as_str()) {
                        return Err(ConfigError::InvalidPipeline(format!(
                            "node '{}' declares key '{}' twice",
                            node.id, key
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> NodeSpec {
        NodeSpec {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            node_type: NodeType::EventLoop,
            client_facing: false,
            input_keys: vec![],
            output_keys: vec!["out".into()],
            system_prompt: String::new(),
            tools: vec![],
        }
    }

    #[test]
    fn valid_pipeline_passes() {
        let pipeline = PipelineSpec {
            name: "p".into(),
            nodes: vec![node("a"), node("b")],
        };
        assert!(pipeline.validate().is_ok());
    }

    #[test]
    fn duplicate_node_ids_rejected() {
        let pipeline = PipelineSpec {
            name: "p".into(),
            nodes: vec![node("a"), node("a")],
        };
        assert!(pipeline.validate().is_err());
    }

    #[test]
    fn empty_pipeline_rejected() {
        let pipeline = PipelineSpec {
            name: "p".into(),
            nodes: vec![],
        };
        assert!(pipeline.validate().is_err());
    }

    #[test]
    fn node_without_outputs_rejected() {
        let mut bad = node("a");
        bad.output_keys.clear();
        let pipeline = PipelineSpec {
            name: "p".into(),
            nodes: vec![bad],
        };
        assert!(pipeline.validate().is_err());
    }

    #[test]
    fn duplicate_declared_key_rejected() {
        let mut bad = node("a");
        bad.output_keys = vec!["x".into(), "x".into()];
        let pipeline = PipelineSpec {
            name: "p".into(),
            nodes: vec![bad],
        };
        assert!(pipeline.validate().is_err());
    }

    #[test]
    fn node_type_serializes_snake_case() {
        let json = serde_json::to_string(&NodeType::EventLoop).unwrap();
        assert_eq!(json, "\"event_loop\"");
    }
}
