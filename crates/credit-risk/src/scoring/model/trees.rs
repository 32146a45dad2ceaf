use serde::{Deserialize, Serialize};

use super::{ClassProbabilities, ClassifierError, Explanation, ModelLoadError};
use crate::scoring::domain::{FeatureVector, FEATURE_COUNT};

/// Gradient-boosted decision trees with a logistic link.
///
/// The raw margin is `base_score` plus the leaf reached in every tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsembleModel {
    #[serde(default)]
    base_score: f64,
    trees: Vec<DecisionTree>,
}

/// Flat node list; node 0 is the root and children always follow their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// `x[feature] < threshold` goes left. `value` is the node's expected output.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        value: f64,
    },
    Leaf {
        leaf: f64,
    },
}

impl TreeNode {
    fn value(&self) -> f64 {
        match self {
            TreeNode::Split { value, .. } => *value,
            TreeNode::Leaf { leaf } => *leaf,
        }
    }
}

impl DecisionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Result<Self, ModelLoadError> {
        let tree = Self { nodes };
        tree.validate().map_err(ModelLoadError::Invalid)?;
        Ok(tree)
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("has no nodes".to_string());
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    value,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(format!(
                            "node {index} splits on unknown feature {feature}"
                        ));
                    }
                    for child in [left, right] {
                        if *child <= index || *child >= self.nodes.len() {
                            return Err(format!(
                                "node {index} has invalid child {child}"
                            ));
                        }
                    }
                    if threshold.is_nan() || !value.is_finite() {
                        return Err(format!(
                            "node {index} has a non-finite threshold or value"
                        ));
                    }
                }
                TreeNode::Leaf { leaf } => {
                    if !leaf.is_finite() {
                        return Err(format!("node {index} has a non-finite leaf"));
                    }
                }
            }
        }

        Ok(())
    }

    /// Node indices visited from the root to the leaf selected by `features`.
    fn decision_path(&self, features: &FeatureVector) -> Vec<usize> {
        let values = features.values();
        let mut path = vec![0];
        let mut current = 0;

        while let TreeNode::Split {
            feature,
            threshold,
            left,
            right,
            ..
        } = &self.nodes[current]
        {
            current = if values[*feature] < *threshold {
                *left
            } else {
                *right
            };
            path.push(current);
        }

        path
    }

    pub(crate) fn leaf_value(&self, features: &FeatureVector) -> f64 {
        let path = self.decision_path(features);
        let leaf = path[path.len() - 1];
        self.nodes[leaf].value()
    }
}

impl TreeEnsembleModel {
    pub fn new(base_score: f64, trees: Vec<DecisionTree>) -> Result<Self, ModelLoadError> {
        let model = Self { base_score, trees };
        model.validate().map_err(ModelLoadError::Invalid)?;
        Ok(model)
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("tree ensemble has no trees".to_string());
        }
        if !self.base_score.is_finite() {
            return Err("base_score must be finite".to_string());
        }
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(index, tree)| {
                tree.validate()
                    .map_err(|reason| format!("tree {index} {reason}"))
            })
    }

    pub(crate) fn margin(&self, features: &FeatureVector) -> f64 {
        self.base_score
            + self
                .trees
                .iter()
                .map(|tree| tree.leaf_value(features))
                .sum::<f64>()
    }

    pub(crate) fn predict_proba(
        &self,
        features: &FeatureVector,
    ) -> Result<ClassProbabilities, ClassifierError> {
        ClassProbabilities::from_margin(self.margin(features))
    }

    /// Decision-path attribution: every split credits its feature with the
    /// change in expected output between the parent and the child taken.
    pub(crate) fn explain(&self, features: &FeatureVector) -> Explanation {
        let mut contributions = [0.0; FEATURE_COUNT];
        let mut base_value = self.base_score;

        for tree in &self.trees {
            let path = tree.decision_path(features);
            base_value += tree.nodes[path[0]].value();

            for step in path.windows(2) {
                let parent = &tree.nodes[step[0]];
                let child = &tree.nodes[step[1]];
                if let TreeNode::Split { feature, .. } = parent {
                    contributions[*feature] += child.value() - parent.value();
                }
            }
        }

        Explanation::from_contributions(base_value, features, contributions)
    }
}
