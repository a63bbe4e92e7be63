//! Gradient-Boosted Tree Ensemble (XGBoost JSON)
//!
//! Evaluates a regression model saved with XGBoost's native JSON format
//! (`booster.save_model("model.json")`). Only the parts needed for
//! prediction are read:
//!
//! - `learner.feature_names`: declared input order (may be empty)
//! - `learner.learner_model_param.base_score`: starting margin
//! - `learner.objective.name`: must be an identity-link regression objective
//! - `learner.gradient_booster.model.trees[*]`: node arrays
//!
//! Evaluation follows XGBoost: single-precision inputs, `x < split` goes
//! left, NaN follows `default_left`, leaf values live in `split_conditions`,
//! and the output is `base_score + Σ leaves`.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::Regressor;

/// Objectives whose prediction is the raw margin
const IDENTITY_OBJECTIVES: &[&str] = &[
    "reg:squarederror",
    "reg:linear",
    "reg:absoluteerror",
    "reg:pseudohubererror",
    "reg:squaredlogerror",
    "reg:quantileerror",
];

// ============================================================================
// JSON layout
// ============================================================================

#[derive(Debug, Deserialize)]
struct ModelFile {
    learner: LearnerFile,
}

#[derive(Debug, Deserialize)]
struct LearnerFile {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: BoosterFile,
    learner_model_param: LearnerModelParam,
    objective: ObjectiveFile,
}

#[derive(Debug, Deserialize)]
struct BoosterFile {
    name: String,
    model: Option<TreesFile>,
}

#[derive(Debug, Deserialize)]
struct TreesFile {
    trees: Vec<TreeFile>,
}

#[derive(Debug, Deserialize)]
struct LearnerModelParam {
    base_score: String,
    num_feature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectiveFile {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TreeFile {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f64>,
    default_left: Vec<Flag>,
}

/// `default_left` is written as 0/1 by older releases and as booleans by newer ones
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(u8),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

// ============================================================================
// Compiled trees
// ============================================================================

const LEAF: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct Node {
    /// LEAF for leaves
    left: u32,
    right: u32,
    feature: u32,
    /// Split threshold, or the leaf value
    value: f32,
    default_left: bool,
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn compile(file: TreeFile, tree_idx: usize) -> Result<Self> {
        let n = file.left_children.len();
        if n == 0 {
            anyhow::bail!("Tree {} has no nodes", tree_idx);
        }
        if file.right_children.len() != n
            || file.split_indices.len() != n
            || file.split_conditions.len() != n
            || file.default_left.len() != n
        {
            anyhow::bail!("Tree {} has node arrays of different lengths", tree_idx);
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let (left, right) = (file.left_children[i], file.right_children[i]);
            let value = file.split_conditions[i] as f32;

            if left == -1 {
                nodes.push(Node { left: LEAF, right: LEAF, feature: 0, value, default_left: false });
                continue;
            }

            // Children always follow their parent, which also rules out cycles
            let in_range = |c: i64| c > i as i64 && (c as usize) < n;
            if !in_range(left) || !in_range(right) {
                anyhow::bail!("Tree {} node {} has invalid children ({}, {})", tree_idx, i, left, right);
            }
            let feature = u32::try_from(file.split_indices[i])
                .with_context(|| format!("Tree {} node {} has a negative split index", tree_idx, i))?;

            nodes.push(Node {
                left: left as u32,
                right: right as u32,
                feature,
                value,
                default_left: file.default_left[i].is_set(),
            });
        }

        Ok(Self { nodes })
    }

    /// Columns absent from a short row count as missing
    fn leaf_value(&self, row: &[f32]) -> f32 {
        let mut node = &self.nodes[0];
        while node.left != LEAF {
            let go_left = match row.get(node.feature as usize) {
                Some(&x) if !x.is_nan() => x < node.value,
                _ => node.default_left,
            };
            node = &self.nodes[if go_left { node.left } else { node.right } as usize];
        }
        node.value
    }

    fn max_feature(&self) -> Option<u32> {
        self.nodes.iter().filter(|n| n.left != LEAF).map(|n| n.feature).max()
    }
}

// ============================================================================
// Ensemble
// ============================================================================

/// Boosted regression trees with declared feature order
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    feature_names: Vec<String>,
    base_score: f32,
    trees: Vec<Tree>,
    /// `num_feature` from the model params, when declared
    num_feature: Option<usize>,
}

impl TreeEnsemble {
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let file: ModelFile = serde_json::from_value(value).context("Invalid XGBoost model JSON")?;
        let learner = file.learner;

        if !IDENTITY_OBJECTIVES.contains(&learner.objective.name.as_str()) {
            anyhow::bail!(
                "Unsupported objective '{}' (expected an identity-link regression objective)",
                learner.objective.name
            );
        }
        if learner.gradient_booster.name != "gbtree" {
            anyhow::bail!("Unsupported booster '{}' (only gbtree)", learner.gradient_booster.name);
        }
        let trees_file = learner
            .gradient_booster
            .model
            .context("gbtree booster has no model section")?;

        let base_score = parse_base_score(&learner.learner_model_param.base_score)?;
        let num_feature = learner
            .learner_model_param
            .num_feature
            .as_deref()
            .map(|s| s.trim().parse::<usize>())
            .transpose()
            .context("Invalid num_feature")?;

        let trees = trees_file
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, t)| Tree::compile(t, i))
            .collect::<Result<Vec<_>>>()?;

        let ensemble = Self {
            feature_names: learner.feature_names,
            base_score,
            trees,
            num_feature,
        };
        if !ensemble.feature_names.is_empty() {
            ensemble.check_width(ensemble.feature_names.len())?;
        }
        Ok(ensemble)
    }

    /// Number of input columns the model was fitted on, if known
    pub fn declared_width(&self) -> Option<usize> {
        self.num_feature
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Attach a feature order to a model saved without names
    pub fn with_feature_names(mut self, names: Vec<String>) -> Result<Self> {
        self.check_width(names.len())?;
        self.feature_names = names;
        Ok(self)
    }

    fn check_width(&self, width: usize) -> Result<()> {
        if let Some(n) = self.num_feature {
            if n != width {
                anyhow::bail!("Model was fitted on {} features but {} names are declared", n, width);
            }
        }
        if let Some(max) = self.trees.iter().filter_map(Tree::max_feature).max() {
            if max as usize >= width {
                anyhow::bail!("Model splits on feature index {} but only {} features are declared", max, width);
            }
        }
        Ok(())
    }
}

impl Regressor for TreeEnsemble {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, row: &[f64]) -> f64 {
        let row: Vec<f32> = row.iter().map(|&x| x as f32).collect();
        let margin = self
            .trees
            .iter()
            .fold(self.base_score, |acc, tree| acc + tree.leaf_value(&row));
        f64::from(margin)
    }
}

/// Accepts both `"5E-1"` and the bracketed `"[5E-1]"` written by newer releases
fn parse_base_score(raw: &str) -> Result<f32> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    trimmed
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .parse::<f32>()
        .with_context(|| format!("Invalid base_score '{}'", raw))
}
