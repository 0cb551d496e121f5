//! Random forest classifier over binary symptom features
//!
//! CART trees with Gini impurity, grown until pure (or out of usable
//! features), each fitted on a bootstrap sample with `sqrt(n_features)`
//! candidate features per split. The forest averages leaf class distributions
//! and returns the most likely class; ties go to the lowest class index.
//!
//! Classes are the sorted unique training labels. Trees are fitted in parallel
//! with Rayon, each from its own seeded RNG, so a given seed always yields the
//! same forest.

use crate::config::ForestParams;
use crate::error::PredictorError;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        /// Class probabilities, indexed like `RandomForest::classes`
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        /// Child for rows where the symptom is absent (0)
        absent: usize,
        /// Child for rows where the symptom is present (1)
        present: usize,
    },
}

/// Single CART tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    root: usize,
}

struct TreeBuilder<'a> {
    x: &'a [Vec<u8>],
    y: &'a [usize],
    n_classes: usize,
    max_features: usize,
    rng: StdRng,
    nodes: Vec<Node>,
}

impl<'a> TreeBuilder<'a> {
    fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &s in samples {
            counts[self.y[s]] += 1;
        }
        counts
    }

    fn leaf(&mut self, counts: &[usize], total: usize) -> usize {
        let distribution = counts
            .iter()
            .map(|&c| if total == 0 { 0.0 } else { c as f64 / total as f64 })
            .collect();
        self.nodes.push(Node::Leaf { distribution });
        self.nodes.len() - 1
    }

    /// Weighted Gini of splitting `samples` on `feature`, or None if one side is empty
    fn split_impurity(&self, samples: &[usize], feature: usize, counts: &[usize]) -> Option<f64> {
        let mut present = vec![0usize; self.n_classes];
        let mut n_present = 0usize;
        for &s in samples {
            if self.x[s][feature] == 1 {
                present[self.y[s]] += 1;
                n_present += 1;
            }
        }
        let n_absent = samples.len() - n_present;
        if n_present == 0 || n_absent == 0 {
            return None;
        }

        fn sum_sq(side: impl Iterator<Item = usize>) -> f64 {
            side.map(|c| (c * c) as f64).sum()
        }
        let present_sq = sum_sq(present.iter().copied());
        let absent_sq = sum_sq(counts.iter().zip(&present).map(|(&t, &p)| t - p));

        // n_l * gini_l + n_r * gini_r, scaled by 1/n
        let weighted = (n_present as f64 - present_sq / n_present as f64)
            + (n_absent as f64 - absent_sq / n_absent as f64);
        Some(weighted / samples.len() as f64)
    }

    fn best_split(&mut self, samples: &[usize], counts: &[usize]) -> Option<usize> {
        let n_features = self.x.first().map_or(0, |r| r.len());
        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(&mut self.rng);

        // Constant features don't count towards max_features
        let mut evaluated = 0usize;
        let mut best: Option<(usize, f64)> = None;
        for feature in features {
            if evaluated >= self.max_features {
                break;
            }
            if let Some(impurity) = self.split_impurity(samples, feature, counts) {
                evaluated += 1;
                if best.map_or(true, |(_, b)| impurity < b) {
                    best = Some((feature, impurity));
                }
            }
        }
        best.map(|(feature, _)| feature)
    }

    fn build(&mut self, samples: Vec<usize>) -> usize {
        let counts = self.class_counts(&samples);
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        if samples.len() < 2 || pure {
            return self.leaf(&counts, samples.len());
        }

        let Some(feature) = self.best_split(&samples, &counts) else {
            return self.leaf(&counts, samples.len());
        };

        let (present, absent): (Vec<usize>, Vec<usize>) =
            samples.into_iter().partition(|&s| self.x[s][feature] == 1);

        let absent = self.build(absent);
        let present = self.build(present);
        self.nodes.push(Node::Split { feature, absent, present });
        self.nodes.len() - 1
    }
}

impl DecisionTree {
    /// Fit on `samples` (row indices into `x`, repeats allowed)
    pub fn fit(
        x: &[Vec<u8>],
        y: &[usize],
        n_classes: usize,
        samples: Vec<usize>,
        max_features: usize,
        seed: u64,
    ) -> Self {
        let mut builder = TreeBuilder {
            x,
            y,
            n_classes,
            max_features: max_features.max(1),
            rng: StdRng::seed_from_u64(seed),
            nodes: Vec::new(),
        };
        let root = builder.build(samples);
        Self {
            nodes: builder.nodes,
            root,
        }
    }

    /// Leaf class distribution reached by `row`
    pub fn distribution(&self, row: &[u8]) -> &[f64] {
        let mut idx = self.root;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { distribution } => return distribution,
                Node::Split { feature, absent, present } => {
                    idx = if row[*feature] == 1 { *present } else { *absent };
                }
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }
}

/// Bagged ensemble of decision trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    classes: Vec<String>,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit a forest on all rows of `x`
    pub fn fit(x: &[Vec<u8>], labels: &[String], params: &ForestParams) -> Result<Self> {
        if x.is_empty() {
            anyhow::bail!("Cannot fit a forest on an empty training set");
        }
        if x.len() != labels.len() {
            anyhow::bail!("{} rows but {} labels", x.len(), labels.len());
        }
        if params.n_estimators == 0 {
            anyhow::bail!("n_estimators must be at least 1");
        }

        let n_features = x[0].len();
        if let Some(bad) = x.iter().position(|r| r.len() != n_features) {
            anyhow::bail!("Row {} has {} features, expected {}", bad, x[bad].len(), n_features);
        }

        let classes: Vec<String> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let y: Vec<usize> = labels
            .iter()
            .map(|l| classes.binary_search(l).unwrap_or_default())
            .collect();

        let max_features = ((n_features as f64).sqrt() as usize).max(1);
        let n = x.len();

        let trees: Vec<DecisionTree> = (0..params.n_estimators)
            .into_par_iter()
            .map(|t| {
                let seed = params.random_state.wrapping_add(t as u64);
                let mut rng = StdRng::seed_from_u64(seed);
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(x, &y, classes.len(), bootstrap, max_features, seed ^ 0x5eed)
            })
            .collect();

        tracing::debug!(
            "Fitted {} trees ({} classes, {} features, max_features={})",
            trees.len(),
            classes.len(),
            n_features,
            max_features
        );

        Ok(Self {
            classes,
            n_features,
            trees,
        })
    }

    /// Averaged class probabilities for one row
    pub fn predict_proba(&self, row: &[u8]) -> Result<Vec<f64>, PredictorError> {
        if row.len() != self.n_features {
            return Err(PredictorError::VectorLength {
                expected: self.n_features,
                actual: row.len(),
            });
        }

        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.distribution(row)) {
                *acc += p;
            }
        }
        let n_trees = self.trees.len().max(1) as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }

    /// Most likely class label for one row
    pub fn predict(&self, row: &[u8]) -> Result<&str, PredictorError> {
        let proba = self.predict_proba(row)?;
        let best = proba
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((i, p)),
            })
            .map(|(i, _)| i)
            .unwrap_or_default();

        self.classes
            .get(best)
            .map(|s| s.as_str())
            .ok_or(PredictorError::UnknownLabelIndex(best))
    }

    /// Share of `rows` predicted as their label
    pub fn accuracy(&self, rows: &[Vec<u8>], labels: &[String]) -> Result<f64, PredictorError> {
        if rows.is_empty() {
            return Ok(0.0);
        }
        let mut correct = 0usize;
        for (row, label) in rows.iter().zip(labels) {
            if self.predict(row)? == label {
                correct += 1;
            }
        }
        Ok(correct as f64 / rows.len() as f64)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Seeded shuffle split into (train, test) row indices
///
/// Test size is `ceil(test_fraction * n)`, capped so at least one row is left
/// for training.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let n_test = ((test_fraction * n as f64).ceil() as usize).min(n.saturating_sub(1));
    let train = indices.split_off(n_test);
    (train, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flu_cold() -> (Vec<Vec<u8>>, Vec<String>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for _ in 0..6 {
            x.push(vec![1, 0, 1]);
            y.push("Flu".to_string());
            x.push(vec![0, 1, 0]);
            y.push("Common Cold".to_string());
        }
        (x, y)
    }

    fn params(n_estimators: usize) -> ForestParams {
        ForestParams {
            n_estimators,
            random_state: 42,
            test_fraction: 0.2,
        }
    }

    #[test]
    fn test_forest_separates_classes() {
        let (x, y) = flu_cold();
        let forest = RandomForest::fit(&x, &y, &params(20)).unwrap();

        assert_eq!(forest.classes(), ["Common Cold".to_string(), "Flu".to_string()]);
        assert_eq!(forest.predict(&[1, 0, 1]).unwrap(), "Flu");
        assert_eq!(forest.predict(&[0, 1, 0]).unwrap(), "Common Cold");
        assert_relative_eq!(forest.accuracy(&x, &y).unwrap(), 1.0);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (x, y) = flu_cold();
        let forest = RandomForest::fit(&x, &y, &params(10)).unwrap();
        let proba = forest.predict_proba(&[1, 1, 0]).unwrap();
        assert_relative_eq!(proba.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = flu_cold();
        let a = RandomForest::fit(&x, &y, &params(8)).unwrap();
        let b = RandomForest::fit(&x, &y, &params(8)).unwrap();
        for row in [[0u8, 0, 0], [1, 1, 1], [0, 0, 1]] {
            assert_eq!(a.predict_proba(&row).unwrap(), b.predict_proba(&row).unwrap());
        }
    }

    #[test]
    fn test_wrong_vector_length_is_error() {
        let (x, y) = flu_cold();
        let forest = RandomForest::fit(&x, &y, &params(3)).unwrap();
        assert_eq!(
            forest.predict(&[1, 0]).unwrap_err(),
            PredictorError::VectorLength { expected: 3, actual: 2 }
        );
    }

    #[test]
    fn test_single_class_and_constant_features() {
        let x = vec![vec![0u8, 0], vec![0, 0]];
        let y = vec!["Flu".to_string(), "Flu".to_string()];
        let forest = RandomForest::fit(&x, &y, &params(2)).unwrap();
        assert_eq!(forest.predict(&[1, 1]).unwrap(), "Flu");

        // Identical rows with different labels cannot be split
        let y = vec!["Flu".to_string(), "Cold".to_string()];
        let tree = DecisionTree::fit(&x, &[1, 0], 2, vec![0, 1], 1, 7);
        assert_eq!(tree.n_nodes(), 1);
        assert_relative_eq!(tree.distribution(&[0, 0])[0], 0.5);
        assert!(RandomForest::fit(&x, &y, &params(2)).is_ok());
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        assert!(RandomForest::fit(&[], &[], &params(1)).is_err());
        let x = vec![vec![1u8, 0], vec![1u8]];
        let y = vec!["a".to_string(), "b".to_string()];
        assert!(RandomForest::fit(&x, &y, &params(1)).is_err());
    }

    #[test]
    fn test_train_test_split_sizes() {
        let (train, test) = train_test_split(10, 0.2, 42);
        assert_eq!((train.len(), test.len()), (8, 2));

        let (train, test) = train_test_split(11, 0.2, 42);
        assert_eq!((train.len(), test.len()), (8, 3));

        let (train, test) = train_test_split(1, 0.2, 42);
        assert_eq!((train.len(), test.len()), (1, 0));

        let (mut all, test) = train_test_split(5, 0.4, 1);
        all.extend(test);
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3, 4]);
    }
}
