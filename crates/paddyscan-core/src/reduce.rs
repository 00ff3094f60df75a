//! Model output → labelled classification.
//!
//! Score vectors are indexed by class: position `i` holds the model's
//! confidence for class `i` of the [`LabelTable`]. Among equal maxima the
//! lowest index wins; a NaN score never wins against a comparable one.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;
use crate::labels::LabelTable;

/// Labelled outcome of one inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub class_index: usize,
    pub class_name: String,
    /// `score * 100`, rounded to two decimal places.
    pub confidence_percent: f64,
}

impl ClassificationResult {
    fn new(class_index: usize, score: f32, labels: &LabelTable) -> Result<Self, ClassifyError> {
        let class_name = labels
            .get(class_index)
            .ok_or(ClassifyError::UnknownClassIndex {
                index: class_index,
                classes: labels.len(),
            })?;
        Ok(Self {
            class_index,
            class_name: class_name.to_string(),
            confidence_percent: to_percent(score),
        })
    }
}

/// Index and value of the highest score, or `None` for an empty vector.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        match best {
            None => best = Some((i, score)),
            Some((_, top)) if descending(score, top) == Ordering::Less => {
                best = Some((i, score));
            }
            Some(_) => {}
        }
    }
    best
}

/// Pick the highest-scoring class and label it.
pub fn reduce(scores: &[f32], labels: &LabelTable) -> Result<ClassificationResult, ClassifyError> {
    let (index, score) = argmax(scores).ok_or(ClassifyError::EmptyScores)?;
    ClassificationResult::new(index, score, labels)
}

/// Check a score vector against the label table before reducing it.
///
/// Every class the model scores must have a label and every score must be
/// finite. Callers that want the same image to pass or fail no matter how
/// many classes they report run this first.
pub fn check_scores(scores: &[f32], labels: &LabelTable) -> Result<(), ClassifyError> {
    if scores.is_empty() {
        return Err(ClassifyError::EmptyScores);
    }
    if scores.len() > labels.len() {
        return Err(ClassifyError::UnknownClassIndex {
            index: labels.len(),
            classes: labels.len(),
        });
    }
    match scores.iter().position(|s| !s.is_finite()) {
        Some(index) => Err(ClassifyError::NonFiniteScore { index }),
        None => Ok(()),
    }
}

/// The `k` highest-scoring classes, best first.
///
/// Stricter than [`reduce`]: the whole vector must pass [`check_scores`],
/// not just the winning class. On such a vector `rank(scores, labels, 1)`
/// agrees with `reduce`.
pub fn rank(
    scores: &[f32],
    labels: &LabelTable,
    k: usize,
) -> Result<Vec<ClassificationResult>, ClassifyError> {
    check_scores(scores, labels)?;

    let mut order: Vec<usize> = (0..scores.len()).collect();
    // Stable: equal scores keep ascending index order.
    order.sort_by(|&a, &b| descending(scores[a], scores[b]));

    order
        .into_iter()
        .take(k)
        .map(|i| ClassificationResult::new(i, scores[i], labels))
        .collect()
}

/// Descending order with NaN after every number.
fn descending(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

fn to_percent(score: f32) -> f64 {
    (f64::from(score) * 10_000.0).round() / 100.0
}
