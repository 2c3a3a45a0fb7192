use serde::Serialize;

use super::domain::{Criterion, RubricDocument};
use super::edit::EditError;

pub const WEIGHT_TOTAL: f64 = 100.0;
pub const WEIGHT_TOLERANCE: f64 = 0.01;

/// Integer shares for `count` criteria summing to exactly 100.
///
/// Every criterion receives `100 / count`; the whole remainder goes to the
/// first criterion. Empty input yields no shares.
pub fn equal_shares(count: usize) -> Vec<u32> {
    if count == 0 {
        return Vec::new();
    }
    let total = WEIGHT_TOTAL as usize;
    let base = total / count;
    let remainder = total - base * count;

    let mut shares = vec![base as u32; count];
    shares[0] += remainder as u32;
    shares
}

/// Assigns equal shares to every criterion, see [`equal_shares`].
pub fn distribute_equally(criteria: &[Criterion]) -> Vec<Criterion> {
    criteria
        .iter()
        .zip(equal_shares(criteria.len()))
        .map(|(criterion, share)| Criterion {
            weight: Some(f64::from(share)),
            ..criterion.clone()
        })
        .collect()
}

/// True unless every criterion already carries a positive weight.
pub fn needs_distribution(criteria: &[Criterion]) -> bool {
    !criteria
        .iter()
        .all(|criterion| criterion.weight.is_some_and(|weight| weight > 0.0))
}

pub fn total_weight(criteria: &[Criterion]) -> f64 {
    criteria.iter().filter_map(|criterion| criterion.weight).sum()
}

pub fn within_tolerance(total: f64) -> bool {
    (total - WEIGHT_TOTAL).abs() < WEIGHT_TOLERANCE
}

/// Weight validity as checked by the quality checklist: vacuously true for
/// zero or one criterion, otherwise every weight positive and the total 100.
pub fn weights_valid(criteria: &[Criterion]) -> bool {
    if criteria.len() <= 1 {
        return true;
    }
    if needs_distribution(criteria) {
        return false;
    }
    within_tolerance(total_weight(criteria))
}

/// Read-only weight state surfaced next to the criteria editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightSummary {
    pub enabled: bool,
    pub total: f64,
    pub balanced: bool,
    pub shares: Vec<WeightShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightShare {
    pub criterion_id: String,
    pub title: String,
    pub weight: Option<f64>,
}

impl RubricDocument {
    /// Weighting counts as enabled as soon as any criterion carries a weight.
    pub fn weights_enabled(&self) -> bool {
        self.criteria
            .iter()
            .any(|criterion| criterion.weight.is_some())
    }

    /// Toggles weighting. Enabling distributes equally unless every criterion
    /// already has a positive weight; disabling strips all weights.
    pub fn set_weighting(&self, enabled: bool) -> Self {
        let criteria = if enabled {
            if needs_distribution(&self.criteria) {
                distribute_equally(&self.criteria)
            } else {
                self.criteria.clone()
            }
        } else {
            self.criteria
                .iter()
                .map(|criterion| Criterion {
                    weight: None,
                    ..criterion.clone()
                })
                .collect()
        };

        Self {
            criteria,
            ..self.clone()
        }
    }

    pub fn distribute_weights(&self) -> Self {
        Self {
            criteria: distribute_equally(&self.criteria),
            ..self.clone()
        }
    }

    /// Sets one weight, clamped to `[0, 100]`. Siblings are not rebalanced.
    pub fn set_weight(&self, criterion_id: &str, value: f64) -> Result<Self, EditError> {
        if self.criterion(criterion_id).is_none() {
            return Err(EditError::CriterionNotFound(criterion_id.to_string()));
        }
        let clamped = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, WEIGHT_TOTAL)
        };

        let criteria = self
            .criteria
            .iter()
            .map(|criterion| {
                if criterion.id == criterion_id {
                    Criterion {
                        weight: Some(clamped),
                        ..criterion.clone()
                    }
                } else {
                    criterion.clone()
                }
            })
            .collect();

        Ok(Self {
            criteria,
            ..self.clone()
        })
    }

    pub fn weight_summary(&self) -> WeightSummary {
        let total = total_weight(&self.criteria);
        WeightSummary {
            enabled: self.weights_enabled(),
            total,
            balanced: within_tolerance(total),
            shares: self
                .criteria
                .iter()
                .map(|criterion| WeightShare {
                    criterion_id: criterion.id.clone(),
                    title: criterion.title.clone(),
                    weight: criterion.weight,
                })
                .collect(),
        }
    }
}
