mod checklist;

pub use checklist::{
    ChecklistItem, ChecklistItemId, ChecklistPriority, CHECKLIST, MIN_RECOMMENDED_CRITERIA,
    MIN_RECOMMENDED_OUTCOMES,
};

use serde::Serialize;

use super::domain::RubricDocument;

/// Outcome of a single checklist rule, kept for transparent audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistResult {
    pub item: ChecklistItemId,
    pub label: &'static str,
    pub priority: ChecklistPriority,
    pub satisfied: bool,
}

/// Coarse banding of the completeness score for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityBand {
    Strong,
    Fair,
    Weak,
}

impl QualityBand {
    pub const fn from_score(score: u8) -> Self {
        if score >= 80 {
            Self::Strong
        } else if score >= 50 {
            Self::Fair
        } else {
            Self::Weak
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Fair => "Fair",
            Self::Weak => "Needs Work",
        }
    }
}

/// Completeness score of a rubric against the best-practice checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    pub score: u8,
    pub band: QualityBand,
    pub satisfied: usize,
    pub total: usize,
    pub required_satisfied: bool,
    pub items: Vec<ChecklistResult>,
}

impl QualityReport {
    /// Evaluates every checklist rule. Pure and cheap enough to run on each edit.
    pub fn assess(document: &RubricDocument) -> Self {
        let items: Vec<ChecklistResult> = CHECKLIST
            .iter()
            .map(|item| ChecklistResult {
                item: item.id,
                label: item.label,
                priority: item.priority,
                satisfied: item.is_satisfied(document),
            })
            .collect();

        let total = items.len();
        let satisfied = items.iter().filter(|result| result.satisfied).count();
        let required_satisfied = items
            .iter()
            .filter(|result| result.priority == ChecklistPriority::Required)
            .all(|result| result.satisfied);
        let score = percentage(satisfied, total);

        Self {
            score,
            band: QualityBand::from_score(score),
            satisfied,
            total,
            required_satisfied,
            items,
        }
    }

    pub fn result(&self, item: ChecklistItemId) -> Option<&ChecklistResult> {
        self.items.iter().find(|result| result.item == item)
    }

    pub fn is_satisfied(&self, item: ChecklistItemId) -> bool {
        self.result(item).is_some_and(|result| result.satisfied)
    }

    /// Required items still failing, in checklist order.
    pub fn missing_required(&self) -> Vec<&ChecklistResult> {
        self.items
            .iter()
            .filter(|result| result.priority == ChecklistPriority::Required && !result.satisfied)
            .collect()
    }
}

impl RubricDocument {
    pub fn quality(&self) -> QualityReport {
        QualityReport::assess(self)
    }
}

/// `round(100 * part / whole)` in integer arithmetic, halves rounding up.
fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let scaled = (200 * part + whole) / (2 * whole);
    u8::try_from(scaled.min(100)).unwrap_or(100)
}
