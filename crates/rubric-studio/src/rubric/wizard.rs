//! Linear authoring steps: context, criteria, levels, review.

use serde::{Deserialize, Serialize};

use super::domain::{is_blank, RubricDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardStep {
    Context,
    Criteria,
    Levels,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Context,
        WizardStep::Criteria,
        WizardStep::Levels,
        WizardStep::Review,
    ];

    pub const fn next(self) -> Option<Self> {
        match self {
            WizardStep::Context => Some(WizardStep::Criteria),
            WizardStep::Criteria => Some(WizardStep::Levels),
            WizardStep::Levels => Some(WizardStep::Review),
            WizardStep::Review => None,
        }
    }

    pub const fn previous(self) -> Option<Self> {
        match self {
            WizardStep::Context => None,
            WizardStep::Criteria => Some(WizardStep::Context),
            WizardStep::Levels => Some(WizardStep::Criteria),
            WizardStep::Review => Some(WizardStep::Levels),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            WizardStep::Context => "Context",
            WizardStep::Criteria => "Criteria",
            WizardStep::Levels => "Levels",
            WizardStep::Review => "Review",
        }
    }
}

/// Reason a step transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StepGate {
    #[error("a topic is required before continuing")]
    MissingTopic,
    #[error("a course name is required before continuing")]
    MissingCourseName,
    #[error("add at least one learning outcome to proceed")]
    NoOutcomes,
    #[error("add at least one criterion to proceed")]
    NoCriteria,
    #[error("generate or write performance levels to proceed")]
    NoRows,
    #[error("review is the final step")]
    AtFinalStep,
    #[error("step {0:?} has not been reached yet")]
    NotReached(WizardStep),
}

/// Checks whether `document` satisfies the exit gate of `step`.
pub fn exit_gate(step: WizardStep, document: &RubricDocument) -> Result<(), StepGate> {
    match step {
        WizardStep::Context => {
            if is_blank(&document.topic) {
                return Err(StepGate::MissingTopic);
            }
            if is_blank(&document.course_name) {
                return Err(StepGate::MissingCourseName);
            }
            if document.outcomes.is_empty() {
                return Err(StepGate::NoOutcomes);
            }
            Ok(())
        }
        WizardStep::Criteria if document.criteria.is_empty() => Err(StepGate::NoCriteria),
        WizardStep::Levels if document.rows.is_empty() => Err(StepGate::NoRows),
        WizardStep::Criteria | WizardStep::Levels => Ok(()),
        WizardStep::Review => Err(StepGate::AtFinalStep),
    }
}

/// Position within the wizard. `highest` is the furthest step reached so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub current: WizardStep,
    pub highest: WizardStep,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            current: WizardStep::Context,
            highest: WizardStep::Context,
        }
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A previously saved rubric opens directly on the review step.
    pub fn resume_at_review() -> Self {
        Self {
            current: WizardStep::Review,
            highest: WizardStep::Review,
        }
    }

    pub fn advance(self, document: &RubricDocument) -> Result<Self, StepGate> {
        exit_gate(self.current, document)?;
        let next = self.current.next().ok_or(StepGate::AtFinalStep)?;
        Ok(Self {
            current: next,
            highest: self.highest.max(next),
        })
    }

    pub fn back(self) -> Self {
        Self {
            current: self.current.previous().unwrap_or(self.current),
            ..self
        }
    }

    pub fn go_to(self, step: WizardStep) -> Result<Self, StepGate> {
        if step > self.highest {
            return Err(StepGate::NotReached(step));
        }
        Ok(Self {
            current: step,
            ..self
        })
    }

    pub fn reset(self) -> Self {
        Self::default()
    }

    pub fn can_advance(&self, document: &RubricDocument) -> bool {
        exit_gate(self.current, document).is_ok()
    }
}
