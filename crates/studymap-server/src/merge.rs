//! Per-study merge rules.
//!
//! A rule decides two things about a study: whether its answer needs only
//! the external value (so the persistence branch is skipped entirely) and
//! how the available values combine into the outbound [`StudyResult`].
//! The table is total - every study, known or not, maps to a rule - and
//! applying a rule is pure data shaping that never fails.

use studymap_common::StudyResult;

/// Rendering/combination rule for one study.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeRule {
    /// External value only, rendered on the temperature scale.
    Temperature,
    /// External value as the color, persisted value as the pin.
    Generic,
}

impl MergeRule {
    /// Rule for a routing key. The weather studies are answered by the
    /// external collaborator alone; everything else is the generic
    /// external+persisted combination.
    pub fn for_study(study: &str) -> Self {
        match study {
            "uk-sync" | "uk-async" => MergeRule::Temperature,
            _ => MergeRule::Generic,
        }
    }

    /// Whether this study's answer depends solely on the external value.
    pub fn external_only(&self) -> bool {
        matches!(self, MergeRule::Temperature)
    }

    /// Combines the values into the outbound result shape.
    pub fn apply(&self, external: f64, persisted: Option<f64>) -> StudyResult {
        match self {
            MergeRule::Temperature => StudyResult::temperature(external),
            MergeRule::Generic => StudyResult::generic(external, persisted),
        }
    }
}
