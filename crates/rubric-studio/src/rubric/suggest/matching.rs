use super::super::domain::{
    level_id, ordinal, row_id, GridLayout, PerformanceLevel, RubricDocument, RubricRow,
    HOLISTIC_CRITERION_ID,
};
use super::{SuggestedLevel, SuggestedRow};

/// Text used for any cell the backend left out or left blank.
pub const PENDING_DESCRIPTION: &str = "Description pending...";

/// Picks the candidate that best matches `wanted`.
///
/// Tiers, first hit wins: exact, case-insensitive, substring in either
/// direction (case-insensitive), then the candidate at `position`. Returns
/// `None` only when every tier misses, including an out-of-range position.
pub fn match_label<S: AsRef<str>>(wanted: &str, candidates: &[S], position: usize) -> Option<usize> {
    if let Some(index) = candidates
        .iter()
        .position(|candidate| candidate.as_ref() == wanted)
    {
        return Some(index);
    }

    let wanted_lower = wanted.trim().to_lowercase();
    let lowered: Vec<String> = candidates
        .iter()
        .map(|candidate| candidate.as_ref().trim().to_lowercase())
        .collect();

    if let Some(index) = lowered.iter().position(|candidate| *candidate == wanted_lower) {
        return Some(index);
    }

    if !wanted_lower.is_empty() {
        if let Some(index) = lowered.iter().position(|candidate| {
            !candidate.is_empty()
                && (candidate.contains(&wanted_lower) || wanted_lower.contains(candidate.as_str()))
        }) {
            return Some(index);
        }
    }

    (position < candidates.len()).then_some(position)
}

/// Builds rows aligned to the document's scale from raw suggestions.
///
/// Standard layouts get one row per criterion, in criterion order; holistic
/// layouts get the single overall row.
pub fn assemble_rows(document: &RubricDocument, suggestions: &[SuggestedRow]) -> Vec<RubricRow> {
    let titles: Vec<&str> = suggestions
        .iter()
        .map(|suggestion| suggestion.criterion_title.as_str())
        .collect();

    match document.layout() {
        GridLayout::Holistic => {
            let source = suggestions.first();
            vec![build_row(HOLISTIC_CRITERION_ID, &document.scale, source)]
        }
        GridLayout::Standard => document
            .criteria
            .iter()
            .enumerate()
            .map(|(position, criterion)| {
                let source =
                    match_label(&criterion.title, &titles, position).map(|index| &suggestions[index]);
                build_row(&criterion.id, &document.scale, source)
            })
            .collect(),
    }
}

fn build_row(criterion_id: &str, scale: &[String], source: Option<&SuggestedRow>) -> RubricRow {
    let suggested: &[SuggestedLevel] = source.map(|row| row.levels.as_slice()).unwrap_or(&[]);
    let names: Vec<&str> = suggested.iter().map(|level| level.level_name.as_str()).collect();

    let levels = scale
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let description = match_label(label, &names, index)
                .map(|found| suggested[found].description.trim())
                .filter(|text| !text.is_empty())
                .unwrap_or(PENDING_DESCRIPTION);
            PerformanceLevel {
                id: level_id(criterion_id, index),
                title: label.clone(),
                score: ordinal(index),
                description: description.to_string(),
            }
        })
        .collect();

    RubricRow {
        id: row_id(criterion_id),
        criterion_id: criterion_id.to_string(),
        levels,
    }
}

#[cfg(test)]
mod tests {
    use super::match_label;

    const SCALE: [&str; 4] = ["Emerging", "Developing", "Proficient", "Mastery"];

    #[test]
    fn exact_match_wins() {
        assert_eq!(match_label("Proficient", &SCALE, 0), Some(2));
    }

    #[test]
    fn case_insensitive_match() {
        assert_eq!(match_label("  MASTERY ", &SCALE, 0), Some(3));
    }

    #[test]
    fn substring_match_either_direction() {
        assert_eq!(match_label("Develop", &SCALE, 0), Some(1));
        assert_eq!(match_label("Level: Emerging skills", &SCALE, 3), Some(0));
    }

    #[test]
    fn positional_fallback_and_total_miss() {
        assert_eq!(match_label("Level B", &SCALE, 1), Some(1));
        assert_eq!(match_label("Level Z", &SCALE, 9), None);
        let empty: [&str; 0] = [];
        assert_eq!(match_label("anything", &empty, 0), None);
    }
}
