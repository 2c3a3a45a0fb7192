use serde_json::{json, Value};

use super::{CriteriaRequest, LevelsRequest, SUGGESTED_CRITERIA_COUNT};

pub const SYSTEM_INSTRUCTION: &str =
    "You are an expert university-level pedagogical assistant helping a professor create a rubric.";

pub fn criteria_prompt(request: &CriteriaRequest) -> String {
    format!(
        "Context: Creating a {kind} grading rubric for the university course \"{course}\".\n\
         Rubric format: {summary}\n\
         Assignment: \"{topic}\".\n\
         Learning Outcomes: {outcomes}\n\
         Performance scale: {scale}\n\n\
         Additional Course Context / Materials:\n{context}\n\n\
         Task: Analyze the context and any attached material and generate {count} distinct \
         assessment criteria aligned with these outcomes and the specific assignment. \
         Each criterion needs a short title and a brief description of what is assessed.",
        kind = request.rubric_type.label(),
        course = request.course_name,
        summary = request.rubric_type.summary(),
        topic = request.topic,
        outcomes = request.outcomes.join("; "),
        scale = request.scale.join(", "),
        context = request.context_material,
        count = SUGGESTED_CRITERIA_COUNT,
    )
}

pub fn levels_prompt(request: &LevelsRequest) -> String {
    let criteria = request
        .criteria
        .iter()
        .map(|criterion| format!("{}: {}", criterion.title, criterion.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Context: University course \"{course}\", assignment \"{topic}\".\n\
         Rubric format: {kind}. {summary}\n\
         Scale: {scale} (from lowest to highest proficiency).\n\n\
         Additional Context: {context}\n\n\
         Task: For each of the following criteria, write a description for every performance \
         level. Descriptions must be specific, observable and clearly distinct between levels, \
         appropriate for university-level assessment. Use the scale labels exactly as given.\n\n\
         Criteria:\n{criteria}",
        course = request.course_name,
        topic = request.topic,
        kind = request.rubric_type.label(),
        summary = request.rubric_type.summary(),
        scale = request.scale.join(", "),
        context = request.context_material,
    )
}

/// Response schema: an array of `{title, description}`.
pub fn criteria_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "description": { "type": "STRING" }
            },
            "required": ["title", "description"]
        }
    })
}

/// Response schema: an array of `{criterionTitle, levels: [{levelName, description}]}`.
pub fn levels_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "criterionTitle": {
                    "type": "STRING",
                    "description": "Must match one of the provided criteria titles exactly"
                },
                "levels": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "levelName": { "type": "STRING" },
                            "description": { "type": "STRING" }
                        },
                        "required": ["levelName", "description"]
                    }
                }
            },
            "required": ["criterionTitle", "levels"]
        }
    })
}
