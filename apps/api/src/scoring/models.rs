use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MAX_STRENGTHS: usize = 5;
pub const MAX_WEAKNESSES: usize = 5;
pub const MAX_RECOMMENDATIONS: usize = 3;
pub const MAX_KEY_SKILLS: usize = 10;
pub const MAX_MISSING_SKILLS: usize = 5;

/// Resume-vs-job match. Same shape whether the model or the keyword fallback
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub score: u8,
    pub skills_match: u8,
    pub experience_match: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub key_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

const SCORE_FIELDS: &[&str] = &[
    "score",
    "skillsMatch",
    "experienceMatch",
    "strengths",
    "weaknesses",
    "recommendations",
    "keySkills",
    "missingSkills",
];

impl ScoreResult {
    /// Clamps percentages and truncates lists. `None` when the value is not an
    /// object or carries none of the expected fields.
    pub fn from_model_output(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if !SCORE_FIELDS.iter().any(|field| object.contains_key(*field)) {
            return None;
        }
        Some(Self {
            score: percentage(object.get("score")),
            skills_match: percentage(object.get("skillsMatch")),
            experience_match: percentage(object.get("experienceMatch")),
            strengths: string_list(object.get("strengths"), MAX_STRENGTHS),
            weaknesses: string_list(object.get("weaknesses"), MAX_WEAKNESSES),
            recommendations: string_list(object.get("recommendations"), MAX_RECOMMENDATIONS),
            key_skills: string_list(object.get("keySkills"), MAX_KEY_SKILLS),
            missing_skills: string_list(object.get("missingSkills"), MAX_MISSING_SKILLS),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
}

impl ExperienceLevel {
    fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "junior" => Some(Self::Junior),
            "mid" | "mid-level" | "intermediate" => Some(Self::Mid),
            "senior" => Some(Self::Senior),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub overall_score: u8,
    pub key_strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub skills_identified: Vec<String>,
    pub experience_level: ExperienceLevel,
    pub industry_fit: Vec<String>,
}

const INSIGHT_FIELDS: &[&str] = &[
    "overallScore",
    "keyStrengths",
    "improvementAreas",
    "skillsIdentified",
    "experienceLevel",
    "industryFit",
];

impl Insights {
    /// Same leniency as `ScoreResult::from_model_output`; an unrecognized
    /// experience level reads as `mid`.
    pub fn from_model_output(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if !INSIGHT_FIELDS.iter().any(|field| object.contains_key(*field)) {
            return None;
        }
        Some(Self {
            overall_score: percentage(object.get("overallScore")),
            key_strengths: string_list(object.get("keyStrengths"), usize::MAX),
            improvement_areas: string_list(object.get("improvementAreas"), usize::MAX),
            skills_identified: string_list(object.get("skillsIdentified"), usize::MAX),
            experience_level: object
                .get("experienceLevel")
                .and_then(Value::as_str)
                .and_then(ExperienceLevel::parse)
                .unwrap_or(ExperienceLevel::Mid),
            industry_fit: string_list(object.get("industryFit"), usize::MAX),
        })
    }
}

/// Numbers (or numeric strings) rounded into `[0, 100]`; anything else is 0.
fn percentage(value: Option<&Value>) -> u8 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => n.round().clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}

/// String entries of an array, capped at `max`. Non-arrays become empty.
fn string_list(value: Option<&Value>, max: usize) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .take(max)
                .collect()
        })
        .unwrap_or_default()
}
