// Prompt templates for resume scoring. Placeholders are filled with
// `str::replace`; inputs are sanitized before they reach here.

pub const SCORE_PROMPT: &str = r#"You are an expert HR analyst. Analyze the following resume against
the job requirements and provide a detailed assessment.

JOB REQUIREMENTS:
{job_text}

RESUME:
{resume_text}

Provide your analysis in the following JSON format:
{
  "score": <overall_match_percentage_0_to_100>,
  "skillsMatch": <skills_match_percentage_0_to_100>,
  "experienceMatch": <experience_match_percentage_0_to_100>,
  "strengths": [<list_of_candidate_strengths>],
  "weaknesses": [<list_of_areas_for_improvement>],
  "recommendations": [<list_of_hiring_recommendations>],
  "keySkills": [<list_of_relevant_skills_found>],
  "missingSkills": [<list_of_required_skills_not_found>]
}

Be objective and provide specific, actionable insights. Focus on technical skills,
experience relevance, and cultural fit indicators."#;

pub const INSIGHTS_PROMPT: &str = r#"Analyze this resume and provide insights in JSON format.

RESUME:
{resume_text}

Provide analysis in this JSON format:
{
  "overallScore": <score_0_to_100>,
  "keyStrengths": [<list_of_strengths>],
  "improvementAreas": [<list_of_areas_to_improve>],
  "skillsIdentified": [<list_of_technical_skills>],
  "experienceLevel": "<junior|mid|senior>",
  "industryFit": [<list_of_suitable_industries>]
}"#;

pub fn score_prompt(resume_text: &str, job_text: &str) -> String {
    // Each placeholder is filled exactly once so user text containing a
    // placeholder literal is never expanded.
    match SCORE_PROMPT.split_once("{resume_text}") {
        Some((head, tail)) => {
            let mut prompt = head.replacen("{job_text}", job_text, 1);
            prompt.push_str(resume_text);
            prompt.push_str(tail);
            prompt
        }
        None => SCORE_PROMPT.replacen("{job_text}", job_text, 1),
    }
}

pub fn insights_prompt(resume_text: &str) -> String {
    INSIGHTS_PROMPT.replacen("{resume_text}", resume_text, 1)
}
