use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{extract_json_object, GenerationParams, LlmError, TextGenerator};
use crate::scoring::fallback::{fallback_insights, fallback_score};
use crate::scoring::models::{Insights, ScoreResult};
use crate::scoring::prompts::{insights_prompt, score_prompt};

const INSIGHT_PARAMS: GenerationParams = GenerationParams {
    max_output_tokens: 1024,
    temperature: 0.2,
    top_p: None,
};

/// Why the model path was abandoned. Only ever logged.
#[derive(Debug, Error)]
enum ScoringUnavailable {
    #[error("model call failed: {0}")]
    Call(#[from] LlmError),

    #[error("reply contained no JSON object")]
    NoJson,

    #[error("reply JSON did not parse: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("reply JSON had an unexpected shape")]
    Shape,
}

/// Resume screening with graceful degradation: callers always get a result.
pub struct ScoringAdapter {
    generator: Arc<dyn TextGenerator>,
    scoring_params: GenerationParams,
    rng: Mutex<StdRng>,
}

impl ScoringAdapter {
    /// `seed` pins the fallback's random source; `None` seeds from entropy.
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        scoring_params: GenerationParams,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            generator,
            scoring_params,
            rng: Mutex::new(rng),
        }
    }

    pub async fn score(&self, resume_text: &str, job_text: &str) -> ScoreResult {
        match self.score_with_model(resume_text, job_text).await {
            Ok(result) => result,
            Err(reason) => {
                warn!("Scoring fell back to keyword overlap: {}", reason);
                let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                fallback_score(resume_text, job_text, &mut *rng)
            }
        }
    }

    pub async fn generate_insights(&self, resume_text: &str) -> Insights {
        match self.insights_with_model(resume_text).await {
            Ok(insights) => insights,
            Err(reason) => {
                warn!("Insights fell back to defaults: {}", reason);
                fallback_insights(resume_text)
            }
        }
    }

    /// Confirms a generator handle exists. Never makes a generation call.
    pub fn probe(&self) -> Result<String, LlmError> {
        self.generator.ready().map(str::to_owned)
    }

    async fn score_with_model(
        &self,
        resume_text: &str,
        job_text: &str,
    ) -> Result<ScoreResult, ScoringUnavailable> {
        let prompt = score_prompt(resume_text, job_text);
        let value = self.generate_json(&prompt, &self.scoring_params).await?;
        ScoreResult::from_model_output(&value).ok_or(ScoringUnavailable::Shape)
    }

    async fn insights_with_model(&self, resume_text: &str) -> Result<Insights, ScoringUnavailable> {
        let prompt = insights_prompt(resume_text);
        let value = self.generate_json(&prompt, &INSIGHT_PARAMS).await?;
        Insights::from_model_output(&value).ok_or(ScoringUnavailable::Shape)
    }

    async fn generate_json(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Value, ScoringUnavailable> {
        let reply = self.generator.generate(prompt, JSON_ONLY_SYSTEM, params).await?;
        let json = extract_json_object(&reply).ok_or(ScoringUnavailable::NoJson)?;
        debug!("Model reply carried {} bytes of JSON", json.len());
        Ok(serde_json::from_str(json)?)
    }
}
