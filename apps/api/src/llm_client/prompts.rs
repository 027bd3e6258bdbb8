// Cross-cutting prompt fragments. Each caller keeps its own prompts.rs for
// task-specific templates.

/// System prompt that asks for a bare JSON object.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
