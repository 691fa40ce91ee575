//! Prompt construction for the selection and evaluation calls.
//!
//! Prompts embed the caller's requirements and context as pretty-printed
//! JSON and spell out the exact reply schema. The pipeline tolerates replies
//! that ignore the schema, but a precise instruction keeps the extraction
//! path on its happy case.

use serde_json::Value;

use advisor_core::Candidate;

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Build the recommendation prompt.
///
/// The candidate slate is the ranked catalog, already capped by the caller;
/// the model is told to choose only from it.
pub fn selection_prompt(
    prompt: &str,
    requirements: &Value,
    context: &Value,
    candidates: &[Candidate],
) -> String {
    let slate = serde_json::to_string_pretty(candidates).unwrap_or_else(|_| "[]".to_string());
    format!(
        "You are a governance aware AI architect. A user needs help selecting a model.\n\
         Here is the user's prompt:\n{prompt}\n\n\
         They describe the business and compliance requirements as JSON:\n{requirements}\n\n\
         Here is contextual knowledge about the deployment:\n{context}\n\n\
         Return a JSON object with keys candidate_models, recommended_model, and governance_notes.\n\
         candidate_models must contain exactly 3 entries, each with keys model_id, model_name,\n\
         sample_prompt, reasoning, and policy_notes (array of strings).\n\
         recommended_model must have keys model_id, model_name, reasoning, and alignment.\n\
         governance_notes is an array of strings.\n\
         Only choose from the candidate models below:\n{slate}",
        prompt = prompt,
        requirements = pretty(requirements),
        context = pretty(context),
        slate = slate,
    )
}

/// Build the evaluation prompt for the judge call.
pub fn judge_prompt(prompt: &str, selection: &Value, context: &Value) -> String {
    format!(
        "You are an impartial compliance judge. Given the user's prompt, the selected models,\n\
         their reasoning, and compliance context, decide if the recommendation is safe.\n\
         Respond in JSON with keys verdict (approve|caution|reject),\n\
         risks (array of strings), suggestions (array of strings),\n\
         top_models (exactly 2 entries with model_id, model_name, rationale, and\n\
         relative_rank), and recommended_model (model_id, model_name, rationale).\n\n\
         Prompt:\n{prompt}\n\n\
         Model Selection:\n{selection}\n\n\
         Compliance Context:\n{context}",
        prompt = prompt,
        selection = pretty(selection),
        context = pretty(context),
    )
}
