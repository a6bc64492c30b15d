//! FMEA generation through the OpenAI chat-completions API.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::AppError;
use crate::fmea::{FailureMode, FailureModeSource, FmeaReport, OperatingCharacteristics};

const BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";
const TEMPERATURE: f64 = 0.5;
const MAX_TOKENS: u32 = 4000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const SYSTEM_PROMPT: &str = r#"You are an expert electrical engineer specializing in reliability engineering for transmission and distribution assets.
Your task is to generate a comprehensive Failure Mode and Effects Analysis (FMEA) for the specified electrical asset type,
considering its operating characteristics.

For each failure mode:
1. Identify the potential causes
2. Describe the effects
3. Assess severity (1-10), occurrence (1-10), and detection (1-10) ratings
4. Calculate the RPN (Risk Priority Number = Severity x Occurrence x Detection)
5. Provide realistic Weibull distribution parameters (beta and eta) for each failure mode
6. Include Mean Time To Failure (MTTF) estimates

The Weibull beta parameter should reflect the failure pattern:
- beta < 1 for early failures/infant mortality
- beta = 1 for random failures
- beta > 1 for wear-out failures

The Weibull eta parameter should be the characteristic life in hours.

You must respond with valid JSON only, using the following structure:
{
    "failure_modes": [
        {
            "failure_mode": "string",
            "cause": "string",
            "effect": "string",
            "severity": number(1-10),
            "occurrence": number(1-10),
            "detection": number(1-10),
            "rpn": number,
            "weibull_beta": number,
            "weibull_eta": number,
            "mttf": number,
            "recommendations": "string"
        }
    ]
}"#;

pub struct OpenAiFmeaClient {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiFmeaClient {
    /// Build a client from `OPENAI_API_KEY` / `OPENAI_MODEL` (a `.env` file is honored).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AppError::new(2, "Missing OPENAI_API_KEY in environment (.env)."))?;
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(api_key, model)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    fn chat(&self, user_prompt: &str) -> Result<String, AppError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt },
            ],
            "response_format": { "type": "json_object" },
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        let resp = self
            .client
            .post(BASE_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| AppError::new(4, format!("OpenAI request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("OpenAI request failed with status {}.", resp.status()),
            ));
        }

        let parsed: ChatResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse OpenAI response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::new(4, "OpenAI response contained no message content."))
    }
}

impl FailureModeSource for OpenAiFmeaClient {
    fn name(&self) -> &str {
        "openai"
    }

    fn generate(
        &self,
        asset_type: &str,
        characteristics: &OperatingCharacteristics,
    ) -> Result<FmeaReport, AppError> {
        let prompt = user_prompt(asset_type, characteristics);
        debug!(model = %self.model, asset_type, "requesting FMEA");

        let content = self.chat(&prompt)?;
        let failure_modes = parse_failure_modes(&content)?;
        info!(asset_type, modes = failure_modes.len(), "received FMEA");

        Ok(FmeaReport {
            asset_type: asset_type.to_string(),
            characteristics: characteristics.clone(),
            failure_modes,
            source: format!("openai ({})", self.model),
        })
    }
}

pub fn user_prompt(asset_type: &str, characteristics: &OperatingCharacteristics) -> String {
    let lines: Vec<String> = characteristics
        .iter()
        .map(|(k, v)| format!("- {k}: {v}"))
        .collect();
    format!(
        "Generate an FMEA for a {asset_type} with the following operating characteristics:\n\n{}\n\n\
         Please provide realistic failure modes specific to this asset type and operating environment,\n\
         with appropriate severity, occurrence, detection ratings, and Weibull parameters.",
        lines.join("\n")
    )
}

/// Parse the model's JSON payload, filling in a missing RPN as `S × O × D`.
pub fn parse_failure_modes(content: &str) -> Result<Vec<FailureMode>, AppError> {
    let payload: FmeaPayload = serde_json::from_str(content)
        .map_err(|e| AppError::new(4, format!("OpenAI response is not a valid FMEA: {e}")))?;

    let modes = payload
        .failure_modes
        .ok_or_else(|| AppError::new(4, "OpenAI response missing 'failure_modes' field."))?;

    Ok(modes
        .into_iter()
        .map(|m| FailureMode {
            rpn: m.rpn.unwrap_or(m.severity * m.occurrence * m.detection),
            failure_mode: m.failure_mode,
            cause: m.cause,
            effect: m.effect,
            severity: m.severity,
            occurrence: m.occurrence,
            detection: m.detection,
            weibull_beta: m.weibull_beta,
            weibull_eta: m.weibull_eta,
            mttf: m.mttf.unwrap_or(f64::NAN),
            recommendations: m.recommendations,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FmeaPayload {
    failure_modes: Option<Vec<RawFailureMode>>,
}

#[derive(Debug, Deserialize)]
struct RawFailureMode {
    failure_mode: String,
    #[serde(default)]
    cause: String,
    #[serde(default)]
    effect: String,
    severity: u32,
    occurrence: u32,
    detection: u32,
    rpn: Option<u32>,
    weibull_beta: f64,
    weibull_eta: f64,
    mttf: Option<f64>,
    #[serde(default)]
    recommendations: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rpn_is_computed() {
        let content = r#"{"failure_modes": [{
            "failure_mode": "Bushing Failure", "cause": "moisture", "effect": "flashover",
            "severity": 7, "occurrence": 3, "detection": 4,
            "weibull_beta": 2.2, "weibull_eta": 120000, "mttf": 106000,
            "recommendations": "inspect"
        }]}"#;
        let modes = parse_failure_modes(content).unwrap();
        assert_eq!(modes.len(), 1);
        assert_eq!(modes[0].rpn, 84);
        assert_eq!(modes[0].weibull_eta, 120000.0);
    }

    #[test]
    fn missing_failure_modes_is_an_error() {
        let err = parse_failure_modes(r#"{"modes": []}"#).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.message().contains("failure_modes"));
        assert!(parse_failure_modes("not json").is_err());
    }

    #[test]
    fn prompt_lists_characteristics() {
        let mut c = OperatingCharacteristics::new();
        c.insert("Cooling Type".to_string(), "ONAF".to_string());
        let prompt = user_prompt("Power Transformer", &c);
        assert!(prompt.contains("Generate an FMEA for a Power Transformer"));
        assert!(prompt.contains("- Cooling Type: ONAF"));
    }

    #[test]
    fn model_override_replaces_env_default() {
        let client = OpenAiFmeaClient::new("test-key", DEFAULT_MODEL).unwrap().with_model("gpt-4o-mini");
        assert_eq!(client.model(), "gpt-4o-mini");
    }
}
