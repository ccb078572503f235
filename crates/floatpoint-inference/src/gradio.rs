//! Gradio space client.
//!
//! Each named endpoint is invoked with Gradio's two-step call protocol:
//!   POST {base}/gradio_api/call/{endpoint}              body {"data": [...]}  → {"event_id"}
//!   GET  {base}/gradio_api/call/{endpoint}/{event_id}   server-sent events
//! The event stream ends with `event: complete` (data = JSON array of outputs)
//! or `event: error`.

use async_trait::async_trait;
use floatpoint_common::BgcInput;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::backend::{InferenceBackend, InferenceError, LabelledValues, NlReply};

/// Endpoint names exposed by the space, without the leading slash.
#[derive(Debug, Clone)]
pub struct GradioEndpoints {
    pub nlp: String,
    pub bgc: String,
    pub spatial_temporal: String,
}

impl Default for GradioEndpoints {
    fn default() -> Self {
        Self {
            nlp: "process_nlp_query".to_string(),
            bgc: "predict_bgc".to_string(),
            spatial_temporal: "predict_spatial_temporal".to_string(),
        }
    }
}

pub struct GradioBackend {
    pub base_url: String,
    pub endpoints: GradioEndpoints,
    api_token: Option<SecretString>,
    client: reqwest::Client,
}

impl GradioBackend {
    /// One connection pool per backend; it is reused for every request.
    pub fn new(base_url: impl Into<String>, endpoints: GradioEndpoints) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            endpoints,
            api_token: None,
            client,
        })
    }

    /// Private spaces need a Hugging Face token.
    pub fn with_api_token(mut self, token: SecretString) -> Self {
        self.api_token = Some(token);
        self
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(t) => req.bearer_auth(t.expose_secret()),
            None => req,
        }
    }

    fn call_url(&self, endpoint: &str) -> String {
        format!("{}/gradio_api/call/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Run one endpoint and return its output array.
    #[instrument(skip(self, data), fields(space = %self.base_url))]
    async fn call(&self, endpoint: &str, data: Vec<Value>) -> Result<Vec<Value>, InferenceError> {
        let url = self.call_url(endpoint);

        let resp = self.auth(self.client.post(&url)).json(&json!({ "data": data })).send().await?;
        let body = check_response_status(resp).await?;
        let event_id = body["event_id"]
            .as_str()
            .ok_or_else(|| InferenceError::UnexpectedShape("call reply has no event_id".to_string()))?;
        debug!(event_id, "Gradio call queued");

        let resp = self.auth(self.client.get(format!("{url}/{event_id}"))).send().await?;
        let status = resp.status().as_u16();
        let stream = resp.text().await?;
        if status >= 400 {
            return Err(InferenceError::Api { status, message: error_message(&stream) });
        }
        parse_event_stream(&stream)
    }
}

#[async_trait]
impl InferenceBackend for GradioBackend {
    async fn process_nl_query(&self, text: &str) -> Result<NlReply, InferenceError> {
        let outputs = self.call(&self.endpoints.nlp, vec![json!(text)]).await?;
        let text = match outputs.into_iter().next() {
            Some(Value::String(s)) => s,
            Some(Value::Object(obj)) => match obj.get("text") {
                Some(Value::String(s)) => s.clone(),
                _ => return Err(InferenceError::UnexpectedShape("NLP reply object has no text".to_string())),
            },
            Some(other) => {
                return Err(InferenceError::UnexpectedShape(format!("NLP reply is not text: {other}")))
            }
            None => return Err(InferenceError::UnexpectedShape("NLP reply is empty".to_string())),
        };
        Ok(NlReply { text })
    }

    async fn predict_bgc(&self, input: &BgcInput) -> Result<LabelledValues, InferenceError> {
        // Positional: temperature, salinity, pressure, doxy, nitrate, chla.
        let data = vec![
            json!(input.temperature),
            json!(input.salinity),
            json!(input.pressure),
            json!(input.dissolved_oxygen),
            json!(input.nitrate),
            json!(input.chlorophyll),
        ];
        let outputs = self.call(&self.endpoints.bgc, data).await?;
        match outputs.into_iter().next() {
            Some(Value::Object(map)) => Ok(map),
            Some(Value::String(s)) => match serde_json::from_str::<Value>(&s) {
                Ok(Value::Object(map)) => Ok(map),
                _ => Err(InferenceError::UnexpectedShape("BGC reply is not a mapping".to_string())),
            },
            Some(_) => Err(InferenceError::UnexpectedShape("BGC reply is not a mapping".to_string())),
            None => Err(InferenceError::UnexpectedShape("BGC reply is empty".to_string())),
        }
    }

    async fn predict_spatial_temporal(
        &self,
        latitude: f64,
        longitude: f64,
        datetime: &str,
    ) -> Result<Value, InferenceError> {
        let data = vec![json!(latitude), json!(longitude), json!(datetime)];
        let mut outputs = self.call(&self.endpoints.spatial_temporal, data).await?;
        match outputs.len() {
            0 => Err(InferenceError::UnexpectedShape("spatial-temporal reply is empty".to_string())),
            1 => Ok(outputs.remove(0)),
            _ => Ok(Value::Array(outputs)),
        }
    }

    fn name(&self) -> &str {
        &self.base_url
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

async fn check_response_status(resp: reqwest::Response) -> Result<Value, InferenceError> {
    let status = resp.status().as_u16();
    let text = resp.text().await?;
    if status >= 400 {
        return Err(InferenceError::Api { status, message: error_message(&text) });
    }
    Ok(serde_json::from_str(&text)?)
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => json["error"]
            .as_str()
            .or_else(|| json["detail"].as_str())
            .or_else(|| json["message"].as_str())
            .unwrap_or("unknown API error")
            .to_string(),
        Err(_) if body.trim().is_empty() => "unknown API error".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// Pull the outputs out of a Gradio event stream.
pub(crate) fn parse_event_stream(stream: &str) -> Result<Vec<Value>, InferenceError> {
    let mut event = "";
    for line in stream.lines() {
        if let Some(name) = line.strip_prefix("event:") {
            event = name.trim();
            continue;
        }
        let Some(data) = line.strip_prefix("data:") else { continue };
        let data = data.trim();
        match event {
            "complete" => {
                return match serde_json::from_str::<Value>(data)? {
                    Value::Array(outputs) => Ok(outputs),
                    other => Ok(vec![other]),
                };
            }
            "error" => {
                let message = match serde_json::from_str::<Value>(data) {
                    Ok(Value::String(s)) => s,
                    Ok(Value::Null) => "the space reported an error without details".to_string(),
                    Ok(other) => other.to_string(),
                    Err(_) if data.is_empty() => "the space reported an error without details".to_string(),
                    Err(_) => data.to_string(),
                };
                warn!(%message, "Gradio error event");
                return Err(InferenceError::Remote(message));
            }
            _ => {}
        }
    }
    Err(InferenceError::UnexpectedShape("event stream ended without a result".to_string()))
}
