use super::OracleError;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

pub const COMPLETIONS_PATH: &str = "chat/completions";

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    api_base: String,
    api_key: String,
    timeout: Duration,
}

impl ChatClient {
    pub fn new(api_base: String, api_key: String, timeout: Duration) -> Self {
        Self {
            api_base,
            api_key,
            timeout,
        }
    }

    pub fn from_env(api_base: &str, timeout: Duration) -> Result<Self, OracleError> {
        let api_key = std::env::var("APPSEED_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| {
                std::env::var("OPENAI_API_KEY")
                    .ok()
                    .filter(|v| !v.trim().is_empty())
            })
            .ok_or(OracleError::MissingApiKey)?;
        Ok(Self::new(api_base.to_string(), api_key, timeout))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), path)
    }

    pub fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, OracleError> {
        let body = serde_json::json!({
            "model": model,
            "messages": messages,
        });
        let response = ureq::post(&self.endpoint(COMPLETIONS_PATH))
            .timeout(self.timeout)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(body);

        let value: Value = match response {
            Ok(response) => response
                .into_json()
                .map_err(|err| OracleError::Request(format!("invalid response body: {err}")))?,
            Err(ureq::Error::Status(code, response)) => {
                let value: Value = response.into_json().unwrap_or(Value::Null);
                return Err(api_status_error(code, &value));
            }
            Err(err) => return Err(OracleError::Request(err.to_string())),
        };
        parse_chat_completion(&value)
    }
}

pub fn parse_chat_completion(value: &Value) -> Result<String, OracleError> {
    if let Some(message) = value
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
    {
        return Err(OracleError::Api(message.to_string()));
    }

    value
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string)
        .ok_or_else(|| OracleError::Completion("response contained no completion text".to_string()))
}

fn api_status_error(code: u16, value: &Value) -> OracleError {
    let detail = value
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("http status {code}"));
    OracleError::Api(detail)
}
