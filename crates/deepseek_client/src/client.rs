use crate::types::{ChatMessage, LlmError};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

const DEEPSEEK_API_URL: &str = "https://api.deepseek.com/chat/completions";

/// Chat-completions client with bounded retry on 429/timeout.
pub struct DeepSeekClient {
    client: Client,
    api_key: String,
    model: String,
    max_retries: u32,
}

impl DeepSeekClient {
    pub fn new(api_key: String, model: String, timeout_ms: u64, max_retries: u32) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("failed to build DeepSeek HTTP client");

        Self {
            client,
            api_key,
            model,
            max_retries,
        }
    }

    fn extract_content(response_body: &serde_json::Value) -> Result<&str, LlmError> {
        response_body
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(|content| content.as_str())
            .ok_or(LlmError::MissingContent)
    }

    /// Send one chat turn: system prompt, prior history, new user message.
    pub async fn chat(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(user_message));

        let payload = json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": 1024,
            "temperature": 0.7
        });

        let mut attempt = 0u32;
        loop {
            let send_result = self
                .client
                .post(DEEPSEEK_API_URL)
                .bearer_auth(&self.api_key)
                .header("content-type", "application/json")
                .json(&payload)
                .send()
                .await;

            match send_result {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        if status.as_u16() == 429 && attempt < self.max_retries {
                            attempt += 1;
                            sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                            continue;
                        }
                        return Err(LlmError::HttpStatus {
                            status: status.as_u16(),
                            body,
                        });
                    }

                    let response_body: serde_json::Value = response
                        .json()
                        .await
                        .map_err(|e| LlmError::Api(e.to_string()))?;
                    let content = Self::extract_content(&response_body)?;
                    debug!("DeepSeek returned {} chars", content.len());
                    return Ok(content.to_string());
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        attempt += 1;
                        sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                        continue;
                    }
                    if e.is_timeout() {
                        return Err(LlmError::Timeout);
                    }
                    return Err(LlmError::Api(e.to_string()));
                }
            }
        }
    }

    /// Ask for short insight lines over a data summary and split them out.
    pub async fn generate_insights(&self, data_summary: &str) -> Result<Vec<String>, LlmError> {
        let system_prompt = "You are an air-quality analyst for a city dashboard. \
            Given current readings, produce 3-5 short actionable insights, \
            one per line. Plain text only, no markdown, no numbering.";

        let content = self.chat(system_prompt, &[], data_summary).await?;
        Ok(split_insight_lines(&content))
    }
}

/// Split model output into clean insight lines, stripping list markers
/// the model sometimes adds anyway.
fn split_insight_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ')' )
                .trim_start_matches(['-', '*', '•'])
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "hello"}}]
        });
        assert_eq!(DeepSeekClient::extract_content(&body).unwrap(), "hello");
    }

    #[test]
    fn test_extract_content_missing() {
        let body = json!({"choices": []});
        assert!(matches!(
            DeepSeekClient::extract_content(&body),
            Err(LlmError::MissingContent)
        ));
    }

    #[test]
    fn test_split_insight_lines() {
        let content = "1. AQI rising in Delhi\n\n- Mask up in Beijing\n* Clear air in Sydney\n";
        let lines = split_insight_lines(content);
        assert_eq!(
            lines,
            vec![
                "AQI rising in Delhi",
                "Mask up in Beijing",
                "Clear air in Sydney"
            ]
        );
    }

    #[test]
    fn test_chat_message_roles() {
        assert_eq!(ChatMessage::system("x").role, "system");
        assert_eq!(ChatMessage::user("y").role, "user");
    }
}
