//! 大模型推理服务模块
//! 通过 OpenAI 兼容的 chat completions 接口调用托管模型，返回原始文本

use crate::services::error::GenerationError;
use async_trait::async_trait;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_TEMPERATURE: f32 = 0.8;

/// 模型服务配置
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32, // 偏高，鼓励题目多样
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// 聊天消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String, // "system", "user", "assistant"
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Completion 请求
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    stream: bool,
}

/// Completion 响应
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// 文本补全后端
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// 提交一条提示词，返回模型生成的原始文本
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Groq 托管模型客户端
#[derive(Clone)]
pub struct GroqClient {
    config: LlmConfig,
    http_client: reqwest::Client,
}

impl GroqClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn build_request(&self, prompt: &str) -> CompletionRequest<'_> {
        CompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage::user(prompt)],
            temperature: self.config.temperature,
            stream: false,
        }
    }
}

/// 取第一个候选回复的文本
fn first_choice(response: CompletionResponse) -> Result<String, GenerationError> {
    if let Some(usage) = &response.usage {
        debug!(
            "Token usage - Prompt: {}, Completion: {}, Total: {}",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or(GenerationError::EmptyResponse)
}

#[async_trait]
impl CompletionBackend for GroqClient {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let start_time = Instant::now();
        info!("Sending completion request with model: {}", self.config.model);

        let response = self
            .http_client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&self.build_request(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("LLM API error ({}): {}", status, body);
            return Err(GenerationError::Status { status, body });
        }

        let text = first_choice(response.json::<CompletionResponse>().await?)?;
        info!(
            "Received completion in {} ms",
            start_time.elapsed().as_millis()
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// 本地单次应答的 HTTP 服务，返回 base_url 和收到的原始请求
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{}", addr), handle)
    }

    /// 请求头读完且 body 达到 Content-Length
    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    fn client_for(base_url: String) -> GroqClient {
        GroqClient::new(LlmConfig {
            api_key: "test-key".to_string(),
            base_url,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"{\"question\": \"Why Wipro?\"}"},"finish_reason":"stop"}],"usage":{"prompt_tokens":12,"completion_tokens":8,"total_tokens":20}}"#,
        )
        .await;

        let text = client_for(base_url).complete("Ask me something").await.unwrap();
        assert_eq!(text, r#"{"question": "Why Wipro?"}"#);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /chat/completions HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer test-key"));
        assert!(request.contains("Ask me something"));
    }

    #[tokio::test]
    async fn test_complete_reports_error_status() {
        let (base_url, server) = serve_once("429 Too Many Requests", "slow").await;

        let err = client_for(base_url).complete("Ask me something").await.unwrap_err();
        match &err {
            GenerationError::Status { status, body } => {
                assert_eq!(*status, reqwest::StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(body, "slow");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "LLM API error (429 Too Many Requests): slow");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_complete_without_choices_is_empty_response() {
        let (base_url, server) = serve_once("200 OK", r#"{"choices":[]}"#).await;

        let err = client_for(base_url).complete("Ask me something").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
        server.await.unwrap();
    }

    #[test]
    fn test_build_request() {
        let client = GroqClient::new(LlmConfig {
            api_key: "test-key".to_string(),
            ..Default::default()
        });

        let body = serde_json::to_value(client.build_request("Say hi")).unwrap();
        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Say hi");
        assert!((body["temperature"].as_f64().unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_completions_url_trims_slash() {
        let client = GroqClient::new(LlmConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..Default::default()
        });
        assert_eq!(client.completions_url(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_first_choice() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"question\": \"Q\"}"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
            }"#,
        )
        .unwrap();
        assert_eq!(first_choice(response).unwrap(), r#"{"question": "Q"}"#);

        let empty: CompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(first_choice(empty), Err(GenerationError::EmptyResponse)));
    }
}
