// 服务层错误类型

use crate::models::SchemaError;
use futures_retry_policies::ShouldRetry;
use thiserror::Error;

/// 单次出题请求的错误
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Backend(#[from] reqwest::Error),

    #[error("LLM API error ({status}): {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("No response choices from LLM")]
    EmptyResponse,

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Failed to generate after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<GenerationError>,
    },
}

// 每种失败都重新请求一次，次数由退避策略限制
impl ShouldRetry for GenerationError {
    fn should_retry(&self, _: u32) -> bool {
        true
    }
}

/// 会话操作错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Question {index} does not exist (session has {len} questions)")]
    AnswerOutOfRange { index: usize, len: usize },
}

/// 导出结果错误
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_errors_are_retryable() {
        let errors = [
            GenerationError::EmptyResponse,
            GenerationError::Schema(SchemaError::MissingField("answer")),
            GenerationError::Status {
                status: reqwest::StatusCode::TOO_MANY_REQUESTS,
                body: "slow".to_string(),
            },
        ];
        for err in &errors {
            assert!(err.should_retry(0), "{err} should be retried");
        }
    }
}
