//! 出题客户端
//! 负责提示词工程、JSON 提取、结构校验与失败重试

use crate::models::{Difficulty, InterviewQa, McqQuestion, Schema};
use crate::services::error::GenerationError;
use crate::services::extract::clean_to_json;
use crate::services::llm::CompletionBackend;
use crate::services::retry::{retry_fixed, RetryPolicy};
use async_trait::async_trait;
use log::{debug, info};
use serde_json::Value;

/// 出题提示词
pub struct QuestionPrompt;

impl QuestionPrompt {
    /// 选择题，context 形如 `Wipro | Technical MCQs | SQL`
    pub fn mcq(context: &str, difficulty: Difficulty) -> String {
        format!(
            "Generate a {} level multiple-choice question for placement preparation.\n\
             Context: {}\n\
             - Ensure it matches the company/round/topic context.\n\
             - Provide exactly 4 distinct options.\n\
             - The correct_answer must be one of the options.\n\n\
             Return ONLY JSON with fields: question, options, correct_answer.\n\
             No extra text. No markdown fences.",
            difficulty, context
        )
    }

    /// 针对公司的 HR 面试问答
    pub fn interview_qa(company: &str) -> String {
        format!(
            r#"Act as an HR interviewer for {company} campus placements.
Generate ONE short, realistic HR interview question (6–18 words) and a concise professional answer (2–4 sentences).
Guidelines:
- HR/behavioral/situational/cultural-fit ONLY (no technical).
- Vary themes across calls: motivation for {company}, strengths/weaknesses, teamwork, leadership, conflict resolution,
  communication, career goals, relocation, work ethics, flexibility, learning mindset, salary expectations.
- Make the question feel specific to {company} (mention it when natural) and avoid long case studies.
- Keep answer crisp, polite, and tailored to {company}'s values (innovation, client-focus, learning, integrity, teamwork as applicable).
- Avoid clichés and avoid repeating common templates.

Return ONLY JSON with fields: question, answer.
No extra text. No markdown fences."#
        )
    }
}

/// 题目来源，会话管理器只依赖这个接口
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn generate_mcq(&self, context: &str, difficulty: Difficulty) -> Result<McqQuestion, GenerationError>;

    async fn generate_interview_qa(&self, company: &str) -> Result<InterviewQa, GenerationError>;
}

/// 基于大模型的出题器
pub struct QuestionGenerator<B> {
    backend: B,
    retry: RetryPolicy,
}

impl<B: CompletionBackend> QuestionGenerator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// 完整的一次尝试：补全 → 提取 → 解析 → 校验
    async fn attempt<T: Schema>(&self, prompt: &str) -> Result<T, GenerationError> {
        let raw = self.backend.complete(prompt).await?;
        let cleaned = clean_to_json(&raw);
        debug!("Extracted payload: {}", cleaned);

        let value: Value = serde_json::from_str(&cleaned)?;
        Ok(T::from_value(&value)?)
    }

    async fn request<T: Schema + Send>(&self, prompt: &str) -> Result<T, GenerationError> {
        retry_fixed(self.retry, |_| self.attempt::<T>(prompt))
            .await
            .map_err(|exhausted| GenerationError::Exhausted {
                attempts: exhausted.attempts,
                last: Box::new(exhausted.last),
            })
    }
}

#[async_trait]
impl<B: CompletionBackend> QuestionSource for QuestionGenerator<B> {
    async fn generate_mcq(&self, context: &str, difficulty: Difficulty) -> Result<McqQuestion, GenerationError> {
        info!("Generating {} MCQ for: {}", difficulty, context);
        self.request(&QuestionPrompt::mcq(context, difficulty)).await
    }

    async fn generate_interview_qa(&self, company: &str) -> Result<InterviewQa, GenerationError> {
        info!("Generating interview question for: {}", company);
        self.request(&QuestionPrompt::interview_qa(company)).await
    }
}
