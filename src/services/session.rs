//! 刷题会话管理
//! 保存当前批次的题目、用户作答和评测结果，负责出题、评分与导出

use crate::models::{EvaluationResult, InterviewQa, McqQuestion, Question, QuizSettings, ScoreSummary};
use crate::services::error::{ExportError, SessionError};
use crate::services::export::save_results;
use crate::services::generator::QuestionSource;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// 面试题去重时每道题允许的尝试次数
const INTERVIEW_ATTEMPTS_PER_QUESTION: usize = 3;

/// 选择题最多保留的选项数
const MAX_OPTIONS: usize = 4;

/// 单用户刷题会话
#[derive(Debug)]
pub struct QuizSession {
    id: Uuid,
    questions: Vec<Question>,
    answers: HashMap<usize, String>,
    results: Vec<EvaluationResult>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            questions: Vec::new(),
            answers: HashMap::new(),
            results: Vec::new(),
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn results(&self) -> &[EvaluationResult] {
        &self.results
    }

    /// 按配置生成一批题目
    ///
    /// 任一次出题失败都会中止整批，已有的题目、作答和结果保持不变。
    pub async fn generate<S>(&mut self, source: &S, settings: &QuizSettings) -> Result<&[Question], SessionError>
    where
        S: QuestionSource + ?Sized,
    {
        info!(
            "[{}] Generating {} question(s): {}",
            self.id,
            settings.count,
            settings.context()
        );

        let batch = if settings.round_type.is_mcq() {
            Self::mcq_batch(source, settings).await
        } else {
            Self::interview_batch(source, settings).await
        };

        let batch = match batch {
            Ok(batch) => batch,
            Err(e) => {
                warn!("[{}] Error generating questions: {}", self.id, e);
                return Err(e);
            }
        };

        info!("[{}] Generated {} question(s)", self.id, batch.len());
        self.questions = batch;
        self.answers.clear();
        self.results.clear();
        Ok(&self.questions)
    }

    async fn mcq_batch<S>(source: &S, settings: &QuizSettings) -> Result<Vec<Question>, SessionError>
    where
        S: QuestionSource + ?Sized,
    {
        let context = settings.context();
        let mut batch = Vec::with_capacity(settings.count);

        for _ in 0..settings.count {
            let mcq = source.generate_mcq(&context, settings.difficulty).await?;
            batch.push(Question::Mcq(McqQuestion {
                question: mcq.question.trim().to_string(),
                options: mcq
                    .options
                    .iter()
                    .take(MAX_OPTIONS)
                    .map(|opt| opt.trim().to_string())
                    .collect(),
                correct_answer: mcq.correct_answer.trim().to_string(),
            }));
        }

        Ok(batch)
    }

    async fn interview_batch<S>(source: &S, settings: &QuizSettings) -> Result<Vec<Question>, SessionError>
    where
        S: QuestionSource + ?Sized,
    {
        let mut seen = HashSet::new();
        let mut batch = Vec::with_capacity(settings.count);

        for _ in 0..settings.count * INTERVIEW_ATTEMPTS_PER_QUESTION {
            if batch.len() >= settings.count {
                break;
            }

            let qa = source.generate_interview_qa(&settings.company).await?;
            let key = qa.question.trim().to_lowercase();
            if key.is_empty() || !seen.insert(key) {
                debug!("Skipping repeated interview question: {}", qa.question.trim());
                continue;
            }

            batch.push(Question::Interview(InterviewQa {
                question: qa.question.trim().to_string(),
                answer: qa.answer.trim().to_string(),
            }));
        }

        if batch.len() < settings.count {
            warn!(
                "Only {} unique interview question(s) out of {} requested",
                batch.len(),
                settings.count
            );
        }

        Ok(batch)
    }

    /// 记录第 `index` 题（从 0 开始）的作答
    pub fn record_answer(&mut self, index: usize, answer: impl Into<String>) -> Result<(), SessionError> {
        if index >= self.questions.len() {
            return Err(SessionError::AnswerOutOfRange {
                index,
                len: self.questions.len(),
            });
        }

        self.answers.insert(index, answer.into());
        Ok(())
    }

    #[cfg(test)]
    fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    /// 逐题比对作答，未作答按空串处理
    pub fn evaluate(&mut self) -> &[EvaluationResult] {
        self.results = self
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let user_answer = self.answers.get(&i).cloned().unwrap_or_default();
                let is_correct = user_answer == q.correct_answer();

                EvaluationResult {
                    question_number: i + 1,
                    question_type: q.question_type(),
                    question: q.text().to_string(),
                    options: q.options().to_vec(),
                    user_answer,
                    correct_answer: q.correct_answer().to_string(),
                    is_correct,
                }
            })
            .collect();

        &self.results
    }

    pub fn score(&self) -> ScoreSummary {
        ScoreSummary::from_results(&self.results)
    }

    /// 导出结果到 `dir`，没有结果时返回 `None`
    pub fn export(&self, dir: &Path) -> Result<Option<PathBuf>, ExportError> {
        save_results(dir, &self.results)
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}
