//! 刷题命令模块
//! 供前端调用的出题、作答、交卷、保存接口，错误统一转成可直接展示的字符串

use crate::models::{
    Difficulty, EvaluationResult, Question, QuestionType, QuizSettings, RoundType, ScoreSummary, COMPANIES,
    MAX_QUESTIONS, MIN_QUESTIONS,
};
use crate::services::{QuestionSource, QuizSession};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 刷题状态
pub struct QuizState {
    pub session: Mutex<QuizSession>,
    pub source: Arc<dyn QuestionSource>,
    pub results_dir: PathBuf,
}

impl QuizState {
    pub fn new(source: Arc<dyn QuestionSource>, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            session: Mutex::new(QuizSession::new()),
            source,
            results_dir: results_dir.into(),
        }
    }
}

/// 题目 DTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDto {
    pub number: usize,
    pub question_type: QuestionType,
    pub question: String,
    pub options: Vec<String>,
    pub answer: Option<String>,
}

impl QuestionDto {
    fn from_question(index: usize, question: &Question) -> Self {
        Self {
            number: index + 1,
            question_type: question.question_type(),
            question: question.text().to_string(),
            options: question.options().to_vec(),
            answer: match question {
                Question::Interview(qa) => Some(qa.answer.clone()),
                Question::Mcq(_) => None,
            },
        }
    }
}

/// 交卷结果 DTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReportDto {
    pub score: ScoreSummary,
    pub results: Vec<EvaluationResult>,
}

/// 校验出题配置
pub fn validate_settings(settings: &QuizSettings) -> Result<(), String> {
    if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&settings.count) {
        return Err(format!(
            "Number of questions must be between {} and {}, got {}",
            MIN_QUESTIONS, MAX_QUESTIONS, settings.count
        ));
    }

    if settings.company.trim().is_empty() {
        return Err("Company must not be empty".to_string());
    }

    if !settings.round_type.topics().contains(&settings.topic.as_str()) {
        return Err(format!(
            "Topic '{}' is not available for {}",
            settings.topic, settings.round_type
        ));
    }

    Ok(())
}

/// 生成题目
pub async fn generate_quiz(state: &QuizState, settings: QuizSettings) -> Result<Vec<QuestionDto>, String> {
    validate_settings(&settings)?;

    let mut session = state.session.lock().await;
    let questions = session
        .generate(state.source.as_ref(), &settings)
        .await
        .map_err(|e| format!("Error generating questions: {}", e))?;

    Ok(questions
        .iter()
        .enumerate()
        .map(|(i, q)| QuestionDto::from_question(i, q))
        .collect())
}

/// 记录作答，`index` 从 0 开始
pub async fn record_answer(state: &QuizState, index: usize, answer: String) -> Result<(), String> {
    let mut session = state.session.lock().await;
    session.record_answer(index, answer).map_err(|e| e.to_string())
}

/// 交卷评分
pub async fn submit_quiz(state: &QuizState) -> Result<ScoreReportDto, String> {
    let mut session = state.session.lock().await;
    if session.questions().is_empty() {
        return Err("No questions to submit. Generate a quiz first.".to_string());
    }

    let results = session.evaluate().to_vec();
    Ok(ScoreReportDto {
        score: session.score(),
        results,
    })
}

/// 保存结果，没有结果时返回 `None`
pub async fn save_results(state: &QuizState) -> Result<Option<String>, String> {
    let session = state.session.lock().await;
    let path = session
        .export(&state.results_dir)
        .map_err(|e| format!("Failed to save results: {}", e))?;

    Ok(path.map(|p| p.display().to_string()))
}

/// 可选公司
pub fn list_companies() -> Vec<String> {
    COMPANIES.iter().map(|c| c.to_string()).collect()
}

/// 可选轮次
pub fn list_round_types() -> Vec<RoundType> {
    RoundType::ALL.to_vec()
}

/// 轮次下可选主题
pub fn list_topics(round_type: RoundType) -> Vec<String> {
    round_type.topics().iter().map(|t| t.to_string()).collect()
}

/// 可选难度，只对选择题轮次有意义
pub fn list_difficulties(round_type: RoundType) -> Vec<Difficulty> {
    if round_type.is_mcq() {
        Difficulty::ALL.to_vec()
    } else {
        Vec::new()
    }
}
