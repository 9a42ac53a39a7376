//! 题目与评测数据模型
//! 包括题目变体、评测结果、出题配置枚举，以及大模型 JSON 输出的结构校验

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 可选公司列表
pub const COMPANIES: &[&str] = &[
    "Accenture",
    "Amazon",
    "Capgemini",
    "Cognizant GenC",
    "CTS",
    "Deloitte",
    "Hexaware",
    "Saint Gobain",
    "TCS",
    "Wipro",
    "IBM",
    "Infosys",
    "Tech Mahindra",
];

/// 能力测试主题
pub const APTITUDE_TOPICS: &[&str] = &[
    "Quantitative Aptitude",
    "Data Interpretation",
    "Logical Reasoning",
    "Verbal Reasoning",
    "Non Verbal Reasoning",
];

/// 技术测试主题
pub const TECHNICAL_TOPICS: &[&str] = &[
    "Python",
    "C Programming",
    "C++ Programming",
    "Java Programming",
    "JavaScript",
    "SQL",
    "DSA",
    "DBMS",
    "Operating System",
    "Computer Network",
    "React",
    "Angular",
];

/// HR 面试轮次的固定主题
pub const INTERVIEW_TOPIC: &str = "Company Specific HR Interview";

/// 单次出题数量上下限
pub const MIN_QUESTIONS: usize = 1;
pub const MAX_QUESTIONS: usize = 10;
pub const DEFAULT_QUESTIONS: usize = 5;

/// 难度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// 不区分大小写解析
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown difficulty '{}', expected easy, medium or hard", s))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 练习轮次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundType {
    #[serde(rename = "Aptitude MCQs")]
    AptitudeMcqs,
    #[serde(rename = "Technical MCQs")]
    TechnicalMcqs,
    #[serde(rename = "Interview Qs")]
    InterviewQs,
}

impl RoundType {
    pub const ALL: [RoundType; 3] = [
        RoundType::AptitudeMcqs,
        RoundType::TechnicalMcqs,
        RoundType::InterviewQs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoundType::AptitudeMcqs => "Aptitude MCQs",
            RoundType::TechnicalMcqs => "Technical MCQs",
            RoundType::InterviewQs => "Interview Qs",
        }
    }

    /// 按显示名解析，不区分大小写
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// 面试轮次以外都是选择题
    pub fn is_mcq(&self) -> bool {
        !matches!(self, RoundType::InterviewQs)
    }

    /// 该轮次可选的主题
    pub fn topics(&self) -> &'static [&'static str] {
        match self {
            RoundType::AptitudeMcqs => APTITUDE_TOPICS,
            RoundType::TechnicalMcqs => TECHNICAL_TOPICS,
            RoundType::InterviewQs => &[INTERVIEW_TOPIC],
        }
    }
}

impl FromStr for RoundType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            let names: Vec<&str> = Self::ALL.iter().map(RoundType::as_str).collect();
            format!("unknown round '{}', expected one of: {}", s, names.join(", "))
        })
    }
}

impl fmt::Display for RoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次出题的配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSettings {
    pub company: String,
    pub round_type: RoundType,
    pub topic: String,
    pub difficulty: Difficulty,
    pub count: usize,
}

impl QuizSettings {
    /// 拼接提示词中的上下文，如 `Wipro | Technical MCQs | SQL`
    pub fn context(&self) -> String {
        format!("{} | {} | {}", self.company, self.round_type, self.topic)
    }
}

/// 题目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "MCQ")]
    Mcq,
    Interview,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::Interview => "Interview",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 选择题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// HR 面试问答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQa {
    pub question: String,
    pub answer: String,
}

/// 会话中保存的题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Question {
    #[serde(rename = "MCQ")]
    Mcq(McqQuestion),
    Interview(InterviewQa),
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        match self {
            Question::Mcq(_) => QuestionType::Mcq,
            Question::Interview(_) => QuestionType::Interview,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Question::Mcq(q) => &q.question,
            Question::Interview(q) => &q.question,
        }
    }

    pub fn options(&self) -> &[String] {
        match self {
            Question::Mcq(q) => &q.options,
            Question::Interview(_) => &[],
        }
    }

    /// 面试题没有标准选项答案，返回空串
    pub fn correct_answer(&self) -> &str {
        match self {
            Question::Mcq(q) => &q.correct_answer,
            Question::Interview(_) => "",
        }
    }
}

/// 单题评测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub question_number: usize,
    pub question_type: QuestionType,
    pub question: String,
    pub options: Vec<String>,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// 得分汇总
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub correct: usize,
    pub total: usize,
    pub percentage: f64,
}

impl ScoreSummary {
    pub fn from_results(results: &[EvaluationResult]) -> Self {
        let correct = results.iter().filter(|r| r.is_correct).count();
        let total = results.len();
        let percentage = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64 * 100.0
        };

        Self {
            correct,
            total,
            percentage,
        }
    }
}

impl fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score: {}/{} ({:.1}%)", self.correct, self.total, self.percentage)
    }
}

/// 大模型输出不符合结构要求
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("expected a JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` must be {expected}")]
    WrongShape {
        field: &'static str,
        expected: &'static str,
    },
}

/// 从 JSON 值解析并校验的结构
pub trait Schema: Sized {
    fn from_value(value: &Value) -> Result<Self, SchemaError>;
}

impl Schema for McqQuestion {
    fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let obj = value.as_object().ok_or(SchemaError::NotAnObject)?;

        // 模型偶尔把题干写成 {"description": "..."} 对象
        let question = match required(obj, "question")? {
            Value::Object(inner) => match inner.get("description") {
                Some(description) => any_text(description),
                None => any_text(&Value::Object(inner.clone())),
            },
            other => any_text(other),
        };

        let options = match required(obj, "options")? {
            Value::Array(items) => items
                .iter()
                .map(|item| scalar_text("options", item))
                .collect::<Result<Vec<_>, _>>()?,
            _ => {
                return Err(SchemaError::WrongShape {
                    field: "options",
                    expected: "an array of strings",
                })
            }
        };

        let correct_answer = scalar_text("correct_answer", required(obj, "correct_answer")?)?;

        Ok(Self {
            question,
            options,
            correct_answer,
        })
    }
}

impl Schema for InterviewQa {
    fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let obj = value.as_object().ok_or(SchemaError::NotAnObject)?;

        Ok(Self {
            question: scalar_text("question", required(obj, "question")?)?,
            answer: scalar_text("answer", required(obj, "answer")?)?,
        })
    }
}

fn required<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, SchemaError> {
    obj.get(field).ok_or(SchemaError::MissingField(field))
}

/// 题干接受任意值，非字符串写成 JSON 文本
fn any_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 字符串字段，数字和布尔值转成文本
fn scalar_text(field: &'static str, value: &Value) -> Result<String, SchemaError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(SchemaError::WrongShape {
            field,
            expected: "a string",
        }),
    }
}
