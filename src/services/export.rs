//! 评测结果导出为 CSV

use crate::models::EvaluationResult;
use crate::services::error::ExportError;
use chrono::{DateTime, Local};
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// 默认导出目录
pub const RESULTS_DIR: &str = "results";

/// CSV 行，选项以 JSON 数组文本写入单元格
#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    question_number: usize,
    question_type: &'a str,
    question: &'a str,
    options: String,
    user_answer: &'a str,
    correct_answer: &'a str,
    is_correct: bool,
}

impl<'a> ResultRow<'a> {
    fn from_result(result: &'a EvaluationResult) -> Result<Self, ExportError> {
        Ok(Self {
            question_number: result.question_number,
            question_type: result.question_type.as_str(),
            question: &result.question,
            options: serde_json::to_string(&result.options)?,
            user_answer: &result.user_answer,
            correct_answer: &result.correct_answer,
            is_correct: result.is_correct,
        })
    }
}

/// `quiz_results_YYYYMMDD_HHMMSS.csv`
pub fn results_file_name(now: DateTime<Local>) -> String {
    format!("quiz_results_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// 写出表头和每条结果
pub fn write_results<W: Write>(writer: W, results: &[EvaluationResult]) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for result in results {
        csv_writer.serialize(ResultRow::from_result(result)?)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// 保存到 `dir` 下带时间戳的文件，没有结果时不创建任何文件
pub fn save_results(dir: &Path, results: &[EvaluationResult]) -> Result<Option<PathBuf>, ExportError> {
    if results.is_empty() {
        warn!("No results to save.");
        return Ok(None);
    }

    fs::create_dir_all(dir)?;
    let path = dir.join(results_file_name(Local::now()));
    let file = fs::File::create(&path)?;
    write_results(file, results)?;

    info!("Results saved to {}", path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionType;
    use chrono::TimeZone;

    fn sample() -> Vec<EvaluationResult> {
        vec![
            EvaluationResult {
                question_number: 1,
                question_type: QuestionType::Mcq,
                question: "Which is a DBMS?".to_string(),
                options: vec!["MySQL".to_string(), "Linux".to_string(), "Git".to_string(), "Vim".to_string()],
                user_answer: "MySQL".to_string(),
                correct_answer: "MySQL".to_string(),
                is_correct: true,
            },
            EvaluationResult {
                question_number: 2,
                question_type: QuestionType::Mcq,
                question: "Pick one, two".to_string(),
                options: vec!["a".to_string(), "b".to_string()],
                user_answer: String::new(),
                correct_answer: "b".to_string(),
                is_correct: false,
            },
        ]
    }

    #[test]
    fn test_results_file_name() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap();
        assert_eq!(results_file_name(now), "quiz_results_20240309_070502.csv");
    }

    #[test]
    fn test_write_results() {
        let mut buf = Vec::new();
        write_results(&mut buf, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "question_number,question_type,question,options,user_answer,correct_answer,is_correct"
        );
        assert_eq!(
            lines[1],
            r#"1,MCQ,Which is a DBMS?,"[""MySQL"",""Linux"",""Git"",""Vim""]",MySQL,MySQL,true"#
        );
        assert_eq!(lines[2], r#"2,MCQ,"Pick one, two","[""a"",""b""]",,b,false"#);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_save_results_creates_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join(RESULTS_DIR);

        let path = save_results(&dir, &sample()).unwrap().unwrap();
        assert!(path.starts_with(&dir));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("quiz_results_") && name.ends_with(".csv"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.records().count(), 2);
    }

    #[test]
    fn test_save_nothing() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join(RESULTS_DIR);

        assert!(save_results(&dir, &[]).unwrap().is_none());
        assert!(!dir.exists());
    }
}
