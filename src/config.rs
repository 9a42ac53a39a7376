//! 命令行与环境变量配置

use crate::models::{Difficulty, RoundType};
use crate::services::llm::{LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::services::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};
use crate::services::RESULTS_DIR;
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "placement-quiz", version, about = "Placement-oriented question generator")]
pub struct Cli {
    /// Groq API key
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: String,

    #[arg(long, env = "LLM_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, env = "LLM_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Attempts per question before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    #[arg(long, default_value_t = 800)]
    pub retry_delay_ms: u64,

    /// Round preselected in the menu, e.g. "Technical MCQs"
    #[arg(long)]
    pub round: Option<RoundType>,

    /// Difficulty preselected in the menu (easy, medium, hard)
    #[arg(long)]
    pub difficulty: Option<Difficulty>,

    /// Directory for exported CSV files
    #[arg(long, default_value = RESULTS_DIR)]
    pub results_dir: PathBuf,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}
