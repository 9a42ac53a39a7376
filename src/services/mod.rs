// 服务模块
// 提供核心业务逻辑服务

pub mod error;
pub mod export;
pub mod extract;
pub mod generator;
pub mod llm;
pub mod retry;
pub mod session;

pub use error::{ExportError, GenerationError, SessionError};

pub use export::{results_file_name, save_results, write_results, RESULTS_DIR};

pub use extract::clean_to_json;

pub use generator::{QuestionGenerator, QuestionPrompt, QuestionSource};

pub use llm::{ChatMessage, CompletionBackend, GroqClient, LlmConfig};

pub use retry::{retry_fixed, Exhausted, RetryPolicy};

pub use session::QuizSession;
