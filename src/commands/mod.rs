// 命令模块
// 提供供前端调用的命令接口

pub mod quiz;

pub use quiz::{
    generate_quiz,
    list_companies,
    list_difficulties,
    list_round_types,
    list_topics,
    record_answer,
    save_results,
    submit_quiz,
    validate_settings,
    QuestionDto,
    QuizState,
    ScoreReportDto,
};
