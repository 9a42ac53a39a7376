use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use placement_quiz::commands::{self, QuestionDto, QuizState, ScoreReportDto};
use placement_quiz::config::Cli;
use placement_quiz::models::{
    Difficulty, QuestionType, QuizSettings, RoundType, DEFAULT_QUESTIONS, MAX_QUESTIONS, MIN_QUESTIONS,
};
use placement_quiz::services::{GroqClient, QuestionGenerator};
use placement_quiz::utils;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// 一次输入的结果
enum Choice {
    Picked(usize),
    Skipped,
    Closed,
}

fn read_line(label: &str) -> io::Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// 读取 1..=len 的编号，空输入视为跳过
fn read_choice(label: &str, len: usize) -> io::Result<Choice> {
    loop {
        let Some(input) = read_line(label)? else {
            return Ok(Choice::Closed);
        };
        if input.is_empty() {
            return Ok(Choice::Skipped);
        }
        match input.parse::<usize>() {
            Ok(n) if (1..=len).contains(&n) => return Ok(Choice::Picked(n - 1)),
            _ => println!("Please enter a number between 1 and {}.", len),
        }
    }
}

/// 带默认值的菜单选择，返回 `None` 表示输入已关闭
fn select<T: Clone>(title: &str, items: &[T], default: usize, show: impl Fn(&T) -> String) -> io::Result<Option<T>> {
    println!("\n{}", title);
    for (i, item) in items.iter().enumerate() {
        let marker = if i == default { " (default)" } else { "" };
        println!("  {}. {}{}", i + 1, show(item), marker);
    }

    Ok(match read_choice("> ", items.len())? {
        Choice::Picked(i) => Some(items[i].clone()),
        Choice::Skipped => Some(items[default].clone()),
        Choice::Closed => None,
    })
}

fn confirm(label: &str) -> io::Result<bool> {
    let answer = read_line(&format!("{} [y/N] ", label))?.unwrap_or_default();
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

/// 预选项在列表中的位置，找不到时用 `fallback`
fn preset_index<T: PartialEq>(items: &[T], preset: Option<T>, fallback: usize) -> usize {
    preset
        .and_then(|p| items.iter().position(|item| *item == p))
        .unwrap_or(fallback)
}

/// 侧边栏配置：公司、轮次、主题、难度、题量
fn ask_settings(cli: &Cli) -> io::Result<Option<QuizSettings>> {
    let companies = commands::list_companies();
    let Some(company) = select("Select Company", &companies, 0, |c| c.clone())? else {
        return Ok(None);
    };

    let rounds = commands::list_round_types();
    let default_round = preset_index(&rounds, cli.round, 0);
    let Some(round_type) = select("Select Round", &rounds, default_round, |r| r.to_string())? else {
        return Ok(None);
    };

    let topics = commands::list_topics(round_type);
    let topic = if topics.len() == 1 {
        topics[0].clone()
    } else {
        match select("Select Topic", &topics, 0, |t| t.clone())? {
            Some(topic) => topic,
            None => return Ok(None),
        }
    };

    let difficulties = commands::list_difficulties(round_type);
    let difficulty = if difficulties.is_empty() {
        Difficulty::default()
    } else {
        let default_difficulty = preset_index(&difficulties, cli.difficulty, 1);
        match select("Difficulty Level", &difficulties, default_difficulty, |d| d.to_string())? {
            Some(difficulty) => difficulty,
            None => return Ok(None),
        }
    };

    let count = match read_choice(
        &format!(
            "\nNumber of Questions ({}-{}, default {}): ",
            MIN_QUESTIONS, MAX_QUESTIONS, DEFAULT_QUESTIONS
        ),
        MAX_QUESTIONS,
    )? {
        Choice::Picked(i) => i + 1,
        Choice::Skipped => DEFAULT_QUESTIONS,
        Choice::Closed => return Ok(None),
    };

    Ok(Some(QuizSettings {
        company,
        round_type,
        topic,
        difficulty,
        count,
    }))
}

/// 逐题作答，返回 false 表示输入已关闭
async fn attempt_quiz(state: &QuizState, questions: &[QuestionDto]) -> Result<bool> {
    for (i, q) in questions.iter().enumerate() {
        match q.question_type {
            QuestionType::Interview => {
                println!("\nInterview Question {}: {}", q.number, q.question);
                println!("  {}", q.answer.as_deref().unwrap_or_default());
            }
            QuestionType::Mcq => {
                println!("\nQuestion {}: {}", q.number, q.question);
                for (j, option) in q.options.iter().enumerate() {
                    println!("  {}. {}", j + 1, option);
                }

                let label = format!("Select an answer for Question {} (Enter to skip): ", q.number);
                match read_choice(&label, q.options.len())? {
                    Choice::Picked(j) => {
                        commands::record_answer(state, i, q.options[j].clone())
                            .await
                            .map_err(anyhow::Error::msg)?;
                    }
                    Choice::Skipped => {}
                    Choice::Closed => return Ok(false),
                }
            }
        }
        println!("---");
    }
    Ok(true)
}

fn show_report(report: &ScoreReportDto) {
    println!("\nQuiz Results");
    println!("{}", report.score);

    for row in &report.results {
        if row.is_correct {
            println!("✅ Q{}: {}", row.question_number, row.question);
        } else {
            println!("❌ Q{}: {}", row.question_number, row.question);
            println!("   Your Answer: {}", row.user_answer);
            println!("   Correct Answer: {}", row.correct_answer);
        }
        println!("---");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    utils::init_logger(cli.log_level, cli.log_file.as_deref()).context("Failed to initialize logger")?;
    info!(
        "placement-quiz v{} on {}, model {}",
        utils::get_app_version(),
        utils::get_platform(),
        cli.model
    );

    let generator = QuestionGenerator::new(GroqClient::new(cli.llm_config())).with_retry(cli.retry_policy());
    let state = QuizState::new(Arc::new(generator), cli.results_dir.clone());

    println!("Placement-Oriented Question Generator");

    loop {
        let Some(settings) = ask_settings(&cli)? else {
            break;
        };
        let round_type = settings.round_type;

        println!("\nGenerating questions...");
        let questions = match commands::generate_quiz(&state, settings).await {
            Ok(questions) if !questions.is_empty() => questions,
            Ok(_) => {
                println!("⚠️ Could not generate questions. Try again.");
                continue;
            }
            Err(e) => {
                println!("{}", e);
                println!("⚠️ Could not generate questions. Try again.");
                if confirm("Try again?")? {
                    continue;
                }
                break;
            }
        };

        if !attempt_quiz(&state, &questions).await? {
            break;
        }

        if round_type != RoundType::InterviewQs && confirm("Submit Quiz?")? {
            match commands::submit_quiz(&state).await {
                Ok(report) => {
                    show_report(&report);
                    if confirm("Save Results?")? {
                        match commands::save_results(&state).await {
                            Ok(Some(path)) => println!("Results saved to {}", path),
                            Ok(None) => println!("No results to save."),
                            Err(e) => println!("{}", e),
                        }
                    }
                }
                Err(e) => println!("{}", e),
            }
        }

        if !confirm("\nGenerate another quiz?")? {
            break;
        }
    }

    Ok(())
}
