//! 从大模型原始输出中提取 JSON 对象文本

use once_cell::sync::Lazy;
use regex::Regex;

static FENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^```(?:json)?\s*|\s*```$").expect("fence pattern is valid"));

/// 去掉首尾代码围栏，截取第一个 `{` 到最后一个 `}` 之间的内容
///
/// 找不到成对的花括号时原样返回去围栏后的文本，交给后续解析报错。
pub fn clean_to_json(text: &str) -> String {
    let trimmed = text.trim();
    let unfenced = FENCE_PATTERN.replace_all(trimmed, "");

    match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if end > start => unfenced[start..=end].to_string(),
        _ => unfenced.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{"question":"Q","options":["a","b","c","d"],"correct_answer":"a"}"#;

    #[test]
    fn test_fenced_json() {
        let raw = format!("```json\n{}\n```", PAYLOAD);
        assert_eq!(clean_to_json(&raw), PAYLOAD);
    }

    #[test]
    fn test_fence_tag_case_insensitive() {
        let raw = format!("```JSON\n{}\n```", PAYLOAD);
        assert_eq!(clean_to_json(&raw), PAYLOAD);

        let raw = format!("```\n{}\n```", PAYLOAD);
        assert_eq!(clean_to_json(&raw), PAYLOAD);
    }

    #[test]
    fn test_embedded_block_with_prose() {
        let raw = format!("Sure! Here is your question:\n{}\nGood luck with the interview.", PAYLOAD);
        assert_eq!(clean_to_json(&raw), PAYLOAD);
    }

    #[test]
    fn test_nested_braces_keep_outer_object() {
        let raw = r#"note {"question": {"description": "Q"}, "answer": "A"} end"#;
        assert_eq!(
            clean_to_json(raw),
            r#"{"question": {"description": "Q"}, "answer": "A"}"#
        );
    }

    #[test]
    fn test_no_braces_returns_trimmed_text() {
        assert_eq!(clean_to_json("  I cannot help with that.  "), "I cannot help with that.");
        assert_eq!(clean_to_json("} backwards {"), "} backwards {");
    }
}
