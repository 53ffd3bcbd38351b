//! 题目生成服务
//!
//! 一个分块 + 一个层级 → 一次文本生成调用 → 校验后的题目列表。
//!
//! 响应处理：
//! 1. 先把整段响应当作 JSON 解析，失败再截取第一个 `[` 到最后一个 `]`
//! 2. 缺少 type / question / answer、或题型无法识别的元素直接丢弃
//! 3. `YES_NO` 归一化为 `TRUE_FALSE`，答案映射为 "True" / "False"
//! 4. 没有 `type` 但带 options 的元素按早期的纯选择题格式处理

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clients::CompletionClient;
use crate::error::GenerationError;
use crate::models::{CognitiveLevel, GeneratedQuestion, PromptProfile, QuestionType, ResponseSchema};
use crate::utils::logging::truncate_text;

/// 按字符截断内容
pub fn truncate_content(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

/// 构建指令
pub fn build_prompt(profile: &PromptProfile, level: CognitiveLevel, content: &str) -> String {
    let guidance = profile.guidance_for(level);
    profile
        .template()
        .replace("{count}", &profile.questions_per_chunk.to_string())
        .replace("{level_name}", level.name())
        .replace("{level}", &level.code().to_string())
        .replace("{description}", &guidance.description)
        .replace("{guidance}", &guidance.guidance)
        .replace("{question_types}", &guidance.question_types.join(", "))
        .replace("{verbs}", &guidance.verbs.join(", "))
        .replace("{content}", content)
}

/// 在响应中定位 JSON 数组
fn locate_array(raw: &str) -> Result<Vec<Value>, GenerationError> {
    let trimmed = raw.trim();
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
        return Ok(items);
    }

    let start = trimmed.find('[');
    let end = trimmed.rfind(']');
    let (Some(start), Some(end)) = (start, end) else {
        return Err(GenerationError::NoJsonArray {
            preview: truncate_text(trimmed, 200),
        });
    };
    if end < start {
        return Err(GenerationError::NoJsonArray {
            preview: truncate_text(trimmed, 200),
        });
    }

    match serde_json::from_str::<Value>(&trimmed[start..=end]) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(GenerationError::NoJsonArray {
            preview: truncate_text(trimmed, 200),
        }),
        Err(source) => Err(GenerationError::JsonParseFailed { source }),
    }
}

/// 字符串、布尔、数字统一转成字符串
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn option_label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*[A-Da-d][).]\s+").expect("选项标号正则无效"))
}

fn yes_no_answer(answer: &str) -> &'static str {
    match answer.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" => "True",
        _ => "False",
    }
}

/// 校验并归一化单个元素，不合格返回 None
fn normalize_item(item: &Value, profile: &PromptProfile) -> Option<GeneratedQuestion> {
    let obj = item.as_object()?;
    let question = obj.get("question").and_then(coerce_text)?;
    let mut answer = obj.get("answer").and_then(coerce_text)?;

    let options: Option<Vec<String>> = obj.get("options").and_then(Value::as_array).map(|opts| {
        opts.iter()
            .filter_map(coerce_text)
            .map(|o| {
                if profile.strip_option_labels {
                    option_label_regex().replace(&o, "").to_string()
                } else {
                    o
                }
            })
            .collect()
    });

    let question_type = match obj.get("type").and_then(Value::as_str) {
        Some(tag) if tag.trim().eq_ignore_ascii_case("YES_NO") => {
            answer = yes_no_answer(&answer).to_string();
            QuestionType::TrueFalse
        }
        Some(tag) => QuestionType::from_tag(tag)?,
        // 早期仅选择题格式没有 type 字段；两种响应格式都接受，带 options 即视为选择题
        None if options.is_some() => QuestionType::Mcq,
        None => return None,
    };

    if profile.schema == ResponseSchema::McqOnly && question_type != QuestionType::Mcq {
        return None;
    }

    let options = match question_type {
        QuestionType::Mcq => Some(options.filter(|o| !o.is_empty())?),
        _ => None,
    };

    Some(GeneratedQuestion {
        question_type,
        question,
        answer,
        options,
    })
}

/// 解析响应文本
///
/// 找不到数组或 JSON 无法解析时返回错误；单个元素不合格只丢弃该元素。
pub fn parse_questions(
    raw: &str,
    profile: &PromptProfile,
) -> Result<Vec<GeneratedQuestion>, GenerationError> {
    let items = locate_array(raw)?;
    let total = items.len();
    let questions: Vec<GeneratedQuestion> = items
        .iter()
        .filter_map(|item| normalize_item(item, profile))
        .collect();

    if questions.len() < total {
        debug!("丢弃 {} 个不合格元素", total - questions.len());
    }
    Ok(questions)
}

/// 题目生成器
pub struct QuestionGenerator {
    client: Arc<dyn CompletionClient>,
    profile: Arc<PromptProfile>,
    max_content_chars: usize,
}

impl QuestionGenerator {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        profile: Arc<PromptProfile>,
        max_content_chars: usize,
    ) -> Self {
        Self {
            client,
            profile,
            max_content_chars,
        }
    }

    /// 为一个分块生成题目
    pub async fn generate(
        &self,
        chunk: &str,
        level: CognitiveLevel,
    ) -> Result<Vec<GeneratedQuestion>, GenerationError> {
        let content = truncate_content(chunk, self.max_content_chars);
        if content.len() < chunk.len() {
            info!("✂️ 内容截断到 {} 字符", self.max_content_chars);
        }

        let prompt = build_prompt(&self.profile, level, content);
        let raw = self.client.complete(&prompt).await?;
        debug!("原始响应: {}", truncate_text(&raw, 500));

        let questions = parse_questions(&raw, &self.profile).inspect_err(|e| {
            warn!("⚠️ 响应解析失败 ({}): {}", self.client.model_name(), e);
        })?;
        info!("📝 层级 {} 生成 {} 道题", level, questions.len());
        Ok(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedClient {
        response: String,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.response.clone())
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    #[test]
    fn test_yes_no_normalization() {
        let raw = r#"[
            {"type": "YES_NO", "question": "Is water wet?", "answer": "yes"},
            {"type": "YES_NO", "question": "Is fire cold?", "answer": "No"},
            {"type": "yes_no", "question": "Is ice solid?", "answer": "Y"}
        ]"#;
        let qs = parse_questions(raw, &PromptProfile::enriched()).unwrap();
        assert_eq!(qs.len(), 3);
        assert!(qs.iter().all(|q| q.question_type == QuestionType::TrueFalse));
        assert_eq!(qs[0].answer, "True");
        assert_eq!(qs[1].answer, "False");
        assert_eq!(qs[2].answer, "True");
    }

    #[test]
    fn test_invalid_elements_are_dropped() {
        let raw = r#"Here you go:
        [
            {"type": "MCQ", "question": "Q1?", "options": ["A) a", "B) b"], "answer": "A"},
            {"type": "MCQ", "question": "No options?", "answer": "A"},
            {"type": "ESSAY", "question": "Unknown type", "answer": "x"},
            {"question": "Missing answer"},
            {"type": "SHORT_ANSWER", "question": "Why?", "answer": "Because", "options": ["x"]},
            "not an object"
        ]
        Hope this helps."#;
        let qs = parse_questions(raw, &PromptProfile::enriched()).unwrap();
        assert_eq!(qs.len(), 2);
        assert_eq!(qs[0].options.as_deref().map(<[String]>::len), Some(2));
        assert_eq!(qs[1].question_type, QuestionType::ShortAnswer);
        assert!(qs[1].options.is_none());
    }

    #[test]
    fn test_answer_coercion() {
        let raw = r#"[
            {"type": "TRUE_FALSE", "question": "Sky is blue.", "answer": true},
            {"type": "SHORT_ANSWER", "question": "2+2?", "answer": 4}
        ]"#;
        let qs = parse_questions(raw, &PromptProfile::enriched()).unwrap();
        assert_eq!(qs[0].answer, "True");
        assert_eq!(qs[1].answer, "4");
    }

    #[test]
    fn test_legacy_mcq_shape_without_type() {
        let raw = r#"[{"question": "Pick one", "options": ["A) x", "B) y"], "answer": "B"}]"#;
        let mut profile = PromptProfile::mcq_only();
        profile.strip_option_labels = true;
        let qs = parse_questions(raw, &profile).unwrap();
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].question_type, QuestionType::Mcq);
        assert_eq!(qs[0].options, Some(vec!["x".to_string(), "y".to_string()]));
    }

    #[test]
    fn test_untyped_element_with_options_is_mcq_under_enriched_schema() {
        let raw = r#"[
            {"question": "Pick one", "options": ["x", "y"], "answer": "y"},
            {"question": "No type, no options", "answer": "z"}
        ]"#;
        let qs = parse_questions(raw, &PromptProfile::enriched()).unwrap();
        assert_eq!(qs.len(), 1);
        assert_eq!(qs[0].question_type, QuestionType::Mcq);
        assert_eq!(qs[0].answer, "y");
    }

    #[test]
    fn test_mcq_only_schema_drops_other_types() {
        let raw = r#"[
            {"type": "MCQ", "question": "Q?", "options": ["a", "b"], "answer": "a"},
            {"type": "TRUE_FALSE", "question": "T?", "answer": "True"}
        ]"#;
        let qs = parse_questions(raw, &PromptProfile::mcq_only()).unwrap();
        assert_eq!(qs.len(), 1);
    }

    #[test]
    fn test_no_array_and_bad_json_are_errors() {
        let profile = PromptProfile::enriched();
        assert!(matches!(
            parse_questions("I cannot help with that.", &profile),
            Err(GenerationError::NoJsonArray { .. })
        ));
        assert!(matches!(
            parse_questions("[{\"type\": MCQ}]", &profile),
            Err(GenerationError::JsonParseFailed { .. })
        ));
        assert!(matches!(
            parse_questions("] backwards [", &profile),
            Err(GenerationError::NoJsonArray { .. })
        ));
    }

    #[test]
    fn test_build_prompt_fills_placeholders() {
        let profile = PromptProfile::enriched();
        let prompt = build_prompt(&profile, CognitiveLevel::Analyze, "Some content.");
        assert!(prompt.contains("level 4 (Analyze)"));
        assert!(prompt.contains("Content: Some content."));
        assert!(prompt.contains("compare"));
        assert!(!prompt.contains("{content}"));
        assert!(!prompt.contains("{level"));
    }

    #[test]
    fn test_truncate_content_by_chars() {
        assert_eq!(truncate_content("héllo", 2), "hé");
        assert_eq!(truncate_content("abc", 10), "abc");
    }

    #[tokio::test]
    async fn test_generate_truncates_and_parses() {
        let client = Arc::new(ScriptedClient::new(
            r#"[{"type": "MCQ", "question": "Q?", "options": ["a", "b", "c", "d"], "answer": "a"}]"#,
        ));
        let generator =
            QuestionGenerator::new(client.clone(), Arc::new(PromptProfile::enriched()), 10);
        let qs = generator
            .generate("0123456789ABCDEF", CognitiveLevel::Remember)
            .await
            .unwrap();
        assert_eq!(qs.len(), 1);

        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0].contains("Content: 0123456789\n"));
        assert!(!prompts[0].contains("ABCDEF"));
    }
}
