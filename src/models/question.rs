use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::level::CognitiveLevel;

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "MCQ")]
    Mcq,
    #[serde(rename = "TRUE_FALSE")]
    TrueFalse,
    #[serde(rename = "SHORT_ANSWER")]
    ShortAnswer,
    #[serde(rename = "DESCRIPTIVE")]
    Descriptive,
}

impl QuestionType {
    /// 从协议标记解析，`YES_NO` 不在此列（需单独归一化）
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_uppercase().as_str() {
            "MCQ" => Some(QuestionType::Mcq),
            "TRUE_FALSE" => Some(QuestionType::TrueFalse),
            "SHORT_ANSWER" => Some(QuestionType::ShortAnswer),
            "DESCRIPTIVE" => Some(QuestionType::Descriptive),
            _ => None,
        }
    }
}

/// LLM 生成的一道题（已通过结构校验）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    pub answer: String,
    /// 仅选择题有选项
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// 附带层级与主题信息的题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedQuestion {
    #[serde(flatten)]
    pub question: GeneratedQuestion,
    pub cognitive_level: CognitiveLevel,
    pub level_name: String,
    pub main_topic: String,
    pub subtopic: String,
}

impl FormattedQuestion {
    pub fn new(
        question: GeneratedQuestion,
        level: CognitiveLevel,
        main_topic: impl Into<String>,
        subtopic: impl Into<String>,
    ) -> Self {
        Self {
            question,
            cognitive_level: level,
            level_name: level.name().to_string(),
            main_topic: main_topic.into(),
            subtopic: subtopic.into(),
        }
    }
}

/// 流水线最终结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub questions: Vec<FormattedQuestion>,
    pub total_questions: usize,
    /// 主题 → 题目数量，数值为实际产出
    pub topic_breakdown: IndexMap<String, usize>,
}

impl PipelineResult {
    /// 由题目列表构建，`topics` 中的主题即使没有题目也会出现（计 0）
    pub fn from_questions<'a>(
        questions: Vec<FormattedQuestion>,
        topics: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut topic_breakdown: IndexMap<String, usize> =
            topics.into_iter().map(|t| (t.to_string(), 0)).collect();
        for q in &questions {
            *topic_breakdown.entry(q.main_topic.clone()).or_insert(0) += 1;
        }
        Self {
            total_questions: questions.len(),
            questions,
            topic_breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq() -> GeneratedQuestion {
        GeneratedQuestion {
            question_type: QuestionType::Mcq,
            question: "What is X?".to_string(),
            answer: "A".to_string(),
            options: Some(vec!["First".to_string(), "Second".to_string()]),
        }
    }

    #[test]
    fn test_formatted_question_json_shape() {
        let q = FormattedQuestion::new(mcq(), CognitiveLevel::Apply, "Topic A", "Sub 1");
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["type"], "MCQ");
        assert_eq!(value["question"], "What is X?");
        assert_eq!(value["cognitiveLevel"], 3);
        assert_eq!(value["levelName"], "Apply");
        assert_eq!(value["mainTopic"], "Topic A");
        assert_eq!(value["subtopic"], "Sub 1");
        assert!(value["options"].is_array());
    }

    #[test]
    fn test_options_omitted_when_absent() {
        let q = GeneratedQuestion {
            question_type: QuestionType::TrueFalse,
            question: "Q".to_string(),
            answer: "True".to_string(),
            options: None,
        };
        let value = serde_json::to_value(&q).unwrap();
        assert!(value.get("options").is_none());
        assert_eq!(value["type"], "TRUE_FALSE");
    }

    #[test]
    fn test_breakdown_counts() {
        let questions = vec![
            FormattedQuestion::new(mcq(), CognitiveLevel::Apply, "A", "s"),
            FormattedQuestion::new(mcq(), CognitiveLevel::Apply, "A", "s"),
        ];
        let result = PipelineResult::from_questions(questions, ["A", "B"]);
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.topic_breakdown["A"], 2);
        assert_eq!(result.topic_breakdown["B"], 0);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["totalQuestions"], 2);
        assert_eq!(json["topicBreakdown"]["A"], 2);
    }
}
