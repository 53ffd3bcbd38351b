//! 提示词配置
//!
//! 指令模板与期望的响应格式都是配置，可以从 TOML 文件加载

use serde::{Deserialize, Serialize};

use crate::models::level::CognitiveLevel;

/// 期望的响应格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSchema {
    /// 多题型数组，带 `type` 字段，支持 YES_NO 归一化
    Enriched,
    /// 早期协议：只有选择题的数组
    McqOnly,
}

/// 单个层级的出题指引
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelGuidance {
    pub level: CognitiveLevel,
    pub description: String,
    pub guidance: String,
    #[serde(default)]
    pub question_types: Vec<String>,
    #[serde(default)]
    pub verbs: Vec<String>,
}

/// 提示词配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptProfile {
    pub schema: ResponseSchema,
    /// 每个分块要求生成的题目数
    pub questions_per_chunk: usize,
    /// 占位符: {count} {level} {level_name} {description} {guidance}
    /// {question_types} {verbs} {content}。缺省时按 `schema` 取内置模板
    pub template: Option<String>,
    /// 去掉选项前的 "A) " 之类的标号
    pub strip_option_labels: bool,
    pub levels: Vec<LevelGuidance>,
}

const ENRICHED_TEMPLATE: &str = r#"You are an experienced educator writing assessment questions.
Generate {count} questions based on the content below, targeting Bloom's taxonomy level {level} ({level_name}).

Level description: {description}
Guidance: {guidance}
Recommended question types: {question_types}
Prefer question stems built on verbs such as: {verbs}

Content: {content}

Format the response as a JSON array ONLY with no additional text.
Every element must have "type" (one of "MCQ", "TRUE_FALSE", "SHORT_ANSWER", "DESCRIPTIVE"), "question" and "answer".
Elements of type "MCQ" must also have "options" with exactly four entries.
Example:
[
  {
    "type": "MCQ",
    "question": "What is X?",
    "options": ["A) First", "B) Second", "C) Third", "D) Fourth"],
    "answer": "A"
  },
  {
    "type": "TRUE_FALSE",
    "question": "X always implies Y.",
    "answer": "False"
  }
]"#;

const MCQ_ONLY_TEMPLATE: &str = r#"Generate questions based on this content and Bloom's level {level}.

Content: {content}

Instructions: Generate {count} multiple choice questions focusing on Bloom's level {level}.
Format the response as a JSON array ONLY with no additional text.
Example:
[
  {
    "type": "MCQ",
    "question": "What is X?",
    "options": ["A) First", "B) Second", "C) Third", "D) Fourth"],
    "answer": "A"
  }
]"#;

fn guidance(
    level: CognitiveLevel,
    description: &str,
    guidance: &str,
    question_types: &[&str],
    verbs: &[&str],
) -> LevelGuidance {
    LevelGuidance {
        level,
        description: description.to_string(),
        guidance: guidance.to_string(),
        question_types: question_types.iter().map(|s| s.to_string()).collect(),
        verbs: verbs.iter().map(|s| s.to_string()).collect(),
    }
}

/// 内置的六个层级指引
pub fn default_level_guidance() -> Vec<LevelGuidance> {
    use CognitiveLevel::*;
    vec![
        guidance(
            Remember,
            "Retrieve relevant facts, terms and basic concepts from memory.",
            "Ask for definitions, names, dates and facts stated directly in the content.",
            &["MCQ", "TRUE_FALSE"],
            &["define", "list", "recall", "identify", "name"],
        ),
        guidance(
            Understand,
            "Construct meaning by explaining, summarizing or classifying ideas.",
            "Ask the learner to restate, explain or classify ideas in their own words.",
            &["MCQ", "TRUE_FALSE", "SHORT_ANSWER"],
            &["explain", "summarize", "describe", "classify"],
        ),
        guidance(
            Apply,
            "Use a procedure or concept in a given or new situation.",
            "Present a concrete scenario and ask how the concept or method is used in it.",
            &["MCQ", "SHORT_ANSWER"],
            &["apply", "demonstrate", "use"],
        ),
        guidance(
            Analyze,
            "Break material into parts and determine how the parts relate.",
            "Ask for comparisons, contrasts, causes and relationships between ideas.",
            &["MCQ", "SHORT_ANSWER", "DESCRIPTIVE"],
            &["analyze", "compare", "contrast"],
        ),
        guidance(
            Evaluate,
            "Make judgments based on criteria and standards.",
            "Ask the learner to assess, justify or critique a claim or approach from the content.",
            &["SHORT_ANSWER", "DESCRIPTIVE"],
            &["evaluate", "assess", "justify"],
        ),
        guidance(
            Create,
            "Put elements together to form a new, coherent whole or original product.",
            "Ask the learner to design, propose or formulate something new using the content.",
            &["DESCRIPTIVE", "SHORT_ANSWER"],
            &["create", "design", "formulate"],
        ),
    ]
}

impl Default for PromptProfile {
    fn default() -> Self {
        Self::enriched()
    }
}

impl PromptProfile {
    /// 多题型协议
    pub fn enriched() -> Self {
        Self {
            schema: ResponseSchema::Enriched,
            questions_per_chunk: 3,
            template: None,
            strip_option_labels: false,
            levels: default_level_guidance(),
        }
    }

    /// 早期只出选择题的协议
    pub fn mcq_only() -> Self {
        Self {
            schema: ResponseSchema::McqOnly,
            questions_per_chunk: 3,
            template: None,
            strip_option_labels: false,
            levels: default_level_guidance(),
        }
    }

    /// 实际使用的指令模板
    pub fn template(&self) -> &str {
        match (&self.template, self.schema) {
            (Some(t), _) => t,
            (None, ResponseSchema::Enriched) => ENRICHED_TEMPLATE,
            (None, ResponseSchema::McqOnly) => MCQ_ONLY_TEMPLATE,
        }
    }

    /// 查找层级指引，配置里缺失时退回内置值
    pub fn guidance_for(&self, level: CognitiveLevel) -> LevelGuidance {
        self.levels
            .iter()
            .find(|g| g.level == level)
            .cloned()
            .or_else(|| default_level_guidance().into_iter().find(|g| g.level == level))
            .unwrap_or_else(|| LevelGuidance {
                level,
                description: String::new(),
                guidance: String::new(),
                question_types: Vec::new(),
                verbs: Vec::new(),
            })
    }
}
