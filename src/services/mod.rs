//! 业务能力层
//!
//! 每个文件一种能力，只处理单个文档 / 段落 / 分块，不关心流程顺序。

pub mod chunker;
pub mod classifier;
pub mod document_structurer;
pub mod embedding_classifier;
pub mod feature_extractor;
pub mod question_generator;
pub mod question_selector;
pub mod summarizer;

pub use chunker::chunk_content;
pub use classifier::{classify_or_default, CognitiveClassifier, RuleBasedClassifier};
pub use document_structurer::{extract_topic_tree, extract_with_fallback, structure_spans};
pub use embedding_classifier::EmbeddingClassifier;
pub use feature_extractor::FeatureExtractor;
pub use question_generator::{build_prompt, parse_questions, QuestionGenerator};
pub use question_selector::{calculate_target_counts, select_questions, select_questions_with_rng};
pub use summarizer::ExtractiveSummarizer;
