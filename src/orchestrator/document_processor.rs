//! 单文档处理器 - 编排层
//!
//! ## 职责
//!
//! 把一篇文档拆成 (主题, 小节) 列表，并发执行每个小节的流程，汇总结果。
//!
//! ## 核心功能
//!
//! 1. **结构化**：PDF → 主题树，失败时退回扁平提取（阻塞计算）
//! 2. **并发控制**：Semaphore 限制同时处理的小节数
//! 3. **故障隔离**：单个小节的任务异常只跳过该小节
//! 4. **汇总**：题目池为空视为整篇失败；可选按层级配额抽题

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{PipelineResult, TopicTree};
use crate::services::{extract_with_fallback, select_questions};
use crate::workflow::{SectionCtx, SectionFlow, SectionResult};

/// 小节处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SectionStats {
    pub total: usize,
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failed_chunks: usize,
}

/// 单文档处理器
pub struct DocumentProcessor {
    flow: Arc<SectionFlow>,
    max_concurrent: usize,
    select_total: Option<usize>,
}

impl DocumentProcessor {
    pub fn new(flow: SectionFlow, config: &Config) -> Self {
        Self {
            flow: Arc::new(flow),
            max_concurrent: config.max_concurrent_sections.max(1),
            select_total: config.select_total,
        }
    }

    /// 处理一份 PDF 字节流
    pub async fn process(&self, bytes: Vec<u8>) -> AppResult<PipelineResult> {
        let tree = tokio::task::spawn_blocking(move || extract_with_fallback(&bytes))
            .await
            .map_err(|e| AppError::Other(format!("文档解析任务失败: {}", e)))??;

        info!("📚 解析出 {} 个主题", tree.topic_count());
        self.process_tree(tree).await
    }

    /// 处理已结构化的主题树
    pub async fn process_tree(&self, tree: TopicTree) -> AppResult<PipelineResult> {
        let topics: Vec<String> = tree.topics().map(str::to_string).collect();
        let sections = tree.into_sections();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut stats = SectionStats {
            total: sections.len(),
            ..Default::default()
        };

        info!(
            "🚀 开始处理 {} 个小节 (并发数: {})",
            stats.total, self.max_concurrent
        );

        let mut contexts = Vec::with_capacity(sections.len());
        let mut handles = Vec::with_capacity(sections.len());
        for (idx, section) in sections.into_iter().enumerate() {
            let ctx = SectionCtx::new(section.main_topic, section.subtopic, idx + 1);
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| AppError::Other(format!("并发控制失败: {}", e)))?;

            let flow = Arc::clone(&self.flow);
            let task_ctx = ctx.clone();
            let content = section.content;
            handles.push(tokio::spawn(async move {
                let _permit = permit;
                flow.run(&content, &task_ctx).await
            }));
            contexts.push(ctx);
        }

        // 按小节原顺序汇总
        let mut questions = Vec::new();
        for (ctx, joined) in contexts.iter().zip(join_all(handles).await) {
            match joined {
                Ok(SectionResult::Generated {
                    questions: produced,
                    failed_chunks,
                    ..
                }) => {
                    stats.generated += 1;
                    stats.failed_chunks += failed_chunks;
                    questions.extend(produced);
                }
                Ok(SectionResult::Skipped(_)) => stats.skipped += 1,
                Err(e) => {
                    error!("{} 任务执行失败: {}", ctx, e);
                    stats.failed += 1;
                }
            }
        }

        log_section_stats(&stats, questions.len());

        if questions.is_empty() {
            return Err(AppError::EmptyResult {
                sections: stats.total,
            });
        }

        if let Some(total) = self.select_total {
            let pool_size = questions.len();
            questions = select_questions(&questions, total);
            info!("🎯 按层级配额抽题: {} → {}", pool_size, questions.len());
        }

        Ok(PipelineResult::from_questions(
            questions,
            topics.iter().map(String::as_str),
        ))
    }
}

fn log_section_stats(stats: &SectionStats, question_count: usize) {
    info!(
        "📊 小节: 共 {} | 出题 {} | 跳过 {} | 异常 {}",
        stats.total, stats.generated, stats.skipped, stats.failed
    );
    if stats.failed_chunks > 0 {
        warn!("⚠️ 共有 {} 个分块出题失败", stats.failed_chunks);
    }
    info!("📝 题目池: {} 道", question_count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::CompletionClient;
    use crate::error::{ClassificationError, GenerationError};
    use crate::infrastructure::SentenceEncoder;
    use crate::models::{CognitiveLevel, PromptProfile};
    use crate::services::{CognitiveClassifier, ExtractiveSummarizer, QuestionGenerator};
    use async_trait::async_trait;

    struct ZeroEncoder;

    impl SentenceEncoder for ZeroEncoder {
        fn encode(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>, ClassificationError> {
            Ok(sentences.iter().map(|_| vec![0.0]).collect())
        }

        fn dimension(&self) -> usize {
            1
        }
    }

    struct ApplyClassifier;

    impl CognitiveClassifier for ApplyClassifier {
        fn classify(&self, _passage: &str) -> Result<CognitiveLevel, ClassificationError> {
            Ok(CognitiveLevel::Apply)
        }

        fn strategy_name(&self) -> &'static str {
            "apply"
        }
    }

    struct StaticClient(&'static str);

    #[async_trait]
    impl CompletionClient for StaticClient {
        async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
            Ok(self.0.to_string())
        }

        fn model_name(&self) -> &str {
            "static"
        }
    }

    const TWO_MCQ: &str = r#"[
        {"type":"MCQ","question":"Q1?","answer":"A","options":["A","B"]},
        {"type":"MCQ","question":"Q2?","answer":"B","options":["A","B"]}
    ]"#;

    fn processor(response: &'static str, select_total: Option<usize>) -> DocumentProcessor {
        let config = Config {
            select_total,
            max_concurrent_sections: 2,
            ..Config::default()
        };
        let generator = QuestionGenerator::new(
            Arc::new(StaticClient(response)),
            Arc::new(PromptProfile::default()),
            config.prompt_content_max_chars,
        );
        let flow = SectionFlow::new(
            &config,
            Arc::new(ExtractiveSummarizer::new(Arc::new(ZeroEncoder), 0.3)),
            Arc::new(ApplyClassifier),
            generator,
        );
        DocumentProcessor::new(flow, &config)
    }

    fn long_body(topic: &str) -> String {
        format!(
            "The first principle of {topic} describes how the parts interact with each other. \
             A second observation about {topic} explains why the results stay consistent."
        )
    }

    fn tree() -> TopicTree {
        let mut tree = TopicTree::new();
        tree.start_topic("Alpha");
        tree.append("Alpha", "One", &long_body("alpha"));
        tree.append("Alpha", "Two", "tiny");
        tree.start_topic("Beta");
        tree.append("Beta", "Three", &long_body("beta"));
        tree.start_topic("Gamma");
        tree
    }

    #[tokio::test]
    async fn test_aggregates_sections_in_order() {
        let result = processor(TWO_MCQ, None).process_tree(tree()).await.unwrap();
        assert_eq!(result.total_questions, 4);
        assert_eq!(result.questions[0].main_topic, "Alpha");
        assert_eq!(result.questions[3].main_topic, "Beta");
        assert_eq!(result.topic_breakdown["Alpha"], 2);
        assert_eq!(result.topic_breakdown["Beta"], 2);
        assert_eq!(result.topic_breakdown["Gamma"], 0);
    }

    #[tokio::test]
    async fn test_empty_pool_is_error() {
        let err = processor("no questions here", None)
            .process_tree(tree())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyResult { sections: 3 }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_selection_stage_limits_output() {
        let result = processor(TWO_MCQ, Some(10))
            .process_tree(tree())
            .await
            .unwrap();
        // 池中 4 道应用题，总数 10 时应用层级配额为 3
        assert_eq!(result.total_questions, 3);
        assert!(result
            .questions
            .iter()
            .all(|q| q.cognitive_level == CognitiveLevel::Apply));
    }
}
