//! 小节处理流程 - 流程层
//!
//! 核心职责：定义"一个小节"的完整处理流程
//!
//! 流程顺序：
//! 1. 过短小节直接跳过
//! 2. 聚类摘要（阻塞计算）
//! 3. 认知层级分类（阻塞计算，失败回退到默认层级）
//! 4. 按句分块
//! 5. 逐块调用 LLM 出题（单块失败只丢弃该块）

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{CognitiveLevel, FormattedQuestion};
use crate::services::{
    chunk_content, classify_or_default, CognitiveClassifier, ExtractiveSummarizer,
    QuestionGenerator,
};
use crate::utils::logging::truncate_text;
use crate::workflow::section_ctx::SectionCtx;

/// 小节被跳过的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 内容过短
    TooShort,
    /// 摘要后为空
    EmptySummary,
    /// 摘要计算失败
    SummarizeFailed,
}

/// 小节处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum SectionResult {
    /// 已出题（题目可能为空）
    Generated {
        level: CognitiveLevel,
        questions: Vec<FormattedQuestion>,
        failed_chunks: usize,
    },
    /// 跳过
    Skipped(SkipReason),
}

impl SectionResult {
    /// 取出题目，跳过的小节返回空列表
    pub fn into_questions(self) -> Vec<FormattedQuestion> {
        match self {
            SectionResult::Generated { questions, .. } => questions,
            SectionResult::Skipped(_) => Vec::new(),
        }
    }
}

/// 小节处理流程
///
/// - 编排单个小节的摘要、分类、分块、出题
/// - 只依赖业务能力（services），共享资源均为只读
pub struct SectionFlow {
    summarizer: Arc<ExtractiveSummarizer>,
    classifier: Arc<dyn CognitiveClassifier>,
    generator: QuestionGenerator,
    min_section_chars: usize,
    chunk_max_chars: usize,
}

impl SectionFlow {
    pub fn new(
        config: &Config,
        summarizer: Arc<ExtractiveSummarizer>,
        classifier: Arc<dyn CognitiveClassifier>,
        generator: QuestionGenerator,
    ) -> Self {
        Self {
            summarizer,
            classifier,
            generator,
            min_section_chars: config.min_section_chars,
            chunk_max_chars: config.chunk_max_chars,
        }
    }

    pub async fn run(&self, content: &str, ctx: &SectionCtx) -> SectionResult {
        let trimmed = content.trim();
        let length = trimmed.chars().count();
        if length < self.min_section_chars {
            warn!("{} ⏭️ 内容过短 ({} 字符)，跳过", ctx, length);
            return SectionResult::Skipped(SkipReason::TooShort);
        }

        // ========== 步骤 1: 摘要 ==========
        info!("{} 🧮 开始摘要 ({} 字符)", ctx, length);
        let summarizer = Arc::clone(&self.summarizer);
        let text = trimmed.to_string();
        let summary = match tokio::task::spawn_blocking(move || summarizer.condense(&text)).await
        {
            Ok(Ok(summary)) => summary,
            Ok(Err(e)) => {
                warn!("{} ⚠️ 摘要失败: {}", ctx, e);
                return SectionResult::Skipped(SkipReason::SummarizeFailed);
            }
            Err(e) => {
                warn!("{} ⚠️ 摘要任务异常: {}", ctx, e);
                return SectionResult::Skipped(SkipReason::SummarizeFailed);
            }
        };
        if summary.trim().is_empty() {
            warn!("{} ⏭️ 摘要为空，跳过", ctx);
            return SectionResult::Skipped(SkipReason::EmptySummary);
        }
        debug!("{} 摘要: {}", ctx, truncate_text(&summary, 200));

        // ========== 步骤 2: 分类 ==========
        let classifier = Arc::clone(&self.classifier);
        let passage = summary.clone();
        let level = match tokio::task::spawn_blocking(move || {
            classify_or_default(classifier.as_ref(), &passage)
        })
        .await
        {
            Ok(level) => level,
            Err(e) => {
                warn!("{} ⚠️ 分类任务异常，使用默认层级: {}", ctx, e);
                CognitiveLevel::FALLBACK
            }
        };
        info!(
            "{} 🧭 认知层级: {} ({})",
            ctx,
            level,
            self.classifier.strategy_name()
        );

        // ========== 步骤 3: 分块出题 ==========
        let chunks = chunk_content(&summary, self.chunk_max_chars);
        info!("{} 📦 分为 {} 块", ctx, chunks.len());

        let mut questions = Vec::new();
        let mut failed_chunks = 0;
        for (i, chunk) in chunks.iter().enumerate() {
            match self.generator.generate(chunk, level).await {
                Ok(generated) => {
                    questions.extend(generated.into_iter().map(|q| {
                        FormattedQuestion::new(q, level, &ctx.main_topic, &ctx.subtopic)
                    }));
                }
                Err(e) => {
                    failed_chunks += 1;
                    warn!("{} ⚠️ 第 {} 块出题失败，已跳过: {}", ctx, i + 1, e);
                }
            }
        }

        info!("{} ✅ 完成，共 {} 道题", ctx, questions.len());
        SectionResult::Generated {
            level,
            questions,
            failed_chunks,
        }
    }
}
