//! 文档结构化服务
//!
//! 按字号把版面文本片段整理成 主题 → 小节 → 正文：
//! - 字号（四舍五入）≥ 16：新主题，清空该主题下已有小节
//! - 字号 ∈ [14, 16)：新小节
//! - 其余：在主题和小节都已确定时追加到当前小节，否则丢弃
//!
//! 切换主题时当前小节名保持不变。

use tracing::{info, warn};

use crate::error::{AppResult, StructuringError};
use crate::infrastructure::pdf_layout::{read_spans, TextSpan};
use crate::models::TopicTree;

pub const MAIN_TOPIC_MIN_SIZE: i64 = 16;
pub const SUBTOPIC_MIN_SIZE: i64 = 14;

/// 把文本片段整理成主题树
pub fn structure_spans(spans: &[TextSpan]) -> TopicTree {
    let mut tree = TopicTree::new();
    let mut current_main: Option<&str> = None;
    let mut current_sub: Option<&str> = None;

    for span in spans {
        let text = span.text.trim();
        if text.is_empty() {
            continue;
        }
        let size = span.rounded_size();

        if size >= MAIN_TOPIC_MIN_SIZE {
            tree.start_topic(text);
            current_main = Some(text);
        } else if size >= SUBTOPIC_MIN_SIZE {
            current_sub = Some(text);
        } else if let (Some(main), Some(sub)) = (current_main, current_sub) {
            tree.append(main, sub, text);
        }
    }

    tree
}

/// 从 PDF 字节流提取主题树
///
/// 字节流无法解析时返回 `StructuringError`；没有任何标题时返回空树。
pub fn extract_topic_tree(bytes: &[u8]) -> AppResult<TopicTree> {
    let spans = read_spans(bytes)?;
    Ok(structure_spans(&spans))
}

/// 两阶段提取：先按字号结构化，结构为空时退回单个 ("General", "General") 桶
///
/// 连纯文本都没有时返回 `StructuringError::EmptyDocument`。
pub fn extract_with_fallback(bytes: &[u8]) -> AppResult<TopicTree> {
    let spans = read_spans(bytes)?;

    let tree = structure_spans(&spans);
    if !tree.is_empty() {
        info!("📑 结构化提取成功: {} 个主题", tree.topic_count());
        return Ok(tree);
    }

    let full_text = spans
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if full_text.is_empty() {
        return Err(StructuringError::EmptyDocument.into());
    }

    warn!("⚠️ 未识别到标题结构，退回全文提取 ({} 字符)", full_text.len());
    Ok(TopicTree::flat(full_text))
}
