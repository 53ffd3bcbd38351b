//! 小节处理上下文
//!
//! 封装"我正在处理哪个主题下的哪个小节"这一信息

use std::fmt::Display;

use crate::utils::logging::truncate_text;

/// 小节处理上下文
#[derive(Debug, Clone)]
pub struct SectionCtx {
    /// 主题
    pub main_topic: String,

    /// 小节
    pub subtopic: String,

    /// 小节序号（从1开始，仅用于日志显示）
    pub section_index: usize,
}

impl SectionCtx {
    /// 创建新的小节上下文
    pub fn new(main_topic: String, subtopic: String, section_index: usize) -> Self {
        Self {
            main_topic,
            subtopic,
            section_index,
        }
    }
}

impl Display for SectionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[小节#{} {} / {}]",
            self.section_index,
            truncate_text(&self.main_topic, 30),
            truncate_text(&self.subtopic, 30)
        )
    }
}
