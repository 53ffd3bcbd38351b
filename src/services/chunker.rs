//! 内容分块服务
//!
//! 按句子边界贪心装箱。长度只累计句子本身的字符数，不含拼接时的空格。

use crate::nlp::segmenter::split_sentences;

/// 把文本切成长度受限的分块
///
/// 加入下一句会超过 `max_length` 且当前块非空时先结束当前块。
/// 单句超过上限时独占一块。空文本返回空列表。
pub fn chunk_content(text: &str, max_length: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_length = 0;

    for sentence in split_sentences(text) {
        let length = sentence.chars().count();
        if current_length + length > max_length && !current.is_empty() {
            chunks.push(current.join(" "));
            current.clear();
            current_length = 0;
        }
        current.push(sentence);
        current_length += length;
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    chunks
}
