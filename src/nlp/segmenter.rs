use phf::phf_set;
use regex::Regex;
use std::sync::OnceLock;

/// 句末标点后不应断句的缩写（不含末尾的点）
static ABBREVIATIONS: phf::Set<&'static str> = phf_set! {
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e",
    "fig", "figs", "no", "vol", "inc", "ltd", "co", "corp", "approx", "dept", "est",
    "cf", "al", "ch", "sec", "eq", "p", "pp", "u.s", "u.k", "a.m", "p.m",
};

fn boundary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[.!?]+["'”’)\]]*\s+"#).expect("句子边界正则无效"))
}

/// 将文本切分为句子
///
/// 以 `.!?` 加空白作为候选边界，跳过缩写、单字母首字母缩写以及后面紧跟小写字母的位置。
/// 返回的句子已去掉首尾空白，且不为空。
#[must_use]
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in boundary_regex().find_iter(text) {
        let before = &text[start..m.start()];
        let after = &text[m.end()..];
        if !is_boundary(before, after) {
            continue;
        }
        push_trimmed(&mut sentences, &text[start..m.end()]);
        start = m.end();
    }
    push_trimmed(&mut sentences, &text[start..]);

    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

fn is_boundary(before: &str, after: &str) -> bool {
    match after.chars().next() {
        None => return true,
        Some(c) if c.is_lowercase() => return false,
        _ => {}
    }

    let last_word = before
        .split_whitespace()
        .last()
        .unwrap_or("")
        .trim_start_matches(['(', '"', '\'', '“', '‘'])
        .to_lowercase();

    if last_word.is_empty() {
        return true;
    }
    if ABBREVIATIONS.contains(last_word.as_str()) {
        return false;
    }
    // 人名首字母，如 "J. Smith"
    let mut chars = last_word.chars();
    !matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
}
