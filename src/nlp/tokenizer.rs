use regex::Regex;
use std::sync::OnceLock;

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+(?:['’]\w+)*|[^\w\s]").expect("分词正则无效"))
}

/// 切分为词和标点，标点各自成为一个词元
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    token_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// 只保留字母词，统一小写
#[must_use]
pub fn words_lowercase(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| t.chars().any(char::is_alphabetic))
        .map(|t| t.to_lowercase())
        .collect()
}
