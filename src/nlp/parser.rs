//! 轻量句法分析
//!
//! 输出句子 → 词元（词形、原形、词性、依存标签）。
//! `HeuristicParser` 用词表和局部上下文规则近似词性与从句标签，
//! 实现 `LinguisticParser` 即可换成真正的依存分析器。

use phf::phf_set;

use crate::nlp::lemmatizer::Lemmatizer;
use crate::nlp::segmenter::split_sentences;
use crate::nlp::tokenizer::tokenize;

/// 词性（通用标签的子集）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pos {
    Verb,
    Aux,
    Noun,
    Det,
    Pron,
    Adp,
    Sconj,
    Cconj,
    Part,
    Num,
    Punct,
}

/// 依存标签。只区分特征提取关心的从句类标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dep {
    Root,
    /// 从句补足语
    Ccomp,
    /// 开放从句补足语
    Xcomp,
    /// 状语从句
    Advcl,
    /// 名词修饰从句
    Acl,
    /// 关系从句
    Relcl,
    Other,
}

impl Dep {
    /// 是否为从句类标签
    pub fn is_clausal(self) -> bool {
        matches!(self, Dep::Ccomp | Dep::Xcomp | Dep::Advcl | Dep::Acl | Dep::Relcl)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub lower: String,
    pub lemma: String,
    pub pos: Pos,
    pub dep: Dep,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSentence {
    pub text: String,
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDoc {
    pub sentences: Vec<ParsedSentence>,
}

impl ParsedDoc {
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.sentences.iter().flat_map(|s| s.tokens.iter())
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }
}

/// 句法分析器
pub trait LinguisticParser: Send + Sync {
    fn parse(&self, text: &str) -> ParsedDoc;
}

static DETERMINERS: phf::Set<&'static str> = phf_set! {
    "the", "a", "an", "this", "these", "those", "each", "every", "some", "any", "no",
    "its", "their", "his", "her", "our", "your", "my", "another", "such",
};

static PRONOUNS: phf::Set<&'static str> = phf_set! {
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "who", "whom",
    "whose", "which", "what", "that", "one", "someone", "everyone", "nobody", "something",
};

static AUXILIARIES: phf::Set<&'static str> = phf_set! {
    "be", "am", "is", "are", "was", "were", "been", "being", "have", "has", "had", "having",
    "do", "does", "did", "can", "could", "will", "would", "shall", "should", "may", "might",
    "must", "'s", "'re", "'ve", "'ll", "'d",
};

static ADPOSITIONS: phf::Set<&'static str> = phf_set! {
    "of", "in", "on", "at", "by", "for", "with", "from", "into", "about", "over", "under",
    "between", "through", "during", "without", "within", "against", "among", "across",
    "toward", "towards", "upon", "via", "per",
};

static SUBORDINATORS: phf::Set<&'static str> = phf_set! {
    "because", "although", "though", "while", "whereas", "if", "unless", "since", "when",
    "whenever", "where", "after", "before", "until", "once", "as",
};

static COORDINATORS: phf::Set<&'static str> = phf_set! {
    "and", "or", "but", "yet", "nor", "so",
};

static RELATIVE_PRONOUNS: phf::Set<&'static str> = phf_set! {
    "which", "who", "whom", "whose",
};

/// 基于规则的分析器
#[derive(Debug, Clone, Default)]
pub struct HeuristicParser {
    lemmatizer: Lemmatizer,
}

impl HeuristicParser {
    pub fn new(lemmatizer: Lemmatizer) -> Self {
        Self { lemmatizer }
    }

    fn tag(&self, words: &[String]) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::with_capacity(words.len());

        for (i, word) in words.iter().enumerate() {
            let lower = word.to_lowercase();
            let lemma = self.lemmatizer.lemmatize(&lower);
            let prev = tokens.last().map(|t: &Token| (t.pos, t.lower.as_str()));
            let next_lower = words.get(i + 1).map(|w| w.to_lowercase());

            let pos = if !lower.chars().any(char::is_alphanumeric) {
                Pos::Punct
            } else if lower.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
                Pos::Num
            } else if lower == "to" {
                let verb_follows = next_lower
                    .as_deref()
                    .map(|n| self.lemmatizer.is_known(&self.lemmatizer.lemmatize(n)))
                    .unwrap_or(false);
                if verb_follows {
                    Pos::Part
                } else {
                    Pos::Adp
                }
            } else if AUXILIARIES.contains(lower.as_str()) {
                Pos::Aux
            } else if DETERMINERS.contains(lower.as_str()) {
                Pos::Det
            } else if SUBORDINATORS.contains(lower.as_str()) {
                Pos::Sconj
            } else if COORDINATORS.contains(lower.as_str()) {
                Pos::Cconj
            } else if PRONOUNS.contains(lower.as_str()) {
                Pos::Pron
            } else if ADPOSITIONS.contains(lower.as_str()) {
                Pos::Adp
            } else if self.is_verb(&lower, &lemma, prev) {
                Pos::Verb
            } else {
                Pos::Noun
            };

            tokens.push(Token {
                text: word.clone(),
                lower,
                lemma,
                pos,
                dep: Dep::Other,
            });
        }

        tokens
    }

    fn is_verb(&self, lower: &str, lemma: &str, prev: Option<(Pos, &str)>) -> bool {
        let inflected = lower.ends_with("ed") || lower.ends_with("ing");
        let known = self.lemmatizer.is_known(lemma);

        match prev {
            // 句首祈使句
            None => known,
            Some((Pos::Det, _)) | Some((Pos::Adp, _)) => false,
            Some((Pos::Aux, _)) | Some((Pos::Part, _)) => known || inflected,
            Some((Pos::Pron, _)) | Some((Pos::Sconj, _)) | Some((Pos::Cconj, _)) => known,
            Some((Pos::Punct, _)) => known,
            Some((Pos::Noun, _)) => known && (inflected || !lower.ends_with("ion")),
            Some((Pos::Verb, _)) => known && inflected,
            Some((Pos::Num, _)) => false,
        }
    }
}

/// 给动词补上从句标签
fn label_clauses(tokens: &mut [Token]) {
    let mut pending: Option<Dep> = None;
    let mut has_root = false;

    for i in 0..tokens.len() {
        let prev_pos = if i > 0 { Some(tokens[i - 1].pos) } else { None };
        let tok = &tokens[i];

        match tok.pos {
            Pos::Sconj => pending = Some(Dep::Advcl),
            Pos::Pron if RELATIVE_PRONOUNS.contains(tok.lower.as_str()) && prev_pos.is_some() => {
                pending = Some(Dep::Relcl)
            }
            Pos::Pron if tok.lower == "that" => {
                pending = match prev_pos {
                    Some(Pos::Noun) => Some(Dep::Relcl),
                    Some(Pos::Verb) | Some(Pos::Aux) => Some(Dep::Ccomp),
                    _ => pending,
                }
            }
            Pos::Part => pending = Some(Dep::Xcomp),
            Pos::Verb => {
                let later_predicate = tokens[i + 1..]
                    .iter()
                    .any(|t| matches!(t.pos, Pos::Verb | Pos::Aux));
                let dep = if let Some(dep) = pending.take() {
                    dep
                } else if prev_pos == Some(Pos::Noun)
                    && (tok.lower.ends_with("ed") || tok.lower.ends_with("ing"))
                    && later_predicate
                {
                    Dep::Acl
                } else if !has_root {
                    has_root = true;
                    Dep::Root
                } else {
                    Dep::Other
                };
                tokens[i].dep = dep;
            }
            _ => {}
        }
    }
}

impl LinguisticParser for HeuristicParser {
    fn parse(&self, text: &str) -> ParsedDoc {
        let sentences = split_sentences(text)
            .into_iter()
            .map(|sentence| {
                let words = tokenize(&sentence);
                let mut tokens = self.tag(&words);
                label_clauses(&mut tokens);
                ParsedSentence {
                    text: sentence,
                    tokens,
                }
            })
            .collect();
        ParsedDoc { sentences }
    }
}
