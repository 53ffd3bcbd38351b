//! 语言学特征提取服务
//!
//! 段落 → 14 维特征向量。句法分析器与动词词典都在启动时构建，这里只读使用。

use std::sync::Arc;

use crate::models::FeatureVector;
use crate::nlp::lexicon::{ARGUMENT_PATTERNS, CONTRAST_WORDS};
use crate::nlp::{LinguisticParser, ParsedDoc, Pos, VerbTaxonomy};

/// 特征提取器
///
/// 职责：
/// - 统计从句、词数、句数、转折与论证标记
/// - 按动词词典统计各层级动词密度
/// - 不做分类判断
#[derive(Clone)]
pub struct FeatureExtractor {
    parser: Arc<dyn LinguisticParser>,
    taxonomy: Arc<VerbTaxonomy>,
}

/// 逐句累加的计数
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct SentenceCounts {
    clauses: usize,
    words: usize,
    contrasts: usize,
    arguments: usize,
}

impl FeatureExtractor {
    pub fn new(parser: Arc<dyn LinguisticParser>, taxonomy: Arc<VerbTaxonomy>) -> Self {
        Self { parser, taxonomy }
    }

    /// 提取特征向量
    ///
    /// 空段落得到全零向量，是否接受由调用方决定。
    pub fn extract(&self, passage: &str) -> FeatureVector {
        let doc = self.parser.parse(passage);
        let counts = self.sentence_counts(&doc);
        let sentence_count = doc.sentence_count();
        let sentence_norm = sentence_count.max(1) as f64;
        let word_norm = counts.words.max(1) as f64;

        let contrast_tokens = doc
            .tokens()
            .filter(|t| CONTRAST_WORDS.contains(&t.lower.as_str()))
            .count();
        let lowered = passage.to_lowercase();
        let markers_present = ARGUMENT_PATTERNS
            .iter()
            .filter(|p| lowered.contains(*p))
            .count();

        let base = [
            counts.clauses as f64,
            counts.words as f64,
            sentence_count as f64,
            counts.words as f64 / sentence_norm,
            counts.contrasts as f64,
            counts.arguments as f64,
            contrast_tokens as f64 / sentence_norm,
            markers_present as f64 / sentence_norm,
        ];

        let level_counts = self.level_counts(&doc);
        let mut densities = [0.0; 6];
        for (density, count) in densities.iter_mut().zip(level_counts) {
            *density = count as f64 / word_norm;
        }

        FeatureVector::new(base, densities)
    }

    fn sentence_counts(&self, doc: &ParsedDoc) -> SentenceCounts {
        let mut counts = SentenceCounts::default();

        for sentence in &doc.sentences {
            let lowered = sentence.text.to_lowercase();

            counts.words += sentence.tokens.len();
            counts.clauses += 1 + sentence.tokens.iter().filter(|t| t.dep.is_clausal()).count();
            counts.arguments += sentence
                .tokens
                .iter()
                .filter(|t| self.taxonomy.is_argument_verb(&t.lemma))
                .count();

            if CONTRAST_WORDS.iter().any(|w| lowered.contains(w)) {
                counts.contrasts += 1;
            }
            if ARGUMENT_PATTERNS.iter().any(|p| lowered.contains(p)) {
                counts.arguments += 1;
            }
        }

        counts
    }

    /// 各层级命中的动词数。一个动词可以同时计入多个层级
    pub fn level_counts(&self, doc: &ParsedDoc) -> [usize; 6] {
        let mut counts = [0usize; 6];
        for token in doc.tokens().filter(|t| t.pos == Pos::Verb) {
            if let Some(levels) = self.taxonomy.levels_for(&token.lemma) {
                for level in levels {
                    counts[level.index()] += 1;
                }
            }
        }
        counts
    }
}
