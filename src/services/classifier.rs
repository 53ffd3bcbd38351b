//! 认知层级分类服务
//!
//! 两种可互换的策略共用 `CognitiveClassifier` 契约：
//! - `RuleBasedClassifier`：特征向量后 6 维取最大值
//! - `EmbeddingClassifier`：句向量 + 预训练分类器（见 `embedding_classifier`）
//!
//! 后 6 维之间没有归一化（一个动词可计入多个层级），最大值不是概率，只用于取层级。

use tracing::{debug, warn};

use crate::error::ClassificationError;
use crate::models::{CognitiveLevel, FeatureVector};
use crate::services::feature_extractor::FeatureExtractor;

/// 分类器契约
pub trait CognitiveClassifier: Send + Sync {
    fn classify(&self, passage: &str) -> Result<CognitiveLevel, ClassificationError>;

    /// 策略名，用于日志
    fn strategy_name(&self) -> &'static str;
}

/// 后 6 维取最大值，并列时取编号最小的层级。全为 0 时得到 Remember
pub fn level_from_densities(features: &FeatureVector) -> CognitiveLevel {
    let mut best = 0;
    for (i, density) in features.level_densities().iter().enumerate() {
        if *density > features.level_densities()[best] {
            best = i;
        }
    }
    CognitiveLevel::from_index(best).unwrap_or(CognitiveLevel::FALLBACK)
}

/// 规则分类器
#[derive(Clone)]
pub struct RuleBasedClassifier {
    extractor: FeatureExtractor,
}

impl RuleBasedClassifier {
    pub fn new(extractor: FeatureExtractor) -> Self {
        Self { extractor }
    }

    pub fn features(&self, passage: &str) -> FeatureVector {
        self.extractor.extract(passage)
    }
}

impl CognitiveClassifier for RuleBasedClassifier {
    fn classify(&self, passage: &str) -> Result<CognitiveLevel, ClassificationError> {
        if passage.trim().is_empty() {
            return Err(ClassificationError::EmptyPassage);
        }
        let features = self.features(passage);
        let level = level_from_densities(&features);
        debug!(
            "规则分类: {} → {}",
            serde_json::to_string(&features.report()).unwrap_or_default(),
            level
        );
        Ok(level)
    }

    fn strategy_name(&self) -> &'static str {
        "rule"
    }
}

/// 分类失败时退回 Understand，不中断流程
pub fn classify_or_default(classifier: &dyn CognitiveClassifier, passage: &str) -> CognitiveLevel {
    match classifier.classify(passage) {
        Ok(level) => level,
        Err(e) => {
            warn!(
                "⚠️ {} 分类失败，使用默认层级 {}: {}",
                classifier.strategy_name(),
                CognitiveLevel::FALLBACK,
                e
            );
            CognitiveLevel::FALLBACK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::{HeuristicParser, Lemmatizer, VerbTaxonomy};
    use std::sync::Arc;

    fn classifier() -> RuleBasedClassifier {
        let taxonomy = VerbTaxonomy::builtin();
        let lemmatizer = Lemmatizer::new().with_known(taxonomy.known_verbs());
        RuleBasedClassifier::new(FeatureExtractor::new(
            Arc::new(HeuristicParser::new(lemmatizer)),
            Arc::new(taxonomy),
        ))
    }

    struct FailingClassifier;

    impl CognitiveClassifier for FailingClassifier {
        fn classify(&self, _passage: &str) -> Result<CognitiveLevel, ClassificationError> {
            Err(ClassificationError::EmbeddingFailed("boom".to_string()))
        }

        fn strategy_name(&self) -> &'static str {
            "failing"
        }
    }

    #[test]
    fn test_argmax_first_wins_on_tie() {
        let fv = FeatureVector::new([0.0; 8], [0.0, 0.2, 0.2, 0.1, 0.0, 0.0]);
        assert_eq!(level_from_densities(&fv), CognitiveLevel::Understand);
        let zero = FeatureVector::new([0.0; 8], [0.0; 6]);
        assert_eq!(level_from_densities(&zero), CognitiveLevel::Remember);
    }

    #[test]
    fn test_rule_classifier_picks_dominant_level() {
        let c = classifier();
        let level = c
            .classify("Design a new experiment and formulate a hypothesis.")
            .unwrap();
        assert_eq!(level, CognitiveLevel::Create);
    }

    #[test]
    fn test_rule_classifier_is_deterministic() {
        let c = classifier();
        let text = "Evaluate the argument. Justify your position with evidence.";
        let first = c.classify(text).unwrap();
        for _ in 0..5 {
            assert_eq!(c.classify(text).unwrap(), first);
        }
    }

    #[test]
    fn test_empty_passage_errors_and_falls_back() {
        let c = classifier();
        assert!(matches!(
            c.classify("  "),
            Err(ClassificationError::EmptyPassage)
        ));
        assert_eq!(classify_or_default(&c, "  "), CognitiveLevel::Understand);
        assert_eq!(
            classify_or_default(&FailingClassifier, "anything"),
            CognitiveLevel::Understand
        );
    }
}
