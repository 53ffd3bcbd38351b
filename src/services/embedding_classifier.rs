//! 句向量分类服务
//!
//! 段落 → 句向量 → 预训练多分类模型 → 层级。不使用工程特征。
//!
//! 模型产物为 JSON，离线训练后导出，两种形式：
//!
//! ```json
//! {"kind": "random_forest", "n_features": 384, "classes": [1,2,3,4,5,6],
//!  "trees": [{"nodes": [{"feature": 0, "threshold": 0.1, "left": 1, "right": 2},
//!                       {"value": [3, 1, 0, 0, 0, 0]}, {"value": [0, 2, 1, 0, 0, 0]}]}]}
//!
//! {"kind": "linear", "n_features": 384, "classes": [1,2,3,4,5,6],
//!  "weights": [[...], ...], "intercepts": [...]}
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ClassificationError;
use crate::infrastructure::SentenceEncoder;
use crate::models::CognitiveLevel;
use crate::services::classifier::CognitiveClassifier;

/// 决策树节点
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// 叶子上的类别分布（已归一化）
    fn leaf_distribution(&self, x: &[f64]) -> Option<Vec<f64>> {
        let mut idx = 0;
        // 节点数即最大深度上界，防止产物里出现环
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(idx)? {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x.get(*feature)? <= threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => {
                    let total: f64 = value.iter().sum();
                    if total <= 0.0 {
                        return Some(vec![0.0; value.len()]);
                    }
                    return Some(value.iter().map(|v| v / total).collect());
                }
            }
        }
        None
    }
}

/// 预训练分类模型
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ClassifierModel {
    RandomForest {
        n_features: usize,
        classes: Vec<i64>,
        trees: Vec<DecisionTree>,
    },
    Linear {
        n_features: usize,
        classes: Vec<i64>,
        weights: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
}

impl ClassifierModel {
    fn n_features(&self) -> usize {
        match self {
            ClassifierModel::RandomForest { n_features, .. }
            | ClassifierModel::Linear { n_features, .. } => *n_features,
        }
    }

    fn classes(&self) -> &[i64] {
        match self {
            ClassifierModel::RandomForest { classes, .. }
            | ClassifierModel::Linear { classes, .. } => classes,
        }
    }

    /// 结构校验，返回错误原因
    fn validate(&self) -> Result<(), String> {
        let n_classes = self.classes().len();
        if n_classes == 0 {
            return Err("classes 为空".to_string());
        }
        if let Some(bad) = self
            .classes()
            .iter()
            .find(|c| CognitiveLevel::from_code(**c).is_none())
        {
            return Err(format!("类别 {} 不在 1-6 之间", bad));
        }

        match self {
            ClassifierModel::RandomForest {
                n_features, trees, ..
            } => {
                if trees.is_empty() {
                    return Err("trees 为空".to_string());
                }
                for (t, tree) in trees.iter().enumerate() {
                    if tree.nodes.is_empty() {
                        return Err(format!("第 {} 棵树没有节点", t));
                    }
                    for node in &tree.nodes {
                        match node {
                            TreeNode::Split {
                                feature,
                                left,
                                right,
                                ..
                            } => {
                                if *feature >= *n_features
                                    || *left >= tree.nodes.len()
                                    || *right >= tree.nodes.len()
                                {
                                    return Err(format!("第 {} 棵树存在越界节点", t));
                                }
                            }
                            TreeNode::Leaf { value } => {
                                if value.len() != n_classes {
                                    return Err(format!(
                                        "第 {} 棵树叶子长度 {} 与类别数 {} 不一致",
                                        t,
                                        value.len(),
                                        n_classes
                                    ));
                                }
                            }
                        }
                    }
                }
            }
            ClassifierModel::Linear {
                n_features,
                weights,
                intercepts,
                ..
            } => {
                if weights.len() != n_classes || intercepts.len() != n_classes {
                    return Err("weights / intercepts 行数与类别数不一致".to_string());
                }
                if weights.iter().any(|row| row.len() != *n_features) {
                    return Err("weights 列数与 n_features 不一致".to_string());
                }
            }
        }
        Ok(())
    }

    /// 每个类别的得分
    fn scores(&self, x: &[f64]) -> Result<Vec<f64>, ClassificationError> {
        if x.len() != self.n_features() {
            return Err(ClassificationError::DimensionMismatch {
                expected: self.n_features(),
                actual: x.len(),
            });
        }

        match self {
            ClassifierModel::RandomForest { classes, trees, .. } => {
                let mut proba = vec![0.0; classes.len()];
                for tree in trees {
                    let dist = tree.leaf_distribution(x).ok_or_else(|| {
                        ClassificationError::EmbeddingFailed("决策树遍历失败".to_string())
                    })?;
                    for (p, d) in proba.iter_mut().zip(dist) {
                        *p += d;
                    }
                }
                let n = trees.len() as f64;
                Ok(proba.into_iter().map(|p| p / n).collect())
            }
            ClassifierModel::Linear {
                weights,
                intercepts,
                ..
            } => Ok(weights
                .iter()
                .zip(intercepts)
                .map(|(row, b)| row.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + b)
                .collect()),
        }
    }

    fn predict(&self, x: &[f64]) -> Result<CognitiveLevel, ClassificationError> {
        let scores = self.scores(x)?;
        let mut best = 0;
        for (i, s) in scores.iter().enumerate() {
            if *s > scores[best] {
                best = i;
            }
        }
        let code = self.classes()[best];
        CognitiveLevel::from_code(code).ok_or(ClassificationError::InvalidLevel(code))
    }
}

/// 句向量分类器
///
/// 编码器与模型在启动时加载一次，之后只读共享。
pub struct EmbeddingClassifier {
    encoder: Arc<dyn SentenceEncoder>,
    model: ClassifierModel,
}

impl EmbeddingClassifier {
    /// 从 JSON 字符串构建
    pub fn from_json(
        json: &str,
        encoder: Arc<dyn SentenceEncoder>,
        source: &str,
    ) -> Result<Self, ClassificationError> {
        let load_failed = |reason: String| ClassificationError::ModelLoadFailed {
            path: source.to_string(),
            reason,
        };

        let model: ClassifierModel =
            serde_json::from_str(json).map_err(|e| load_failed(e.to_string()))?;
        model.validate().map_err(load_failed)?;

        if model.n_features() != encoder.dimension() {
            return Err(load_failed(format!(
                "模型输入维度 {} 与句向量维度 {} 不一致",
                model.n_features(),
                encoder.dimension()
            )));
        }

        Ok(Self { encoder, model })
    }

    /// 从文件加载，文件不存在即失败
    pub fn load(
        path: impl AsRef<Path>,
        encoder: Arc<dyn SentenceEncoder>,
    ) -> Result<Self, ClassificationError> {
        let path = path.as_ref();
        let path_str = path.display().to_string();
        let json =
            std::fs::read_to_string(path).map_err(|e| ClassificationError::ModelLoadFailed {
                path: path_str.clone(),
                reason: e.to_string(),
            })?;

        let classifier = Self::from_json(&json, encoder, &path_str)?;
        info!(
            "✅ 分类模型已加载: {} ({} 类)",
            path_str,
            classifier.model.classes().len()
        );
        Ok(classifier)
    }

    /// 批量预测
    pub fn predict_levels(
        &self,
        passages: &[String],
    ) -> Result<Vec<CognitiveLevel>, ClassificationError> {
        if passages.iter().any(|p| p.trim().is_empty()) {
            return Err(ClassificationError::EmptyPassage);
        }
        let vectors = self.encoder.encode(passages)?;
        if vectors.len() != passages.len() {
            return Err(ClassificationError::EmbeddingFailed(format!(
                "输入 {} 条，得到 {} 个向量",
                passages.len(),
                vectors.len()
            )));
        }

        vectors
            .iter()
            .map(|v| {
                let x: Vec<f64> = v.iter().map(|f| f64::from(*f)).collect();
                self.model.predict(&x)
            })
            .collect()
    }
}

impl CognitiveClassifier for EmbeddingClassifier {
    fn classify(&self, passage: &str) -> Result<CognitiveLevel, ClassificationError> {
        let level = self
            .predict_levels(&[passage.to_string()])?
            .pop()
            .ok_or_else(|| ClassificationError::EmbeddingFailed("没有预测结果".to_string()))?;
        debug!("向量分类: {}", level);
        Ok(level)
    }

    fn strategy_name(&self) -> &'static str {
        "embedding"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// 前两维：文本长度、是否含 "design"
    struct ToyEncoder;

    impl SentenceEncoder for ToyEncoder {
        fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ClassificationError> {
            Ok(texts
                .iter()
                .map(|t| {
                    vec![
                        t.len() as f32,
                        if t.to_lowercase().contains("design") { 1.0 } else { 0.0 },
                    ]
                })
                .collect())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    const FOREST: &str = r#"{
        "kind": "random_forest",
        "n_features": 2,
        "classes": [1, 2, 6],
        "trees": [
            {"nodes": [
                {"feature": 1, "threshold": 0.5, "left": 1, "right": 2},
                {"value": [1, 3, 0]},
                {"value": [0, 0, 4]}
            ]},
            {"nodes": [
                {"feature": 0, "threshold": 10.0, "left": 1, "right": 2},
                {"value": [5, 0, 0]},
                {"value": [0, 1, 1]}
            ]}
        ]
    }"#;

    #[test]
    fn test_random_forest_prediction() {
        let c = EmbeddingClassifier::from_json(FOREST, Arc::new(ToyEncoder), "test").unwrap();
        assert_eq!(
            c.classify("We design a new bridge layout.").unwrap(),
            CognitiveLevel::Create
        );
        assert_eq!(
            c.classify("A long passage about facts.").unwrap(),
            CognitiveLevel::Understand
        );
        // 两棵树各投一票：tree1 → [0.25,0.75,0]，tree2 → [1,0,0]，平均后 Remember 胜出
        assert_eq!(c.classify("Short.").unwrap(), CognitiveLevel::Remember);
    }

    #[test]
    fn test_linear_prediction_and_batch() {
        let json = r#"{
            "kind": "linear",
            "n_features": 2,
            "classes": [3, 4],
            "weights": [[0.0, -1.0], [0.0, 1.0]],
            "intercepts": [0.1, 0.0]
        }"#;
        let c = EmbeddingClassifier::from_json(json, Arc::new(ToyEncoder), "test").unwrap();
        let levels = c
            .predict_levels(&["design it".to_string(), "use it".to_string()])
            .unwrap();
        assert_eq!(levels, vec![CognitiveLevel::Analyze, CognitiveLevel::Apply]);
    }

    #[test]
    fn test_invalid_artifacts_rejected() {
        let bad_class = FOREST.replace("[1, 2, 6]", "[1, 2, 7]");
        assert!(matches!(
            EmbeddingClassifier::from_json(&bad_class, Arc::new(ToyEncoder), "test"),
            Err(ClassificationError::ModelLoadFailed { .. })
        ));

        let bad_dim = FOREST.replace("\"n_features\": 2", "\"n_features\": 384");
        assert!(EmbeddingClassifier::from_json(&bad_dim, Arc::new(ToyEncoder), "test").is_err());

        assert!(EmbeddingClassifier::from_json("{}", Arc::new(ToyEncoder), "test").is_err());
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = EmbeddingClassifier::load("/nonexistent/model.json", Arc::new(ToyEncoder))
            .err()
            .unwrap();
        assert!(matches!(err, ClassificationError::ModelLoadFailed { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FOREST.as_bytes()).unwrap();
        let c = EmbeddingClassifier::load(file.path(), Arc::new(ToyEncoder)).unwrap();
        assert_eq!(c.strategy_name(), "embedding");
    }

    #[test]
    fn test_empty_passage_rejected() {
        let c = EmbeddingClassifier::from_json(FOREST, Arc::new(ToyEncoder), "test").unwrap();
        assert!(matches!(
            c.classify(" "),
            Err(ClassificationError::EmptyPassage)
        ));
    }
}
