use serde::{Deserialize, Serialize};

use crate::models::level::CognitiveLevel;

/// 基础特征数量
pub const BASE_FEATURES: usize = 8;
/// 特征向量总长度
pub const FEATURE_LEN: usize = BASE_FEATURES + 6;

/// 段落的语言学特征向量（14 维）
///
/// 前 8 维为句法/词汇统计，后 6 维为各层级动词密度。
/// 一个动词可同时属于多个层级，所以后 6 维之和没有上界。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_LEN],
}

/// 带字段名的特征视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureReport {
    pub clause_count: f64,
    pub word_count: f64,
    pub sentence_count: f64,
    pub avg_sentence_length: f64,
    pub contrast_count: f64,
    pub argument_count: f64,
    pub contrast_density: f64,
    pub argument_markers: f64,
    pub bloom_features: Vec<f64>,
}

impl FeatureVector {
    pub fn new(base: [f64; BASE_FEATURES], level_densities: [f64; 6]) -> Self {
        let mut values = [0.0; FEATURE_LEN];
        values[..BASE_FEATURES].copy_from_slice(&base);
        values[BASE_FEATURES..].copy_from_slice(&level_densities);
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// 6 个层级的动词密度
    pub fn level_densities(&self) -> &[f64] {
        &self.values[BASE_FEATURES..]
    }

    pub fn density(&self, level: CognitiveLevel) -> f64 {
        self.values[BASE_FEATURES + level.index()]
    }

    pub fn report(&self) -> FeatureReport {
        let v = &self.values;
        FeatureReport {
            clause_count: v[0],
            word_count: v[1],
            sentence_count: v[2],
            avg_sentence_length: v[3],
            contrast_count: v[4],
            argument_count: v[5],
            contrast_density: v[6],
            argument_markers: v[7],
            bloom_features: self.level_densities().to_vec(),
        }
    }
}
