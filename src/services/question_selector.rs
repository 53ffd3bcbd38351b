//! 按层级配额抽题
//!
//! 目标比例 {1:15%, 2:25%, 3:25%, 4:20%, 5:10%, 6:5%}。取整后的余数依次补给层级 2、3、4，
//! 每个层级最多补 1 题，补一轮为止，所以总数较大时目标之和可能小于 `total`。

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::models::{CognitiveLevel, FormattedQuestion};

/// 默认抽题总数
pub const DEFAULT_TOTAL: usize = 10;

/// 各层级目标百分比
pub const TARGET_PERCENTAGES: [(CognitiveLevel, usize); 6] = [
    (CognitiveLevel::Remember, 15),
    (CognitiveLevel::Understand, 25),
    (CognitiveLevel::Apply, 25),
    (CognitiveLevel::Analyze, 20),
    (CognitiveLevel::Evaluate, 10),
    (CognitiveLevel::Create, 5),
];

/// 余数补给顺序
const REMAINDER_LEVELS: [CognitiveLevel; 3] = [
    CognitiveLevel::Understand,
    CognitiveLevel::Apply,
    CognitiveLevel::Analyze,
];

/// 计算各层级目标题数（按层级升序）
pub fn calculate_target_counts(total: usize) -> BTreeMap<CognitiveLevel, usize> {
    let mut counts: BTreeMap<CognitiveLevel, usize> = TARGET_PERCENTAGES
        .iter()
        .map(|(level, pct)| (*level, total * pct / 100))
        .collect();

    let mut assigned: usize = counts.values().sum();
    for level in REMAINDER_LEVELS {
        if assigned >= total {
            break;
        }
        *counts.entry(level).or_insert(0) += 1;
        assigned += 1;
    }

    counts
}

/// 按配额随机抽题
pub fn select_questions(pool: &[FormattedQuestion], total: usize) -> Vec<FormattedQuestion> {
    select_questions_with_rng(pool, total, &mut rand::thread_rng())
}

/// 按配额抽题，随机源由调用方提供
///
/// 每个层级最多抽 `min(目标, 可用)` 题，不足部分不从其他层级补。
/// 输出按层级升序排列。
pub fn select_questions_with_rng<R: Rng + ?Sized>(
    pool: &[FormattedQuestion],
    total: usize,
    rng: &mut R,
) -> Vec<FormattedQuestion> {
    let targets = calculate_target_counts(total);

    let mut by_level: BTreeMap<CognitiveLevel, Vec<&FormattedQuestion>> = BTreeMap::new();
    for q in pool {
        by_level.entry(q.cognitive_level).or_default().push(q);
    }

    let mut selected = Vec::new();
    for (level, needed) in &targets {
        let Some(bucket) = by_level.get(level) else {
            continue;
        };
        let take = (*needed).min(bucket.len());
        debug!("层级 {}: 目标 {}，可用 {}，抽取 {}", level, needed, bucket.len(), take);
        selected.extend(bucket.choose_multiple(rng, take).map(|q| (*q).clone()));
    }

    selected
}
