//! 抽取式摘要服务
//!
//! 1. 分句并编码为句向量
//! 2. 按句数估计簇数，固定种子的 k-means 聚类
//! 3. 超过 3 句的簇用 TextRank 选出 `max(1, round(簇大小 × 比例))` 句，其余簇原样保留
//! 4. 按簇首次出现的顺序用空格拼接

use std::collections::HashSet;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::SummarizationError;
use crate::infrastructure::SentenceEncoder;
use crate::nlp::segmenter::split_sentences;
use crate::nlp::stopwords::is_stopword;
use crate::nlp::tokenizer::words_lowercase;

/// 聚类随机种子
pub const KMEANS_SEED: u64 = 42;
/// 超过该句数的簇才做摘要
pub const CLUSTER_SUMMARY_THRESHOLD: usize = 3;

const KMEANS_MAX_ITER: usize = 300;
const TEXTRANK_DAMPING: f64 = 0.85;
const TEXTRANK_MAX_ITER: usize = 100;
const TEXTRANK_TOLERANCE: f64 = 1e-6;

/// 按句数估计簇数
pub fn estimate_k(num_sentences: usize) -> usize {
    match num_sentences {
        0..=5 => 1,
        6..=10 => 2,
        11..=20 => 3,
        _ => 4,
    }
}

fn squared_distance(a: &[f32], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, c)| {
            let d = f64::from(*x) - c;
            d * d
        })
        .sum()
}

/// k-means++ 初始化 + Lloyd 迭代，返回每个点的簇编号
///
/// 种子固定时结果确定。`k` 大于点数时按点数截断。
pub fn kmeans(points: &[Vec<f32>], k: usize, seed: u64) -> Vec<usize> {
    let n = points.len();
    if n == 0 {
        return Vec::new();
    }
    let k = k.clamp(1, n);
    if k == 1 {
        return vec![0; n];
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let to_f64 = |p: &Vec<f32>| p.iter().map(|v| f64::from(*v)).collect::<Vec<f64>>();

    // k-means++
    let mut centroids: Vec<Vec<f64>> = vec![to_f64(&points[rng.gen_range(0..n)])];
    while centroids.len() < k {
        let weights: Vec<f64> = points
            .iter()
            .map(|p| {
                centroids
                    .iter()
                    .map(|c| squared_distance(p, c))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        let total: f64 = weights.iter().sum();
        let next = if total <= 0.0 {
            // 所有点都与已有中心重合
            rng.gen_range(0..n)
        } else {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = n - 1;
            for (i, w) in weights.iter().enumerate() {
                if target < *w {
                    chosen = i;
                    break;
                }
                target -= w;
            }
            chosen
        };
        centroids.push(to_f64(&points[next]));
    }

    let mut labels = vec![0usize; n];
    for iteration in 0..KMEANS_MAX_ITER {
        let mut changed = false;
        for (i, p) in points.iter().enumerate() {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let d = squared_distance(p, centroid);
                if d < best_dist {
                    best_dist = d;
                    best = c;
                }
            }
            changed |= labels[i] != best;
            labels[i] = best;
        }
        if !changed && iteration > 0 {
            break;
        }

        let dim = centroids[0].len();
        let mut sums = vec![vec![0.0; dim]; k];
        let mut counts = vec![0usize; k];
        for (p, &label) in points.iter().zip(&labels) {
            counts[label] += 1;
            for (s, v) in sums[label].iter_mut().zip(p) {
                *s += f64::from(*v);
            }
        }
        for (c, (sum, count)) in sums.into_iter().zip(counts).enumerate() {
            // 空簇保留原中心
            if count > 0 {
                centroids[c] = sum.into_iter().map(|s| s / count as f64).collect();
            }
        }
    }

    labels
}

/// TextRank 句子得分
///
/// 句子之间的相似度为去停用词后的共有词数 / (ln|Si| + ln|Sj|)。
pub fn rank_sentences(sentences: &[String]) -> Vec<f64> {
    let n = sentences.len();
    if n == 0 {
        return Vec::new();
    }

    let bags: Vec<HashSet<String>> = sentences
        .iter()
        .map(|s| {
            words_lowercase(s)
                .into_iter()
                .filter(|w| !is_stopword(w))
                .collect()
        })
        .collect();

    let mut weights = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let common = bags[i].intersection(&bags[j]).count();
            if common == 0 {
                continue;
            }
            let norm = (bags[i].len() as f64).ln() + (bags[j].len() as f64).ln();
            let sim = if norm > 0.0 { common as f64 / norm } else { common as f64 };
            weights[i][j] = sim;
            weights[j][i] = sim;
        }
    }
    let out_sums: Vec<f64> = weights.iter().map(|row| row.iter().sum()).collect();

    let mut scores = vec![1.0 / n as f64; n];
    for _ in 0..TEXTRANK_MAX_ITER {
        let mut next = vec![(1.0 - TEXTRANK_DAMPING) / n as f64; n];
        for (i, slot) in next.iter_mut().enumerate() {
            let mut acc = 0.0;
            for j in 0..n {
                if weights[j][i] > 0.0 && out_sums[j] > 0.0 {
                    acc += weights[j][i] / out_sums[j] * scores[j];
                }
            }
            *slot += TEXTRANK_DAMPING * acc;
        }
        let delta: f64 = next.iter().zip(&scores).map(|(a, b)| (a - b).abs()).sum();
        scores = next;
        if delta < TEXTRANK_TOLERANCE {
            break;
        }
    }

    scores
}

/// 选出得分最高的 `count` 句，保持原有顺序。同分取靠前的句子
pub fn top_sentences(sentences: &[String], count: usize) -> Vec<String> {
    let scores = rank_sentences(sentences);
    let mut order: Vec<usize> = (0..sentences.len()).collect();
    order.sort_by(|a, b| scores[*b].total_cmp(&scores[*a]).then(a.cmp(b)));
    let mut keep: Vec<usize> = order.into_iter().take(count).collect();
    keep.sort_unstable();
    keep.into_iter().map(|i| sentences[i].clone()).collect()
}

/// 簇内摘要句数
pub fn summary_length(cluster_size: usize, ratio: f64) -> usize {
    ((cluster_size as f64 * ratio).round() as usize).max(1)
}

/// 抽取式摘要器
pub struct ExtractiveSummarizer {
    encoder: Arc<dyn SentenceEncoder>,
    ratio: f64,
}

impl ExtractiveSummarizer {
    pub fn new(encoder: Arc<dyn SentenceEncoder>, ratio: f64) -> Self {
        Self { encoder, ratio }
    }

    /// 对一组句子做聚类摘要
    pub fn summarize(&self, sentences: &[String]) -> Result<String, SummarizationError> {
        if sentences.is_empty() {
            return Ok(String::new());
        }
        // 句数不超过阈值时任何簇都不会被压缩
        if sentences.len() <= CLUSTER_SUMMARY_THRESHOLD {
            return Ok(sentences.join(" "));
        }

        let embeddings = self
            .encoder
            .encode(sentences)
            .map_err(SummarizationError::Encoding)?;
        if embeddings.len() != sentences.len() {
            return Err(SummarizationError::VectorCountMismatch {
                sentences: sentences.len(),
                vectors: embeddings.len(),
            });
        }

        let k = estimate_k(sentences.len());
        let labels = kmeans(&embeddings, k, KMEANS_SEED);

        // 簇按首次出现的顺序排列
        let mut cluster_order: Vec<usize> = Vec::new();
        let mut clusters: Vec<Vec<String>> = Vec::new();
        for (sentence, label) in sentences.iter().zip(&labels) {
            let slot = match cluster_order.iter().position(|l| l == label) {
                Some(slot) => slot,
                None => {
                    cluster_order.push(*label);
                    clusters.push(Vec::new());
                    clusters.len() - 1
                }
            };
            clusters[slot].push(sentence.clone());
        }

        let mut output: Vec<String> = Vec::new();
        for members in clusters {
            if members.len() > CLUSTER_SUMMARY_THRESHOLD {
                let n = summary_length(members.len(), self.ratio);
                output.push(top_sentences(&members, n).join(" "));
            } else {
                output.extend(members);
            }
        }

        debug!(
            "摘要: {} 句 → {} 个簇 → {} 段",
            sentences.len(),
            k,
            output.len()
        );
        Ok(output.join(" "))
    }

    /// 分句后摘要。分句结果为空时返回空字符串
    pub fn condense(&self, text: &str) -> Result<String, SummarizationError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        let sentences = split_sentences(text);
        self.summarize(&sentences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClassificationError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 按关键词把句子放到两个明显分开的区域
    struct KeywordEncoder {
        calls: AtomicUsize,
    }

    impl KeywordEncoder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SentenceEncoder for KeywordEncoder {
        fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ClassificationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    let base = if t.contains("river") { 10.0 } else { 0.0 };
                    vec![base + i as f32 * 0.01, base]
                })
                .collect())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    fn sentences(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_estimate_k() {
        assert_eq!(estimate_k(0), 1);
        assert_eq!(estimate_k(5), 1);
        assert_eq!(estimate_k(6), 2);
        assert_eq!(estimate_k(10), 2);
        assert_eq!(estimate_k(20), 3);
        assert_eq!(estimate_k(21), 4);
    }

    #[test]
    fn test_summary_length_rounds() {
        assert_eq!(summary_length(4, 0.3), 1);
        assert_eq!(summary_length(5, 0.3), 2);
        assert_eq!(summary_length(10, 0.3), 3);
        assert_eq!(summary_length(2, 0.1), 1);
    }

    #[test]
    fn test_kmeans_separates_groups_deterministically() {
        let points = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![10.0, 10.0],
            vec![10.1, 10.0],
            vec![0.0, 0.1],
        ];
        let a = kmeans(&points, 2, KMEANS_SEED);
        let b = kmeans(&points, 2, KMEANS_SEED);
        assert_eq!(a, b);
        assert_eq!(a[0], a[1]);
        assert_eq!(a[0], a[4]);
        assert_eq!(a[2], a[3]);
        assert_ne!(a[0], a[2]);
    }

    #[test]
    fn test_kmeans_k_larger_than_points() {
        let points = vec![vec![1.0], vec![2.0]];
        let labels = kmeans(&points, 4, KMEANS_SEED);
        assert_eq!(labels.len(), 2);
        assert_ne!(labels[0], labels[1]);
    }

    #[test]
    fn test_textrank_prefers_central_sentence() {
        let s = sentences(&[
            "Photosynthesis converts light energy.",
            "Plants use photosynthesis to convert light energy into chemical energy.",
            "Chemical energy is stored in plants.",
            "The weather was nice.",
        ]);
        let top = top_sentences(&s, 1);
        assert_eq!(top, vec![s[1].clone()]);
    }

    #[test]
    fn test_two_sentences_bypass_summarization() {
        let encoder = Arc::new(KeywordEncoder::new());
        let summarizer = ExtractiveSummarizer::new(encoder.clone(), 0.3);
        let out = summarizer
            .condense("The cell is the unit of life. It has a membrane.")
            .unwrap();
        assert_eq!(out, "The cell is the unit of life. It has a membrane.");
        assert_eq!(encoder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_text_yields_empty_summary() {
        let summarizer = ExtractiveSummarizer::new(Arc::new(KeywordEncoder::new()), 0.3);
        assert_eq!(summarizer.condense("   ").unwrap(), "");
    }

    #[test]
    fn test_large_cluster_is_condensed_small_cluster_kept() {
        let text = "Rocks form slowly. Rocks erode over time. Rocks contain minerals. \
                    Minerals in rocks vary. Rocks are studied by geologists. \
                    The river flows east. The river floods in spring.";
        let summarizer = ExtractiveSummarizer::new(Arc::new(KeywordEncoder::new()), 0.3);
        let out = summarizer.condense(text).unwrap();
        let sents = split_sentences(&out);
        // 7 句 → k = 2；5 句的簇压缩为 round(1.5) = 2 句，2 句的簇原样保留
        assert_eq!(sents.len(), 4, "{}", out);
        assert!(out.ends_with("The river flows east. The river floods in spring."));
    }

    /// 编码失败或返回的向量数不对
    struct BrokenEncoder {
        fail: bool,
    }

    impl SentenceEncoder for BrokenEncoder {
        fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ClassificationError> {
            if self.fail {
                return Err(ClassificationError::EmbeddingFailed("offline".to_string()));
            }
            Ok(texts.iter().skip(1).map(|_| vec![0.0, 0.0]).collect())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    #[test]
    fn test_encoder_failures_surface_as_summarization_errors() {
        let text = "One fact. Two facts. Three facts. Four facts. Five facts.";

        let failing = ExtractiveSummarizer::new(Arc::new(BrokenEncoder { fail: true }), 0.3);
        let err = failing.condense(text).unwrap_err();
        assert!(matches!(err, SummarizationError::Encoding(_)));
        assert!(err.to_string().contains("offline"));

        let short = ExtractiveSummarizer::new(Arc::new(BrokenEncoder { fail: false }), 0.3);
        assert!(matches!(
            short.condense(text).unwrap_err(),
            SummarizationError::VectorCountMismatch {
                sentences: 5,
                vectors: 4
            }
        ));
    }
}
