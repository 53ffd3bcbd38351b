//! 句向量引擎 - 基础设施层
//!
//! fastembed（ONNX Runtime）本地推理，默认模型 AllMiniLML6V2，输出 384 维向量。
//! 推理是同步 CPU 计算，异步代码里应放进 `spawn_blocking`。

use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

use crate::error::ClassificationError;

/// 句向量编码器
///
/// 摘要器与向量分类器共用同一个实例。
pub trait SentenceEncoder: Send + Sync {
    /// 每条输入返回一个向量，顺序与输入一致
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ClassificationError>;

    /// 向量维度
    fn dimension(&self) -> usize;
}

/// fastembed 编码器
///
/// `TextEmbedding::embed` 需要 `&mut self`，这里用 `Mutex` 包一层，
/// 让进程内的多个小节任务共享同一个模型。
pub struct FastEmbedEncoder {
    model: Mutex<TextEmbedding>,
}

impl FastEmbedEncoder {
    pub const DIMENSION: usize = 384;

    /// 加载模型，首次运行会下载到 `cache_dir`
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self, ClassificationError> {
        let cache_dir = cache_dir.into();
        info!("🧠 加载句向量模型 AllMiniLML6V2 (缓存目录: {})", cache_dir.display());

        let model = TextEmbedding::try_new(
            TextInitOptions::new(EmbeddingModel::AllMiniLML6V2)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(true),
        )
        .map_err(|e| ClassificationError::EmbeddingInitFailed(e.to_string()))?;

        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl SentenceEncoder for FastEmbedEncoder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ClassificationError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let mut model = self
            .model
            .lock()
            .map_err(|_| ClassificationError::EmbeddingFailed("模型锁已损坏".to_string()))?;
        model
            .embed(texts.to_vec(), None)
            .map_err(|e| ClassificationError::EmbeddingFailed(e.to_string()))
    }

    fn dimension(&self) -> usize {
        Self::DIMENSION
    }
}
