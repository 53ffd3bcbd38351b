use thiserror::Error;

/// 应用程序错误类型
///
/// 只有 `Structuring`、`EmptyResult`、`Config` 对整篇文档是致命的；
/// 摘要、分类与生成错误在分节/分块内部就地恢复。
#[derive(Debug, Error)]
pub enum AppError {
    /// 文档结构化错误
    #[error("文档结构化错误: {0}")]
    Structuring(#[from] StructuringError),
    /// 聚类摘要错误
    #[error("摘要错误: {0}")]
    Summarization(#[from] SummarizationError),
    /// 认知层级分类错误
    #[error("分类错误: {0}")]
    Classification(#[from] ClassificationError),
    /// 题目生成错误
    #[error("生成错误: {0}")]
    Generation(#[from] GenerationError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 处理完所有主题后题目池为空
    #[error("未能生成任何有效题目 (处理了 {sections} 个小节)")]
    EmptyResult { sections: usize },
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 文档结构化错误
#[derive(Debug, Error)]
pub enum StructuringError {
    /// 字节流无法按 PDF 解析
    #[error("无法解析文档: {source}")]
    Unparsable {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 某一页的内容流解析失败
    #[error("第 {page} 页内容解析失败: {source}")]
    PageContentFailed {
        page: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 文档为空
    #[error("文档内容为空")]
    EmptyDocument,
}

/// 聚类摘要错误
#[derive(Debug, Error)]
pub enum SummarizationError {
    /// 句向量编码失败
    #[error("句子编码失败: {0}")]
    Encoding(#[source] ClassificationError),
    /// 向量数与句子数不一致
    #[error("输入 {sentences} 句，得到 {vectors} 个向量")]
    VectorCountMismatch { sentences: usize, vectors: usize },
}

/// 分类错误
#[derive(Debug, Error)]
pub enum ClassificationError {
    /// 文本为空，无法分类
    #[error("段落为空，无法分类")]
    EmptyPassage,
    /// 句向量推理失败
    #[error("句向量推理失败: {0}")]
    EmbeddingFailed(String),
    /// 句向量模型初始化失败
    #[error("句向量模型初始化失败: {0}")]
    EmbeddingInitFailed(String),
    /// 分类器产物无法加载
    #[error("分类器加载失败 ({path}): {reason}")]
    ModelLoadFailed { path: String, reason: String },
    /// 输入维度与分类器不一致
    #[error("特征维度不匹配: 期望 {expected}, 实际 {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// 分类器输出了 1-6 之外的层级
    #[error("分类器输出了无效层级: {0}")]
    InvalidLevel(i64),
}

/// 题目生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 调用超时
    #[error("LLM 调用超时 ({secs} 秒)")]
    Timeout { secs: u64 },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 响应中找不到 JSON 数组
    #[error("响应中没有 JSON 数组: {preview}")]
    NoJsonArray { preview: String },
    /// JSON 解析失败
    #[error("JSON解析失败: {source}")]
    JsonParseFailed {
        #[source]
        source: serde_json::Error,
    },
    /// 请求构建失败
    #[error("请求构建失败: {0}")]
    RequestBuildFailed(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必填项缺失
    #[error("缺少必填配置 {var_name}")]
    Missing { var_name: String },
    /// 取值无效
    #[error("配置 {field} 取值无效: {reason}")]
    Invalid { field: String, reason: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<lopdf::Error> for AppError {
    fn from(err: lopdf::Error) -> Self {
        AppError::Structuring(StructuringError::Unparsable {
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 是否是整篇文档级别的致命错误
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            AppError::Summarization(_) | AppError::Classification(_) | AppError::Generation(_)
        )
    }
}

impl GenerationError {
    /// 创建 LLM API 调用错误
    pub fn api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        GenerationError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
