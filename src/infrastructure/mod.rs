//! 基础设施层
//!
//! 持有外部资源（PDF 解析、句向量模型），只暴露最小能力，不处理业务流程。

pub mod embedder;
pub mod pdf_layout;

pub use embedder::{FastEmbedEncoder, SentenceEncoder};
pub use pdf_layout::{read_spans, TextSpan};
