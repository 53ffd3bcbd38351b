//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 启动时加载所有只读共享资源
//! - 健康检查、读取文档、输出统计
//!
//! ### `document_processor` - 单文档处理器
//! - 主题树 → 小节列表
//! - Semaphore 控制并发，逐小节委托 SectionFlow
//! - 汇总题目、空结果判定、按配额抽题
//!
//! ## 层次关系
//!
//! ```text
//! app (进程资源)
//!     ↓
//! document_processor (处理 Vec<Section>)
//!     ↓
//! workflow::SectionFlow (处理单个小节)
//!     ↓
//! services (能力层：摘要 / 分类 / 分块 / 出题 / 抽题)
//!     ↓
//! infrastructure + clients + nlp
//! ```

pub mod app;
pub mod document_processor;

pub use app::App;
pub use document_processor::{DocumentProcessor, SectionStats};
