//! # Bloom Question Generator
//!
//! 从 PDF 文档生成按布鲁姆认知层级标注的题目
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure / Clients / NLP）
//! - `infrastructure/` - PDF 版面读取、句向量模型
//! - `clients/` - LLM 补全服务
//! - `nlp/` - 分句、分词、词形还原、动词词典、句法分析
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 每个文件一种能力
//! - 文档结构化、聚类摘要、特征提取、认知层级分类、分块、出题、按配额抽题
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个小节"的完整处理流程
//! - `SectionCtx` - 上下文封装（主题 + 小节 + 序号）
//! - `SectionFlow` - 流程编排（摘要 → 分类 → 分块 → 出题）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 进程资源加载与运行入口
//! - `orchestrator/document_processor` - 单文档处理器，并发处理小节
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod nlp;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{ClassifierStrategy, Config};
pub use error::{AppError, AppResult};
pub use models::{CognitiveLevel, FormattedQuestion, GeneratedQuestion, PipelineResult, TopicTree};
pub use orchestrator::{App, DocumentProcessor};
pub use workflow::{SectionCtx, SectionFlow, SectionResult};
