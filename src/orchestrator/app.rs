//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 进程级资源的唯一所有者：启动时加载一次，之后只读共享给所有小节任务。
//!
//! ## 核心功能
//!
//! 1. **资源加载**：动词词典、解析器、句向量模型、分类器、提示词配置、LLM 客户端
//! 2. **健康检查**：启动时探测 LLM 服务，失败只告警
//! 3. **运行**：读取 PDF，委托 `DocumentProcessor` 处理，输出统计
//!
//! 分类器模型文件缺失（句向量策略）在初始化阶段直接失败。

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::clients::{CompletionClient, OpenAiCompletionClient};
use crate::config::{ClassifierStrategy, Config};
use crate::error::{AppError, AppResult};
use crate::infrastructure::{FastEmbedEncoder, SentenceEncoder};
use crate::models::{load_prompt_profile_or_default, PipelineResult};
use crate::nlp::{HeuristicParser, JsonSynonyms, Lemmatizer, LinguisticParser, VerbTaxonomy};
use crate::orchestrator::document_processor::DocumentProcessor;
use crate::services::{
    CognitiveClassifier, EmbeddingClassifier, ExtractiveSummarizer, FeatureExtractor,
    QuestionGenerator, RuleBasedClassifier,
};
use crate::utils::logging::{init_log_file, log_startup, print_final_stats};
use crate::workflow::SectionFlow;

/// 应用主结构
pub struct App {
    config: Config,
    client: Arc<dyn CompletionClient>,
    processor: DocumentProcessor,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> AppResult<Self> {
        init_log_file(&config.output_log_file)?;
        log_startup(&config);

        let taxonomy = Arc::new(build_taxonomy(&config)?);
        info!("📖 动词词典: {} 个词条", taxonomy.len());

        let cache_dir = config.embedding_cache_dir.clone();
        let encoder: Arc<dyn SentenceEncoder> = Arc::new(
            tokio::task::spawn_blocking(move || FastEmbedEncoder::new(cache_dir))
                .await
                .map_err(|e| AppError::Other(format!("句向量模型加载任务失败: {}", e)))??,
        );

        let classifier = build_classifier(&config, Arc::clone(&taxonomy), Arc::clone(&encoder))?;
        info!("🧭 分类器就绪: {}", classifier.strategy_name());

        let profile = Arc::new(
            load_prompt_profile_or_default(config.prompt_profile_path.as_deref()).await?,
        );
        let client: Arc<dyn CompletionClient> = Arc::new(OpenAiCompletionClient::new(&config));

        let flow = SectionFlow::new(
            &config,
            Arc::new(ExtractiveSummarizer::new(encoder, config.summary_ratio)),
            classifier,
            QuestionGenerator::new(
                Arc::clone(&client),
                profile,
                config.prompt_content_max_chars,
            ),
        );
        let processor = DocumentProcessor::new(flow, &config);

        Ok(Self {
            config,
            client,
            processor,
        })
    }

    /// 探测 LLM 服务是否可用，失败不影响后续流程
    pub async fn health_check(&self) -> bool {
        match self.client.probe().await {
            Ok(()) => {
                info!("✅ LLM 服务可用: {}", self.client.model_name());
                true
            }
            Err(e) => {
                warn!("⚠️ LLM 服务探测失败，继续运行: {}", e);
                false
            }
        }
    }

    /// 处理一份 PDF 文件
    pub async fn run(&self, pdf_path: &Path) -> AppResult<PipelineResult> {
        let path_str = pdf_path.display().to_string();
        info!("\n📁 读取文档: {}", path_str);
        let bytes = tokio::fs::read(pdf_path)
            .await
            .map_err(|e| AppError::file_read_failed(&path_str, e))?;

        let start = Instant::now();
        let result = self.processor.process(bytes).await?;
        print_final_stats(
            &result,
            start.elapsed().as_secs_f64(),
            &self.config.output_log_file,
        );
        Ok(result)
    }
}

/// 构建动词词典，有同义词文件时用文件，否则用内置表
fn build_taxonomy(config: &Config) -> AppResult<VerbTaxonomy> {
    match &config.synonym_lexicon_path {
        Some(path) => {
            let synonyms = JsonSynonyms::from_path(Path::new(path))?;
            Ok(VerbTaxonomy::build(&synonyms, &Lemmatizer::new()))
        }
        None => Ok(VerbTaxonomy::builtin()),
    }
}

fn build_classifier(
    config: &Config,
    taxonomy: Arc<VerbTaxonomy>,
    encoder: Arc<dyn SentenceEncoder>,
) -> AppResult<Arc<dyn CognitiveClassifier>> {
    match config.classifier_strategy {
        ClassifierStrategy::RuleBased => {
            let lemmatizer = Lemmatizer::new().with_known(taxonomy.known_verbs());
            let parser: Arc<dyn LinguisticParser> = Arc::new(HeuristicParser::new(lemmatizer));
            let extractor = FeatureExtractor::new(parser, taxonomy);
            Ok(Arc::new(RuleBasedClassifier::new(extractor)))
        }
        ClassifierStrategy::Embedding => {
            let classifier = EmbeddingClassifier::load(&config.classifier_model_path, encoder)?;
            Ok(Arc::new(classifier))
        }
    }
}
