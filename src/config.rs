use crate::error::{AppResult, ConfigError};

/// 认知层级分类策略
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassifierStrategy {
    /// 基于语言学特征和动词词典的规则分类
    RuleBased,
    /// 基于句向量 + 预训练分类器
    Embedding,
}

impl ClassifierStrategy {
    /// 从字符串解析（不区分大小写）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "rule" | "rules" | "rule-based" | "rule_based" => Some(Self::RuleBased),
            "embedding" | "embeddings" | "model" => Some(Self::Embedding),
            _ => None,
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的小节数量
    pub max_concurrent_sections: usize,
    /// 运行日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    pub llm_timeout_secs: u64,
    // --- 分类配置 ---
    pub classifier_strategy: ClassifierStrategy,
    pub classifier_model_path: String,
    pub synonym_lexicon_path: Option<String>,
    pub embedding_cache_dir: String,
    // --- 文本处理配置 ---
    pub prompt_profile_path: Option<String>,
    /// 分块长度上限（字符）
    pub chunk_max_chars: usize,
    /// 写入提示词的内容长度上限（字符）
    pub prompt_content_max_chars: usize,
    pub summary_ratio: f64,
    /// 小节内容短于此值则跳过
    pub min_section_chars: usize,
    /// 设置后在末尾按层级配额抽题
    pub select_total: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_sections: 4,
            output_log_file: "generation_log.txt".to_string(),
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.groq.com/openai/v1".to_string(),
            llm_model_name: "llama3-8b-8192".to_string(),
            llm_temperature: 0.7,
            llm_max_tokens: 1000,
            llm_timeout_secs: 30,
            classifier_strategy: ClassifierStrategy::RuleBased,
            classifier_model_path: "models/bloom_classifier.json".to_string(),
            synonym_lexicon_path: None,
            embedding_cache_dir: ".fastembed_cache".to_string(),
            prompt_profile_path: None,
            chunk_max_chars: 3000,
            prompt_content_max_chars: 4000,
            summary_ratio: 0.3,
            min_section_chars: 100,
            select_total: None,
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_sections: env_parsed("MAX_CONCURRENT_SECTIONS").unwrap_or(default.max_concurrent_sections),
            output_log_file: env_string("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            verbose_logging: env_parsed("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
            llm_api_key: env_string("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: env_string("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: env_string("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: env_parsed("LLM_TEMPERATURE").unwrap_or(default.llm_temperature),
            llm_max_tokens: env_parsed("LLM_MAX_TOKENS").unwrap_or(default.llm_max_tokens),
            llm_timeout_secs: env_parsed("LLM_TIMEOUT_SECS").unwrap_or(default.llm_timeout_secs),
            classifier_strategy: env_string("CLASSIFIER_STRATEGY")
                .and_then(|v| ClassifierStrategy::parse(&v))
                .unwrap_or(default.classifier_strategy),
            classifier_model_path: env_string("CLASSIFIER_MODEL_PATH").unwrap_or(default.classifier_model_path),
            synonym_lexicon_path: env_string("SYNONYM_LEXICON_PATH").or(default.synonym_lexicon_path),
            embedding_cache_dir: env_string("EMBEDDING_CACHE_DIR").unwrap_or(default.embedding_cache_dir),
            prompt_profile_path: env_string("PROMPT_PROFILE_PATH").or(default.prompt_profile_path),
            chunk_max_chars: env_parsed("CHUNK_MAX_CHARS").unwrap_or(default.chunk_max_chars),
            prompt_content_max_chars: env_parsed("PROMPT_CONTENT_MAX_CHARS").unwrap_or(default.prompt_content_max_chars),
            summary_ratio: env_parsed("SUMMARY_RATIO").unwrap_or(default.summary_ratio),
            min_section_chars: env_parsed("MIN_SECTION_CHARS").unwrap_or(default.min_section_chars),
            select_total: env_parsed("SELECT_TOTAL").or(default.select_total),
        }
    }

    /// 校验配置，启动前调用
    pub fn validate(&self) -> AppResult<()> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::Missing {
                var_name: "LLM_API_KEY".to_string(),
            }
            .into());
        }
        if self.max_concurrent_sections == 0 {
            return Err(invalid("max_concurrent_sections", "必须大于 0"));
        }
        if self.chunk_max_chars == 0 || self.prompt_content_max_chars == 0 {
            return Err(invalid("chunk_max_chars", "分块长度必须大于 0"));
        }
        if !(0.0..=1.0).contains(&self.summary_ratio) || self.summary_ratio == 0.0 {
            return Err(invalid("summary_ratio", "必须在 (0, 1] 之间"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> crate::error::AppError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse() {
        assert_eq!(ClassifierStrategy::parse("rule"), Some(ClassifierStrategy::RuleBased));
        assert_eq!(ClassifierStrategy::parse(" Embedding "), Some(ClassifierStrategy::Embedding));
        assert_eq!(ClassifierStrategy::parse("random"), None);
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let config = Config {
            llm_api_key: "test-key".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let config = Config {
            llm_api_key: "test-key".to_string(),
            summary_ratio: 1.5,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
