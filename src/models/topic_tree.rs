use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 无结构时使用的默认主题/小节名
pub const GENERAL_BUCKET: &str = "General";

/// 主题树：主题 → 小节 → 正文
///
/// 顺序即版面顺序。小节只会出现在读到其正文时所处的主题之下。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicTree {
    topics: IndexMap<String, IndexMap<String, String>>,
}

/// 一个待处理的小节
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub main_topic: String,
    pub subtopic: String,
    pub content: String,
}

impl TopicTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// 单个 ("General", "General") 桶，用于无结构回退
    pub fn flat(content: impl Into<String>) -> Self {
        let mut tree = Self::new();
        tree.start_topic(GENERAL_BUCKET);
        tree.append(GENERAL_BUCKET, GENERAL_BUCKET, &content.into());
        tree
    }

    /// 开始一个新主题。同名主题会被重置
    pub fn start_topic(&mut self, title: &str) {
        self.topics.insert(title.to_string(), IndexMap::new());
    }

    /// 向 (主题, 小节) 追加一段文本，前面加一个空格
    pub fn append(&mut self, main_topic: &str, subtopic: &str, text: &str) {
        let content = self
            .topics
            .entry(main_topic.to_string())
            .or_default()
            .entry(subtopic.to_string())
            .or_default();
        content.push(' ');
        content.push_str(text);
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    pub fn subtopics(&self, main_topic: &str) -> Option<&IndexMap<String, String>> {
        self.topics.get(main_topic)
    }

    pub fn content(&self, main_topic: &str, subtopic: &str) -> Option<&str> {
        self.topics
            .get(main_topic)
            .and_then(|subs| subs.get(subtopic))
            .map(String::as_str)
    }

    /// 按版面顺序展开为小节列表（按值返回）
    pub fn into_sections(self) -> Vec<Section> {
        let mut sections = Vec::new();
        for (main_topic, subtopics) in self.topics {
            for (subtopic, content) in subtopics {
                sections.push(Section {
                    main_topic: main_topic.clone(),
                    subtopic,
                    content,
                });
            }
        }
        sections
    }
}
