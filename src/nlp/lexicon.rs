//! 词典资源
//!
//! - 转折词、论证短语两个固定词表
//! - 同义词来源（内置表或 JSON 文件）
//! - `VerbTaxonomy`：动词 → 认知层级集合，进程启动时构建一次，之后只读共享

use phf::phf_map;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use crate::error::{AppError, AppResult, FileError};
use crate::models::CognitiveLevel;
use crate::nlp::lemmatizer::Lemmatizer;

/// 转折词（按子串匹配句子文本）
pub const CONTRAST_WORDS: [&str; 6] = ["however", "whereas", "although", "but", "yet", "in contrast"];

/// 论证短语
pub const ARGUMENT_PATTERNS: [&str; 4] = ["should", "must", "it is important", "in my opinion"];

/// 论证动词种子
pub const ARGUMENT_SEED_VERBS: [&str; 6] =
    ["recommend", "suggest", "propose", "argue", "advocate", "assert"];

/// 各层级动词种子
pub fn bloom_seed_verbs(level: CognitiveLevel) -> &'static [&'static str] {
    match level {
        CognitiveLevel::Remember => &["define", "list", "recall", "identify", "name"],
        CognitiveLevel::Understand => &["explain", "summarize", "describe", "classify"],
        CognitiveLevel::Apply => &["apply", "demonstrate", "use"],
        CognitiveLevel::Analyze => &["analyze", "compare", "contrast"],
        CognitiveLevel::Evaluate => &["evaluate", "assess", "justify"],
        CognitiveLevel::Create => &["create", "design", "formulate"],
    }
}

/// 动词同义词来源
pub trait SynonymSource: Send + Sync {
    /// 返回动词词性下的同义词（原始写法，可能含下划线）
    fn verb_synonyms(&self, verb: &str) -> Vec<String>;
}

/// 内置同义词表，覆盖全部种子动词
static VERB_SYNONYMS: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "define" => &["specify", "delimit", "delimitate", "delineate", "determine", "fix", "set", "limit", "designate", "denote", "define"],
    "list" => &["name", "enumerate", "itemize", "itemise", "number", "list", "heel", "lean"],
    "recall" => &["remember", "retrieve", "recollect", "think", "call_back", "call_up", "recall", "review", "echo", "call_in", "revoke", "annul", "rescind", "bring_back"],
    "identify" => &["place", "name", "describe", "distinguish", "key", "key_out", "discover", "find", "identify"],
    "name" => &["call", "nominate", "constitute", "make", "appoint", "identify", "mention", "advert", "bring_up", "cite", "refer", "list", "diagnose", "key", "distinguish", "describe", "name"],
    "explain" => &["explicate", "excuse", "account", "explain"],
    "summarize" => &["summarise", "sum_up", "resume", "sum", "summate", "summarize"],
    "describe" => &["depict", "draw", "report", "account", "trace", "delineate", "line", "identify", "discover", "key", "distinguish", "name", "key_out", "describe"],
    "classify" => &["class", "sort", "assort", "sort_out", "separate", "relegate", "classify"],
    "apply" => &["use", "utilize", "utilise", "employ", "practice", "give", "implement", "lend", "put_on", "go_for", "hold", "enforce", "apply"],
    "demonstrate" => &["show", "establish", "prove", "shew", "present", "exhibit", "manifest", "evidence", "attest", "certify", "march", "demo", "display", "demonstrate"],
    "use" => &["utilize", "utilise", "apply", "employ", "habituate", "expend", "exploit", "victimize", "practice", "use"],
    "analyze" => &["analyse", "study", "examine", "canvass", "canvas", "break_down", "dissect", "take_apart", "psychoanalyze", "analyze"],
    "compare" => &["liken", "equate", "compare"],
    "contrast" => &["counterpoint", "contrast"],
    "evaluate" => &["measure", "valuate", "assess", "appraise", "value", "pass_judgment", "judge", "evaluate"],
    "assess" => &["measure", "evaluate", "valuate", "appraise", "value", "tax", "impose", "assess"],
    "justify" => &["warrant", "vindicate", "absolve", "free", "rationalize", "rationalise", "apologize", "apologise", "excuse", "justify"],
    "create" => &["make", "produce", "create", "make_over", "cause", "do"],
    "design" => &["plan", "project", "contrive", "intend", "destine", "designate", "specify", "design"],
    "formulate" => &["explicate", "develop", "articulate", "give_voice", "word", "phrase", "redact", "cast", "put", "couch", "formulate"],
    "recommend" => &["urge", "advocate", "commend", "recommend"],
    "suggest" => &["propose", "advise", "indicate", "hint", "evoke", "paint_a_picture", "suggest"],
    "propose" => &["suggest", "advise", "project", "declare_oneself", "offer", "pop_the_question", "nominate", "purpose", "intend", "mean", "aim", "propose"],
    "argue" => &["reason", "contend", "debate", "fence", "indicate", "present", "represent", "lay_out", "argue"],
    "advocate" => &["recommend", "urge", "preach", "advocate"],
    "assert" => &["asseverate", "maintain", "insist", "put_forward", "swear", "aver", "verify", "avow", "affirm", "claim", "assert"],
};

/// 内置同义词表
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSynonyms;

impl SynonymSource for BuiltinSynonyms {
    fn verb_synonyms(&self, verb: &str) -> Vec<String> {
        VERB_SYNONYMS
            .get(verb)
            .map(|syns| syns.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default()
    }
}

/// 从 JSON 文件加载的同义词表：`{"verb": ["syn_a", "syn b"], ...}`
#[derive(Debug, Clone, Default)]
pub struct JsonSynonyms {
    map: HashMap<String, Vec<String>>,
}

impl JsonSynonyms {
    pub fn from_map(map: HashMap<String, Vec<String>>) -> Self {
        let map = map
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Self { map }
    }

    pub fn from_path(path: &Path) -> AppResult<Self> {
        let path_str = path.display().to_string();
        let content =
            std::fs::read_to_string(path).map_err(|e| AppError::file_read_failed(&path_str, e))?;
        let map: HashMap<String, Vec<String>> = serde_json::from_str(&content).map_err(|e| {
            AppError::File(FileError::JsonParseFailed {
                path: path_str,
                source: Box::new(e),
            })
        })?;
        Ok(Self::from_map(map))
    }
}

impl SynonymSource for JsonSynonyms {
    fn verb_synonyms(&self, verb: &str) -> Vec<String> {
        self.map.get(verb).cloned().unwrap_or_default()
    }
}

/// 同义词规范化：下划线换成空格，小写
fn normalize_synonym(raw: &str) -> String {
    raw.replace('_', " ").to_lowercase()
}

/// 动词分类词典
///
/// 构建后不可变。一个动词可以属于多个层级。
#[derive(Debug, Clone, Default)]
pub struct VerbTaxonomy {
    verb_to_levels: HashMap<String, BTreeSet<CognitiveLevel>>,
    argument_verbs: HashSet<String>,
}

impl VerbTaxonomy {
    /// 用内置同义词表构建
    pub fn builtin() -> Self {
        Self::build(&BuiltinSynonyms, &Lemmatizer::new())
    }

    pub fn build(synonyms: &dyn SynonymSource, lemmatizer: &Lemmatizer) -> Self {
        let mut taxonomy = Self::default();

        for level in CognitiveLevel::ALL {
            for seed in bloom_seed_verbs(level) {
                let surface = seed.to_lowercase();
                taxonomy.insert(lemma_of(lemmatizer, &surface), level);
                taxonomy.insert(surface.clone(), level);

                for raw in synonyms.verb_synonyms(&surface) {
                    let syn = normalize_synonym(&raw);
                    taxonomy.insert(lemma_of(lemmatizer, &syn), level);
                    taxonomy.insert(syn, level);
                }
            }
        }

        for seed in ARGUMENT_SEED_VERBS {
            taxonomy.argument_verbs.insert(seed.to_string());
            for raw in synonyms.verb_synonyms(seed) {
                taxonomy.argument_verbs.insert(normalize_synonym(&raw));
            }
        }

        taxonomy
    }

    fn insert(&mut self, verb: String, level: CognitiveLevel) {
        if verb.is_empty() {
            return;
        }
        self.verb_to_levels.entry(verb).or_default().insert(level);
    }

    /// 某个词（原形，小写）对应的层级
    pub fn levels_for(&self, lemma: &str) -> Option<&BTreeSet<CognitiveLevel>> {
        self.verb_to_levels.get(lemma)
    }

    pub fn is_argument_verb(&self, lemma: &str) -> bool {
        self.argument_verbs.contains(lemma)
    }

    /// 所有单词形式的已知动词，供词形还原器识别
    pub fn known_verbs(&self) -> impl Iterator<Item = &str> {
        self.verb_to_levels
            .keys()
            .chain(self.argument_verbs.iter())
            .map(String::as_str)
            .filter(|v| !v.contains(' '))
    }

    pub fn len(&self) -> usize {
        self.verb_to_levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verb_to_levels.is_empty()
    }
}

/// 多词短语取第一个词的原形
fn lemma_of(lemmatizer: &Lemmatizer, phrase: &str) -> String {
    phrase
        .split_whitespace()
        .next()
        .map(|first| lemmatizer.lemmatize(first))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_verbs_present() {
        let taxonomy = VerbTaxonomy::builtin();
        for level in CognitiveLevel::ALL {
            for seed in bloom_seed_verbs(level) {
                let levels = taxonomy.levels_for(seed).expect("种子动词应在词典中");
                assert!(levels.contains(&level), "{} 应属于 {:?}", seed, level);
            }
        }
    }

    #[test]
    fn test_verb_maps_to_multiple_levels() {
        let taxonomy = VerbTaxonomy::builtin();
        // "use" 是 Apply 的种子，同时是 apply 的同义词
        let levels = taxonomy.levels_for("use").unwrap();
        assert!(levels.contains(&CognitiveLevel::Apply));
        // "describe" 是 Understand 的种子，也是 identify/name 的同义词
        let levels = taxonomy.levels_for("describe").unwrap();
        assert!(levels.contains(&CognitiveLevel::Understand));
        assert!(levels.contains(&CognitiveLevel::Remember));
    }

    #[test]
    fn test_multiword_synonyms_add_first_word_lemma() {
        let taxonomy = VerbTaxonomy::builtin();
        assert!(taxonomy.levels_for("break down").is_some());
        assert!(taxonomy
            .levels_for("break")
            .unwrap()
            .contains(&CognitiveLevel::Analyze));
        assert!(taxonomy.known_verbs().all(|v| !v.contains(' ')));
    }

    #[test]
    fn test_argument_verbs() {
        let taxonomy = VerbTaxonomy::builtin();
        assert!(taxonomy.is_argument_verb("argue"));
        assert!(taxonomy.is_argument_verb("contend"));
        assert!(taxonomy.is_argument_verb("put forward"));
        assert!(!taxonomy.is_argument_verb("analyze"));
    }

    #[test]
    fn test_json_synonyms_are_case_insensitive_keys() {
        let mut map = HashMap::new();
        map.insert("Create".to_string(), vec!["Dream_Up".to_string()]);
        let source = JsonSynonyms::from_map(map);
        let taxonomy = VerbTaxonomy::build(&source, &Lemmatizer::new());
        assert!(taxonomy
            .levels_for("dream up")
            .unwrap()
            .contains(&CognitiveLevel::Create));
        assert!(taxonomy.levels_for("dream").is_some());
    }
}
