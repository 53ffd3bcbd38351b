use phf::{phf_map, phf_set};
use std::collections::HashSet;

/// 不规则变化 → 原形
static IRREGULAR: phf::Map<&'static str, &'static str> = phf_map! {
    "am" => "be", "is" => "be", "are" => "be", "was" => "be", "were" => "be",
    "been" => "be", "being" => "be",
    "has" => "have", "had" => "have", "having" => "have",
    "does" => "do", "did" => "do", "done" => "do", "doing" => "do",
    "made" => "make", "making" => "make",
    "chose" => "choose", "chosen" => "choose",
    "wrote" => "write", "written" => "write", "writing" => "write",
    "took" => "take", "taken" => "take", "taking" => "take",
    "gave" => "give", "given" => "give", "giving" => "give",
    "went" => "go", "gone" => "go", "goes" => "go",
    "saw" => "see", "seen" => "see",
    "thought" => "think", "brought" => "bring", "built" => "build",
    "found" => "find", "knew" => "know", "known" => "know",
    "showed" => "show", "shown" => "show", "shewn" => "shew",
    "told" => "tell", "said" => "say", "got" => "get", "gotten" => "get",
    "came" => "come", "became" => "become", "began" => "begin", "begun" => "begin",
    "ran" => "run", "held" => "hold", "kept" => "keep", "left" => "leave",
    "led" => "lead", "meant" => "mean", "understood" => "understand",
    "taught" => "teach", "drew" => "draw", "drawn" => "draw",
    "spoke" => "speak", "spoken" => "speak", "stood" => "stand",
    "sought" => "seek", "felt" => "feel", "fell" => "fall", "fallen" => "fall",
    "swore" => "swear", "sworn" => "swear", "cast" => "cast", "put" => "put",
    "set" => "set", "laid" => "lay", "lain" => "lie", "paid" => "pay",
    "sent" => "send", "spent" => "spend", "lent" => "lend", "bent" => "bend",
    "struck" => "strike", "won" => "win", "dealt" => "deal", "heard" => "hear",
};

/// 常见动词原形
static BASE_VERBS: phf::Set<&'static str> = phf_set! {
    "be", "have", "do", "make", "use", "say", "get", "go", "know", "take", "see", "come",
    "think", "look", "want", "give", "find", "tell", "ask", "work", "seem", "feel", "try",
    "leave", "call", "need", "become", "keep", "begin", "help", "talk", "turn", "start",
    "show", "hear", "play", "run", "move", "like", "live", "believe", "hold", "bring",
    "happen", "write", "provide", "sit", "stand", "lose", "pay", "meet", "include",
    "continue", "set", "learn", "change", "lead", "understand", "watch", "follow", "stop",
    "speak", "read", "allow", "add", "spend", "grow", "open", "walk", "win", "offer",
    "remember", "love", "consider", "appear", "buy", "wait", "serve", "die", "send",
    "expect", "build", "stay", "fall", "cut", "reach", "remain", "raise", "pass", "sell",
    "require", "report", "decide", "pull", "develop", "produce", "explain", "describe",
    "define", "list", "recall", "identify", "name", "summarize", "summarise", "classify",
    "apply", "demonstrate", "analyze", "analyse", "compare", "contrast", "evaluate",
    "assess", "justify", "create", "design", "formulate", "recommend", "suggest",
    "propose", "argue", "advocate", "assert", "determine", "specify", "examine", "study",
    "measure", "judge", "construct", "plan", "prove", "establish", "present", "exhibit",
    "employ", "utilize", "utilise", "implement", "distinguish", "discover", "depict",
    "enumerate", "retrieve", "recollect", "review", "illustrate", "interpret", "predict",
    "solve", "calculate", "organize", "organise", "combine", "compose", "invent", "critique",
    "defend", "support", "conclude", "infer", "outline", "relate", "differentiate",
    "choose", "select", "rate", "rank", "value", "appraise", "estimate", "maintain", "claim",
    "affirm", "insist", "contend", "reason", "debate", "urge", "advise", "indicate",
    "represent", "state", "note", "observe", "occur", "involve", "form", "cause", "contain",
};

/// 规则词形还原器
///
/// 先查不规则表，再对候选原形做已知词匹配，最后退回后缀规则。
#[derive(Debug, Clone, Default)]
pub struct Lemmatizer {
    extra_known: HashSet<String>,
}

impl Lemmatizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加已知原形（例如分类词典里的动词）
    pub fn with_known<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extra_known
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    pub fn is_known(&self, word: &str) -> bool {
        BASE_VERBS.contains(word) || self.extra_known.contains(word)
    }

    /// 还原为小写原形
    pub fn lemmatize(&self, word: &str) -> String {
        let w = word.to_lowercase();
        if let Some(lemma) = IRREGULAR.get(w.as_str()) {
            return (*lemma).to_string();
        }
        if self.is_known(&w) {
            return w;
        }

        let candidates = candidates(&w);
        if let Some(found) = candidates.iter().find(|c| self.is_known(c)) {
            return found.clone();
        }
        fallback(&w).unwrap_or(w)
    }
}

fn undouble(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    if n >= 3 && bytes[n - 1] == bytes[n - 2] && !b"aeiouslz".contains(&bytes[n - 1]) {
        Some(stem[..n - 1].to_string())
    } else {
        None
    }
}

fn candidates(w: &str) -> Vec<String> {
    let mut out = Vec::new();
    let n = w.len();
    if !w.is_ascii() {
        return out;
    }
    if n > 4 && (w.ends_with("ies") || w.ends_with("ied")) {
        out.push(format!("{}y", &w[..n - 3]));
    }
    if n > 5 && w.ends_with("ing") {
        let base = &w[..n - 3];
        out.push(base.to_string());
        out.push(format!("{}e", base));
        out.extend(undouble(base));
    }
    if n > 3 && w.ends_with("ed") {
        let base = &w[..n - 2];
        out.push(base.to_string());
        out.push(w[..n - 1].to_string());
        out.extend(undouble(base));
    }
    if n > 3 && w.ends_with("es") {
        out.push(w[..n - 2].to_string());
    }
    if n > 2 && w.ends_with('s') && !w.ends_with("ss") {
        out.push(w[..n - 1].to_string());
    }
    out
}

fn needs_final_e(stem: &str) -> bool {
    ["at", "iz", "is", "yz", "bl", "ur", "iv", "ag", "uc", "ic", "os", "ud", "ut", "ib"]
        .iter()
        .any(|suffix| stem.ends_with(suffix))
}

fn fallback(w: &str) -> Option<String> {
    let n = w.len();
    if !w.is_ascii() || n <= 3 {
        return None;
    }
    if n > 4 && (w.ends_with("ies") || w.ends_with("ied")) {
        return Some(format!("{}y", &w[..n - 3]));
    }
    for suffix in ["ing", "ed"] {
        if w.ends_with(suffix) && n > suffix.len() + 2 {
            let base = &w[..n - suffix.len()];
            if let Some(undoubled) = undouble(base) {
                return Some(undoubled);
            }
            if needs_final_e(base) {
                return Some(format!("{}e", base));
            }
            return Some(base.to_string());
        }
    }
    if w.ends_with("sses") || w.ends_with("ches") || w.ends_with("shes") || w.ends_with("xes") {
        return Some(w[..n - 2].to_string());
    }
    if w.ends_with('s') && !w.ends_with("ss") && !w.ends_with("us") && !w.ends_with("is") {
        return Some(w[..n - 1].to_string());
    }
    None
}
