//! 文本处理层：分句、分词、词形还原、词典与句法分析

pub mod lemmatizer;
pub mod lexicon;
pub mod parser;
pub mod segmenter;
pub mod stopwords;
pub mod tokenizer;

pub use lemmatizer::Lemmatizer;
pub use lexicon::{BuiltinSynonyms, JsonSynonyms, SynonymSource, VerbTaxonomy};
pub use parser::{Dep, HeuristicParser, LinguisticParser, ParsedDoc, Pos, Token};
pub use segmenter::split_sentences;
pub use tokenizer::tokenize;
