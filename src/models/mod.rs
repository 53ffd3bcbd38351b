pub mod features;
pub mod level;
pub mod loaders;
pub mod prompt_profile;
pub mod question;
pub mod topic_tree;

pub use features::{FeatureReport, FeatureVector, FEATURE_LEN};
pub use level::CognitiveLevel;
pub use loaders::{load_prompt_profile, load_prompt_profile_or_default};
pub use prompt_profile::{LevelGuidance, PromptProfile, ResponseSchema};
pub use question::{FormattedQuestion, GeneratedQuestion, PipelineResult, QuestionType};
pub use topic_tree::{Section, TopicTree, GENERAL_BUCKET};
