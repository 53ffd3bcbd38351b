pub mod toml_loader;

pub use toml_loader::{load_prompt_profile, load_prompt_profile_or_default};
