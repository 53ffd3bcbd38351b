use crate::error::{AppError, AppResult, FileError};
use crate::models::prompt_profile::PromptProfile;
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载提示词配置
pub async fn load_prompt_profile(toml_file_path: &Path) -> AppResult<PromptProfile> {
    let path_str = toml_file_path.display().to_string();

    if !toml_file_path.exists() {
        return Err(FileError::NotFound { path: path_str }.into());
    }

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_str, e))?;

    let profile: PromptProfile = toml::from_str(&content).map_err(|e| {
        AppError::File(FileError::TomlParseFailed {
            path: path_str.clone(),
            source: Box::new(e),
        })
    })?;

    tracing::info!(
        "成功加载提示词配置: {} (协议: {:?}, 每块 {} 题)",
        path_str,
        profile.schema,
        profile.questions_per_chunk
    );

    Ok(profile)
}

/// 有路径就加载，没有就用内置配置
pub async fn load_prompt_profile_or_default(path: Option<&str>) -> AppResult<PromptProfile> {
    match path {
        Some(p) => load_prompt_profile(Path::new(p)).await,
        None => Ok(PromptProfile::default()),
    }
}
