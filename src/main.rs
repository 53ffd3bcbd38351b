use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bloom_question_generator::utils::logging;
use bloom_question_generator::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    config.validate()?;

    let Some(pdf_path) = std::env::args().nth(1).map(PathBuf::from) else {
        bail!("用法: bloom-question-generator <文档.pdf>");
    };

    // 初始化并运行应用
    let app = App::initialize(config).await?;
    app.health_check().await;
    let result = app.run(&pdf_path).await?;

    let json = serde_json::to_string_pretty(&result).context("序列化结果失败")?;
    println!("{}", json);

    Ok(())
}
