use anyhow::Result;
use coupon_watch::utils::logging;
use coupon_watch::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let mut app = App::initialize(config)?;
    app.run().await?;

    Ok(())
}
