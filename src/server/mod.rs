//! 预测服务模块
//!
//! Input: Config（监听地址、模型路径）
//! Output: HTTP 预测 API
//! Pos: `risk-lens serve` 的服务端实现

mod handlers;
mod router;
pub mod scoring;
pub mod training;
mod types;

pub use router::{ServerState, create_prediction_router};
pub use scoring::LogisticModel;

use anyhow::Context;

use crate::model::config::Config;

/// 加载模型并启动服务，直到进程退出
pub async fn run(config: &Config) -> anyhow::Result<()> {
    let churn = LogisticModel::load(&config.churn_model_path)?;
    let allowance = LogisticModel::load(&config.allowance_model_path)?;
    tracing::info!(
        "模型已加载: churn={}, allowance={}",
        config.churn_model_path.display(),
        config.allowance_model_path.display()
    );

    let app = create_prediction_router(ServerState::new(churn, allowance));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("绑定地址失败: {}", addr))?;

    tracing::info!("预测服务已启动: http://{}", addr);
    tracing::info!("API 端点:");
    tracing::info!("  GET  /");
    tracing::info!("  POST /predict_churn");
    tracing::info!("  POST /predict_allowance");

    axum::serve(listener, app).await?;
    Ok(())
}
