//! 预测服务路由

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use super::handlers::{predict_allowance, predict_churn, root};
use super::scoring::LogisticModel;

/// 预测服务共享状态
#[derive(Clone)]
pub struct ServerState {
    pub churn: Arc<LogisticModel>,
    pub allowance: Arc<LogisticModel>,
}

impl ServerState {
    pub fn new(churn: LogisticModel, allowance: LogisticModel) -> Self {
        Self {
            churn: Arc::new(churn),
            allowance: Arc::new(allowance),
        }
    }
}

/// 创建预测服务路由
///
/// # 端点
/// - `GET /` - 在线检查
/// - `POST /predict_churn` - 客户流失预测
/// - `POST /predict_allowance` - 额度评估
///
/// 允许任意来源跨域访问
pub fn create_prediction_router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/predict_churn", post(predict_churn))
        .route("/predict_allowance", post(predict_allowance))
        .layer(cors)
        .with_state(state)
}
