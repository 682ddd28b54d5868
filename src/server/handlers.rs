//! 预测服务处理器

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::model::prediction::{AllowanceRequest, AllowanceResponse, ChurnRequest, ChurnResponse};

use super::router::ServerState;
use super::scoring::{
    allowance_features, allowance_status, churn_features, risk_level, to_percent,
};
use super::types::{ErrorDetail, RootResponse};

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Financial Intelligence API is Online",
        endpoints: vec!["POST /predict_churn", "POST /predict_allowance"],
    })
}

fn bad_request(e: anyhow::Error) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorDetail::new(e.to_string()))).into_response()
}

/// POST /predict_churn
pub async fn predict_churn(
    State(state): State<ServerState>,
    Json(payload): Json<ChurnRequest>,
) -> Response {
    let prob = match state.churn.predict_proba(&churn_features(&payload)) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("流失评分失败: 客户 {}: {}", payload.customer_id, e);
            return bad_request(e);
        }
    };

    let prediction = if state.churn.predict(prob) {
        "High chance of churn"
    } else {
        "Low chance of churn"
    };
    let level = risk_level(prob);
    tracing::info!("流失评分: 客户 {} p={:.4} {}", payload.customer_id, prob, level);

    Json(ChurnResponse {
        customer_id: Some(payload.customer_id),
        probability: to_percent(prob),
        risk_level: level.to_string(),
        prediction: prediction.to_string(),
    })
    .into_response()
}

/// POST /predict_allowance
pub async fn predict_allowance(
    State(state): State<ServerState>,
    Json(payload): Json<AllowanceRequest>,
) -> Response {
    let prob = match state.allowance.predict_proba(&allowance_features(&payload)) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("额度评分失败: {}", e);
            return bad_request(e);
        }
    };

    let prediction = if state.allowance.predict(prob) {
        "Allowance Approved"
    } else {
        "Allowance Not Approved"
    };
    let status = allowance_status(prob);
    tracing::info!("额度评分: p={:.4} {}", prob, status);

    Json(AllowanceResponse {
        prediction: prediction.to_string(),
        probability: to_percent(prob),
        status: status.to_string(),
    })
    .into_response()
}
