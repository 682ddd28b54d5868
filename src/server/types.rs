//! 预测服务响应类型

use serde::Serialize;

/// 错误响应，格式为 `{"detail": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// GET / 响应
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub endpoints: Vec<&'static str>,
}
