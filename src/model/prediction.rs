//! 预测请求/响应类型
//!
//! 字段名与预测 API 的 JSON 完全一致（PascalCase 请求体，snake_case 响应体）

use serde::{Deserialize, Serialize};

// ============ 请求 ============

/// 客户流失预测请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChurnRequest {
    pub customer_id: String,
    pub age: f64,
    pub credit_score: f64,
    pub tenure: f64,
    pub transaction_frequency: f64,
    pub avg_transaction_amount: f64,
    pub complaints_filed: f64,
    pub customer_satisfaction: f64,
    pub has_loan: bool,
    pub balance: f64,
}

/// 额度评估请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllowanceRequest {
    pub credit_score: f64,
    pub gender: String,
    pub age: f64,
    pub tenure: f64,
    pub balance: f64,
    pub num_of_products: f64,
    pub has_cr_card: bool,
    pub is_active_member: bool,
    pub estimated_salary: f64,
}

// ============ 响应 ============

/// 流失预测响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnResponse {
    #[serde(rename = "CustomerId", default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// 0-100
    pub probability: f64,
    /// Critical / Moderate / Low
    pub risk_level: String,
    pub prediction: String,
}

/// 额度评估响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowanceResponse {
    pub prediction: String,
    /// 0-100
    pub probability: f64,
    /// Elite / Standard / Ineligible
    pub status: String,
}

/// 状态标签样式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Low,
    Moderate,
    Critical,
}

impl StatusClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusClass::Low => "low",
            StatusClass::Moderate => "moderate",
            StatusClass::Critical => "critical",
        }
    }

    /// 额度状态到样式的映射，未知状态一律视为 critical
    pub fn from_allowance_status(status: &str) -> Self {
        match status {
            "Elite" => StatusClass::Low,
            "Standard" => StatusClass::Moderate,
            _ => StatusClass::Critical,
        }
    }
}

/// 面板展示用的统一结果
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub probability: f64,
    /// risk_level 或 status
    pub label: String,
    pub prediction: String,
}

impl PredictionResult {
    /// 状态标签文本，如 "Critical Risk" / "Elite Score"
    pub fn churn_tag(&self) -> String {
        format!("{} Risk", self.label)
    }

    pub fn allowance_tag(&self) -> String {
        format!("{} Score", self.label)
    }

    /// 流失结果的样式直接取 risk_level 小写
    pub fn churn_class(&self) -> String {
        self.label.to_lowercase()
    }

    pub fn allowance_class(&self) -> StatusClass {
        StatusClass::from_allowance_status(&self.label)
    }
}

impl From<ChurnResponse> for PredictionResult {
    fn from(resp: ChurnResponse) -> Self {
        Self {
            probability: resp.probability,
            label: resp.risk_level,
            prediction: resp.prediction,
        }
    }
}

impl From<AllowanceResponse> for PredictionResult {
    fn from(resp: AllowanceResponse) -> Self {
        Self {
            probability: resp.probability,
            label: resp.status,
            prediction: resp.prediction,
        }
    }
}
