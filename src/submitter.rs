//! 预测提交模块
//!
//! Input: ChurnRequest / AllowanceRequest
//! Output: 更新后的 Dashboard，失败时弹出连接错误提示
//! Pos: 表单与预测 API 之间的胶水层
//!
//! 每次提交只发一次请求，不重试；成功与失败路径只会执行其一，
//! 流失提交结束后无论结果如何都恢复按钮文本。

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::prediction::{
    AllowanceRequest, AllowanceResponse, ChurnRequest, ChurnResponse, PredictionResult,
};
use crate::ui::dashboard::{CHURN_BUTTON_BUSY, CHURN_BUTTON_IDLE};
use crate::ui::{Alert, Dashboard};

pub const CHURN_PATH: &str = "/predict_churn";
pub const ALLOWANCE_PATH: &str = "/predict_allowance";

/// 提交失败原因
///
/// 对用户统一展示为连接错误，区分变体仅用于日志
#[derive(Debug)]
pub enum SubmitError {
    /// 网络层失败（连接拒绝、超时等）
    Transport(reqwest::Error),
    /// 非 2xx 响应
    Status { status: u16, body: String },
    /// 响应体不是预期的 JSON
    Decode(serde_json::Error),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Transport(e) => write!(f, "请求发送失败: {}", e),
            SubmitError::Status { status, body } => write!(f, "HTTP {}: {}", status, body),
            SubmitError::Decode(e) => write!(f, "响应解析失败: {}", e),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmitError::Transport(e) => Some(e),
            SubmitError::Decode(e) => Some(e),
            SubmitError::Status { .. } => None,
        }
    }
}

/// 请求期间把按钮切到进行中，drop 时恢复
struct ButtonGuard {
    dashboard: Arc<Mutex<Dashboard>>,
}

impl ButtonGuard {
    fn busy(dashboard: Arc<Mutex<Dashboard>>) -> Self {
        dashboard.lock().set_churn_button(CHURN_BUTTON_BUSY);
        Self { dashboard }
    }
}

impl Drop for ButtonGuard {
    fn drop(&mut self) {
        self.dashboard.lock().set_churn_button(CHURN_BUTTON_IDLE);
    }
}

/// 预测提交器
///
/// Dashboard 的锁只在写入结果时持有，不跨 await；
/// 并发提交互不阻塞，最后返回的响应覆盖面板。
pub struct PredictionSubmitter {
    client: Client,
    base_url: String,
    dashboard: Arc<Mutex<Dashboard>>,
    alert: Arc<dyn Alert>,
}

impl PredictionSubmitter {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        dashboard: Arc<Mutex<Dashboard>>,
        alert: Arc<dyn Alert>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            dashboard,
            alert,
        }
    }

    pub fn dashboard(&self) -> &Arc<Mutex<Dashboard>> {
        &self.dashboard
    }

    /// 连接错误提示文本
    pub fn connectivity_message(&self) -> String {
        format!(
            "Connectivity Error: Ensure the prediction API is reachable at {}",
            self.base_url
        )
    }

    /// 提交流失预测
    pub async fn submit_churn(
        &self,
        request: &ChurnRequest,
    ) -> Result<PredictionResult, SubmitError> {
        let _button = ButtonGuard::busy(self.dashboard.clone());

        let outcome = self
            .post::<_, ChurnResponse>(CHURN_PATH, request)
            .await
            .map(PredictionResult::from);

        match &outcome {
            Ok(result) => {
                tracing::info!(
                    "流失预测完成: 客户 {} 概率 {}% ({})",
                    request.customer_id,
                    result.probability,
                    result.label
                );
                self.dashboard.lock().update(
                    result.probability,
                    &result.churn_tag(),
                    &result.prediction,
                    &result.churn_class(),
                );
            }
            Err(e) => self.report(e),
        }

        outcome
    }

    /// 提交额度评估（不切换按钮文本）
    pub async fn submit_allowance(
        &self,
        request: &AllowanceRequest,
    ) -> Result<PredictionResult, SubmitError> {
        let outcome = self
            .post::<_, AllowanceResponse>(ALLOWANCE_PATH, request)
            .await
            .map(PredictionResult::from);

        match &outcome {
            Ok(result) => {
                tracing::info!("额度评估完成: 概率 {}% ({})", result.probability, result.label);
                self.dashboard.lock().update(
                    result.probability,
                    &result.allowance_tag(),
                    &result.prediction,
                    result.allowance_class().as_str(),
                );
            }
            Err(e) => self.report(e),
        }

        outcome
    }

    fn report(&self, error: &SubmitError) {
        tracing::error!("预测请求失败: {}", error);
        self.alert.alert(&self.connectivity_message());
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, SubmitError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        #[cfg(feature = "sensitive-logs")]
        tracing::debug!(
            "POST {} 请求体: {}",
            url,
            serde_json::to_string(body).unwrap_or_default()
        );
        #[cfg(not(feature = "sensitive-logs"))]
        tracing::debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(SubmitError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SubmitError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await.map_err(SubmitError::Transport)?;

        #[cfg(feature = "sensitive-logs")]
        tracing::debug!("响应体: {}", String::from_utf8_lossy(&bytes));

        serde_json::from_slice(&bytes).map_err(SubmitError::Decode)
    }
}
