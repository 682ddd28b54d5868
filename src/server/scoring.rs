//! 逻辑回归评分模型
//!
//! 权重文件格式：`{"weights": [...], "bias": 0.0, "threshold": 0.5}`，
//! 训练产出的文件另带 `scaling`（按特征标准化的均值和标准差）

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::model::prediction::{AllowanceRequest, ChurnRequest};

/// 两个模型的输入特征数
pub const FEATURE_COUNT: usize = 9;

fn default_threshold() -> f64 {
    0.5
}

/// 特征标准化参数，z = (x - mean) / std
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaling {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl FeatureScaling {
    pub(crate) fn apply(&self, features: &[f64]) -> Vec<f64> {
        features
            .iter()
            .zip(self.mean.iter().zip(&self.std))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    #[serde(default)]
    pub bias: f64,
    /// 判为正类的概率阈值
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// 未配置时直接使用原始特征
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling: Option<FeatureScaling>,
}

impl LogisticModel {
    /// 从 JSON 文件加载并校验特征数
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取模型文件失败: {}", path.display()))?;
        let model: LogisticModel = serde_json::from_str(&content)
            .with_context(|| format!("解析模型文件失败: {}", path.display()))?;
        model
            .validate()
            .with_context(|| format!("模型文件无效: {}", path.display()))?;
        Ok(model)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.weights.len() != FEATURE_COUNT {
            anyhow::bail!(
                "权重数量应为 {}，实际为 {}",
                FEATURE_COUNT,
                self.weights.len()
            );
        }
        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            anyhow::bail!("权重包含非有限值");
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            anyhow::bail!("阈值必须在 [0, 1] 内: {}", self.threshold);
        }
        if let Some(scaling) = &self.scaling {
            if scaling.mean.len() != FEATURE_COUNT || scaling.std.len() != FEATURE_COUNT {
                anyhow::bail!("scaling 长度应为 {}", FEATURE_COUNT);
            }
            if scaling.mean.iter().any(|m| !m.is_finite())
                || scaling.std.iter().any(|s| !s.is_finite() || *s <= 0.0)
            {
                anyhow::bail!("scaling 的标准差必须为正的有限值");
            }
        }
        Ok(())
    }

    /// 正类概率 σ(w·x + b)
    pub fn predict_proba(&self, features: &[f64]) -> anyhow::Result<f64> {
        if features.len() != self.weights.len() {
            anyhow::bail!(
                "特征数量不匹配: 期望 {}，实际 {}",
                self.weights.len(),
                features.len()
            );
        }

        let scaled;
        let features = match &self.scaling {
            Some(scaling) => {
                scaled = scaling.apply(features);
                scaled.as_slice()
            }
            None => features,
        };

        let prob = sigmoid(dot(&self.weights, features) + self.bias);

        if !prob.is_finite() {
            anyhow::bail!("模型输出无效: {}", prob);
        }
        Ok(prob)
    }

    pub fn predict(&self, prob: f64) -> bool {
        prob >= self.threshold
    }
}

pub(crate) fn dot(weights: &[f64], features: &[f64]) -> f64 {
    weights.iter().zip(features).map(|(w, x)| w * x).sum()
}

pub(crate) fn sigmoid(logit: f64) -> f64 {
    1.0 / (1.0 + (-logit).exp())
}

/// 流失模型特征顺序
pub fn churn_features(req: &ChurnRequest) -> [f64; FEATURE_COUNT] {
    [
        req.age,
        req.credit_score,
        req.tenure,
        req.transaction_frequency,
        req.avg_transaction_amount,
        req.complaints_filed,
        req.customer_satisfaction,
        bool_feature(req.has_loan),
        req.balance,
    ]
}

/// 额度模型特征顺序，性别 male（不区分大小写）编码为 1
pub fn allowance_features(req: &AllowanceRequest) -> [f64; FEATURE_COUNT] {
    let gender = if req.gender.eq_ignore_ascii_case("male") {
        1.0
    } else {
        0.0
    };
    [
        req.credit_score,
        gender,
        req.age,
        req.tenure,
        req.balance,
        req.num_of_products,
        bool_feature(req.has_cr_card),
        bool_feature(req.is_active_member),
        req.estimated_salary,
    ]
}

fn bool_feature(v: bool) -> f64 {
    if v { 1.0 } else { 0.0 }
}

/// 流失风险等级
pub fn risk_level(prob: f64) -> &'static str {
    if prob > 0.7 {
        "Critical"
    } else if prob > 0.4 {
        "Moderate"
    } else {
        "Low"
    }
}

/// 额度等级
pub fn allowance_status(prob: f64) -> &'static str {
    if prob > 0.8 {
        "Elite"
    } else if prob > 0.4 {
        "Standard"
    } else {
        "Ineligible"
    }
}

/// 概率转百分比，保留两位小数
pub fn to_percent(prob: f64) -> f64 {
    (prob * 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(bias: f64) -> LogisticModel {
        LogisticModel {
            weights: vec![0.0; FEATURE_COUNT],
            bias,
            threshold: 0.5,
            scaling: None,
        }
    }

    #[test]
    fn test_zero_weights_give_sigmoid_of_bias() {
        let m = model(0.0);
        let p = m.predict_proba(&[1.0; FEATURE_COUNT]).unwrap();
        assert!((p - 0.5).abs() < 1e-12);
        assert!(m.predict(p));
    }

    #[test]
    fn test_weighted_sum() {
        let mut m = model(-1.0);
        m.weights[0] = 0.5;
        m.weights[8] = 0.25;
        let mut x = [0.0; FEATURE_COUNT];
        x[0] = 2.0;
        x[8] = 4.0;
        // logit = 1 + 1 - 1 = 1
        let p = m.predict_proba(&x).unwrap();
        assert!((p - 1.0 / (1.0 + (-1.0f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn test_scaling_is_applied_before_weights() {
        let mut m = model(0.0);
        m.weights[0] = 1.0;
        m.scaling = Some(FeatureScaling {
            mean: vec![10.0; FEATURE_COUNT],
            std: vec![2.0; FEATURE_COUNT],
        });
        assert!(m.validate().is_ok());

        let mut x = [10.0; FEATURE_COUNT];
        x[0] = 14.0;
        // z0 = (14 - 10) / 2 = 2
        let p = m.predict_proba(&x).unwrap();
        assert!((p - sigmoid(2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_feature_count_mismatch() {
        let m = model(0.0);
        assert!(m.predict_proba(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_validate_rejects_wrong_shape() {
        let m = LogisticModel {
            weights: vec![1.0; 3],
            bias: 0.0,
            threshold: 0.5,
            scaling: None,
        };
        assert!(m.validate().is_err());

        let m = LogisticModel {
            scaling: Some(FeatureScaling {
                mean: vec![0.0; FEATURE_COUNT],
                std: vec![0.0; FEATURE_COUNT],
            }),
            ..model(0.0)
        };
        assert!(m.validate().is_err());

        let m = LogisticModel {
            threshold: 1.5,
            ..model(0.0)
        };
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_parse_with_default_threshold() {
        let json = r#"{"weights": [0,0,0,0,0,0,0,0,0], "bias": 0.3}"#;
        let m: LogisticModel = serde_json::from_str(json).unwrap();
        assert_eq!(m.threshold, 0.5);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let err = LogisticModel::load("/nonexistent/model.json").unwrap_err();
        assert!(err.to_string().contains("读取模型文件失败"));
    }

    #[test]
    fn test_bundled_models_are_valid() {
        for path in ["models/churn_model.json", "models/allowance_model.json"] {
            let m = LogisticModel::load(path).unwrap();
            assert_eq!(m.weights.len(), FEATURE_COUNT);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(risk_level(0.71), "Critical");
        assert_eq!(risk_level(0.7), "Moderate");
        assert_eq!(risk_level(0.41), "Moderate");
        assert_eq!(risk_level(0.4), "Low");

        assert_eq!(allowance_status(0.81), "Elite");
        assert_eq!(allowance_status(0.8), "Standard");
        assert_eq!(allowance_status(0.4), "Ineligible");
    }

    #[test]
    fn test_to_percent_rounds_two_places() {
        assert_eq!(to_percent(0.123456), 12.35);
        assert_eq!(to_percent(1.0), 100.0);
        assert_eq!(to_percent(0.0), 0.0);
    }

    #[test]
    fn test_gender_encoding() {
        let mut req = AllowanceRequest {
            credit_score: 650.0,
            gender: "MALE".to_string(),
            age: 30.0,
            tenure: 2.0,
            balance: 100.0,
            num_of_products: 1.0,
            has_cr_card: false,
            is_active_member: true,
            estimated_salary: 40000.0,
        };
        let x = allowance_features(&req);
        assert_eq!(x[1], 1.0);
        assert_eq!(x[6], 0.0);
        assert_eq!(x[7], 1.0);

        req.gender = "Female".to_string();
        assert_eq!(allowance_features(&req)[1], 0.0);
    }
}
