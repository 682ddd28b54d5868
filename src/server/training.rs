//! 模型训练
//!
//! Input: 带表头的 CSV 训练数据
//! Output: 逻辑回归权重 JSON（含特征标准化参数）
//! Pos: `risk-lens train`，产出 `serve` 加载的模型文件
//!
//! 特征顺序与线上评分共用 `churn_features` / `allowance_features`，
//! 训练和推理不会出现列错位。

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use csv::StringRecord;

use crate::model::prediction::{AllowanceRequest, ChurnRequest};

use super::scoring::{
    FEATURE_COUNT, FeatureScaling, LogisticModel, allowance_features, churn_features, dot,
    sigmoid,
};

/// 训练目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModelKind {
    Churn,
    Allowance,
}

impl ModelKind {
    /// 该模型需要的 CSV 列（不含目标列）
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ModelKind::Churn => &[
                "Age",
                "CreditScore",
                "Tenure",
                "TransactionFrequency",
                "AvgTransactionAmount",
                "ComplaintsFiled",
                "CustomerSatisfaction",
                "HasLoan",
                "Balance",
            ],
            ModelKind::Allowance => &[
                "CreditScore",
                "Gender",
                "Age",
                "Tenure",
                "Balance",
                "NumOfProducts",
                "HasCrCard",
                "IsActiveMember",
                "EstimatedSalary",
            ],
        }
    }
}

/// 梯度下降参数
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub epochs: usize,
    pub learning_rate: f64,
    pub threshold: f64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            epochs: 500,
            learning_rate: 0.1,
            threshold: 0.5,
        }
    }
}

/// 一次训练任务
#[derive(Debug, Clone)]
pub struct TrainJob {
    pub data: PathBuf,
    pub target: String,
    pub kind: ModelKind,
    pub out: PathBuf,
    pub options: TrainOptions,
}

#[derive(Debug, Default)]
pub struct Dataset {
    pub features: Vec<[f64; FEATURE_COUNT]>,
    /// 0.0 / 1.0
    pub labels: Vec<f64>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|y| **y > 0.5).count()
    }
}

/// 按列名取值的单行视图
struct Row<'a> {
    columns: &'a HashMap<String, usize>,
    record: &'a StringRecord,
    line: u64,
}

impl Row<'_> {
    fn text(&self, name: &str) -> anyhow::Result<&str> {
        self.columns
            .get(name)
            .and_then(|idx| self.record.get(*idx))
            .map(str::trim)
            .ok_or_else(|| anyhow::anyhow!("第 {} 行缺少列 {}", self.line, name))
    }

    fn num(&self, name: &str) -> anyhow::Result<f64> {
        let raw = self.text(name)?;
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| anyhow::anyhow!("第 {} 行列 {} 不是数值: {:?}", self.line, name, raw))
    }

    /// 接受 1/0、true/false，其余数值按非零为真
    fn flag(&self, name: &str) -> anyhow::Result<bool> {
        let raw = self.text(name)?;
        if raw.eq_ignore_ascii_case("true") {
            return Ok(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Ok(false);
        }
        Ok(self.num(name)? != 0.0)
    }

    fn churn_features(&self) -> anyhow::Result<[f64; FEATURE_COUNT]> {
        let req = ChurnRequest {
            customer_id: self.text("CustomerId").unwrap_or_default().to_string(),
            age: self.num("Age")?,
            credit_score: self.num("CreditScore")?,
            tenure: self.num("Tenure")?,
            transaction_frequency: self.num("TransactionFrequency")?,
            avg_transaction_amount: self.num("AvgTransactionAmount")?,
            complaints_filed: self.num("ComplaintsFiled")?,
            customer_satisfaction: self.num("CustomerSatisfaction")?,
            has_loan: self.flag("HasLoan")?,
            balance: self.num("Balance")?,
        };
        Ok(churn_features(&req))
    }

    fn allowance_features(&self) -> anyhow::Result<[f64; FEATURE_COUNT]> {
        let req = AllowanceRequest {
            credit_score: self.num("CreditScore")?,
            gender: self.text("Gender")?.to_string(),
            age: self.num("Age")?,
            tenure: self.num("Tenure")?,
            balance: self.num("Balance")?,
            num_of_products: self.num("NumOfProducts")?,
            has_cr_card: self.flag("HasCrCard")?,
            is_active_member: self.flag("IsActiveMember")?,
            estimated_salary: self.num("EstimatedSalary")?,
        };
        Ok(allowance_features(&req))
    }
}

/// 读取 CSV 训练数据
pub fn load_dataset<R: Read>(reader: R, kind: ModelKind, target: &str) -> anyhow::Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let columns: HashMap<String, usize> = reader
        .headers()
        .context("读取 CSV 表头失败")?
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.to_string(), idx))
        .collect();

    let mut missing: Vec<&str> = kind
        .columns()
        .iter()
        .copied()
        .filter(|name| !columns.contains_key(*name))
        .collect();
    if !columns.contains_key(target) {
        missing.push(target);
    }
    if !missing.is_empty() {
        anyhow::bail!("CSV 缺少列: {}", missing.join(", "));
    }

    let mut dataset = Dataset::default();
    for result in reader.records() {
        let record = result.context("读取 CSV 记录失败")?;
        let row = Row {
            columns: &columns,
            record: &record,
            line: record.position().map(|p| p.line()).unwrap_or_default(),
        };

        let features = match kind {
            ModelKind::Churn => row.churn_features()?,
            ModelKind::Allowance => row.allowance_features()?,
        };
        let label = if row.flag(target)? { 1.0 } else { 0.0 };

        dataset.features.push(features);
        dataset.labels.push(label);
    }

    Ok(dataset)
}

/// 按列计算均值和总体标准差，常数列的标准差记为 1
fn compute_scaling(features: &[[f64; FEATURE_COUNT]]) -> FeatureScaling {
    let n = features.len() as f64;
    let mut mean = vec![0.0; FEATURE_COUNT];
    for x in features {
        for (m, v) in mean.iter_mut().zip(x) {
            *m += v / n;
        }
    }

    let mut std = vec![0.0; FEATURE_COUNT];
    for x in features {
        for ((s, v), m) in std.iter_mut().zip(x).zip(&mean) {
            *s += (v - m).powi(2) / n;
        }
    }
    for s in std.iter_mut() {
        *s = s.sqrt();
        if *s < 1e-12 {
            *s = 1.0;
        }
    }

    FeatureScaling { mean, std }
}

fn log_loss(weights: &[f64], bias: f64, scaled: &[Vec<f64>], labels: &[f64]) -> f64 {
    let eps = 1e-12;
    let total: f64 = scaled
        .iter()
        .zip(labels)
        .map(|(x, y)| {
            let p = sigmoid(dot(weights, x) + bias).clamp(eps, 1.0 - eps);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();
    total / labels.len() as f64
}

/// 标准化后做全量梯度下降
pub fn fit(dataset: &Dataset, options: &TrainOptions) -> anyhow::Result<LogisticModel> {
    if dataset.is_empty() {
        anyhow::bail!("训练数据为空");
    }
    if options.epochs == 0 || options.learning_rate.is_nan() || options.learning_rate <= 0.0 {
        anyhow::bail!("epochs 与 learning_rate 必须为正");
    }
    let positives = dataset.positives();
    if positives == 0 || positives == dataset.len() {
        tracing::warn!("训练数据只有一个类别，模型将退化为常数输出");
    }

    let scaling = compute_scaling(&dataset.features);
    let scaled: Vec<Vec<f64>> = dataset.features.iter().map(|x| scaling.apply(x)).collect();
    let n = dataset.len() as f64;

    let mut weights = vec![0.0; FEATURE_COUNT];
    let mut bias = 0.0;

    for epoch in 0..options.epochs {
        let mut grad_w = vec![0.0; FEATURE_COUNT];
        let mut grad_b = 0.0;

        for (x, y) in scaled.iter().zip(&dataset.labels) {
            let err = sigmoid(dot(&weights, x) + bias) - y;
            for (g, xi) in grad_w.iter_mut().zip(x) {
                *g += err * xi;
            }
            grad_b += err;
        }

        for (w, g) in weights.iter_mut().zip(&grad_w) {
            *w -= options.learning_rate * g / n;
        }
        bias -= options.learning_rate * grad_b / n;

        if (epoch + 1) % 100 == 0 {
            tracing::debug!(
                "epoch {}: log_loss={:.6}",
                epoch + 1,
                log_loss(&weights, bias, &scaled, &dataset.labels)
            );
        }
    }

    let model = LogisticModel {
        weights,
        bias,
        threshold: options.threshold,
        scaling: Some(scaling),
    };
    model.validate().context("训练结果无效")?;
    Ok(model)
}

/// 训练集上的准确率
pub fn accuracy(model: &LogisticModel, dataset: &Dataset) -> anyhow::Result<f64> {
    if dataset.is_empty() {
        return Ok(0.0);
    }
    let mut correct = 0usize;
    for (x, y) in dataset.features.iter().zip(&dataset.labels) {
        let predicted = model.predict(model.predict_proba(x)?);
        if predicted == (*y > 0.5) {
            correct += 1;
        }
    }
    Ok(correct as f64 / dataset.len() as f64)
}

/// 写出模型 JSON
pub fn save(model: &LogisticModel, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("创建目录失败: {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(model).context("序列化模型失败")?;
    fs::write(path, content).with_context(|| format!("写入模型文件失败: {}", path.display()))?;
    Ok(())
}

/// 读取数据、训练并写出模型
pub fn run(job: &TrainJob) -> anyhow::Result<LogisticModel> {
    let file = File::open(&job.data)
        .with_context(|| format!("打开训练数据失败: {}", job.data.display()))?;
    let dataset = load_dataset(file, job.kind, &job.target)?;
    tracing::info!(
        "已读取训练数据: {} 行，正类 {} 行（{:?} 模型，目标列 {}）",
        dataset.len(),
        dataset.positives(),
        job.kind,
        job.target
    );

    let model = fit(&dataset, &job.options)?;
    tracing::info!("训练集准确率: {:.4}", accuracy(&model, &dataset)?);

    save(&model, &job.out)?;
    tracing::info!("模型已写出: {}", job.out.display());
    Ok(model)
}
