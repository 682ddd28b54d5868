//! 命令行参数
//!
//! 表单字段以 flag 形式输入，数值字段由 clap 解析，不做范围校验

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::config::Config;
use crate::model::prediction::{AllowanceRequest, ChurnRequest};
use crate::server::training::{ModelKind, TrainJob, TrainOptions};

#[derive(Parser, Debug)]
#[command(name = "risk-lens", version, about = "Customer churn and allowance risk console")]
pub struct Cli {
    /// 配置文件路径
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 预测 API 地址，覆盖配置文件
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 客户流失风险分析（Loyalty 标签页）
    Churn(ChurnArgs),
    /// 额度资格评估（Allowance 标签页）
    Allowance(AllowanceArgs),
    /// 启动预测服务
    Serve(ServeArgs),
    /// 从 CSV 训练逻辑回归模型
    Train(TrainArgs),
}

#[derive(Args, Debug)]
pub struct ChurnArgs {
    #[arg(long)]
    pub customer_id: String,
    #[arg(long)]
    pub age: f64,
    #[arg(long)]
    pub credit_score: f64,
    #[arg(long)]
    pub tenure: f64,
    #[arg(long)]
    pub transaction_frequency: f64,
    #[arg(long)]
    pub avg_transaction_amount: f64,
    #[arg(long)]
    pub complaints_filed: f64,
    #[arg(long)]
    pub customer_satisfaction: f64,
    #[arg(long)]
    pub has_loan: bool,
    #[arg(long)]
    pub balance: f64,
}

#[derive(Args, Debug)]
pub struct AllowanceArgs {
    #[arg(long)]
    pub credit_score: f64,
    #[arg(long)]
    pub gender: String,
    #[arg(long)]
    pub age: f64,
    #[arg(long)]
    pub tenure: f64,
    #[arg(long)]
    pub balance: f64,
    #[arg(long)]
    pub num_of_products: f64,
    #[arg(long)]
    pub has_cr_card: bool,
    #[arg(long)]
    pub is_active_member: bool,
    #[arg(long)]
    pub estimated_salary: f64,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    /// 流失模型权重文件
    #[arg(long)]
    pub churn_model: Option<PathBuf>,
    /// 额度模型权重文件
    #[arg(long)]
    pub allowance_model: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// 带表头的 CSV 训练数据
    #[arg(long)]
    pub data: PathBuf,
    /// 目标列（取值 0/1 或 true/false）
    #[arg(long)]
    pub target: String,
    #[arg(long, value_enum)]
    pub model: ModelKind,
    /// 输出的模型 JSON
    #[arg(long)]
    pub out: PathBuf,
    #[arg(long, default_value_t = 500)]
    pub epochs: usize,
    #[arg(long, default_value_t = 0.1)]
    pub learning_rate: f64,
    /// 判为正类的概率阈值
    #[arg(long, default_value_t = 0.5)]
    pub threshold: f64,
}

impl From<TrainArgs> for TrainJob {
    fn from(args: TrainArgs) -> Self {
        Self {
            data: args.data,
            target: args.target,
            kind: args.model,
            out: args.out,
            options: TrainOptions {
                epochs: args.epochs,
                learning_rate: args.learning_rate,
                threshold: args.threshold,
            },
        }
    }
}

impl From<ChurnArgs> for ChurnRequest {
    fn from(args: ChurnArgs) -> Self {
        Self {
            customer_id: args.customer_id,
            age: args.age,
            credit_score: args.credit_score,
            tenure: args.tenure,
            transaction_frequency: args.transaction_frequency,
            avg_transaction_amount: args.avg_transaction_amount,
            complaints_filed: args.complaints_filed,
            customer_satisfaction: args.customer_satisfaction,
            has_loan: args.has_loan,
            balance: args.balance,
        }
    }
}

impl From<AllowanceArgs> for AllowanceRequest {
    fn from(args: AllowanceArgs) -> Self {
        Self {
            credit_score: args.credit_score,
            gender: args.gender,
            age: args.age,
            tenure: args.tenure,
            balance: args.balance,
            num_of_products: args.num_of_products,
            has_cr_card: args.has_cr_card,
            is_active_member: args.is_active_member,
            estimated_salary: args.estimated_salary,
        }
    }
}

impl ServeArgs {
    /// 命令行参数覆盖配置文件
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(path) = &self.churn_model {
            config.churn_model_path = path.clone();
        }
        if let Some(path) = &self.allowance_model {
            config.allowance_model_path = path.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_churn_command() {
        let cli = Cli::try_parse_from([
            "risk-lens",
            "--api-url",
            "http://10.0.0.2:8000",
            "churn",
            "--customer-id",
            "C-1",
            "--age",
            "33",
            "--credit-score",
            "640",
            "--tenure",
            "2",
            "--transaction-frequency",
            "8",
            "--avg-transaction-amount",
            "99.5",
            "--complaints-filed",
            "0",
            "--customer-satisfaction",
            "4",
            "--has-loan",
            "--balance",
            "1500",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://10.0.0.2:8000"));
        let Command::Churn(args) = cli.command else {
            panic!("应解析为 churn 子命令");
        };
        let req = ChurnRequest::from(args);
        assert_eq!(req.customer_id, "C-1");
        assert_eq!(req.avg_transaction_amount, 99.5);
        assert!(req.has_loan);
    }

    #[test]
    fn test_non_numeric_field_is_rejected() {
        let result = Cli::try_parse_from([
            "risk-lens",
            "allowance",
            "--credit-score",
            "abc",
            "--gender",
            "Female",
            "--age",
            "30",
            "--tenure",
            "1",
            "--balance",
            "0",
            "--num-of-products",
            "1",
            "--estimated-salary",
            "30000",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_allowance_flags_default_false() {
        let cli = Cli::try_parse_from([
            "risk-lens",
            "allowance",
            "--credit-score",
            "700",
            "--gender",
            "Male",
            "--age",
            "30",
            "--tenure",
            "1",
            "--balance",
            "0",
            "--num-of-products",
            "1",
            "--estimated-salary",
            "50000",
        ])
        .unwrap();

        let Command::Allowance(args) = cli.command else {
            panic!("应解析为 allowance 子命令");
        };
        let req = AllowanceRequest::from(args);
        assert!(!req.has_cr_card);
        assert!(!req.is_active_member);
        assert_eq!(req.estimated_salary, 50000.0);
    }

    #[test]
    fn test_parse_train_command() {
        let cli = Cli::try_parse_from([
            "risk-lens",
            "train",
            "--data",
            "data/bank.csv",
            "--target",
            "Churn",
            "--model",
            "churn",
            "--out",
            "models/churn_model.json",
            "--epochs",
            "200",
        ])
        .unwrap();

        let Command::Train(args) = cli.command else {
            panic!("应解析为 train 子命令");
        };
        let job = TrainJob::from(args);
        assert_eq!(job.kind, ModelKind::Churn);
        assert_eq!(job.target, "Churn");
        assert_eq!(job.options.epochs, 200);
        assert_eq!(job.options.learning_rate, 0.1);
        assert_eq!(job.out, PathBuf::from("models/churn_model.json"));
    }

    #[test]
    fn test_serve_args_override_config() {
        let mut config = Config::default();
        let args = ServeArgs {
            host: None,
            port: Some(9100),
            churn_model: Some(PathBuf::from("/srv/churn.json")),
            allowance_model: None,
        };
        args.apply(&mut config);

        assert_eq!(config.port, 9100);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.churn_model_path, PathBuf::from("/srv/churn.json"));
    }
}
