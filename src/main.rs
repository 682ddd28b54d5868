mod cli;
mod http_client;
mod model;
mod server;
mod submitter;
mod ui;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use model::config::Config;
use model::prediction::{AllowanceRequest, ChurnRequest};
use submitter::PredictionSubmitter;
use ui::{Dashboard, Tab, TerminalAlert};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // 日志输出到 stderr，stdout 只留给面板
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| Config::default_config_path().into());
    let mut config = Config::load(&config_path)?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    tracing::debug!("已加载配置: {:?}", config.config_path());

    match cli.command {
        Command::Serve(args) => {
            args.apply(&mut config);
            server::run(&config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Train(args) => {
            let job = server::training::TrainJob::from(args);
            // 全量梯度下降是 CPU 密集任务，不占用 async 工作线程
            tokio::task::spawn_blocking(move || server::training::run(&job)).await??;
            Ok(ExitCode::SUCCESS)
        }
        Command::Churn(args) => {
            let submitter = build_submitter(&config, Tab::Loyalty)?;
            let request = ChurnRequest::from(args);
            let outcome = submitter.submit_churn(&request).await;
            Ok(finish(&submitter, outcome.is_ok()))
        }
        Command::Allowance(args) => {
            let submitter = build_submitter(&config, Tab::Allowance)?;
            let request = AllowanceRequest::from(args);
            let outcome = submitter.submit_allowance(&request).await;
            Ok(finish(&submitter, outcome.is_ok()))
        }
    }
}

fn build_submitter(config: &Config, tab: Tab) -> anyhow::Result<PredictionSubmitter> {
    let client = http_client::build_client(config.proxy_url.as_deref(), config.timeout_secs)?;

    let mut dashboard = Dashboard::default();
    dashboard.show_tab(tab);

    Ok(PredictionSubmitter::new(
        client,
        config.api_base(),
        Arc::new(Mutex::new(dashboard)),
        Arc::new(TerminalAlert),
    ))
}

fn finish(submitter: &PredictionSubmitter, ok: bool) -> ExitCode {
    let dashboard = submitter.dashboard().lock();
    tracing::debug!("risk ring: {}", dashboard.ring().style());
    println!("{}", dashboard.render());
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
