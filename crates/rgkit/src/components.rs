use colored::Colorize;
use rgkit_core::{Logger, Record, ResourceClient};
use std::sync::Arc;

/// 対応しているコンポーネントの種類
pub const SUPPORTED: [&str; 2] = [rgkit_aws_alarm::KIND, rgkit_gcf::KIND];

/// 種類に対応するクライアントを作成
pub fn client_for(kind: &str) -> anyhow::Result<Arc<dyn ResourceClient>> {
    match kind {
        rgkit_aws_alarm::KIND => Ok(Arc::new(rgkit_aws_alarm::MetricAlarmClient::new())),
        rgkit_gcf::KIND => Ok(Arc::new(rgkit_gcf::CloudFunctionClient::new())),
        other => Err(anyhow::anyhow!(
            "未対応のコンポーネントです: {}\n対応している種類: {}",
            other,
            SUPPORTED.join(", ")
        )),
    }
}

/// info で表示する項目
pub fn summary(kind: &str, state: &Record) -> Vec<(&'static str, String)> {
    match kind {
        rgkit_aws_alarm::KIND => rgkit_aws_alarm::summary(state),
        rgkit_gcf::KIND => rgkit_gcf::summary(state),
        _ => Vec::new(),
    }
}

pub fn print_summary(kind: &str, state: &Record) {
    for (label, value) in summary(kind, state) {
        println!("  {:<14} {}", format!("{}:", label).bold(), value);
    }
}

/// 進捗をコンソールに出すロガー
pub fn console_logger() -> Arc<dyn Logger> {
    Arc::new(|message: &str| println!("{} {}", "→".blue(), message))
}
