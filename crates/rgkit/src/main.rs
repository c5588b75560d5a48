mod commands;
mod components;
mod workspace;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rgkit")]
#[command(about = "宣言したコンポーネントを、そのままクラウドへ。", long_about = None)]
struct Cli {
    /// 設定ファイルのパス
    #[arg(short, long, global = true, env = "RGKIT_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// state を保存するディレクトリ（省略時は設定ファイルのディレクトリ）
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// 詳細なログを出力
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// コンポーネントをデプロイ（未作成なら作成）
    Deploy {
        /// コンポーネント名
        component: String,
    },
    /// コンポーネントを削除
    Remove {
        /// コンポーネント名
        component: String,
    },
    /// コンポーネントの現在の状態を表示
    Info {
        /// コンポーネント名
        component: String,
    },
    /// 定義済みコンポーネントの一覧を表示
    List,
    /// バージョン情報を表示
    Version,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Versionコマンドは設定ファイル不要
    if matches!(cli.command, Commands::Version) {
        println!("rgkit {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let workspace = workspace::Workspace::load(cli.config, cli.state_dir)?;

    match cli.command {
        Commands::Deploy { component } => commands::deploy::handle(&workspace, &component).await,
        Commands::Remove { component } => commands::remove::handle(&workspace, &component).await,
        Commands::Info { component } => commands::info::handle(&workspace, &component).await,
        Commands::List => commands::list::handle(&workspace).await,
        Commands::Version => Ok(()),
    }
}
