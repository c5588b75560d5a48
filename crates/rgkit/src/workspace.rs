use colored::Colorize;
use rgkit_config::{ComponentConfig, ProjectConfig};
use rgkit_core::{FileStateStore, Record};
use std::path::PathBuf;

/// 読み込んだ設定と state の保存先
pub struct Workspace {
    pub config_path: PathBuf,
    pub config: ProjectConfig,
    pub state_dir: PathBuf,
}

impl Workspace {
    pub fn load(config: Option<PathBuf>, state_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let config_path = match config {
            Some(path) if path.exists() => path,
            Some(path) => {
                return Err(anyhow::anyhow!(
                    "設定ファイルが見つかりません: {}",
                    path.display()
                ));
            }
            None => rgkit_config::find_config_file()?,
        };

        let config = ProjectConfig::load(&config_path)?;
        let state_dir = state_dir.unwrap_or_else(|| rgkit_config::project_root(&config_path));

        Ok(Self {
            config_path,
            config,
            state_dir,
        })
    }

    pub fn store(&self) -> FileStateStore {
        FileStateStore::new(&self.state_dir)
    }

    /// コンポーネント定義・インスタンスキー・入力値
    pub fn component(&self, name: &str) -> anyhow::Result<(&ComponentConfig, String, Record)> {
        let component = self.config.component(name).map_err(|e| {
            let available = self
                .config
                .components
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            anyhow::anyhow!("{}\n利用可能なコンポーネント: {}", e, available)
        })?;

        let key = component.instance_key(name);
        let inputs = Record::from(component.inputs());
        Ok((component, key, inputs))
    }

    pub fn print_header(&self, title: &str, name: &str, kind: &str) {
        println!("{}", title.blue().bold());
        println!("📄 {}", self.config_path.display().to_string().cyan());
        println!("コンポーネント: {} ({})", name.cyan(), kind);
        println!();
    }
}
