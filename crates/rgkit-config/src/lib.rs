pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const CONFIG_CANDIDATES: [&str; 2] = ["rgkit.local.yaml", "rgkit.yaml"];
const PROJECT_DIR: &str = ".rgkit";

/// rgkit の設定ディレクトリを取得
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("rgkit");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// プロジェクトの rgkit.yaml を探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 RGKIT_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: rgkit.local.yaml, rgkit.yaml
/// 3. ./.rgkit/ ディレクトリ内: 同様の順序
/// 4. ~/.config/rgkit/rgkit.yaml (グローバル設定)
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var("RGKIT_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CONFIG_CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let project_dir = current_dir.join(PROJECT_DIR);
    if project_dir.is_dir() {
        for filename in &CONFIG_CANDIDATES {
            let path = project_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("rgkit").join("rgkit.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// 設定ファイルが属するプロジェクトのルート
///
/// `.rgkit/` 内の設定ファイルはその親ディレクトリをルートとする。
pub fn project_root(config_path: &Path) -> PathBuf {
    let dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    if dir.file_name().is_some_and(|name| name == PROJECT_DIR) {
        dir.parent().map(Path::to_path_buf).unwrap_or(dir)
    } else {
        dir
    }
}

/// rgkit.yaml の内容
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub components: BTreeMap<String, ComponentConfig>,
}

/// 1つのコンポーネント定義
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// コンポーネントの種類 (例: "aws-cloudwatch-metric-alarm")
    #[serde(rename = "type")]
    pub component_type: String,

    /// 入力値
    #[serde(default)]
    pub inputs: Value,
}

impl ProjectConfig {
    /// ファイルから読み込む
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        tracing::debug!(
            "Loaded {} components from {}",
            config.components.len(),
            path.display()
        );
        Ok(config)
    }

    /// YAML 文字列からパース
    pub fn parse(content: &str) -> Result<Self> {
        let config: ProjectConfig = serde_yaml::from_str(content)?;
        for (name, component) in &config.components {
            if !matches!(component.inputs, Value::Object(_) | Value::Null) {
                return Err(ConfigError::InvalidInputs { name: name.clone() });
            }
        }
        Ok(config)
    }

    /// 名前でコンポーネントを取得
    pub fn component(&self, name: &str) -> Result<&ComponentConfig> {
        self.components
            .get(name)
            .ok_or_else(|| ConfigError::ComponentNotFound(name.to_string()))
    }
}

impl ComponentConfig {
    /// inputs をマップとして取得
    pub fn inputs(&self) -> Map<String, Value> {
        match &self.inputs {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        }
    }

    /// state に使うインスタンスキー (`type:name`)
    pub fn instance_key(&self, name: &str) -> String {
        format!("{}:{}", self.component_type, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    const SAMPLE: &str = r#"
components:
  cpu-alarm:
    type: aws-cloudwatch-metric-alarm
    inputs:
      alarmName: cpu-high
      threshold: 90
      dimensions:
        - name: InstanceId
          value: i-0123456789
  api:
    type: google-cloud-function
    inputs:
      name: api
      labels:
        team: platform
"#;

    #[test]
    fn test_get_config_dir() {
        let result = get_config_dir();
        assert!(result.is_ok());

        let config_dir = result.unwrap();
        assert!(config_dir.ends_with("rgkit"));
        assert!(config_dir.exists());
    }

    #[test]
    fn test_parse_components() {
        let config = ProjectConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.components.len(), 2);

        let alarm = config.component("cpu-alarm").unwrap();
        assert_eq!(alarm.component_type, "aws-cloudwatch-metric-alarm");
        assert_eq!(alarm.inputs()["alarmName"], "cpu-high");
        assert_eq!(alarm.inputs()["threshold"], 90);
        assert_eq!(alarm.instance_key("cpu-alarm"), "aws-cloudwatch-metric-alarm:cpu-alarm");

        let function = config.component("api").unwrap();
        assert_eq!(function.inputs()["labels"]["team"], "platform");
    }

    #[test]
    fn test_missing_component() {
        let config = ProjectConfig::parse(SAMPLE).unwrap();
        assert!(matches!(
            config.component("nope"),
            Err(ConfigError::ComponentNotFound(_))
        ));
    }

    #[test]
    fn test_inputs_may_be_omitted() {
        let config = ProjectConfig::parse("components:\n  x:\n    type: google-cloud-function\n").unwrap();
        assert!(config.component("x").unwrap().inputs().is_empty());
    }

    #[test]
    fn test_non_map_inputs_rejected() {
        let result = ProjectConfig::parse("components:\n  x:\n    type: t\n    inputs: [1, 2]\n");
        assert!(matches!(result, Err(ConfigError::InvalidInputs { .. })));
    }

    #[test]
    fn test_project_root() {
        assert_eq!(
            project_root(Path::new("/work/app/rgkit.yaml")),
            PathBuf::from("/work/app")
        );
        assert_eq!(
            project_root(Path::new("/work/app/.rgkit/rgkit.yaml")),
            PathBuf::from("/work/app")
        );
    }

    #[test]
    #[serial]
    fn test_find_config_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("rgkit.yaml"), "components: {}").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_config_file();
        assert!(result.is_ok());
        assert!(result.unwrap().ends_with("rgkit.yaml"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_config_file_local_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("rgkit.yaml"), "components: {}").unwrap();
        fs::write(temp_dir.path().join("rgkit.local.yaml"), "components: {}").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_config_file().unwrap();

        // rgkit.local.yaml が優先される
        assert!(result.ends_with("rgkit.local.yaml"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_config_file_in_project_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        let project_dir = temp_dir.path().join(".rgkit");
        fs::create_dir(&project_dir).unwrap();
        fs::write(project_dir.join("rgkit.yaml"), "components: {}").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_config_file().unwrap();
        assert!(result.ends_with(".rgkit/rgkit.yaml"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_config_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "components: {}").unwrap();

        unsafe {
            std::env::set_var("RGKIT_CONFIG_PATH", config_path.to_str().unwrap());
        }

        let result = find_config_file().unwrap();
        assert_eq!(result, config_path);

        unsafe {
            std::env::remove_var("RGKIT_CONFIG_PATH");
        }
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("rgkit.yaml");
        fs::write(&path, SAMPLE).unwrap();

        let config = ProjectConfig::load(&path).unwrap();
        assert!(config.components.contains_key("api"));
    }
}
