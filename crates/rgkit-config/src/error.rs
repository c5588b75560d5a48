use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: rgkit.local.yaml, rgkit.yaml\n\
        - ./.rgkit/ ディレクトリ\n\
        - ~/.config/rgkit/rgkit.yaml\n\
        または RGKIT_CONFIG_PATH 環境変数で直接指定できます"
    )]
    ConfigFileNotFound,

    #[error("コンポーネントが定義されていません: {0}")]
    ComponentNotFound(String),

    #[error("コンポーネント {name} の inputs はマップである必要があります")]
    InvalidInputs { name: String },

    #[error("YAML パースエラー: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
