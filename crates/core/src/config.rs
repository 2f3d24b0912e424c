//! memdict 配置系统
//!
//! 支持 JSON 与 YAML 配置文件（按扩展名选择）

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// 配置错误
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown {key}: {value}")]
    UnknownOption { key: &'static str, value: String },

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// 读取配置文件
///
/// `.yaml` / `.yml` 使用 YAML，其余按 JSON 解析
pub fn load_settings<T: DeserializeOwned>(path: &Path) -> Result<T, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    debug!("Loading settings from {} (yaml: {})", path.display(), is_yaml);

    if is_yaml {
        Ok(serde_yaml::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

/// 记忆辞书的实现类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", rename_all = "lowercase")]
pub enum DictType {
    #[default]
    Cossim,
}

impl FromStr for DictType {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cossim" => Ok(DictType::Cossim),
            other => Err(SettingsError::UnknownOption {
                key: "dict_type",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for DictType {
    type Error = SettingsError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for DictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictType::Cossim => write!(f, "cossim"),
        }
    }
}

/// 检索方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", rename_all = "lowercase")]
pub enum RetrievalKind {
    /// 相似度作为伯努利概率
    #[default]
    Stochastic,
    /// 相似度严格大于阈值
    Threshold,
}

impl FromStr for RetrievalKind {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stochastic" => Ok(RetrievalKind::Stochastic),
            "threshold" => Ok(RetrievalKind::Threshold),
            other => Err(SettingsError::UnknownOption {
                key: "retrieval",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for RetrievalKind {
    type Error = SettingsError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// 自环设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", rename_all = "lowercase")]
pub enum SelfConnection {
    /// 所有节点自环，对角全为 true
    All,
    /// 没有自环，对角全为 false
    No,
    /// 按连接概率决定
    #[default]
    Allow,
}

impl FromStr for SelfConnection {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(SelfConnection::All),
            "no" => Ok(SelfConnection::No),
            "allow" => Ok(SelfConnection::Allow),
            other => Err(SettingsError::UnknownOption {
                key: "self_connection",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for SelfConnection {
    type Error = SettingsError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for SelfConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelfConnection::All => "all",
            SelfConnection::No => "no",
            SelfConnection::Allow => "allow",
        };
        write!(f, "{}", name)
    }
}

/// 图嵌入配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedSettings {
    /// 嵌入维数
    pub num_dims: usize,

    /// 图目录，每个图位于 graphs_dir/**/adjacency_mat.json
    pub graphs_dir: PathBuf,

    /// 学习率列表
    pub lrs: Vec<f32>,

    /// 结果输出目录
    pub out_dir: PathBuf,

    /// 辞书类型
    #[serde(default)]
    pub dict_type: DictType,

    /// 检索方式
    #[serde(default)]
    pub retrieval: RetrievalKind,

    /// Threshold 模式下的阈值
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// connect 重复次数
    #[serde(default = "default_epochs")]
    pub epochs: usize,

    /// 随机种子
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_threshold() -> f32 {
    0.8
}

fn default_epochs() -> usize {
    1
}

impl EmbedSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.num_dims == 0 {
            return Err(SettingsError::Invalid("num_dims must be positive".to_string()));
        }
        if self.lrs.is_empty() {
            return Err(SettingsError::Invalid("lrs must not be empty".to_string()));
        }
        if let Some(lr) = self.lrs.iter().find(|lr| !lr.is_finite()) {
            return Err(SettingsError::Invalid(format!("lr must be finite, got {}", lr)));
        }
        if !self.threshold.is_finite() {
            return Err(SettingsError::Invalid("threshold must be finite".to_string()));
        }
        if self.epochs == 0 {
            return Err(SettingsError::Invalid("epochs must be positive".to_string()));
        }
        Ok(())
    }
}

/// 随机图生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomGraphSettings {
    /// 节点数
    pub num_nodes: usize,

    /// 连接概率，每个元素生成一张图
    pub connection_probs: Vec<f64>,

    /// 是否有向
    #[serde(default = "default_true")]
    pub directed: bool,

    /// 自环设置
    #[serde(default)]
    pub self_connection: SelfConnection,

    /// 输出根目录
    pub outdir: PathBuf,

    /// 目录名后缀
    #[serde(default)]
    pub suffix: String,

    /// 随机种子
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_true() -> bool {
    true
}

impl RandomGraphSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.num_nodes == 0 {
            return Err(SettingsError::Invalid("num_nodes must be positive".to_string()));
        }
        if let Some(p) = self
            .connection_probs
            .iter()
            .find(|p| !(0.0..=1.0).contains(*p))
        {
            return Err(SettingsError::Invalid(format!(
                "connection probability must be in [0, 1], got {}",
                p
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_embed_settings_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "embed.json",
            r#"{"num_dims": 64, "graphs_dir": "graphs", "lrs": [1.0, 10.0], "out_dir": "out"}"#,
        );

        let s: EmbedSettings = load_settings(&path).unwrap();
        assert_eq!(s.num_dims, 64);
        assert_eq!(s.dict_type, DictType::Cossim);
        assert_eq!(s.retrieval, RetrievalKind::Stochastic);
        assert!((s.threshold - 0.8).abs() < f32::EPSILON);
        assert_eq!(s.epochs, 1);
        assert!(s.seed.is_none());
        s.validate().unwrap();
    }

    #[test]
    fn test_yaml_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "graph.yaml",
            "num_nodes: 8\nconnection_probs: [0.1, 0.5]\nself_connection: \"no\"\noutdir: graphs\nseed: 7\n",
        );

        let s: RandomGraphSettings = load_settings(&path).unwrap();
        assert_eq!(s.num_nodes, 8);
        assert!(s.directed);
        assert_eq!(s.self_connection, SelfConnection::No);
        assert_eq!(s.seed, Some(7));
    }

    #[test]
    fn test_unknown_option_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "embed.json",
            r#"{"num_dims": 4, "graphs_dir": "g", "lrs": [1.0], "out_dir": "o", "retrieval": "greedy"}"#,
        );
        let err = load_settings::<EmbedSettings>(&path).unwrap_err();
        assert!(err.to_string().contains("greedy"));

        assert!(matches!(
            "sometimes".parse::<SelfConnection>(),
            Err(SettingsError::UnknownOption { key: "self_connection", .. })
        ));
        assert!("hopfield".parse::<DictType>().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = load_settings::<EmbedSettings>(Path::new("/nonexistent/settings.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }

    #[test]
    fn test_validation() {
        let mut s = RandomGraphSettings {
            num_nodes: 4,
            connection_probs: vec![0.5],
            directed: true,
            self_connection: SelfConnection::Allow,
            outdir: PathBuf::from("g"),
            suffix: String::new(),
            seed: None,
        };
        s.validate().unwrap();

        s.connection_probs.push(1.5);
        assert!(matches!(s.validate(), Err(SettingsError::Invalid(_))));
    }
}
