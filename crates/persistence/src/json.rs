//! JSON 文件存储实现
//!
//! 每个状态字典保存为 `<root>/<name>.json`：
//!
//! ```json
//! { "version": 1, "checksum": "<sha256>", "state": { "weight": [[...], ...] } }
//! ```

use crate::store::{ParamStore, PersistenceError, Result};
use memdict_core::StateDict;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 当前文件格式版本
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    checksum: String,
    state: StateDict,
}

/// 状态字典序列化结果的 SHA-256
fn checksum(state: &StateDict) -> Result<String> {
    let bytes = serde_json::to_vec(state)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// 先写入临时文件再重命名
async fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let temp_path = path.with_extension("tmp");
    tokio::fs::write(&temp_path, content).await?;
    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

/// JSON 参数存储
#[derive(Debug, Clone)]
pub struct JsonParamStore {
    /// 存储根目录
    root: PathBuf,
}

impl JsonParamStore {
    /// 创建存储，根目录不存在时创建
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// 状态字典文件路径
    pub fn path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(PersistenceError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(format!("{}.json", name)))
    }
}

#[async_trait::async_trait]
impl ParamStore for JsonParamStore {
    async fn save(&self, name: &str, state: &StateDict) -> Result<()> {
        let path = self.path(name)?;
        let envelope = Envelope {
            version: FORMAT_VERSION,
            checksum: checksum(state)?,
            state: state.clone(),
        };
        let content = serde_json::to_vec_pretty(&envelope)?;
        write_atomic(&path, &content).await?;
        debug!("Saved parameters {} to {}", name, path.display());
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<StateDict> {
        let path = self.path(name)?;
        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersistenceError::NotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let envelope: Envelope = serde_json::from_slice(&content)?;
        if envelope.version != FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion(envelope.version));
        }
        let got = checksum(&envelope.state)?;
        if got != envelope.checksum {
            return Err(PersistenceError::ChecksumMismatch {
                name: name.to_string(),
                expected: envelope.checksum,
                got,
            });
        }

        debug!("Loaded parameters {} from {}", name, path.display());
        Ok(envelope.state)
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let path = self.path(name)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}

/// 保存 `f32` 矩阵（例如记忆向量）为 JSON 数组
pub async fn save_matrix(path: &Path, matrix: &[Vec<f32>]) -> Result<()> {
    let content = serde_json::to_vec(matrix)?;
    write_atomic(path, &content).await
}

/// 读取 `save_matrix` 写出的矩阵
pub async fn load_matrix(path: &Path) -> Result<Vec<Vec<f32>>> {
    let content = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_state() -> StateDict {
        let mut state = StateDict::new();
        state.insert(
            "weight".to_string(),
            vec![vec![0.6, 0.8], vec![1.0, 0.0], vec![-0.28, 0.96]],
        );
        state
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonParamStore::new(dir.path().join("params")).await.unwrap();

        assert!(!store.exists("dict").await.unwrap());
        store.save("dict", &sample_state()).await.unwrap();
        assert!(store.exists("dict").await.unwrap());

        let loaded = store.load("dict").await.unwrap();
        assert_eq!(loaded, sample_state());
        // 不留下临时文件
        assert!(!dir.path().join("params/dict.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_missing() {
        let dir = TempDir::new().unwrap();
        let store = JsonParamStore::new(dir.path()).await.unwrap();
        let err = store.load("missing").await.unwrap_err();
        assert!(matches!(err, PersistenceError::NotFound(name) if name == "missing"));
    }

    #[tokio::test]
    async fn test_checksum_mismatch() {
        let dir = TempDir::new().unwrap();
        let store = JsonParamStore::new(dir.path()).await.unwrap();
        store.save("dict", &sample_state()).await.unwrap();

        // 篡改参数但保留原校验和
        let path = store.path("dict").unwrap();
        let mut envelope: Envelope =
            serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        envelope.state.get_mut("weight").unwrap()[0][0] = 0.0;
        tokio::fs::write(&path, serde_json::to_vec(&envelope).unwrap())
            .await
            .unwrap();

        let err = store.load("dict").await.unwrap_err();
        assert!(matches!(err, PersistenceError::ChecksumMismatch { .. }));
    }

    #[tokio::test]
    async fn test_unsupported_version() {
        let dir = TempDir::new().unwrap();
        let store = JsonParamStore::new(dir.path()).await.unwrap();
        let envelope = Envelope {
            version: FORMAT_VERSION + 1,
            checksum: checksum(&sample_state()).unwrap(),
            state: sample_state(),
        };
        tokio::fs::write(store.path("dict").unwrap(), serde_json::to_vec(&envelope).unwrap())
            .await
            .unwrap();

        let err = store.load("dict").await.unwrap_err();
        assert!(matches!(err, PersistenceError::UnsupportedVersion(v) if v == FORMAT_VERSION + 1));
    }

    #[tokio::test]
    async fn test_invalid_name() {
        let dir = TempDir::new().unwrap();
        let store = JsonParamStore::new(dir.path()).await.unwrap();
        for name in ["", "../escape", "a/b", ".."] {
            let err = store.save(name, &sample_state()).await.unwrap_err();
            assert!(matches!(err, PersistenceError::InvalidName(_)));
        }
    }

    #[tokio::test]
    async fn test_matrix_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/memory_vectors.json");
        let matrix = vec![vec![0.25, -0.5], vec![1.0, 0.0]];

        save_matrix(&path, &matrix).await.unwrap();
        assert_eq!(load_matrix(&path).await.unwrap(), matrix);
    }

    #[test]
    fn test_checksum_is_stable() {
        assert_eq!(
            checksum(&sample_state()).unwrap(),
            checksum(&sample_state()).unwrap()
        );
        assert_eq!(checksum(&StateDict::new()).unwrap().len(), 64);
    }
}
