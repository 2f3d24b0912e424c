//! 参数存储抽象层
//!
//! 按名称保存与载入状态字典。实现需保证：
//! - 写入是原子的，失败时不留下半写的文件
//! - 载入的数据与保存时一致，否则返回错误

use memdict_core::StateDict;

/// 持久化错误
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("记录不存在: {0}")]
    NotFound(String),

    #[error("校验和不匹配 ({name}): 期望 {expected}, 实际 {got}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        got: String,
    },

    #[error("不支持的格式版本: {0}")]
    UnsupportedVersion(u32),

    #[error("无效名称: {0}")]
    InvalidName(String),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

/// 参数存储 Trait
#[async_trait::async_trait]
pub trait ParamStore: Send + Sync {
    /// 保存状态字典（原子写入）
    async fn save(&self, name: &str, state: &StateDict) -> Result<()>;

    /// 载入状态字典；不存在时返回 `NotFound`
    async fn load(&self, name: &str) -> Result<StateDict>;

    /// 是否已保存
    async fn exists(&self, name: &str) -> Result<bool>;
}
