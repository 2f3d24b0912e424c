// memdict Core - 核心数据模型
//!
//! 包含：
//! - MemoryId / RelationMatrix: 记忆 ID 与关系矩阵
//! - IdWidth / IdArray / IdInput: 工作记忆的 ID 表示与规范化
//! - Settings: 运行配置（JSON / YAML）

mod config;
mod memory;

pub use config::*;
pub use memory::*;
