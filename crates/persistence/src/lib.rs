//! memdict Persistence - 参数持久化层
//!
//! 记忆辞书的参数以状态字典 (`{"weight": 矩阵}`) 的形式保存。
//!
//! 设计原则：
//! - 原子写入（临时文件 + rename）
//! - 载入时校验 SHA-256 校验和

pub mod store;
pub mod json;

pub use store::{ParamStore, PersistenceError, Result};
pub use json::{load_matrix, save_matrix, JsonParamStore, FORMAT_VERSION};
