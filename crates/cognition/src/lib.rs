//! memdict Cognition - 记忆辞书与工作记忆
//!
//! 职责：
//! - 记忆辞书契约（connect / trace / add_memories）
//! - 基于余弦相似度的记忆辞书
//! - 有界、随机淘汰的工作记忆
//!
//! 架构：
//! - AssociativeMemory: 记忆辞书 Trait
//! - CosineAssociativeMemory: 余弦相似度实现
//! - VectorStore: 单位向量表
//! - WorkingMemorySet: 工作记忆

pub mod math;
pub mod vector_store;
pub mod dictionary;
pub mod cosine;
pub mod working_memory;

pub use dictionary::{AssociativeMemory, MemDictError, TargetIds};
pub use cosine::{CosineAssociativeMemory, CosineConfig, Retrieval};
pub use vector_store::{VectorStore, WEIGHT_KEY};
pub use working_memory::{to_memory_pairs, WorkingMemoryError, WorkingMemorySet};
