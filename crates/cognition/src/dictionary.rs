//! 记忆辞书契约
//!
//! 各记忆按 0 起的连续 ID 管理，ID 空间只增不减。
//!
//! 用法：
//! 1. 指定记忆数与向量维数构建具体实现
//! 2. `connect(src_ids, tgt_ids)` 登记每个源记忆连接到的记忆
//! 3. `trace(src_ids)` 取出与任一源记忆相连的记忆（合并查询）；
//!    逐个查询使用 `trace_each`
//! 4. `add_memories(num)` 扩充 ID 空间
//! 5. `get_memory_vector(src_ids)` 取得记忆向量

use crate::math::MathError;
use crate::vector_store::VectorStoreError;
use memdict_core::{MemoryId, RelationMatrix};
use std::collections::HashMap;
use thiserror::Error;

/// 记忆辞书错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MemDictError {
    #[error("tgt_ids 行数 {tgt} 与 src_ids 长度 {src} 不一致")]
    LengthMismatch { src: usize, tgt: usize },

    #[error("目标矩阵列数应为 num_memory = {expected}, 实际为 {got}")]
    ColumnMismatch { expected: usize, got: usize },

    #[error("记忆 ID 越界: {id} (num_memory = {num_memory})")]
    IdOutOfRange { id: MemoryId, num_memory: usize },

    #[error("src_ids 中存在重复 ID: {0}")]
    DuplicateSource(MemoryId),

    #[error("向量更新失败: {0}")]
    Math(#[from] MathError),

    #[error("参数载入失败: {0}")]
    State(#[from] VectorStoreError),
}

/// `connect` 的目标输入
///
/// 两种编码等价：每个源记忆的目标 ID 列表，或形状为
/// `(len(src_ids), num_memory)` 的布尔矩阵。
#[derive(Debug, Clone, PartialEq)]
pub enum TargetIds {
    Lists(Vec<Vec<MemoryId>>),
    Matrix(RelationMatrix),
}

impl From<Vec<Vec<MemoryId>>> for TargetIds {
    fn from(lists: Vec<Vec<MemoryId>>) -> Self {
        TargetIds::Lists(lists)
    }
}

impl From<RelationMatrix> for TargetIds {
    fn from(matrix: RelationMatrix) -> Self {
        TargetIds::Matrix(matrix)
    }
}

/// 记忆辞书 Trait
pub trait AssociativeMemory {
    /// 当前记忆数
    fn num_memory(&self) -> usize;

    /// 记忆向量维数
    fn num_dims(&self) -> usize;

    /// 登记连接关系，更新内部状态使之后的 `trace` 更容易还原该关系
    fn connect(&mut self, src_ids: &[MemoryId], tgt_ids: TargetIds) -> Result<(), MemDictError>;

    /// 取出与 `src_ids` 中任一记忆相连的记忆，无重复、升序
    fn trace(&mut self, src_ids: &[MemoryId]) -> Result<Vec<MemoryId>, MemDictError>;

    /// 扩充 `num` 个记忆，ID 为 `[num_memory, num_memory + num)`
    fn add_memories(&mut self, num: usize);

    /// 每个 ID 对应的记忆向量，形状 `(len(src_ids), num_dims)`
    fn get_memory_vector(&self, src_ids: &[MemoryId]) -> Result<Vec<Vec<f32>>, MemDictError>;

    /// 对每个 ID 单独执行 `trace`
    fn trace_each(&mut self, src_ids: &[MemoryId]) -> Result<Vec<Vec<MemoryId>>, MemDictError> {
        src_ids.iter().map(|&id| self.trace(&[id])).collect()
    }

    /// 将目标输入规范化为 `(src_len, num_memory)` 的布尔矩阵
    fn format_tgt_ids(
        &self,
        src_len: usize,
        tgt_ids: TargetIds,
    ) -> Result<RelationMatrix, MemDictError> {
        let num_memory = self.num_memory();
        match tgt_ids {
            TargetIds::Matrix(matrix) => {
                if matrix.rows() != src_len {
                    return Err(MemDictError::LengthMismatch {
                        src: src_len,
                        tgt: matrix.rows(),
                    });
                }
                if matrix.cols() != num_memory {
                    return Err(MemDictError::ColumnMismatch {
                        expected: num_memory,
                        got: matrix.cols(),
                    });
                }
                Ok(matrix)
            }
            TargetIds::Lists(lists) => {
                if lists.len() != src_len {
                    return Err(MemDictError::LengthMismatch {
                        src: src_len,
                        tgt: lists.len(),
                    });
                }
                let mut matrix = RelationMatrix::new(src_len, num_memory);
                for (row, targets) in lists.iter().enumerate() {
                    for &id in targets {
                        check_id(id, num_memory)?;
                        matrix.set(row, id, true);
                    }
                }
                Ok(matrix)
            }
        }
    }

    /// 校验 ID 范围；`unique` 为 true 时同时拒绝重复
    fn validate_ids(&self, ids: &[MemoryId], unique: bool) -> Result<(), MemDictError> {
        let num_memory = self.num_memory();
        let mut seen = vec![false; if unique { num_memory } else { 0 }];
        for &id in ids {
            check_id(id, num_memory)?;
            if unique {
                if seen[id] {
                    return Err(MemDictError::DuplicateSource(id));
                }
                seen[id] = true;
            }
        }
        Ok(())
    }

    /// 将 (源, 目标) 对按源分组后一次性 `connect`
    ///
    /// 例如 `M1 -> M3, M2 -> M3` 成为 `connect([1, 2], [[3], [3]])`。
    fn connect_pairs(&mut self, pairs: &[(MemoryId, MemoryId)]) -> Result<(), MemDictError> {
        let mut order: Vec<MemoryId> = Vec::new();
        let mut grouped: HashMap<MemoryId, Vec<MemoryId>> = HashMap::new();
        for &(src, tgt) in pairs {
            grouped
                .entry(src)
                .or_insert_with(|| {
                    order.push(src);
                    Vec::new()
                })
                .push(tgt);
        }
        if order.is_empty() {
            return Ok(());
        }
        let targets = order
            .iter()
            .map(|src| grouped.remove(src).unwrap_or_default())
            .collect::<Vec<_>>();
        self.connect(&order, TargetIds::Lists(targets))
    }
}

fn check_id(id: MemoryId, num_memory: usize) -> Result<(), MemDictError> {
    if id >= num_memory {
        return Err(MemDictError::IdOutOfRange { id, num_memory });
    }
    Ok(())
}
