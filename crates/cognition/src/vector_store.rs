//! Vector Store - 单位向量表
//!
//! 每个记忆 ID 对应一行 `num_dims` 维向量，行优先连续存放。
//! 所有行始终保持单位范数，因此行之间的内积即余弦相似度。

use crate::math::{check_dims, dot, l2_norm, random_unit_vector, MathError};
use memdict_core::{MemoryId, StateDict};
use rand::Rng;
use std::ops::Range;
use thiserror::Error;

/// 持久化时使用的参数名
pub const WEIGHT_KEY: &str = "weight";

/// 载入参数时允许的范数误差
const NORM_TOLERANCE: f32 = 1e-3;

/// 向量表错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VectorStoreError {
    #[error("参数缺失: {0}")]
    MissingParameter(String),

    #[error("形状不匹配: 期望 {expected:?}, 实际 {got:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("第 {row} 行不是单位向量 (范数 {norm})")]
    NotNormalized { row: usize, norm: f32 },

    #[error("向量维数必须大于 0")]
    ZeroDimension,

    #[error(transparent)]
    Math(#[from] MathError),
}

/// 单位向量表
///
/// 构造时拒绝 `num_dims == 0`，之后维数不再改变。
#[derive(Debug, Clone, PartialEq)]
pub struct VectorStore {
    num_dims: usize,
    data: Vec<f32>,
}

impl VectorStore {
    /// 标准正态采样后逐行归一化
    pub fn random<R: Rng + ?Sized>(
        num_memory: usize,
        num_dims: usize,
        rng: &mut R,
    ) -> Result<Self, VectorStoreError> {
        if num_dims == 0 {
            return Err(VectorStoreError::ZeroDimension);
        }
        let mut store = Self {
            num_dims,
            data: Vec::with_capacity(num_memory * num_dims),
        };
        store.append_random(num_memory, rng);
        Ok(store)
    }

    /// 从行向量构建；每行必须已经是单位向量
    pub fn from_rows(num_dims: usize, rows: &[Vec<f32>]) -> Result<Self, VectorStoreError> {
        if num_dims == 0 {
            return Err(VectorStoreError::ZeroDimension);
        }
        let mut data = Vec::with_capacity(rows.len() * num_dims);
        for (i, row) in rows.iter().enumerate() {
            check_dims(row, num_dims)?;
            let norm = l2_norm(row);
            if !((norm - 1.0).abs() <= NORM_TOLERANCE) {
                return Err(VectorStoreError::NotNormalized { row: i, norm });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { num_dims, data })
    }

    /// 记忆数
    pub fn len(&self) -> usize {
        self.data.len() / self.num_dims
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn num_dims(&self) -> usize {
        self.num_dims
    }

    /// 调用方保证 `id < len()`
    pub fn vector(&self, id: MemoryId) -> &[f32] {
        &self.data[id * self.num_dims..(id + 1) * self.num_dims]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.num_dims)
    }

    /// 所有向量之和
    pub fn column_sum(&self) -> Vec<f32> {
        let mut sum = vec![0.0f32; self.num_dims];
        for row in self.rows() {
            for (s, x) in sum.iter_mut().zip(row) {
                *s += x;
            }
        }
        sum
    }

    /// `query` 与每一行的内积
    pub fn similarities(&self, query: &[f32]) -> Vec<f32> {
        self.rows().map(|row| dot(row, query)).collect()
    }

    /// 追加 `num` 个随机单位向量，返回新 ID 区间
    pub fn append_random<R: Rng + ?Sized>(&mut self, num: usize, rng: &mut R) -> Range<MemoryId> {
        let start = self.len();
        self.data.reserve(num * self.num_dims);
        for _ in 0..num {
            let v = random_unit_vector(rng, self.num_dims);
            self.data.extend_from_slice(&v);
        }
        start..start + num
    }

    /// 批量替换行；调用方保证每行已归一化且 ID 有效
    pub(crate) fn replace_rows(&mut self, rows: Vec<(MemoryId, Vec<f32>)>) {
        for (id, row) in rows {
            debug_assert_eq!(row.len(), self.num_dims);
            let start = id * self.num_dims;
            self.data[start..start + self.num_dims].copy_from_slice(&row);
        }
    }

    /// 导出为 `{"weight": num_memory x num_dims}`
    pub fn state_dict(&self) -> StateDict {
        let weight = self.rows().map(<[f32]>::to_vec).collect();
        let mut state = StateDict::new();
        state.insert(WEIGHT_KEY.to_string(), weight);
        state
    }

    /// 从状态字典载入；形状必须与当前一致，失败时不修改
    pub fn load_state_dict(&mut self, state: &StateDict) -> Result<(), VectorStoreError> {
        let weight = state
            .get(WEIGHT_KEY)
            .ok_or_else(|| VectorStoreError::MissingParameter(WEIGHT_KEY.to_string()))?;

        let got_dims = weight.first().map(Vec::len).unwrap_or(self.num_dims);
        if weight.len() != self.len() || got_dims != self.num_dims {
            return Err(VectorStoreError::ShapeMismatch {
                expected: (self.len(), self.num_dims),
                got: (weight.len(), got_dims),
            });
        }

        *self = Self::from_rows(self.num_dims, weight)?;
        Ok(())
    }
}
