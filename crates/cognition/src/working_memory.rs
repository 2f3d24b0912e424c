//! Working Memory - 有容量上限的记忆 ID 缓冲区
//!
//! 加入 `k` 个新 ID 时，若已有的 `l` 个（不在新 ID 中的）元素放不下，
//! 随机淘汰 `k + l - alpha` 个；新 ID 总是保留。

use memdict_core::{memory_id, IdArray, IdError, IdInput, IdWidth, MemoryId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// 工作记忆错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkingMemoryError {
    #[error("无效的记忆 ID 输入: {0}")]
    InvalidInput(#[from] IdError),

    #[error("输入声明为已排序，但不是严格升序")]
    NotSorted,

    #[error("输入含重复 ID {0}，但未声明 is_duplicated")]
    Duplicated(i64),

    #[error("新 ID 数 {got} 超过容量 {capacity}")]
    TooManyInputs { got: usize, capacity: usize },

    #[error("载入 {got} 个 ID，超过容量 {capacity}")]
    CapacityViolation { got: usize, capacity: usize },
}

/// 工作记忆集合
#[derive(Debug, Clone)]
pub struct WorkingMemorySet {
    id_width: IdWidth,
    max_length: usize,
    memories: Vec<i64>,
    rng: StdRng,
}

impl WorkingMemorySet {
    /// 容量 `max_length`，ID 宽度 i64
    pub fn new(max_length: usize) -> Self {
        Self::with_width(max_length, IdWidth::default())
    }

    pub fn with_width(max_length: usize, id_width: IdWidth) -> Self {
        Self::with_rng(max_length, id_width, StdRng::from_entropy())
    }

    pub fn with_rng(max_length: usize, id_width: IdWidth, rng: StdRng) -> Self {
        Self {
            id_width,
            max_length,
            memories: Vec::with_capacity(max_length),
            rng,
        }
    }

    /// 当前内容；新加入的 ID 在前
    pub fn memories(&self) -> &[i64] {
        &self.memories
    }

    pub fn len(&self) -> usize {
        self.memories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memories.is_empty()
    }

    /// 容量 alpha
    pub fn capacity(&self) -> usize {
        self.max_length
    }

    pub fn id_width(&self) -> IdWidth {
        self.id_width
    }

    /// 加入记忆 ID
    ///
    /// - `is_sorted`: 调用方保证输入已严格升序，跳过排序（会校验）
    /// - `is_duplicated`: 输入可能含重复，排序并去重
    ///
    /// 失败时集合不变。
    pub fn add(
        &mut self,
        input_ids: impl Into<IdInput>,
        is_sorted: bool,
        is_duplicated: bool,
    ) -> Result<(), WorkingMemoryError> {
        let mut ids = input_ids.into().into_canonical(self.id_width)?;
        if let Some(&neg) = ids.iter().find(|&&id| id < 0) {
            return Err(IdError::Negative(neg).into());
        }

        if is_duplicated {
            ids.sort_unstable();
            ids.dedup();
        } else if !is_sorted {
            ids.sort_unstable();
        }
        for w in ids.windows(2) {
            if w[0] > w[1] {
                return Err(WorkingMemoryError::NotSorted);
            }
            if w[0] == w[1] {
                return Err(WorkingMemoryError::Duplicated(w[0]));
            }
        }

        let k = ids.len();
        if k > self.max_length {
            return Err(WorkingMemoryError::TooManyInputs {
                got: k,
                capacity: self.max_length,
            });
        }

        let mut survivors: Vec<i64> = self
            .memories
            .iter()
            .copied()
            .filter(|m| ids.binary_search(m).is_err())
            .collect();
        let keep = self.max_length - k;
        let evicted = survivors.len().saturating_sub(keep);
        if evicted > 0 {
            survivors.shuffle(&mut self.rng);
            survivors.truncate(keep);
        }

        ids.extend(survivors);
        self.memories = ids;
        debug!(
            "Working memory added {} ids, evicted {}, size {}/{}",
            k,
            evicted,
            self.memories.len(),
            self.max_length
        );
        Ok(())
    }

    /// 生成 `(源, 目标)` 对
    ///
    /// 源按当前顺序排列；`duplicate` 为 false 时目标是源的随机排列，
    /// 为 true 时目标从集合中有放回地抽取。
    pub fn create_pairs(&mut self, duplicate: bool) -> Vec<[i64; 2]> {
        let targets: Vec<i64> = if duplicate {
            (0..self.memories.len())
                .map(|_| self.memories[self.rng.gen_range(0..self.memories.len())])
                .collect()
        } else {
            let mut perm = self.memories.clone();
            perm.shuffle(&mut self.rng);
            perm
        };

        self.memories
            .iter()
            .zip(targets)
            .map(|(&src, tgt)| [src, tgt])
            .collect()
    }

    /// 用 `ids` 替换当前内容
    ///
    /// 超过容量时返回 `CapacityViolation`，含重复 ID（包括宽度转换后
    /// 回绕产生的重复）时返回 `Duplicated`；元素宽度与配置不同时
    /// 发出警告后转换。失败时集合不变。
    pub fn load_memories(&mut self, ids: IdArray) -> Result<(), WorkingMemoryError> {
        if ids.len() > self.max_length {
            return Err(WorkingMemoryError::CapacityViolation {
                got: ids.len(),
                capacity: self.max_length,
            });
        }
        if ids.width() != Some(self.id_width) {
            warn!(
                "Loaded memories have element type {}, converting to {}",
                ids.element_type(),
                self.id_width
            );
        }

        let memories = ids.coerce(self.id_width)?;
        if let Some(&neg) = memories.iter().find(|&&id| id < 0) {
            return Err(IdError::Negative(neg).into());
        }
        let mut sorted = memories.clone();
        sorted.sort_unstable();
        if let Some(w) = sorted.windows(2).find(|w| w[0] == w[1]) {
            return Err(WorkingMemoryError::Duplicated(w[0]));
        }
        self.memories = memories;
        info!("Loaded {} working memories", self.memories.len());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.memories.clear();
    }
}

impl fmt::Display for WorkingMemorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkingMemory(max_length={}) {:?}", self.max_length, self.memories)
    }
}

/// 把 `create_pairs` 的输出转换为记忆辞书使用的 ID 对
pub fn to_memory_pairs(pairs: &[[i64; 2]]) -> Result<Vec<(MemoryId, MemoryId)>, IdError> {
    pairs
        .iter()
        .map(|&[src, tgt]| Ok((memory_id(src)?, memory_id(tgt)?)))
        .collect()
}
