//! Cosine Memory Dictionary - 基于余弦相似度的记忆辞书
//!
//! 职责：
//! - 不经过反向传播，直接更新记忆向量（connect）
//! - 按相似度取出相连的记忆（trace）
//!
//! 设计原则：
//! - 所有向量保持单位范数，内积即余弦相似度，检索时无需重算范数
//! - 同一次 connect 的所有源向量都基于更新前的向量表计算，结果与批内顺序无关

use crate::dictionary::{AssociativeMemory, MemDictError, TargetIds};
use crate::math::l2_normalize;
use crate::vector_store::VectorStore;
use memdict_core::{MemoryId, RetrievalKind, StateDict};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// 检索方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Retrieval {
    /// 相似度截断到 [0, 1] 后作为伯努利概率采样
    Stochastic,
    /// 相似度严格大于阈值时取出
    Threshold(f32),
}

impl Retrieval {
    pub fn from_settings(kind: RetrievalKind, threshold: f32) -> Self {
        match kind {
            RetrievalKind::Stochastic => Retrieval::Stochastic,
            RetrievalKind::Threshold => Retrieval::Threshold(threshold),
        }
    }
}

/// 余弦记忆辞书配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CosineConfig {
    /// 学习率，越大每次 connect 时向量移动越多
    pub lr: f32,

    /// 检索方式
    pub retrieval: Retrieval,
}

impl Default for CosineConfig {
    fn default() -> Self {
        Self {
            lr: 1.0,
            retrieval: Retrieval::Stochastic,
        }
    }
}

impl CosineConfig {
    /// 用于输出目录名的选项字符串
    pub fn option_label(&self) -> String {
        match self.retrieval {
            Retrieval::Stochastic => "stc".to_string(),
            Retrieval::Threshold(t) => format!("thres{}", t),
        }
    }
}

/// 余弦记忆辞书
#[derive(Debug, Clone)]
pub struct CosineAssociativeMemory {
    store: VectorStore,
    config: CosineConfig,
    rng: StdRng,
}

impl CosineAssociativeMemory {
    /// 使用系统熵初始化随机源
    pub fn new(
        num_memory: usize,
        num_dims: usize,
        config: CosineConfig,
    ) -> Result<Self, MemDictError> {
        Self::with_rng(num_memory, num_dims, config, StdRng::from_entropy())
    }

    /// 固定种子，结果可复现
    pub fn seeded(
        num_memory: usize,
        num_dims: usize,
        config: CosineConfig,
        seed: u64,
    ) -> Result<Self, MemDictError> {
        Self::with_rng(num_memory, num_dims, config, StdRng::seed_from_u64(seed))
    }

    /// 注入随机源；向量初始化、随机检索、add_memories 都使用它
    ///
    /// `num_dims == 0` 时返回 `VectorStoreError::ZeroDimension`
    pub fn with_rng(
        num_memory: usize,
        num_dims: usize,
        config: CosineConfig,
        mut rng: StdRng,
    ) -> Result<Self, MemDictError> {
        let store = VectorStore::random(num_memory, num_dims, &mut rng)?;
        debug!(
            "Created cosine memory dictionary ({} x {}, lr {}, {:?})",
            num_memory, num_dims, config.lr, config.retrieval
        );
        Ok(Self { store, config, rng })
    }

    pub fn config(&self) -> &CosineConfig {
        &self.config
    }

    pub fn set_retrieval(&mut self, retrieval: Retrieval) {
        self.config.retrieval = retrieval;
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// `id` 与所有记忆的余弦相似度
    pub fn similarities(&self, id: MemoryId) -> Result<Vec<f32>, MemDictError> {
        self.validate_ids(&[id], false)?;
        Ok(self.store.similarities(self.store.vector(id)))
    }

    /// 导出参数 `{"weight": ...}`
    pub fn state_dict(&self) -> StateDict {
        self.store.state_dict()
    }

    /// 载入参数；形状不一致时失败且不修改
    pub fn load_state_dict(&mut self, state: &StateDict) -> Result<(), MemDictError> {
        self.store.load_state_dict(state)?;
        Ok(())
    }

    fn retrieve(&mut self, similarity: f32) -> bool {
        match self.config.retrieval {
            Retrieval::Stochastic => {
                // NaN compares false and is never retrieved
                let p = similarity.clamp(0.0, 1.0);
                self.rng.r#gen::<f32>() < p
            }
            Retrieval::Threshold(threshold) => similarity > threshold,
        }
    }
}

impl AssociativeMemory for CosineAssociativeMemory {
    fn num_memory(&self) -> usize {
        self.store.len()
    }

    fn num_dims(&self) -> usize {
        self.store.num_dims()
    }

    /// 把内积最大化作为目标求更新方向后再归一化：
    /// 对源向量 `v`，`grad = Σ_j sign_j·w_j / num_memory`，
    /// 相连记忆 `sign = -1`，其余 `sign = +1`，`v ← normalize(v - lr·grad)`。
    fn connect(&mut self, src_ids: &[MemoryId], tgt_ids: TargetIds) -> Result<(), MemDictError> {
        self.validate_ids(src_ids, true)?;
        let cons = self.format_tgt_ids(src_ids.len(), tgt_ids)?;
        if src_ids.is_empty() {
            return Ok(());
        }

        let num_memory = self.num_memory() as f32;
        let num_dims = self.num_dims();
        let lr = self.config.lr;

        // Σ_j sign_j·w_j = Σ_j w_j - 2·Σ_{j∈targets} w_j
        let total = self.store.column_sum();

        let mut updates = Vec::with_capacity(src_ids.len());
        for (row, &src) in src_ids.iter().enumerate() {
            let mut connected = vec![0.0f32; num_dims];
            for j in cons.row_members(row) {
                for (c, x) in connected.iter_mut().zip(self.store.vector(j)) {
                    *c += x;
                }
            }

            let mut updated: Vec<f32> = self
                .store
                .vector(src)
                .iter()
                .zip(total.iter().zip(&connected))
                .map(|(v, (t, c))| v - lr * (t - 2.0 * c) / num_memory)
                .collect();
            l2_normalize(&mut updated)?;
            updates.push((src, updated));
        }

        self.store.replace_rows(updates);
        debug!(
            "Connected {} sources ({} links)",
            src_ids.len(),
            cons.count_true()
        );
        Ok(())
    }

    fn trace(&mut self, src_ids: &[MemoryId]) -> Result<Vec<MemoryId>, MemDictError> {
        self.validate_ids(src_ids, false)?;

        let mut hits = vec![false; self.num_memory()];
        for &sid in src_ids {
            let sims = self.store.similarities(self.store.vector(sid));
            for (hit, sim) in hits.iter_mut().zip(sims) {
                if self.retrieve(sim) {
                    *hit = true;
                }
            }
        }

        Ok(hits
            .iter()
            .enumerate()
            .filter_map(|(id, &hit)| hit.then_some(id))
            .collect())
    }

    fn add_memories(&mut self, num: usize) {
        let ids = self.store.append_random(num, &mut self.rng);
        debug!("Added memories {:?}", ids);
    }

    fn get_memory_vector(&self, src_ids: &[MemoryId]) -> Result<Vec<Vec<f32>>, MemDictError> {
        self.validate_ids(src_ids, false)?;
        Ok(src_ids
            .iter()
            .map(|&id| self.store.vector(id).to_vec())
            .collect())
    }
}
