//! 向量运算：L2 归一化、内积、随机单位向量

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use thiserror::Error;

/// 向量运算错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MathError {
    #[error("无法归一化零向量")]
    ZeroVector,

    #[error("向量包含 NaN 或 Inf")]
    NonFinite,

    #[error("维数不一致: 期望 {expected}, 实际 {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// L2 范数
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// 原地 L2 归一化
pub fn l2_normalize(v: &mut [f32]) -> Result<(), MathError> {
    if v.iter().any(|x| !x.is_finite()) {
        return Err(MathError::NonFinite);
    }
    let norm = l2_norm(v);
    if norm == 0.0 || !norm.is_finite() {
        return Err(MathError::ZeroVector);
    }
    for x in v.iter_mut() {
        *x /= norm;
    }
    Ok(())
}

/// 内积；对单位向量即余弦相似度
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// 检查维数
pub fn check_dims(v: &[f32], expected: usize) -> Result<(), MathError> {
    if v.len() != expected {
        return Err(MathError::DimensionMismatch {
            expected,
            got: v.len(),
        });
    }
    Ok(())
}

/// 从标准正态分布采样后归一化得到的随机单位向量
///
/// `dims` 必须大于 0；`VectorStore` 在构造时保证这一点。
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R, dims: usize) -> Vec<f32> {
    assert!(dims > 0, "cannot draw a unit vector of dimension 0");
    let mut v = vec![0.0f32; dims];
    loop {
        for x in v.iter_mut() {
            *x = StandardNormal.sample(rng);
        }
        // all-zero draws are the only failure mode; resample
        if l2_normalize(&mut v).is_ok() {
            return v;
        }
    }
}
