//! 原图与还原图的比较指标（百分比）

use crate::{GraphError, Result};
use memdict_core::RelationMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;

fn check_shape(adj: &RelationMatrix, rec: &RelationMatrix) -> Result<()> {
    if adj.shape() != rec.shape() {
        return Err(GraphError::ShapeMismatch {
            expected: adj.shape(),
            got: rec.shape(),
        });
    }
    Ok(())
}

/// 一致元素的比例
pub fn accuracy(adj: &RelationMatrix, rec: &RelationMatrix) -> Result<f64> {
    check_shape(adj, rec)?;
    if adj.is_empty() {
        return Ok(100.0);
    }
    let equal = adj
        .cells()
        .iter()
        .zip(rec.cells())
        .filter(|(a, b)| a == b)
        .count();
    Ok(equal as f64 / adj.len() as f64 * 100.0)
}

/// `rec` 中多出来的连接（`rec` 为 true 而 `adj` 为 false）的比例
pub fn extra(adj: &RelationMatrix, rec: &RelationMatrix) -> Result<f64> {
    check_shape(adj, rec)?;
    if adj.is_empty() {
        return Ok(0.0);
    }
    let extra = adj
        .cells()
        .iter()
        .zip(rec.cells())
        .filter(|&(&a, &b)| b && !a)
        .count();
    Ok(extra as f64 / adj.len() as f64 * 100.0)
}

/// `rec` 中缺少的连接的比例
pub fn shortage(adj: &RelationMatrix, rec: &RelationMatrix) -> Result<f64> {
    extra(rec, adj)
}

/// 还原结果的三项指标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionMetrics {
    pub accuracy: f64,
    pub extra: f64,
    pub shortage: f64,
}

impl ReconstructionMetrics {
    pub fn compute(adj: &RelationMatrix, rec: &RelationMatrix) -> Result<Self> {
        Ok(Self {
            accuracy: accuracy(adj, rec)?,
            extra: extra(adj, rec)?,
            shortage: shortage(adj, rec)?,
        })
    }
}

impl fmt::Display for ReconstructionMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accuracy: {:3.2}%, extra: {:3.2}%, shortage: {:3.2}%",
            self.accuracy, self.extra, self.shortage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<bool>>) -> RelationMatrix {
        RelationMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_metrics() {
        let adj = matrix(vec![vec![true, false], vec![true, true]]);
        let rec = matrix(vec![vec![true, true], vec![false, true]]);

        assert_eq!(accuracy(&adj, &rec).unwrap(), 50.0);
        assert_eq!(extra(&adj, &rec).unwrap(), 25.0);
        assert_eq!(shortage(&adj, &rec).unwrap(), 25.0);
    }

    #[test]
    fn test_perfect_reconstruction() {
        let adj = matrix(vec![vec![true, false], vec![false, true]]);
        let m = ReconstructionMetrics::compute(&adj, &adj).unwrap();
        assert_eq!(
            m,
            ReconstructionMetrics {
                accuracy: 100.0,
                extra: 0.0,
                shortage: 0.0
            }
        );
        assert_eq!(m.to_string(), "accuracy: 100.00%, extra: 0.00%, shortage: 0.00%");
    }

    #[test]
    fn test_shape_mismatch() {
        let a = RelationMatrix::new(2, 2);
        let b = RelationMatrix::new(3, 3);
        assert!(matches!(
            accuracy(&a, &b),
            Err(GraphError::ShapeMismatch { expected: (2, 2), got: (3, 3) })
        ));
        assert!(ReconstructionMetrics::compute(&a, &b).is_err());
    }

    #[test]
    fn test_display_precision() {
        let m = ReconstructionMetrics {
            accuracy: 87.5,
            extra: 1.0 / 3.0 * 100.0,
            shortage: 0.0,
        };
        assert_eq!(m.to_string(), "accuracy: 87.50%, extra: 33.33%, shortage: 0.00%");
    }
}
