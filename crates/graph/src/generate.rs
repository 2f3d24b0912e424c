//! 随机图生成

use memdict_core::{RelationMatrix, SelfConnection};
use rand::Rng;

/// 有向图：每个元素独立地以概率 `p` 为 true
pub fn generate_directed<R: Rng + ?Sized>(num_nodes: usize, p: f64, rng: &mut R) -> RelationMatrix {
    let mut adj = RelationMatrix::new(num_nodes, num_nodes);
    for i in 0..num_nodes {
        for j in 0..num_nodes {
            adj.set(i, j, rng.r#gen::<f64>() < p);
        }
    }
    adj
}

/// 无向图：采样上三角（含对角线）后镜像，结果对称
pub fn generate_undirected<R: Rng + ?Sized>(num_nodes: usize, p: f64, rng: &mut R) -> RelationMatrix {
    let mut adj = RelationMatrix::new(num_nodes, num_nodes);
    for i in 0..num_nodes {
        for j in i..num_nodes {
            let on = rng.r#gen::<f64>() < p;
            adj.set(i, j, on);
            adj.set(j, i, on);
        }
    }
    adj
}

/// 按自结合设置生成随机图
///
/// - `All`: 对角线全部为 true
/// - `No`: 对角线全部为 false
/// - `Allow`: 保留采样结果
pub fn random_generate<R: Rng + ?Sized>(
    num_nodes: usize,
    p: f64,
    directed: bool,
    self_connection: SelfConnection,
    rng: &mut R,
) -> RelationMatrix {
    let mut adj = if directed {
        generate_directed(num_nodes, p, rng)
    } else {
        generate_undirected(num_nodes, p, rng)
    };

    match self_connection {
        SelfConnection::All => (0..num_nodes).for_each(|i| adj.set(i, i, true)),
        SelfConnection::No => (0..num_nodes).for_each(|i| adj.set(i, i, false)),
        SelfConnection::Allow => {}
    }
    adj
}
