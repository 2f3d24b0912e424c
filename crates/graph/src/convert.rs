//! 邻接矩阵、边列表、trace 结果与 DOT 文本之间的转换

use crate::{GraphError, Result};
use memdict_core::{MemoryId, RelationMatrix};
use std::fmt::Write;

/// 邻接矩阵中所有为 true 的 `(i, j)`，行优先
pub fn adjacency_to_pairs(adj: &RelationMatrix) -> Vec<(usize, usize)> {
    (0..adj.rows())
        .flat_map(|i| adj.row_members(i).map(move |j| (i, j)))
        .collect()
}

/// 由 `trace_each` 的输出重建邻接矩阵：第 `i` 行为节点 `i` 取出的节点
pub fn traced_to_adjacency(traced: &[Vec<MemoryId>], num_nodes: usize) -> Result<RelationMatrix> {
    if traced.len() != num_nodes {
        return Err(GraphError::ShapeMismatch {
            expected: (num_nodes, num_nodes),
            got: (traced.len(), num_nodes),
        });
    }
    let mut adj = RelationMatrix::new(num_nodes, num_nodes);
    for (i, ids) in traced.iter().enumerate() {
        for &j in ids {
            if j >= num_nodes {
                return Err(GraphError::NodeOutOfRange { node: j, num_nodes });
            }
            adj.set(i, j, true);
        }
    }
    Ok(adj)
}

/// 将边列表渲染为 Graphviz DOT 文本
///
/// 所有节点 `0..num_nodes` 都会声明，孤立节点也不例外。无向图中
/// `(i, j)` 与 `(j, i)` 只输出一次。
pub fn to_dot(pairs: &[(usize, usize)], directed: bool, num_nodes: usize) -> String {
    let (keyword, arrow) = if directed { ("digraph", "->") } else { ("graph", "--") };

    let mut out = String::new();
    let _ = writeln!(out, "{} G {{", keyword);
    for node in 0..num_nodes {
        let _ = writeln!(out, "    {};", node);
    }
    for &(i, j) in pairs {
        if !directed && i > j && pairs.contains(&(j, i)) {
            continue;
        }
        let _ = writeln!(out, "    {} {} {};", i, arrow, j);
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<bool>>) -> RelationMatrix {
        RelationMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_adjacency_to_pairs() {
        let adj = matrix(vec![
            vec![false, true, true],
            vec![false, false, false],
            vec![true, false, true],
        ]);
        assert_eq!(adjacency_to_pairs(&adj), vec![(0, 1), (0, 2), (2, 0), (2, 2)]);
    }

    #[test]
    fn test_traced_to_adjacency() {
        let adj = traced_to_adjacency(&[vec![1], vec![], vec![0, 2]], 3).unwrap();
        assert_eq!(
            adj,
            matrix(vec![
                vec![false, true, false],
                vec![false, false, false],
                vec![true, false, true],
            ])
        );
    }

    #[test]
    fn test_traced_to_adjacency_errors() {
        assert!(matches!(
            traced_to_adjacency(&[vec![3]], 1),
            Err(GraphError::NodeOutOfRange { node: 3, num_nodes: 1 })
        ));
        assert!(matches!(
            traced_to_adjacency(&[vec![0]], 2),
            Err(GraphError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_pairs_round_trip_through_trace_rows() {
        let adj = matrix(vec![vec![true, true], vec![false, true]]);
        let mut traced = vec![Vec::new(); 2];
        for (i, j) in adjacency_to_pairs(&adj) {
            traced[i].push(j);
        }
        assert_eq!(traced_to_adjacency(&traced, 2).unwrap(), adj);
    }

    #[test]
    fn test_to_dot_directed() {
        let dot = to_dot(&[(0, 1), (1, 0)], true, 3);
        assert_eq!(
            dot,
            "digraph G {\n    0;\n    1;\n    2;\n    0 -> 1;\n    1 -> 0;\n}\n"
        );
    }

    #[test]
    fn test_to_dot_undirected_dedups_mirrored_edges() {
        let dot = to_dot(&[(0, 1), (1, 0), (2, 2)], false, 3);
        assert!(dot.starts_with("graph G {"));
        assert_eq!(dot.matches("--").count(), 2);
        assert!(dot.contains("0 -- 1;"));
        assert!(dot.contains("2 -- 2;"));
    }
}
