//! memdict Graph - 图数据工具
//!
//! 职责：
//! - 生成随机图（邻接矩阵）
//! - 邻接矩阵与边列表互转、导出 DOT
//! - 比较原图与还原图（accuracy / extra / shortage）
//! - 读写邻接矩阵文件

pub mod convert;
pub mod generate;
pub mod io;
pub mod metrics;

pub use convert::{adjacency_to_pairs, to_dot, traced_to_adjacency};
pub use generate::{generate_directed, generate_undirected, random_generate};
pub use io::{adjacency_matrix_paths, graph_names, load_adjacency, save_adjacency, ADJACENCY_FILE};
pub use metrics::{accuracy, extra, shortage, ReconstructionMetrics};

use std::path::PathBuf;
use thiserror::Error;

/// 图工具错误
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("形状不一致: {expected:?} vs {got:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("邻接矩阵必须是方阵，实际形状 {rows} x {cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("节点越界: {node} (节点数 {num_nodes})")]
    NodeOutOfRange { node: usize, num_nodes: usize },

    #[error("无效的搜索路径 {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("读写 {path} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("邻接矩阵格式错误: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
