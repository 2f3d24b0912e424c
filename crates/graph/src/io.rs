//! 邻接矩阵文件的查找与读写
//!
//! 一张图保存在以图名命名的目录下：`<graphs_dir>/**/<name>/adjacency_mat.json`，
//! 内容为布尔值的二维 JSON 数组。

use crate::{GraphError, Result};
use glob::glob;
use memdict_core::RelationMatrix;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 邻接矩阵文件名
pub const ADJACENCY_FILE: &str = "adjacency_mat.json";

/// 查找 `graphs_dir` 下所有邻接矩阵文件，按路径排序
pub fn adjacency_matrix_paths(graphs_dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = graphs_dir.join("**").join(ADJACENCY_FILE);
    let pattern = pattern.to_string_lossy();

    let mut paths = Vec::new();
    for entry in glob(&pattern)? {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => warn!("Glob entry error: {}", e),
        }
    }
    paths.sort();
    debug!("Found {} adjacency matrices under {}", paths.len(), graphs_dir.display());
    Ok(paths)
}

/// 每个文件所在目录的名称（图名）
pub fn graph_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.parent()
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect()
}

/// 保存邻接矩阵，必要时创建目录
pub async fn save_adjacency(path: &Path, adj: &RelationMatrix) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| GraphError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    let content = serde_json::to_vec(adj)?;
    tokio::fs::write(path, content)
        .await
        .map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// 读取邻接矩阵；非布尔元素、行长不一致、非方阵均视为错误
pub async fn load_adjacency(path: &Path) -> Result<RelationMatrix> {
    let content = tokio::fs::read(path).await.map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let adj: RelationMatrix = serde_json::from_slice(&content)?;
    if !adj.is_square() {
        return Err(GraphError::NotSquare {
            rows: adj.rows(),
            cols: adj.cols(),
        });
    }
    Ok(adj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> RelationMatrix {
        RelationMatrix::from_rows(vec![vec![false, true], vec![true, true]]).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("g1").join(ADJACENCY_FILE);
        save_adjacency(&path, &sample()).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "[[false,true],[true,true]]");
        assert_eq!(load_adjacency(&path).await.unwrap(), sample());
    }

    #[tokio::test]
    async fn test_load_rejects_bad_matrices() {
        let dir = TempDir::new().unwrap();

        let cases = [
            ("numbers.json", "[[0,1],[1,0]]"),
            ("ragged.json", "[[true,false],[true]]"),
        ];
        for (name, content) in cases {
            let path = dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            assert!(matches!(
                load_adjacency(&path).await,
                Err(GraphError::Json(_))
            ));
        }

        let path = dir.path().join("wide.json");
        std::fs::write(&path, "[[true,false,true]]").unwrap();
        assert!(matches!(
            load_adjacency(&path).await,
            Err(GraphError::NotSquare { rows: 1, cols: 3 })
        ));

        assert!(matches!(
            load_adjacency(&dir.path().join("missing.json")).await,
            Err(GraphError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_discover_graphs() {
        let dir = TempDir::new().unwrap();
        for name in ["b_graph", "nested/a_graph"] {
            save_adjacency(&dir.path().join(name).join(ADJACENCY_FILE), &sample())
                .await
                .unwrap();
        }
        std::fs::write(dir.path().join("unrelated.json"), "[]").unwrap();

        let paths = adjacency_matrix_paths(dir.path()).unwrap();
        assert_eq!(paths.len(), 2);
        let mut names = graph_names(&paths);
        names.sort();
        assert_eq!(names, vec!["a_graph", "b_graph"]);
    }

    #[test]
    fn test_discover_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(adjacency_matrix_paths(dir.path()).unwrap().is_empty());
    }
}
