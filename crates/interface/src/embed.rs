//! 图嵌入流程
//!
//! 对每个学习率与每张图：
//! 1. 以节点数构建记忆辞书，`connect(全部节点, 邻接矩阵)` 重复 `epochs` 次
//! 2. `trace_each(全部节点)` 还原邻接矩阵并计算指标
//! 3. 结果写入 `out_dir/dt{dict_type}_lr{lr}_{opt}/{graph_name}/`
//!
//! 全部结果汇总到 `out_dir/summary.json`。

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use memdict_cognition::{
    AssociativeMemory, CosineAssociativeMemory, CosineConfig, MemDictError, Retrieval,
};
use memdict_core::{DictType, EmbedSettings, MemoryId, RelationMatrix};
use memdict_graph::{
    adjacency_matrix_paths, adjacency_to_pairs, graph_names, load_adjacency, to_dot,
    traced_to_adjacency, ReconstructionMetrics,
};
use memdict_persistence::{save_matrix, JsonParamStore, ParamStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use ulid::Ulid;

pub const METRICS_FILE: &str = "metrics.txt";
pub const MEMORY_VECTORS_FILE: &str = "memory_vectors.json";
pub const REC_GRAPH_FILE: &str = "rec_graph.dot";
pub const SUMMARY_FILE: &str = "summary.json";
/// `JsonParamStore` 中的参数名，对应 `params.json`
pub const PARAMS_NAME: &str = "params";

/// 单次嵌入的结果
#[derive(Debug, Clone, Serialize)]
pub struct EmbedRecord {
    pub graph_name: String,
    pub lr: f32,
    pub option: String,
    pub save_dir: PathBuf,
    pub metrics: ReconstructionMetrics,
}

/// 一次运行的汇总
#[derive(Debug, Clone, Serialize)]
pub struct EmbedSummary {
    pub run_id: Ulid,
    pub created_at: DateTime<Utc>,
    pub settings: EmbedSettings,
    pub records: Vec<EmbedRecord>,
}

/// 按配置构建记忆辞书
pub fn build_dictionary(
    settings: &EmbedSettings,
    num_nodes: usize,
    lr: f32,
) -> Result<CosineAssociativeMemory, MemDictError> {
    match settings.dict_type {
        DictType::Cossim => {
            let config = CosineConfig {
                lr,
                retrieval: Retrieval::from_settings(settings.retrieval, settings.threshold),
            };
            let rng = match settings.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            CosineAssociativeMemory::with_rng(num_nodes, settings.num_dims, config, rng)
        }
    }
}

/// 结果目录
pub fn save_dir(settings: &EmbedSettings, lr: f32, option: &str, graph_name: &str) -> PathBuf {
    settings
        .out_dir
        .join(format!("dt{}_lr{}_{}", settings.dict_type, lr, option))
        .join(graph_name)
}

/// 执行全部嵌入
pub async fn embed_graphs(settings: &EmbedSettings) -> Result<EmbedSummary> {
    let graph_paths = adjacency_matrix_paths(&settings.graphs_dir)
        .with_context(|| format!("searching graphs under {}", settings.graphs_dir.display()))?;
    let names = graph_names(&graph_paths);
    if graph_paths.is_empty() {
        warn!("No adjacency matrices found under {}", settings.graphs_dir.display());
    }
    info!(
        "lrs: {}, graphs: {}, total: {}",
        settings.lrs.len(),
        graph_paths.len(),
        settings.lrs.len() * graph_paths.len()
    );

    let mut records = Vec::new();
    for &lr in &settings.lrs {
        for (path, name) in graph_paths.iter().zip(&names) {
            let record = embed_one(settings, lr, path, name)
                .await
                .with_context(|| format!("embedding {} with lr {}", name, lr))?;
            records.push(record);
        }
    }

    let summary = EmbedSummary {
        run_id: Ulid::new(),
        created_at: Utc::now(),
        settings: settings.clone(),
        records,
    };
    tokio::fs::create_dir_all(&settings.out_dir).await?;
    let summary_path = settings.out_dir.join(SUMMARY_FILE);
    tokio::fs::write(&summary_path, serde_json::to_vec_pretty(&summary)?)
        .await
        .with_context(|| format!("writing {}", summary_path.display()))?;

    Ok(summary)
}

async fn embed_one(
    settings: &EmbedSettings,
    lr: f32,
    path: &Path,
    graph_name: &str,
) -> Result<EmbedRecord> {
    let adj = load_adjacency(path).await?;
    let num_nodes = adj.rows();

    let mut dict = build_dictionary(settings, num_nodes, lr)?;
    let option = dict.config().option_label();
    let src_ids: Vec<MemoryId> = (0..num_nodes).collect();

    for epoch in 0..settings.epochs {
        dict.connect(&src_ids, adj.clone().into())?;
        debug!("{} epoch {} done", graph_name, epoch + 1);
    }

    let traced = dict.trace_each(&src_ids)?;
    let rec = traced_to_adjacency(&traced, num_nodes)?;
    let metrics = ReconstructionMetrics::compute(&adj, &rec)?;

    let dir = save_dir(settings, lr, &option, graph_name);
    info!("save to {}", dir.display());
    write_results(&dir, &dict, &src_ids, &rec, &metrics).await?;

    Ok(EmbedRecord {
        graph_name: graph_name.to_string(),
        lr,
        option,
        save_dir: dir,
        metrics,
    })
}

async fn write_results(
    dir: &Path,
    dict: &CosineAssociativeMemory,
    src_ids: &[MemoryId],
    rec: &RelationMatrix,
    metrics: &ReconstructionMetrics,
) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;

    tokio::fs::write(dir.join(METRICS_FILE), metrics.to_string()).await?;

    let vectors = dict.get_memory_vector(src_ids)?;
    save_matrix(&dir.join(MEMORY_VECTORS_FILE), &vectors).await?;

    let dot = to_dot(&adjacency_to_pairs(rec), true, rec.rows());
    tokio::fs::write(dir.join(REC_GRAPH_FILE), dot).await?;

    let store = JsonParamStore::new(dir).await?;
    store.save(PARAMS_NAME, &dict.state_dict()).await?;
    Ok(())
}
