//! memdict Interface - 交互层
//!
//! 职责：
//! - CLI 命令行工具
//! - 随机图生成流程（random-graph）
//! - 图嵌入与还原评估流程（embed）

pub mod cli;
pub mod embed;
pub mod random_graph;



pub use cli::{execute, run_cli, Cli, CliError, Commands};
pub use embed::{embed_graphs, EmbedRecord, EmbedSummary};
pub use random_graph::{generate_graphs, GraphOutput};
