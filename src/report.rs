//! 结果持久化
//!
//! 每次运行写一个 JSON 文件：`<拓扑名小写、空格换成下划线>_results.json`。
//! 同名文件直接覆盖；写入失败是致命错误，不重试。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{BenchError, Result};

/// 一次运行的汇总。
///
/// `ptr` / `rtt_min` / `rtt_max` 与请求包数序列按位置对齐；
/// 某次试验没有样本时对应位置为 `null`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub max_bandwidth: Option<f64>,
    pub min_bandwidth: Option<f64>,
    /// 包传输耗时（毫秒）
    pub ptr: Vec<Option<f64>>,
    pub rtt_min: Vec<Option<f64>>,
    pub rtt_max: Vec<Option<f64>>,
    pub topology: String,
}

/// 拓扑名对应的结果文件名
pub fn results_file_name(topology: &str) -> String {
    format!("{}_results.json", topology.to_lowercase().replace(' ', "_"))
}

pub fn results_path(dir: &Path, topology: &str) -> PathBuf {
    dir.join(results_file_name(topology))
}

/// 写入（覆盖）结果文件，返回写入的路径
pub fn persist(summary: &SweepSummary, dir: &Path) -> Result<PathBuf> {
    let path = results_path(dir, &summary.topology);
    let body = serde_json::to_string_pretty(summary)?;
    fs::write(&path, body).map_err(|source| BenchError::Persistence {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "💾 结果已写入");
    Ok(path)
}

/// 读回结果文件
pub fn load(path: &Path) -> Result<SweepSummary> {
    let raw = fs::read_to_string(path).map_err(|source| BenchError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}
