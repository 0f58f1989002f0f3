//! 错误类型
//!
//! 解析未命中（ParseMiss）不是错误，用 `Option::None` 表示；
//! 工具调用失败在试验层被降级为“无样本”，只有持久化失败会终止运行。

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    /// 用户选择了不存在的拓扑
    #[error("Invalid choice: {0:?}")]
    InvalidTopologyKind(String),

    /// 外部工具无法启动、退出码非零且无输出等
    #[error("`{command}` on {host} failed: {reason}")]
    ToolInvocation {
        host: String,
        command: String,
        reason: String,
    },

    #[error("emulator: {0}")]
    Emulator(String),

    #[error("unknown host {0:?}")]
    UnknownHost(String),

    /// 结果文件写入失败（致命）
    #[error("cannot write results to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Config(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, BenchError>;
