use std::path::PathBuf;

use dxfsvg_engine::ConvertError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("读取输入文件 {path:?} 失败: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析输入文件 {path:?} 失败: {source}")]
    ParseInput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("图纸无法转换: {0}")]
    Convert(#[from] ConvertError),
    #[error("写入输出 {target} 失败: {source}")]
    WriteOutput {
        target: String,
        #[source]
        source: std::io::Error,
    },
}
