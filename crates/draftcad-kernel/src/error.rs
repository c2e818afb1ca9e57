//! 内核错误定义
//!
//! 几何查询本身从不失败（退化情况返回空结果），只有实体校验和配置加载会报错。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KernelError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid snap settings: {0}")]
    InvalidSettings(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KernelError>;
