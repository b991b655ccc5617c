// ==========================================
// 资源分配工作台 - API层错误类型
// ==========================================
// 职责: 汇总引擎/导入/契约错误，转换为面向调用方的错误消息
// ==========================================

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::error::DomainError;
use crate::engine::error::EngineError;
use crate::importer::error::ImportError;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 下层错误
    // ==========================================
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Contract(#[from] DomainError),

    #[error("配置加载失败: {0}")]
    Config(#[from] ConfigError),

    #[error("文件导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
