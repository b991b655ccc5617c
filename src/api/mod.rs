// ==========================================
// 资源分配工作台 - API 层
// ==========================================
// 职责: 面向调用方（CLI / 上层服务）的会话接口与配置导出
// ==========================================

pub mod error;
pub mod export;
pub mod session;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use export::{ConfigExport, EXPORT_VERSION};
pub use session::AllocationSession;
