// ==========================================
// 资源分配工作台 - 日志初始化
// ==========================================
// 输出: stderr（stdout 留给 CLI 报告）
// 格式: 文本 / JSON 行；级别由 RUST_LOG 控制
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化日志系统（文本格式，输出到 stderr）
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=allocation_workbench::engine=trace
///
/// # 示例
/// ```no_run
/// use allocation_workbench::logging;
/// logging::init();
/// ```
pub fn init() {
    let _ = fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// 初始化日志系统（JSON 行格式，便于日志采集）
pub fn init_json() {
    let _ = fmt()
        .json()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// 测试日志（debug 级别，重复调用安全）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
