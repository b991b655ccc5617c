// ==========================================
// 资源分配工作台 - 命令行入口
// ==========================================
// 流程: 导入 CSV → 校验 →（可选）批量修复 → 仿真 →（可选）优化 → 导出配置
// ==========================================

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use allocation_workbench::api::AllocationSession;
use allocation_workbench::importer::load_store_from_dir;
use allocation_workbench::{logging, APP_NAME, VERSION};

/// 资源分配工作台 CLI
#[derive(Parser)]
#[command(name = "allocation-workbench")]
#[command(about = "校验、修复并仿真客户/员工/任务数据", long_about = None)]
#[command(version)]
struct Cli {
    /// 数据目录（包含 clients.csv / workers.csv / tasks.csv）
    data_dir: PathBuf,

    /// 规则文件（JSON 数组）
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// 配置文件（JSON 对象，key → value）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 权重预设（balanced / maximizeFulfillment / fairDistribution / minimizeWorkload）
    #[arg(short, long)]
    preset: Option<String>,

    /// 优化目标（fair / cost / priority）
    #[arg(short, long)]
    objective: Option<String>,

    /// 仿真前批量应用自动修复
    #[arg(long)]
    fix_all: bool,

    /// 导出配置文件路径
    #[arg(long)]
    output: Option<PathBuf>,

    /// 导出清洗后的实体仓 JSON
    #[arg(long)]
    export_store: Option<PathBuf>,

    /// JSON 日志
    #[arg(long)]
    json_log: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.json_log {
        logging::init_json();
    } else {
        logging::init();
    }
    tracing::info!("{} v{}", APP_NAME, VERSION);

    let store = load_store_from_dir(&cli.data_dir)
        .with_context(|| format!("无法导入数据目录 {}", cli.data_dir.display()))?;

    let mut session = match &cli.config {
        Some(path) => AllocationSession::with_config_file(store, path)?,
        None => AllocationSession::new(store),
    };

    if let Some(path) = &cli.rules {
        let json = fs::read_to_string(path)
            .with_context(|| format!("无法读取规则文件 {}", path.display()))?;
        let count = session.load_rules_json(&json)?;
        tracing::info!(count, "规则已加载");
    }
    if let Some(preset) = &cli.preset {
        session.apply_preset(preset)?;
    }

    // 1) 校验
    session.validate();
    print_findings(&session);

    // 2) 批量修复
    if cli.fix_all {
        let report = session.fix_all();
        println!(
            "\n批量修复: 成功 {}，跳过 {}，失败 {}",
            report.applied.len(),
            report.skipped.len(),
            report.failed.len()
        );
        for failure in &report.failed {
            println!("  [失败] {}: {}", failure.finding_id, failure.reason);
        }
        print_findings(&session);
    }

    // 3) 仿真
    let report = session.simulate();
    println!("\n分配仿真:");
    for allocation in &report.allocations {
        println!(
            "  {} ({}): 任务 [{}]，负载 {}，效率 {}%，压力 {}",
            allocation.worker_id,
            allocation.worker_name,
            allocation.assigned_tasks.join(", "),
            allocation.workload,
            allocation.efficiency,
            allocation.stress
        );
    }
    for skipped in &report.skipped_rules {
        println!("  [规则跳过] {} ({}): {}", skipped.rule_id, skipped.kind, skipped.reason);
    }

    // 4) 优化
    if let Some(objective) = &cli.objective {
        let result = session.optimize(objective);
        println!("\n优化目标 \"{}\":", result.objective);
        for line in &result.improvements {
            println!("  {}", line);
        }
    }

    // 5) 导出
    if let Some(path) = &cli.output {
        fs::write(path, session.export_config_json()?)
            .with_context(|| format!("无法写入配置文件 {}", path.display()))?;
        println!("\n配置已导出: {}", path.display());
    }
    if let Some(path) = &cli.export_store {
        fs::write(path, session.export_store_json()?)
            .with_context(|| format!("无法写入实体仓文件 {}", path.display()))?;
        println!("实体仓已导出: {}", path.display());
    }

    Ok(())
}

fn print_findings(session: &AllocationSession) {
    let summary = session.summary();
    println!(
        "\n校验结果: 错误 {}，警告 {}，提示 {}（可自动修复 {}）",
        summary.errors, summary.warnings, summary.infos, summary.auto_fixable
    );
    for finding in session.findings() {
        println!(
            "  [{}] {} {} {}: {}",
            finding.severity, finding.id, finding.entity_type, finding.entity_id, finding.message
        );
    }
}
