// ==========================================
// 资源分配工作台 - 分配结果
// ==========================================
// 红线: 派生数据，每次仿真重算，不作为权威状态持久化
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::rule::RuleKind;
use crate::domain::types::StressLevel;

// ==========================================
// AllocationResult - 单个员工的分配结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub worker_id: String,
    pub worker_name: String,
    pub assigned_tasks: Vec<String>,
    pub workload: u32,
    pub efficiency: u32, // 0-100
    pub stress: StressLevel,
}

// ==========================================
// SkippedRule - 未生效规则（悬空引用等）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRule {
    pub rule_id: String,
    pub kind: RuleKind,
    pub reason: String,
}

// ==========================================
// SimulationReport - 仿真结果 + 规则报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub allocations: Vec<AllocationResult>,
    pub skipped_rules: Vec<SkippedRule>,
}

// ==========================================
// OptimizationDeltas - 优化前后汇总差值
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationDeltas {
    pub high_stress_before: usize,
    pub high_stress_after: usize,
    pub avg_efficiency_before: f64,
    pub avg_efficiency_after: f64,
    pub workload_variance_before: f64,
    pub workload_variance_after: f64,
}

impl OptimizationDeltas {
    pub fn stress_reduction(&self) -> i64 {
        self.high_stress_before as i64 - self.high_stress_after as i64
    }

    pub fn efficiency_gain(&self) -> f64 {
        self.avg_efficiency_after - self.avg_efficiency_before
    }

    pub fn variance_reduction(&self) -> f64 {
        self.workload_variance_before - self.workload_variance_after
    }
}

// ==========================================
// OptimizationResult - 优化对比
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub objective: String,
    pub before: Vec<AllocationResult>,
    pub after: Vec<AllocationResult>,
    pub improvements: Vec<String>,
    pub deltas: OptimizationDeltas,
}
