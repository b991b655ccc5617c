// ==========================================
// 资源分配工作台 - 分配仿真器
// ==========================================
// 红线: 确定性；相同输入得到相同输出（加权排序，TaskID 升序破平）
// 红线: 分配数 <= 规则作用后的产能
// 红线: 员工之间相互独立，不做跨员工排他
// ==========================================
// 职责: 技能过滤 → 规则过滤 → 加权选取 → 效率/压力计算
// 输入: EntityStore + RuleSet + PriorityWeights
// 输出: 每个员工一条 AllocationResult（按员工顺序）
// ==========================================

mod rules;
mod scoring;


use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, instrument};

use crate::config::thresholds::SimulationThresholds;
use crate::domain::allocation::{AllocationResult, SimulationReport};
use crate::domain::entity::{EntityStore, IntField, Task, Worker};
use crate::domain::priority::PriorityWeights;
use crate::domain::rule::RuleSet;
use crate::domain::types::StressLevel;

use rules::{RulePlan, WorkerState};
use scoring::{ScoringContext, WorkerView};

/// 员工基础产能: MaxLoadPerPhase（负数按 0，无法解析按 1，缺失按 0）
pub fn base_capacity(worker: &Worker) -> u32 {
    match &worker.max_load_per_phase {
        Some(IntField::Int(v)) => (*v).clamp(0, u32::MAX as i64) as u32,
        Some(IntField::Invalid(_)) => 1,
        None => 0,
    }
}

/// 效率 = clamp(round(workload / capacity * 100), 0, 100)
pub fn efficiency_of(workload: u32, capacity: u32) -> u32 {
    if capacity == 0 {
        return 0;
    }
    let pct = (workload as f64 / capacity as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u32
}

// ==========================================
// AllocationSimulator - 分配仿真器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AllocationSimulator {
    thresholds: SimulationThresholds,
}

/// 选取单元: 单个任务或整组共同执行任务
struct Unit<'a> {
    tasks: Vec<&'a Task>,
    score: f64,
}

impl Unit<'_> {
    fn lead_id(&self) -> &str {
        self.tasks.first().map(|t| t.id()).unwrap_or("")
    }
}

impl AllocationSimulator {
    pub fn new(thresholds: SimulationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &SimulationThresholds {
        &self.thresholds
    }

    /// 按阈值划分压力等级
    pub fn stress_of(&self, workload: u32, capacity: u32) -> StressLevel {
        StressLevel::classify(
            workload,
            capacity,
            self.thresholds.stress_high_ratio,
            self.thresholds.stress_medium_ratio,
        )
    }

    /// 仿真分配（只返回分配结果）
    pub fn simulate(
        &self,
        store: &EntityStore,
        rules: &RuleSet,
        weights: &PriorityWeights,
    ) -> Vec<AllocationResult> {
        self.simulate_with_report(store, rules, weights).allocations
    }

    /// 仿真分配，并报告未生效的规则
    #[instrument(skip_all, fields(
        workers = store.workers.len(),
        tasks = store.tasks.len(),
        rules = rules.len()
    ))]
    pub fn simulate_with_report(
        &self,
        store: &EntityStore,
        rules: &RuleSet,
        weights: &PriorityWeights,
    ) -> SimulationReport {
        let plan = RulePlan::compile(store, rules);
        let context = ScoringContext::new(store, weights);
        let tasks = assignable_tasks(store);

        let allocations: Vec<AllocationResult> = store
            .workers
            .iter()
            .map(|worker| self.allocate_worker(worker, &tasks, &plan, &context))
            .collect();

        let assigned: u32 = allocations.iter().map(|a| a.workload).sum();
        info!(
            assigned,
            skipped_rules = plan.skipped.len(),
            "仿真完成"
        );

        SimulationReport {
            allocations,
            skipped_rules: plan.skipped,
        }
    }

    // ==========================================
    // 单员工分配
    // ==========================================

    fn allocate_worker(
        &self,
        worker: &Worker,
        tasks: &[&Task],
        plan: &RulePlan,
        context: &ScoringContext<'_>,
    ) -> AllocationResult {
        let skills = worker.skill_set();
        let mut state = WorkerState {
            worker,
            slots: worker.available_slots.iter().copied().collect(),
            capacity: base_capacity(worker),
            candidates: tasks
                .iter()
                .copied()
                .filter(|t| t.skill_set().is_subset(&skills))
                .collect(),
        };

        for rule in &plan.rules {
            rule.apply(&mut state);
        }

        let view = WorkerView {
            slots: &state.slots,
            skill_count: skills.len(),
            capacity: state.capacity,
        };
        let mut units = build_units(&state.candidates, &plan.co_run_groups, |t| {
            context.score(t, &view)
        });
        units.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.lead_id().cmp(b.lead_id()))
        });

        let mut remaining = state.capacity as usize;
        let mut assigned_tasks = Vec::new();
        for unit in &units {
            if remaining == 0 {
                break;
            }
            if unit.tasks.len() > remaining {
                continue;
            }
            remaining -= unit.tasks.len();
            assigned_tasks.extend(unit.tasks.iter().map(|t| t.id().to_string()));
        }

        let workload = assigned_tasks.len() as u32;
        let efficiency = efficiency_of(workload, state.capacity);
        let stress = self.stress_of(workload, state.capacity);

        debug!(
            worker_id = %worker.id(),
            capacity = state.capacity,
            candidates = state.candidates.len(),
            workload,
            "员工分配完成"
        );

        AllocationResult {
            worker_id: worker.id().to_string(),
            worker_name: worker.name().to_string(),
            assigned_tasks,
            workload,
            efficiency,
            stress,
        }
    }
}

/// 可分配任务: 有 TaskID 的任务，重复 ID 只取首条
fn assignable_tasks(store: &EntityStore) -> Vec<&Task> {
    let mut seen = HashSet::new();
    store
        .tasks
        .iter()
        .filter(|t| !t.id().trim().is_empty())
        .filter(|t| seen.insert(t.id()))
        .collect()
}

/// 组装选取单元
///
/// 共同执行分组（重叠者合并）整体成为一个单元，得分取成员均值；
/// 分组成员不全在候选集中时整组放弃
fn build_units<'a>(
    candidates: &[&'a Task],
    co_run_groups: &[BTreeSet<String>],
    score: impl Fn(&Task) -> f64,
) -> Vec<Unit<'a>> {
    let mut merged: Vec<BTreeSet<String>> = Vec::new();
    for group in co_run_groups {
        let mut group = group.clone();
        let mut i = 0;
        while i < merged.len() {
            if merged[i].iter().any(|id| group.contains(id)) {
                group.extend(merged.swap_remove(i));
                i = 0;
            } else {
                i += 1;
            }
        }
        merged.push(group);
    }

    let mut units = Vec::new();
    let mut grouped: HashSet<&str> = HashSet::new();

    for group in &merged {
        grouped.extend(group.iter().map(String::as_str));
        let mut members: Vec<&'a Task> = candidates
            .iter()
            .copied()
            .filter(|t| group.contains(t.id()))
            .collect();
        if members.len() != group.len() {
            continue;
        }
        members.sort_by(|a, b| a.id().cmp(b.id()));
        let total: f64 = members.iter().map(|t| score(t)).sum();
        units.push(Unit {
            score: total / members.len() as f64,
            tasks: members,
        });
    }

    for task in candidates {
        if grouped.contains(task.id()) {
            continue;
        }
        units.push(Unit {
            score: score(task),
            tasks: vec![*task],
        });
    }

    units
}
