// ==========================================
// 资源分配工作台 - 分配优化器
// ==========================================
// 红线: 启发式演示，不是求解器；只保证变化方向
// 红线: fair 目标下负载方差不增大，负载不超过产能
// ==========================================
// 职责: 基线仿真 → 按目标调整 → 压力重算 → 改进说明
// 输入: EntityStore + 目标描述（大小写不敏感子串匹配）
// 输出: OptimizationResult {before, after, improvements, deltas}
// ==========================================

use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

use crate::config::thresholds::OptimizerFactors;
use crate::domain::allocation::{AllocationResult, OptimizationDeltas, OptimizationResult};
use crate::domain::entity::EntityStore;
use crate::domain::priority::PriorityWeights;
use crate::domain::rule::RuleSet;
use crate::domain::types::StressLevel;
use crate::engine::simulator::{base_capacity, efficiency_of, AllocationSimulator};

// ==========================================
// OptimizationObjective - 优化目标
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationObjective {
    Fair,     // 负载均衡
    Cost,     // 降低成本
    Priority, // 高优先级客户
}

impl OptimizationObjective {
    /// 解析目标描述（优先级: fair > cost > priority）
    pub fn parse(objective: &str) -> Option<Self> {
        let lower = objective.to_lowercase();
        if lower.contains("fair") {
            Some(Self::Fair)
        } else if lower.contains("cost") {
            Some(Self::Cost)
        } else if lower.contains("priority") {
            Some(Self::Priority)
        } else {
            None
        }
    }
}

// ==========================================
// Optimizer - 分配优化器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct Optimizer {
    simulator: AllocationSimulator,
    factors: OptimizerFactors,
}

impl Optimizer {
    pub fn new(simulator: AllocationSimulator, factors: OptimizerFactors) -> Self {
        Self { simulator, factors }
    }

    /// 执行优化
    ///
    /// before 为无规则、默认权重下的基线仿真；
    /// 目标无法识别时 after 与 before 相同，并在 improvements 中说明
    #[instrument(skip(self, store), fields(workers = store.workers.len()))]
    pub fn optimize(&self, store: &EntityStore, objective: &str) -> OptimizationResult {
        let before = self.simulator.simulate(
            store,
            &RuleSet::new(Vec::new()),
            &PriorityWeights::default(),
        );
        let capacities: HashMap<&str, u32> = store
            .workers
            .iter()
            .map(|w| (w.id(), base_capacity(w)))
            .collect();

        let parsed = OptimizationObjective::parse(objective);
        let mut after = before.clone();
        match parsed {
            Some(OptimizationObjective::Fair) => {
                self.balance_workload(store, &mut after, &capacities)
            },
            Some(OptimizationObjective::Cost) => self.reduce_cost(&mut after),
            Some(OptimizationObjective::Priority) => self.boost_priority(store, &mut after),
            None => warn!(objective, "未识别的优化目标"),
        }

        for allocation in &mut after {
            let capacity = capacities
                .get(allocation.worker_id.as_str())
                .copied()
                .unwrap_or(0);
            allocation.stress = self.simulator.stress_of(allocation.workload, capacity);
        }

        let deltas = compute_deltas(&before, &after);
        let mut improvements = describe(&deltas);
        if parsed.is_none() {
            improvements.insert(
                0,
                format!("未识别的优化目标 \"{}\"，分配结果保持不变", objective),
            );
        }

        info!(
            objective = ?parsed,
            stress_reduction = deltas.stress_reduction(),
            efficiency_gain = deltas.efficiency_gain(),
            "优化完成"
        );

        OptimizationResult {
            objective: objective.to_string(),
            before,
            after,
            improvements,
            deltas,
        }
    }

    // ==========================================
    // 目标策略
    // ==========================================

    /// fair: 每个员工的负载向均值靠拢一半（取整，不越过均值）
    ///
    /// 下调时从已分配任务末尾移出；上调只能接收被移出且技能匹配的任务，
    /// 且不超过产能。workload 始终等于 assigned_tasks 数量
    fn balance_workload(
        &self,
        store: &EntityStore,
        allocations: &mut [AllocationResult],
        capacities: &HashMap<&str, u32>,
    ) {
        if allocations.is_empty() {
            return;
        }
        let mean = mean_workload(allocations);
        let targets: Vec<u32> = allocations
            .iter()
            .map(|allocation| {
                let deviation = mean - allocation.workload as f64;
                let step = (deviation / 2.0).round();
                let step = if step.abs() > deviation.abs() { 0.0 } else { step };
                (allocation.workload as f64 + step).max(0.0) as u32
            })
            .collect();

        // 下调: 移出的任务进入待分配池
        let mut pool: Vec<String> = Vec::new();
        for (allocation, &target) in allocations.iter_mut().zip(&targets) {
            if target < allocation.workload {
                pool.extend(allocation.assigned_tasks.drain(target as usize..));
                allocation.workload = target;
            }
        }

        // 上调: 受产能与技能约束
        for (allocation, &target) in allocations.iter_mut().zip(&targets) {
            let capacity = capacities
                .get(allocation.worker_id.as_str())
                .copied()
                .unwrap_or(0);
            let target = target.min(capacity);
            if target > allocation.workload {
                let skills = store
                    .find_worker(&allocation.worker_id)
                    .map(|w| w.skill_set())
                    .unwrap_or_default();
                while (allocation.assigned_tasks.len() as u32) < target {
                    let Some(pos) = pool.iter().position(|task_id| {
                        !allocation.assigned_tasks.contains(task_id)
                            && store
                                .find_task(task_id)
                                .map(|t| t.skill_set().is_subset(&skills))
                                .unwrap_or(false)
                    }) else {
                        break;
                    };
                    allocation.assigned_tasks.push(pool.remove(pos));
                }
                allocation.workload = allocation.assigned_tasks.len() as u32;
            }
            allocation.efficiency = efficiency_of(allocation.workload, capacity);
        }

        if !pool.is_empty() {
            debug!(unassigned = pool.len(), "均衡后未重新分配的任务");
        }
    }

    /// cost: 负载按比例下调，效率按系数上调（封顶 100）
    fn reduce_cost(&self, allocations: &mut [AllocationResult]) {
        let keep = 1.0 - self.factors.cost_workload_reduction;
        for allocation in allocations.iter_mut() {
            let workload = (allocation.workload as f64 * keep).round().max(0.0) as u32;
            set_workload(allocation, workload);
            let boosted = (allocation.efficiency as f64 * self.factors.cost_efficiency_factor).round();
            allocation.efficiency = boosted.clamp(0.0, 100.0) as u32;
        }
    }

    /// priority: 承担高优先级客户任务的员工效率上调（封顶 100）
    fn boost_priority(&self, store: &EntityStore, allocations: &mut [AllocationResult]) {
        let urgent: HashSet<&str> = store
            .clients
            .iter()
            .filter(|c| {
                c.priority()
                    .map(|p| p >= self.factors.high_priority_level)
                    .unwrap_or(false)
            })
            .flat_map(|c| c.requested_task_ids.iter().map(String::as_str))
            .collect();

        for allocation in allocations.iter_mut() {
            if allocation
                .assigned_tasks
                .iter()
                .any(|t| urgent.contains(t.as_str()))
            {
                allocation.efficiency =
                    (allocation.efficiency + self.factors.priority_efficiency_boost).min(100);
            }
        }
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 调整负载；负载下降时同步截断已分配任务
fn set_workload(allocation: &mut AllocationResult, workload: u32) {
    allocation.workload = workload;
    if (workload as usize) < allocation.assigned_tasks.len() {
        allocation.assigned_tasks.truncate(workload as usize);
    }
}

fn mean_workload(allocations: &[AllocationResult]) -> f64 {
    if allocations.is_empty() {
        return 0.0;
    }
    allocations.iter().map(|a| a.workload as f64).sum::<f64>() / allocations.len() as f64
}

/// 负载总体方差
pub fn workload_variance(allocations: &[AllocationResult]) -> f64 {
    if allocations.is_empty() {
        return 0.0;
    }
    let mean = mean_workload(allocations);
    allocations
        .iter()
        .map(|a| (a.workload as f64 - mean).powi(2))
        .sum::<f64>()
        / allocations.len() as f64
}

fn average_efficiency(allocations: &[AllocationResult]) -> f64 {
    if allocations.is_empty() {
        return 0.0;
    }
    allocations.iter().map(|a| a.efficiency as f64).sum::<f64>() / allocations.len() as f64
}

fn high_stress_count(allocations: &[AllocationResult]) -> usize {
    allocations
        .iter()
        .filter(|a| a.stress == StressLevel::High)
        .count()
}

fn compute_deltas(before: &[AllocationResult], after: &[AllocationResult]) -> OptimizationDeltas {
    OptimizationDeltas {
        high_stress_before: high_stress_count(before),
        high_stress_after: high_stress_count(after),
        avg_efficiency_before: average_efficiency(before),
        avg_efficiency_after: average_efficiency(after),
        workload_variance_before: workload_variance(before),
        workload_variance_after: workload_variance(after),
    }
}

fn describe(deltas: &OptimizationDeltas) -> Vec<String> {
    vec![
        format!(
            "高压力员工: {} → {}（减少 {}）",
            deltas.high_stress_before,
            deltas.high_stress_after,
            deltas.stress_reduction()
        ),
        format!(
            "平均效率: {:.1}% → {:.1}%（{:+.1}）",
            deltas.avg_efficiency_before,
            deltas.avg_efficiency_after,
            deltas.efficiency_gain()
        ),
        format!(
            "负载方差: {:.2} → {:.2}（降低 {:.2}）",
            deltas.workload_variance_before,
            deltas.workload_variance_after,
            deltas.variance_reduction()
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Client, Task, Worker};

    fn create_test_worker(worker_id: &str, max_load: i64) -> Worker {
        let mut worker = Worker::new(worker_id, &format!("Worker {}", worker_id), max_load);
        worker.skills = ["coding".to_string()].into_iter().collect();
        worker.available_slots = vec![1, 2, 3];
        worker
    }

    /// W1 产能 4（满载），W2 产能 1，W3 产能 0
    fn create_test_store() -> EntityStore {
        let tasks = (1..=4)
            .map(|i| {
                let mut task = Task::new(&format!("T{}", i), "Build", 1);
                task.required_skills = ["coding".to_string()].into_iter().collect();
                task
            })
            .collect();
        let mut client = Client::new("C1", "Acme", 5);
        client.requested_task_ids = vec!["T1".to_string()];

        EntityStore::new(
            vec![client],
            vec![
                create_test_worker("W1", 4),
                create_test_worker("W2", 1),
                create_test_worker("W3", 0),
            ],
            tasks,
        )
    }

    #[test]
    fn test_objective_parse_precedence() {
        assert_eq!(
            OptimizationObjective::parse("Fair cost"),
            Some(OptimizationObjective::Fair)
        );
        assert_eq!(
            OptimizationObjective::parse("LOW COST priority"),
            Some(OptimizationObjective::Cost)
        );
        assert_eq!(
            OptimizationObjective::parse("high-priority"),
            Some(OptimizationObjective::Priority)
        );
        assert_eq!(OptimizationObjective::parse("speed"), None);
    }

    #[test]
    fn test_fair_does_not_increase_variance() {
        let optimizer = Optimizer::default();
        let result = optimizer.optimize(&create_test_store(), "fair");

        // before: 4, 1, 0 → mean 5/3；W3 产能 0，不能上调
        let workloads: Vec<u32> = result.after.iter().map(|a| a.workload).collect();
        assert_eq!(workloads, vec![3, 1, 0]);
        assert!(result.deltas.workload_variance_after < result.deltas.workload_variance_before);
        assert_eq!(result.after[0].assigned_tasks.len(), 3);
        assert!(result.after[2].assigned_tasks.is_empty());
        assert_eq!(result.after[2].efficiency, 0);
        assert_eq!(result.improvements.len(), 3);
    }

    #[test]
    fn test_fair_respects_capacity_and_assigned_tasks() {
        let mut store = create_test_store();
        store.workers.push(create_test_worker("W4", 3));
        let capacities: HashMap<String, u32> = store
            .workers
            .iter()
            .map(|w| (w.id().to_string(), base_capacity(w)))
            .collect();

        let result = Optimizer::default().optimize(&store, "fair");

        for allocation in &result.after {
            assert!(allocation.workload <= capacities[&allocation.worker_id]);
            assert_eq!(allocation.workload as usize, allocation.assigned_tasks.len());
        }
        assert!(result.deltas.workload_variance_after <= result.deltas.workload_variance_before);
    }

    #[test]
    fn test_cost_reduces_workload_and_raises_efficiency() {
        let optimizer = Optimizer::default();
        let result = optimizer.optimize(&create_test_store(), "Minimize COST");

        assert_eq!(result.before[0].workload, 4);
        assert_eq!(result.after[0].workload, 3);
        assert_eq!(result.after[0].efficiency, 100);
        assert_eq!(result.after[0].stress, StressLevel::Medium);
        assert!(result.after.iter().all(|a| a.efficiency <= 100));
    }

    #[test]
    fn test_priority_boosts_workers_on_urgent_tasks() {
        let mut store = create_test_store();
        store.workers[0].max_load_per_phase = Some(crate::domain::entity::IntField::Int(8));
        let optimizer = Optimizer::default();

        let result = optimizer.optimize(&store, "priority");

        // W1: 4/8 = 50 → 65；W2 分到的是 T1（请求任务得分最高）
        assert_eq!(result.before[0].efficiency, 50);
        assert_eq!(result.after[0].efficiency, 65);
        assert_eq!(result.after[1].efficiency, 100);
        assert!(result.deltas.efficiency_gain() > 0.0);
    }

    #[test]
    fn test_unknown_objective_keeps_allocations() {
        let optimizer = Optimizer::default();
        let result = optimizer.optimize(&create_test_store(), "speed");

        assert_eq!(result.before, result.after);
        assert!(result.improvements[0].contains("speed"));
    }

    #[test]
    fn test_workload_variance() {
        assert_eq!(workload_variance(&[]), 0.0);
    }
}
