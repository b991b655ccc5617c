// ==========================================
// 资源分配工作台 - 任务评分
// ==========================================
// 职责: 按 PriorityWeights 计算候选任务的加权得分
// 红线: 纯计算，相同输入得到相同得分
// ==========================================

use std::collections::{HashMap, HashSet};

use super::rules::slot_overlap;
use crate::domain::entity::{EntityStore, IntField, Task};
use crate::domain::priority::{Criterion, PriorityWeights};

/// 评分时单个任务可参考的全局统计
#[derive(Debug, Clone, Default)]
struct TaskDemand {
    max_priority: i64,
    request_count: usize,
    compatible_workers: usize,
}

/// 全局评分上下文（每次仿真构建一次）
#[derive(Debug, Clone)]
pub(super) struct ScoringContext<'a> {
    weights: &'a PriorityWeights,
    demand: HashMap<&'a str, TaskDemand>,
}

/// 单个员工在评分时的视角
pub(super) struct WorkerView<'a> {
    pub slots: &'a HashSet<u32>,
    pub skill_count: usize,
    pub capacity: u32,
}

impl<'a> ScoringContext<'a> {
    pub fn new(store: &'a EntityStore, weights: &'a PriorityWeights) -> Self {
        let mut demand: HashMap<&'a str, TaskDemand> = HashMap::new();

        for client in &store.clients {
            let priority = client.priority().unwrap_or(0);
            for task_id in &client.requested_task_ids {
                let entry = demand.entry(task_id.as_str()).or_default();
                entry.max_priority = entry.max_priority.max(priority);
                entry.request_count += 1;
            }
        }

        let worker_skills: Vec<_> = store.workers.iter().map(|w| w.skill_set()).collect();
        for task in &store.tasks {
            let required = task.skill_set();
            let compatible = worker_skills
                .iter()
                .filter(|skills| required.is_subset(skills))
                .count();
            demand.entry(task.id()).or_default().compatible_workers = compatible;
        }

        Self { weights, demand }
    }

    /// 计算任务得分（0..=1）
    pub fn score(&self, task: &Task, worker: &WorkerView<'_>) -> f64 {
        let demand = self.demand.get(task.id()).cloned().unwrap_or_default();
        let duration = task_duration(task);

        let terms = [
            (Criterion::PriorityLevel, (demand.max_priority.clamp(0, 5) as f64) / 5.0),
            (
                Criterion::TaskFulfillment,
                (demand.request_count.min(5) as f64) / 5.0,
            ),
            (
                Criterion::Fairness,
                1.0 / demand.compatible_workers.max(1) as f64,
            ),
            (Criterion::WorkloadBalance, duration_fit(duration, worker.capacity)),
            (
                Criterion::SkillMatch,
                skill_specialization(task.skill_set().len(), worker.skill_count),
            ),
            (Criterion::PhaseFit, phase_fit(task, worker)),
            (Criterion::CostEfficiency, 1.0 / duration as f64),
            (Criterion::DeadlineAdherence, earliest_phase(task)),
        ];

        let total = self.weights.total() as f64;
        if total == 0.0 {
            return 0.0;
        }
        terms
            .iter()
            .map(|(criterion, value)| self.weights.weight(*criterion) as f64 * value)
            .sum::<f64>()
            / total
    }
}

/// 任务时长（无法解析或非正数按 1 计）
fn task_duration(task: &Task) -> i64 {
    match &task.duration {
        Some(IntField::Int(d)) if *d >= 1 => *d,
        _ => 1,
    }
}

fn duration_fit(duration: i64, capacity: u32) -> f64 {
    if capacity == 0 {
        0.0
    } else if duration <= capacity as i64 {
        1.0
    } else {
        capacity as f64 / duration as f64
    }
}

fn skill_specialization(required: usize, held: usize) -> f64 {
    if held == 0 {
        0.0
    } else {
        (required as f64 / held as f64).min(1.0)
    }
}

fn phase_fit(task: &Task, worker: &WorkerView<'_>) -> f64 {
    if task.preferred_phases.is_empty() {
        return 1.0;
    }
    let distinct = task
        .preferred_phases
        .iter()
        .collect::<HashSet<_>>()
        .len();
    slot_overlap(worker.slots, &task.preferred_phases) as f64 / distinct as f64
}

fn earliest_phase(task: &Task) -> f64 {
    match task.preferred_phases.iter().min() {
        Some(p) => 1.0 / (*p).max(1) as f64,
        None => 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_fit() {
        assert_eq!(duration_fit(1, 0), 0.0);
        assert_eq!(duration_fit(2, 2), 1.0);
        assert_eq!(duration_fit(4, 2), 0.5);
    }

    #[test]
    fn test_earliest_phase() {
        let mut task = Task::new("T1", "Build", 1);
        assert_eq!(earliest_phase(&task), 0.5);
        task.preferred_phases = vec![4, 2];
        assert_eq!(earliest_phase(&task), 0.5);
        task.preferred_phases = vec![1];
        assert_eq!(earliest_phase(&task), 1.0);
    }

    #[test]
    fn test_requested_high_priority_task_scores_higher() {
        let mut store = EntityStore::default();
        let mut client = crate::domain::entity::Client::new("C1", "Acme", 5);
        client.requested_task_ids = vec!["T2".to_string()];
        store.clients.push(client);
        store.tasks = vec![Task::new("T1", "A", 1), Task::new("T2", "B", 1)];

        let weights = PriorityWeights::default();
        let context = ScoringContext::new(&store, &weights);
        let slots = HashSet::new();
        let view = WorkerView {
            slots: &slots,
            skill_count: 1,
            capacity: 2,
        };

        assert!(context.score(&store.tasks[1], &view) > context.score(&store.tasks[0], &view));
    }
}
