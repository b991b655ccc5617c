// ==========================================
// 资源分配工作台 - 启发式洞察
// ==========================================
// 职责: 比例型提示（Info 级别，永不自动修复）
// ==========================================

use std::collections::HashSet;

use super::checks::{entity_label, new_finding};
use crate::config::thresholds::ValidationThresholds;
use crate::domain::entity::{EntityStore, IntField};
use crate::domain::finding::Finding;
use crate::domain::types::{EntityType, FindingCategory, Severity};

pub(super) fn collect(store: &EntityStore, thresholds: &ValidationThresholds) -> Vec<Finding> {
    let mut findings = Vec::new();
    let worker_count = store.workers.len();

    // 1) 高优先级客户相对员工数过多
    let high_priority = store
        .clients
        .iter()
        .filter(|c| c.priority().map(|p| p >= thresholds.high_priority_level).unwrap_or(false))
        .count();
    if high_priority > 0
        && high_priority as f64 > thresholds.high_priority_client_ratio * worker_count as f64
    {
        let mut finding = new_finding(
            FindingCategory::Insight,
            Severity::Info,
            EntityType::Client,
            "high-priority-demand",
            format!(
                "高优先级客户 {} 个，超过员工数 {} 的 {:.0}%",
                high_priority,
                worker_count,
                thresholds.high_priority_client_ratio * 100.0
            ),
        );
        finding.details = format!(
            "PriorityLevel >= {} 的客户: {}",
            thresholds.high_priority_level, high_priority
        );
        finding.suggestion = Some("考虑增加员工或调整客户优先级".to_string());
        findings.push(finding);
    }

    if worker_count > 0 {
        // 2) 低技能员工占比过高
        let low_skill = store
            .workers
            .iter()
            .filter(|w| w.skill_set().len() <= thresholds.low_skill_max_count)
            .count();
        let ratio = low_skill as f64 / worker_count as f64;
        if ratio > thresholds.low_skill_worker_ratio {
            let mut finding = new_finding(
                FindingCategory::Insight,
                Severity::Info,
                EntityType::Worker,
                "low-skill-workers",
                format!(
                    "{:.0}% 的员工技能数不超过 {} 项",
                    ratio * 100.0,
                    thresholds.low_skill_max_count
                ),
            );
            finding.field = Some("Skills".to_string());
            finding.details = format!("低技能员工 {} / {}", low_skill, worker_count);
            finding.suggestion = Some("安排交叉培训以提高任务覆盖弹性".to_string());
            findings.push(finding);
        }

        // 3) 可用阶段少于单阶段最大负载（承诺过度）
        let overcommitted = store
            .workers
            .iter()
            .filter(|w| match &w.max_load_per_phase {
                Some(IntField::Int(max)) => (w.available_slots.len() as i64) < *max,
                _ => false,
            })
            .count();
        let ratio = overcommitted as f64 / worker_count as f64;
        if ratio > thresholds.overcommitted_worker_ratio {
            let mut finding = new_finding(
                FindingCategory::Insight,
                Severity::Info,
                EntityType::Worker,
                "overcommitted-workers",
                format!(
                    "{:.0}% 的员工可用阶段数少于 MaxLoadPerPhase",
                    ratio * 100.0
                ),
            );
            finding.field = Some("AvailableSlots".to_string());
            finding.details = format!("承诺过度员工 {} / {}", overcommitted, worker_count);
            finding.suggestion = Some("核对员工可用阶段或下调 MaxLoadPerPhase".to_string());
            findings.push(finding);
        }

        // 4) 偏好阶段与所有员工可用阶段均无交集
        let all_slots: HashSet<u32> = store
            .workers
            .iter()
            .flat_map(|w| w.available_slots.iter().copied())
            .collect();
        for (row, task) in store.tasks.iter().enumerate() {
            if task.preferred_phases.is_empty() {
                continue;
            }
            if task.preferred_phases.iter().any(|p| all_slots.contains(p)) {
                continue;
            }
            let label = entity_label(task.task_id.as_deref(), row);
            let mut finding = new_finding(
                FindingCategory::Insight,
                Severity::Info,
                EntityType::Task,
                label.clone(),
                format!("任务 {} 的偏好阶段没有任何员工可用", label),
            );
            finding.field = Some("PreferredPhases".to_string());
            finding.details = format!("偏好阶段: {:?}", task.preferred_phases);
            finding.row = Some(row);
            findings.push(finding);
        }
    }

    findings
}
