// ==========================================
// 资源分配工作台 - 自动修复引擎
// ==========================================
// 红线: 纯函数，返回新快照，不修改入参，不修改 Finding
// 红线: 批量修复按 Finding 产出顺序逐条原子执行，失败累积不中断
// ==========================================
// 职责: Finding 类别 → 确定性修正
// - Duplicate ID:       除首条外按位置追加后缀 _<n>
// - Out-of-range Value: 钳位；无法解析时取类别默认值
// - Malformed JSON:     重置为 {}
// - Unknown Reference:  移除该客户全部无效引用
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

use crate::domain::entity::{EntityStore, IntField};
use crate::domain::finding::Finding;
use crate::domain::types::{EntityType, FindingCategory};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::validation::entity_label;

/// 空 JSON 对象
pub const EMPTY_JSON_OBJECT: &str = "{}";

/// 数值字段修复参数: (最小值, 最大值, 无法解析时的默认值)
fn numeric_bounds(field: &str) -> Option<(i64, Option<i64>, i64)> {
    match field {
        "PriorityLevel" => Some((1, Some(5), 3)),
        "Duration" | "MaxLoadPerPhase" | "MaxConcurrent" => Some((1, None, 1)),
        _ => None,
    }
}

// ==========================================
// FixBatchReport - 批量修复报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixFailure {
    pub finding_id: String,
    pub category: FindingCategory,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixBatchReport {
    /// 修复后的新快照
    pub store: EntityStore,
    /// 成功应用的 Finding ID
    pub applied: Vec<String>,
    /// 不可自动修复而跳过的 Finding ID
    pub skipped: Vec<String>,
    /// 修复失败的 Finding
    pub failed: Vec<FixFailure>,
}

// ==========================================
// AutoFixEngine - 自动修复引擎
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AutoFixEngine {
    // 无状态引擎，不需要注入依赖
}

impl AutoFixEngine {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 应用单条修复，返回新快照
    ///
    /// # 返回
    /// - Ok(EntityStore): 修复后的快照（调用方需重新校验以观察新状态）
    /// - Err(FixNotApplicable): Finding 不可自动修复或类别不支持
    /// - Err(EntityNotFound): 目标记录在当前快照中已不存在
    pub fn apply_fix(&self, store: &EntityStore, finding: &Finding) -> EngineResult<EntityStore> {
        if !finding.auto_fixable {
            return Err(not_applicable(finding, "该问题需人工处理"));
        }

        let result = match finding.category {
            FindingCategory::DuplicateId => self.fix_duplicate_id(store, finding),
            FindingCategory::OutOfRange => self.fix_out_of_range(store, finding),
            FindingCategory::MalformedJson => self.fix_malformed_json(store, finding),
            FindingCategory::UnknownReference => {
                let row = locate(&store.ids_of(EntityType::Client), finding)?;
                self.remove_invalid_references_at(store, row)
            }
            _ => Err(not_applicable(finding, "该类别没有自动修复方案")),
        };

        match &result {
            Ok(_) => debug!(finding_id = %finding.id, category = %finding.category, "修复已应用"),
            Err(e) => warn!(finding_id = %finding.id, error = %e, "修复失败"),
        }
        result
    }

    /// 移除指定客户的全部无效任务引用
    pub fn remove_invalid_references(
        &self,
        store: &EntityStore,
        client_id: &str,
    ) -> EngineResult<EntityStore> {
        let row = store
            .clients
            .iter()
            .position(|c| c.id() == client_id)
            .ok_or_else(|| EngineError::EntityNotFound {
                entity_type: EntityType::Client,
                entity_id: client_id.to_string(),
            })?;
        self.remove_invalid_references_at(store, row)
    }

    /// 批量修复
    ///
    /// 按 findings 顺序在同一快照链上逐条应用；
    /// 不可修复的记入 skipped，失败的记入 failed，均不中断批次
    #[instrument(skip_all, fields(findings = findings.len()))]
    pub fn fix_all(&self, store: &EntityStore, findings: &[Finding]) -> FixBatchReport {
        let mut current = store.clone();
        let mut applied = Vec::new();
        let mut skipped = Vec::new();
        let mut failed = Vec::new();

        for finding in findings {
            if !finding.auto_fixable {
                skipped.push(finding.id.clone());
                continue;
            }
            let finding = rebase(store, &current, finding);
            match self.apply_fix(&current, &finding) {
                Ok(next) => {
                    current = next;
                    applied.push(finding.id.clone());
                }
                Err(e) => failed.push(FixFailure {
                    finding_id: finding.id.clone(),
                    category: finding.category,
                    reason: e.to_string(),
                }),
            }
        }

        info!(
            applied = applied.len(),
            skipped = skipped.len(),
            failed = failed.len(),
            "批量修复完成"
        );

        FixBatchReport {
            store: current,
            applied,
            skipped,
            failed,
        }
    }

    // ==========================================
    // 分类修复
    // ==========================================

    /// 主键重复: 保留首条，其余按出现位置（1 起）追加后缀
    fn fix_duplicate_id(&self, store: &EntityStore, finding: &Finding) -> EngineResult<EntityStore> {
        let mut next = store.clone();
        let target = finding.entity_id.as_str();

        let renamed = match finding.entity_type {
            EntityType::Client => rename_duplicates(&mut next.clients, target, |c| &mut c.client_id),
            EntityType::Worker => rename_duplicates(&mut next.workers, target, |w| &mut w.worker_id),
            EntityType::Task => rename_duplicates(&mut next.tasks, target, |t| &mut t.task_id),
        };

        if renamed == 0 {
            return Err(EngineError::EntityNotFound {
                entity_type: finding.entity_type,
                entity_id: finding.entity_id.clone(),
            });
        }
        Ok(next)
    }

    /// 数值越界: 钳位到合法区间
    fn fix_out_of_range(&self, store: &EntityStore, finding: &Finding) -> EngineResult<EntityStore> {
        let field_name = finding.field.as_deref().unwrap_or("");
        let (min, max, default) = numeric_bounds(field_name)
            .ok_or_else(|| not_applicable(finding, "未知的数值字段"))?;

        let mut next = store.clone();
        let row = locate(&store.ids_of(finding.entity_type), finding)?;

        let field = match (finding.entity_type, field_name) {
            (EntityType::Client, "PriorityLevel") => &mut next.clients[row].priority_level,
            (EntityType::Worker, "MaxLoadPerPhase") => &mut next.workers[row].max_load_per_phase,
            (EntityType::Task, "Duration") => &mut next.tasks[row].duration,
            (EntityType::Task, "MaxConcurrent") => &mut next.tasks[row].max_concurrent,
            _ => return Err(not_applicable(finding, "字段与实体类型不匹配")),
        };

        if let Some(value) = field.as_mut() {
            *value = clamp_value(value, min, max, default);
        }
        Ok(next)
    }

    /// JSON 畸形: 重置为 {}
    fn fix_malformed_json(&self, store: &EntityStore, finding: &Finding) -> EngineResult<EntityStore> {
        let mut next = store.clone();
        let row = locate(&store.ids_of(EntityType::Client), finding)?;
        next.clients[row].attributes_json = Some(EMPTY_JSON_OBJECT.to_string());
        Ok(next)
    }

    fn remove_invalid_references_at(
        &self,
        store: &EntityStore,
        row: usize,
    ) -> EngineResult<EntityStore> {
        let task_ids: HashSet<String> = store.task_ids().into_iter().map(str::to_string).collect();
        let mut next = store.clone();
        let client = &mut next.clients[row];

        let before = client.requested_task_ids.len();
        client
            .requested_task_ids
            .retain(|id| task_ids.contains(id.as_str()));
        debug!(
            client = %client.id(),
            removed = before - client.requested_task_ids.len(),
            "已移除无效引用"
        );
        Ok(next)
    }
}

// ==========================================
// 辅助函数
// ==========================================

fn not_applicable(finding: &Finding, reason: &str) -> EngineError {
    EngineError::FixNotApplicable {
        finding_id: finding.id.clone(),
        category: finding.category,
        reason: reason.to_string(),
    }
}

/// 定位 Finding 指向的记录行
///
/// 优先使用 row（主键重复时唯一可靠），但要求该行标识仍与 entityId 一致；
/// 否则回落到按标识查找首条记录（快照已变化时）
fn locate(ids: &[Option<&str>], finding: &Finding) -> EngineResult<usize> {
    if let Some(row) = finding.row {
        if row < ids.len() && entity_label(ids[row], row) == finding.entity_id {
            return Ok(row);
        }
    }
    ids.iter()
        .enumerate()
        .position(|(row, id)| entity_label(*id, row) == finding.entity_id)
        .ok_or_else(|| EngineError::EntityNotFound {
            entity_type: finding.entity_type,
            entity_id: finding.entity_id.clone(),
        })
}

/// 批次内的行号在修复间保持稳定，但前序的主键重命名会改变行标识；
/// 行标识与初始快照一致时，将 entityId 改写为该行的当前标识
fn rebase(origin: &EntityStore, current: &EntityStore, finding: &Finding) -> Finding {
    let mut rebased = finding.clone();
    if finding.category == FindingCategory::DuplicateId {
        return rebased;
    }
    let Some(row) = finding.row else {
        return rebased;
    };
    let before = origin.ids_of(finding.entity_type);
    let after = current.ids_of(finding.entity_type);
    if row < before.len()
        && row < after.len()
        && entity_label(before[row], row) == finding.entity_id
    {
        rebased.entity_id = entity_label(after[row], row);
    }
    rebased
}

/// 钳位；无法解析时取默认值
fn clamp_value(value: &IntField, min: i64, max: Option<i64>, default: i64) -> IntField {
    match value {
        IntField::Invalid(_) => IntField::Int(default),
        IntField::Int(v) => {
            let mut v = (*v).max(min);
            if let Some(max) = max {
                v = v.min(max);
            }
            IntField::Int(v)
        }
    }
}

/// 重命名重复主键，返回重命名条数
///
/// 第 n 次出现（n >= 2）改为 <id>_<n>；若已被占用则序号递增直至空闲
fn rename_duplicates<T>(
    records: &mut [T],
    target: &str,
    id_of: impl Fn(&mut T) -> &mut Option<String>,
) -> usize {
    let mut taken: HashSet<String> = records
        .iter_mut()
        .filter_map(|r| id_of(r).as_deref().map(|id| id.trim().to_string()))
        .collect();

    let mut occurrence = 0usize;
    let mut renamed = 0usize;
    for record in records.iter_mut() {
        let id = id_of(record);
        if id.as_deref().map(str::trim) != Some(target) {
            continue;
        }
        occurrence += 1;
        if occurrence == 1 {
            continue;
        }

        let mut suffix = occurrence;
        let mut candidate = format!("{}_{}", target, suffix);
        while taken.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}_{}", target, suffix);
        }
        taken.insert(candidate.clone());
        *id = Some(candidate);
        renamed += 1;
    }
    renamed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Client, Task, Worker};
    use crate::engine::validation::ValidationEngine;

    fn create_test_store() -> EntityStore {
        let mut client = Client::new("C1", "Acme", 3);
        client.requested_task_ids = vec!["T1".to_string(), "T9".to_string()];
        EntityStore::new(
            vec![client],
            vec![
                Worker::new("W1", "Alice", 2),
                Worker::new("W1", "Bob", 2),
                Worker::new("W1_2", "Carol", 2),
                Worker::new("W1", "Dave", 2),
            ],
            vec![Task::new("T1", "Build", 1)],
        )
    }

    #[test]
    fn test_rename_duplicates_skips_taken_suffix() {
        let engine = AutoFixEngine::new();
        let store = create_test_store();
        let finding = ValidationEngine::default()
            .check_uniqueness(&store)
            .into_iter()
            .next()
            .unwrap();

        let fixed = engine.apply_fix(&store, &finding).unwrap();
        let ids: Vec<&str> = fixed.workers.iter().map(|w| w.id()).collect();

        assert_eq!(ids, vec!["W1", "W1_3", "W1_2", "W1_4"]);
        // 原快照不变
        assert_eq!(store.workers[1].id(), "W1");
    }

    #[test]
    fn test_non_fixable_finding_is_rejected() {
        let engine = AutoFixEngine::new();
        let mut store = create_test_store();
        store.tasks[0].required_skills.insert("welding".to_string());
        let finding = ValidationEngine::default()
            .check_skill_coverage(&store)
            .remove(0);

        let err = engine.apply_fix(&store, &finding).unwrap_err();
        assert!(matches!(err, EngineError::FixNotApplicable { .. }));
    }

    #[test]
    fn test_clamp_value() {
        assert_eq!(clamp_value(&IntField::Int(9), 1, Some(5), 3), IntField::Int(5));
        assert_eq!(clamp_value(&IntField::Int(-4), 1, None, 1), IntField::Int(1));
        assert_eq!(
            clamp_value(&IntField::Invalid("x".to_string()), 1, Some(5), 3),
            IntField::Int(3)
        );
    }

    #[test]
    fn test_remove_invalid_references() {
        let engine = AutoFixEngine::new();
        let store = create_test_store();

        let fixed = engine.remove_invalid_references(&store, "C1").unwrap();
        assert_eq!(fixed.clients[0].requested_task_ids, vec!["T1".to_string()]);

        let err = engine.remove_invalid_references(&store, "C404").unwrap_err();
        assert!(matches!(err, EngineError::EntityNotFound { .. }));
    }

    #[test]
    fn test_stale_finding_reports_entity_not_found() {
        let engine = AutoFixEngine::new();
        let mut store = create_test_store();
        store.clients[0].attributes_json = Some("{oops".to_string());
        let finding = ValidationEngine::default().check_json(&store).remove(0);

        // 另一编辑已删除该客户
        let mut edited = store.clone();
        edited.clients.clear();

        let err = engine.apply_fix(&edited, &finding).unwrap_err();
        assert!(matches!(err, EngineError::EntityNotFound { .. }));
    }

    #[test]
    fn test_fix_all_follows_row_after_rename() {
        let engine = AutoFixEngine::new();
        let mut store = create_test_store();
        store.workers[1].max_load_per_phase = Some(IntField::Int(0));
        let findings = ValidationEngine::default().validate(&store);

        let report = engine.fix_all(&store, &findings);

        assert!(report.failed.is_empty());
        // 重命名后仍修正原第 2 行，而不是首个 W1
        assert_eq!(report.store.workers[1].id(), "W1_3");
        assert_eq!(report.store.workers[1].max_load_per_phase, Some(IntField::Int(1)));
        assert_eq!(report.store.workers[0].max_load_per_phase, Some(IntField::Int(2)));
    }
}
