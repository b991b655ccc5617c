// ==========================================
// 资源分配工作台 - 校验引擎（检查 1-6）
// ==========================================
// 顺序: 结构 → 唯一性 → 数值范围 → JSON → 引用完整性 → 技能覆盖 → 洞察
// ==========================================

use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info, instrument};

use crate::config::thresholds::ValidationThresholds;
use crate::domain::entity::{EntityStore, IntField};
use crate::domain::finding::{Finding, STRUCTURE_ENTITY_ID};
use crate::domain::types::{EntityType, FindingCategory, Severity};

/// 客户优先级合法区间
pub(crate) const PRIORITY_RANGE: (i64, i64) = (1, 5);

/// 记录标识: 有主键用主键，否则用行号
pub fn entity_label(id: Option<&str>, row: usize) -> String {
    match id.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("row-{}", row + 1),
    }
}

/// 构造 Finding（ID 由 number_findings 统一编号）
pub(super) fn new_finding(
    category: FindingCategory,
    severity: Severity,
    entity_type: EntityType,
    entity_id: impl Into<String>,
    message: String,
) -> Finding {
    Finding {
        id: String::new(),
        severity,
        category,
        message,
        details: String::new(),
        entity_type,
        entity_id: entity_id.into(),
        field: None,
        suggestion: None,
        auto_fixable: false,
        row: None,
    }
}

/// 按类别顺序编号: <slug>-<序号>
///
/// 同一快照重复校验得到相同 ID
pub(super) fn number_findings(mut findings: Vec<Finding>) -> Vec<Finding> {
    let mut counters: HashMap<FindingCategory, usize> = HashMap::new();
    for finding in findings.iter_mut() {
        let seq = counters.entry(finding.category).or_insert(0);
        *seq += 1;
        finding.id = format!("{}-{}", finding.category.slug(), seq);
    }
    findings
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(|v| v.trim().is_empty()).unwrap_or(true)
}

fn join_rows(rows: &[usize]) -> String {
    rows.iter()
        .map(|r| (r + 1).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ==========================================
// ValidationEngine - 校验引擎
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ValidationEngine {
    thresholds: ValidationThresholds,
}

impl ValidationEngine {
    pub fn new(thresholds: ValidationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ValidationThresholds {
        &self.thresholds
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 执行完整校验
    ///
    /// 七项检查固定顺序全量执行，结果直接拼接。
    /// 无副作用；同一快照重复调用结果完全一致。
    #[instrument(skip_all, fields(
        clients = store.clients.len(),
        workers = store.workers.len(),
        tasks = store.tasks.len()
    ))]
    pub fn validate(&self, store: &EntityStore) -> Vec<Finding> {
        let mut findings = Vec::new();
        findings.extend(self.check_schema(store));
        findings.extend(self.check_uniqueness(store));
        findings.extend(self.check_ranges(store));
        findings.extend(self.check_json(store));
        findings.extend(self.check_references(store));
        findings.extend(self.check_skill_coverage(store));
        findings.extend(self.check_insights(store));

        let findings = number_findings(findings);

        info!(
            total = findings.len(),
            errors = findings.iter().filter(|f| f.severity == Severity::Error).count(),
            warnings = findings.iter().filter(|f| f.severity == Severity::Warning).count(),
            "校验完成"
        );
        findings
    }

    // ==========================================
    // 检查 1: 必填字段
    // ==========================================

    /// 必填字段存在性检查（结构性错误，不可自动修复）
    ///
    /// 每个 (集合, 字段) 至多一条 Finding，entityId = "structure"
    pub fn check_schema(&self, store: &EntityStore) -> Vec<Finding> {
        let mut findings = Vec::new();

        let client_fields: [(&str, Vec<usize>); 3] = [
            (
                "ClientID",
                rows_where(&store.clients, |c| is_blank(&c.client_id)),
            ),
            (
                "ClientName",
                rows_where(&store.clients, |c| is_blank(&c.client_name)),
            ),
            (
                "PriorityLevel",
                rows_where(&store.clients, |c| c.priority_level.is_none()),
            ),
        ];
        let worker_fields: [(&str, Vec<usize>); 3] = [
            (
                "WorkerID",
                rows_where(&store.workers, |w| is_blank(&w.worker_id)),
            ),
            (
                "WorkerName",
                rows_where(&store.workers, |w| is_blank(&w.worker_name)),
            ),
            (
                "MaxLoadPerPhase",
                rows_where(&store.workers, |w| w.max_load_per_phase.is_none()),
            ),
        ];
        let task_fields: [(&str, Vec<usize>); 3] = [
            ("TaskID", rows_where(&store.tasks, |t| is_blank(&t.task_id))),
            (
                "TaskName",
                rows_where(&store.tasks, |t| is_blank(&t.task_name)),
            ),
            (
                "Duration",
                rows_where(&store.tasks, |t| t.duration.is_none()),
            ),
        ];

        for (entity_type, fields) in [
            (EntityType::Client, client_fields),
            (EntityType::Worker, worker_fields),
            (EntityType::Task, task_fields),
        ] {
            for (field, rows) in fields {
                if rows.is_empty() {
                    continue;
                }
                let mut finding = new_finding(
                    FindingCategory::MissingField,
                    Severity::Error,
                    entity_type,
                    STRUCTURE_ENTITY_ID,
                    format!(
                        "{} 缺少必填字段 {}（{} 行）",
                        entity_type.collection_name(),
                        field,
                        rows.len()
                    ),
                );
                finding.field = Some(field.to_string());
                finding.details = format!("缺失行: {}", join_rows(&rows));
                finding.suggestion = Some(format!("请补录 {} 字段", field));
                findings.push(finding);
            }
        }

        debug!(count = findings.len(), "必填字段检查完成");
        number_findings(findings)
    }

    // ==========================================
    // 检查 2: 主键唯一性
    // ==========================================

    /// 主键重复检查（可自动修复: 重命名为 <ID>_<序号>）
    ///
    /// 每个重复主键一条 Finding，row 指向第一个重复出现的行
    pub fn check_uniqueness(&self, store: &EntityStore) -> Vec<Finding> {
        let mut findings = Vec::new();

        for entity_type in [EntityType::Client, EntityType::Worker, EntityType::Task] {
            let ids = store.ids_of(entity_type);

            // 按首次出现顺序分组，保证输出稳定
            let mut order: Vec<&str> = Vec::new();
            let mut rows_by_id: HashMap<&str, Vec<usize>> = HashMap::new();
            for (row, id) in ids.into_iter().enumerate() {
                let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) else {
                    continue;
                };
                let rows = rows_by_id.entry(id).or_insert_with(|| {
                    order.push(id);
                    Vec::new()
                });
                rows.push(row);
            }

            for id in order {
                let rows = &rows_by_id[id];
                if rows.len() < 2 {
                    continue;
                }
                let mut finding = new_finding(
                    FindingCategory::DuplicateId,
                    Severity::Error,
                    entity_type,
                    id,
                    format!(
                        "{} {} 重复出现 {} 次",
                        entity_type.id_field(),
                        id,
                        rows.len()
                    ),
                );
                finding.field = Some(entity_type.id_field().to_string());
                finding.details = format!("重复行: {}", join_rows(rows));
                finding.suggestion = Some(format!("保留首条记录，其余重命名为 {}_2 等", id));
                finding.auto_fixable = true;
                finding.row = Some(rows[1]);
                findings.push(finding);
            }
        }

        debug!(count = findings.len(), "主键唯一性检查完成");
        number_findings(findings)
    }

    // ==========================================
    // 检查 3: 数值范围
    // ==========================================

    /// 数值范围/类型检查（可自动修复: 钳位，无法解析时取默认值）
    ///
    /// - PriorityLevel ∈ [1, 5]（默认 3）
    /// - Duration >= 1（默认 1）
    /// - MaxLoadPerPhase >= 1（默认 1）
    /// - MaxConcurrent >= 1（可选字段，默认 1）
    pub fn check_ranges(&self, store: &EntityStore) -> Vec<Finding> {
        let mut findings = Vec::new();

        for (row, client) in store.clients.iter().enumerate() {
            if let Some(field) = &client.priority_level {
                let label = entity_label(client.client_id.as_deref(), row);
                if let Some(f) = range_finding(
                    EntityType::Client,
                    &label,
                    row,
                    "PriorityLevel",
                    field,
                    PRIORITY_RANGE.0,
                    Some(PRIORITY_RANGE.1),
                ) {
                    findings.push(f);
                }
            }
        }

        for (row, worker) in store.workers.iter().enumerate() {
            if let Some(field) = &worker.max_load_per_phase {
                let label = entity_label(worker.worker_id.as_deref(), row);
                if let Some(f) = range_finding(
                    EntityType::Worker,
                    &label,
                    row,
                    "MaxLoadPerPhase",
                    field,
                    1,
                    None,
                ) {
                    findings.push(f);
                }
            }
        }

        for (row, task) in store.tasks.iter().enumerate() {
            let label = entity_label(task.task_id.as_deref(), row);
            if let Some(field) = &task.duration {
                if let Some(f) =
                    range_finding(EntityType::Task, &label, row, "Duration", field, 1, None)
                {
                    findings.push(f);
                }
            }
            if let Some(field) = &task.max_concurrent {
                if let Some(f) = range_finding(
                    EntityType::Task,
                    &label,
                    row,
                    "MaxConcurrent",
                    field,
                    1,
                    None,
                ) {
                    findings.push(f);
                }
            }
        }

        debug!(count = findings.len(), "数值范围检查完成");
        number_findings(findings)
    }

    // ==========================================
    // 检查 4: JSON 格式
    // ==========================================

    /// AttributesJSON 格式检查（可自动修复: 重置为 {}）
    pub fn check_json(&self, store: &EntityStore) -> Vec<Finding> {
        let mut findings = Vec::new();

        for (row, client) in store.clients.iter().enumerate() {
            let Some(raw) = client.attributes_json.as_deref() else {
                continue;
            };
            if raw.trim().is_empty() {
                continue;
            }
            if let Err(e) = serde_json::from_str::<serde_json::Value>(raw) {
                let label = entity_label(client.client_id.as_deref(), row);
                let mut finding = new_finding(
                    FindingCategory::MalformedJson,
                    Severity::Error,
                    EntityType::Client,
                    label.clone(),
                    format!("客户 {} 的 AttributesJSON 不是合法 JSON", label),
                );
                finding.field = Some("AttributesJSON".to_string());
                finding.details = format!("解析错误: {}", e);
                finding.suggestion = Some("重置为空对象 {}".to_string());
                finding.auto_fixable = true;
                finding.row = Some(row);
                findings.push(finding);
            }
        }

        debug!(count = findings.len(), "JSON 格式检查完成");
        number_findings(findings)
    }

    // ==========================================
    // 检查 5: 引用完整性
    // ==========================================

    /// RequestedTaskIDs 引用检查（可自动修复: 移除该客户的全部无效引用）
    pub fn check_references(&self, store: &EntityStore) -> Vec<Finding> {
        let task_ids = store.task_ids();
        let mut findings = Vec::new();

        for (row, client) in store.clients.iter().enumerate() {
            let mut seen = HashSet::new();
            let unknown: Vec<&str> = client
                .requested_task_ids
                .iter()
                .map(String::as_str)
                .filter(|id| !task_ids.contains(id))
                .filter(|id| seen.insert(*id))
                .collect();
            if unknown.is_empty() {
                continue;
            }

            let label = entity_label(client.client_id.as_deref(), row);
            let mut finding = new_finding(
                FindingCategory::UnknownReference,
                Severity::Error,
                EntityType::Client,
                label.clone(),
                format!("客户 {} 引用了 {} 个不存在的任务", label, unknown.len()),
            );
            finding.field = Some("RequestedTaskIDs".to_string());
            finding.details = format!("未知任务: {}", unknown.join(", "));
            finding.suggestion = Some("移除无效的任务引用".to_string());
            finding.auto_fixable = true;
            finding.row = Some(row);
            findings.push(finding);
        }

        debug!(count = findings.len(), "引用完整性检查完成");
        number_findings(findings)
    }

    // ==========================================
    // 检查 6: 技能覆盖
    // ==========================================

    /// 技能覆盖检查（警告，不可自动修复: 需人工补充员工或技能）
    ///
    /// 每个无人具备的技能一条 Finding，entityId = 技能名
    pub fn check_skill_coverage(&self, store: &EntityStore) -> Vec<Finding> {
        let held: BTreeSet<String> = store.workers.iter().flat_map(|w| w.skill_set()).collect();

        // 技能 → 需要该技能的任务（按任务出现顺序）
        let mut order: Vec<String> = Vec::new();
        let mut tasks_by_skill: HashMap<String, Vec<String>> = HashMap::new();
        for (row, task) in store.tasks.iter().enumerate() {
            for skill in task.skill_set() {
                if held.contains(&skill) {
                    continue;
                }
                let tasks = tasks_by_skill.entry(skill.clone()).or_insert_with(|| {
                    order.push(skill.clone());
                    Vec::new()
                });
                tasks.push(entity_label(task.task_id.as_deref(), row));
            }
        }

        let findings: Vec<Finding> = order
            .into_iter()
            .map(|skill| {
                let tasks = &tasks_by_skill[&skill];
                let mut finding = new_finding(
                    FindingCategory::SkillCoverage,
                    Severity::Warning,
                    EntityType::Task,
                    skill.clone(),
                    format!("技能 \"{}\" 没有任何员工具备", skill),
                );
                finding.field = Some("RequiredSkills".to_string());
                finding.details = format!("需要该技能的任务: {}", tasks.join(", "));
                finding.suggestion = Some("新增具备该技能的员工，或为现有员工补充技能".to_string());
                finding
            })
            .collect();

        debug!(count = findings.len(), "技能覆盖检查完成");
        number_findings(findings)
    }

    // ==========================================
    // 检查 7: 启发式洞察
    // ==========================================

    /// 比例型提示（Info，不可自动修复）
    pub fn check_insights(&self, store: &EntityStore) -> Vec<Finding> {
        let findings = super::insights::collect(store, &self.thresholds);
        debug!(count = findings.len(), "启发式洞察检查完成");
        number_findings(findings)
    }
}

/// 满足条件的行号
fn rows_where<T>(records: &[T], pred: impl Fn(&T) -> bool) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| pred(r))
        .map(|(row, _)| row)
        .collect()
}

/// 单字段范围检查
fn range_finding(
    entity_type: EntityType,
    label: &str,
    row: usize,
    field: &str,
    value: &IntField,
    min: i64,
    max: Option<i64>,
) -> Option<Finding> {
    let bounds = match max {
        Some(max) => format!("[{}, {}]", min, max),
        None => format!(">= {}", min),
    };

    let message = match value {
        IntField::Invalid(raw) => format!("{} {} 的 {} 无法解析为整数: \"{}\"", entity_type, label, field, raw),
        IntField::Int(v) if *v < min || max.map(|m| *v > m).unwrap_or(false) => {
            format!("{} {} 的 {} = {} 超出范围 {}", entity_type, label, field, v, bounds)
        }
        IntField::Int(_) => return None,
    };

    let mut finding = new_finding(
        FindingCategory::OutOfRange,
        Severity::Error,
        entity_type,
        label,
        message,
    );
    finding.field = Some(field.to_string());
    finding.details = format!("当前值: {}，合法范围: {}", value, bounds);
    finding.suggestion = Some("钳位到最近的合法值".to_string());
    finding.auto_fixable = true;
    finding.row = Some(row);
    Some(finding)
}
