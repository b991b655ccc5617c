// ==========================================
// 资源分配工作台 - 规则编译与过滤
// ==========================================
// 红线: 悬空引用 / 非法正则 / 空参数的规则跳过并报告，不中断仿真
// 红线: precedenceOverride 只改写优先级，本身不参与过滤
// ==========================================

use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

use crate::domain::allocation::SkippedRule;
use crate::domain::entity::{EntityStore, Task, Worker};
use crate::domain::rule::{PatternAction, PatternField, Rule, RuleBody, RuleSet, SlotTarget};

// ==========================================
// CompiledRule - 已解析、可直接执行的规则
// ==========================================
#[derive(Debug, Clone)]
pub(super) enum CompiledRule {
    CoRun {
        tasks: BTreeSet<String>,
    },
    WorkerSlots {
        group: String,
        min_common_slots: u32,
    },
    ClientSlots {
        requested: HashSet<String>,
        min_common_slots: u32,
    },
    LoadLimit {
        worker_group: String,
        max_slots_per_phase: u32,
    },
    PhaseWindow {
        task_id: String,
        allowed_phases: HashSet<u32>,
    },
    Pattern {
        regex: Regex,
        field: PatternField,
        action: PatternAction,
    },
    Custom {
        excluded_tasks: HashSet<String>,
        worker_ids: HashSet<String>,
    },
}

/// 编译结果: 按生效优先级升序的规则 + 共同执行分组 + 跳过报告
#[derive(Debug, Clone, Default)]
pub(super) struct RulePlan {
    pub rules: Vec<CompiledRule>,
    pub co_run_groups: Vec<BTreeSet<String>>,
    pub skipped: Vec<SkippedRule>,
}

impl RulePlan {
    /// 编译规则集
    ///
    /// 1) 逐条检查引用与参数，不可执行者记入 skipped
    /// 2) 剩余规则组成新规则集，按生效优先级排序
    /// 3) 转换为 CompiledRule
    pub fn compile(store: &EntityStore, rules: &RuleSet) -> Self {
        let task_ids: HashSet<&str> = store.task_ids();
        let worker_ids: HashSet<&str> = store.worker_ids();
        let rule_ids: HashSet<&str> = rules.rules().iter().map(|r| r.id.as_str()).collect();
        let worker_groups: HashSet<&str> = store
            .workers
            .iter()
            .filter_map(|w| w.worker_group.as_deref().map(str::trim))
            .collect();
        let client_groups: HashSet<&str> = store
            .clients
            .iter()
            .filter_map(|c| c.group_tag.as_deref().map(str::trim))
            .collect();

        let mut skipped = Vec::new();
        let mut valid = Vec::new();

        for rule in rules.rules() {
            let problem = match &rule.body {
                RuleBody::CoRun { tasks } => {
                    if tasks.len() < 2 {
                        Some("共同执行至少需要两个任务".to_string())
                    } else {
                        first_missing(tasks, &task_ids).map(|id| format!("引用了不存在的任务 {}", id))
                    }
                }
                RuleBody::SlotRestriction {
                    target_type, group, ..
                } => {
                    let known = match target_type {
                        SlotTarget::Worker => &worker_groups,
                        SlotTarget::Client => &client_groups,
                    };
                    if !known.contains(group.trim()) {
                        Some(format!("引用了不存在的分组 {}", group))
                    } else {
                        None
                    }
                }
                RuleBody::LoadLimit { worker_group, .. } => {
                    if !worker_groups.contains(worker_group.trim()) {
                        Some(format!("引用了不存在的员工分组 {}", worker_group))
                    } else {
                        None
                    }
                }
                RuleBody::PhaseWindow {
                    task_id,
                    allowed_phases,
                } => {
                    if !task_ids.contains(task_id.as_str()) {
                        Some(format!("引用了不存在的任务 {}", task_id))
                    } else if allowed_phases.is_empty() {
                        Some("允许阶段为空".to_string())
                    } else {
                        None
                    }
                }
                RuleBody::PatternMatch { regex, .. } => match Regex::new(regex) {
                    Ok(_) => None,
                    Err(e) => Some(format!("正则表达式无效: {}", e)),
                },
                RuleBody::PrecedenceOverride { rule_ids: targets, .. } => {
                    if targets.is_empty() {
                        Some("目标规则列表为空".to_string())
                    } else {
                        first_missing(targets, &rule_ids)
                            .map(|id| format!("引用了不存在的规则 {}", id))
                    }
                }
                RuleBody::Custom {
                    excluded_tasks,
                    worker_ids: workers,
                    ..
                } => {
                    if excluded_tasks.is_empty() {
                        Some("排除任务列表为空".to_string())
                    } else if let Some(id) = first_missing(excluded_tasks, &task_ids) {
                        Some(format!("引用了不存在的任务 {}", id))
                    } else {
                        first_missing(workers, &worker_ids)
                            .map(|id| format!("引用了不存在的员工 {}", id))
                    }
                }
            };

            match problem {
                Some(reason) => {
                    warn!(rule_id = %rule.id, kind = %rule.kind(), reason = %reason, "规则已跳过");
                    skipped.push(SkippedRule {
                        rule_id: rule.id.clone(),
                        kind: rule.kind(),
                        reason,
                    });
                }
                None => valid.push(rule.clone()),
            }
        }

        let valid = RuleSet::new(valid);
        let mut plan = RulePlan {
            skipped,
            ..Default::default()
        };

        for rule in valid.ordered() {
            if let Some(compiled) = compile_rule(store, rule) {
                if let CompiledRule::CoRun { tasks } = &compiled {
                    plan.co_run_groups.push(tasks.clone());
                }
                plan.rules.push(compiled);
            }
        }

        debug!(
            active = plan.rules.len(),
            skipped = plan.skipped.len(),
            "规则编译完成"
        );
        plan
    }
}

fn first_missing<'a>(ids: &'a [String], known: &HashSet<&str>) -> Option<&'a str> {
    ids.iter()
        .map(String::as_str)
        .find(|id| !known.contains(id))
}

fn compile_rule(store: &EntityStore, rule: &Rule) -> Option<CompiledRule> {
    let compiled = match &rule.body {
        RuleBody::CoRun { tasks } => CompiledRule::CoRun {
            tasks: tasks.iter().cloned().collect(),
        },
        RuleBody::SlotRestriction {
            target_type: SlotTarget::Worker,
            group,
            min_common_slots,
        } => CompiledRule::WorkerSlots {
            group: group.trim().to_string(),
            min_common_slots: *min_common_slots,
        },
        RuleBody::SlotRestriction {
            target_type: SlotTarget::Client,
            group,
            min_common_slots,
        } => CompiledRule::ClientSlots {
            requested: store
                .clients
                .iter()
                .filter(|c| c.group_tag.as_deref().map(str::trim) == Some(group.trim()))
                .flat_map(|c| c.requested_task_ids.iter().cloned())
                .collect(),
            min_common_slots: *min_common_slots,
        },
        RuleBody::LoadLimit {
            worker_group,
            max_slots_per_phase,
        } => CompiledRule::LoadLimit {
            worker_group: worker_group.trim().to_string(),
            max_slots_per_phase: *max_slots_per_phase,
        },
        RuleBody::PhaseWindow {
            task_id,
            allowed_phases,
        } => CompiledRule::PhaseWindow {
            task_id: task_id.clone(),
            allowed_phases: allowed_phases.iter().copied().collect(),
        },
        RuleBody::PatternMatch {
            regex,
            field,
            action,
        } => CompiledRule::Pattern {
            regex: Regex::new(regex).ok()?,
            field: *field,
            action: *action,
        },
        RuleBody::PrecedenceOverride { .. } => return None,
        RuleBody::Custom {
            excluded_tasks,
            worker_ids,
            ..
        } => CompiledRule::Custom {
            excluded_tasks: excluded_tasks.iter().cloned().collect(),
            worker_ids: worker_ids.iter().cloned().collect(),
        },
    };
    Some(compiled)
}

// ==========================================
// 单员工规则执行
// ==========================================

/// 员工仿真状态: 剩余产能 + 候选任务（按 TaskID 索引）
pub(super) struct WorkerState<'a> {
    pub worker: &'a Worker,
    pub slots: HashSet<u32>,
    pub capacity: u32,
    pub candidates: Vec<&'a Task>,
}

impl<'a> WorkerState<'a> {
    fn retain(&mut self, keep: impl Fn(&Task) -> bool) {
        self.candidates.retain(|t| keep(t));
    }

    fn contains(&self, task_id: &str) -> bool {
        self.candidates.iter().any(|t| t.id() == task_id)
    }

    fn in_group(&self, group: &str) -> bool {
        self.worker.worker_group.as_deref().map(str::trim) == Some(group)
    }
}

impl CompiledRule {
    /// 对单个员工执行规则
    pub(super) fn apply(&self, state: &mut WorkerState<'_>) {
        match self {
            CompiledRule::LoadLimit {
                worker_group,
                max_slots_per_phase,
            } => {
                if state.in_group(worker_group) {
                    state.capacity = state.capacity.min(*max_slots_per_phase);
                }
            }
            CompiledRule::PhaseWindow {
                task_id,
                allowed_phases,
            } => {
                let reachable = state.slots.iter().any(|s| allowed_phases.contains(s));
                if !reachable {
                    state.retain(|t| t.id() != task_id.as_str());
                }
            }
            CompiledRule::CoRun { tasks } => {
                if tasks.iter().any(|id| !state.contains(id)) {
                    state.retain(|t| !tasks.contains(t.id()));
                }
            }
            CompiledRule::WorkerSlots {
                group,
                min_common_slots,
            } => {
                if state.in_group(group) && (state.slots.len() as u32) < *min_common_slots {
                    state.candidates.clear();
                }
            }
            CompiledRule::ClientSlots {
                requested,
                min_common_slots,
            } => {
                let slots = state.slots.clone();
                state.retain(|t| {
                    !requested.contains(t.id())
                        || slot_overlap(&slots, &t.preferred_phases) as u32 >= *min_common_slots
                });
            }
            CompiledRule::Pattern {
                regex,
                field,
                action,
            } => {
                state.retain(|t| {
                    let matched = regex.is_match(pattern_value(t, *field));
                    match action {
                        PatternAction::Exclude => !matched,
                        PatternAction::Restrict => matched,
                    }
                });
            }
            CompiledRule::Custom {
                excluded_tasks,
                worker_ids,
            } => {
                if worker_ids.is_empty() || worker_ids.contains(state.worker.id()) {
                    state.retain(|t| !excluded_tasks.contains(t.id()));
                }
            }
        }
    }
}

fn pattern_value(task: &Task, field: PatternField) -> &str {
    match field {
        PatternField::TaskId => task.id(),
        PatternField::TaskName => task.task_name.as_deref().unwrap_or(""),
        PatternField::Category => task.category.as_deref().unwrap_or(""),
    }
}

/// 员工可用阶段与给定阶段的交集大小（阶段去重）
pub(super) fn slot_overlap(slots: &HashSet<u32>, phases: &[u32]) -> usize {
    phases
        .iter()
        .collect::<HashSet<_>>()
        .into_iter()
        .filter(|p| slots.contains(p))
        .count()
}
