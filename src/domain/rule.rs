// ==========================================
// 资源分配工作台 - 业务规则模型
// ==========================================
// 职责: 规则的类型化表示 + 优先级排序
// 红线: 创建时不校验引用；引用有效性由仿真器在评估时检查（跳过并报告）
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// RuleKind - 规则类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    CoRun,
    SlotRestriction,
    LoadLimit,
    PhaseWindow,
    PatternMatch,
    PrecedenceOverride,
    Custom,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleKind::CoRun => "coRun",
            RuleKind::SlotRestriction => "slotRestriction",
            RuleKind::LoadLimit => "loadLimit",
            RuleKind::PhaseWindow => "phaseWindow",
            RuleKind::PatternMatch => "patternMatch",
            RuleKind::PrecedenceOverride => "precedenceOverride",
            RuleKind::Custom => "custom",
        };
        write!(f, "{}", s)
    }
}

/// 槽位限制规则的作用对象
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotTarget {
    Client, // 按 Client.GroupTag
    Worker, // 按 Worker.WorkerGroup
}

/// 模式匹配规则的匹配字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternField {
    TaskId,
    TaskName,
    Category,
}

/// 模式匹配规则的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternAction {
    Exclude,  // 剔除匹配任务
    Restrict, // 仅保留匹配任务
}

// ==========================================
// RuleBody - 规则类型 + 参数
// ==========================================
// 序列化: {"type": "...", "parameters": {...}}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "parameters", rename_all = "camelCase")]
pub enum RuleBody {
    #[serde(rename_all = "camelCase")]
    CoRun { tasks: Vec<String> },

    #[serde(rename_all = "camelCase")]
    SlotRestriction {
        target_type: SlotTarget,
        group: String,
        min_common_slots: u32,
    },

    #[serde(rename_all = "camelCase")]
    LoadLimit {
        worker_group: String,
        max_slots_per_phase: u32,
    },

    #[serde(rename_all = "camelCase")]
    PhaseWindow {
        task_id: String,
        allowed_phases: Vec<u32>,
    },

    #[serde(rename_all = "camelCase")]
    PatternMatch {
        regex: String,
        field: PatternField,
        action: PatternAction,
    },

    #[serde(rename_all = "camelCase")]
    PrecedenceOverride { rule_ids: Vec<String>, priority: i64 },

    #[serde(rename_all = "camelCase")]
    Custom {
        #[serde(default)]
        expression: String,
        #[serde(default)]
        excluded_tasks: Vec<String>,
        #[serde(default)]
        worker_ids: Vec<String>,
    },
}

impl RuleBody {
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleBody::CoRun { .. } => RuleKind::CoRun,
            RuleBody::SlotRestriction { .. } => RuleKind::SlotRestriction,
            RuleBody::LoadLimit { .. } => RuleKind::LoadLimit,
            RuleBody::PhaseWindow { .. } => RuleKind::PhaseWindow,
            RuleBody::PatternMatch { .. } => RuleKind::PatternMatch,
            RuleBody::PrecedenceOverride { .. } => RuleKind::PrecedenceOverride,
            RuleBody::Custom { .. } => RuleKind::Custom,
        }
    }
}

// ==========================================
// Rule - 业务规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub body: RuleBody,
    /// 越小越先应用
    #[serde(default)]
    pub priority: i64,
}

impl Rule {
    /// 创建规则（自动生成 ID）
    pub fn new(name: &str, body: RuleBody, priority: i64) -> Self {
        Self {
            id: format!("rule-{}", uuid::Uuid::new_v4()),
            name: name.to_string(),
            description: String::new(),
            body,
            priority,
        }
    }

    /// 指定 ID 创建规则（用于导入/测试，保证可复现）
    pub fn with_id(id: &str, name: &str, body: RuleBody, priority: i64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            body,
            priority,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn kind(&self) -> RuleKind {
        self.body.kind()
    }
}

// ==========================================
// RuleSet - 规则集合
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn add(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// 按 ID 删除规则，返回是否删除成功
    pub fn remove(&mut self, rule_id: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.id != rule_id);
        self.rules.len() != before
    }

    pub fn get(&self, rule_id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == rule_id)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 计算生效优先级（应用 precedenceOverride 之后）
    ///
    /// 覆写规则按自身优先级依次生效，后生效者覆盖先生效者；
    /// 引用不存在的规则 ID 被忽略（由仿真器负责报告）
    pub fn effective_priorities(&self) -> HashMap<&str, i64> {
        let mut priorities: HashMap<&str, i64> =
            self.rules.iter().map(|r| (r.id.as_str(), r.priority)).collect();

        let mut overrides: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|r| r.kind() == RuleKind::PrecedenceOverride)
            .collect();
        overrides.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));

        for rule in overrides {
            if let RuleBody::PrecedenceOverride { rule_ids, priority } = &rule.body {
                for target in rule_ids {
                    if let Some(p) = priorities.get_mut(target.as_str()) {
                        *p = *priority;
                    }
                }
            }
        }

        priorities
    }

    /// 按生效优先级升序排列（同优先级按 ID 升序）
    pub fn ordered(&self) -> Vec<&Rule> {
        let priorities = self.effective_priorities();
        let mut ordered: Vec<&Rule> = self.rules.iter().collect();
        ordered.sort_by(|a, b| {
            let pa = priorities.get(a.id.as_str()).copied().unwrap_or(a.priority);
            let pb = priorities.get(b.id.as_str()).copied().unwrap_or(b.priority);
            pa.cmp(&pb).then_with(|| a.id.cmp(&b.id))
        });
        ordered
    }
}
