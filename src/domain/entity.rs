// ==========================================
// 资源分配工作台 - 实体仓（Entity Store）
// ==========================================
// 职责: Client / Worker / Task 三类记录的规范化内存表示
// 红线: 调用方独占; 修复/编辑一律产出新快照，不就地修改
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::domain::types::EntityType;

// ==========================================
// IntField - 整数字段（保留不可解析的原始值）
// ==========================================
// 不可解析的输入不在导入阶段报错，而是作为 Finding 在校验阶段呈现
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntField {
    Int(i64),
    Invalid(String),
}

impl IntField {
    /// 从原始文本解析
    ///
    /// 规则: TRIM 后按整数解析；"3.0" 这类整值小数视为整数；其余保留为 Invalid
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(v) = trimmed.parse::<i64>() {
            return IntField::Int(v);
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 => IntField::Int(f as i64),
            _ => IntField::Invalid(trimmed.to_string()),
        }
    }

    /// 可解析时返回整数值
    pub fn value(&self) -> Option<i64> {
        match self {
            IntField::Int(v) => Some(*v),
            IntField::Invalid(_) => None,
        }
    }
}

impl From<i64> for IntField {
    fn from(v: i64) -> Self {
        IntField::Int(v)
    }
}

impl fmt::Display for IntField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntField::Int(v) => write!(f, "{}", v),
            IntField::Invalid(raw) => write!(f, "{}", raw),
        }
    }
}

// ==========================================
// Client - 客户
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "ClientID")]
    pub client_id: Option<String>,
    #[serde(rename = "ClientName")]
    pub client_name: Option<String>,
    #[serde(rename = "PriorityLevel")]
    pub priority_level: Option<IntField>, // 1-5
    #[serde(rename = "RequestedTaskIDs", default)]
    pub requested_task_ids: Vec<String>, // 有序，允许重复
    #[serde(rename = "GroupTag", default)]
    pub group_tag: Option<String>,
    #[serde(rename = "AttributesJSON", default)]
    pub attributes_json: Option<String>, // 必须是合法 JSON
}

impl Client {
    pub fn new(client_id: &str, client_name: &str, priority_level: i64) -> Self {
        Self {
            client_id: Some(client_id.to_string()),
            client_name: Some(client_name.to_string()),
            priority_level: Some(IntField::Int(priority_level)),
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        self.client_id.as_deref().unwrap_or("")
    }

    /// 优先级（不可解析/缺失时返回 None）
    pub fn priority(&self) -> Option<i64> {
        self.priority_level.as_ref().and_then(IntField::value)
    }
}

// ==========================================
// Worker - 员工
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Worker {
    #[serde(rename = "WorkerID")]
    pub worker_id: Option<String>,
    #[serde(rename = "WorkerName")]
    pub worker_name: Option<String>,
    #[serde(rename = "Skills", default)]
    pub skills: BTreeSet<String>, // 小写技能标签
    #[serde(rename = "AvailableSlots", default)]
    pub available_slots: Vec<u32>, // 可用阶段
    #[serde(rename = "MaxLoadPerPhase")]
    pub max_load_per_phase: Option<IntField>, // >= 1
    #[serde(rename = "WorkerGroup", default)]
    pub worker_group: Option<String>,
    #[serde(rename = "QualificationLevel", default)]
    pub qualification_level: Option<String>,
}

impl Worker {
    pub fn new(worker_id: &str, worker_name: &str, max_load_per_phase: i64) -> Self {
        Self {
            worker_id: Some(worker_id.to_string()),
            worker_name: Some(worker_name.to_string()),
            max_load_per_phase: Some(IntField::Int(max_load_per_phase)),
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        self.worker_id.as_deref().unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.worker_name.as_deref().unwrap_or("")
    }

    /// 技能集合（统一小写）
    pub fn skill_set(&self) -> BTreeSet<String> {
        self.skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

// ==========================================
// Task - 任务
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "TaskID")]
    pub task_id: Option<String>,
    #[serde(rename = "TaskName")]
    pub task_name: Option<String>,
    #[serde(rename = "RequiredSkills", default)]
    pub required_skills: BTreeSet<String>,
    #[serde(rename = "Duration")]
    pub duration: Option<IntField>, // >= 1，单位: 阶段
    #[serde(rename = "PreferredPhases", default)]
    pub preferred_phases: Vec<u32>,
    #[serde(rename = "Category", default)]
    pub category: Option<String>,
    #[serde(rename = "MaxConcurrent", default)]
    pub max_concurrent: Option<IntField>,
}

impl Task {
    pub fn new(task_id: &str, task_name: &str, duration: i64) -> Self {
        Self {
            task_id: Some(task_id.to_string()),
            task_name: Some(task_name.to_string()),
            duration: Some(IntField::Int(duration)),
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        self.task_id.as_deref().unwrap_or("")
    }

    /// 所需技能集合（统一小写）
    pub fn skill_set(&self) -> BTreeSet<String> {
        self.required_skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

// ==========================================
// EntityStore - 实体仓快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityStore {
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub workers: Vec<Worker>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl EntityStore {
    pub fn new(clients: Vec<Client>, workers: Vec<Worker>, tasks: Vec<Task>) -> Self {
        Self {
            clients,
            workers,
            tasks,
        }
    }

    /// 所有已存在的 TaskID
    pub fn task_ids(&self) -> HashSet<&str> {
        self.tasks
            .iter()
            .filter_map(|t| t.task_id.as_deref())
            .collect()
    }

    /// 所有已存在的 WorkerID
    pub fn worker_ids(&self) -> HashSet<&str> {
        self.workers
            .iter()
            .filter_map(|w| w.worker_id.as_deref())
            .collect()
    }

    /// 指定集合中按行号排列的主键（缺失主键为 None）
    pub fn ids_of(&self, entity_type: EntityType) -> Vec<Option<&str>> {
        match entity_type {
            EntityType::Client => self.clients.iter().map(|c| c.client_id.as_deref()).collect(),
            EntityType::Worker => self.workers.iter().map(|w| w.worker_id.as_deref()).collect(),
            EntityType::Task => self.tasks.iter().map(|t| t.task_id.as_deref()).collect(),
        }
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == task_id)
    }

    pub fn find_client(&self, client_id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.id() == client_id)
    }

    pub fn find_worker(&self, worker_id: &str) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id() == worker_id)
    }

    /// 记录总数
    pub fn record_count(&self) -> usize {
        self.clients.len() + self.workers.len() + self.tasks.len()
    }
}
