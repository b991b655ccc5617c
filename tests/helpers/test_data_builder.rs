// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use allocation_workbench::domain::entity::{Client, EntityStore, IntField, Task, Worker};

// ==========================================
// Client 构建器
// ==========================================

pub struct ClientBuilder {
    client: Client,
}

impl ClientBuilder {
    pub fn new(client_id: &str) -> Self {
        Self {
            client: Client::new(client_id, &format!("Client {}", client_id), 3),
        }
    }

    pub fn priority(mut self, priority: i64) -> Self {
        self.client.priority_level = Some(IntField::Int(priority));
        self
    }

    /// 原始文本优先级（模拟导入的未清洗值）
    pub fn priority_raw(mut self, raw: &str) -> Self {
        self.client.priority_level = Some(IntField::parse(raw));
        self
    }

    pub fn requests(mut self, task_ids: &[&str]) -> Self {
        self.client.requested_task_ids = task_ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn group(mut self, group: &str) -> Self {
        self.client.group_tag = Some(group.to_string());
        self
    }

    pub fn attributes(mut self, json: &str) -> Self {
        self.client.attributes_json = Some(json.to_string());
        self
    }

    pub fn build(self) -> Client {
        self.client
    }
}

// ==========================================
// Worker 构建器
// ==========================================

pub struct WorkerBuilder {
    worker: Worker,
}

impl WorkerBuilder {
    pub fn new(worker_id: &str) -> Self {
        Self {
            worker: Worker::new(worker_id, &format!("Worker {}", worker_id), 2),
        }
    }

    pub fn skills(mut self, skills: &[&str]) -> Self {
        self.worker.skills = skills.iter().map(|s| s.to_lowercase()).collect();
        self
    }

    pub fn slots(mut self, slots: &[u32]) -> Self {
        self.worker.available_slots = slots.to_vec();
        self
    }

    pub fn max_load(mut self, max_load: i64) -> Self {
        self.worker.max_load_per_phase = Some(IntField::Int(max_load));
        self
    }

    pub fn group(mut self, group: &str) -> Self {
        self.worker.worker_group = Some(group.to_string());
        self
    }

    pub fn build(self) -> Worker {
        self.worker
    }
}

// ==========================================
// Task 构建器
// ==========================================

pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new(task_id: &str) -> Self {
        Self {
            task: Task::new(task_id, &format!("Task {}", task_id), 1),
        }
    }

    pub fn skills(mut self, skills: &[&str]) -> Self {
        self.task.required_skills = skills.iter().map(|s| s.to_lowercase()).collect();
        self
    }

    pub fn duration(mut self, duration: i64) -> Self {
        self.task.duration = Some(IntField::Int(duration));
        self
    }

    pub fn phases(mut self, phases: &[u32]) -> Self {
        self.task.preferred_phases = phases.to_vec();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.task.category = Some(category.to_string());
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

// ==========================================
// 场景数据
// ==========================================

/// 端到端基准场景
///
/// - C1: P=5，请求 T1, T2
/// - W1: coding，阶段 [1,2]，产能 2
/// - T1: coding；T2: design（无人具备）
pub fn baseline_store() -> EntityStore {
    EntityStore::new(
        vec![ClientBuilder::new("C1").priority(5).requests(&["T1", "T2"]).build()],
        vec![WorkerBuilder::new("W1")
            .skills(&["coding"])
            .slots(&[1, 2])
            .max_load(2)
            .build()],
        vec![
            TaskBuilder::new("T1").skills(&["coding"]).build(),
            TaskBuilder::new("T2").skills(&["design"]).build(),
        ],
    )
}

/// 多问题脏数据场景（每类可修复问题至少一例）
pub fn dirty_store() -> EntityStore {
    EntityStore::new(
        vec![
            ClientBuilder::new("C1")
                .priority_raw("9")
                .requests(&["T1", "T404"])
                .attributes("{\"budget\": ")
                .build(),
            ClientBuilder::new("C2").priority_raw("urgent").requests(&["T2"]).build(),
        ],
        vec![
            WorkerBuilder::new("W1").skills(&["coding", "design"]).slots(&[1, 2, 3]).build(),
            WorkerBuilder::new("W1").skills(&["coding", "ops"]).slots(&[1, 2]).max_load(0).build(),
            WorkerBuilder::new("W2").skills(&["design", "ops"]).slots(&[2, 3]).build(),
        ],
        vec![
            TaskBuilder::new("T1").skills(&["coding"]).duration(-1).build(),
            TaskBuilder::new("T2").skills(&["design"]).phases(&[2]).build(),
            TaskBuilder::new("T2").skills(&["ops"]).build(),
        ],
    )
}

/// 平衡测试场景: 负载高度不均
pub fn unbalanced_store() -> EntityStore {
    let tasks = (1..=6)
        .map(|i| TaskBuilder::new(&format!("T{}", i)).skills(&["coding"]).build())
        .collect();
    EntityStore::new(
        vec![ClientBuilder::new("C1").priority(5).requests(&["T1", "T2"]).build()],
        vec![
            WorkerBuilder::new("W1").skills(&["coding"]).slots(&[1, 2, 3]).max_load(6).build(),
            WorkerBuilder::new("W2").skills(&["coding"]).slots(&[1]).max_load(1).build(),
            WorkerBuilder::new("W3").skills(&["design"]).slots(&[1]).max_load(2).build(),
        ],
        tasks,
    )
}
