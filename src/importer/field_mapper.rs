// ==========================================
// 资源分配工作台 - 字段映射器实现
// ==========================================
// 职责: 规范化表头 → 实体字段映射 + 类型转换
// 红线: 数值字段不可解析时保留原文（IntField::Invalid），不在此报错
// ==========================================

use crate::domain::entity::{Client, IntField, Task, Worker};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::importer_trait::{
    DataCleaner as DataCleanerTrait, FieldMapper as FieldMapperTrait, RawRecord,
};

pub struct FieldMapper {
    cleaner: DataCleaner,
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldMapperTrait for FieldMapper {
    fn map_client(&self, row: &RawRecord) -> Client {
        Client {
            client_id: self.get_string(row, &["clientid", "id"]),
            client_name: self.get_string(row, &["clientname", "name"]),
            priority_level: self.get_int(row, &["prioritylevel", "priority"]),
            requested_task_ids: self.get_list(row, &["requestedtaskids", "requestedtasks"]),
            group_tag: self.get_string(row, &["grouptag", "group"]),
            attributes_json: self.get_string(row, &["attributesjson", "attributes"]),
        }
    }

    fn map_worker(&self, row: &RawRecord) -> Worker {
        Worker {
            worker_id: self.get_string(row, &["workerid", "id"]),
            worker_name: self.get_string(row, &["workername", "name"]),
            skills: self
                .get_raw(row, &["skills"])
                .map(|v| self.cleaner.clean_skills(v))
                .unwrap_or_default(),
            available_slots: self
                .get_raw(row, &["availableslots", "slots"])
                .map(|v| self.cleaner.parse_phases(v))
                .unwrap_or_default(),
            max_load_per_phase: self.get_int(row, &["maxloadperphase", "maxload"]),
            worker_group: self.get_string(row, &["workergroup", "group"]),
            qualification_level: self.get_string(row, &["qualificationlevel"]),
        }
    }

    fn map_task(&self, row: &RawRecord) -> Task {
        Task {
            task_id: self.get_string(row, &["taskid", "id"]),
            task_name: self.get_string(row, &["taskname", "name"]),
            required_skills: self
                .get_raw(row, &["requiredskills", "skills"])
                .map(|v| self.cleaner.clean_skills(v))
                .unwrap_or_default(),
            duration: self.get_int(row, &["duration"]),
            preferred_phases: self
                .get_raw(row, &["preferredphases", "phases"])
                .map(|v| self.cleaner.parse_phases(v))
                .unwrap_or_default(),
            category: self.get_string(row, &["category"]),
            max_concurrent: self.get_int(row, &["maxconcurrent"]),
        }
    }
}

impl FieldMapper {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }

    /// 按别名顺序取第一个非空单元格
    fn get_raw<'a>(&self, row: &'a RawRecord, aliases: &[&str]) -> Option<&'a str> {
        aliases
            .iter()
            .filter_map(|alias| row.get(*alias))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }

    fn get_string(&self, row: &RawRecord, aliases: &[&str]) -> Option<String> {
        self.cleaner.normalize_null(self.get_raw(row, aliases))
    }

    fn get_int(&self, row: &RawRecord, aliases: &[&str]) -> Option<IntField> {
        self.get_raw(row, aliases).map(IntField::parse)
    }

    fn get_list(&self, row: &RawRecord, aliases: &[&str]) -> Vec<String> {
        self.get_raw(row, aliases)
            .map(|v| self.cleaner.split_list(v))
            .unwrap_or_default()
    }
}
