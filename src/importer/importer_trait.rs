// ==========================================
// 资源分配工作台 - 导入层接口定义
// ==========================================
// 职责: 文件解析 / 数据清洗 / 字段映射 三段式接口
// 红线: 导入阶段不做业务校验，不可解析的值原样保留交给校验引擎
// ==========================================

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::domain::entity::{Client, Task, Worker};
use crate::importer::error::ImportResult;

/// 原始行: 规范化表头 → 单元格文本
pub type RawRecord = HashMap<String, String>;

// ==========================================
// FileParser - 文件解析
// ==========================================
pub trait FileParser: Send + Sync {
    /// 解析文件为原始记录（表头作为键，跳过全空行）
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>>;
}

// ==========================================
// DataCleaner - 数据清洗
// ==========================================
pub trait DataCleaner: Send + Sync {
    /// TRIM；空白视为缺失
    fn normalize_null(&self, value: Option<&str>) -> Option<String>;

    /// 列表字段拆分（逗号/分号/竖线分隔，允许 [..] 包裹与引号）
    fn split_list(&self, value: &str) -> Vec<String>;

    /// 技能标签集合（统一小写）
    fn clean_skills(&self, value: &str) -> BTreeSet<String>;

    /// 阶段列表（支持 "1-3" 区间展开）
    fn parse_phases(&self, value: &str) -> Vec<u32>;
}

// ==========================================
// FieldMapper - 字段映射
// ==========================================
pub trait FieldMapper: Send + Sync {
    fn map_client(&self, row: &RawRecord) -> Client;

    fn map_worker(&self, row: &RawRecord) -> Worker;

    fn map_task(&self, row: &RawRecord) -> Task;
}
