// ==========================================
// 资源分配工作台 - 校验结果（Finding）
// ==========================================
// 红线: Finding 是派生数据，每次校验整体重算，永不就地修改
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{EntityType, FindingCategory, Severity};

/// 结构性问题使用的实体 ID
pub const STRUCTURE_ENTITY_ID: &str = "structure";

// ==========================================
// Finding - 单条校验结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub id: String,
    pub severity: Severity,
    pub category: FindingCategory,
    pub message: String,
    pub details: String,
    pub entity_type: EntityType,
    pub entity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub auto_fixable: bool,
    /// 问题记录在所属集合中的行号（0 起）；集合级问题为 None
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
}

impl Finding {
    /// 去重/回归比较用的键: (类别, 实体ID, 字段)
    pub fn key(&self) -> (FindingCategory, &str, Option<&str>) {
        (self.category, self.entity_id.as_str(), self.field.as_deref())
    }
}

// ==========================================
// ValidationSummary - 校验汇总（导出配置使用）
// ==========================================
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub total: usize,
    pub auto_fixable: usize,
    pub last_run_at: Option<DateTime<Utc>>,
}

impl ValidationSummary {
    /// 按严重级别统计
    pub fn from_findings(findings: &[Finding], last_run_at: Option<DateTime<Utc>>) -> Self {
        let count = |severity: Severity| findings.iter().filter(|f| f.severity == severity).count();

        Self {
            errors: count(Severity::Error),
            warnings: count(Severity::Warning),
            infos: count(Severity::Info),
            total: findings.len(),
            auto_fixable: findings.iter().filter(|f| f.auto_fixable).count(),
            last_run_at,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}
