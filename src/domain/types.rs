// ==========================================
// 资源分配工作台 - 领域类型定义
// ==========================================
// 职责: 校验严重级别、实体类型、问题类别、压力等级
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 严重级别 (Severity)
// ==========================================
// 顺序: Error > Warning > Info
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,   // 阻断
    Warning, // 警告
    Info,    // 提示
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

// ==========================================
// 实体类型 (Entity Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Client,
    Worker,
    Task,
}

impl EntityType {
    /// 主键字段名（规范字段名）
    pub fn id_field(&self) -> &'static str {
        match self {
            EntityType::Client => "ClientID",
            EntityType::Worker => "WorkerID",
            EntityType::Task => "TaskID",
        }
    }

    /// 集合名称（用于消息展示）
    pub fn collection_name(&self) -> &'static str {
        match self {
            EntityType::Client => "clients",
            EntityType::Worker => "workers",
            EntityType::Task => "tasks",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Client => write!(f, "client"),
            EntityType::Worker => write!(f, "worker"),
            EntityType::Task => write!(f, "task"),
        }
    }
}

// ==========================================
// 问题类别 (Finding Category)
// ==========================================
// 序列化格式: 展示名称（对外稳定，导出/前端直接使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingCategory {
    #[serde(rename = "Missing Required Field")]
    MissingField, // 结构性
    #[serde(rename = "Duplicate ID")]
    DuplicateId, // 完整性
    #[serde(rename = "Out-of-range Value")]
    OutOfRange, // 数值范围
    #[serde(rename = "Malformed JSON")]
    MalformedJson, // 格式
    #[serde(rename = "Unknown Reference")]
    UnknownReference, // 完整性
    #[serde(rename = "Skill Coverage")]
    SkillCoverage, // 建议性
    #[serde(rename = "Insight")]
    Insight, // 建议性
}

impl FindingCategory {
    /// 展示名称
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCategory::MissingField => "Missing Required Field",
            FindingCategory::DuplicateId => "Duplicate ID",
            FindingCategory::OutOfRange => "Out-of-range Value",
            FindingCategory::MalformedJson => "Malformed JSON",
            FindingCategory::UnknownReference => "Unknown Reference",
            FindingCategory::SkillCoverage => "Skill Coverage",
            FindingCategory::Insight => "Insight",
        }
    }

    /// ID 前缀（用于生成确定性的 Finding ID）
    pub fn slug(&self) -> &'static str {
        match self {
            FindingCategory::MissingField => "missing-field",
            FindingCategory::DuplicateId => "duplicate-id",
            FindingCategory::OutOfRange => "out-of-range",
            FindingCategory::MalformedJson => "malformed-json",
            FindingCategory::UnknownReference => "unknown-reference",
            FindingCategory::SkillCoverage => "skill-coverage",
            FindingCategory::Insight => "insight",
        }
    }

    /// 错误分类
    pub fn error_class(&self) -> ErrorClass {
        match self {
            FindingCategory::MissingField => ErrorClass::Structural,
            FindingCategory::DuplicateId | FindingCategory::UnknownReference => {
                ErrorClass::Integrity
            }
            FindingCategory::OutOfRange => ErrorClass::Range,
            FindingCategory::MalformedJson => ErrorClass::Format,
            FindingCategory::SkillCoverage | FindingCategory::Insight => ErrorClass::Advisory,
        }
    }
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 错误分类 (Error Class)
// ==========================================
// Structural: 需人工补录，永不自动修复
// Integrity / Range / Format: 可确定性修复
// Advisory: 仅提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorClass {
    Structural,
    Integrity,
    Range,
    Format,
    Advisory,
}

// ==========================================
// 压力等级 (Stress Level)
// ==========================================
// 顺序: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressLevel {
    Low,
    Medium,
    High,
}

impl StressLevel {
    /// 按负载/产能比判定压力等级
    ///
    /// - workload > high_ratio * capacity → High
    /// - workload > medium_ratio * capacity → Medium
    /// - 其余（含产能为 0）→ Low
    pub fn classify(workload: u32, capacity: u32, high_ratio: f64, medium_ratio: f64) -> Self {
        if capacity == 0 {
            return StressLevel::Low;
        }
        let load = workload as f64;
        let cap = capacity as f64;
        if load > high_ratio * cap {
            StressLevel::High
        } else if load > medium_ratio * cap {
            StressLevel::Medium
        } else {
            StressLevel::Low
        }
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StressLevel::Low => write!(f, "low"),
            StressLevel::Medium => write!(f, "medium"),
            StressLevel::High => write!(f, "high"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stress_classify_thresholds() {
        assert_eq!(StressLevel::classify(1, 2, 0.8, 0.6), StressLevel::Low);
        assert_eq!(StressLevel::classify(2, 3, 0.8, 0.6), StressLevel::Medium);
        assert_eq!(StressLevel::classify(2, 2, 0.8, 0.6), StressLevel::High);
        assert_eq!(StressLevel::classify(0, 0, 0.8, 0.6), StressLevel::Low);
    }

    #[test]
    fn test_category_serializes_as_display_name() {
        let json = serde_json::to_string(&FindingCategory::OutOfRange).unwrap();
        assert_eq!(json, "\"Out-of-range Value\"");
        assert_eq!(FindingCategory::DuplicateId.to_string(), "Duplicate ID");
    }

    #[test]
    fn test_only_fixable_classes_are_deterministic() {
        assert_eq!(FindingCategory::MissingField.error_class(), ErrorClass::Structural);
        assert_eq!(FindingCategory::UnknownReference.error_class(), ErrorClass::Integrity);
        assert_eq!(FindingCategory::MalformedJson.error_class(), ErrorClass::Format);
        assert_eq!(FindingCategory::Insight.error_class(), ErrorClass::Advisory);
    }
}
