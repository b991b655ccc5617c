// ==========================================
// 资源分配工作台 - 配置导出
// ==========================================
// 输出键名稳定（camelCase），版本号固定 "1.0"
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::finding::ValidationSummary;
use crate::domain::priority::PriorityWeights;
use crate::domain::rule::RuleSet;

/// 导出格式版本
pub const EXPORT_VERSION: &str = "1.0";

/// 导出的配置对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigExport {
    pub version: String,
    pub rules: RuleSet,
    pub priorities: PriorityWeights,
    pub validation: ValidationSummary,
    pub generated_at: DateTime<Utc>,
}

impl ConfigExport {
    pub fn new(rules: RuleSet, priorities: PriorityWeights, validation: ValidationSummary) -> Self {
        Self {
            version: EXPORT_VERSION.to_string(),
            rules,
            priorities,
            validation,
            generated_at: Utc::now(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rule::{Rule, RuleBody};

    #[test]
    fn test_export_uses_stable_keys() {
        let mut rules = RuleSet::default();
        rules.add(Rule::with_id(
            "R1",
            "pair",
            RuleBody::CoRun {
                tasks: vec!["T1".to_string(), "T2".to_string()],
            },
            1,
        ));
        let export = ConfigExport::new(rules, PriorityWeights::default(), ValidationSummary::default());

        let value = serde_json::to_value(&export).unwrap();

        assert_eq!(value["version"], "1.0");
        assert!(value.get("generatedAt").is_some());
        assert_eq!(value["rules"][0]["type"], "coRun");
        assert_eq!(value["priorities"]["activePreset"], "balanced");
        assert_eq!(value["priorities"]["criteriaOrder"][0], "priorityLevel");
        assert_eq!(value["validation"]["autoFixable"], 0);
        assert!(value["validation"].get("lastRunAt").is_some());
    }

    #[test]
    fn test_export_json_reads_back() {
        let export = ConfigExport::new(
            RuleSet::default(),
            PriorityWeights::default(),
            ValidationSummary::default(),
        );
        let json = export.to_json_pretty().unwrap();

        assert_eq!(ConfigExport::from_json(&json).unwrap(), export);
    }
}
