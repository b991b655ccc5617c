// ==========================================
// 资源分配工作台 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 列表拆分 / 阶段区间展开
// ==========================================

use std::collections::BTreeSet;
use tracing::warn;

use crate::importer::importer_trait::DataCleaner as DataCleanerTrait;

/// 单个区间最多展开的阶段数
const MAX_PHASE_SPAN: u32 = 1000;

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn split_list(&self, value: &str) -> Vec<String> {
        value
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split([',', ';', '|'])
            .map(|item| item.trim().trim_matches(|c| c == '"' || c == '\'').trim())
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn clean_skills(&self, value: &str) -> BTreeSet<String> {
        self.split_list(value)
            .into_iter()
            .map(|s| s.to_lowercase())
            .collect()
    }

    fn parse_phases(&self, value: &str) -> Vec<u32> {
        let mut phases = Vec::new();
        for token in self.split_list(value) {
            match parse_phase_token(&token) {
                Some(expanded) => phases.extend(expanded),
                None => warn!(token = %token, "无法解析的阶段标识，已忽略"),
            }
        }
        phases
    }
}

/// 单个阶段标识: "3" 或 "1-3"（区间含两端）
fn parse_phase_token(token: &str) -> Option<Vec<u32>> {
    if let Some((start, end)) = token.split_once('-') {
        let start: u32 = start.trim().parse().ok()?;
        let end: u32 = end.trim().parse().ok()?;
        if end < start || end - start > MAX_PHASE_SPAN {
            return None;
        }
        return Some((start..=end).collect());
    }
    token.parse().ok().map(|p| vec![p])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_null(Some("  x ")), Some("x".to_string()));
        assert_eq!(cleaner.normalize_null(Some("   ")), None);
        assert_eq!(cleaner.normalize_null(None), None);
    }

    #[test]
    fn test_split_list_variants() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.split_list("T1, T2,,T3"), vec!["T1", "T2", "T3"]);
        assert_eq!(cleaner.split_list("[\"T1\", 'T2']"), vec!["T1", "T2"]);
        assert!(cleaner.split_list("  ").is_empty());
    }

    #[test]
    fn test_clean_skills_lowercases() {
        let cleaner = DataCleaner;
        let skills = cleaner.clean_skills("Coding; DESIGN; coding");
        assert_eq!(
            skills.into_iter().collect::<Vec<_>>(),
            vec!["coding".to_string(), "design".to_string()]
        );
    }

    #[test]
    fn test_parse_phases_expands_ranges() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_phases("1-3, 5"), vec![1, 2, 3, 5]);
        assert_eq!(cleaner.parse_phases("[2,4]"), vec![2, 4]);
        assert_eq!(cleaner.parse_phases("x, 3-1, 7"), vec![7]);
    }
}
