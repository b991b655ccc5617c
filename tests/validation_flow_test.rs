// ==========================================
// 校验流程集成测试
// ==========================================
// 覆盖: 端到端基准场景 / 各类发现 / Finding ID 唯一且确定
// ==========================================

mod helpers;

use std::collections::HashSet;

use allocation_workbench::api::AllocationSession;
use allocation_workbench::domain::types::{EntityType, FindingCategory, Severity, StressLevel};
use allocation_workbench::engine::ValidationEngine;
use allocation_workbench::logging;
use helpers::test_data_builder::*;

#[test]
fn test_baseline_scenario_end_to_end() {
    logging::init_test();
    let mut session = AllocationSession::new(baseline_store());

    let findings = session.validate().to_vec();

    // T2 需要的 design 无人具备
    let coverage: Vec<_> = findings
        .iter()
        .filter(|f| f.category == FindingCategory::SkillCoverage)
        .collect();
    assert_eq!(coverage.len(), 1);
    assert_eq!(coverage[0].entity_id, "design");
    assert_eq!(coverage[0].severity, Severity::Warning);
    assert!(!coverage[0].auto_fixable);
    assert!(findings.iter().all(|f| f.severity != Severity::Error));

    let report = session.simulate();
    assert_eq!(report.allocations.len(), 1);
    let w1 = &report.allocations[0];
    assert_eq!(w1.worker_id, "W1");
    assert_eq!(w1.assigned_tasks, vec!["T1".to_string()]);
    assert_eq!(w1.workload, 1);
    assert_eq!(w1.efficiency, 50);
    assert_eq!(w1.stress, StressLevel::Low);
    assert!(report.skipped_rules.is_empty());
}

#[test]
fn test_dirty_store_reports_every_fixable_category() {
    let engine = ValidationEngine::default();
    let findings = engine.validate(&dirty_store());

    let categories: HashSet<FindingCategory> = findings.iter().map(|f| f.category).collect();
    for expected in [
        FindingCategory::DuplicateId,
        FindingCategory::OutOfRange,
        FindingCategory::MalformedJson,
        FindingCategory::UnknownReference,
    ] {
        assert!(categories.contains(&expected), "缺少类别 {:?}", expected);
    }

    let duplicates: Vec<(EntityType, &str)> = findings
        .iter()
        .filter(|f| f.category == FindingCategory::DuplicateId)
        .map(|f| (f.entity_type, f.entity_id.as_str()))
        .collect();
    assert_eq!(
        duplicates,
        vec![(EntityType::Worker, "W1"), (EntityType::Task, "T2")]
    );

    // C1 的 9、C2 的 urgent、第二个 W1 的 0、T1 的 -1
    let out_of_range = findings
        .iter()
        .filter(|f| f.category == FindingCategory::OutOfRange)
        .count();
    assert_eq!(out_of_range, 4);

    let unknown = findings
        .iter()
        .find(|f| f.category == FindingCategory::UnknownReference)
        .unwrap();
    assert_eq!(unknown.entity_id, "C1");
    assert!(unknown.details.contains("T404"));
}

#[test]
fn test_finding_ids_are_unique_and_stable() {
    let engine = ValidationEngine::default();
    let store = dirty_store();

    let first = engine.validate(&store);
    let second = engine.validate(&store);

    let ids: HashSet<&str> = first.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids.len(), first.len());
    assert_eq!(first, second);
}

#[test]
fn test_missing_required_fields_are_structural() {
    let mut store = baseline_store();
    store.tasks[0].task_name = None;
    store.tasks[1].task_name = Some("  ".to_string());

    let findings = ValidationEngine::default().validate(&store);
    let missing: Vec<_> = findings
        .iter()
        .filter(|f| f.category == FindingCategory::MissingField)
        .collect();

    // 同一 (集合, 字段) 只报一条
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].field.as_deref(), Some("TaskName"));
    assert_eq!(missing[0].entity_id, "structure");
    assert!(!missing[0].auto_fixable);
}

#[test]
fn test_validation_never_fails_on_empty_store() {
    let mut session = AllocationSession::new(Default::default());

    assert!(session.validate().is_empty());
    assert!(session.summary().is_clean());
    assert!(session.simulate().allocations.is_empty());
}
