// ==========================================
// 仿真与优化集成测试
// ==========================================
// 覆盖: 产能上限 / 确定性 / JSON 规则加载 / 规则跳过报告 / 优化目标
// ==========================================

mod helpers;

use allocation_workbench::api::{AllocationSession, ApiError};
use allocation_workbench::domain::rule::RuleKind;
use allocation_workbench::domain::types::StressLevel;
use allocation_workbench::domain::EntityStore;
use allocation_workbench::engine::optimizer::workload_variance;
use allocation_workbench::engine::simulator::base_capacity;
use helpers::mock_config::MockConfig;
use helpers::test_data_builder::*;

fn assert_within_capacity(store: &EntityStore, session: &AllocationSession) {
    for allocation in session.simulate().allocations {
        let worker = store.find_worker(&allocation.worker_id).unwrap();
        assert!(
            allocation.workload <= base_capacity(worker),
            "{} 超出产能",
            allocation.worker_id
        );
        assert_eq!(allocation.workload as usize, allocation.assigned_tasks.len());
        assert!(allocation.efficiency <= 100);
    }
}

#[test]
fn test_workload_never_exceeds_capacity() {
    for store in [baseline_store(), unbalanced_store()] {
        let session = AllocationSession::new(store.clone());
        assert_within_capacity(&store, &session);
    }
}

#[test]
fn test_simulation_is_deterministic() {
    let mut session = AllocationSession::new(unbalanced_store());
    session.apply_preset("fairDistribution").unwrap();

    let first = session.simulate();
    let second = session.simulate();
    assert_eq!(first, second);
}

#[test]
fn test_rules_loaded_from_json() {
    let store = EntityStore::new(
        vec![ClientBuilder::new("C1").requests(&["T1"]).build()],
        vec![WorkerBuilder::new("W1")
            .skills(&["coding"])
            .slots(&[1, 2])
            .max_load(3)
            .group("core")
            .build()],
        vec![
            TaskBuilder::new("T1").skills(&["coding"]).build(),
            TaskBuilder::new("T2").skills(&["coding"]).category("legacy").build(),
            TaskBuilder::new("T3").skills(&["coding"]).build(),
            TaskBuilder::new("T4").skills(&["coding"]).build(),
        ],
    );
    let rules = r#"[
        {"id": "R1", "name": "window", "type": "phaseWindow",
         "parameters": {"taskId": "T3", "allowedPhases": [5, 6]}, "priority": 1},
        {"id": "R2", "name": "no legacy", "type": "patternMatch",
         "parameters": {"regex": "^legacy$", "field": "category", "action": "exclude"}, "priority": 2},
        {"id": "R3", "name": "limit", "type": "loadLimit",
         "parameters": {"workerGroup": "core", "maxSlotsPerPhase": 1}, "priority": 3}
    ]"#;

    let mut session = AllocationSession::new(store);
    assert_eq!(session.load_rules_json(rules).unwrap(), 3);

    let report = session.simulate();
    let w1 = &report.allocations[0];
    assert_eq!(w1.workload, 1);
    assert!(!w1.assigned_tasks.contains(&"T2".to_string()));
    assert!(!w1.assigned_tasks.contains(&"T3".to_string()));
    assert_eq!(w1.efficiency, 100);
    assert_eq!(w1.stress, StressLevel::High);
    assert!(report.skipped_rules.is_empty());
}

#[test]
fn test_invalid_rules_are_skipped_and_reported() {
    let rules = r#"[
        {"id": "R1", "name": "pair", "type": "coRun",
         "parameters": {"tasks": ["T1", "T404"]}},
        {"id": "R2", "name": "bad regex", "type": "patternMatch",
         "parameters": {"regex": "([", "field": "taskId", "action": "restrict"}}
    ]"#;
    let mut session = AllocationSession::new(baseline_store());
    session.load_rules_json(rules).unwrap();

    let report = session.simulate();

    let skipped: Vec<(&str, RuleKind)> = report
        .skipped_rules
        .iter()
        .map(|s| (s.rule_id.as_str(), s.kind))
        .collect();
    assert_eq!(
        skipped,
        vec![("R1", RuleKind::CoRun), ("R2", RuleKind::PatternMatch)]
    );
    // 跳过的规则不影响分配
    assert_eq!(report.allocations[0].assigned_tasks, vec!["T1".to_string()]);
}

#[test]
fn test_config_thresholds_reach_simulator() {
    let config = MockConfig::strict_stress().into_manager();
    let session = AllocationSession::with_config(baseline_store(), &config).unwrap();

    // 1 / 2 = 0.5 > 0.4
    assert_eq!(session.simulate().allocations[0].stress, StressLevel::High);
}

#[test]
fn test_config_default_preset_is_applied() {
    let config = MockConfig::with_preset("minimizeWorkload").into_manager();
    let session = AllocationSession::with_config(baseline_store(), &config).unwrap();
    assert_eq!(session.weights().active_preset(), "minimizeWorkload");

    let bad = MockConfig::with_preset("nope").into_manager();
    assert!(AllocationSession::with_config(baseline_store(), &bad).is_err());
}

#[test]
fn test_config_file_reaches_simulator() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"simulation/stress_high_ratio": 0.4}"#).unwrap();

    let session = AllocationSession::with_config_file(baseline_store(), &path).unwrap();
    assert_eq!(session.simulate().allocations[0].stress, StressLevel::High);

    let missing = dir.path().join("nope.json");
    assert!(matches!(
        AllocationSession::with_config_file(baseline_store(), &missing),
        Err(ApiError::Config(_))
    ));
}

#[test]
fn test_fair_objective_reduces_variance() {
    let session = AllocationSession::new(unbalanced_store());

    let result = session.optimize("fair");

    assert_eq!(result.objective, "fair");
    assert_eq!(result.before.len(), result.after.len());
    assert!(workload_variance(&result.after) < workload_variance(&result.before));
    assert!(result.deltas.workload_variance_after <= result.deltas.workload_variance_before);
    assert!(!result.improvements.is_empty());
}

#[test]
fn test_fair_objective_stays_within_capacity() {
    let store = unbalanced_store();
    let session = AllocationSession::new(store.clone());

    let result = session.optimize("fair");

    // W3 只有 design 技能，没有可接收的任务
    let workloads: Vec<u32> = result.after.iter().map(|a| a.workload).collect();
    assert_eq!(workloads, vec![4, 1, 0]);
    for allocation in &result.after {
        let worker = store.find_worker(&allocation.worker_id).unwrap();
        assert!(allocation.workload <= base_capacity(worker));
        assert_eq!(allocation.workload as usize, allocation.assigned_tasks.len());
    }
}

#[test]
fn test_unknown_objective_falls_back() {
    let session = AllocationSession::new(unbalanced_store());

    let result = session.optimize("speed");

    assert_eq!(result.before.len(), 3);
    assert!(!result.improvements.is_empty());
    for allocation in &result.after {
        assert!(allocation.efficiency <= 100);
    }
}

#[test]
fn test_duplicate_rule_ids_are_rejected() {
    let rules = r#"[
        {"id": "R1", "name": "a", "type": "custom", "parameters": {"excludedTasks": ["T1"]}},
        {"id": "R1", "name": "b", "type": "custom", "parameters": {"excludedTasks": ["T2"]}}
    ]"#;
    let mut session = AllocationSession::new(baseline_store());

    let err = session.load_rules_json(rules).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert!(session.rules().is_empty());
}
