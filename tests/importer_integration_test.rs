// ==========================================
// 导入层集成测试
// ==========================================
// 流程: CSV 目录 → EntityStore → 校验 → 批量修复 → 仿真
// ==========================================

use std::fs;
use std::path::Path;

use allocation_workbench::api::AllocationSession;
use allocation_workbench::domain::entity::IntField;
use allocation_workbench::domain::types::FindingCategory;
use allocation_workbench::importer::{
    load_store_from_dir, ImportError, CLIENTS_FILE, TASKS_FILE, WORKERS_FILE,
};
use allocation_workbench::logging;
use tempfile::TempDir;

fn write_dataset(dir: &Path) {
    // 表头带 BOM、大小写与空格不规范
    fs::write(
        dir.join(CLIENTS_FILE),
        "\u{feff}Client ID,Client Name,Priority Level,Requested Task IDs,Group Tag,Attributes JSON\n\
         C1,Acme,9,\"T1,T2,T9\",vip,\"{\"\"budget\"\": 10}\"\n\
         C2,Globex,high,T3,,{broken\n",
    )
    .unwrap();
    fs::write(
        dir.join(WORKERS_FILE),
        "WorkerID,WorkerName,Skills,AvailableSlots,MaxLoadPerPhase,WorkerGroup\n\
         W1,Alice,\"Coding, UI\",\"[1,2,3]\",2,core\n\
         W1,Bob,coding,1-2,1,core\n\
         W2,Carol,design,\"2;3\",0,\n",
    )
    .unwrap();
    fs::write(
        dir.join(TASKS_FILE),
        "TaskID,TaskName,RequiredSkills,Duration,PreferredPhases,Category\n\
         T1,Build,coding,1,1-2,dev\n\
         T2,Polish,ui,2,,dev\n\
         T3,Mockups,design,1,3,art\n",
    )
    .unwrap();
}

#[test]
fn test_import_normalizes_headers_and_values() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());

    let store = load_store_from_dir(dir.path()).unwrap();

    assert_eq!(store.clients.len(), 2);
    assert_eq!(store.workers.len(), 3);
    assert_eq!(store.tasks.len(), 3);

    let c1 = &store.clients[0];
    assert_eq!(c1.id(), "C1");
    assert_eq!(c1.priority_level, Some(IntField::Int(9)));
    assert_eq!(c1.requested_task_ids, vec!["T1", "T2", "T9"]);
    assert_eq!(
        store.clients[1].priority_level,
        Some(IntField::Invalid("high".to_string()))
    );
    assert_eq!(store.clients[1].group_tag, None);

    assert!(store.workers[0].skills.contains("ui"));
    assert_eq!(store.workers[1].available_slots, vec![1, 2]);
    assert_eq!(store.workers[2].available_slots, vec![2, 3]);
    assert!(store.tasks[1].preferred_phases.is_empty());
}

#[test]
fn test_imported_data_flows_through_session() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    let store = load_store_from_dir(dir.path()).unwrap();

    let mut session = AllocationSession::new(store);
    let findings = session.validate().to_vec();

    let count = |category: FindingCategory| findings.iter().filter(|f| f.category == category).count();
    assert_eq!(count(FindingCategory::DuplicateId), 1);
    assert_eq!(count(FindingCategory::MalformedJson), 1);
    assert_eq!(count(FindingCategory::UnknownReference), 1);
    // C1 的 9、C2 的 high、W2 的 0
    assert_eq!(count(FindingCategory::OutOfRange), 3);

    let report = session.fix_all();
    assert!(report.failed.is_empty());
    assert!(session.summary().is_clean());

    let ids: Vec<&str> = session.store().workers.iter().map(|w| w.id()).collect();
    assert_eq!(ids, vec!["W1", "W1_2", "W2"]);

    // W1 具备 coding + ui，产能 2
    let simulation = session.simulate();
    let w1 = &simulation.allocations[0];
    assert_eq!(w1.workload, 2);
    assert_eq!(w1.efficiency, 100);

    let exported: serde_json::Value =
        serde_json::from_str(&session.export_store_json().unwrap()).unwrap();
    assert_eq!(exported["workers"][1]["WorkerID"], "W1_2");
    assert_eq!(exported["clients"][0]["PriorityLevel"], 5);
}

#[test]
fn test_missing_directory_reports_file_not_found() {
    let dir = TempDir::new().unwrap();

    let err = load_store_from_dir(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, ImportError::FileNotFound(_)));
}
