// ==========================================
// 资源分配工作台 - 导入层
// ==========================================
// 职责: 外部 CSV → EntityStore（规范字段名，列表/区间在此展开）
// 支持: clients.csv / workers.csv / tasks.csv
// ==========================================

pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;

use std::path::Path;
use tracing::{info, instrument};

use crate::domain::entity::EntityStore;

// 重导出核心类型
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{normalize_header, CsvParser};

// 重导出 Trait 接口
pub use importer_trait::{DataCleaner, FieldMapper, FileParser, RawRecord};

/// 目录导入时的规范文件名
pub const CLIENTS_FILE: &str = "clients.csv";
pub const WORKERS_FILE: &str = "workers.csv";
pub const TASKS_FILE: &str = "tasks.csv";

// ==========================================
// StoreImporter - 实体仓导入器
// ==========================================
pub struct StoreImporter<P: FileParser, M: FieldMapper> {
    parser: P,
    mapper: M,
}

impl Default for StoreImporter<CsvParser, FieldMapperImpl> {
    fn default() -> Self {
        Self::new(CsvParser, FieldMapperImpl::new())
    }
}

impl<P: FileParser, M: FieldMapper> StoreImporter<P, M> {
    pub fn new(parser: P, mapper: M) -> Self {
        Self { parser, mapper }
    }

    /// 从三个文件导入
    #[instrument(skip(self))]
    pub fn import_files(
        &self,
        clients_path: &Path,
        workers_path: &Path,
        tasks_path: &Path,
    ) -> ImportResult<EntityStore> {
        let clients = self
            .parser
            .parse_to_raw_records(clients_path)?
            .iter()
            .map(|row| self.mapper.map_client(row))
            .collect();
        let workers = self
            .parser
            .parse_to_raw_records(workers_path)?
            .iter()
            .map(|row| self.mapper.map_worker(row))
            .collect();
        let tasks = self
            .parser
            .parse_to_raw_records(tasks_path)?
            .iter()
            .map(|row| self.mapper.map_task(row))
            .collect();

        let store = EntityStore::new(clients, workers, tasks);
        info!(
            clients = store.clients.len(),
            workers = store.workers.len(),
            tasks = store.tasks.len(),
            "数据导入完成"
        );
        Ok(store)
    }

    /// 从目录导入（clients.csv / workers.csv / tasks.csv）
    pub fn import_dir(&self, dir: &Path) -> ImportResult<EntityStore> {
        self.import_files(
            &dir.join(CLIENTS_FILE),
            &dir.join(WORKERS_FILE),
            &dir.join(TASKS_FILE),
        )
    }
}

/// 便捷入口: 使用 CSV 解析器从目录导入
pub fn load_store_from_dir(dir: &Path) -> ImportResult<EntityStore> {
    StoreImporter::default().import_dir(dir)
}
