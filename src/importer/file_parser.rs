// ==========================================
// 资源分配工作台 - 文件解析器实现
// ==========================================
// 支持: CSV (.csv)，首行为表头
// ==========================================

use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{FileParser, RawRecord};

/// 表头规范化: 去除非字母数字字符并转小写（"Client ID" / "client_id" → "clientid"）
pub fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 从任意读取源解析（供文件与内存数据共用）
    pub fn parse_reader<R: Read>(&self, reader: R, source: &str) -> ImportResult<Vec<RawRecord>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::EmptyHeader(source.to_string()));
        }

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row_map = RawRecord::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    if !header.is_empty() {
                        row_map.insert(header.clone(), value.trim().to_string());
                    }
                }
            }

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(row_map);
        }

        debug!(source, rows = records.len(), "CSV 解析完成");
        Ok(records)
    }
}

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        if let Some(ext) = file_path.extension() {
            if ext != "csv" {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(file_path)?;
        self.parse_reader(file, &file_path.display().to_string())
    }
}
