// ==========================================
// 资源分配工作台 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: 内存 key-value（scope + key），可从 JSON 文档加载
// ==========================================

use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::thresholds::{OptimizerFactors, SimulationThresholds, ValidationThresholds};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 校验洞察
    pub const HIGH_PRIORITY_CLIENT_RATIO: &str = "validation/high_priority_client_ratio";
    pub const HIGH_PRIORITY_LEVEL: &str = "validation/high_priority_level";
    pub const LOW_SKILL_WORKER_RATIO: &str = "validation/low_skill_worker_ratio";
    pub const LOW_SKILL_MAX_COUNT: &str = "validation/low_skill_max_count";
    pub const OVERCOMMITTED_WORKER_RATIO: &str = "validation/overcommitted_worker_ratio";

    // 仿真压力阈值
    pub const STRESS_HIGH_RATIO: &str = "simulation/stress_high_ratio";
    pub const STRESS_MEDIUM_RATIO: &str = "simulation/stress_medium_ratio";

    // 优化器
    pub const COST_WORKLOAD_REDUCTION: &str = "optimizer/cost_workload_reduction";
    pub const COST_EFFICIENCY_FACTOR: &str = "optimizer/cost_efficiency_factor";
    pub const PRIORITY_EFFICIENCY_BOOST: &str = "optimizer/priority_efficiency_boost";
    pub const OPTIMIZER_HIGH_PRIORITY_LEVEL: &str = "optimizer/high_priority_level";

    // 默认权重预设
    pub const DEFAULT_PRESET: &str = "priority/default_preset";
}

/// 全局作用域
pub const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigError
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置文档格式错误: {0}")]
    Format(#[from] serde_json::Error),

    #[error("配置文档必须是 JSON 对象")]
    NotAnObject,
}

// ==========================================
// ConfigScope - 配置作用域
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigScope {
    Global,
    Session(String),
}

impl ConfigScope {
    pub fn as_str(&self) -> &str {
        match self {
            ConfigScope::Global => GLOBAL_SCOPE,
            ConfigScope::Session(id) => id,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: HashMap<(String, String), String>,
}

impl ConfigManager {
    /// 创建空配置（所有读取均返回默认值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 对象加载 global 配置
    ///
    /// 文档形如 {"simulation/stress_high_ratio": 0.75, ...}；值可为数字或字符串
    pub fn from_json_str(doc: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(doc)?;
        let object = value.as_object().ok_or(ConfigError::NotAnObject)?;

        let mut manager = Self::new();
        for (key, v) in object {
            let text = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            manager.set(ConfigScope::Global, key, &text);
        }
        debug!(count = manager.values.len(), "配置已加载");
        Ok(manager)
    }

    /// 从 JSON 文件加载
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let doc = std::fs::read_to_string(path)?;
        Self::from_json_str(&doc)
    }

    /// 写入配置值
    pub fn set(&mut self, scope: ConfigScope, key: &str, value: &str) {
        self.values
            .insert((scope.as_str().to_string(), key.to_string()), value.to_string());
    }

    /// 读取配置值（会话作用域优先，回落到 global）
    pub fn get(&self, scope: &ConfigScope, key: &str) -> Option<&str> {
        self.values
            .get(&(scope.as_str().to_string(), key.to_string()))
            .or_else(|| {
                self.values
                    .get(&(GLOBAL_SCOPE.to_string(), key.to_string()))
            })
            .map(String::as_str)
    }

    /// 读取 global 配置值
    pub fn get_global(&self, key: &str) -> Option<&str> {
        self.get(&ConfigScope::Global, key)
    }

    /// 读取并解析，缺失或解析失败时使用默认值
    fn get_parsed<T: FromStr>(&self, key: &str, default: T) -> T {
        match self.get_global(key) {
            None => default,
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => v,
                Err(_) => {
                    warn!(key, value = raw, "配置值无法解析，使用默认值");
                    default
                }
            },
        }
    }

    // ==========================================
    // 类型化读取
    // ==========================================

    pub fn validation_thresholds(&self) -> ValidationThresholds {
        let d = ValidationThresholds::default();
        ValidationThresholds {
            high_priority_client_ratio: self.get_parsed(
                config_keys::HIGH_PRIORITY_CLIENT_RATIO,
                d.high_priority_client_ratio,
            ),
            high_priority_level: self
                .get_parsed(config_keys::HIGH_PRIORITY_LEVEL, d.high_priority_level),
            low_skill_worker_ratio: self
                .get_parsed(config_keys::LOW_SKILL_WORKER_RATIO, d.low_skill_worker_ratio),
            low_skill_max_count: self
                .get_parsed(config_keys::LOW_SKILL_MAX_COUNT, d.low_skill_max_count),
            overcommitted_worker_ratio: self.get_parsed(
                config_keys::OVERCOMMITTED_WORKER_RATIO,
                d.overcommitted_worker_ratio,
            ),
        }
    }

    pub fn simulation_thresholds(&self) -> SimulationThresholds {
        let d = SimulationThresholds::default();
        SimulationThresholds {
            stress_high_ratio: self.get_parsed(config_keys::STRESS_HIGH_RATIO, d.stress_high_ratio),
            stress_medium_ratio: self
                .get_parsed(config_keys::STRESS_MEDIUM_RATIO, d.stress_medium_ratio),
        }
    }

    pub fn optimizer_factors(&self) -> OptimizerFactors {
        let d = OptimizerFactors::default();
        OptimizerFactors {
            cost_workload_reduction: self
                .get_parsed(config_keys::COST_WORKLOAD_REDUCTION, d.cost_workload_reduction),
            cost_efficiency_factor: self
                .get_parsed(config_keys::COST_EFFICIENCY_FACTOR, d.cost_efficiency_factor),
            priority_efficiency_boost: self.get_parsed(
                config_keys::PRIORITY_EFFICIENCY_BOOST,
                d.priority_efficiency_boost,
            ),
            high_priority_level: self.get_parsed(
                config_keys::OPTIMIZER_HIGH_PRIORITY_LEVEL,
                d.high_priority_level,
            ),
        }
    }

    /// 默认权重预设名称
    pub fn default_preset(&self) -> String {
        self.get_global(config_keys::DEFAULT_PRESET)
            .unwrap_or("balanced")
            .to_string()
    }

    /// 生效配置快照（含默认值），用于导出/排查
    pub fn snapshot(&self) -> Value {
        json!({
            "validation": self.validation_thresholds(),
            "simulation": self.simulation_thresholds(),
            "optimizer": self.optimizer_factors(),
            "defaultPreset": self.default_preset(),
        })
    }
}
