// ==========================================
// Mock 配置 - 用于集成测试
// ==========================================

use allocation_workbench::config::{config_keys, ConfigManager, ConfigScope};

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub stress_high_ratio: f64,
    pub stress_medium_ratio: f64,
    pub high_priority_client_ratio: f64,
    pub default_preset: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            stress_high_ratio: 0.8,
            stress_medium_ratio: 0.6,
            high_priority_client_ratio: 0.5,
            default_preset: "balanced".to_string(),
        }
    }
}

impl MockConfig {
    /// 收紧压力阈值（更容易判定为 High）
    pub fn strict_stress() -> Self {
        Self {
            stress_high_ratio: 0.4,
            stress_medium_ratio: 0.2,
            ..Self::default()
        }
    }

    pub fn with_preset(preset: &str) -> Self {
        Self {
            default_preset: preset.to_string(),
            ..Self::default()
        }
    }

    /// 转为 ConfigManager（global 作用域）
    pub fn into_manager(self) -> ConfigManager {
        let mut manager = ConfigManager::new();
        let entries = [
            (config_keys::STRESS_HIGH_RATIO, self.stress_high_ratio.to_string()),
            (config_keys::STRESS_MEDIUM_RATIO, self.stress_medium_ratio.to_string()),
            (
                config_keys::HIGH_PRIORITY_CLIENT_RATIO,
                self.high_priority_client_ratio.to_string(),
            ),
            (config_keys::DEFAULT_PRESET, self.default_preset),
        ];
        for (key, value) in entries {
            manager.set(ConfigScope::Global, key, &value);
        }
        manager
    }
}
