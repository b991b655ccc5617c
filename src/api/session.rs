// ==========================================
// 资源分配工作台 - 会话 API
// ==========================================
// 职责: 持有当前实体仓快照 + 规则 + 权重，编排校验/修复/仿真/优化/导出
// 红线: 写操作经 &mut self 串行化；修复后整体替换快照并重新校验
// 红线: 发现列表是派生数据，快照变化后即视为过期
// ==========================================

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::api::export::ConfigExport;
use crate::config::ConfigManager;
use crate::domain::allocation::{OptimizationResult, SimulationReport};
use crate::domain::entity::EntityStore;
use crate::domain::finding::{Finding, ValidationSummary};
use crate::domain::priority::{Criterion, Preset, PriorityWeights};
use crate::domain::rule::{Rule, RuleSet};
use crate::engine::{
    AllocationSimulator, AutoFixEngine, FixBatchReport, Optimizer, ValidationEngine,
};

// ==========================================
// AllocationSession - 会话
// ==========================================

/// 分配工作台会话
///
/// 职责：
/// 1. 数据快照管理（导入后替换、修复后替换）
/// 2. 校验与自动修复
/// 3. 规则与权重编辑
/// 4. 仿真、优化与配置导出
pub struct AllocationSession {
    store: EntityStore,
    rules: RuleSet,
    weights: PriorityWeights,
    findings: Vec<Finding>,
    last_validated_at: Option<DateTime<Utc>>,

    validator: ValidationEngine,
    fixer: AutoFixEngine,
    simulator: AllocationSimulator,
    optimizer: Optimizer,
}

impl AllocationSession {
    /// 使用默认阈值创建会话
    pub fn new(store: EntityStore) -> Self {
        Self {
            store,
            rules: RuleSet::default(),
            weights: PriorityWeights::default(),
            findings: Vec::new(),
            last_validated_at: None,
            validator: ValidationEngine::default(),
            fixer: AutoFixEngine::new(),
            simulator: AllocationSimulator::default(),
            optimizer: Optimizer::default(),
        }
    }

    /// 使用配置管理器中的阈值与默认预设创建会话
    pub fn with_config(store: EntityStore, config: &ConfigManager) -> ApiResult<Self> {
        let simulator = AllocationSimulator::new(config.simulation_thresholds());
        Ok(Self {
            weights: PriorityWeights::from_preset_name(&config.default_preset())?,
            validator: ValidationEngine::new(config.validation_thresholds()),
            optimizer: Optimizer::new(simulator.clone(), config.optimizer_factors()),
            simulator,
            ..Self::new(store)
        })
    }

    /// 从配置文件创建会话
    pub fn with_config_file(store: EntityStore, path: &Path) -> ApiResult<Self> {
        let config = ConfigManager::from_file(path)?;
        debug!(path = %path.display(), config = %config.snapshot(), "生效配置");
        Self::with_config(store, &config)
    }

    // ==========================================
    // 快照
    // ==========================================

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn weights(&self) -> &PriorityWeights {
        &self.weights
    }

    /// 最近一次校验的发现（快照变化后为空，需重新校验）
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// 整体替换实体仓（如重新导入）
    pub fn replace_store(&mut self, store: EntityStore) {
        self.store = store;
        self.findings.clear();
        self.last_validated_at = None;
    }

    // ==========================================
    // 校验与修复
    // ==========================================

    /// 重新校验当前快照
    pub fn validate(&mut self) -> &[Finding] {
        self.findings = self.validator.validate(&self.store);
        self.last_validated_at = Some(Utc::now());
        &self.findings
    }

    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary::from_findings(&self.findings, self.last_validated_at)
    }

    /// 按 Finding ID 应用单条修复，成功后重新校验
    ///
    /// # 返回
    /// - Ok(&[Finding]): 修复后的新发现列表
    /// - Err(NotFound): 当前发现列表中没有该 ID（可能已过期）
    /// - Err(Engine): 不可修复或目标记录已不存在
    #[instrument(skip(self))]
    pub fn apply_fix(&mut self, finding_id: &str) -> ApiResult<&[Finding]> {
        let finding = self
            .findings
            .iter()
            .find(|f| f.id == finding_id)
            .ok_or_else(|| ApiError::NotFound(format!("Finding(id={})不存在", finding_id)))?;

        let next = self.fixer.apply_fix(&self.store, finding)?;
        self.store = next;
        Ok(self.validate())
    }

    /// 移除指定客户的全部无效任务引用，成功后重新校验
    pub fn remove_invalid_references(&mut self, client_id: &str) -> ApiResult<&[Finding]> {
        self.store = self.fixer.remove_invalid_references(&self.store, client_id)?;
        Ok(self.validate())
    }

    /// 批量修复当前发现中的全部可修复项，完成后重新校验
    #[instrument(skip(self))]
    pub fn fix_all(&mut self) -> FixBatchReport {
        if self.last_validated_at.is_none() {
            self.validate();
        }
        let report = self.fixer.fix_all(&self.store, &self.findings);
        self.store = report.store.clone();
        self.validate();
        info!(
            remaining = self.findings.len(),
            auto_fixable = self.findings.iter().filter(|f| f.auto_fixable).count(),
            "批量修复后重新校验"
        );
        report
    }

    // ==========================================
    // 规则与权重
    // ==========================================

    /// 添加规则，返回规则 ID
    pub fn add_rule(&mut self, rule: Rule) -> String {
        let id = rule.id.clone();
        self.rules.add(rule);
        id
    }

    pub fn remove_rule(&mut self, rule_id: &str) -> ApiResult<()> {
        if self.rules.remove(rule_id) {
            Ok(())
        } else {
            Err(ApiError::NotFound(format!("Rule(id={})不存在", rule_id)))
        }
    }

    /// 用 JSON 数组整体替换规则集，返回规则数
    ///
    /// 规则 ID 重复时拒绝整个文档，原规则集保持不变
    pub fn load_rules_json(&mut self, json: &str) -> ApiResult<usize> {
        let rules: RuleSet = serde_json::from_str(json)?;
        let mut seen = HashSet::new();
        if let Some(dup) = rules.rules().iter().find(|r| !seen.insert(r.id.as_str())) {
            return Err(ApiError::InvalidInput(format!("规则 ID 重复: {}", dup.id)));
        }
        self.rules = rules;
        Ok(self.rules.len())
    }

    pub fn set_weight(&mut self, criterion: Criterion, weight: u32) -> ApiResult<()> {
        self.weights.set_weight(criterion, weight)?;
        Ok(())
    }

    pub fn set_criteria_order(&mut self, order: Vec<Criterion>) -> ApiResult<()> {
        self.weights.set_criteria_order(order)?;
        Ok(())
    }

    pub fn apply_preset(&mut self, preset: &str) -> ApiResult<()> {
        let preset: Preset = preset.parse()?;
        self.weights = PriorityWeights::from_preset(preset);
        info!(preset = preset.as_str(), title = preset.title_cn(), "已应用权重预设");
        Ok(())
    }

    // ==========================================
    // 仿真与优化
    // ==========================================

    pub fn simulate(&self) -> SimulationReport {
        self.simulator
            .simulate_with_report(&self.store, &self.rules, &self.weights)
    }

    pub fn optimize(&self, objective: &str) -> OptimizationResult {
        self.optimizer.optimize(&self.store, objective)
    }

    // ==========================================
    // 导出
    // ==========================================

    pub fn export_config(&self) -> ConfigExport {
        ConfigExport::new(self.rules.clone(), self.weights.clone(), self.summary())
    }

    pub fn export_config_json(&self) -> ApiResult<String> {
        Ok(self.export_config().to_json_pretty()?)
    }

    /// 清洗后的实体仓 JSON
    pub fn export_store_json(&self) -> ApiResult<String> {
        Ok(serde_json::to_string_pretty(&self.store)?)
    }
}
