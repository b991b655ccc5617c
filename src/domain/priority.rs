// ==========================================
// 资源分配工作台 - 优先级权重模型
// ==========================================
// 职责: 8 个固定评价维度的权重 (0-100) + 用户排序 + 预设
// 红线: criteriaOrder 必须是 8 个维度的完整排列（违反即调用方错误）
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::{DomainError, DomainResult};

/// 自定义权重时的预设名称
pub const CUSTOM_PRESET: &str = "custom";

// ==========================================
// Criterion - 评价维度
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Criterion {
    PriorityLevel,     // 请求方客户优先级
    TaskFulfillment,   // 请求覆盖度
    Fairness,          // 稀缺任务优先
    WorkloadBalance,   // 时长与产能匹配
    SkillMatch,        // 技能专精度
    PhaseFit,          // 阶段契合度
    CostEfficiency,    // 短时长优先
    DeadlineAdherence, // 早阶段优先
}

impl Criterion {
    pub const ALL: [Criterion; 8] = [
        Criterion::PriorityLevel,
        Criterion::TaskFulfillment,
        Criterion::Fairness,
        Criterion::WorkloadBalance,
        Criterion::SkillMatch,
        Criterion::PhaseFit,
        Criterion::CostEfficiency,
        Criterion::DeadlineAdherence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::PriorityLevel => "priorityLevel",
            Criterion::TaskFulfillment => "taskFulfillment",
            Criterion::Fairness => "fairness",
            Criterion::WorkloadBalance => "workloadBalance",
            Criterion::SkillMatch => "skillMatch",
            Criterion::PhaseFit => "phaseFit",
            Criterion::CostEfficiency => "costEfficiency",
            Criterion::DeadlineAdherence => "deadlineAdherence",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Preset - 权重预设
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Preset {
    Balanced,
    MaximizeFulfillment,
    FairDistribution,
    MinimizeWorkload,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Balanced,
        Preset::MaximizeFulfillment,
        Preset::FairDistribution,
        Preset::MinimizeWorkload,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Balanced => "balanced",
            Preset::MaximizeFulfillment => "maximizeFulfillment",
            Preset::FairDistribution => "fairDistribution",
            Preset::MinimizeWorkload => "minimizeWorkload",
        }
    }

    pub fn title_cn(&self) -> &'static str {
        match self {
            Preset::Balanced => "均衡分配",
            Preset::MaximizeFulfillment => "最大化满足",
            Preset::FairDistribution => "公平分配",
            Preset::MinimizeWorkload => "最小化负载",
        }
    }

    /// 预设权重（顺序同 Criterion::ALL）
    fn weights(&self) -> [u8; 8] {
        match self {
            Preset::Balanced => [50, 50, 50, 50, 50, 50, 50, 50],
            Preset::MaximizeFulfillment => [80, 100, 40, 50, 70, 60, 30, 60],
            Preset::FairDistribution => [50, 60, 100, 90, 50, 50, 40, 50],
            Preset::MinimizeWorkload => [40, 50, 60, 100, 60, 70, 90, 40],
        }
    }
}

impl FromStr for Preset {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "balanced" => Ok(Preset::Balanced),
            "maximizeFulfillment" | "maximize_fulfillment" => Ok(Preset::MaximizeFulfillment),
            "fairDistribution" | "fair_distribution" => Ok(Preset::FairDistribution),
            "minimizeWorkload" | "minimize_workload" => Ok(Preset::MinimizeWorkload),
            other => Err(DomainError::UnknownPreset(other.to_string())),
        }
    }
}

// ==========================================
// PriorityWeights - 权重向量
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPriorityWeights")]
pub struct PriorityWeights {
    weights: BTreeMap<Criterion, u8>,
    criteria_order: Vec<Criterion>,
    active_preset: String,
}

/// 反序列化中间结构（经 TryFrom 校验不变量）
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPriorityWeights {
    weights: BTreeMap<Criterion, u32>,
    criteria_order: Vec<Criterion>,
    #[serde(default)]
    active_preset: Option<String>,
}

impl TryFrom<RawPriorityWeights> for PriorityWeights {
    type Error = DomainError;

    fn try_from(raw: RawPriorityWeights) -> Result<Self, Self::Error> {
        let mut weights = PriorityWeights::default();
        for (criterion, weight) in raw.weights {
            weights.put_weight(criterion, weight)?;
        }
        validate_order(&raw.criteria_order)?;
        weights.criteria_order = raw.criteria_order;
        weights.active_preset = raw
            .active_preset
            .unwrap_or_else(|| CUSTOM_PRESET.to_string());
        Ok(weights)
    }
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl PriorityWeights {
    /// 由预设构造
    ///
    /// criteriaOrder 按权重降序（同权重按维度声明顺序）
    pub fn from_preset(preset: Preset) -> Self {
        let weights: BTreeMap<Criterion, u8> = Criterion::ALL
            .iter()
            .copied()
            .zip(preset.weights())
            .collect();

        let mut criteria_order = Criterion::ALL.to_vec();
        criteria_order.sort_by(|a, b| weights[b].cmp(&weights[a]).then_with(|| a.cmp(b)));

        Self {
            weights,
            criteria_order,
            active_preset: preset.as_str().to_string(),
        }
    }

    /// 按预设名称构造
    pub fn from_preset_name(name: &str) -> DomainResult<Self> {
        Ok(Self::from_preset(name.parse::<Preset>()?))
    }

    pub fn weight(&self, criterion: Criterion) -> u8 {
        self.weights.get(&criterion).copied().unwrap_or(0)
    }

    pub fn weights(&self) -> &BTreeMap<Criterion, u8> {
        &self.weights
    }

    pub fn criteria_order(&self) -> &[Criterion] {
        &self.criteria_order
    }

    pub fn active_preset(&self) -> &str {
        &self.active_preset
    }

    /// 权重总和
    pub fn total(&self) -> u32 {
        self.weights.values().map(|w| *w as u32).sum()
    }

    /// 设置单个维度权重（切换为 custom）
    pub fn set_weight(&mut self, criterion: Criterion, weight: u32) -> DomainResult<()> {
        self.put_weight(criterion, weight)?;
        self.active_preset = CUSTOM_PRESET.to_string();
        Ok(())
    }

    /// 设置用户排序（不改变权重）
    pub fn set_criteria_order(&mut self, order: Vec<Criterion>) -> DomainResult<()> {
        validate_order(&order)?;
        self.criteria_order = order;
        self.active_preset = CUSTOM_PRESET.to_string();
        Ok(())
    }

    /// 按排名推导权重: 第 1 名 100，其后每名递减 10
    pub fn set_order_by_rank(&mut self, order: Vec<Criterion>) -> DomainResult<()> {
        validate_order(&order)?;
        for (rank, criterion) in order.iter().enumerate() {
            let weight = 100u32.saturating_sub(rank as u32 * 10);
            self.weights.insert(*criterion, weight as u8);
        }
        self.criteria_order = order;
        self.active_preset = CUSTOM_PRESET.to_string();
        Ok(())
    }

    fn put_weight(&mut self, criterion: Criterion, weight: u32) -> DomainResult<()> {
        if weight > 100 {
            return Err(DomainError::WeightOutOfRange {
                criterion: criterion.to_string(),
                weight,
            });
        }
        self.weights.insert(criterion, weight as u8);
        Ok(())
    }
}

/// 校验排列: 8 个维度各出现一次
fn validate_order(order: &[Criterion]) -> DomainResult<()> {
    let unique: HashSet<&Criterion> = order.iter().collect();
    if order.len() != Criterion::ALL.len() || unique.len() != Criterion::ALL.len() {
        let listed: Vec<&str> = order.iter().map(Criterion::as_str).collect();
        return Err(DomainError::InvalidCriteriaOrder(format!(
            "收到 {} 项（去重后 {} 项）: [{}]",
            order.len(),
            unique.len(),
            listed.join(", ")
        )));
    }
    Ok(())
}
