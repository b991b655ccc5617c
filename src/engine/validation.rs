// ==========================================
// 资源分配工作台 - 校验引擎
// ==========================================
// 红线: 校验永不失败；畸形数据变成 Finding，不是运行时错误
// 红线: 七项检查相互独立，固定顺序全量执行
// ==========================================
// 职责: 结构 / 唯一性 / 数值范围 / JSON / 引用 / 技能覆盖 / 启发式洞察
// 输入: EntityStore 快照
// 输出: 扁平的 Finding 列表
// ==========================================

mod checks;
mod insights;


pub use checks::{entity_label, ValidationEngine};
