//! 级联完整性模块
//!
//! 当层级中的节点被停用或删除时保持整棵子树一致：
//!
//! - **停用级联**：自上而下逐层将后代标记为 `activo = false`，根节点自身由调用方更新
//! - **删除级联**：自下而上逐层物理删除后代，最后删除根节点
//!
//! 每层只发出一条批量语句，所有层在同一个事务内完成。
//!
//! ## 模块结构
//!
//! - `relationships`: 暴露给用例层的能力接口
//! - `operation`: 级联操作及其遍历路径
//! - `deactivation`: 停用遍历
//! - `deletion`: 删除遍历
//! - `engine`: 事务边界、日志与指标

mod deactivation;
mod deletion;
mod engine;
mod operation;
mod relationships;

pub use deactivation::deactivate_descendants;
pub use deletion::delete_subtree;
pub use engine::CascadeEngine;
pub use operation::{CascadeOperation, CascadeSummary};
pub use relationships::CascadeRelationships;

#[cfg(test)]
pub use relationships::MockCascadeRelationships;
