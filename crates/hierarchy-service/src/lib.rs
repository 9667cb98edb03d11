//! 空间层级服务
//!
//! 管理 Campus → Facultad → Bloque → Ambiente 四级物理层级的级联完整性。
//!
//! ## 核心功能
//!
//! - **停用级联**：节点由启用变为停用时，自上而下停用全部后代
//! - **删除级联**：自下而上物理删除整棵子树，满足外键约束
//! - **事务执行器**：单连接、单事务，失败整体回滚并返回原始错误
//! - **用例服务**：存在性检查与状态迁移检测，决定何时触发级联
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `repository`: 数据库仓储层（PostgreSQL 与内存实现）
//! - `transaction`: 事务执行器
//! - `cascade`: 级联完整性引擎
//! - `service`: 业务服务层
//! - `cli`: 运维命令行

pub mod cascade;
pub mod cli;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;
pub mod transaction;

pub use cascade::{CascadeEngine, CascadeOperation, CascadeRelationships, CascadeSummary};
pub use error::{HierarchyError, Result};
pub use models::*;
pub use repository::{
    HierarchyTransaction, MemoryStore, NodeRepository, NodeRepositoryTrait, PgTransactionProvider,
    TransactionProvider,
};
pub use service::HierarchyService;
pub use transaction::run_in_transaction;
