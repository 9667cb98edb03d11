//! 数据库仓储层
//!
//! 提供层级节点的数据访问接口，封装 SQL 操作细节。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含级联逻辑
//! - 使用 SQLx 进行参数化批量操作（`WHERE parent_id = ANY($1)`）
//! - 事务边界由级联引擎通过 `TransactionProvider` 决定
//! - 定义 trait 接口以支持 mock 与内存实现测试

pub mod memory;
mod node_repo;
mod pg_transaction;
mod traits;

pub use memory::{MemoryNode, MemoryStore, Statement};
pub use node_repo::NodeRepository;
pub use pg_transaction::{PgHierarchyTransaction, PgTransactionProvider};
pub use traits::*;
