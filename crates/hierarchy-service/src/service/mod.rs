//! 业务服务层
//!
//! 用例决定何时触发级联，遍历本身由级联引擎完成。

mod hierarchy_service;

pub use hierarchy_service::HierarchyService;
