//! 层级服务错误类型
//!
//! 定义服务层的业务错误和系统错误。级联引擎不翻译存储错误，原样向上传播。

use thiserror::Error;

use crate::models::NodeKind;

/// 层级服务错误类型
#[derive(Debug, Error)]
pub enum HierarchyError {
    #[error("节点不存在: {kind} id={id}")]
    NodeNotFound { kind: NodeKind, id: i64 },

    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 层级服务 Result 类型别名
pub type Result<T> = std::result::Result<T, HierarchyError>;

impl HierarchyError {
    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    /// 获取错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NodeNotFound { .. } => "NODE_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = HierarchyError::NodeNotFound {
            kind: NodeKind::Bloque,
            id: 5,
        };
        assert_eq!(err.error_code(), "NODE_NOT_FOUND");
        assert!(err.to_string().contains("bloque"));
        assert!(err.to_string().contains('5'));
    }

    #[test]
    fn test_error_is_retryable() {
        assert!(HierarchyError::Database(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(!HierarchyError::Validation("id".to_string()).is_retryable());
    }
}
