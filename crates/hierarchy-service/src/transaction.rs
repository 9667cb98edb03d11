//! 事务执行器
//!
//! 借出连接 → 开启事务 → 执行工作单元 → 成功提交 / 失败回滚并返回原始错误。
//! 所有级联操作共用这一个入口，任何多层写入都不可能部分提交。
//!
//! 连接归还由事务句柄的 `Drop` 保证：提交、回滚、回滚失败乃至工作单元 panic，
//! 句柄都会在离开作用域时恰好归还一次连接。

use futures::future::BoxFuture;
use tracing::{error, warn};

use crate::error::Result;
use crate::repository::{HierarchyTransaction, TransactionProvider};

/// 在单个事务中执行工作单元
///
/// 工作单元返回错误时先回滚再原样返回该错误；回滚自身失败只记录日志，
/// 调用方看到的始终是工作单元的原始错误。
pub async fn run_in_transaction<P, T, F>(provider: &P, work: F) -> Result<T>
where
    P: TransactionProvider + ?Sized,
    T: Send,
    F: for<'t> FnOnce(&'t mut P::Tx) -> BoxFuture<'t, Result<T>> + Send,
{
    let mut tx = provider.begin().await?;

    match work(&mut tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            warn!(error = %err, "Unit of work failed, rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                error!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
