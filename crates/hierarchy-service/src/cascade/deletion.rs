//! 删除遍历
//!
//! 先自上而下收集每层的 id 集合，再自下而上删除，外键约束要求子行先于父行消失：
//!
//! 1. 沿路径逐层查询子节点 id，任一层为空则不再向下
//! 2. 路径末端（Ambiente）直接按父 id 集合删除，不需要先查询
//! 3. 倒序按 id 集合删除已收集的各层
//! 4. 最后一条语句总是删除根节点

use tracing::debug;

use super::operation::{CascadeOperation, CascadeSummary};
use crate::error::Result;
use crate::models::{NodeKind, RowLock};
use crate::repository::HierarchyTransaction;

/// 删除根节点及其整棵子树
pub async fn delete_subtree<T: HierarchyTransaction>(
    tx: &mut T,
    operation: CascadeOperation,
    root_id: i64,
    lock: RowLock,
) -> Result<CascadeSummary> {
    let mut summary = CascadeSummary::new(operation, root_id);
    let path = operation.path();

    // 除末端外的每一层：(类型, id 集合)
    let mut levels: Vec<(NodeKind, Vec<i64>)> = Vec::with_capacity(path.len());
    let mut parent_ids = vec![root_id];
    let mut reached_leaf = true;

    if let Some((_, inner)) = path.split_last() {
        for relation in inner {
            let child_ids = tx.select_child_ids(*relation, &parent_ids, lock).await?;
            if child_ids.is_empty() {
                debug!(?relation, "No descendants at this level");
                reached_leaf = false;
                break;
            }
            levels.push((relation.child(), child_ids.clone()));
            parent_ids = child_ids;
        }
    }

    if reached_leaf {
        if let Some(leaf) = path.last() {
            let rows = tx.delete_children(*leaf, &parent_ids).await?;
            debug!(table = leaf.child().table(), rows, "Leaf level deleted");
            summary.record(leaf.child(), rows);
        }
    }

    for (kind, ids) in levels.iter().rev() {
        let rows = tx.delete_ids(*kind, ids).await?;
        debug!(table = kind.table(), rows, "Level deleted");
        summary.record(*kind, rows);
    }

    let root = operation.root();
    let rows = tx.delete_ids(root, &[root_id]).await?;
    debug!(table = root.table(), rows, "Root deleted");
    summary.record(root, rows);

    Ok(summary)
}
