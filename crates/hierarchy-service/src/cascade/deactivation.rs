//! 停用遍历
//!
//! 自上而下：每层先按上一层的 id 集合查询子节点 id，再用一条批量 UPDATE 标记
//! `activo = false`。任一层为空即停止，后续层不可能有节点。根节点不在此处更新。

use tracing::debug;

use super::operation::{CascadeOperation, CascadeSummary};
use crate::error::Result;
use crate::models::RowLock;
use crate::repository::HierarchyTransaction;

/// 停用根节点的全部后代
pub async fn deactivate_descendants<T: HierarchyTransaction>(
    tx: &mut T,
    operation: CascadeOperation,
    root_id: i64,
    lock: RowLock,
) -> Result<CascadeSummary> {
    let mut summary = CascadeSummary::new(operation, root_id);
    let mut parent_ids = vec![root_id];

    for relation in operation.path() {
        let child_ids = tx.select_child_ids(*relation, &parent_ids, lock).await?;
        if child_ids.is_empty() {
            debug!(?relation, "No descendants at this level, stopping");
            break;
        }

        let kind = relation.child();
        let rows = tx.deactivate_ids(kind, &child_ids).await?;
        debug!(table = kind.table(), rows, "Level deactivated");
        summary.record(kind, rows);

        parent_ids = child_ids;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NodeKind, Relation};
    use crate::repository::{MemoryNode, MemoryStore, Statement, TransactionProvider};

    #[tokio::test]
    async fn test_facultad_root_enters_one_level_lower() {
        let store = MemoryStore::new();
        store.insert(MemoryNode::campus(1));
        store.insert(MemoryNode::facultad(10, 1));
        store.insert(MemoryNode::bloque(100, 10));
        store.insert(MemoryNode::ambiente(1000, 100));

        let mut tx = store.begin().await.unwrap();
        let summary = deactivate_descendants(
            &mut tx,
            CascadeOperation::MarkFacultadInactive,
            10,
            RowLock::None,
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(
            store.statements(),
            vec![
                Statement::SelectChildIds {
                    relation: Relation::FacultadBloques,
                    parent_ids: vec![10],
                    lock: RowLock::None,
                },
                Statement::Deactivate {
                    kind: NodeKind::Bloque,
                    ids: vec![100],
                },
                Statement::SelectChildIds {
                    relation: Relation::BloqueAmbientes,
                    parent_ids: vec![100],
                    lock: RowLock::None,
                },
                Statement::Deactivate {
                    kind: NodeKind::Ambiente,
                    ids: vec![1000],
                },
            ]
        );
        assert_eq!(summary.total_rows(), 2);
        // 根节点由调用方负责
        assert!(store.get(NodeKind::Facultad, 10).unwrap().activo);
    }

    #[tokio::test]
    async fn test_empty_intermediate_level_stops_walk() {
        let store = MemoryStore::new();
        store.insert(MemoryNode::campus(1));
        store.insert(MemoryNode::facultad(10, 1));

        let mut tx = store.begin().await.unwrap();
        deactivate_descendants(&mut tx, CascadeOperation::MarkCampusInactive, 1, RowLock::None)
            .await
            .unwrap();

        // 查 Facultad、停用 Facultad、查 Bloque（空）
        assert_eq!(store.statements().len(), 3);
        assert!(matches!(
            store.statements().last(),
            Some(Statement::SelectChildIds {
                relation: Relation::FacultadBloques,
                ..
            })
        ));
    }
}
