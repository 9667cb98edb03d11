//! 层级用例服务
//!
//! 处理节点状态更新与删除：
//! - 存在性检查（不存在时返回 NodeNotFound）
//! - 更新根节点自身的 `activo`
//! - `activo` 由 true 变为 false 时触发停用级联；重新启用不做任何级联
//! - 删除前确认存在，再交给删除级联
//!
//! 根节点的更新与级联不在同一事务中：级联失败时根节点保持已更新状态，
//! 错误返回给调用方。此时 `set_activo` 看不到状态迁移，不会再次级联；
//! `deactivate` 对已停用的根节点会重新执行停用级联，用于修复这种半完成状态。
//! 停用遍历是幂等的，重复执行不会产生额外影响。

use std::sync::Arc;

use tracing::{info, instrument};

use crate::cascade::CascadeRelationships;
use crate::error::{HierarchyError, Result};
use crate::models::{ActivoChange, NodeKind, NodeRow};
use crate::repository::NodeRepositoryTrait;

/// 层级用例服务
pub struct HierarchyService<R, C>
where
    R: NodeRepositoryTrait,
    C: CascadeRelationships,
{
    node_repo: Arc<R>,
    relationships: Arc<C>,
}

impl<R, C> HierarchyService<R, C>
where
    R: NodeRepositoryTrait,
    C: CascadeRelationships,
{
    pub fn new(node_repo: Arc<R>, relationships: Arc<C>) -> Self {
        Self {
            node_repo,
            relationships,
        }
    }

    /// 更新节点的 `activo` 状态，仅在 true -> false 迁移时级联
    #[instrument(skip(self))]
    pub async fn set_activo(&self, kind: NodeKind, id: i64, activo: bool) -> Result<ActivoChange> {
        self.update_activo(kind, id, activo, false).await
    }

    /// 停用节点及其后代
    ///
    /// 根节点已停用时仍会重新执行级联，使上一次失败的级联得以补齐。
    #[instrument(skip(self))]
    pub async fn deactivate(&self, kind: NodeKind, id: i64) -> Result<ActivoChange> {
        self.update_activo(kind, id, false, true).await
    }

    /// 删除节点及其整棵子树
    #[instrument(skip(self))]
    pub async fn delete(&self, kind: NodeKind, id: i64) -> Result<()> {
        self.require_node(kind, id).await?;

        match kind {
            NodeKind::Campus => self.relationships.delete_campus_cascade(id).await?,
            NodeKind::Facultad => self.relationships.delete_facultad_cascade(id).await?,
            NodeKind::Bloque => self.relationships.delete_bloque_cascade(id).await?,
            NodeKind::TipoBloque => self.relationships.delete_tipo_bloque_cascade(id).await?,
            NodeKind::Ambiente => {
                // 叶子节点没有后代
                self.node_repo.delete_node(kind, id).await?;
            }
        }

        info!(kind = %kind, id, "节点已删除");
        Ok(())
    }

    // ==================== 私有方法 ====================

    async fn update_activo(
        &self,
        kind: NodeKind,
        id: i64,
        activo: bool,
        repair: bool,
    ) -> Result<ActivoChange> {
        let current = self.require_node(kind, id).await?;

        if current.activo != activo {
            self.node_repo.set_activo(kind, id, activo).await?;
        }

        let mut change = ActivoChange {
            kind,
            id,
            previous: current.activo,
            current: activo,
            cascaded: false,
        };

        if change.is_deactivation() || (repair && !activo) {
            change.cascaded = self.cascade_deactivation(kind, id).await?;
        }

        info!(
            kind = %kind,
            id,
            previous = change.previous,
            current = change.current,
            cascaded = change.cascaded,
            "节点状态已更新"
        );

        Ok(change)
    }

    async fn require_node(&self, kind: NodeKind, id: i64) -> Result<NodeRow> {
        self.node_repo
            .get_node(kind, id)
            .await?
            .ok_or(HierarchyError::NodeNotFound { kind, id })
    }

    /// 返回是否实际触发了级联
    async fn cascade_deactivation(&self, kind: NodeKind, id: i64) -> Result<bool> {
        match kind {
            NodeKind::Campus => self.relationships.mark_campus_cascade_inactive(id).await?,
            NodeKind::Facultad => self.relationships.mark_facultad_cascade_inactive(id).await?,
            NodeKind::Bloque => self.relationships.mark_bloques_cascade_inactive(id).await?,
            NodeKind::Ambiente | NodeKind::TipoBloque => return Ok(false),
        }
        Ok(true)
    }
}
