//! 级联关系能力接口
//!
//! 用例层只通过该接口触发级联：更新使 `activo` 由 true 变为 false 时调用停用级联，
//! 删除用例在确认存在后调用删除级联。

use async_trait::async_trait;

use crate::error::Result;

/// 级联关系接口
///
/// 所有方法都不校验根节点是否存在：不存在的 id 是安全的空操作，事务照常提交。
/// 失败时事务已回滚，原始错误原样返回。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CascadeRelationships: Send + Sync {
    /// 停用 Campus 下的全部 Facultad、Bloque、Ambiente
    async fn mark_campus_cascade_inactive(&self, campus_id: i64) -> Result<()>;

    /// 停用 Facultad 下的全部 Bloque、Ambiente
    async fn mark_facultad_cascade_inactive(&self, facultad_id: i64) -> Result<()>;

    /// 停用 Bloque 下的全部 Ambiente
    async fn mark_bloques_cascade_inactive(&self, bloque_id: i64) -> Result<()>;

    /// 删除 Campus 及其整棵子树
    async fn delete_campus_cascade(&self, campus_id: i64) -> Result<()>;

    async fn delete_facultad_cascade(&self, facultad_id: i64) -> Result<()>;

    async fn delete_bloque_cascade(&self, bloque_id: i64) -> Result<()>;

    /// 删除 TipoBloque 及归属于它的全部 Bloque、Ambiente
    async fn delete_tipo_bloque_cascade(&self, tipo_bloque_id: i64) -> Result<()>;
}
