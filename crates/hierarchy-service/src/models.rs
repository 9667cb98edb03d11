//! 空间层级领域模型
//!
//! Campus → Facultad → Bloque → Ambiente 四级层级，外加 TipoBloque 目录。
//! 每个非根节点通过一个外键引用唯一的父节点。

use std::fmt;
use std::str::FromStr;

use crate::error::HierarchyError;

/// 层级节点类型
///
/// 每种类型对应一张表，表名来自该封闭枚举，可安全拼接进 SQL。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKind {
    Campus,
    Facultad,
    Bloque,
    Ambiente,
    /// 楼栋类型目录，Bloque 通过 `tipo_bloque_id` 归属于它
    TipoBloque,
}

impl NodeKind {
    /// 对应的数据库表名
    pub fn table(self) -> &'static str {
        match self {
            Self::Campus => "campus",
            Self::Facultad => "facultades",
            Self::Bloque => "bloques",
            Self::Ambiente => "ambientes",
            Self::TipoBloque => "tipos_bloque",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Campus => "campus",
            Self::Facultad => "facultad",
            Self::Bloque => "bloque",
            Self::Ambiente => "ambiente",
            Self::TipoBloque => "tipo_bloque",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = HierarchyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "campus" => Ok(Self::Campus),
            "facultad" => Ok(Self::Facultad),
            "bloque" => Ok(Self::Bloque),
            "ambiente" => Ok(Self::Ambiente),
            "tipo_bloque" => Ok(Self::TipoBloque),
            other => Err(HierarchyError::Validation(format!(
                "未知的节点类型: {}",
                other
            ))),
        }
    }
}

/// 父子归属边
///
/// 描述子表通过哪一列引用父表。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// facultades.campus_id -> campus.id
    CampusFacultades,
    /// bloques.facultad_id -> facultades.id
    FacultadBloques,
    /// ambientes.bloque_id -> bloques.id
    BloqueAmbientes,
    /// bloques.tipo_bloque_id -> tipos_bloque.id
    TipoBloqueBloques,
}

impl Relation {
    pub fn parent(self) -> NodeKind {
        match self {
            Self::CampusFacultades => NodeKind::Campus,
            Self::FacultadBloques => NodeKind::Facultad,
            Self::BloqueAmbientes => NodeKind::Bloque,
            Self::TipoBloqueBloques => NodeKind::TipoBloque,
        }
    }

    pub fn child(self) -> NodeKind {
        match self {
            Self::CampusFacultades => NodeKind::Facultad,
            Self::FacultadBloques | Self::TipoBloqueBloques => NodeKind::Bloque,
            Self::BloqueAmbientes => NodeKind::Ambiente,
        }
    }

    /// 子表中引用父节点的外键列
    pub fn foreign_key(self) -> &'static str {
        match self {
            Self::CampusFacultades => "campus_id",
            Self::FacultadBloques => "facultad_id",
            Self::BloqueAmbientes => "bloque_id",
            Self::TipoBloqueBloques => "tipo_bloque_id",
        }
    }
}

/// 收集子节点 id 时的行锁模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowLock {
    #[default]
    None,
    /// `SELECT ... FOR UPDATE`
    ForUpdate,
}

/// 节点状态行
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct NodeRow {
    pub id: i64,
    pub activo: bool,
}

/// 一次 `activo` 更新的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivoChange {
    pub kind: NodeKind,
    pub id: i64,
    pub previous: bool,
    pub current: bool,
    /// 是否触发了向下的停用级联
    pub cascaded: bool,
}

impl ActivoChange {
    /// 是否为 true -> false 的状态迁移
    pub fn is_deactivation(&self) -> bool {
        self.previous && !self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_edges() {
        assert_eq!(Relation::CampusFacultades.child(), NodeKind::Facultad);
        assert_eq!(Relation::FacultadBloques.parent(), NodeKind::Facultad);
        assert_eq!(Relation::TipoBloqueBloques.child(), NodeKind::Bloque);
        assert_eq!(Relation::BloqueAmbientes.foreign_key(), "bloque_id");
    }

    #[test]
    fn test_node_kind_parse() {
        assert_eq!("Campus".parse::<NodeKind>().unwrap(), NodeKind::Campus);
        assert_eq!("tipo-bloque".parse::<NodeKind>().unwrap(), NodeKind::TipoBloque);
        assert!("aula".parse::<NodeKind>().is_err());
    }

    #[test]
    fn test_activo_change_transition() {
        let change = ActivoChange {
            kind: NodeKind::Campus,
            id: 1,
            previous: true,
            current: false,
            cascaded: true,
        };
        assert!(change.is_deactivation());

        let reactivation = ActivoChange {
            previous: false,
            current: true,
            cascaded: false,
            ..change
        };
        assert!(!reactivation.is_deactivation());
    }
}
