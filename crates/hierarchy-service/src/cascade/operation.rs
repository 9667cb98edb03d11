//! 级联操作定义

use crate::models::{NodeKind, Relation};

/// 级联操作
///
/// 每个操作由根节点类型和自根向下的归属边路径决定。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeOperation {
    MarkCampusInactive,
    MarkFacultadInactive,
    MarkBloqueInactive,
    DeleteCampus,
    DeleteFacultad,
    DeleteBloque,
    DeleteTipoBloque,
}

const CAMPUS_PATH: &[Relation] = &[
    Relation::CampusFacultades,
    Relation::FacultadBloques,
    Relation::BloqueAmbientes,
];
const FACULTAD_PATH: &[Relation] = &[Relation::FacultadBloques, Relation::BloqueAmbientes];
const BLOQUE_PATH: &[Relation] = &[Relation::BloqueAmbientes];
const TIPO_BLOQUE_PATH: &[Relation] = &[Relation::TipoBloqueBloques, Relation::BloqueAmbientes];

impl CascadeOperation {
    /// 根节点类型
    pub fn root(self) -> NodeKind {
        match self {
            Self::MarkCampusInactive | Self::DeleteCampus => NodeKind::Campus,
            Self::MarkFacultadInactive | Self::DeleteFacultad => NodeKind::Facultad,
            Self::MarkBloqueInactive | Self::DeleteBloque => NodeKind::Bloque,
            Self::DeleteTipoBloque => NodeKind::TipoBloque,
        }
    }

    /// 自根向下的归属边，顺序即停用顺序
    pub fn path(self) -> &'static [Relation] {
        match self.root() {
            NodeKind::Campus => CAMPUS_PATH,
            NodeKind::Facultad => FACULTAD_PATH,
            NodeKind::Bloque => BLOQUE_PATH,
            NodeKind::TipoBloque => TIPO_BLOQUE_PATH,
            NodeKind::Ambiente => &[],
        }
    }

    pub fn is_deletion(self) -> bool {
        matches!(
            self,
            Self::DeleteCampus | Self::DeleteFacultad | Self::DeleteBloque | Self::DeleteTipoBloque
        )
    }

    /// 用于日志和指标标签
    pub fn name(self) -> &'static str {
        match self {
            Self::MarkCampusInactive => "mark_campus_inactive",
            Self::MarkFacultadInactive => "mark_facultad_inactive",
            Self::MarkBloqueInactive => "mark_bloque_inactive",
            Self::DeleteCampus => "delete_campus",
            Self::DeleteFacultad => "delete_facultad",
            Self::DeleteBloque => "delete_bloque",
            Self::DeleteTipoBloque => "delete_tipo_bloque",
        }
    }
}

/// 一次级联的影响统计
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeSummary {
    pub operation: CascadeOperation,
    pub root_id: i64,
    /// 按执行顺序记录每张表影响的行数
    pub affected: Vec<(NodeKind, u64)>,
}

impl CascadeSummary {
    pub fn new(operation: CascadeOperation, root_id: i64) -> Self {
        Self {
            operation,
            root_id,
            affected: Vec::new(),
        }
    }

    pub fn record(&mut self, kind: NodeKind, rows: u64) {
        self.affected.push((kind, rows));
    }

    pub fn rows_for(&self, kind: NodeKind) -> u64 {
        self.affected
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, rows)| rows)
            .sum()
    }

    pub fn total_rows(&self) -> u64 {
        self.affected.iter().map(|(_, rows)| rows).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_start_at_root() {
        for op in [
            CascadeOperation::MarkCampusInactive,
            CascadeOperation::MarkFacultadInactive,
            CascadeOperation::MarkBloqueInactive,
            CascadeOperation::DeleteCampus,
            CascadeOperation::DeleteFacultad,
            CascadeOperation::DeleteBloque,
            CascadeOperation::DeleteTipoBloque,
        ] {
            let path = op.path();
            assert_eq!(path[0].parent(), op.root(), "{}", op.name());
            for pair in path.windows(2) {
                assert_eq!(pair[0].child(), pair[1].parent());
            }
            assert_eq!(path.last().unwrap().child(), NodeKind::Ambiente);
        }
    }

    #[test]
    fn test_summary_totals() {
        let mut summary = CascadeSummary::new(CascadeOperation::DeleteCampus, 42);
        summary.record(NodeKind::Ambiente, 2);
        summary.record(NodeKind::Bloque, 2);
        summary.record(NodeKind::Campus, 1);

        assert_eq!(summary.rows_for(NodeKind::Bloque), 2);
        assert_eq!(summary.rows_for(NodeKind::Facultad), 0);
        assert_eq!(summary.total_rows(), 5);
    }
}
