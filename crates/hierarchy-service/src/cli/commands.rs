//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。

use clap::{Parser, Subcommand, ValueEnum};

use crate::models::NodeKind;

/// 空间层级运维工具
///
/// 对层级节点执行停用与删除级联，或应用数据库迁移。
#[derive(Parser, Debug)]
#[command(name = "espacios-cascade")]
#[command(version, about = "空间层级级联运维工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 停用节点并级联停用其全部后代
    Deactivate {
        /// 节点类型
        #[arg(value_enum)]
        kind: DeactivateTarget,

        /// 节点 ID
        id: i64,
    },

    /// 删除节点及其整棵子树
    Delete {
        /// 节点类型
        #[arg(value_enum)]
        kind: DeleteTarget,

        /// 节点 ID
        id: i64,
    },

    /// 应用数据库迁移
    Migrate,
}

/// 可作为停用级联根的节点类型
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeactivateTarget {
    Campus,
    Facultad,
    Bloque,
}

impl From<DeactivateTarget> for NodeKind {
    fn from(target: DeactivateTarget) -> Self {
        match target {
            DeactivateTarget::Campus => NodeKind::Campus,
            DeactivateTarget::Facultad => NodeKind::Facultad,
            DeactivateTarget::Bloque => NodeKind::Bloque,
        }
    }
}

/// 可作为删除级联根的节点类型
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    Campus,
    Facultad,
    Bloque,
    TipoBloque,
}

impl From<DeleteTarget> for NodeKind {
    fn from(target: DeleteTarget) -> Self {
        match target {
            DeleteTarget::Campus => NodeKind::Campus,
            DeleteTarget::Facultad => NodeKind::Facultad,
            DeleteTarget::Bloque => NodeKind::Bloque,
            DeleteTarget::TipoBloque => NodeKind::TipoBloque,
        }
    }
}
