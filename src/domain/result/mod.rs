//! Result Context - 合成结果限界上下文
//!
//! 职责:
//! - 结果槽位编号与目录命名
//! - 产物角色与公开路径

mod value_objects;

pub use value_objects::{
    content_type_for, ArtifactRole, ResultSlot, StoredArtifacts, RESULTS_URL_PREFIX,
    SLOT_DIR_PREFIX,
};
