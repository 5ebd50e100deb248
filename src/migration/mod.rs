//! UX1 to UX2 migration: transform, push in dependency order, roll back

pub mod builders;
pub mod merge;
pub mod pusher;
pub mod resolver;
pub mod rollback;
pub mod transform;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use pusher::{Cancelled, PushAborted, UX2ConfigPusher};
pub use rollback::UX2ConfigReverter;
pub use transform::transform;
pub use workflow::{
    collect_ux1_config, log_progress, push_ux2_config, rollback_ux2_config, transform_ux1_config,
};
