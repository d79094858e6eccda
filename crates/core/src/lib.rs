#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod level;
pub mod model;
pub mod time;

pub use error::Error;
pub use level::{XP_PER_LEVEL, level_for_xp};
pub use model::{ProgressRecord, is_module_locked};
pub use time::Clock;
