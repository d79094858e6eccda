//! Level arithmetic.
//!
//! This is the only place levels are derived from experience. Everything that
//! displays or stores a level goes through [`level_for_xp`].

/// Experience needed to advance one level.
pub const XP_PER_LEVEL: u64 = 500;

/// Experience granted for a correct quiz answer.
pub const QUIZ_ANSWER_XP: u64 = 10;

/// Returns the level reached with `xp` total experience.
///
/// `level_for_xp(0) == 1`, and the result never decreases as `xp` grows.
#[must_use]
pub fn level_for_xp(xp: u64) -> u32 {
    let steps = xp / XP_PER_LEVEL;
    u32::try_from(steps).map_or(u32::MAX, |steps| steps.saturating_add(1))
}

/// Returns the total experience at which `level` is reached.
///
/// Levels below 1 are treated as level 1.
#[must_use]
pub fn xp_for_level(level: u32) -> u64 {
    u64::from(level.max(1) - 1).saturating_mul(XP_PER_LEVEL)
}

/// Experience earned since the start of the current level.
#[must_use]
pub fn xp_into_level(xp: u64) -> u64 {
    xp % XP_PER_LEVEL
}

/// Experience still missing to reach the next level.
#[must_use]
pub fn xp_to_next_level(xp: u64) -> u64 {
    XP_PER_LEVEL - xp_into_level(xp)
}

/// Progress through the current level as an integer percentage in `0..100`.
#[must_use]
pub fn level_progress_percent(xp: u64) -> u8 {
    // xp_into_level < XP_PER_LEVEL, so the quotient is always < 100.
    u8::try_from(xp_into_level(xp) * 100 / XP_PER_LEVEL).unwrap_or(99)
}
