/// Pipeland: a side-scrolling platformer simulation core.
///
/// `domain` holds the pure rules (tiles, bodies, collision, behaviour,
/// combat, particles). `sim` owns the world state and advances it one tick
/// at a time. The terminal front-end lives in the binary.

pub mod config;
pub mod domain;
pub mod sim;
