pub mod ai;
pub mod entity;
pub mod particle;
pub mod physics;
pub mod rules;
pub mod tile;
