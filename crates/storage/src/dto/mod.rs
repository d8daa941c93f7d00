pub mod common;
pub mod competition;
pub mod player;
pub mod score;
pub mod team;
