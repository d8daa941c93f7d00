pub mod captain_vote;
pub mod competition;
pub mod player;
pub mod score;
pub mod team;
