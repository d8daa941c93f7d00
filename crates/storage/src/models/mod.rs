mod captain_vote;
mod competition;
mod player;
mod score;
mod team;

pub use captain_vote::CaptainVote;
pub use competition::{Competition, CompetitionStatus};
pub use player::{DEFAULT_PROFICIENCY, Player};
pub use score::{PeerRating, SelfScore};
pub use team::Team;
