use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{PeerRating, SelfScore};

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

/// Stand-in rating for a missing source of assessments.
pub const NEUTRAL_RATING: f64 = 3.0;

/// Pulls every usable rating out of a raw rating payload.
///
/// Lists contribute each valid element. Maps contribute only their `overall`
/// entry when it is valid, every valid entry otherwise. A bare number counts as
/// a single rating. Anything non-numeric or outside `[1, 5]` is dropped.
pub fn extract_ratings(payload: &Value) -> Vec<f64> {
    match payload {
        Value::Array(values) => values.iter().filter_map(valid_rating).collect(),
        Value::Object(categories) => {
            if let Some(overall) = categories.get("overall").and_then(valid_rating) {
                return vec![overall];
            }
            categories.values().filter_map(valid_rating).collect()
        }
        other => valid_rating(other).into_iter().collect(),
    }
}

fn valid_rating(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .filter(|rating| (MIN_RATING..=MAX_RATING).contains(rating))
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Blends self and peer averages on the 1–5 scale.
pub fn weighted_rating(self_average: Option<f64>, peer_average: Option<f64>) -> f64 {
    match (self_average, peer_average) {
        (Some(self_avg), Some(peer_avg)) => 0.4 * self_avg + 0.6 * peer_avg,
        (Some(self_avg), None) => 0.7 * self_avg + 0.3 * NEUTRAL_RATING,
        (None, Some(peer_avg)) => 0.8 * peer_avg + 0.2 * NEUTRAL_RATING,
        (None, None) => NEUTRAL_RATING,
    }
}

/// Maps a 1–5 rating linearly onto the 0–100 proficiency range.
pub fn rescale_to_proficiency(weighted: f64) -> i32 {
    let scaled = (weighted - MIN_RATING) / (MAX_RATING - MIN_RATING) * 100.0;
    scaled.round().clamp(0.0, 100.0) as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PeerRatingRejection {
    #[error("Players cannot rate themselves")]
    SelfRating,
    #[error("Peer ratings are limited to teammates")]
    NotTeammates,
}

/// Checks who may rate whom. `rater_team` and `rated_team` are the players'
/// teams in the competition the rating belongs to. A rater without a team
/// may rate any other registered player.
pub fn check_peer_rating(
    rater_id: Uuid,
    rated_player_id: Uuid,
    rater_team: Option<Uuid>,
    rated_team: Option<Uuid>,
) -> Result<(), PeerRatingRejection> {
    if rater_id == rated_player_id {
        return Err(PeerRatingRejection::SelfRating);
    }
    match rater_team {
        Some(team) if rated_team != Some(team) => Err(PeerRatingRejection::NotTeammates),
        _ => Ok(()),
    }
}

/// Ratings gathered for one player, split by source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingSamples {
    pub self_values: Vec<f64>,
    pub peer_values: Vec<f64>,
}

impl RatingSamples {
    pub fn summarize(&self, player_id: Uuid) -> ScoreSummary {
        let self_average = mean(&self.self_values);
        let peer_average = mean(&self.peer_values);
        let weighted = weighted_rating(self_average, peer_average);

        ScoreSummary {
            player_id,
            self_average,
            peer_average,
            self_rating_count: self.self_values.len(),
            peer_rating_count: self.peer_values.len(),
            weighted_rating: weighted,
            proficiency_score: rescale_to_proficiency(weighted),
        }
    }
}

/// Breakdown of how a player's proficiency score was reached.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ScoreSummary {
    pub player_id: Uuid,
    pub self_average: Option<f64>,
    pub peer_average: Option<f64>,
    pub self_rating_count: usize,
    pub peer_rating_count: usize,
    pub weighted_rating: f64,
    pub proficiency_score: i32,
}

/// Groups rating values by player. Records for players outside the roster are ignored.
pub fn collect_samples(
    roster: &[Uuid],
    self_scores: &[SelfScore],
    peer_ratings: &[PeerRating],
) -> HashMap<Uuid, RatingSamples> {
    let mut samples: HashMap<Uuid, RatingSamples> = roster
        .iter()
        .map(|&player_id| (player_id, RatingSamples::default()))
        .collect();

    for self_score in self_scores {
        if let Some(entry) = samples.get_mut(&self_score.player_id) {
            entry.self_values.extend(extract_ratings(&self_score.ratings));
        }
    }

    for peer_rating in peer_ratings {
        if let Some(entry) = samples.get_mut(&peer_rating.rated_player_id) {
            entry.peer_values.extend(extract_ratings(&peer_rating.ratings));
        }
    }

    samples
}

/// Computes one proficiency score per rostered player, in roster order.
pub fn aggregate_scores(
    roster: &[Uuid],
    self_scores: &[SelfScore],
    peer_ratings: &[PeerRating],
) -> Vec<ScoreSummary> {
    let samples = collect_samples(roster, self_scores, peer_ratings);

    roster
        .iter()
        .map(|player_id| {
            samples
                .get(player_id)
                .map(|s| s.summarize(*player_id))
                .unwrap_or_else(|| RatingSamples::default().summarize(*player_id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_PROFICIENCY;
    use serde_json::json;
    use sqlx::types::Json;

    fn self_score(player_id: Uuid, ratings: Value) -> SelfScore {
        SelfScore {
            self_score_id: Uuid::new_v4(),
            competition_id: Uuid::nil(),
            player_id,
            ratings: Json(ratings),
            submitted_at: Default::default(),
        }
    }

    fn peer_rating(rater_id: Uuid, rated_player_id: Uuid, ratings: Value) -> PeerRating {
        PeerRating {
            peer_rating_id: Uuid::new_v4(),
            competition_id: Uuid::nil(),
            rater_id,
            rated_player_id,
            ratings: Json(ratings),
            submitted_at: Default::default(),
        }
    }

    #[test]
    fn test_extract_flat_list_drops_invalid_values() {
        let payload = json!([1, 5, 0, 6, "4", null, 3.5]);
        assert_eq!(extract_ratings(&payload), vec![1.0, 5.0, 3.5]);
    }

    #[test]
    fn test_extract_overall_takes_precedence() {
        let payload = json!({ "overall": 4, "speed": 1, "stamina": 2 });
        assert_eq!(extract_ratings(&payload), vec![4.0]);
    }

    #[test]
    fn test_extract_invalid_overall_falls_back_to_categories() {
        let payload = json!({ "overall": 9, "speed": 2, "stamina": "high" });
        assert_eq!(extract_ratings(&payload), vec![2.0]);
    }

    #[test]
    fn test_extract_empty_payloads() {
        assert!(extract_ratings(&json!({})).is_empty());
        assert!(extract_ratings(&json!([])).is_empty());
        assert!(extract_ratings(&json!(null)).is_empty());
    }

    #[test]
    fn test_extract_single_number() {
        assert_eq!(extract_ratings(&json!(2)), vec![2.0]);
        assert!(extract_ratings(&json!(7)).is_empty());
    }

    #[test]
    fn test_peer_rating_rules() {
        let rater = Uuid::new_v4();
        let rated = Uuid::new_v4();
        let team = Uuid::new_v4();
        let other_team = Uuid::new_v4();

        assert_eq!(
            check_peer_rating(rater, rater, Some(team), Some(team)),
            Err(PeerRatingRejection::SelfRating)
        );
        assert_eq!(check_peer_rating(rater, rated, Some(team), Some(team)), Ok(()));
        assert_eq!(
            check_peer_rating(rater, rated, Some(team), Some(other_team)),
            Err(PeerRatingRejection::NotTeammates)
        );
        assert_eq!(
            check_peer_rating(rater, rated, Some(team), None),
            Err(PeerRatingRejection::NotTeammates)
        );
        assert_eq!(check_peer_rating(rater, rated, None, Some(other_team)), Ok(()));
    }

    #[test]
    fn test_teammates_in_earlier_competition_may_still_rate() {
        // Both players were teamed up last year and split up this year. Only the
        // teams of the rated competition count.
        let rater = Uuid::new_v4();
        let rated = Uuid::new_v4();
        let last_year_team = Uuid::new_v4();
        let this_year = (Uuid::new_v4(), Uuid::new_v4());

        assert_eq!(
            check_peer_rating(rater, rated, Some(last_year_team), Some(last_year_team)),
            Ok(())
        );
        assert_eq!(
            check_peer_rating(rater, rated, Some(this_year.0), Some(this_year.1)),
            Err(PeerRatingRejection::NotTeammates)
        );
    }

    #[test]
    fn test_no_ratings_yields_midpoint() {
        let player = Uuid::new_v4();
        let summaries = aggregate_scores(&[player], &[], &[]);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].proficiency_score, DEFAULT_PROFICIENCY);
        assert_eq!(summaries[0].self_average, None);
        assert_eq!(summaries[0].peer_average, None);
    }

    #[test]
    fn test_empty_rating_map_is_treated_as_absent() {
        let player = Uuid::new_v4();
        let summaries = aggregate_scores(&[player], &[self_score(player, json!({}))], &[]);
        assert_eq!(summaries[0].proficiency_score, 50);
    }

    #[test]
    fn test_self_only_maximum() {
        let player = Uuid::new_v4();
        let summaries =
            aggregate_scores(&[player], &[self_score(player, json!([5, 5, 5]))], &[]);
        // 0.7 * 5 + 0.3 * 3 = 4.4
        assert_eq!(summaries[0].proficiency_score, 85);
    }

    #[test]
    fn test_peer_only_maximum() {
        let player = Uuid::new_v4();
        let rater = Uuid::new_v4();
        let summaries = aggregate_scores(
            &[player],
            &[],
            &[peer_rating(rater, player, json!({ "overall": 5 }))],
        );
        // 0.8 * 5 + 0.2 * 3 = 4.6
        assert_eq!(summaries[0].proficiency_score, 90);
    }

    #[test]
    fn test_both_sources_blended() {
        let player = Uuid::new_v4();
        let rater_a = Uuid::new_v4();
        let rater_b = Uuid::new_v4();
        let summaries = aggregate_scores(
            &[player],
            &[self_score(player, json!({ "skill": 5, "teamwork": 3 }))],
            &[
                peer_rating(rater_a, player, json!([2])),
                peer_rating(rater_b, player, json!([4])),
            ],
        );
        let summary = &summaries[0];
        assert_eq!(summary.self_average, Some(4.0));
        assert_eq!(summary.peer_average, Some(3.0));
        assert_eq!(summary.peer_rating_count, 2);
        // 0.4 * 4 + 0.6 * 3 = 3.4 -> 60
        assert_eq!(summary.proficiency_score, 60);
    }

    #[test]
    fn test_extremes_map_to_bounds() {
        let low = Uuid::new_v4();
        let high = Uuid::new_v4();
        let rater = Uuid::new_v4();
        let summaries = aggregate_scores(
            &[low, high],
            &[self_score(low, json!([1])), self_score(high, json!([5]))],
            &[
                peer_rating(rater, low, json!([1])),
                peer_rating(rater, high, json!([5])),
            ],
        );
        assert_eq!(summaries[0].proficiency_score, 0);
        assert_eq!(summaries[1].proficiency_score, 100);
    }

    #[test]
    fn test_neutral_averages_stay_at_midpoint() {
        let player = Uuid::new_v4();
        let rater = Uuid::new_v4();
        let summaries = aggregate_scores(
            &[player],
            &[self_score(player, json!([3]))],
            &[peer_rating(rater, player, json!([3]))],
        );
        assert_eq!(summaries[0].proficiency_score, 50);
    }

    #[test]
    fn test_records_outside_roster_are_ignored() {
        let player = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let summaries = aggregate_scores(
            &[player],
            &[self_score(stranger, json!([5]))],
            &[peer_rating(player, stranger, json!([1]))],
        );
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].player_id, player);
        assert_eq!(summaries[0].proficiency_score, 50);
    }

    #[test]
    fn test_summaries_follow_roster_order() {
        let roster: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let summaries = aggregate_scores(&roster, &[], &[]);
        let ids: Vec<Uuid> = summaries.iter().map(|s| s.player_id).collect();
        assert_eq!(ids, roster);
    }
}
