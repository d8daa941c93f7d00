use std::cmp::Reverse;
use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::RankedPlayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ballot {
    pub voter_id: Uuid,
    pub candidate_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CandidateTally {
    pub candidate_id: Uuid,
    pub votes: u32,
}

/// Counts ballots cast by members for members, best candidate first.
///
/// Ties go to the higher proficiency score, then to the lower player id.
pub fn tally_votes(members: &[RankedPlayer], ballots: &[Ballot]) -> Vec<CandidateTally> {
    let scores: HashMap<Uuid, i32> = members.iter().map(|m| (m.player_id, m.score)).collect();

    let mut counts: HashMap<Uuid, u32> = HashMap::new();
    for ballot in ballots {
        if scores.contains_key(&ballot.voter_id) && scores.contains_key(&ballot.candidate_id) {
            *counts.entry(ballot.candidate_id).or_default() += 1;
        }
    }

    let mut tallies: Vec<CandidateTally> = counts
        .into_iter()
        .map(|(candidate_id, votes)| CandidateTally {
            candidate_id,
            votes,
        })
        .collect();

    tallies.sort_by_key(|t| {
        (
            Reverse(t.votes),
            Reverse(scores.get(&t.candidate_id).copied().unwrap_or_default()),
            t.candidate_id,
        )
    });
    tallies
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winner(members: &[RankedPlayer], ballots: &[Ballot]) -> Option<Uuid> {
        tally_votes(members, ballots).first().map(|t| t.candidate_id)
    }

    fn ballot(voter: &RankedPlayer, candidate: &RankedPlayer) -> Ballot {
        Ballot {
            voter_id: voter.player_id,
            candidate_id: candidate.player_id,
        }
    }

    #[test]
    fn test_most_votes_wins() {
        let a = RankedPlayer::new(Uuid::new_v4(), 40);
        let b = RankedPlayer::new(Uuid::new_v4(), 60);
        let c = RankedPlayer::new(Uuid::new_v4(), 50);
        let members = [a, b, c];
        let ballots = [ballot(&a, &c), ballot(&b, &c), ballot(&c, &b)];

        assert_eq!(winner(&members, &ballots), Some(c.player_id));
        let tallies = tally_votes(&members, &ballots);
        assert_eq!(tallies[0].votes, 2);
        assert_eq!(tallies[1].votes, 1);
    }

    #[test]
    fn test_tie_goes_to_higher_score() {
        let a = RankedPlayer::new(Uuid::new_v4(), 40);
        let b = RankedPlayer::new(Uuid::new_v4(), 70);
        let members = [a, b];
        let ballots = [ballot(&a, &b), ballot(&b, &a)];

        assert_eq!(winner(&members, &ballots), Some(b.player_id));
    }

    #[test]
    fn test_outsider_votes_are_ignored() {
        let a = RankedPlayer::new(Uuid::new_v4(), 40);
        let b = RankedPlayer::new(Uuid::new_v4(), 70);
        let outsider = RankedPlayer::new(Uuid::new_v4(), 99);
        let members = [a, b];
        let ballots = [
            ballot(&outsider, &a),
            ballot(&outsider, &a),
            ballot(&a, &outsider),
            ballot(&b, &b),
        ];

        assert_eq!(winner(&members, &ballots), Some(b.player_id));
    }

    #[test]
    fn test_no_votes_no_captain() {
        let a = RankedPlayer::new(Uuid::new_v4(), 40);
        assert_eq!(winner(&[a], &[]), None);
    }
}
