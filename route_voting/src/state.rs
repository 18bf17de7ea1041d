use log::debug;

use std::collections::{HashMap, HashSet};

use crate::config::*;

/// A snapshot of an election: the candidates still running and the voters.
///
/// Invariant: every ranking only names candidates that are still running.
/// Eliminations never modify a state in place. They return a new state that
/// owns its own copy of the voters, so older snapshots stay valid.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionState {
    candidates: Vec<String>,
    voters: Vec<Voter>,
}

impl ElectionState {
    /// Checks the ballots and creates the initial state.
    ///
    /// Candidates must be unique. Each ranking must be non-empty, without
    /// duplicates, and only name declared candidates.
    pub fn new(candidates: Vec<String>, voters: Vec<Voter>) -> Result<ElectionState, VotingErrors> {
        let mut known: HashSet<&str> = HashSet::new();
        for c in candidates.iter() {
            if !known.insert(c.as_str()) {
                return Err(VotingErrors::DuplicateCandidate(c.clone()));
            }
        }

        for v in voters.iter() {
            if v.ranking.is_empty() {
                return Err(VotingErrors::InvalidRanking {
                    voter: v.name.clone(),
                    reason: "the ranking is empty".to_string(),
                });
            }
            let mut seen: HashSet<&str> = HashSet::new();
            for c in v.ranking.iter() {
                if !known.contains(c.as_str()) {
                    return Err(VotingErrors::UnknownCandidate(c.clone()));
                }
                if !seen.insert(c.as_str()) {
                    return Err(VotingErrors::InvalidRanking {
                        voter: v.name.clone(),
                        reason: format!("candidate {:?} is ranked more than once", c),
                    });
                }
            }
        }

        debug!(
            "ElectionState::new: {} candidates, {} voters",
            candidates.len(),
            voters.len()
        );
        Ok(ElectionState { candidates, voters })
    }

    /// The candidates still running, in declaration order.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn voters(&self) -> &[Voter] {
        &self.voters
    }

    pub fn num_voters(&self) -> u64 {
        self.voters.len() as u64
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.candidates.iter().any(|c| c == candidate)
    }

    /// Returns a new state without the given candidate.
    pub fn without_candidate(&self, candidate: &str) -> Result<ElectionState, VotingErrors> {
        self.without_candidates(&[candidate.to_string()])
    }

    /// Returns a new state where all the given candidates are removed, both
    /// from the candidate list and from every ranking.
    pub fn without_candidates(&self, removed: &[String]) -> Result<ElectionState, VotingErrors> {
        for c in removed.iter() {
            if !self.contains(c) {
                return Err(VotingErrors::UnknownCandidate(c.clone()));
            }
        }
        let removed: HashSet<&String> = removed.iter().collect();

        let candidates: Vec<String> = self
            .candidates
            .iter()
            .filter(|c| !removed.contains(c))
            .cloned()
            .collect();
        let voters: Vec<Voter> = self
            .voters
            .iter()
            .map(|v| Voter {
                name: v.name.clone(),
                ranking: v
                    .ranking
                    .iter()
                    .filter(|c| !removed.contains(c))
                    .cloned()
                    .collect(),
            })
            .collect();

        Ok(ElectionState { candidates, voters })
    }

    /// Counts the first preferences of every voter.
    pub fn tally(&self) -> Result<Tally, VotingErrors> {
        let index: HashMap<&str, usize> = self
            .candidates
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.as_str(), idx))
            .collect();
        let mut counts: Vec<(String, u64)> =
            self.candidates.iter().map(|c| (c.clone(), 0)).collect();

        for v in self.voters.iter() {
            let top = v.top_choice().ok_or_else(|| {
                VotingErrors::IntegrityViolation(format!(
                    "voter {:?} has no candidate left on the ranking",
                    v.name
                ))
            })?;
            let idx = index.get(top.as_str()).ok_or_else(|| {
                VotingErrors::IntegrityViolation(format!(
                    "voter {:?} ranks {:?} which is not running",
                    v.name, top
                ))
            })?;
            counts[*idx].1 += 1;
        }
        Ok(Tally { counts })
    }
}

/// First-preference counts for each running candidate, in candidate order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Tally {
    counts: Vec<(String, u64)>,
}

impl Tally {
    pub fn get(&self, candidate: &str) -> Option<u64> {
        self.counts
            .iter()
            .find(|(c, _)| c == candidate)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, u64)> {
        self.counts.iter()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, count)| *count).sum()
    }

    pub fn to_vec(&self) -> Vec<(String, u64)> {
        self.counts.clone()
    }

    /// The candidate holding a strict majority of the `num_voters` votes, if any.
    ///
    /// More than one such candidate means the counts do not partition the
    /// voters, which is reported as an integrity violation.
    pub fn majority_winner(&self, num_voters: u64) -> Result<Option<String>, VotingErrors> {
        let above: Vec<&String> = self
            .counts
            .iter()
            .filter(|(_, count)| 2 * count > num_voters)
            .map(|(c, _)| c)
            .collect();
        match above.as_slice() {
            [] => Ok(None),
            [winner] => Ok(Some((*winner).clone())),
            _ => Err(VotingErrors::IntegrityViolation(format!(
                "several candidates hold a majority of {} votes: {:?}",
                num_voters, above
            ))),
        }
    }
}

impl From<Vec<(String, u64)>> for Tally {
    fn from(counts: Vec<(String, u64)>) -> Tally {
        Tally { counts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::routes_election;

    #[test]
    fn tally_counts_first_preferences() {
        let state = routes_election();
        let tally = state.tally().unwrap();
        assert_eq!(
            tally.to_vec(),
            vec![
                ("r1".to_string(), 1),
                ("r2".to_string(), 1),
                ("r3".to_string(), 2),
                ("r4".to_string(), 1),
                ("r5".to_string(), 0),
                ("r6".to_string(), 0),
                ("r7".to_string(), 0),
            ]
        );
        assert_eq!(tally.total(), state.num_voters());
    }

    #[test]
    fn tally_sums_to_voter_count_after_eliminations() {
        let mut state = routes_election();
        for c in ["r7", "r2", "r5", "r3"] {
            state = state.without_candidate(c).unwrap();
            assert_eq!(state.tally().unwrap().total(), state.num_voters());
        }
    }

    #[test]
    fn without_candidate_leaves_original_untouched() {
        let state = routes_election();
        let without = state.without_candidate("r2").unwrap();

        let tally = without.tally().unwrap();
        assert_eq!(tally.get("r1"), Some(2));
        assert_eq!(tally.get("r3"), Some(2));
        assert_eq!(tally.get("r4"), Some(1));
        assert_eq!(tally.get("r2"), None);
        assert_eq!(
            without.voters()[3].ranking,
            vec!["r3", "r5", "r4", "r7", "r1", "r6"]
        );

        assert_eq!(state.tally().unwrap().get("r2"), Some(1));
        assert_eq!(state.voters()[3].ranking.len(), 7);
    }

    #[test]
    fn elimination_only_moves_votes_of_the_eliminated_candidate() {
        let state = routes_election();
        let before = state.tally().unwrap();
        let after = state.without_candidate("r2").unwrap().tally().unwrap();
        // Jesse ranked r2 first and r1 second.
        for (c, count) in after.iter() {
            let prev = before.get(c).unwrap();
            if c == "r1" {
                assert_eq!(*count, prev + 1);
            } else {
                assert_eq!(*count, prev);
            }
        }
    }

    #[test]
    fn without_unknown_candidate_fails() {
        let state = routes_election();
        assert_eq!(
            state.without_candidate("r9"),
            Err(VotingErrors::UnknownCandidate("r9".to_string()))
        );
    }

    #[test]
    fn majority_requires_more_than_half() {
        let state = routes_election();
        assert_eq!(state.tally().unwrap().majority_winner(5), Ok(None));
        let state = state.without_candidate("r2").unwrap();
        assert_eq!(state.tally().unwrap().majority_winner(5), Ok(None));
        let state = state.without_candidate("r4").unwrap();
        assert_eq!(
            state.tally().unwrap().majority_winner(5),
            Ok(Some("r1".to_string()))
        );

        let even: Tally = vec![("a".to_string(), 2), ("b".to_string(), 2)].into();
        assert_eq!(even.majority_winner(4), Ok(None));
    }

    #[test]
    fn two_majorities_is_an_integrity_violation() {
        let broken: Tally = vec![("a".to_string(), 3), ("b".to_string(), 3)].into();
        assert!(matches!(
            broken.majority_winner(4),
            Err(VotingErrors::IntegrityViolation(_))
        ));
    }

    #[test]
    fn new_rejects_bad_ballots() {
        let cands = vec!["a".to_string(), "b".to_string()];
        assert!(matches!(
            ElectionState::new(cands.clone(), vec![Voter::new("x", &["a", "a"])]),
            Err(VotingErrors::InvalidRanking { .. })
        ));
        assert!(matches!(
            ElectionState::new(cands.clone(), vec![Voter::new("x", &[])]),
            Err(VotingErrors::InvalidRanking { .. })
        ));
        assert_eq!(
            ElectionState::new(cands, vec![Voter::new("x", &["c"])]),
            Err(VotingErrors::UnknownCandidate("c".to_string()))
        );
        assert_eq!(
            ElectionState::new(vec!["a".to_string(), "a".to_string()], vec![]),
            Err(VotingErrors::DuplicateCandidate("a".to_string()))
        );
    }

    #[test]
    fn exhausted_ranking_is_an_integrity_violation() {
        let state = ElectionState::new(
            vec!["a".to_string(), "b".to_string()],
            vec![Voter::new("x", &["a"]), Voter::new("y", &["b", "a"])],
        )
        .unwrap()
        .without_candidate("a")
        .unwrap();
        assert!(matches!(
            state.tally(),
            Err(VotingErrors::IntegrityViolation(_))
        ));
    }
}
