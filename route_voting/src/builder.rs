pub use crate::config::*;
use crate::state::ElectionState;

use log::debug;

/// A builder for collecting ballots into an election.
///
/// ```
/// use route_voting::builder::Builder;
/// # use route_voting::VotingErrors;
///
/// let mut builder = Builder::new()
///     .candidates(&["north".to_string(), "ridge".to_string()])?;
///
/// builder.add_voter("Anna", &["ridge".to_string(), "north".to_string()])?;
/// builder.add_ranked_answers("Bob", &[("north".to_string(), 1)])?;
///
/// let election = builder.build()?;
/// assert_eq!(election.num_voters(), 2);
/// # Ok::<(), VotingErrors>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    pub(crate) _candidates: Option<Vec<String>>,
    pub(crate) _voters: Vec<Voter>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            _candidates: None,
            _voters: Vec::new(),
        }
    }

    /// Declares the candidates. Previously added voters are discarded.
    pub fn candidates(self, cands: &[String]) -> Result<Builder, VotingErrors> {
        for (idx, c) in cands.iter().enumerate() {
            if cands[..idx].contains(c) {
                return Err(VotingErrors::DuplicateCandidate(c.clone()));
            }
        }
        Ok(Builder {
            _candidates: Some(cands.to_vec()),
            _voters: Vec::new(),
        })
    }

    /// Adds a voter with an already ordered ranking, most preferred first.
    pub fn add_voter(&mut self, name: &str, ranking: &[String]) -> Result<(), VotingErrors> {
        if let Some(cands) = self._candidates.as_deref() {
            if let Some(unknown) = ranking.iter().find(|c| !cands.contains(c)) {
                return Err(VotingErrors::UnknownCandidate(unknown.clone()));
            }
        }
        self._voters.push(Voter {
            name: name.to_string(),
            ranking: ranking.to_vec(),
        });
        Ok(())
    }

    /// Adds a voter from per-candidate rank answers (1 is the favourite).
    ///
    /// The ranks must be exactly `1..=k` for some `k`: a missing or repeated
    /// rank makes the ballot invalid.
    pub fn add_ranked_answers(
        &mut self,
        name: &str,
        answers: &[(String, u32)],
    ) -> Result<(), VotingErrors> {
        let ranking = assemble_ranking(name, answers)?;
        debug!("add_ranked_answers: {}: {:?}", name, ranking);
        self.add_voter(name, &ranking)
    }

    /// Creates the election. Without declared candidates, they are inferred
    /// from the rankings in order of first appearance.
    pub fn build(self) -> Result<ElectionState, VotingErrors> {
        let candidates = match self._candidates {
            Some(c) => c,
            None => {
                let mut inferred: Vec<String> = Vec::new();
                for v in self._voters.iter() {
                    for c in v.ranking.iter() {
                        if !inferred.contains(c) {
                            inferred.push(c.clone());
                        }
                    }
                }
                inferred
            }
        };
        ElectionState::new(candidates, self._voters)
    }
}

fn assemble_ranking(name: &str, answers: &[(String, u32)]) -> Result<Vec<String>, VotingErrors> {
    let invalid = |reason: String| VotingErrors::InvalidRanking {
        voter: name.to_string(),
        reason,
    };
    // A rank above the number of answers always leaves a gap.
    for (cand, rank) in answers.iter() {
        if *rank == 0 {
            return Err(invalid(format!("rank 0 given to {:?}", cand)));
        }
        if *rank as usize > answers.len() {
            return Err(invalid(format!(
                "rank {} given to {:?} with only {} ranked candidates",
                rank,
                cand,
                answers.len()
            )));
        }
    }
    let mut slots: Vec<Option<String>> = vec![None; answers.len()];
    for (cand, rank) in answers.iter() {
        let slot = &mut slots[(*rank - 1) as usize];
        if let Some(other) = slot {
            return Err(invalid(format!(
                "rank {} given to both {:?} and {:?}",
                rank, other, cand
            )));
        }
        *slot = Some(cand.clone());
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(idx, slot)| slot.ok_or_else(|| invalid(format!("rank {} is missing", idx + 1))))
        .collect()
}
