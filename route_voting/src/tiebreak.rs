use log::{debug, info, warn};

use crate::config::*;
use crate::pairwise::PairwiseMatrix;
use crate::state::ElectionState;

/// Source of the last-resort choice between candidates that are still tied
/// after the count and Copeland tiers.
pub trait TieBreaker {
    /// Picks the candidate to eliminate among `tied` (never empty) in the given round.
    fn draw(&mut self, tied: &[String], round: u32) -> Result<String, VotingErrors>;
}

/// Draw based on a cryptographic hash of the seed, the round and the candidate names.
///
/// The outcome is hard to guess in advance but only depends on its inputs, so
/// a run can be replayed by passing the same seed.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct SeededDraw {
    seed: u32,
}

impl SeededDraw {
    pub fn new(seed: u32) -> SeededDraw {
        SeededDraw { seed }
    }

    fn key(&self, name: &str, round: u32) -> String {
        sha256::digest(format!("{:08}{:08}{}", self.seed, round, name))
    }
}

impl TieBreaker for SeededDraw {
    fn draw(&mut self, tied: &[String], round: u32) -> Result<String, VotingErrors> {
        tied.iter()
            .min_by_key(|name| self.key(name, round))
            .cloned()
            .ok_or(VotingErrors::EmptyCandidateSet)
    }
}

/// Refuses to pick: any tie reaching the random tier becomes an error.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct NoDraw;

impl TieBreaker for NoDraw {
    fn draw(&mut self, tied: &[String], _round: u32) -> Result<String, VotingErrors> {
        Err(VotingErrors::UnresolvedTie(tied.to_vec()))
    }
}

pub fn tie_breaker(mode: TieBreakMode) -> Box<dyn TieBreaker> {
    match mode {
        TieBreakMode::Random(seed) => Box::new(SeededDraw::new(seed)),
        TieBreakMode::Strict => Box::new(NoDraw),
    }
}

/// Selects the single candidate to eliminate from the state.
///
/// The candidates with the lowest first-preference count are considered first.
/// Among them, only those with the lowest Copeland score remain. A tie that
/// survives both is handed to the tie breaker.
pub fn find_last_place(
    state: &ElectionState,
    tie_breaker: &mut dyn TieBreaker,
    round: u32,
) -> Result<Elimination, VotingErrors> {
    if state.candidates().len() < 2 {
        return Err(VotingErrors::EmptyCandidateSet);
    }
    let tally = state.tally()?;

    let min_count = tally
        .iter()
        .map(|(_, count)| *count)
        .min()
        .ok_or(VotingErrors::EmptyCandidateSet)?;
    let all_smallest: Vec<String> = tally
        .iter()
        .filter(|(_, count)| *count == min_count)
        .map(|(c, _)| c.clone())
        .collect();
    debug!("find_last_place: all_smallest: {:?}", all_smallest);

    if let [candidate] = all_smallest.as_slice() {
        return Ok(Elimination {
            candidate: candidate.clone(),
            tier: EliminationTier::RawCount,
        });
    }

    // Scores are computed over every running candidate, not only the tied ones.
    let scores = PairwiseMatrix::new(state).copeland_scores();
    let tied_scores: Vec<(String, i64)> = scores
        .into_iter()
        .filter(|(c, _)| all_smallest.contains(c))
        .collect();
    let min_score = tied_scores
        .iter()
        .map(|(_, s)| *s)
        .min()
        .ok_or(VotingErrors::EmptyCandidateSet)?;
    let lowest_copeland: Vec<String> = tied_scores
        .iter()
        .filter(|(_, s)| *s == min_score)
        .map(|(c, _)| c.clone())
        .collect();
    debug!(
        "find_last_place: copeland scores of tied candidates: {:?}",
        tied_scores
    );

    if let [candidate] = lowest_copeland.as_slice() {
        info!(
            "Tie at {} votes between {:?} broken by copeland score: {}",
            min_count, all_smallest, candidate
        );
        return Ok(Elimination {
            candidate: candidate.clone(),
            tier: EliminationTier::Copeland,
        });
    }

    let candidate = tie_breaker.draw(&lowest_copeland, round)?;
    warn!(
        "Round {}: tie between {:?} (count {}, copeland {}) broken by random draw: {}",
        round, lowest_copeland, min_count, min_score, candidate
    );
    Ok(Elimination {
        candidate,
        tier: EliminationTier::Random,
    })
}
