// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// One participant of the poll and their ordered preferences.
///
/// The ranking lists candidate names, most preferred first. It may omit some
/// candidates: an omitted candidate is less preferred than any ranked one.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Voter {
    pub name: String,
    pub ranking: Vec<String>,
}

impl Voter {
    pub fn new(name: &str, ranking: &[&str]) -> Voter {
        Voter {
            name: name.to_string(),
            ranking: ranking.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Whether this voter prefers `first` over `second`.
    ///
    /// A candidate missing from the ranking is never preferred, and any ranked
    /// candidate is preferred over a missing one.
    pub fn prefers(&self, first: &str, second: &str) -> bool {
        let first_pos = self.position(first);
        let second_pos = self.position(second);
        match (first_pos, second_pos) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(p1), Some(p2)) => p1 < p2,
        }
    }

    /// The most preferred candidate still on the ranking.
    pub fn top_choice(&self) -> Option<&String> {
        self.ranking.first()
    }

    fn position(&self, candidate: &str) -> Option<usize> {
        self.ranking.iter().position(|c| c == candidate)
    }
}

// ******** Output data structures *********

/// The resolution method that produced a result.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum VotingMethod {
    InstantRunoff,
    Tideman,
}

impl Display for VotingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingMethod::InstantRunoff => write!(f, "instant-runoff"),
            VotingMethod::Tideman => write!(f, "tideman"),
        }
    }
}

/// Which level of the tie-break cascade settled an elimination.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum EliminationTier {
    /// A single candidate had the lowest first-preference count.
    RawCount,
    /// Several candidates shared the lowest count; the lowest Copeland score settled it.
    Copeland,
    /// The Copeland scores were tied as well and the random draw picked the candidate.
    Random,
    /// Removed in batch by the Tideman method for being outside the Smith set.
    OutsideSmithSet,
}

impl Display for EliminationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EliminationTier::RawCount => "lowest count",
            EliminationTier::Copeland => "copeland score",
            EliminationTier::Random => "random draw",
            EliminationTier::OutsideSmithSet => "outside smith set",
        };
        write!(f, "{}", s)
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Elimination {
    pub candidate: String,
    pub tier: EliminationTier,
}

/// Statistics for one round
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    /// First-preference counts at the start of the round, in candidate order.
    pub tally: Vec<(String, u64)>,
    /// Only filled by the Tideman method.
    pub smith_set: Option<Vec<String>>,
    pub eliminated: Vec<Elimination>,
    pub elected: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VotingResult {
    pub method: VotingMethod,
    pub winner: String,
    pub round_stats: Vec<RoundStats>,
}

/// Errors that prevent the algorithm from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VotingErrors {
    /// An invariant of the ballots or of the counting was broken.
    IntegrityViolation(String),
    /// The tie-break cascade ran out of tiers. Carries the tied candidates.
    UnresolvedTie(Vec<String>),
    /// An elimination was requested with fewer than two candidates left.
    EmptyCandidateSet,
    EmptyElection,
    UnknownCandidate(String),
    DuplicateCandidate(String),
    InvalidRanking { voter: String, reason: String },
    NoConvergence,
}

impl Error for VotingErrors {}

impl Display for VotingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingErrors::IntegrityViolation(msg) => write!(f, "integrity violation: {}", msg),
            VotingErrors::UnresolvedTie(cands) => write!(
                f,
                "unresolved tie between {} (no random tie-break configured)",
                cands.join(", ")
            ),
            VotingErrors::EmptyCandidateSet => {
                write!(f, "elimination requested with fewer than two candidates")
            }
            VotingErrors::EmptyElection => write!(f, "the election has no candidates or no voters"),
            VotingErrors::UnknownCandidate(name) => write!(f, "unknown candidate {:?}", name),
            VotingErrors::DuplicateCandidate(name) => write!(f, "duplicate candidate {:?}", name),
            VotingErrors::InvalidRanking { voter, reason } => {
                write!(f, "invalid ranking for voter {:?}: {}", voter, reason)
            }
            VotingErrors::NoConvergence => write!(f, "the count did not converge"),
        }
    }
}

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreakMode {
    /// Ties that survive the Copeland tier are settled by a SHA-256 based draw
    /// seeded with the given value. The same seed always gives the same draw.
    Random(u32),
    /// Ties that survive the Copeland tier are reported as errors.
    Strict,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteRules {
    pub tiebreak_mode: TieBreakMode,
}

impl VoteRules {
    pub const DEFAULT_RULES: VoteRules = VoteRules {
        tiebreak_mode: TieBreakMode::Random(0),
    };
}
