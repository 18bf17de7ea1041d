use log::{debug, info, warn};

use route_voting::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

mod io_survey;
mod report;

use crate::rcv::io_survey::SurveySettings;
use crate::rcv::report::SummaryConfig;

#[derive(Debug, Snafu)]
pub enum RcvError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading CSV file {path}"))]
    ReadingCsv { source: csv::Error, path: String },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Line {lineno}: cannot understand the cell {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("The survey export is empty"))]
    EmptySurvey {},
    #[snafu(display("No ranking column found in the header: {header:?}"))]
    NoRankingColumns { header: Vec<String> },
    #[snafu(display("Column {name:?} not found in the header"))]
    MissingColumn { name: String },
    #[snafu(display("Line {lineno}: cannot read a rank in {content:?}"))]
    UnreadableRank { lineno: usize, content: String },
    #[snafu(display("Line {lineno}: no candidate is ranked"))]
    EmptyBallot { lineno: usize },
    #[snafu(display("Line {lineno}: the ballot does not rank {missing:?}"))]
    IncompleteBallot { lineno: usize, missing: Vec<String> },
    #[snafu(display("Line {lineno}: invalid ballot"))]
    InvalidBallot {
        lineno: usize,
        source: VotingErrors,
    },
    #[snafu(display("Invalid candidates in the survey header"))]
    InvalidCandidates { source: VotingErrors },
    #[snafu(display("The {method} count failed"))]
    Counting {
        method: VotingMethod,
        source: VotingErrors,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type RcvResult<T> = Result<T, RcvError>;

fn input_type(args: &Args) -> String {
    if let Some(t) = args.input_type.clone() {
        return t;
    }
    let ext = Path::new(&args.input)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("xlsx") => "xlsx".to_string(),
        _ => "csv".to_string(),
    }
}

fn methods(args: &Args) -> RcvResult<Vec<VotingMethod>> {
    match args.method.as_deref() {
        None | Some("both") => Ok(vec![VotingMethod::InstantRunoff, VotingMethod::Tideman]),
        Some("irv") => Ok(vec![VotingMethod::InstantRunoff]),
        Some("tideman") => Ok(vec![VotingMethod::Tideman]),
        Some(x) => whatever!("Unknown counting method {:?} (expected irv, tideman or both)", x),
    }
}

// A seed that changes from one run to the next, for counts that do not ask for one.
fn clock_seed() -> u32 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (now.as_secs() as u32) ^ now.subsec_nanos()
}

fn vote_rules(args: &Args) -> (VoteRules, Option<u32>) {
    if args.strict_ties {
        return (
            VoteRules {
                tiebreak_mode: TieBreakMode::Strict,
            },
            None,
        );
    }
    let seed = match args.seed {
        Some(s) => s,
        None => {
            let s = clock_seed();
            info!("No seed provided, using seed {} for random tie-breaks", s);
            s
        }
    };
    (
        VoteRules {
            tiebreak_mode: TieBreakMode::Random(seed),
        },
        Some(seed),
    )
}

pub fn read_summary(path: &str) -> RcvResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    debug!("read content: {:?}", contents);
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn run_election(args: &Args) -> RcvResult<()> {
    let input_type = input_type(args);
    let settings = SurveySettings {
        question: args.question.clone(),
        id_column: args.id_column.clone(),
        excel_worksheet_name: args.excel_worksheet_name.clone(),
    };
    info!("Reading {} survey {:?}", input_type, args.input);
    let election = io_survey::read_survey(&args.input, &input_type, &settings)?;
    info!(
        "Loaded {} voters, candidates: {:?}",
        election.num_voters(),
        election.candidates()
    );

    let methods = methods(args)?;
    let (rules, seed) = vote_rules(args);
    let pause = Duration::from_millis(args.pause_ms.unwrap_or(0));

    let first_tally = interim_tally(&election).context(CountingSnafu {
        method: methods[0],
    })?;
    report::print_tally("First preferences", &first_tally);

    let mut results: Vec<VotingResult> = Vec::new();
    for method in methods {
        thread::sleep(pause);
        let res = match method {
            VotingMethod::InstantRunoff => run_irv(&election, &rules),
            VotingMethod::Tideman => run_tideman(&election, &rules),
        }
        .context(CountingSnafu { method })?;
        report::print_result(&res, pause);
        results.push(res);
    }

    let config = SummaryConfig {
        input: args.input.clone(),
        seed,
        tiebreak: if args.strict_ties { "strict" } else { "random" }.to_string(),
    };
    let summary_js = report::build_summary_js(&config, &results);
    let pretty_js_stats = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;

    match args.out.as_deref() {
        None | Some("") => {}
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(path) => {
            fs::write(path, &pretty_js_stats).context(WritingSummarySnafu { path })?;
            info!("Summary written to {:?}", path);
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = args.reference.as_deref() {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
        info!("The summary matches the reference {:?}", summary_p);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ROUTES: &str = "\
Name,Q [r1],Q [r2],Q [r3],Q [r4],Q [r5],Q [r6],Q [r7]
Ike,1,3,4,6,5,2,7
Jochem,4,5,1,2,7,3,6
Jesse,2,1,4,5,3,7,6
Piotr,6,3,1,4,2,7,5
Melina,2,6,5,1,3,4,7
";

    fn test_args(input: &str) -> Args {
        Args {
            input: input.to_string(),
            input_type: None,
            excel_worksheet_name: None,
            question: None,
            id_column: Some("Name".to_string()),
            method: None,
            seed: Some(3),
            strict_ties: false,
            pause_ms: None,
            out: None,
            reference: None,
            verbose: false,
        }
    }

    fn write_file(dir: &Path, name: &str, contents: &str) -> String {
        let p = dir.join(name);
        fs::write(&p, contents).unwrap();
        p.to_str().unwrap().to_string()
    }

    #[test]
    fn summary_matches_reference() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(dir.path(), "routes.csv", ROUTES);
        let out = dir.path().join("summary.json").to_str().unwrap().to_string();

        let mut args = test_args(&input);
        args.out = Some(out.clone());
        assert!(run_election(&args).is_ok());

        let summary = read_summary(&out).unwrap();
        assert_eq!(summary["config"]["seed"], json!(3));
        assert_eq!(summary["config"]["tiebreak"], json!("random"));
        assert_eq!(summary["results"][0]["method"], json!("instant-runoff"));
        assert_eq!(summary["results"][0]["winner"], json!("r1"));
        assert_eq!(summary["results"][1]["method"], json!("tideman"));
        assert_eq!(summary["results"][1]["winner"], json!("r1"));

        let mut args = test_args(&input);
        args.reference = Some(out);
        assert!(run_election(&args).is_ok());
    }

    #[test]
    fn summary_differs_from_reference() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(dir.path(), "routes.csv", ROUTES);
        let out = dir.path().join("summary.json").to_str().unwrap().to_string();

        let mut args = test_args(&input);
        args.out = Some(out.clone());
        assert!(run_election(&args).is_ok());

        let mut summary = read_summary(&out).unwrap();
        summary["results"][0]["winner"] = json!("r2");
        let reference = write_file(
            dir.path(),
            "reference.json",
            &serde_json::to_string_pretty(&summary).unwrap(),
        );
        let mut args = test_args(&input);
        args.reference = Some(reference);
        assert!(matches!(
            run_election(&args),
            Err(RcvError::Whatever { .. })
        ));
    }

    #[test]
    fn incomplete_survey_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(dir.path(), "poll.csv", "Name,Q [a],Q [b]\nAna,1,2\nBen,1,\n");
        assert!(matches!(
            run_election(&test_args(&input)),
            Err(RcvError::IncompleteBallot { lineno: 3, .. })
        ));
    }

    #[test]
    fn strict_ties_stop_the_count() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(dir.path(), "routes.csv", ROUTES);
        let mut args = test_args(&input);
        args.strict_ties = true;
        args.method = Some("irv".to_string());
        assert!(matches!(
            run_election(&args),
            Err(RcvError::Counting {
                method: VotingMethod::InstantRunoff,
                source: VotingErrors::UnresolvedTie(_),
            })
        ));
    }

    #[test]
    fn method_selection() {
        let mut args = test_args("poll.csv");
        assert_eq!(
            methods(&args).unwrap(),
            vec![VotingMethod::InstantRunoff, VotingMethod::Tideman]
        );
        args.method = Some("tideman".to_string());
        assert_eq!(methods(&args).unwrap(), vec![VotingMethod::Tideman]);
        args.method = Some("borda".to_string());
        assert!(matches!(methods(&args), Err(RcvError::Whatever { .. })));
    }

    #[test]
    fn rules_from_args() {
        let mut args = test_args("poll.csv");
        args.seed = Some(7);
        let (rules, seed) = vote_rules(&args);
        assert_eq!(rules.tiebreak_mode, TieBreakMode::Random(7));
        assert_eq!(seed, Some(7));

        args.strict_ties = true;
        let (rules, seed) = vote_rules(&args);
        assert_eq!(rules.tiebreak_mode, TieBreakMode::Strict);
        assert_eq!(seed, None);

        args.strict_ties = false;
        args.seed = None;
        let (rules, seed) = vote_rules(&args);
        assert!(seed.is_some());
        assert_eq!(rules.tiebreak_mode, TieBreakMode::Random(seed.unwrap()));
    }

    #[test]
    fn input_type_from_extension() {
        let mut args = test_args("poll.XLSX");
        assert_eq!(input_type(&args), "xlsx");
        args.input = "poll.txt".to_string();
        assert_eq!(input_type(&args), "csv");
        args.input_type = Some("xlsx".to_string());
        assert_eq!(input_type(&args), "xlsx");
    }
}
