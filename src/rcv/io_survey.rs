// Readers for survey exports (one row per voter, one column per candidate).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook, DataType, Reader, Xlsx};
use route_voting::builder::Builder;
use snafu::prelude::*;

use crate::rcv::*;

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SurveySettings {
    pub question: Option<String>,
    pub id_column: Option<String>,
    pub excel_worksheet_name: Option<String>,
}

pub fn read_survey(
    path: &str,
    input_type: &str,
    settings: &SurveySettings,
) -> RcvResult<ElectionState> {
    let rows = match input_type {
        "csv" => {
            let f = File::open(path).context(OpeningFileSnafu { path })?;
            read_csv_rows(f, path)?
        }
        "xlsx" => read_xlsx_rows(path, settings)?,
        x => whatever!("Input type {:?} not supported (expected csv or xlsx)", x),
    };
    election_from_rows(&rows, settings, &simplify_file_name(path))
}

fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

fn read_csv_rows<R: Read>(reader: R, path: &str) -> RcvResult<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in rdr.records() {
        let record = record.context(ReadingCsvSnafu { path })?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }
    Ok(rows)
}

fn read_xlsx_rows(path: &str, settings: &SurveySettings) -> RcvResult<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match settings.excel_worksheet_name.as_deref() {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptySurveySnafu {})?,
    }
    .context(OpeningExcelSnafu { path })?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, row) in wrange.rows().enumerate() {
        let mut cells: Vec<String> = Vec::new();
        for cell in row.iter() {
            let s = match cell {
                DataType::Empty => "".to_string(),
                DataType::String(s) => s.clone(),
                DataType::Int(i) => i.to_string(),
                DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
                DataType::Float(f) => f.to_string(),
                DataType::Bool(b) => b.to_string(),
                _ => {
                    return Err(RcvError::ExcelWrongCellType {
                        lineno: idx + 1,
                        content: format!("{:?}", cell),
                    });
                }
            };
            cells.push(s);
        }
        rows.push(cells);
    }
    Ok(rows)
}

// The candidate named by a ranking column, if the column is one.
fn candidate_from_header(header: &str, question: Option<&str>) -> Option<String> {
    let header = header.trim();
    let name = match question {
        Some(q) => {
            let rest = header.strip_prefix(q.trim())?;
            bracketed(rest).unwrap_or(rest)
        }
        None => bracketed(header)?,
    };
    let name = name.trim_matches(|c: char| c.is_whitespace() || "[]:-".contains(c));
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn bracketed(header: &str) -> Option<&str> {
    let inner = header.trim_end().strip_suffix(']')?;
    let start = inner.rfind('[')?;
    Some(inner[start + 1..].trim())
}

// The first number in the cell, or None if the cell is blank.
fn parse_rank(cell: &str, lineno: usize) -> RcvResult<Option<u32>> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    let digits: String = cell
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits
        .parse::<u32>()
        .ok()
        .map(Some)
        .context(UnreadableRankSnafu {
            lineno,
            content: cell,
        })
}

/// Turns the rows of a survey export into an election.
///
/// The first row is the header. Rows where every cell is blank are skipped.
pub fn election_from_rows(
    rows: &[Vec<String>],
    settings: &SurveySettings,
    source_name: &str,
) -> RcvResult<ElectionState> {
    let header = rows.first().context(EmptySurveySnafu {})?;
    debug!("election_from_rows: header: {:?}", header);

    let columns: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| {
            candidate_from_header(h, settings.question.as_deref()).map(|c| (idx, c))
        })
        .collect();
    ensure!(
        !columns.is_empty(),
        NoRankingColumnsSnafu {
            header: header.clone()
        }
    );
    debug!("election_from_rows: ranking columns: {:?}", columns);

    let id_idx: Option<usize> = match settings.id_column.as_deref() {
        Some(name) => Some(
            header
                .iter()
                .position(|h| h.trim() == name.trim())
                .context(MissingColumnSnafu { name })?,
        ),
        None => None,
    };

    let candidates: Vec<String> = columns.iter().map(|(_, c)| c.clone()).collect();
    let mut builder = Builder::new()
        .candidates(&candidates)
        .context(InvalidCandidatesSnafu {})?;

    for (idx, row) in rows.iter().enumerate().skip(1) {
        // Line numbers start at 1, like in a spreadsheet.
        let lineno = idx + 1;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            debug!("election_from_rows: skipping blank line {}", lineno);
            continue;
        }

        let name = match id_idx.and_then(|i| row.get(i)) {
            Some(n) if !n.trim().is_empty() => n.trim().to_string(),
            _ => format!("{}:{}", source_name, lineno),
        };

        let mut answers: Vec<(String, u32)> = Vec::new();
        for (col_idx, cand) in columns.iter() {
            let cell = row.get(*col_idx).map(|s| s.as_str()).unwrap_or("");
            if let Some(rank) = parse_rank(cell, lineno)? {
                answers.push((cand.clone(), rank));
            }
        }
        ensure!(!answers.is_empty(), EmptyBallotSnafu { lineno });
        let missing: Vec<String> = candidates
            .iter()
            .filter(|c| !answers.iter().any(|(a, _)| a == *c))
            .cloned()
            .collect();
        ensure!(missing.is_empty(), IncompleteBallotSnafu { lineno, missing });

        builder
            .add_ranked_answers(&name, &answers)
            .context(InvalidBallotSnafu { lineno })?;
    }

    builder.build().context(InvalidCandidatesSnafu {})
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLL: &str = "\
Timestamp,Name,Which route do you prefer? [r1],Which route do you prefer? [r2],Which route do you prefer? [r3]
2024/05/01 10:00,Ike,1st choice,3rd choice,2nd choice
2024/05/01 10:05,Jesse,2,1,3
,,,,
2024/05/01 10:07,,3,2,1
";

    fn rows(text: &str) -> Vec<Vec<String>> {
        read_csv_rows(text.as_bytes(), "test.csv").unwrap()
    }

    #[test]
    fn reads_rankings() {
        let settings = SurveySettings {
            id_column: Some("Name".to_string()),
            ..Default::default()
        };
        let election = election_from_rows(&rows(POLL), &settings, "poll.csv").unwrap();
        assert_eq!(election.candidates(), &["r1", "r2", "r3"]);
        assert_eq!(election.num_voters(), 3);
        let voters = election.voters();
        assert_eq!(voters[0].name, "Ike");
        assert_eq!(voters[0].ranking, vec!["r1", "r3", "r2"]);
        assert_eq!(voters[1].ranking, vec!["r2", "r1", "r3"]);
        assert_eq!(voters[2].name, "poll.csv:5");
        assert_eq!(voters[2].ranking, vec!["r3", "r2", "r1"]);
    }

    #[test]
    fn headers_are_stripped() {
        assert_eq!(
            candidate_from_header("Rank the routes [North loop]", None),
            Some("North loop".to_string())
        );
        assert_eq!(candidate_from_header("Timestamp", None), None);
        assert_eq!(
            candidate_from_header("Rank the routes - r4", Some("Rank the routes")),
            Some("r4".to_string())
        );
        assert_eq!(
            candidate_from_header("Rank the routes [r4]", Some("Rank the routes")),
            Some("r4".to_string())
        );
        assert_eq!(candidate_from_header("Name", Some("Rank the routes")), None);
    }

    #[test]
    fn ranks_are_parsed() {
        assert_eq!(parse_rank(" 3 ", 1).unwrap(), Some(3));
        assert_eq!(parse_rank("Choice #2", 1).unwrap(), Some(2));
        assert_eq!(parse_rank("", 1).unwrap(), None);
        assert!(matches!(
            parse_rank("first", 7),
            Err(RcvError::UnreadableRank { lineno: 7, .. })
        ));
    }

    #[test]
    fn gaps_fail_fast() {
        let text = "Name,Q [a],Q [b],Q [c]\nAna,1,4,2\n";
        let r = election_from_rows(&rows(text), &SurveySettings::default(), "poll.csv");
        assert!(matches!(r, Err(RcvError::InvalidBallot { lineno: 2, .. })));
    }

    #[test]
    fn huge_ranks_fail() {
        let text = "Name,Q [a],Q [b]\nAna,1,4294967295\n";
        let r = election_from_rows(&rows(text), &SurveySettings::default(), "poll.csv");
        assert!(matches!(r, Err(RcvError::InvalidBallot { lineno: 2, .. })));
    }

    #[test]
    fn incomplete_ballots_fail() {
        let text = "Name,Q [a],Q [b],Q [c]\nAna,1,2,3\nBen,,,1\n";
        let r = election_from_rows(&rows(text), &SurveySettings::default(), "poll.csv");
        match r {
            Err(RcvError::IncompleteBallot { lineno, missing }) => {
                assert_eq!(lineno, 3);
                assert_eq!(missing, vec!["a", "b"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn empty_ballots_fail() {
        let text = "Name,Q [a],Q [b]\nAna,,\nBen,1,2\n";
        let r = election_from_rows(&rows(text), &SurveySettings::default(), "poll.csv");
        assert!(matches!(r, Err(RcvError::EmptyBallot { lineno: 2 })));
    }

    #[test]
    fn missing_columns() {
        let text = "Name,Age\nAna,3\n";
        let r = election_from_rows(&rows(text), &SurveySettings::default(), "poll.csv");
        assert!(matches!(r, Err(RcvError::NoRankingColumns { .. })));

        let settings = SurveySettings {
            id_column: Some("Voter".to_string()),
            ..Default::default()
        };
        let text = "Name,Q [a]\nAna,1\n";
        let r = election_from_rows(&rows(text), &settings, "poll.csv");
        assert!(matches!(r, Err(RcvError::MissingColumn { .. })));
    }

    #[test]
    fn survey_to_winner() {
        let text = "\
Name,Q [r1],Q [r2],Q [r3],Q [r4],Q [r5],Q [r6],Q [r7]
Ike,1,3,4,6,5,2,7
Jochem,4,5,1,2,7,3,6
Jesse,2,1,4,5,3,7,6
Piotr,6,3,1,4,2,7,5
Melina,2,6,5,1,3,4,7
";
        let settings = SurveySettings {
            id_column: Some("Name".to_string()),
            ..Default::default()
        };
        let election = election_from_rows(&rows(text), &settings, "poll.csv").unwrap();
        assert_eq!(
            election.voters()[1].ranking,
            vec!["r3", "r4", "r6", "r1", "r2", "r7", "r5"]
        );
        let rules = VoteRules::DEFAULT_RULES;
        assert_eq!(resolve_by_irv(&election, &rules), Ok("r1".to_string()));
        assert_eq!(resolve_by_tideman(&election, &rules), Ok("r1".to_string()));
    }
}
