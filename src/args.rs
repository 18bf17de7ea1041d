use clap::Parser;

/// This is a tabulation program for ranked route polls.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The survey export containing the rankings.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (csv or xlsx) The type of the input. By default, it is guessed from the file extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: first worksheet) When using an Excel file, the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (text, optional) The question text that starts the header of every ranking column.
    /// If not provided, every column whose header ends with a bracketed name is a ranking column.
    #[clap(long, value_parser)]
    pub question: Option<String>,

    /// (header name, optional) The column containing the name of the voter.
    #[clap(long, value_parser)]
    pub id_column: Option<String>,

    /// (irv, tideman or both; default both) The counting method.
    #[clap(long, value_parser)]
    pub method: Option<String>,

    /// (number, optional) The seed of the random tie-break. If not provided, a seed is picked
    /// from the clock and printed in the logs.
    #[clap(long, value_parser)]
    pub seed: Option<u32>,

    /// If passed as an argument, ties that the Copeland score cannot break stop the count
    /// instead of being drawn at random.
    #[clap(long, takes_value = false)]
    pub strict_ties: bool,

    /// (milliseconds, default 0) Pause between the rounds when printing the results.
    #[clap(long, value_parser)]
    pub pause_ms: Option<u64>,

    /// (file path, 'stdout' or empty) If specified, the summary of the count will be written
    /// in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the summary of a count in JSON format. If provided,
    /// routevote will check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
