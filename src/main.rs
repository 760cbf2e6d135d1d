use clap::Parser;
use instant::Duration;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use crossword_csp::errors::ParseError;
use crossword_csp::parse::load_crossword;
use crossword_csp::render::render_grid;
use crossword_csp::{find_fill, FillFailure, FillOptions, SearchLimits};

/// Fill a crossword structure with words from a word list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Structure file: one row per line, '_' for open cells, anything else for blocks
    structure: PathBuf,

    /// Word list file, one word per line
    words: PathBuf,

    /// Also write the filled grid to this file
    output: Option<PathBuf>,

    /// Re-run arc consistency after every tentative assignment
    #[arg(long)]
    maintain_arc_consistency: bool,

    /// Give up after exploring this many search states
    #[arg(long)]
    max_states: Option<u64>,

    /// Give up after this many seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// Enable debug logging (same as setting CROSSWORD_DEBUG)
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let debug_enabled = cli.debug || std::env::var("CROSSWORD_DEBUG").is_ok();
    crossword_csp::log::init_logger(debug_enabled);

    if let Err(e) = try_main(&cli) {
        if let Some(parse_err) = e.downcast_ref::<ParseError>() {
            eprintln!("Error: {}", parse_err.display_detailed());
        } else {
            eprintln!("Error: {e}");
        }
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Convert `--time-limit` seconds into a `Duration`. Negative, NaN and out-of-range values are
/// rejected.
fn time_limit_from_secs(secs: Option<f64>) -> Result<Option<Duration>, String> {
    match secs {
        Some(secs) => Duration::try_from_secs_f64(secs)
            .map(Some)
            .map_err(|_| format!("Invalid time limit: {secs}")),
        None => Ok(None),
    }
}

/// Load the puzzle, fill it, and print the result. Running out of words is a normal outcome
/// ("No solution."); bad input files and exhausted search limits are errors.
fn try_main(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let time_limit = time_limit_from_secs(cli.time_limit)?;

    let crossword = load_crossword(&cli.structure, &cli.words)?;
    log::info!(
        "Loaded a {}x{} grid with {} slots and {} words",
        crossword.height(),
        crossword.width(),
        crossword.variables().len(),
        crossword.word_list().len(),
    );

    let options = FillOptions {
        maintain_arc_consistency: cli.maintain_arc_consistency,
        limits: SearchLimits { max_states: cli.max_states, time_limit },
    };

    match find_fill(&crossword, &options) {
        Ok(result) => {
            log::info!("{:?}", result.statistics);

            let display_grid = render_grid(&crossword, &result.assignment);
            println!("{display_grid}");

            if let Some(output) = &cli.output {
                fs::write(output, format!("{display_grid}\n"))?;
                log::info!("Wrote {}", output.display());
            }
            Ok(())
        }
        Err(failure @ FillFailure::ExhaustedBudget { .. }) => Err(failure.into()),
        Err(failure) => {
            log::info!("{failure}");
            println!("No solution.");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use instant::Duration;

    use super::time_limit_from_secs;

    #[test]
    fn test_time_limit_from_secs() {
        assert_eq!(time_limit_from_secs(None), Ok(None));
        assert_eq!(time_limit_from_secs(Some(1.5)), Ok(Some(Duration::from_millis(1500))));
        assert_eq!(time_limit_from_secs(Some(0.0)), Ok(Some(Duration::ZERO)));
    }

    #[test]
    fn test_time_limit_out_of_range() {
        let error = time_limit_from_secs(Some(1e30)).unwrap_err();
        assert!(error.starts_with("Invalid time limit: "));

        assert!(time_limit_from_secs(Some(-1.0)).is_err());
        assert!(time_limit_from_secs(Some(f64::NAN)).is_err());
        assert!(time_limit_from_secs(Some(f64::INFINITY)).is_err());
    }
}
