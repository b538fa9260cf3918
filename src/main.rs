//! rqlfilter CLI entry point
//!
//! Parses arguments and dispatches through [`cli::run`]; the process exits
//! non-zero on failure.

use rqlfilter::cli;

fn main() {
    std::process::exit(cli::run());
}
