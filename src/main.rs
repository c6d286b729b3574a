//! Inventory valuation CLI
//!
//! Values every product of a catalog over a date window and writes the report
//! as CSV to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --products products.csv --start 2024-01-01 --end 2024-12-31 transactions.csv
//! cargo run -- --method FIFO --strategy sync --products products.csv \
//!     --start 2024-01-01 --end 2024-03-31 transactions.csv > report.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 --log-format json \
//!     --products products.csv --start 2024-01-01 --end 2024-12-31 transactions.csv
//! ```
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (invalid window, file not found, unmatched exit in strict mode, etc.)

use inventory_valuation::{cli, logging, strategy};
use std::process;
use tracing::error;

fn main() {
    let args = cli::parse_args();
    logging::init(args.log_format);

    let request = match args.to_request() {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, "invalid arguments");
            process::exit(1);
        }
    };

    let strategy = {
        let config = matches!(args.strategy, cli::StrategyType::Async)
            .then(|| args.to_batch_config());
        strategy::create_strategy(args.strategy, config)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.run(&request, &mut output) {
        error!(error = %e, "report failed");
        process::exit(1);
    }
}
