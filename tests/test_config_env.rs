//! Environment fallbacks for the CLI.
//!
//! Mutating the process environment is only sound while no other thread
//! reads it, so this binary holds a single test.

use clap::Parser;
use quill::config::{Cli, Config};

#[test]
fn test_config_workers_from_env() {
    // SAFETY: the only test in this binary; no other thread touches the environment.
    unsafe {
        std::env::set_var("QUILL_WORKERS", "3");
    }
    let cli = Cli::try_parse_from(["quill"]).unwrap();
    unsafe {
        std::env::remove_var("QUILL_WORKERS");
    }

    assert_eq!(cli.workers, Some(3));
    assert_eq!(Config::load(&cli).unwrap().server.workers, 3);
}
