//! # Arena Runner
//!
//! Entry point for the `arena` binary: load an environment specification,
//! run one or more rollouts with a built-in policy, and print the results as
//! JSON. With `--watch` the run repeats whenever the specification changes.

use anyhow::Result;
use arena::app::{self, Args};
use clap::Parser;

fn main() -> Result<()> {
    app::run(&Args::parse())
}
