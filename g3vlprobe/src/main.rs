/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use clap::{Arg, ArgAction, Command};

mod config;
mod logger;

mod cmd_parse;
mod cmd_probe;

const GLOBAL_ARG_VERBOSE: &str = "verbose";

fn build_cli_args() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::new(GLOBAL_ARG_VERBOSE)
                .help("Show verbose message")
                .num_args(0)
                .action(ArgAction::Count)
                .short('v')
                .long(GLOBAL_ARG_VERBOSE)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(cmd_parse::command())
        .subcommand(cmd_probe::command())
}

fn main() -> anyhow::Result<()> {
    let args = build_cli_args().get_matches();

    let verbose_level = args
        .get_one::<u8>(GLOBAL_ARG_VERBOSE)
        .copied()
        .unwrap_or_default();
    let _log_guard = logger::setup(verbose_level)?;

    if let Some((subcommand, args)) = args.subcommand() {
        match subcommand {
            cmd_parse::COMMAND => cmd_parse::run(args),
            cmd_probe::COMMAND => cmd_probe::run(args),
            cmd => Err(anyhow!("invalid subcommand {cmd}")),
        }
    } else {
        Err(anyhow!("no subcommand found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_verify() {
        build_cli_args().debug_assert();
    }

    #[test]
    fn verbose_level() {
        let args = build_cli_args().get_matches_from(["g3vlprobe", "parse", "-vv", "10.0.0.1"]);
        assert_eq!(args.get_one::<u8>(GLOBAL_ARG_VERBOSE), Some(&2));
        assert_eq!(args.subcommand_name(), Some(cmd_parse::COMMAND));
    }
}
