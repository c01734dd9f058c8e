/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command, value_parser};

use g3_addrlist::{AddressList, DEFAULT_DELIMITER, VL_PORT, VL_SERVICE_ID, parse_text_addrs};

pub const COMMAND: &str = "parse";

const COMMAND_ARG_TEXT: &str = "text";
const COMMAND_ARG_DELIMITER: &str = "delimiter";
const COMMAND_ARG_SERVICE: &str = "service";
const COMMAND_ARG_PORT: &str = "port";

pub fn command() -> Command {
    Command::new(COMMAND)
        .about("Parse a delimited address text and show the sorted list")
        .arg(
            Arg::new(COMMAND_ARG_TEXT)
                .help("Address text, like 10.0.0.1,[::1]+7000")
                .value_name("TEXT")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_DELIMITER)
                .help("Delimiter between addresses, default to ':'")
                .value_name("CHAR")
                .long(COMMAND_ARG_DELIMITER)
                .short('d')
                .num_args(1)
                .value_parser(value_parser!(char)),
        )
        .arg(
            Arg::new(COMMAND_ARG_SERVICE)
                .help("Service id of every address")
                .value_name("SERVICE ID")
                .long(COMMAND_ARG_SERVICE)
                .num_args(1)
                .value_parser(value_parser!(u16)),
        )
        .arg(
            Arg::new(COMMAND_ARG_PORT)
                .help("Port for addresses without one")
                .value_name("PORT")
                .long(COMMAND_ARG_PORT)
                .short('p')
                .num_args(1)
                .value_parser(value_parser!(u16)),
        )
}

pub(crate) fn show_list(alist: &AddressList) {
    println!(
        "# {} addresses, {} ipv4, {} ipv6, preferred {}",
        alist.len(),
        alist.nr_ipv4(),
        alist.nr_ipv6(),
        alist.preferred_index()
    );
    for (i, ep) in alist.iter().enumerate() {
        println!("[{i}] {ep}");
    }
}

fn get_delimiter(args: &ArgMatches) -> anyhow::Result<u8> {
    match args.get_one::<char>(COMMAND_ARG_DELIMITER) {
        Some(c) if c.is_ascii() => Ok(*c as u8),
        Some(c) => Err(anyhow!("delimiter {c} is not an ascii char")),
        None => Ok(DEFAULT_DELIMITER),
    }
}

pub fn run(args: &ArgMatches) -> anyhow::Result<()> {
    let Some(text) = args.get_one::<String>(COMMAND_ARG_TEXT) else {
        return Err(anyhow!("no address text set"));
    };
    let delimiter = get_delimiter(args)?;
    let service_id = args
        .get_one::<u16>(COMMAND_ARG_SERVICE)
        .copied()
        .unwrap_or(VL_SERVICE_ID);
    let port = args
        .get_one::<u16>(COMMAND_ARG_PORT)
        .copied()
        .unwrap_or(VL_PORT);

    let alist = parse_text_addrs(text, delimiter, service_id, port)
        .map_err(|e| anyhow!("failed to parse {text}: {e}"))?;
    show_list(&alist);
    Ok(())
}
