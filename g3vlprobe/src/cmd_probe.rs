/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint, value_parser};
use log::{info, warn};

use g3_addrlist::{AddrListError, Endpoint, ServerGroup, ServerGroupConfig};

use super::cmd_parse::show_list;
use super::config::ProbeConfig;

pub const COMMAND: &str = "probe";

const COMMAND_ARG_CONFIG_FILE: &str = "config-file";
const COMMAND_ARG_GROUP: &str = "group";
const COMMAND_ARG_RESPOND: &str = "respond";
const COMMAND_ARG_ROUNDS: &str = "rounds";

pub fn command() -> Command {
    Command::new(COMMAND)
        .about("Resolve server groups and walk their address cursors")
        .arg(
            Arg::new(COMMAND_ARG_CONFIG_FILE)
                .help("Config file in yaml format")
                .value_name("CONFIG FILE")
                .long(COMMAND_ARG_CONFIG_FILE)
                .short('c')
                .num_args(1)
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new(COMMAND_ARG_GROUP)
                .help("Only probe the server group with this name")
                .value_name("NAME")
                .long(COMMAND_ARG_GROUP)
                .short('g')
                .num_args(1),
        )
        .arg(
            Arg::new(COMMAND_ARG_RESPOND)
                .help("Address that should be treated as responding")
                .value_name("ADDR")
                .long(COMMAND_ARG_RESPOND)
                .short('r')
                .action(ArgAction::Append)
                .value_parser(value_parser!(SocketAddr)),
        )
        .arg(
            Arg::new(COMMAND_ARG_ROUNDS)
                .help("Number of calls to simulate for each server group")
                .value_name("COUNT")
                .long(COMMAND_ARG_ROUNDS)
                .short('n')
                .num_args(1)
                .value_parser(value_parser!(usize))
                .default_value("1"),
        )
}

struct Round {
    visited: Vec<Endpoint>,
    answered: Option<Endpoint>,
    release: Result<(), AddrListError>,
}

/// Simulate one call: try every endpoint from the sticky one on, stop at the
/// first one in `respond`.
fn call_once(group: &ServerGroup, respond: &[SocketAddr]) -> Result<Round, AddrListError> {
    let mut cursor = group.vl_cursor()?;

    let mut visited = Vec::new();
    let mut answered = None;
    while cursor.iterate() {
        let Some(ep) = cursor.addr().copied() else {
            break;
        };
        visited.push(ep);
        if respond.contains(&ep.addr()) {
            cursor.mark_responded();
            answered = Some(ep);
            break;
        }
    }

    let release = cursor.release();
    Ok(Round {
        visited,
        answered,
        release,
    })
}

fn probe_group(
    config: &ServerGroupConfig,
    probe_config: &ProbeConfig,
    respond: &[SocketAddr],
    rounds: usize,
) -> anyhow::Result<()> {
    println!("# server group {}", config.name());
    let group = ServerGroup::new(config.clone());
    if let Err(e) = group.update_vl_addrs(probe_config.resolver()) {
        warn!("lookup for server group {} failed: {e}", config.name());
    }
    match group.load_vl_addrs() {
        Some(alist) => show_list(&alist),
        None => println!("# no address list installed"),
    }

    for i in 0..rounds {
        let round = match call_once(&group, respond) {
            Ok(round) => round,
            Err(e) => {
                println!("round {i}: {e}");
                continue;
            }
        };

        let path = round
            .visited
            .iter()
            .map(|ep| ep.to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        match (round.answered, round.release) {
            (Some(ep), Ok(())) => println!("round {i}: {path}, answered by {ep}"),
            (_, Err(e)) => println!("round {i}: {path}, {e}"),
            (None, Ok(())) => println!("round {i}: {path}"),
        }
        if let Some(alist) = group.load_vl_addrs() {
            println!("round {i}: preferred index {}", alist.preferred_index());
        }
    }

    let snap = group.stats().snapshot();
    info!(
        "server group {}: {} lookups, {} failed, {} cursors, {} without destination",
        config.name(),
        snap.lookup_total,
        snap.lookup_failed,
        snap.cursor_total,
        snap.cursor_no_dest
    );
    Ok(())
}

pub fn run(args: &ArgMatches) -> anyhow::Result<()> {
    let Some(path) = args.get_one::<PathBuf>(COMMAND_ARG_CONFIG_FILE) else {
        return Err(anyhow!("no config file set"));
    };
    let probe_config = ProbeConfig::load(path)?;

    let respond: Vec<SocketAddr> = args
        .get_many::<SocketAddr>(COMMAND_ARG_RESPOND)
        .map(|v| v.copied().collect())
        .unwrap_or_default();
    let rounds = args.get_one::<usize>(COMMAND_ARG_ROUNDS).copied().unwrap_or(1);

    if let Some(name) = args.get_one::<String>(COMMAND_ARG_GROUP) {
        let Some(config) = probe_config.find_group(name) else {
            return Err(anyhow!("no server group named {name} found"));
        };
        probe_group(config, &probe_config, &respond, rounds)
    } else {
        if probe_config.groups().is_empty() {
            return Err(anyhow!("no server group configured"));
        }
        for config in probe_config.groups() {
            probe_group(config, &probe_config, &respond, rounds)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use g3_addrlist::StaticRecordResolver;
    use std::str::FromStr;
    use std::time::Duration;

    fn resolved_group(text: &str) -> ServerGroup {
        let mut resolver = StaticRecordResolver::new();
        resolver.insert("example.org", text, Duration::from_secs(60));
        let group = ServerGroup::new(ServerGroupConfig::new("example.org"));
        group.update_vl_addrs(&resolver).unwrap();
        group
    }

    #[test]
    fn sticky_rounds() {
        let group = resolved_group("10.0.0.1,10.0.0.2,10.0.0.3");
        let respond = [SocketAddr::from_str("10.0.0.3:7003").unwrap()];

        let round = call_once(&group, &respond).unwrap();
        assert_eq!(round.visited.len(), 3);
        assert_eq!(round.answered.unwrap().addr(), respond[0]);
        assert_eq!(round.release, Ok(()));

        let round = call_once(&group, &respond).unwrap();
        assert_eq!(round.visited.len(), 1);
        assert_eq!(round.answered.unwrap().addr(), respond[0]);
        assert_eq!(group.load_vl_addrs().unwrap().preferred_index(), 2);
    }

    #[test]
    fn nobody_answers() {
        let group = resolved_group("10.0.0.1,[::1]");
        let round = call_once(&group, &[]).unwrap();
        assert_eq!(round.visited.len(), 2);
        assert!(round.answered.is_none());
        assert_eq!(round.release, Err(AddrListError::NoDestination));
    }

    #[test]
    fn cli_args() {
        let args = command().get_matches_from([
            "probe", "-c", "a.yaml", "-r", "10.0.0.1:7003", "-r", "[::1]:7003", "-n", "3",
        ]);
        assert_eq!(args.get_many::<SocketAddr>(COMMAND_ARG_RESPOND).unwrap().count(), 2);
        assert_eq!(args.get_one::<usize>(COMMAND_ARG_ROUNDS), Some(&3));

        assert!(command().try_get_matches_from(["probe"]).is_err());
        assert!(
            command()
                .try_get_matches_from(["probe", "-c", "a.yaml", "-r", "10.0.0.1"])
                .is_err()
        );
    }
}
