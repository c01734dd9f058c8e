/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use humanize_rs::ParseError;
use yaml_rust::{Yaml, yaml};

use super::{ServerGroupConfig, StaticRecordResolver};

const DEFAULT_STATIC_RECORD_TTL: Duration = Duration::from_secs(300);

/// Config keys are case insensitive, and '-' is the same as '_'.
pub fn normalize_key(raw: &str) -> String {
    raw.chars()
        .map(|c| if c == '-' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}

/// Call `f` on every entry of a map with string keys, the error of `f` gets
/// the key name attached.
pub fn foreach_kv<F>(map: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    map.iter().try_for_each(|(k, v)| {
        let Yaml::String(key) = k else {
            return Err(anyhow!("map key {k:?} is not a string"));
        };
        f(key, v).with_context(|| format!("invalid value for key {key}"))
    })
}

fn as_string(v: &Yaml) -> anyhow::Result<String> {
    match v {
        Yaml::String(s) => Ok(s.to_string()),
        Yaml::Integer(i) => Ok(i.to_string()),
        _ => Err(anyhow!(
            "yaml value type for 'string' should be 'string' or 'integer'"
        )),
    }
}

fn as_u16(v: &Yaml) -> anyhow::Result<u16> {
    match v {
        Yaml::String(s) => Ok(u16::from_str(s)?),
        Yaml::Integer(i) => Ok(u16::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'u16' should be 'string' or 'integer'"
        )),
    }
}

fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::String(value) => match humanize_rs::duration::parse(value) {
            Ok(v) => Ok(v),
            Err(ParseError::MissingUnit) => {
                let u = u64::from_str(value).map_err(|_| anyhow!("invalid duration string"))?;
                Ok(Duration::from_secs(u))
            }
            Err(e) => Err(anyhow!("invalid humanize duration string: {e}")),
        },
        Yaml::Integer(value) => {
            let u = u64::try_from(*value).map_err(|_| anyhow!("negative duration value"))?;
            Ok(Duration::from_secs(u))
        }
        _ => Err(anyhow!(
            "yaml value type for humanize duration should be 'string' or 'integer'"
        )),
    }
}

impl ServerGroupConfig {
    pub fn parse_yaml(map: &yaml::Hash) -> anyhow::Result<Self> {
        let name_v = map
            .get(&Yaml::String("name".to_string()))
            .ok_or_else(|| anyhow!("no required key name found in this map"))?;
        let name = as_string(name_v).context("invalid value for key name")?;
        if name.is_empty() {
            return Err(anyhow!("empty server group name"));
        }

        let mut config = ServerGroupConfig::new(&name);
        foreach_kv(map, |k, v| match normalize_key(k).as_str() {
            "name" => Ok(()),
            "service_id" | "service" => {
                config.service_id = as_u16(v)?;
                Ok(())
            }
            "port" => {
                config.port = as_u16(v)?;
                Ok(())
            }
            "negative_ttl" => {
                config.negative_ttl = as_duration(v)?;
                Ok(())
            }
            "lookup_wait" => {
                config.lookup_wait = as_duration(v)?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;
        Ok(config)
    }
}

impl StaticRecordResolver {
    /// Load records from a map of `name: text` or `name: {text, ttl}`.
    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        let Yaml::Hash(map) = v else {
            return Err(anyhow!("invalid yaml value type for static records"));
        };

        let mut resolver = StaticRecordResolver::new();
        foreach_kv(map, |name, v| match v {
            Yaml::String(text) => {
                resolver.insert(name, text, DEFAULT_STATIC_RECORD_TTL);
                Ok(())
            }
            Yaml::Hash(record) => {
                let mut text = String::new();
                let mut ttl = DEFAULT_STATIC_RECORD_TTL;
                foreach_kv(record, |k, v| match normalize_key(k).as_str() {
                    "text" | "addrs" => {
                        text = as_string(v)?;
                        Ok(())
                    }
                    "ttl" => {
                        ttl = as_duration(v)?;
                        Ok(())
                    }
                    _ => Err(anyhow!("invalid key {k}")),
                })?;
                resolver.insert(name, &text, ttl);
                Ok(())
            }
            _ => Err(anyhow!("invalid yaml value type for record {name}")),
        })?;
        Ok(resolver)
    }
}
