/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fs;
use std::path::Path;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, YamlLoader};

use g3_addrlist::yaml::{foreach_kv, normalize_key};
use g3_addrlist::{ServerGroupConfig, StaticRecordResolver};

pub struct ProbeConfig {
    groups: Vec<ServerGroupConfig>,
    resolver: StaticRecordResolver,
}

impl ProbeConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("failed to read config file {}: {e}", path.display()))?;
        ProbeConfig::parse_str(&content)
            .context(format!("failed to load config file {}", path.display()))
    }

    fn parse_str(content: &str) -> anyhow::Result<Self> {
        let docs =
            YamlLoader::load_from_str(content).map_err(|e| anyhow!("invalid yaml file: {e}"))?;
        let Some(Yaml::Hash(map)) = docs.first() else {
            return Err(anyhow!("the root of the config file should be a map"));
        };

        let mut config = ProbeConfig {
            groups: Vec::new(),
            resolver: StaticRecordResolver::new(),
        };
        foreach_kv(map, |k, v| match normalize_key(k).as_str() {
            "server_groups" => config.load_groups(v),
            "records" => {
                config.resolver = StaticRecordResolver::parse_yaml(v)?;
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        })?;
        Ok(config)
    }

    fn load_groups(&mut self, v: &Yaml) -> anyhow::Result<()> {
        let Yaml::Array(seq) = v else {
            return Err(anyhow!("the value should be an array of maps"));
        };
        for (i, v) in seq.iter().enumerate() {
            let Yaml::Hash(map) = v else {
                return Err(anyhow!("server group #{i} should be a map"));
            };
            let group = ServerGroupConfig::parse_yaml(map)
                .context(format!("invalid server group #{i}"))?;
            if self.find_group(group.name()).is_some() {
                return Err(anyhow!("duplicate server group {}", group.name()));
            }
            self.groups.push(group);
        }
        Ok(())
    }

    pub fn groups(&self) -> &[ServerGroupConfig] {
        &self.groups
    }

    pub fn find_group(&self, name: &str) -> Option<&ServerGroupConfig> {
        self.groups.iter().find(|g| g.name() == name)
    }

    pub fn resolver(&self) -> &StaticRecordResolver {
        &self.resolver
    }
}
