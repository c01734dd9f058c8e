/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use super::{VL_PORT, VL_SERVICE_ID};

const DEFAULT_NEGATIVE_TTL: Duration = Duration::from_secs(30);
const DEFAULT_LOOKUP_WAIT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerGroupConfig {
    pub(crate) name: String,
    pub(crate) service_id: u16,
    pub(crate) port: u16,
    pub(crate) negative_ttl: Duration,
    pub(crate) lookup_wait: Duration,
}

impl ServerGroupConfig {
    pub fn new(name: &str) -> Self {
        ServerGroupConfig {
            name: name.to_string(),
            service_id: VL_SERVICE_ID,
            port: VL_PORT,
            negative_ttl: DEFAULT_NEGATIVE_TTL,
            lookup_wait: DEFAULT_LOOKUP_WAIT,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn service_id(&self) -> u16 {
        self.service_id
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[inline]
    pub fn negative_ttl(&self) -> Duration {
        self.negative_ttl
    }

    #[inline]
    pub fn lookup_wait(&self) -> Duration {
        self.lookup_wait
    }

    pub fn set_service_id(&mut self, service_id: u16) {
        self.service_id = service_id;
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// How long a failed lookup result is kept before the next try.
    pub fn set_negative_ttl(&mut self, ttl: Duration) {
        self.negative_ttl = ttl;
    }

    /// How long a new cursor waits for the first lookup to finish.
    pub fn set_lookup_wait(&mut self, wait: Duration) {
        self.lookup_wait = wait;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let mut config = ServerGroupConfig::new("example.org");
        assert_eq!(config.name(), "example.org");
        assert_eq!(config.service_id(), VL_SERVICE_ID);
        assert_eq!(config.port(), VL_PORT);
        assert_eq!(config.negative_ttl(), DEFAULT_NEGATIVE_TTL);

        config.set_port(7000);
        config.set_service_id(1);
        config.set_lookup_wait(Duration::from_secs(1));
        assert_eq!(config.port(), 7000);
        assert_eq!(config.service_id(), 1);
        assert_eq!(config.lookup_wait(), Duration::from_secs(1));
    }
}
