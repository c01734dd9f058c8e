/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod config;
mod cursor;
mod discovery;
mod endpoint;
mod error;
mod group;
mod list;
mod merge;
mod parse;
mod stats;

#[cfg(feature = "yaml")]
pub mod yaml;

pub use config::ServerGroupConfig;
pub use cursor::AddressCursor;
pub use discovery::{
    RecordResolver, ResolvedText, StaticRecordResolver, VL_QUERY_TYPE, resolve_and_build,
};
pub use endpoint::{Endpoint, FS_PORT, FS_SERVICE_ID, VL_PORT, VL_SERVICE_ID};
pub use error::{AddrListError, ResolverError};
pub use group::ServerGroup;
pub use list::{AddressList, ArcAddressList, MAX_ADDRESSES};
pub use parse::{DEFAULT_DELIMITER, LIST_DELIMITER, parse_text_addrs};
pub use stats::{ServerGroupStats, ServerGroupStatsSnapshot};
