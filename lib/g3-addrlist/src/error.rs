/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    #[error("record not found")]
    NotFound,
    #[error("server returned general failure")]
    ServFail,
    #[error("server refused query")]
    Refused,
    #[error("timeout while contacting server")]
    Timeout,
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ResolverError {
    pub fn get_type(&self) -> &str {
        match self {
            ResolverError::NotFound => "NotFound",
            ResolverError::ServFail => "ServFail",
            ResolverError::Refused => "Refused",
            ResolverError::Timeout => "Timeout",
            ResolverError::Unexpected(_) => "Unexpected",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddrListError {
    #[error("out of memory")]
    AllocationFailure,
    #[error("invalid address format at offset {offset}")]
    InvalidFormat { offset: usize },
    #[error("destination address required")]
    NoDestination,
    #[error("timed out waiting for the first address lookup")]
    LookupTimedOut,
    #[error("resolver error: {0}")]
    Resolver(#[from] ResolverError),
}

impl AddrListError {
    pub fn get_type(&self) -> &str {
        match self {
            AddrListError::AllocationFailure => "AllocationFailure",
            AddrListError::InvalidFormat { .. } => "InvalidFormat",
            AddrListError::NoDestination => "NoDestination",
            AddrListError::LookupTimedOut => "LookupTimedOut",
            AddrListError::Resolver(_) => "ResolverError",
        }
    }

    pub fn get_subtype(&self) -> &str {
        match self {
            AddrListError::Resolver(e) => e.get_type(),
            _ => "",
        }
    }

    /// Errors caused by the content of an address record, not by how it was fetched.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            AddrListError::InvalidFormat { .. } | AddrListError::NoDestination
        )
    }
}
