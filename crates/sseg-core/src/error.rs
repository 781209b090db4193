// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::fmt;

/// Error type shared by every sseg crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SegError {
    /// Caller-supplied data or configuration violates a contract.
    InvalidInput(String),
    /// The sequence model is missing or carries no observations.
    InvalidOracle(String),
    /// A numeric routine produced a non-finite or otherwise unusable value.
    NumericalIssue(String),
    /// The requested capability is not provided by a collaborator.
    NotSupported(String),
    /// An internal counter or allocation bound was exceeded.
    ResourceLimit(String),
}

impl SegError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_oracle(msg: impl Into<String>) -> Self {
        Self::InvalidOracle(msg.into())
    }

    pub fn numerical_issue(msg: impl Into<String>) -> Self {
        Self::NumericalIssue(msg.into())
    }

    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }

    pub fn resource_limit(msg: impl Into<String>) -> Self {
        Self::ResourceLimit(msg.into())
    }

    /// Stable machine-readable code for the error category.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidOracle(_) => "invalid_oracle",
            Self::NumericalIssue(_) => "numerical_issue",
            Self::NotSupported(_) => "not_supported",
            Self::ResourceLimit(_) => "resource_limit",
        }
    }
}

impl fmt::Display for SegError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::InvalidOracle(msg) => write!(f, "invalid oracle: {msg}"),
            Self::NumericalIssue(msg) => write!(f, "numerical issue: {msg}"),
            Self::NotSupported(msg) => write!(f, "not supported: {msg}"),
            Self::ResourceLimit(msg) => write!(f, "resource limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for SegError {}
