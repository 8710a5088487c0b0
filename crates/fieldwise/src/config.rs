// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! fieldwise configuration.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: compile-time constants (maximum arity, env keys)
//! - **Level 2 (Dynamic)**: [`RegistryConfig`], chosen per registry; the
//!   global registry reads it from the environment on first use
//!
//! # Example
//!
//! ```
//! use fieldwise::config::{NamePolicy, RegistryConfig};
//! use fieldwise::Registry;
//!
//! let registry = Registry::with_config(RegistryConfig::new().name_policy(NamePolicy::Strict));
//! assert!(registry.is_empty());
//! ```

use std::fmt;
use std::str::FromStr;

// =======================================================================
// Static limits
// =======================================================================

/// Largest field count a record may have.
///
/// Bounded by the [`Decay`](crate::tuple::Decay) tuple table; the derive
/// rejects wider structs.
pub const MAX_ARITY: usize = 40;

/// Environment variable selecting the [`NamePolicy`] of the global registry.
///
/// Accepted values: `strict`, `lenient` (case-insensitive).
pub const ENV_NAME_POLICY: &str = "FIELDWISE_NAME_POLICY";

// =======================================================================
// Runtime configuration
// =======================================================================

/// What registration does when field names cannot be matched to positions.
///
/// Covers both a declaration that fails to parse and a name list whose
/// length differs from the arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamePolicy {
    /// Log a warning and register anyway. Missing trailing names stay
    /// `None`, extra names are dropped, a parse failure yields no names.
    #[default]
    Lenient,
    /// Refuse the registration and return the error.
    Strict,
}

impl fmt::Display for NamePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamePolicy::Lenient => write!(f, "lenient"),
            NamePolicy::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for NamePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(NamePolicy::Lenient),
            "strict" => Ok(NamePolicy::Strict),
            other => Err(format!("unknown name policy '{}'", other)),
        }
    }
}

/// Per-registry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryConfig {
    pub name_policy: NamePolicy,
}

impl RegistryConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for [`NamePolicy`].
    #[must_use]
    pub fn name_policy(mut self, policy: NamePolicy) -> Self {
        self.name_policy = policy;
        self
    }

    /// Read [`ENV_NAME_POLICY`]; unset or invalid values fall back to the
    /// default (an invalid value is logged).
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_NAME_POLICY) {
            match raw.parse::<NamePolicy>() {
                Ok(policy) => config.name_policy = policy,
                Err(e) => log::warn!(
                    "[Config] {}: {}, using {}",
                    ENV_NAME_POLICY,
                    e,
                    config.name_policy
                ),
            }
        }
        config
    }
}
