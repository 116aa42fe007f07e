// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared setup for the Orrery demos.

use std::sync::Once;

/// Logger configuration for a demo binary.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "orrery_tree=trace"). When unset, `RUST_LOG` is honored, falling back to
/// `info`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Explicit filter; overrides `RUST_LOG`.
    pub env_filter: Option<String>,
    /// ANSI coloring behavior.
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Install the global logger. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }
        builder.write_style(config.write_style);
        builder.init();
        log::debug!("logging initialized");
    });
}
