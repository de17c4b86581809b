//! `ASPECT_STORE__<SECTION>__<KEY>` environment overrides.
//!
//! The double underscore after the prefix keeps the logging variables (`ASPECT_STORE_LOG*`)
//! out of the config tree.

use crate::config::ENV_PREFIX;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

pub fn source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(source())
}
