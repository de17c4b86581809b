//! `aspect-store.toml` in the working directory; optional.

use crate::config::CONFIG_FILE_NAME;
use config::builder::DefaultState;
use config::{ConfigBuilder, File};
use std::path::Path;

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    working_dir: &Path,
) -> ConfigBuilder<DefaultState> {
    builder.add_source(File::from(working_dir.join(CONFIG_FILE_NAME)).required(false))
}
