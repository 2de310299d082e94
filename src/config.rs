use std::env;
use std::path::PathBuf;

use anyhow::Context;

/// Settings for the hosted summarization endpoint, read from the
/// environment. Both values are required; a missing one is a startup
/// error for the commands that summarize.
#[derive(Debug, Clone)]
pub struct SummarizeConfig {
    pub base_url: String,
    pub token: String,
}

impl SummarizeConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(SummarizeConfig {
            base_url: env::var("JOTTER_SUMMARY_URL")
                .context("JOTTER_SUMMARY_URL must be set to summarize notes")?,
            token: env::var("JOTTER_SUMMARY_TOKEN")
                .context("JOTTER_SUMMARY_TOKEN must be set to summarize notes")?,
        })
    }
}

/// Optional override for where the note database lives.
pub fn data_dir_override() -> Option<PathBuf> {
    env::var_os("JOTTER_DATA_DIR").map(PathBuf::from)
}
