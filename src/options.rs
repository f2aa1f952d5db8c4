//! Flat string-keyed options read by generalizers and the inference engine.

use std::collections::BTreeMap;
use std::path::Path;

use config::Config;
use tracing::debug;

use crate::error::Error;

pub const MAX_LIFESPAN_KEY: &str = "search_general_max_lifespan";
pub const DEFAULT_MAX_LIFESPAN: i32 = 120;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    values: BTreeMap<String, String>,
}

impl Options {
    /// Optional TOML file, overridden by `GENREC_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Options, Error> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("GENREC"))
            .build()?;
        let values: BTreeMap<String, String> = settings.try_deserialize()?;
        debug!(count = values.len(), "options loaded");
        Ok(Options { values })
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Options
    where
        K: Into<String>,
        V: Into<String>,
    {
        Options {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn get_i32(&self, key: &str) -> Option<i32> {
        self.get(key)?.trim().parse().ok()
    }

    /// Longest plausible life in years; non-positive or unparseable values fall back to the default.
    pub fn max_lifespan(&self) -> i32 {
        self.get_i32(MAX_LIFESPAN_KEY)
            .filter(|years| *years > 0)
            .unwrap_or(DEFAULT_MAX_LIFESPAN)
    }
}
