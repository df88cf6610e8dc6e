use std::time::Duration;

use anyhow::Context;

use crate::api::DEFAULT_HOST;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Base url of the remote data store, without trailing slash
    pub host: String,

    /// How long fetched data is served from cache. `None` keeps it until the
    /// next mutation invalidates it.
    pub max_age: Option<Duration>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            host: String::from(DEFAULT_HOST),
            max_age: None,
        }
    }
}

impl Config {
    /// Defaults, overridden by `PALAVER_HOST` and `PALAVER_MAX_AGE_SECS`
    pub fn from_env() -> anyhow::Result<Config> {
        Config::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
        let mut config = Config::default();
        if let Some(host) = var("PALAVER_HOST") {
            config.host = host;
        }
        if let Some(secs) = var("PALAVER_MAX_AGE_SECS") {
            let secs = secs
                .parse::<u64>()
                .with_context(|| format!("parsing PALAVER_MAX_AGE_SECS {secs:?} as seconds"))?;
            config.max_age = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }
}
