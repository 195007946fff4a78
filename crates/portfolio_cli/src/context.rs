use anyhow::Context as _;
use chrono::{Local, NaiveDate, NaiveDateTime};
use portfolio_core::{
    init_logging, open_store, AppConfig, PortfolioService, RecordStore, StoreBackend,
};
use std::path::{Path, PathBuf};

/// Resolved configuration plus the service every command runs against.
pub struct Context {
    pub config: AppConfig,
    pub service: PortfolioService<Box<dyn RecordStore>>,
    pub json: bool,
}

impl Context {
    /// Precedence: flags, then `PORTFOLIO_*` variables, then the config file.
    pub fn load(
        config_path: Option<&Path>,
        data_dir: Option<PathBuf>,
        backend: Option<StoreBackend>,
        json: bool,
    ) -> anyhow::Result<Self> {
        let mut config = AppConfig::load(config_path)?;
        config.apply_env()?;
        if let Some(dir) = data_dir {
            config.store.data_dir = dir;
        }
        if let Some(backend) = backend {
            config.store.backend = backend;
        }

        // File logging is best effort; commands still run without it.
        if let Err(err) = init_logging(&config.logging.level, &config.log_dir()) {
            eprintln!("warning: file logging disabled: {err}");
        }

        let store = open_store(config.store.backend, &config.store.data_dir).with_context(|| {
            format!(
                "opening {} store in '{}'",
                config.store.backend,
                config.store.data_dir.display()
            )
        })?;
        let service = PortfolioService::new(store).with_base_url(config.links.base_url.clone());

        Ok(Self {
            config,
            service,
            json,
        })
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
