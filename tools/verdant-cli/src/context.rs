//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use verdant_cache::Cache;
use verdant_commerce::coupon::{CouponEvaluator, StaticCouponCatalog, SystemClock};

use crate::config::CliConfig;
use crate::output::Output;

/// Config file names searched for, in order.
pub const CONFIG_NAMES: [&str; 3] = ["verdant.toml", ".verdant.toml", "verdant.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// File the config came from, if any.
    pub config_path: Option<PathBuf>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            // Try to find config in current directory or parent directories
            match Self::find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            }
        };

        if let Some(path) = &config_path {
            output.debug(&format!("Using config {}", path.display()));
        }

        Ok(Self {
            config,
            output,
            cwd,
            config_path,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        return Some((config, config_path));
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }

    /// Get the state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.storage.state_dir)
    }

    /// Open the persistent state store.
    pub fn open_state(&self) -> Result<Arc<Cache>> {
        let dir = self.state_dir();
        let cache = Cache::open_dir(dir.clone())
            .with_context(|| format!("Failed to open state directory: {}", dir.display()))?;
        Ok(Arc::new(cache))
    }

    /// Coupon evaluator over the configured coupon catalog.
    pub fn coupon_evaluator(&self) -> CouponEvaluator {
        CouponEvaluator::new(Arc::new(StaticCouponCatalog::new(self.config.coupons.clone())))
            .with_clock(Arc::new(SystemClock))
            .with_config(self.config.coupon.clone())
    }
}
