//! Command dispatch

use super::commands::{Cli, Commands};
use crate::config::PaginationConfig;
use crate::error::{Error, Result};
use crate::pagination::PaginationState;
#[cfg(feature = "browser")]
use crate::pagination::SelectorCountExtractor;
use std::path::Path;
#[cfg(feature = "browser")]
use tracing::{info, warn};

/// Executes CLI commands
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a runner for parsed arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the requested command
    pub async fn run(self) -> Result<()> {
        match &self.cli.command {
            Commands::Detect { url, headed } => self.detect(url, *headed).await,
            Commands::Run {
                url,
                item_selector,
                max_pages,
                resume,
                headed,
            } => {
                self.run_pages(url, item_selector.as_deref(), *max_pages, *resume, *headed)
                    .await
            }
            Commands::State { reset } => self.state(*reset).await,
            Commands::Validate => self.validate(),
        }
    }

    fn load_config(&self) -> Result<PaginationConfig> {
        match &self.cli.config {
            Some(path) => PaginationConfig::load(path),
            None => Ok(PaginationConfig::default()),
        }
    }

    #[cfg(feature = "browser")]
    async fn detect(&self, url: &str, headed: bool) -> Result<()> {
        use crate::browser::{BrowserDriver, CdpDriver};
        use crate::pagination::PaginationDetector;
        use std::sync::Arc;

        let config = Arc::new(self.load_config()?);
        let driver = CdpDriver::launch(!headed).await?;
        driver.goto(url).await?;

        let detector = PaginationDetector::new(config);
        println!("{}", detector.summary(&driver).await);

        driver.close().await;
        Ok(())
    }

    #[cfg(not(feature = "browser"))]
    async fn detect(&self, _url: &str, _headed: bool) -> Result<()> {
        Err(Error::browser(
            "Browser support not compiled. Rebuild with: cargo build --features browser",
        ))
    }

    #[cfg(feature = "browser")]
    async fn run_pages(
        &self,
        url: &str,
        item_selector: Option<&str>,
        max_pages: Option<u32>,
        resume: bool,
        headed: bool,
    ) -> Result<()> {
        use crate::browser::{BrowserDriver, CdpDriver};
        use crate::pagination::PaginationNavigator;
        use std::sync::Arc;

        let mut config = self.load_config()?;
        if let Some(max) = max_pages {
            config.limits.max_pages = max;
        }
        let selector = item_selector
            .map(ToString::to_string)
            .or_else(|| config.item_selector.clone());
        let config = Arc::new(config);

        let driver = Arc::new(CdpDriver::launch(!headed).await?);
        driver.goto(url).await?;

        let browser: Arc<dyn BrowserDriver> = driver.clone();
        let mut navigator = PaginationNavigator::new(config, browser);
        if resume && self.cli.state.exists() {
            navigator.load_state(&self.cli.state).await;
            info!(
                "Resuming from page {} ({} items so far)",
                navigator.state().current_page,
                navigator.state().total_items
            );
        }

        if !navigator.initialize().await {
            println!("No pagination detected at {url}");
            return Ok(());
        }

        let mut extractor = selector.map(SelectorCountExtractor::new);
        while navigator.can_continue() {
            let advanced = match extractor.as_mut() {
                Some(ex) => navigator.navigate_to_next(Some(ex)).await,
                None => navigator.navigate_to_next(None).await,
            };

            // Checkpoint after every page so a crash can resume
            if let Err(e) = navigator.save_state(&self.cli.state).await {
                warn!("Checkpoint failed: {e}");
            }
            if !advanced {
                break;
            }
        }

        navigator.save_state(&self.cli.state).await?;
        println!("{}", navigator.navigation_summary());
        drop(navigator);

        match Arc::try_unwrap(driver) {
            Ok(driver) => driver.close().await,
            Err(_) => warn!("Browser session still referenced at shutdown"),
        }
        Ok(())
    }

    #[cfg(not(feature = "browser"))]
    async fn run_pages(
        &self,
        _url: &str,
        _item_selector: Option<&str>,
        _max_pages: Option<u32>,
        _resume: bool,
        _headed: bool,
    ) -> Result<()> {
        Err(Error::browser(
            "Browser support not compiled. Rebuild with: cargo build --features browser",
        ))
    }

    async fn state(&self, reset: bool) -> Result<()> {
        let path: &Path = &self.cli.state;
        if reset {
            let state = PaginationState::new();
            state.save(path).await?;
            println!("State reset: {}", path.display());
            return Ok(());
        }

        if !path.exists() {
            println!("No state file at {}", path.display());
            return Ok(());
        }
        let state = PaginationState::load(path).await;
        println!("{}", state.to_json()?);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let Some(path) = &self.cli.config else {
            return Err(Error::config("--config is required for validate"));
        };
        let config = PaginationConfig::load(path)?;
        let rendered = serde_yaml::to_string(&config)?;
        println!("{rendered}");
        Ok(())
    }
}
