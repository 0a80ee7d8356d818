//! CLI runner - executes commands
//!
//! Console output is limited to status lines and counters. Remote response
//! bodies only ever reach the failure log.

use crate::auth::CredentialBroker;
use crate::cli::commands::{Cli, Commands, DeleteMode};
use crate::config::RunConfig;
use crate::engine::{BatchReport, BulkEngine, RunSummary};
use crate::error::{Error, Result};
use crate::executor::{BulkExecutor, ExecutorConfig};
use crate::filter::{FilterPredicate, ItemFilter, PassAll};
use crate::http::{ApiClient, ApiClientConfig, RateLimiter, RateLimiterConfig};
use crate::mapping::MapperConfig;
use crate::operations::{DeleteUser, ImportUser};
use crate::report::{FailureLog, ResultAggregator};
use crate::schema;
use crate::source::{CsvSource, PagedSource, RecordSource};
use crate::types::{now_ms, JsonValue};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = RunConfig::load(&self.cli.config)?;
        debug!("Loaded configuration from {}", self.cli.config.display());

        match &self.cli.command {
            Commands::Check => self.check(&config).await,
            Commands::Delete { mode } => self.delete(&config, mode).await,
            Commands::Import {
                csv,
                skip_preflight,
            } => self.import(&config, csv.as_deref(), *skip_preflight).await,
        }
    }

    /// Authenticate and report the existing user count
    async fn check(&self, config: &RunConfig) -> Result<()> {
        let broker = Self::authenticate(config).await?;
        println!("Authenticated with {} client authentication", broker.auth_mode());

        let mut users = Self::user_listing(config)?;
        match users.record_count(broker.token()).await? {
            Some(count) => println!("Environment {} has {} users", config.environment_id, count),
            None => println!("Environment {} did not report a user count", config.environment_id),
        }
        Ok(())
    }

    /// Delete the users selected by `mode`
    async fn delete(&self, config: &RunConfig, mode: &DeleteMode) -> Result<()> {
        let broker = Self::authenticate(config).await?;

        let mut source = Self::user_listing(config)?;
        if let Some(filter) = mode.list_filter() {
            source = source.with_filter(filter);
        }
        if let Some(count) = source.record_count(broker.token()).await? {
            println!("Found {count} users in the listing");
        }

        let filter: Box<dyn ItemFilter<JsonValue>> = match mode {
            DeleteMode::All | DeleteMode::Group { .. } => Box::new(PassAll),
            DeleteMode::Inactive {
                days,
                include_never_signed_on,
            } => Box::new(FilterPredicate::inactive_for(
                *days,
                *include_never_signed_on,
                now_ms(),
            )),
            DeleteMode::Unverified { days } => {
                Box::new(FilterPredicate::unverified_for(*days, now_ms()))
            }
        };
        info!("Starting delete run: {:?}", mode);

        let operation = Arc::new(DeleteUser::new(Self::api_client(config)?, config.api_root()));
        let mut engine = Self::engine(config, broker)?;
        let summary = engine
            .run(&mut source, operation, &*filter, print_batch)
            .await?;

        print_summary(&summary, config);
        Ok(())
    }

    /// Import users from CSV
    async fn import(&self, config: &RunConfig, csv: Option<&Path>, skip_preflight: bool) -> Result<()> {
        let csv_path = csv
            .or(config.csv_path.as_deref())
            .ok_or_else(|| Error::missing_field("csv_path"))?;
        let default_population = config
            .default_population_id
            .clone()
            .ok_or_else(|| Error::missing_field("default_population_id"))?;

        let mut source = CsvSource::open(csv_path).await?;
        println!(
            "Read {} rows with {} headers from {}",
            source.total_rows(),
            source.headers().len(),
            csv_path.display()
        );

        let broker = Self::authenticate(config).await?;
        let client = Self::api_client(config)?;
        let api_root = config.api_root();

        if skip_preflight {
            info!("Skipping schema and population checks");
        } else {
            let attributes = schema::fetch_user_attributes(&client, &api_root, broker.token()).await?;
            schema::check_headers(source.headers(), &attributes)?;
            let populations = schema::list_populations(&client, &api_root, broker.token()).await?;
            schema::check_population(&populations, &default_population)?;
            println!("CSV headers and default population verified");
        }

        let mapper = MapperConfig::new(default_population, config.force_password_change);
        let operation = Arc::new(ImportUser::new(client, &api_root, mapper));
        let mut engine = Self::engine(config, broker)?;
        let summary = engine
            .run(&mut source, operation, &PassAll, print_batch)
            .await?;

        print_summary(&summary, config);
        Ok(())
    }

    /// Acquire the run credential
    async fn authenticate(config: &RunConfig) -> Result<CredentialBroker> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        match config.auth_mode {
            Some(mode) => {
                CredentialBroker::acquire_with_mode(
                    http_client,
                    config.token_url(),
                    config.client_id.as_str(),
                    config.client_secret.as_str(),
                    mode,
                    config.refresh_interval(),
                )
                .await
            }
            None => {
                CredentialBroker::acquire(
                    http_client,
                    config.token_url(),
                    config.client_id.as_str(),
                    config.client_secret.as_str(),
                    config.refresh_interval(),
                )
                .await
            }
        }
    }

    fn api_client(config: &RunConfig) -> Result<ApiClient> {
        ApiClient::with_config(
            ApiClientConfig::builder()
                .timeout(config.request_timeout())
                .build(),
        )
    }

    fn user_listing(config: &RunConfig) -> Result<PagedSource> {
        Ok(PagedSource::new(
            Self::api_client(config)?,
            format!("{}/users", config.api_root()),
            "users",
        ))
    }

    fn engine(config: &RunConfig, broker: CredentialBroker) -> Result<BulkEngine> {
        let limiter = RateLimiter::new(&RateLimiterConfig::ceiling(config.requests_per_second));
        let executor = BulkExecutor::new(
            limiter,
            ExecutorConfig::new(config.max_concurrency, config.connectivity_failure_threshold),
        );
        let failure_log = FailureLog::open(&config.failure_log)?;
        Ok(BulkEngine::new(
            broker,
            executor,
            ResultAggregator::new(Arc::new(failure_log)),
        ))
    }
}

fn print_batch(report: &BatchReport) {
    if report.token_refreshed {
        println!("Access token refreshed");
    }
    println!("Batch {}: {}", report.batch_number, report.counters);
}

fn print_summary(summary: &RunSummary, config: &RunConfig) {
    println!(
        "Finished {} batches in {}ms: {}",
        summary.batches, summary.duration_ms, summary.counters
    );
    if !summary.is_clean() {
        println!("Failure detail written to {}", config.failure_log.display());
    }
}
