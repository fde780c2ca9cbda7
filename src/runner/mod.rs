pub mod context;
pub mod events;
pub mod executor;
pub mod state;

use anyhow::Result;

pub use events::*;
pub use state::*;

use crate::client::ApiClient;
use crate::config::Config;

/// Run the selected suites sequentially and return the final summary.
pub async fn run_suites(config: &Config, suite_names: &[String]) -> Result<TestSummary> {
    let suites = crate::suites::select(suite_names)?;

    let client = ApiClient::new(config);
    let mut executor = executor::SuiteExecutor::new(client);

    executor.start(&config.base_url);
    for suite in &suites {
        executor.run_suite(suite).await;
    }
    executor.finish(config.show_results).await
}
