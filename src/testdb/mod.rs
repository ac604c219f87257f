//! Test Database Module
//!
//! Lets the thumbnail pipeline be exercised without Windows or a populated
//! thumbnail cache.
//!
//! # Features
//!
//! - **Mock Shell**: In-memory paths with configurable cache entries
//! - **Test Scenarios**: Pre-built `getThumbnail` calls with expected answers
//! - **Test Runner**: Execute scenarios through the real channel handler
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use shell_thumbnail::testdb::{TestRunner, TestRunnerConfig};
//!
//! let mut runner = TestRunner::with_config(TestRunnerConfig {
//!     verbose: true,
//!     ..Default::default()
//! });
//! let summary = runner.run_by_names(&["cached_photo", "not_cached"]);
//! println!("Passed: {}/{}", summary.passed, summary.total);
//! ```

pub mod mock_shell;
pub mod runner;
pub mod scenarios;

pub use mock_shell::{FailingEncoder, MockCallLog, MockShell, MockShellItem};
pub use runner::{ScenarioResult, TestRunner, TestRunnerConfig, TestSummary};
pub use scenarios::{Expectation, ScenarioLibrary, TestScenario};

/// Get a list of all available scenario names
pub fn list_scenario_names() -> Vec<String> {
    ScenarioLibrary::all_scenarios()
        .into_iter()
        .map(|s| s.name)
        .collect()
}

/// Print available scenarios
pub fn print_available_scenarios() {
    println!("\n📋 Available Test Scenarios:\n");
    for (i, scenario) in ScenarioLibrary::all_scenarios().iter().enumerate() {
        println!("  {:2}. {} - {}", i + 1, scenario.name, scenario.description);
        if !scenario.tags.is_empty() {
            println!("      Tags: {}", scenario.tags.join(", "));
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_scenario_names() {
        let names = list_scenario_names();
        assert!(names.contains(&"cached_photo".to_string()));
        assert!(names.contains(&"unknown_method".to_string()));
    }
}
