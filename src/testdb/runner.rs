//! Test runner for executing `getThumbnail` scenarios
//!
//! Every scenario builds a fresh extractor over its mock shell, sends its call
//! through a [`ThumbnailChannel`] and checks the answer.

use super::mock_shell::FailingEncoder;
use super::scenarios::{Expectation, ScenarioLibrary, TestScenario};
use crate::channel::{MethodCallHandler, MethodResponse, ThumbnailChannel};
use crate::core::error::Result;
use crate::core::extractor::{ThumbnailExtractor, ThumbnailFetcher};
use crate::shell::encoder::{is_jpeg, JpegThumbnailEncoder};
use image::{GenericImageView, ImageFormat};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of running a single scenario
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario name
    pub name: String,
    /// Whether the scenario passed
    pub passed: bool,
    /// Execution time
    pub duration: Duration,
    /// Calls made
    pub calls: usize,
    /// Failure reason (if any)
    pub failure_reason: Option<String>,
}

/// Summary of a run
#[derive(Debug, Clone, Default)]
pub struct TestSummary {
    /// Total scenarios run
    pub total: usize,
    /// Scenarios that passed
    pub passed: usize,
    /// Scenarios that failed
    pub failed: usize,
    /// Total execution time
    pub total_duration: Duration,
    /// Individual results in run order
    pub results: Vec<ScenarioResult>,
}

impl TestSummary {
    /// Calculate pass rate as percentage
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }

    /// Get all failed scenario names
    pub fn failed_scenarios(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.name.as_str())
            .collect()
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Configuration for the test runner
#[derive(Debug, Clone, Default)]
pub struct TestRunnerConfig {
    /// Print each scenario and a summary box
    pub verbose: bool,
    /// Stop on first failure
    pub fail_fast: bool,
    /// Only run scenarios carrying one of these tags
    pub tag_filter: Option<Vec<String>>,
}

/// Test runner for executing scenarios
#[derive(Debug, Default)]
pub struct TestRunner {
    config: TestRunnerConfig,
}

impl TestRunner {
    /// Create a new test runner with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new test runner with configuration
    pub fn with_config(config: TestRunnerConfig) -> Self {
        Self { config }
    }

    /// Run all available scenarios
    pub fn run_all(&mut self) -> TestSummary {
        self.run_scenarios(ScenarioLibrary::all_scenarios())
    }

    /// Run quick scenarios only
    pub fn run_quick(&mut self) -> TestSummary {
        self.run_scenarios(ScenarioLibrary::quick_scenarios())
    }

    /// Run specific scenarios by name
    pub fn run_by_names(&mut self, names: &[&str]) -> TestSummary {
        let scenarios: Vec<_> = ScenarioLibrary::all_scenarios()
            .into_iter()
            .filter(|s| names.contains(&s.name.as_str()))
            .collect();
        self.run_scenarios(scenarios)
    }

    /// Run a list of scenarios
    pub fn run_scenarios(&mut self, scenarios: Vec<TestScenario>) -> TestSummary {
        let started = Instant::now();
        let scenarios = self.filter_scenarios(scenarios);

        if self.config.verbose {
            println!("\n╔══════════════════════════════════════════════════════════════╗");
            println!("║               SHELL THUMBNAIL - SCENARIO RUNNER              ║");
            println!("╠══════════════════════════════════════════════════════════════╣");
            println!(
                "║  Running {:>3} scenario(s)                                     ║",
                scenarios.len()
            );
            println!("╚══════════════════════════════════════════════════════════════╝\n");
        }

        let mut summary = TestSummary::default();
        for scenario in &scenarios {
            let result = self.run_single_scenario(scenario);

            if self.config.verbose {
                print_result(&result);
            }

            summary.total += 1;
            if result.passed {
                summary.passed += 1;
            } else {
                summary.failed += 1;
            }

            let stop = self.config.fail_fast && !result.passed;
            summary.results.push(result);
            if stop {
                if self.config.verbose {
                    println!("\n⚠️  Stopping early due to fail-fast mode\n");
                }
                break;
            }
        }
        summary.total_duration = started.elapsed();

        if self.config.verbose {
            print_summary(&summary);
        }

        summary
    }

    fn filter_scenarios(&self, scenarios: Vec<TestScenario>) -> Vec<TestScenario> {
        match self.config.tag_filter {
            Some(ref tags) => scenarios
                .into_iter()
                .filter(|s| s.tags.iter().any(|t| tags.contains(t)))
                .collect(),
            None => scenarios,
        }
    }

    fn run_single_scenario(&self, scenario: &TestScenario) -> ScenarioResult {
        let start = Instant::now();

        if self.config.verbose {
            println!("▶ Running: {} - {}", scenario.name, scenario.description);
        }

        let outcome = execute_scenario(scenario);

        ScenarioResult {
            name: scenario.name.clone(),
            passed: outcome.is_ok(),
            duration: start.elapsed(),
            calls: scenario.repeat,
            failure_reason: outcome.err(),
        }
    }
}

fn build_fetcher(scenario: &TestScenario) -> Result<Arc<dyn ThumbnailFetcher>> {
    let shell = (scenario.build_shell)();
    let fetcher: Arc<dyn ThumbnailFetcher> = if scenario.failing_encoder {
        Arc::new(ThumbnailExtractor::new(shell, FailingEncoder))
    } else {
        Arc::new(ThumbnailExtractor::new(shell, JpegThumbnailEncoder::new()?))
    };
    Ok(fetcher)
}

fn execute_scenario(scenario: &TestScenario) -> std::result::Result<(), String> {
    let fetcher = build_fetcher(scenario).map_err(|e| format!("setup failed: {}", e))?;
    let channel = ThumbnailChannel::new(fetcher);

    // Each call is checked on its own; the shell may re-render between calls.
    for attempt in 0..scenario.repeat {
        let response = channel.handle(&scenario.call);
        check_response(&response, scenario.expect)
            .map_err(|reason| format!("call {}: {}", attempt + 1, reason))?;
    }

    Ok(())
}

fn check_response(
    response: &MethodResponse,
    expect: Expectation,
) -> std::result::Result<(), String> {
    match (expect, response) {
        (Expectation::Jpeg { max_edge }, MethodResponse::Success(data)) => {
            if !is_jpeg(data) {
                return Err("payload is not a JPEG".to_string());
            }
            let decoded = image::load_from_memory_with_format(data, ImageFormat::Jpeg)
                .map_err(|e| format!("payload does not decode: {}", e))?;
            let (width, height) = decoded.dimensions();
            if width.max(height) > max_edge {
                return Err(format!(
                    "thumbnail is {}x{}, larger than {}",
                    width, height, max_edge
                ));
            }
            Ok(())
        }
        (Expectation::Error(code), MethodResponse::Error { code: actual, .. })
            if code == *actual =>
        {
            Ok(())
        }
        (Expectation::NotImplemented, MethodResponse::NotImplemented) => Ok(()),
        (expect, response) => Err(format!("expected {:?}, got {}", expect, describe(response))),
    }
}

fn describe(response: &MethodResponse) -> String {
    match response {
        MethodResponse::Success(data) => format!("success with {} bytes", data.len()),
        MethodResponse::Error { code, message } => format!("{} ({})", code, message),
        MethodResponse::NotImplemented => "not implemented".to_string(),
    }
}

fn print_result(result: &ScenarioResult) {
    let (status, color) = if result.passed {
        ("✓ PASS", "\x1b[32m")
    } else {
        ("✗ FAIL", "\x1b[31m")
    };

    println!(
        "  {}{}\x1b[0m - {} ({:.2}ms)",
        color,
        status,
        result.name,
        result.duration.as_secs_f64() * 1000.0
    );

    if let Some(ref reason) = result.failure_reason {
        println!("      └─ Reason: {}", reason);
    }
}

fn print_summary(summary: &TestSummary) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                        TEST SUMMARY                          ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!(
        "║  Total:    {:>4}                                              ║",
        summary.total
    );
    println!(
        "║  Passed:   {:>4} \x1b[32m✓\x1b[0m                                             ║",
        summary.passed
    );
    println!(
        "║  Failed:   {:>4} \x1b[31m✗\x1b[0m                                             ║",
        summary.failed
    );
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!(
        "║  Pass Rate: {:>5.1}%                                          ║",
        summary.pass_rate()
    );
    println!(
        "║  Duration:  {:>5.2}s                                          ║",
        summary.total_duration.as_secs_f64()
    );
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let failed = summary.failed_scenarios();
    if !failed.is_empty() {
        println!("Failed scenarios:");
        for name in failed {
            println!("  • {}", name);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorCode;

    #[test]
    fn test_all_scenarios_pass() {
        let summary = TestRunner::new().run_all();
        assert_eq!(
            summary.failed_scenarios(),
            Vec::<&str>::new(),
            "{:?}",
            summary.results
        );
        assert_eq!(summary.total, ScenarioLibrary::all_scenarios().len());
        assert_eq!(summary.pass_rate(), 100.0);
    }

    #[test]
    fn test_run_by_names() {
        let summary = TestRunner::new().run_by_names(&["cached_photo", "unknown_method", "nope"]);
        assert_eq!(summary.total, 2);
        assert!(summary.all_passed());
    }

    #[test]
    fn test_wrong_expectation_fails() {
        let scenario = ScenarioLibrary::not_cached();
        let mut wrong = scenario.clone();
        wrong.expect = Expectation::Error(ErrorCode::InvalidArgs);

        let summary = TestRunner::new().run_scenarios(vec![scenario, wrong]);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert!(summary.results[1]
            .failure_reason
            .as_deref()
            .unwrap()
            .contains("EXTRACTION_FAILED"));
    }

    #[test]
    fn test_repeated_call_checks_each_response() {
        let mut tight = ScenarioLibrary::repeated_call();
        tight.expect = Expectation::Jpeg { max_edge: 16 };

        let summary =
            TestRunner::new().run_scenarios(vec![ScenarioLibrary::repeated_call(), tight]);
        assert_eq!(summary.passed, 1);
        let reason = summary.results[1].failure_reason.as_deref().unwrap();
        assert!(reason.starts_with("call 1:"), "{}", reason);
    }

    #[test]
    fn test_run_quick() {
        let summary = TestRunner::new().run_quick();
        assert_eq!(summary.total, ScenarioLibrary::quick_scenarios().len());
        assert!(summary.total > 0);
        assert!(summary.all_passed());
    }

    #[test]
    fn test_fail_fast_stops() {
        let mut bad = ScenarioLibrary::cached_photo();
        bad.expect = Expectation::NotImplemented;

        let mut runner = TestRunner::with_config(TestRunnerConfig {
            fail_fast: true,
            ..Default::default()
        });
        let summary = runner.run_scenarios(vec![bad, ScenarioLibrary::zero_size()]);
        assert_eq!(summary.total, 1);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_tag_filter() {
        let mut runner = TestRunner::with_config(TestRunnerConfig {
            tag_filter: Some(vec!["arguments".to_string()]),
            ..Default::default()
        });
        let summary = runner.run_all();
        assert_eq!(summary.total, 4);
        assert!(summary.all_passed());
    }
}
