//! Predefined `getThumbnail` scenarios
//!
//! Each scenario describes a mock shell, a method call and the answer the
//! channel is expected to give.

use super::mock_shell::{MockShell, MockShellItem};
use crate::channel::{MethodCall, METHOD_GET_THUMBNAIL};
use crate::core::error::ErrorCode;
use serde_json::{json, Value};

const PHOTO: &str = r"C:\Users\Public\Pictures\IMG_0001.JPG";
const PANORAMA: &str = r"C:\Users\Public\Pictures\PANO_0042.JPG";
const DOCUMENT: &str = r"C:\Users\Public\Documents\notes.txt";
const SHORTCUT: &str = r"C:\Users\Public\Desktop\broken.lnk";

/// The answer a scenario expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// JPEG bytes whose longest edge is at most `max_edge`
    Jpeg { max_edge: u32 },
    /// An error with this code
    Error(ErrorCode),
    /// The method is unknown
    NotImplemented,
}

/// A single scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    /// Scenario name for identification
    pub name: String,
    /// Description of what this scenario tests
    pub description: String,
    /// Tags for filtering scenarios
    pub tags: Vec<String>,
    /// Builds the shell the extractor runs against
    pub build_shell: fn() -> MockShell,
    /// Use an encoder that always fails
    pub failing_encoder: bool,
    /// The call to make
    pub call: MethodCall,
    /// How many times to make the call
    pub repeat: usize,
    /// What every call should return
    pub expect: Expectation,
}

impl TestScenario {
    /// Create a scenario calling `getThumbnail` with `arguments`
    pub fn new(
        name: &str,
        description: &str,
        build_shell: fn() -> MockShell,
        arguments: Value,
        expect: Expectation,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            tags: Vec::new(),
            build_shell,
            failing_encoder: false,
            call: MethodCall::new(METHOD_GET_THUMBNAIL, arguments),
            repeat: 1,
            expect,
        }
    }

    /// Add tags to the scenario
    pub fn with_tags(mut self, tags: Vec<&str>) -> Self {
        self.tags = tags.into_iter().map(String::from).collect();
        self
    }

    /// Replace the call
    pub fn with_call(mut self, call: MethodCall) -> Self {
        self.call = call;
        self
    }

    /// Repeat the call `times` times
    pub fn repeated(mut self, times: usize) -> Self {
        self.repeat = times.max(1);
        self
    }

    /// Swap in an encoder that always fails
    pub fn with_failing_encoder(mut self) -> Self {
        self.failing_encoder = true;
        self
    }
}

fn library_shell() -> MockShell {
    MockShell::new()
        .with_item(MockShellItem::cached(PHOTO, 1920, 1080))
        .with_item(MockShellItem::cached(PANORAMA, 4000, 1000).with_color([0x20, 0xA0, 0x40]))
        .with_item(MockShellItem::uncached(DOCUMENT))
        .with_item(MockShellItem::without_image_factory(SHORTCUT))
}

fn oversized_shell() -> MockShell {
    library_shell().ignoring_requested_size()
}

/// Collection of all predefined scenarios
pub struct ScenarioLibrary;

impl ScenarioLibrary {
    // =========================================================================
    // SUCCESS SCENARIOS
    // =========================================================================

    /// Scenario: cached photo
    pub fn cached_photo() -> TestScenario {
        TestScenario::new(
            "cached_photo",
            "Cached photo is returned as JPEG",
            library_shell,
            json!({ "path": PHOTO, "size": 256 }),
            Expectation::Jpeg { max_edge: 256 },
        )
        .with_tags(vec!["success", "quick"])
    }

    /// Scenario: wide panorama
    pub fn wide_panorama() -> TestScenario {
        TestScenario::new(
            "wide_panorama",
            "Panorama keeps its aspect ratio inside the box",
            library_shell,
            json!({ "path": PANORAMA, "size": 128 }),
            Expectation::Jpeg { max_edge: 128 },
        )
        .with_tags(vec!["success"])
    }

    /// Scenario: shell ignores the requested size
    pub fn oversized_bitmap() -> TestScenario {
        TestScenario::new(
            "oversized_bitmap",
            "Bitmap larger than requested is scaled down before encoding",
            oversized_shell,
            json!({ "path": PHOTO, "size": 96 }),
            Expectation::Jpeg { max_edge: 96 },
        )
        .with_tags(vec!["success", "scaling"])
    }

    /// Scenario: same call twice
    pub fn repeated_call() -> TestScenario {
        TestScenario::new(
            "repeated_call",
            "Every repeated call returns a JPEG within the bound",
            library_shell,
            json!({ "path": PHOTO, "size": 64 }),
            Expectation::Jpeg { max_edge: 64 },
        )
        .repeated(3)
        .with_tags(vec!["success", "quick"])
    }

    // =========================================================================
    // ARGUMENT SCENARIOS
    // =========================================================================

    /// Scenario: no path
    pub fn missing_path() -> TestScenario {
        TestScenario::new(
            "missing_path",
            "Call without a path is rejected",
            library_shell,
            json!({ "size": 64 }),
            Expectation::Error(ErrorCode::InvalidArgs),
        )
        .with_tags(vec!["arguments", "quick"])
    }

    /// Scenario: no size
    pub fn missing_size() -> TestScenario {
        TestScenario::new(
            "missing_size",
            "Call without a size is rejected",
            library_shell,
            json!({ "path": PHOTO }),
            Expectation::Error(ErrorCode::InvalidArgs),
        )
        .with_tags(vec!["arguments"])
    }

    /// Scenario: arguments are not a map
    pub fn non_map_arguments() -> TestScenario {
        TestScenario::new(
            "non_map_arguments",
            "Arguments that are not a map are rejected",
            library_shell,
            json!([PHOTO, 64]),
            Expectation::Error(ErrorCode::InvalidArgs),
        )
        .with_tags(vec!["arguments"])
    }

    /// Scenario: zero size
    pub fn zero_size() -> TestScenario {
        TestScenario::new(
            "zero_size",
            "Non-positive size is rejected",
            library_shell,
            json!({ "path": PHOTO, "size": 0 }),
            Expectation::Error(ErrorCode::InvalidArgs),
        )
        .with_tags(vec!["arguments"])
    }

    // =========================================================================
    // EXTRACTION FAILURE SCENARIOS
    // =========================================================================

    /// Scenario: path does not exist
    pub fn unresolved_path() -> TestScenario {
        TestScenario::new(
            "unresolved_path",
            "Path the shell cannot resolve",
            library_shell,
            json!({ "path": r"C:\does\not\exist.jpg", "size": 64 }),
            Expectation::Error(ErrorCode::ExtractionFailed),
        )
        .with_tags(vec!["failure", "quick"])
    }

    /// Scenario: file with nothing in the cache
    pub fn not_cached() -> TestScenario {
        TestScenario::new(
            "not_cached",
            "File without a cached thumbnail",
            library_shell,
            json!({ "path": DOCUMENT, "size": 64 }),
            Expectation::Error(ErrorCode::ExtractionFailed),
        )
        .with_tags(vec!["failure"])
    }

    /// Scenario: item without an image factory
    pub fn no_image_factory() -> TestScenario {
        TestScenario::new(
            "no_image_factory",
            "Item that cannot produce images",
            library_shell,
            json!({ "path": SHORTCUT, "size": 64 }),
            Expectation::Error(ErrorCode::ExtractionFailed),
        )
        .with_tags(vec!["failure"])
    }

    /// Scenario: encoder fails
    pub fn encoder_failure() -> TestScenario {
        TestScenario::new(
            "encoder_failure",
            "JPEG encoding fails after a successful render",
            library_shell,
            json!({ "path": PHOTO, "size": 64 }),
            Expectation::Error(ErrorCode::ExtractionFailed),
        )
        .with_failing_encoder()
        .with_tags(vec!["failure"])
    }

    // =========================================================================
    // DISPATCH SCENARIOS
    // =========================================================================

    /// Scenario: unknown method
    pub fn unknown_method() -> TestScenario {
        TestScenario::new(
            "unknown_method",
            "Methods other than getThumbnail are not implemented",
            library_shell,
            Value::Null,
            Expectation::NotImplemented,
        )
        .with_call(MethodCall::new(
            "getIcon",
            json!({ "path": PHOTO, "size": 64 }),
        ))
        .with_tags(vec!["dispatch", "quick"])
    }

    // =========================================================================
    // COLLECTIONS
    // =========================================================================

    /// Get all scenarios
    pub fn all_scenarios() -> Vec<TestScenario> {
        vec![
            Self::cached_photo(),
            Self::wide_panorama(),
            Self::oversized_bitmap(),
            Self::repeated_call(),
            Self::missing_path(),
            Self::missing_size(),
            Self::non_map_arguments(),
            Self::zero_size(),
            Self::unresolved_path(),
            Self::not_cached(),
            Self::no_image_factory(),
            Self::encoder_failure(),
            Self::unknown_method(),
        ]
    }

    /// Get scenarios carrying `tag`
    pub fn scenarios_by_tag(tag: &str) -> Vec<TestScenario> {
        Self::all_scenarios()
            .into_iter()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect()
    }

    /// Get the quick subset
    pub fn quick_scenarios() -> Vec<TestScenario> {
        Self::scenarios_by_tag("quick")
    }
}
