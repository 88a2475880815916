//! tessera-test - Regression test framework for Tessera
//!
//! Every regression test runs in one of three modes:
//!
//! - **Generate**: Create golden files for comparison
//! - **Compare**: Compare results with golden files
//! - **Display**: Run tests without comparison (visual inspection)
//!
//! # Usage
//!
//! ```ignore
//! use tessera_test::RegParams;
//!
//! let mut rp = RegParams::new("slic");
//! rp.compare_values(16.0, seeds as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "generate", "compare", or "display"

mod error;
mod params;
pub mod synthetic;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

/// Load a test image from the test data directory
///
/// # Arguments
///
/// * `name` - Image filename (e.g., "landscape.png")
pub fn load_test_image(name: &str) -> TestResult<tessera_core::RgbImage> {
    let path = test_data_path(name);
    tessera_io::read_image(&path).map_err(|e| TestError::ImageLoad {
        path: path.clone(),
        message: e.to_string(),
    })
}

/// Load a test image, or build [`synthetic::scene`] of the given size
/// when the file is not available.
pub fn load_test_image_or_scene(
    name: &str,
    width: u32,
    height: u32,
) -> TestResult<tessera_core::RgbImage> {
    match load_test_image(name) {
        Ok(img) => Ok(img),
        Err(_) => synthetic::scene(width, height),
    }
}

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // tessera-test lives at crates/tessera-test
    format!("{}/../..", manifest_dir)
}

/// Get the path to a test data file
pub fn test_data_path(name: &str) -> String {
    format!("{}/tests/data/images/{}", workspace_root(), name)
}

/// Get the path to the golden files directory
pub fn golden_dir() -> String {
    format!("{}/tests/golden", workspace_root())
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
