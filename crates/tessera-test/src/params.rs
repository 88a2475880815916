//! Regression test parameters and operations

use crate::error::{TestError, TestResult};
use crate::{golden_dir, regout_dir};
use std::fs;
use std::path::Path;
use tessera_core::{LabelMap, RgbImage};
use tessera_io::ImageFormat;

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Generate golden files
    Generate,
    /// Compare with golden files (default)
    #[default]
    Compare,
    /// Display mode - run without comparison
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "generate" => Self::Generate,
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// Tracks the test name, the running check index, the mode and whether
/// every check so far has passed.
pub struct RegParams {
    /// Name of the test (e.g., "slic")
    pub test_name: String,
    /// Current check index (incremented before each check)
    index: usize,
    /// Test mode (generate, compare, or display)
    pub mode: RegTestMode,
    success: bool,
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// The mode comes from the `REGTEST_MODE` environment variable.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        let _ = fs::create_dir_all(golden_dir());
        let _ = fs::create_dir_all(regout_dir());

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current check index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, msg: String) -> bool {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
        false
    }

    /// Compare two floating-point values
    ///
    /// # Arguments
    ///
    /// * `expected` - Expected value
    /// * `actual` - Actual computed value
    /// * `delta` - Maximum allowed difference
    ///
    /// # Returns
    ///
    /// `true` if values match within delta, `false` otherwise.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.fail(msg)
        } else {
            true
        }
    }

    /// Compare two images for exact equality, including channel order.
    pub fn compare_images(&mut self, img1: &RgbImage, img2: &RgbImage) -> bool {
        self.index += 1;

        if img1.dimensions() != img2.dimensions() || img1.order() != img2.order() {
            let msg = format!(
                "Failure in {}_reg: image comparison for index {} - {:?}/{:?} vs {:?}/{:?}",
                self.test_name,
                self.index,
                img1.dimensions(),
                img1.order(),
                img2.dimensions(),
                img2.order()
            );
            return self.fail(msg);
        }

        for y in 0..img1.height() {
            for x in 0..img1.width() {
                if img1.pixel(x, y) != img2.pixel(x, y) {
                    let msg = format!(
                        "Failure in {}_reg: image comparison for index {} - pixel mismatch at ({}, {})",
                        self.test_name, self.index, x, y
                    );
                    return self.fail(msg);
                }
            }
        }

        true
    }

    /// Compare two label maps for exact equality.
    pub fn compare_label_maps(&mut self, map1: &LabelMap, map2: &LabelMap) -> bool {
        self.index += 1;

        if map1.dimensions() != map2.dimensions() {
            let msg = format!(
                "Failure in {}_reg: label map comparison for index {} - dimension mismatch",
                self.test_name, self.index
            );
            return self.fail(msg);
        }
        if let Some(i) = map1
            .labels()
            .iter()
            .zip(map2.labels())
            .position(|(a, b)| a != b)
        {
            let w = map1.width() as usize;
            let msg = format!(
                "Failure in {}_reg: label map comparison for index {} - label mismatch at ({}, {})",
                self.test_name,
                self.index,
                i % w,
                i / w
            );
            return self.fail(msg);
        }

        true
    }

    /// Write an image to the regout directory and check it against golden.
    pub fn write_image_and_check(&mut self, image: &RgbImage, format: ImageFormat) -> TestResult<()> {
        self.index += 1;

        let local_path = format!(
            "{}/{}.{:02}.{}",
            regout_dir(),
            self.test_name,
            self.index,
            format.extension()
        );

        tessera_io::write_image(image, &local_path, format).map_err(|e| TestError::ImageWrite {
            path: local_path.clone(),
            message: e.to_string(),
        })?;

        self.check_file(&local_path)
    }

    /// Check a file against its golden counterpart
    ///
    /// Generate mode copies the file to golden. Compare mode compares with
    /// the golden file, seeding it first when none exists yet. Display mode
    /// does nothing.
    fn check_file(&mut self, local_path: &str) -> TestResult<()> {
        let ext = Path::new(local_path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        let golden_path = format!(
            "{}/{}_golden.{:02}.{}",
            golden_dir(),
            self.test_name,
            self.index,
            ext
        );

        match self.mode {
            RegTestMode::Generate => {
                fs::copy(local_path, &golden_path)?;
                eprintln!("Generated: {}", golden_path);
            }
            RegTestMode::Compare => {
                if !Path::new(&golden_path).exists() {
                    fs::copy(local_path, &golden_path)?;
                    eprintln!("Seeded missing golden: {}", golden_path);
                    return Ok(());
                }

                let local_data = fs::read(local_path)?;
                let golden_data = fs::read(&golden_path)?;

                if local_data != golden_data && !self.compare_image_files(local_path, &golden_path)
                {
                    let msg = format!(
                        "Failure in {}_reg, index {}: comparing {} with {}",
                        self.test_name, self.index, local_path, golden_path
                    );
                    self.fail(msg);
                }
            }
            RegTestMode::Display => {}
        }

        Ok(())
    }

    /// Compare two image files pixel-by-pixel
    fn compare_image_files(&self, path1: &str, path2: &str) -> bool {
        match (
            tessera_io::read_image(path1),
            tessera_io::read_image(path2),
        ) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Compare two byte strings
    pub fn compare_strings(&mut self, data1: &[u8], data2: &[u8]) -> bool {
        self.index += 1;

        if data1 != data2 {
            let msg = format!(
                "Failure in {}_reg: string comparison for index {}\n\
                 sizes: {} vs {}",
                self.test_name,
                self.index,
                data1.len(),
                data2.len()
            );
            self.fail(msg)
        } else {
            true
        }
    }

    /// Write data to the regout directory and check it against golden.
    pub fn write_data_and_check(&mut self, data: &[u8], ext: &str) -> TestResult<()> {
        self.index += 1;

        let local_path = format!(
            "{}/{}.{:02}.{}",
            regout_dir(),
            self.test_name,
            self.index,
            ext
        );

        fs::write(&local_path, data)?;
        self.check_file(&local_path)
    }

    /// Report results
    ///
    /// # Returns
    ///
    /// `true` if all checks passed, `false` if any failed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all checks have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
