//! Regression test parameters and operations

use quadseg_core::{Field, Rect};

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Compare results and record failures (default)
    #[default]
    Compare,
    /// Display mode - compare and also print intermediate results
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
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// Tracks the test name, the index of the current comparison, the mode,
/// and every recorded failure so a test can report all mismatches at once
/// instead of stopping at the first.
pub struct RegParams {
    /// Name of the test (e.g., "split")
    pub test_name: String,
    /// Current comparison index (incremented before each comparison)
    index: usize,
    pub mode: RegTestMode,
    success: bool,
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// The mode is taken from the `REGTEST_MODE` environment variable.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

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

    /// Get the current comparison index
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
    /// Returns `true` if `|expected - actual| <= delta`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta || diff.is_nan() {
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

    /// Compare two rectangle lists for exact equality, in order
    pub fn compare_rects(&mut self, expected: &[Rect], actual: &[Rect]) -> bool {
        self.index += 1;

        if expected.len() != actual.len() {
            let msg = format!(
                "Failure in {}_reg: rect comparison for index {} - count {} vs {}",
                self.test_name,
                self.index,
                expected.len(),
                actual.len()
            );
            return self.fail(msg);
        }

        if let Some((i, (e, a))) = expected
            .iter()
            .zip(actual)
            .enumerate()
            .find(|(_, (e, a))| e != a)
        {
            let msg = format!(
                "Failure in {}_reg: rect comparison for index {} - rect {} is {} but expected {}",
                self.test_name, self.index, i, a, e
            );
            return self.fail(msg);
        }

        true
    }

    /// Compare two fields sample by sample
    ///
    /// Dimensions and channel counts must match exactly; samples may differ
    /// by at most `delta`.
    pub fn compare_fields(&mut self, expected: &Field, actual: &Field, delta: f32) -> bool {
        self.index += 1;

        if expected.dimensions() != actual.dimensions() || expected.channels() != actual.channels()
        {
            let msg = format!(
                "Failure in {}_reg: field comparison for index {} - shape mismatch",
                self.test_name, self.index
            );
            return self.fail(msg);
        }

        let nc = expected.channels() as usize;
        let mismatch = expected
            .data()
            .iter()
            .zip(actual.data())
            .position(|(e, a)| !((e - a).abs() <= delta));
        if let Some(pos) = mismatch {
            let pixel = pos / nc;
            let (x, y) = (pixel as u32 % expected.width(), pixel as u32 / expected.width());
            let msg = format!(
                "Failure in {}_reg: field comparison for index {} - sample mismatch at ({}, {}) channel {}",
                self.test_name,
                self.index,
                x,
                y,
                pos % nc
            );
            return self.fail(msg);
        }

        true
    }

    /// Compare two byte strings for exact equality
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

    /// Clean up and report results
    ///
    /// Returns `true` if all comparisons passed.
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

    /// Check if all comparisons have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
