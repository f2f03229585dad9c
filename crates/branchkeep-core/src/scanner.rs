//! Barcode sources.

use rand::Rng;

/// Something that yields barcodes.
pub trait Scanner {
    /// Produce the next scanned code, or `None` if nothing was read.
    fn scan(&mut self) -> Option<String>;
}

/// Emits random, well-formed EAN-13 codes in place of a camera.
#[derive(Debug)]
pub struct SimulatedScanner<R> {
    rng: R,
}

impl SimulatedScanner<rand::rngs::ThreadRng> {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for SimulatedScanner<rand::rngs::ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SimulatedScanner<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Scanner for SimulatedScanner<R> {
    fn scan(&mut self) -> Option<String> {
        let mut code: String = (0..12)
            .map(|_| char::from(b'0' + self.rng.gen_range(0..10u8)))
            .collect();
        code.push(char::from(b'0' + ean13_check_digit(&code)?));
        Some(code)
    }
}

/// Check digit for the first 12 digits of an EAN-13 code.
pub fn ean13_check_digit(digits: &str) -> Option<u8> {
    if digits.len() != 12 {
        return None;
    }

    let mut sum = 0u32;
    for (i, c) in digits.chars().enumerate() {
        let d = c.to_digit(10)?;
        sum += if i % 2 == 0 { d } else { d * 3 };
    }
    // sum % 10 is < 10, so the result always fits a u8.
    Some(((10 - sum % 10) % 10) as u8)
}
