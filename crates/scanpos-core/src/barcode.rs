//! # Barcode Generation
//!
//! Products created without a barcode get a random 13-digit numeric code,
//! zero-padded on the left (EAN-13 length, no check digit semantics).

use rand::Rng;

use crate::BARCODE_LENGTH;

/// Exclusive upper bound of a 13-digit code.
const BARCODE_SPACE: u64 = 10_000_000_000_000;

/// Draws a barcode from the given random source.
///
/// ## Example
/// ```rust
/// use rand::SeedableRng;
/// use scanpos_core::barcode::generate_barcode_with;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let code = generate_barcode_with(&mut rng);
/// assert_eq!(code.len(), 13);
/// assert!(code.chars().all(|c| c.is_ascii_digit()));
/// ```
pub fn generate_barcode_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let n = rng.random_range(0..BARCODE_SPACE);
    format_barcode(n)
}

/// Draws a barcode from the thread-local generator.
pub fn generate_barcode() -> String {
    generate_barcode_with(&mut rand::rng())
}

fn format_barcode(n: u64) -> String {
    format!("{:0width$}", n, width = BARCODE_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_small_numbers_are_zero_padded() {
        assert_eq!(format_barcode(42), "0000000000042");
        assert_eq!(format_barcode(0), "0000000000000");
        assert_eq!(format_barcode(BARCODE_SPACE - 1), "9999999999999");
    }

    #[test]
    fn test_generated_barcodes_are_13_digits() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(2024);
        for _ in 0..500 {
            let code = generate_barcode_with(&mut rng);
            assert_eq!(code.len(), BARCODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
        assert_eq!(generate_barcode().len(), BARCODE_LENGTH);
    }
}
