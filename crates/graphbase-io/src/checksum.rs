/// Modulus of the running checksum, 2^30 - 1.
pub const CHECKSUM_MODULUS: u64 = (1 << 30) - 1;

/// Running checksum over the lines of a GB file.
///
/// Each byte of a line, then a trailing newline, is folded in as
/// `sum = (2 * sum + byte) mod CHECKSUM_MODULUS`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Checksum {
    sum: u64,
}

impl Checksum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_line(&mut self, line: &str) {
        for byte in line.bytes().chain(std::iter::once(b'\n')) {
            self.sum = (self.sum * 2 + u64::from(byte)) % CHECKSUM_MODULUS;
        }
    }

    pub fn value(&self) -> u64 {
        self.sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_value() {
        let mut checksum = Checksum::new();
        checksum.update_line("AB");
        // (('A' * 2) + 'B') * 2 + '\n'
        assert_eq!(checksum.value(), ((65 * 2 + 66) * 2 + 10) as u64);
    }

    #[test]
    fn test_order_sensitive() {
        let mut first = Checksum::new();
        first.update_line("ab");
        let mut second = Checksum::new();
        second.update_line("ba");
        assert_ne!(first, second);
    }

    #[test]
    fn test_stays_below_modulus() {
        let mut checksum = Checksum::new();
        for _ in 0..100 {
            checksum.update_line("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
        }
        assert!(checksum.value() < CHECKSUM_MODULUS);
    }
}
