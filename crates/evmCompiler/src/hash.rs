use alloy_primitives::U256;
use sha3::{Digest, Keccak256};

/// Content hash used for the code-hash table.
pub trait CodeHasher {
    fn hash(&self, code: &[u8]) -> U256;
}

/// Keccak-256 of the code, read as a big-endian word.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keccak256Hasher;

impl CodeHasher for Keccak256Hasher {
    fn hash(&self, code: &[u8]) -> U256 {
        U256::from_be_slice(&Keccak256::digest(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_of_empty_code() {
        let expected = U256::from_be_slice(
            &hex::decode("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
                .unwrap(),
        );
        assert_eq!(Keccak256Hasher.hash(&[]), expected);
    }
}
