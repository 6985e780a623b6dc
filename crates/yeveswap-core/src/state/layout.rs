//! Stable binary layout for persisted records
//!
//! Records are borsh-encoded in field declaration order with fixed-width
//! little-endian integers and no discriminator, so every record of a type
//! has exactly `LEN` bytes.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::{CoreResult, YeveswapError};

pub trait Persisted: BorshSerialize + BorshDeserialize + Sized {
    const LEN: usize;

    fn to_bytes(&self) -> CoreResult<Vec<u8>> {
        let bytes = self
            .try_to_vec()
            .map_err(|e| YeveswapError::Serialization(e.to_string()))?;
        if bytes.len() != Self::LEN {
            return Err(YeveswapError::AccountDataLength {
                expected: Self::LEN,
                actual: bytes.len(),
            });
        }
        Ok(bytes)
    }

    fn from_bytes(data: &[u8]) -> CoreResult<Self> {
        if data.len() != Self::LEN {
            return Err(YeveswapError::AccountDataLength {
                expected: Self::LEN,
                actual: data.len(),
            });
        }
        Self::try_from_slice(data).map_err(|e| YeveswapError::Serialization(e.to_string()))
    }
}
