//! Pure state transitions
//!
//! Every function here takes accounts by reference and returns their next
//! values, so a failed operation never leaves partial writes behind.

pub mod liquidity;
pub mod position;
pub mod reward;
pub mod swap;
pub mod tick;
pub mod tick_sequence;

pub use liquidity::*;
pub use position::*;
pub use reward::*;
pub use swap::*;
pub use tick::*;
pub use tick_sequence::*;
