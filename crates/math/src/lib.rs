//! # Yeveswap Math
//!
//! Fixed-point arithmetic for the concentrated liquidity engine:
//!
//! - Q64.64 square-root prices and the tick <-> price bijection
//! - token amount deltas and price movement through constant liquidity
//! - single swap-step computation with fees
//! - fee and reward growth accrual
//!
//! Every operation is checked. Overflow and out-of-domain inputs surface
//! as [`MathError`] rather than wrapping or saturating.

pub mod constants;
pub mod errors;
pub mod fee_math;
pub mod fixed_point;
pub mod liquidity_math;
pub mod safe;
pub mod swap_math;
pub mod tick_math;

pub use constants::*;
pub use errors::{MathError, MathResult};
pub use fee_math::*;
pub use fixed_point::*;
pub use liquidity_math::*;
pub use safe::*;
pub use swap_math::*;
pub use tick_math::*;
