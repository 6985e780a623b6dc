//! Tick data structures for concentrated liquidity
//!
//! Ticks live in fixed-capacity pages of `TICK_ARRAY_SIZE` entries. A page
//! covers `[start_tick_index, start_tick_index + TICK_ARRAY_SIZE * tick_spacing)`
//! and its start is always a multiple of that span.

use borsh::{BorshDeserialize, BorshSerialize};
use static_assertions::const_assert_eq;
use yeveswap_math::{MAX_TICK_INDEX, MIN_TICK_INDEX};

use crate::constants::{NUM_REWARDS, TICK_ARRAY_SIZE, TICK_ARRAY_SIZE_USIZE};
use crate::error::{CoreResult, YeveswapError};
use crate::state::{Address, Persisted};

/// Fee and reward growth values for one reference frame: global, inside a
/// range, or outside a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrowthSnapshot {
    pub fee_a: u128,
    pub fee_b: u128,
    pub rewards: [u128; NUM_REWARDS],
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tick {
    pub initialized: bool,              // 1 byte
    pub liquidity_net: i128,            // 16 bytes
    pub liquidity_gross: u128,          // 16 bytes
    pub fee_growth_outside_a: u128,     // 16 bytes - Q64 fixed point
    pub fee_growth_outside_b: u128,     // 16 bytes - Q64 fixed point
    pub reward_growths_outside: [u128; NUM_REWARDS], // 16 bytes each
}

impl Tick {
    pub const LEN: usize = 1 + 16 + 16 + 16 + 16 + 16 * NUM_REWARDS;

    pub fn outside_growth(&self) -> GrowthSnapshot {
        GrowthSnapshot {
            fee_a: self.fee_growth_outside_a,
            fee_b: self.fee_growth_outside_b,
            rewards: self.reward_growths_outside,
        }
    }

    pub fn set_outside_growth(&mut self, growth: &GrowthSnapshot) {
        self.fee_growth_outside_a = growth.fee_a;
        self.fee_growth_outside_b = growth.fee_b;
        self.reward_growths_outside = growth.rewards;
    }

    /// Tick index is within the valid range and on the spacing grid.
    pub fn check_is_usable_tick(tick_index: i32, tick_spacing: u16) -> CoreResult<()> {
        if !(MIN_TICK_INDEX..=MAX_TICK_INDEX).contains(&tick_index) {
            return Err(YeveswapError::InvalidTickIndex(tick_index));
        }
        if tick_spacing == 0 {
            return Err(YeveswapError::InvalidTickSpacing);
        }
        if tick_index % i32::from(tick_spacing) != 0 {
            return Err(YeveswapError::TickNotAligned {
                tick_index,
                tick_spacing,
            });
        }
        Ok(())
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct TickArray {
    pub start_tick_index: i32,
    pub ticks: [Tick; TICK_ARRAY_SIZE_USIZE],
    pub pool: Address,
}

impl Default for TickArray {
    fn default() -> Self {
        Self {
            start_tick_index: 0,
            ticks: [Tick::default(); TICK_ARRAY_SIZE_USIZE],
            pool: Address::default(),
        }
    }
}

impl TickArray {
    // TickArray layout: start_tick_index(4) + ticks(Tick::LEN * 88) + pool(32)
    pub const LEN: usize = 4 + Tick::LEN * TICK_ARRAY_SIZE_USIZE + 32;

    /// Empty page starting at `start_tick_index`, which must be page aligned.
    pub fn new(pool: Address, start_tick_index: i32, tick_spacing: u16) -> CoreResult<Self> {
        if !is_valid_start_tick_index(start_tick_index, tick_spacing) {
            return Err(YeveswapError::InvalidTickArrayStart { start_tick_index });
        }
        Ok(Self {
            start_tick_index,
            pool,
            ..Default::default()
        })
    }

    pub fn span(tick_spacing: u16) -> i32 {
        TICK_ARRAY_SIZE * i32::from(tick_spacing)
    }

    pub fn end_tick_index(&self, tick_spacing: u16) -> i32 {
        self.start_tick_index + Self::span(tick_spacing)
    }

    pub fn contains(&self, tick_index: i32, tick_spacing: u16) -> bool {
        tick_index >= self.start_tick_index && tick_index < self.end_tick_index(tick_spacing)
    }

    /// Whether a swap searching from `tick_index` starts in this page.
    ///
    /// B to A searches begin one spacing above the current tick, so the page
    /// range is shifted down by one spacing in that direction.
    pub fn in_search_range(&self, tick_index: i32, tick_spacing: u16, shifted: bool) -> bool {
        let shift = if shifted { i32::from(tick_spacing) } else { 0 };
        let lower = self.start_tick_index - shift;
        let upper = self.end_tick_index(tick_spacing) - shift;
        tick_index >= lower && tick_index < upper
    }

    /// Returns the index within the array for a global tick index
    pub fn tick_offset(&self, tick_index: i32, tick_spacing: u16) -> CoreResult<usize> {
        Tick::check_is_usable_tick(tick_index, tick_spacing)?;
        if !self.contains(tick_index, tick_spacing) {
            return Err(YeveswapError::TickArrayNotFound {
                start_tick_index: start_tick_index_for(tick_index, tick_spacing),
            });
        }
        Ok(((tick_index - self.start_tick_index) / i32::from(tick_spacing)) as usize)
    }

    pub fn get_tick(&self, tick_index: i32, tick_spacing: u16) -> CoreResult<&Tick> {
        let offset = self.tick_offset(tick_index, tick_spacing)?;
        Ok(&self.ticks[offset])
    }

    pub fn update_tick(&mut self, tick_index: i32, tick_spacing: u16, tick: Tick) -> CoreResult<()> {
        let offset = self.tick_offset(tick_index, tick_spacing)?;
        self.ticks[offset] = tick;
        Ok(())
    }

    /// Next initialized tick in swap direction, starting from `tick_index`.
    ///
    /// A to B includes the tick at `tick_index`'s own grid cell and walks down;
    /// B to A starts one cell above and walks up. `None` when the page holds
    /// no further initialized tick.
    pub fn next_initialized_tick_index(
        &self,
        tick_index: i32,
        tick_spacing: u16,
        a_to_b: bool,
    ) -> CoreResult<Option<i32>> {
        if !self.in_search_range(tick_index, tick_spacing, !a_to_b) {
            return Err(YeveswapError::InvalidTickArraySequence);
        }

        let spacing = i32::from(tick_spacing);
        let mut offset = (tick_index - self.start_tick_index).div_euclid(spacing);
        if !a_to_b {
            offset += 1;
        }

        while (0..TICK_ARRAY_SIZE).contains(&offset) {
            if self.ticks[offset as usize].initialized {
                return Ok(Some(self.start_tick_index + offset * spacing));
            }
            offset += if a_to_b { -1 } else { 1 };
        }
        Ok(None)
    }

    pub fn initialized_tick_count(&self) -> usize {
        self.ticks.iter().filter(|tick| tick.initialized).count()
    }

    /// Sum of `liquidity_net` over every initialized tick in this page.
    pub fn liquidity_net_sum(&self) -> CoreResult<i128> {
        self.ticks
            .iter()
            .filter(|tick| tick.initialized)
            .try_fold(0i128, |sum, tick| {
                sum.checked_add(tick.liquidity_net)
                    .ok_or(YeveswapError::LiquidityNetError)
            })
    }
}

impl Persisted for Tick {
    const LEN: usize = Tick::LEN;
}

impl Persisted for TickArray {
    const LEN: usize = TickArray::LEN;
}

/// Start of the page covering `tick_index`.
pub fn start_tick_index_for(tick_index: i32, tick_spacing: u16) -> i32 {
    let span = TickArray::span(tick_spacing.max(1));
    tick_index.div_euclid(span) * span
}

pub fn is_valid_start_tick_index(start_tick_index: i32, tick_spacing: u16) -> bool {
    if tick_spacing == 0 {
        return false;
    }
    let span = TickArray::span(tick_spacing);
    if start_tick_index % span != 0 {
        return false;
    }
    // The page must overlap the usable tick range
    let min_start = start_tick_index_for(MIN_TICK_INDEX, tick_spacing);
    (min_start..=MAX_TICK_INDEX).contains(&start_tick_index)
}

// Compile-time size assertions keep the persisted layout stable
const_assert_eq!(Tick::LEN, 113);
const_assert_eq!(TickArray::LEN, 4 + 113 * 88 + 32);

#[cfg(test)]
mod tests {
    use super::*;

    fn initialized_tick(liquidity_net: i128) -> Tick {
        Tick {
            initialized: true,
            liquidity_net,
            liquidity_gross: liquidity_net.unsigned_abs(),
            ..Default::default()
        }
    }

    #[test]
    fn test_start_tick_index_for() {
        assert_eq!(start_tick_index_for(0, 64), 0);
        assert_eq!(start_tick_index_for(5_631, 64), 0);
        assert_eq!(start_tick_index_for(5_632, 64), 5_632);
        assert_eq!(start_tick_index_for(-1, 64), -5_632);
        assert_eq!(start_tick_index_for(-5_632, 64), -5_632);
    }

    #[test]
    fn test_valid_start_tick_index() {
        assert!(is_valid_start_tick_index(0, 64));
        assert!(is_valid_start_tick_index(-5_632, 64));
        assert!(!is_valid_start_tick_index(64, 64));
        assert!(!is_valid_start_tick_index(0, 0));
        // Page holding MIN_TICK_INDEX is valid, the one below is not
        let min_start = start_tick_index_for(MIN_TICK_INDEX, 64);
        assert!(is_valid_start_tick_index(min_start, 64));
        assert!(!is_valid_start_tick_index(min_start - 5_632, 64));
        assert!(!is_valid_start_tick_index(
            start_tick_index_for(MAX_TICK_INDEX, 64) + 5_632,
            64
        ));
    }

    #[test]
    fn test_new_rejects_unaligned_start() {
        assert_eq!(
            TickArray::new(Address::new_unique(), 64, 64),
            Err(YeveswapError::InvalidTickArrayStart {
                start_tick_index: 64
            })
        );
    }

    #[test]
    fn test_tick_offset() {
        let array = TickArray::new(Address::new_unique(), -5_632, 64).unwrap();
        assert_eq!(array.tick_offset(-5_632, 64).unwrap(), 0);
        assert_eq!(array.tick_offset(-64, 64).unwrap(), 87);
        assert_eq!(
            array.tick_offset(-63, 64),
            Err(YeveswapError::TickNotAligned {
                tick_index: -63,
                tick_spacing: 64
            })
        );
        assert_eq!(
            array.tick_offset(0, 64),
            Err(YeveswapError::TickArrayNotFound {
                start_tick_index: 0
            })
        );
    }

    #[test]
    fn test_next_initialized_tick_a_to_b_includes_current_cell() {
        let mut array = TickArray::new(Address::new_unique(), 0, 64).unwrap();
        array.update_tick(640, 64, initialized_tick(10)).unwrap();

        assert_eq!(
            array.next_initialized_tick_index(700, 64, true).unwrap(),
            Some(640)
        );
        assert_eq!(
            array.next_initialized_tick_index(640, 64, true).unwrap(),
            Some(640)
        );
        assert_eq!(array.next_initialized_tick_index(639, 64, true).unwrap(), None);
    }

    #[test]
    fn test_next_initialized_tick_b_to_a_skips_current_cell() {
        let mut array = TickArray::new(Address::new_unique(), 0, 64).unwrap();
        array.update_tick(640, 64, initialized_tick(10)).unwrap();

        assert_eq!(
            array.next_initialized_tick_index(576, 64, false).unwrap(),
            Some(640)
        );
        assert_eq!(array.next_initialized_tick_index(640, 64, false).unwrap(), None);
        // Shifted range: one spacing below the page start still searches from offset 0
        array.update_tick(0, 64, initialized_tick(5)).unwrap();
        assert_eq!(
            array.next_initialized_tick_index(-1, 64, false).unwrap(),
            Some(0)
        );
    }

    #[test]
    fn test_next_initialized_tick_outside_search_range() {
        let array = TickArray::new(Address::new_unique(), 0, 64).unwrap();
        assert_eq!(
            array.next_initialized_tick_index(-1, 64, true),
            Err(YeveswapError::InvalidTickArraySequence)
        );
        assert_eq!(
            array.next_initialized_tick_index(5_600, 64, false),
            Err(YeveswapError::InvalidTickArraySequence)
        );
    }

    #[test]
    fn test_liquidity_net_sum() {
        let mut array = TickArray::new(Address::new_unique(), 0, 64).unwrap();
        array.update_tick(0, 64, initialized_tick(100)).unwrap();
        array.update_tick(640, 64, initialized_tick(-100)).unwrap();
        assert_eq!(array.initialized_tick_count(), 2);
        assert_eq!(array.liquidity_net_sum().unwrap(), 0);
    }

    #[test]
    fn test_persisted_lengths() {
        let array = TickArray::new(Address::new_unique(), 0, 64).unwrap();
        let bytes = array.to_bytes().unwrap();
        assert_eq!(bytes.len(), TickArray::LEN);
        assert_eq!(TickArray::from_bytes(&bytes).unwrap(), array);
        assert_eq!(
            TickArray::from_bytes(&bytes[1..]),
            Err(YeveswapError::AccountDataLength {
                expected: TickArray::LEN,
                actual: TickArray::LEN - 1
            })
        );
    }
}
