//! Ordered tick array pages a swap may traverse

use yeveswap_math::{MAX_TICK_INDEX, MIN_TICK_INDEX};

use crate::error::{CoreResult, YeveswapError};
use crate::logic::tick::{crossing_liquidity_delta, next_tick_cross_update};
use crate::state::{GrowthSnapshot, Tick, TickArray};

/// Result of searching for the next swap boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSearch {
    pub tick_index: i32,
    /// Page holding `tick_index`; `None` for stopping points that are not crossed
    pub array_index: Option<usize>,
}

/// Working copies of the pages a swap was given, contiguous in swap direction.
///
/// The swap mutates these copies; the caller writes them back only if the
/// whole swap succeeds.
#[derive(Debug, Clone)]
pub struct SwapTickSequence {
    arrays: Vec<TickArray>,
    tick_spacing: u16,
    a_to_b: bool,
}

impl SwapTickSequence {
    /// The first page must cover `tick_current_index` (shifted by one spacing
    /// for B to A) and each following page must sit directly beyond the
    /// previous one in swap direction.
    pub fn new(
        arrays: Vec<TickArray>,
        tick_spacing: u16,
        tick_current_index: i32,
        a_to_b: bool,
    ) -> CoreResult<Self> {
        let first = arrays.first().ok_or(YeveswapError::InsufficientTickArrays)?;
        if !first.in_search_range(tick_current_index, tick_spacing, !a_to_b) {
            return Err(YeveswapError::InvalidTickArraySequence);
        }

        let span = TickArray::span(tick_spacing);
        for pair in arrays.windows(2) {
            let expected = if a_to_b {
                pair[0].start_tick_index - span
            } else {
                pair[0].start_tick_index + span
            };
            if pair[1].start_tick_index != expected {
                return Err(YeveswapError::InvalidTickArraySequence);
            }
        }

        Ok(Self {
            arrays,
            tick_spacing,
            a_to_b,
        })
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    pub fn into_arrays(self) -> Vec<TickArray> {
        self.arrays
    }

    pub fn get_tick(&self, array_index: usize, tick_index: i32) -> CoreResult<&Tick> {
        self.arrays
            .get(array_index)
            .ok_or(YeveswapError::InsufficientTickArrays)?
            .get_tick(tick_index, self.tick_spacing)
    }

    /// Next boundary the price reaches moving from `tick_index` in swap direction.
    ///
    /// Returns the next initialized tick inside the supplied pages. When the
    /// pages run out first, returns the last tick still inside the last page:
    /// its start for A to B, one below the next page's start for B to A. The
    /// swap stops there and fails if it still has amount left. At the ends of
    /// the tick range the range limit itself is returned.
    pub fn get_next_initialized_tick_index(&self, tick_index: i32) -> CoreResult<TickSearch> {
        let shifted = !self.a_to_b;
        let mut array_index = self
            .arrays
            .iter()
            .position(|array| array.in_search_range(tick_index, self.tick_spacing, shifted))
            .ok_or(YeveswapError::InsufficientTickArrays)?;
        let mut search_index = tick_index;

        loop {
            let array = &self.arrays[array_index];
            if let Some(next) =
                array.next_initialized_tick_index(search_index, self.tick_spacing, self.a_to_b)?
            {
                return Ok(TickSearch {
                    tick_index: next,
                    array_index: Some(array_index),
                });
            }

            let start = array.start_tick_index;
            let end = array.end_tick_index(self.tick_spacing);

            if self.a_to_b && start <= MIN_TICK_INDEX {
                return Ok(TickSearch {
                    tick_index: MIN_TICK_INDEX,
                    array_index: None,
                });
            }
            if !self.a_to_b && end > MAX_TICK_INDEX {
                return Ok(TickSearch {
                    tick_index: MAX_TICK_INDEX,
                    array_index: None,
                });
            }

            if array_index + 1 == self.arrays.len() {
                return Ok(if self.a_to_b {
                    TickSearch {
                        tick_index: start,
                        array_index: Some(array_index),
                    }
                } else {
                    // The tick at `end` belongs to a page that was not supplied
                    TickSearch {
                        tick_index: end - 1,
                        array_index: None,
                    }
                });
            }

            // Continue from the edge of this page into the next one
            search_index = if self.a_to_b { start - 1 } else { end - 1 };
            array_index += 1;
        }
    }

    /// Cross `tick_index` in page `array_index`, flipping its outside growth,
    /// and return the change to active liquidity.
    pub fn cross_tick(
        &mut self,
        array_index: usize,
        tick_index: i32,
        globals: &GrowthSnapshot,
    ) -> CoreResult<i128> {
        let tick_spacing = self.tick_spacing;
        let a_to_b = self.a_to_b;
        let array = self
            .arrays
            .get_mut(array_index)
            .ok_or(YeveswapError::InsufficientTickArrays)?;

        let tick = *array.get_tick(tick_index, tick_spacing)?;
        if !tick.initialized {
            return Ok(0);
        }

        let delta = crossing_liquidity_delta(&tick, a_to_b)?;
        array.update_tick(tick_index, tick_spacing, next_tick_cross_update(&tick, globals))?;
        Ok(delta)
    }
}
