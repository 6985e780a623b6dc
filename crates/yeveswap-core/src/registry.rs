//! Per-pool tick array storage
//!
//! Pages live in an arena and are located through an ordered map from aligned
//! start index to arena slot. Pages are never resized or removed once created.

use std::collections::BTreeMap;

use tracing::info;

use crate::error::{AccountKind, CoreResult, YeveswapError};
use crate::logic::tick_sequence::SwapTickSequence;
use crate::state::{start_tick_index_for, Address, Tick, TickArray};

#[derive(Debug, Clone)]
pub struct TickArrayRegistry {
    pool: Address,
    tick_spacing: u16,
    pages: Vec<TickArray>,
    slots: BTreeMap<i32, usize>,
}

impl TickArrayRegistry {
    pub fn new(pool: Address, tick_spacing: u16) -> Self {
        Self {
            pool,
            tick_spacing,
            pages: Vec::new(),
            slots: BTreeMap::new(),
        }
    }

    pub fn pool(&self) -> Address {
        self.pool
    }

    pub fn tick_spacing(&self) -> u16 {
        self.tick_spacing
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn contains(&self, start_tick_index: i32) -> bool {
        self.slots.contains_key(&start_tick_index)
    }

    /// Pages in ascending start order.
    pub fn pages(&self) -> impl Iterator<Item = &TickArray> {
        self.slots.values().map(move |&slot| &self.pages[slot])
    }

    /// Create an empty page at `start_tick_index`.
    pub fn initialize_tick_array(&mut self, start_tick_index: i32) -> CoreResult<&TickArray> {
        if self.contains(start_tick_index) {
            return Err(YeveswapError::AccountAlreadyInitialized(AccountKind::TickArray));
        }
        let page = TickArray::new(self.pool, start_tick_index, self.tick_spacing)?;

        let slot = self.pages.len();
        self.pages.push(page);
        self.slots.insert(start_tick_index, slot);

        info!(pool = %self.pool, start_tick_index, "tick array initialized");
        Ok(&self.pages[slot])
    }

    pub fn get(&self, start_tick_index: i32) -> CoreResult<&TickArray> {
        self.slots
            .get(&start_tick_index)
            .map(|&slot| &self.pages[slot])
            .ok_or(YeveswapError::TickArrayNotFound { start_tick_index })
    }

    fn slot_for_tick(&self, tick_index: i32) -> CoreResult<usize> {
        Tick::check_is_usable_tick(tick_index, self.tick_spacing)?;
        let start_tick_index = start_tick_index_for(tick_index, self.tick_spacing);
        self.slots
            .get(&start_tick_index)
            .copied()
            .ok_or(YeveswapError::TickArrayNotFound { start_tick_index })
    }

    /// Tick at `tick_index`. Fails if the index is off the spacing grid or its
    /// page was never initialized.
    pub fn get_tick(&self, tick_index: i32) -> CoreResult<&Tick> {
        let slot = self.slot_for_tick(tick_index)?;
        self.pages[slot].get_tick(tick_index, self.tick_spacing)
    }

    /// Overwrite a tick with a precomputed value.
    pub fn set_tick(&mut self, tick_index: i32, tick: Tick) -> CoreResult<()> {
        let slot = self.slot_for_tick(tick_index)?;
        self.pages[slot].update_tick(tick_index, self.tick_spacing, tick)
    }

    /// Copies of the pages at `start_tick_indexes`, in the order given, ready
    /// for a swap from `tick_current_index`.
    pub fn swap_sequence(
        &self,
        start_tick_indexes: &[i32],
        tick_current_index: i32,
        a_to_b: bool,
        max_tick_arrays: usize,
    ) -> CoreResult<SwapTickSequence> {
        if start_tick_indexes.len() > max_tick_arrays {
            return Err(YeveswapError::TooManyTickArrays {
                supplied: start_tick_indexes.len(),
                max: max_tick_arrays,
            });
        }
        let arrays = start_tick_indexes
            .iter()
            .map(|&start| self.get(start).cloned())
            .collect::<CoreResult<Vec<_>>>()?;
        SwapTickSequence::new(arrays, self.tick_spacing, tick_current_index, a_to_b)
    }

    /// Write back pages a swap modified.
    pub fn commit_arrays(&mut self, arrays: Vec<TickArray>) -> CoreResult<()> {
        // Resolve every slot first so a bad page leaves the registry untouched
        let slots = arrays
            .iter()
            .map(|array| {
                if array.pool != self.pool {
                    return Err(YeveswapError::AccountRelationMismatch(AccountKind::TickArray));
                }
                self.slots
                    .get(&array.start_tick_index)
                    .copied()
                    .ok_or(YeveswapError::TickArrayNotFound {
                        start_tick_index: array.start_tick_index,
                    })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        for (slot, array) in slots.into_iter().zip(arrays) {
            self.pages[slot] = array;
        }
        Ok(())
    }

    /// Sum of net liquidity over every initialized tick of the pool.
    pub fn liquidity_net_sum(&self) -> CoreResult<i128> {
        self.pages.iter().try_fold(0i128, |sum, page| {
            sum.checked_add(page.liquidity_net_sum()?)
                .ok_or(YeveswapError::LiquidityNetError)
        })
    }

    pub fn initialized_tick_count(&self) -> usize {
        self.pages.iter().map(TickArray::initialized_tick_count).sum()
    }
}
