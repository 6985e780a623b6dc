use yeveswap_core::state::{is_valid_start_tick_index, start_tick_index_for, TickArray};

/// Start indexes of up to `count` pages a swap from `tick_current_index` walks
/// through, in swap direction. Stops early at the edge of the tick range.
pub fn swap_tick_array_starts(
    tick_current_index: i32,
    tick_spacing: u16,
    a_to_b: bool,
    count: usize,
) -> Vec<i32> {
    let span = TickArray::span(tick_spacing);
    let first = if a_to_b {
        start_tick_index_for(tick_current_index, tick_spacing)
    } else {
        start_tick_index_for(tick_current_index + i32::from(tick_spacing), tick_spacing)
    };

    (0..count as i32)
        .map(|i| if a_to_b { first - i * span } else { first + i * span })
        .take_while(|&start| is_valid_start_tick_index(start, tick_spacing))
        .collect()
}

/// Pages covering both ends of a position range.
pub fn position_tick_array_starts(tick_lower_index: i32, tick_upper_index: i32, tick_spacing: u16) -> Vec<i32> {
    let lower = start_tick_index_for(tick_lower_index, tick_spacing);
    let upper = start_tick_index_for(tick_upper_index, tick_spacing);
    if lower == upper {
        vec![lower]
    } else {
        vec![lower, upper]
    }
}
