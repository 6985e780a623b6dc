//! # Tick Math
//!
//! Conversions between tick indices and Q64.64 square-root prices, where
//! `price(tick) = 1.0001^tick` and `sqrt_price_x64 = floor(sqrt(price) * 2^64)`.
//!
//! The forward direction multiplies precomputed `sqrt(1.0001)^(2^i)` factors
//! selected by the bits of `|tick|`. The reverse direction approximates
//! `log_sqrt(1.0001)(sqrt_price)` and corrects the estimate with one forward
//! evaluation, so that `tick_index_from_sqrt_price(sqrt_price_from_tick_index(t)) == t`
//! for every tick in range.

use ethnum::U256;

use crate::constants::{MAX_SQRT_PRICE_X64, MAX_TICK_INDEX, MIN_SQRT_PRICE_X64, MIN_TICK_INDEX};
use crate::errors::{MathError, MathResult};

// Precision of the fractional log2 approximation
const BIT_PRECISION: u32 = 14;

// log_b(2) in Q32.32, b = sqrt(1.0001)
const LOG_B_2_X32: i128 = 59_543_866_431_248;

// Estimate margins around log_b(p): 0.01 below, 2^-precision / log2(b) + 0.01 above
const LOG_B_P_ERR_MARGIN_LOWER_X64: i128 = 184_467_440_737_095_516;
const LOG_B_P_ERR_MARGIN_UPPER_X64: i128 = 15_793_534_762_490_258_745;

// sqrt(1.0001)^(2^i) in Q32.96 for positive ticks, bits 1..=18
const POSITIVE_TICK_FACTORS_X96: [(i32, u128); 18] = [
    (2, 79_236_085_330_515_764_027_303_304_731),
    (4, 79_244_008_939_048_815_603_706_035_061),
    (8, 79_259_858_533_276_714_757_314_932_305),
    (16, 79_291_567_232_598_584_799_939_703_904),
    (32, 79_355_022_692_464_371_645_785_046_466),
    (64, 79_482_085_999_252_804_386_437_311_141),
    (128, 79_736_823_300_114_093_921_829_183_326),
    (256, 80_248_749_790_819_932_309_965_073_892),
    (512, 81_282_483_887_344_747_381_513_967_011),
    (1024, 83_390_072_131_320_151_908_154_831_281),
    (2048, 87_770_609_709_833_776_024_991_924_138),
    (4096, 97_234_110_755_111_693_312_479_820_773),
    (8192, 119_332_217_159_966_728_226_237_229_890),
    (16384, 179_736_315_981_702_064_433_883_588_727),
    (32768, 407_748_233_172_238_350_107_850_275_304),
    (65536, 2_098_478_828_474_011_932_436_660_412_517),
    (131072, 55_581_415_166_113_811_149_459_800_483_533),
    (262144, 38_992_368_544_603_139_932_233_054_999_993_551),
];

// sqrt(1.0001)^-(2^i) in Q64.64 for negative ticks, bits 1..=18
const NEGATIVE_TICK_FACTORS_X64: [(i32, u128); 18] = [
    (2, 18_444_899_583_751_176_498),
    (4, 18_443_055_278_223_354_162),
    (8, 18_439_367_220_385_604_838),
    (16, 18_431_993_317_065_449_817),
    (32, 18_417_254_355_718_160_513),
    (64, 18_387_811_781_193_591_352),
    (128, 18_329_067_761_203_520_168),
    (256, 18_212_142_134_806_087_854),
    (512, 17_980_523_815_641_551_639),
    (1024, 17_526_086_738_831_147_013),
    (2048, 16_651_378_430_235_024_244),
    (4096, 15_030_750_278_693_429_944),
    (8192, 12_247_334_978_882_834_399),
    (16384, 8_131_365_268_884_726_200),
    (32768, 3_584_323_654_723_342_297),
    (65536, 696_457_651_847_595_233),
    (131072, 26_294_789_957_452_057),
    (262144, 37_481_735_321_082),
];

pub fn is_tick_index_in_bounds(tick_index: i32) -> bool {
    (MIN_TICK_INDEX..=MAX_TICK_INDEX).contains(&tick_index)
}

pub fn is_sqrt_price_in_bounds(sqrt_price_x64: u128) -> bool {
    (MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&sqrt_price_x64)
}

/// Exact Q64.64 square-root price of a tick.
pub fn sqrt_price_from_tick_index(tick_index: i32) -> MathResult<u128> {
    if !is_tick_index_in_bounds(tick_index) {
        return Err(MathError::TickIndexOutOfBounds(tick_index));
    }

    if tick_index >= 0 {
        Ok(sqrt_price_positive_tick(tick_index))
    } else {
        Ok(sqrt_price_negative_tick(tick_index))
    }
}

fn sqrt_price_positive_tick(tick_index: i32) -> u128 {
    let mut ratio: u128 = if tick_index & 1 != 0 {
        79_232_123_823_359_799_118_286_999_567
    } else {
        79_228_162_514_264_337_593_543_950_336
    };

    for (bit, factor) in POSITIVE_TICK_FACTORS_X96 {
        if tick_index & bit != 0 {
            ratio = mul_shift_96(ratio, factor);
        }
    }

    ratio >> 32
}

fn sqrt_price_negative_tick(tick_index: i32) -> u128 {
    let abs_tick = tick_index.abs();

    let mut ratio: u128 = if abs_tick & 1 != 0 {
        18_445_821_805_675_392_311
    } else {
        18_446_744_073_709_551_616
    };

    // ratio <= 2^64 and every factor < 2^64, so the product fits in u128
    for (bit, factor) in NEGATIVE_TICK_FACTORS_X64 {
        if abs_tick & bit != 0 {
            ratio = (ratio * factor) >> 64;
        }
    }

    ratio
}

fn mul_shift_96(n0: u128, n1: u128) -> u128 {
    ((U256::from(n0) * U256::from(n1)) >> 96u32).as_u128()
}

/// Largest tick whose square-root price is at or below `sqrt_price_x64`.
pub fn tick_index_from_sqrt_price(sqrt_price_x64: u128) -> MathResult<i32> {
    if !is_sqrt_price_in_bounds(sqrt_price_x64) {
        return Err(MathError::SqrtPriceOutOfBounds);
    }

    // Integer part of log2 from the most significant bit
    let msb: u32 = 128 - sqrt_price_x64.leading_zeros() - 1;
    let log2p_integer_x32 = (msb as i128 - 64) << 32;

    // Fractional part, one bit per squaring of r / 2^msb in Q1.63
    let mut bit: i128 = 0x8000_0000_0000_0000;
    let mut precision = 0;
    let mut log2p_fraction_x64: i128 = 0;

    let mut r = if msb >= 64 {
        sqrt_price_x64 >> (msb - 63)
    } else {
        sqrt_price_x64 << (63 - msb)
    };

    while bit > 0 && precision < BIT_PRECISION {
        r *= r;
        let is_r_more_than_two = (r >> 127) as u32;
        r >>= 63 + is_r_more_than_two;
        log2p_fraction_x64 += bit * is_r_more_than_two as i128;
        bit >>= 1;
        precision += 1;
    }

    let log2p_fraction_x32 = log2p_fraction_x64 >> 32;
    let log2p_x32 = log2p_integer_x32 + log2p_fraction_x32;

    let logbp_x64 = log2p_x32 * LOG_B_2_X32;

    let tick_low = ((logbp_x64 - LOG_B_P_ERR_MARGIN_LOWER_X64) >> 64) as i32;
    let tick_high = ((logbp_x64 + LOG_B_P_ERR_MARGIN_UPPER_X64) >> 64) as i32;

    if tick_low == tick_high {
        return Ok(tick_low);
    }

    // tick_high is the answer only when its own price does not exceed the input
    let tick_high_sqrt_price = sqrt_price_from_tick_index(tick_high.min(MAX_TICK_INDEX))?;
    if tick_high <= MAX_TICK_INDEX && tick_high_sqrt_price <= sqrt_price_x64 {
        Ok(tick_high)
    } else {
        Ok(tick_low)
    }
}

/// Round a tick down to the nearest multiple of `tick_spacing`.
pub fn floor_to_tick_spacing(tick_index: i32, tick_spacing: u16) -> i32 {
    let spacing = i32::from(tick_spacing.max(1));
    tick_index.div_euclid(spacing) * spacing
}

/// Largest initializable tick at or below the tick of `sqrt_price_x64`.
pub fn initializable_tick_index_from_sqrt_price(
    sqrt_price_x64: u128,
    tick_spacing: u16,
) -> MathResult<i32> {
    let tick_index = tick_index_from_sqrt_price(sqrt_price_x64)?;
    Ok(floor_to_tick_spacing(tick_index, tick_spacing))
}
