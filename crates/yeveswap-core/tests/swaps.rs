//! Swaps against pools with real positions and token movement

use anyhow::Result;
use yeveswap_core::error::{ErrorKind, YeveswapError};
use yeveswap_core::events::Event;
use yeveswap_core::{Address, SwapParams};
use yeveswap_math::{fee_growth_delta_x64, sqrt_price_from_tick_index};
use yeveswap_test_utils::*;

const LIQUIDITY: u128 = 1_000_000_000;

/// Spacing 64 pool at price 1.0 with one position over [-1280, 1280].
fn pool_with_liquidity(ctx: &mut TestContext) -> Result<(PoolFixture, Address, Address)> {
    let pool = ctx.create_pool(MEDIUM_TICK_SPACING, MEDIUM_FEE_RATE, PRICE_ONE_SQRT_X64)?;
    let lp = ctx.funded_account(&pool);
    let position_mint = ctx.provide_liquidity(&pool, lp, -1280, 1280, LIQUIDITY, 0)?;
    Ok((pool, lp, position_mint))
}

fn swap_params(pool: &PoolFixture, trader: Address, amount: u64, a_to_b: bool) -> SwapParams {
    SwapParams {
        pool: pool.address,
        trader,
        amount,
        other_amount_threshold: 0,
        sqrt_price_limit: 0,
        amount_specified_is_input: true,
        a_to_b,
        tick_array_start_indexes: swap_tick_array_starts(0, pool.tick_spacing, a_to_b, 3),
        timestamp: 0,
    }
}

#[test]
fn test_exact_input_a_to_b() -> Result<()> {
    let mut ctx = TestContext::new()?;
    let (pool, _, _) = pool_with_liquidity(&mut ctx)?;
    let trader = ctx.funded_account(&pool);
    let vault_a_before = ctx.ledger().balance(&pool.token_vault_a, &pool.token_mint_a);
    let vault_b_before = ctx.ledger().balance(&pool.token_vault_b, &pool.token_mint_b);

    ctx.ensure_tick_arrays(&pool, &swap_tick_array_starts(0, pool.tick_spacing, true, 3))?;
    let output = ctx.program.swap(swap_params(&pool, trader, 1_000_000, true))?;
    let update = &output.value;

    assert_eq!(update.amount_a, 1_000_000);
    assert!(update.amount_b > 0 && update.amount_b < 1_000_000);
    assert_eq!(
        ctx.ledger().balance(&trader, &pool.token_mint_a),
        FUNDING_AMOUNT - 1_000_000
    );
    assert_eq!(
        ctx.ledger().balance(&trader, &pool.token_mint_b),
        FUNDING_AMOUNT + update.amount_b
    );
    assert_eq!(
        ctx.ledger().balance(&pool.token_vault_a, &pool.token_mint_a),
        vault_a_before + 1_000_000
    );
    assert_eq!(
        ctx.ledger().balance(&pool.token_vault_b, &pool.token_mint_b),
        vault_b_before - update.amount_b
    );

    let state = ctx.pool(&pool)?;
    assert!(state.sqrt_price < PRICE_ONE_SQRT_X64);
    assert!(state.tick_current_index < 0);
    assert_eq!(state.liquidity, LIQUIDITY);
    // 0.3% of 1,000,000 is 3,000; 3% of that goes to the protocol
    assert_eq!(state.protocol_fee_owed_a, 90);
    assert_eq!(state.protocol_fee_owed_b, 0);
    assert!(state.fee_growth_global_a >= fee_growth_delta_x64(2_910, LIQUIDITY));
    assert_eq!(state.fee_growth_global_b, 0);

    match output.events.as_slice() {
        [Event::Swapped(event)] => {
            assert_eq!(event.amount_in, 1_000_000);
            assert_eq!(event.amount_out, update.amount_b);
            assert_eq!(event.sqrt_price_before, PRICE_ONE_SQRT_X64);
            assert_eq!(event.sqrt_price_after, state.sqrt_price);
        }
        other => panic!("unexpected events: {other:?}"),
    }
    Ok(())
}

#[test]
fn test_exact_output_b_to_a() -> Result<()> {
    let mut ctx = TestContext::new()?;
    let (pool, _, _) = pool_with_liquidity(&mut ctx)?;
    let trader = ctx.funded_account(&pool);

    let update = ctx.swap(&pool, trader, 500_000, false, false, 0, 0)?;
    assert_eq!(update.amount_a, 500_000);
    assert!(update.amount_b > 500_000);

    let state = ctx.pool(&pool)?;
    assert!(state.sqrt_price > PRICE_ONE_SQRT_X64);
    assert!(state.protocol_fee_owed_b > 0);
    assert_eq!(state.protocol_fee_owed_a, 0);
    assert_eq!(
        ctx.ledger().balance(&trader, &pool.token_mint_a),
        FUNDING_AMOUNT + 500_000
    );
    Ok(())
}

#[test]
fn test_thresholds_guard_both_modes() -> Result<()> {
    let mut ctx = TestContext::new()?;
    let (pool, _, _) = pool_with_liquidity(&mut ctx)?;
    let trader = ctx.funded_account(&pool);
    ctx.ensure_tick_arrays(&pool, &swap_tick_array_starts(0, pool.tick_spacing, true, 3))?;
    let before = ctx.pool(&pool)?;

    let error = ctx
        .program
        .swap(SwapParams {
            other_amount_threshold: 1_000_000,
            ..swap_params(&pool, trader, 1_000_000, true)
        })
        .unwrap_err();
    assert!(matches!(
        error,
        YeveswapError::AmountOutBelowMinimum {
            threshold: 1_000_000,
            ..
        }
    ));

    let error = ctx
        .program
        .swap(SwapParams {
            amount_specified_is_input: false,
            other_amount_threshold: 1_000_000,
            ..swap_params(&pool, trader, 1_000_000, true)
        })
        .unwrap_err();
    assert!(matches!(
        error,
        YeveswapError::AmountInAboveMaximum {
            threshold: 1_000_000,
            ..
        }
    ));
    assert_eq!(error.kind(), ErrorKind::SlippageExceeded);

    assert_eq!(ctx.pool(&pool)?, before);
    assert_eq!(ctx.ledger().balance(&trader, &pool.token_mint_a), FUNDING_AMOUNT);
    Ok(())
}

#[test]
fn test_crossing_a_position_boundary() -> Result<()> {
    let mut ctx = TestContext::new()?;
    let (pool, lp, _) = pool_with_liquidity(&mut ctx)?;
    ctx.provide_liquidity(&pool, lp, -640, 640, LIQUIDITY, 0)?;
    assert_eq!(ctx.pool(&pool)?.liquidity, 2 * LIQUIDITY);

    let trader = ctx.funded_account(&pool);
    let limit = sqrt_price_from_tick_index(-1000)?;
    ctx.swap(&pool, trader, u64::MAX / 4, true, true, limit, 0)?;

    let state = ctx.pool(&pool)?;
    assert_eq!(state.sqrt_price, limit);
    assert_eq!(state.tick_current_index, -1000);
    assert_eq!(state.liquidity, LIQUIDITY);

    // Crossing flipped the boundary's outside growth to the global value at that moment
    let registry = ctx.program.store().tick_arrays(&pool.address)?;
    let crossed = registry.get_tick(-640)?;
    assert!(crossed.fee_growth_outside_a > 0);
    assert!(crossed.fee_growth_outside_a < state.fee_growth_global_a);
    assert_eq!(registry.get_tick(-1280)?.fee_growth_outside_a, 0);
    Ok(())
}

#[test]
fn test_swap_back_across_the_boundary() -> Result<()> {
    let mut ctx = TestContext::new()?;
    let (pool, lp, _) = pool_with_liquidity(&mut ctx)?;
    ctx.provide_liquidity(&pool, lp, -640, 640, LIQUIDITY, 0)?;
    let trader = ctx.funded_account(&pool);

    ctx.swap(&pool, trader, u64::MAX / 4, true, true, sqrt_price_from_tick_index(-1000)?, 0)?;
    ctx.swap(&pool, trader, u64::MAX / 4, true, false, sqrt_price_from_tick_index(0)?, 0)?;

    let state = ctx.pool(&pool)?;
    assert_eq!(state.tick_current_index, 0);
    assert_eq!(state.liquidity, 2 * LIQUIDITY);
    Ok(())
}

#[test]
fn test_insufficient_tick_arrays_fails_whole_swap() -> Result<()> {
    let mut ctx = TestContext::new()?;
    let (pool, _, _) = pool_with_liquidity(&mut ctx)?;
    let trader = ctx.funded_account(&pool);
    ctx.ensure_tick_arrays(&pool, &[0])?;
    let before = ctx.pool(&pool)?;

    let error = ctx
        .program
        .swap(SwapParams {
            tick_array_start_indexes: vec![0],
            ..swap_params(&pool, trader, 1_000_000, true)
        })
        .unwrap_err();
    assert_eq!(error, YeveswapError::InsufficientTickArrays);
    assert!(!error.is_retryable());
    assert_eq!(ctx.pool(&pool)?, before);
    Ok(())
}

/// Spacing 64 pool at price 1.0. Liquidity `base` covers [0, 6400) and
/// `boundary` more starts exactly at 5632, the first tick of the second page.
fn pool_with_boundary_on_page_start(ctx: &mut TestContext) -> Result<(PoolFixture, Address)> {
    let pool = ctx.create_pool(MEDIUM_TICK_SPACING, MEDIUM_FEE_RATE, PRICE_ONE_SQRT_X64)?;
    let lp = ctx.funded_account(&pool);
    ctx.provide_liquidity(&pool, lp, 0, 6400, LIQUIDITY, 0)?;
    ctx.provide_liquidity(&pool, lp, 5632, 6400, 5 * LIQUIDITY, 0)?;
    let trader = ctx.funded_account(&pool);
    Ok((pool, trader))
}

#[test]
fn test_b_to_a_stops_short_of_unsupplied_page() -> Result<()> {
    let mut ctx = TestContext::new()?;
    let (pool, trader) = pool_with_boundary_on_page_start(&mut ctx)?;
    let before = ctx.pool(&pool)?;
    let limit = sqrt_price_from_tick_index(5632)?;

    // Without the page holding 5632 the swap cannot reach the limit
    let error = ctx
        .program
        .swap(SwapParams {
            sqrt_price_limit: limit,
            tick_array_start_indexes: vec![0],
            ..swap_params(&pool, trader, 1_000_000_000_000, false)
        })
        .unwrap_err();
    assert_eq!(error, YeveswapError::InsufficientTickArrays);
    assert_eq!(ctx.pool(&pool)?, before);

    // With it, landing on 5632 crosses the boundary
    let output = ctx.program.swap(SwapParams {
        sqrt_price_limit: limit,
        tick_array_start_indexes: vec![0, 5632],
        ..swap_params(&pool, trader, 1_000_000_000_000, false)
    })?;
    let state = ctx.pool(&pool)?;
    assert_eq!(output.value.next_sqrt_price, limit);
    assert_eq!(state.tick_current_index, 5632);
    assert_eq!(state.liquidity, 6 * LIQUIDITY);
    assert!(ctx.program.store().tick_arrays(&pool.address)?.get_tick(5632)?.fee_growth_outside_b > 0);
    Ok(())
}

#[test]
fn test_b_to_a_amount_exhausted_inside_last_page() -> Result<()> {
    let mut ctx = TestContext::new()?;
    let (pool, trader) = pool_with_boundary_on_page_start(&mut ctx)?;

    // Small enough to stay below 5632 on one page
    let output = ctx.program.swap(SwapParams {
        tick_array_start_indexes: vec![0],
        ..swap_params(&pool, trader, 1_000_000, false)
    })?;
    let state = ctx.pool(&pool)?;
    assert_eq!(output.value.amount_b, 1_000_000);
    assert!(state.tick_current_index > 0 && state.tick_current_index < 5632);
    assert_eq!(state.liquidity, LIQUIDITY);
    Ok(())
}

#[test]
fn test_tick_array_list_is_validated() -> Result<()> {
    let mut ctx = TestContext::new()?;
    let (pool, _, _) = pool_with_liquidity(&mut ctx)?;
    let trader = ctx.funded_account(&pool);
    let span = 88 * i32::from(pool.tick_spacing);
    ctx.ensure_tick_arrays(&pool, &[span, 0, -span, -2 * span])?;

    let error = ctx
        .program
        .swap(SwapParams {
            tick_array_start_indexes: vec![0, -span, -2 * span, -3 * span],
            ..swap_params(&pool, trader, 1_000, true)
        })
        .unwrap_err();
    assert_eq!(error, YeveswapError::TooManyTickArrays { supplied: 4, max: 3 });

    let error = ctx
        .program
        .swap(SwapParams {
            tick_array_start_indexes: vec![span, 0],
            ..swap_params(&pool, trader, 1_000, true)
        })
        .unwrap_err();
    assert_eq!(error, YeveswapError::InvalidTickArraySequence);

    let error = ctx
        .program
        .swap(SwapParams {
            tick_array_start_indexes: vec![0, -2 * span],
            ..swap_params(&pool, trader, 1_000, true)
        })
        .unwrap_err();
    assert_eq!(error, YeveswapError::InvalidTickArraySequence);

    let error = ctx
        .program
        .swap(SwapParams {
            tick_array_start_indexes: vec![0, -span, -5 * span],
            ..swap_params(&pool, trader, 1_000, true)
        })
        .unwrap_err();
    assert_eq!(
        error,
        YeveswapError::TickArrayNotFound {
            start_tick_index: -5 * span
        }
    );
    Ok(())
}

#[test]
fn test_bad_inputs() -> Result<()> {
    let mut ctx = TestContext::new()?;
    let (pool, _, _) = pool_with_liquidity(&mut ctx)?;
    let trader = ctx.funded_account(&pool);
    ctx.ensure_tick_arrays(&pool, &swap_tick_array_starts(0, pool.tick_spacing, true, 3))?;

    assert_eq!(
        ctx.program
            .swap(swap_params(&pool, trader, 0, true))
            .unwrap_err(),
        YeveswapError::ZeroTradableAmount
    );
    // Limit above the current price while selling A
    assert_eq!(
        ctx.program
            .swap(SwapParams {
                sqrt_price_limit: sqrt_price_from_tick_index(100)?,
                ..swap_params(&pool, trader, 1_000, true)
            })
            .unwrap_err(),
        YeveswapError::InvalidSqrtPriceLimitDirection
    );
    Ok(())
}

#[test]
fn test_unfunded_trader_changes_nothing() -> Result<()> {
    let mut ctx = TestContext::new()?;
    let (pool, _, _) = pool_with_liquidity(&mut ctx)?;
    ctx.ensure_tick_arrays(&pool, &swap_tick_array_starts(0, pool.tick_spacing, true, 3))?;
    let before = ctx.pool(&pool)?;
    let pages_before: Vec<_> = ctx
        .program
        .store()
        .tick_arrays(&pool.address)?
        .pages()
        .cloned()
        .collect();

    let error = ctx
        .program
        .swap(swap_params(&pool, Address::new_unique(), 1_000_000, true))
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::TokenService);

    assert_eq!(ctx.pool(&pool)?, before);
    let pages_after: Vec<_> = ctx
        .program
        .store()
        .tick_arrays(&pool.address)?
        .pages()
        .cloned()
        .collect();
    assert_eq!(pages_before, pages_after);
    Ok(())
}

#[test]
fn test_liquidity_provider_collects_swap_fees() -> Result<()> {
    let mut ctx = TestContext::new()?;
    let (pool, lp, position_mint) = pool_with_liquidity(&mut ctx)?;
    let trader = ctx.funded_account(&pool);
    ctx.swap(&pool, trader, 1_000_000, true, true, 0, 0)?;

    let output = ctx.program.collect_fees(position_mint, lp, 0)?;
    let (fee_a, fee_b) = output.value;
    // Sole provider earns the whole 2,910 LP share, less rounding
    assert!((2_909..=2_943).contains(&fee_a));
    assert_eq!(fee_b, 0);
    assert_eq!(ctx.position(&position_mint)?.fee_owed_a, 0);

    // Nothing new has accrued since
    assert_eq!(ctx.program.collect_fees(position_mint, lp, 0)?.value, (0, 0));
    assert!(ctx
        .program
        .collect_fees(position_mint, trader, 0)
        .unwrap_err()
        .is_retryable());
    Ok(())
}

#[test]
fn test_out_of_range_position_earns_nothing() -> Result<()> {
    let mut ctx = TestContext::new()?;
    let (pool, lp, _) = pool_with_liquidity(&mut ctx)?;
    let idle_mint = ctx.provide_liquidity(&pool, lp, 1280, 2560, LIQUIDITY, 0)?;
    let trader = ctx.funded_account(&pool);
    ctx.swap(&pool, trader, 1_000_000, true, true, 0, 0)?;

    ctx.program.update_fees_and_rewards(idle_mint, 0)?;
    let idle = ctx.position(&idle_mint)?;
    assert_eq!((idle.fee_owed_a, idle.fee_owed_b), (0, 0));
    Ok(())
}

#[test]
fn test_swap_settings_limit_page_count() -> Result<()> {
    let settings = yeveswap_core::EngineSettings {
        max_swap_tick_arrays: 1,
        ..Default::default()
    };
    let mut ctx = TestContext::with_settings(settings)?;
    let (pool, _, _) = pool_with_liquidity(&mut ctx)?;
    let trader = ctx.funded_account(&pool);
    let span = 88 * i32::from(pool.tick_spacing);
    ctx.ensure_tick_arrays(&pool, &[0, -span])?;

    let error = ctx
        .program
        .swap(SwapParams {
            tick_array_start_indexes: vec![0, -span],
            ..swap_params(&pool, trader, 1_000, true)
        })
        .unwrap_err();
    assert_eq!(error, YeveswapError::TooManyTickArrays { supplied: 2, max: 1 });
    Ok(())
}
