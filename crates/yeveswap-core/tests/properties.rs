//! Accounting invariants under random operation sequences

use proptest::prelude::*;
use yeveswap_core::{Address, DecreaseLiquidityParams, IncreaseLiquidityParams};
use yeveswap_core::constants::NUM_REWARDS;
use yeveswap_math::{
    accrued_amount, emissions_over_window, reward_growth_delta_x64, sqrt_price_from_tick_index, Q64,
};
use yeveswap_test_utils::*;

const RANGES: [(i32, i32); 4] = [(-1280, 1280), (-640, 0), (0, 1920), (-5760, 5760)];

fn deposit(ctx: &mut TestContext, position_mint: Address, owner: Address, liquidity: u128, timestamp: u64) {
    ctx.program
        .increase_liquidity(IncreaseLiquidityParams {
            position_mint,
            owner,
            liquidity_amount: liquidity,
            token_max_a: u64::MAX,
            token_max_b: u64::MAX,
            timestamp,
        })
        .unwrap();
}

fn withdraw(ctx: &mut TestContext, position_mint: Address, owner: Address, liquidity: u128, timestamp: u64) {
    ctx.program
        .decrease_liquidity(DecreaseLiquidityParams {
            position_mint,
            owner,
            liquidity_amount: liquidity,
            token_min_a: 0,
            token_min_b: 0,
            timestamp,
        })
        .unwrap();
}

prop_compose! {
    fn liquidity_op()(
        range in 0usize..RANGES.len(),
        liquidity in 1u128..1_000_000_000_000,
        withdraw in any::<bool>(),
    ) -> (usize, u128, bool) {
        (range, liquidity, withdraw)
    }
}

prop_compose! {
    fn swap_op()(amount in 1u64..100_000_000, a_to_b in any::<bool>()) -> (u64, bool) {
        (amount, a_to_b)
    }
}

prop_compose! {
    fn timed_op()(
        kind in 0u8..3,
        amount in 1u64..100_000_000,
        a_to_b in any::<bool>(),
        elapsed in 0u64..1_000,
    ) -> (u8, u64, bool, u64) {
        (kind, amount, a_to_b, elapsed)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_net_liquidity_sums_to_zero(ops in prop::collection::vec(liquidity_op(), 1..24)) {
        let mut ctx = TestContext::new().unwrap();
        let pool = ctx.create_pool(MEDIUM_TICK_SPACING, MEDIUM_FEE_RATE, PRICE_ONE_SQRT_X64).unwrap();
        let owner = ctx.funded_account(&pool);
        let positions: Vec<Address> = RANGES
            .iter()
            .map(|&(lower, upper)| ctx.open_position(&pool, owner, lower, upper).unwrap())
            .collect();

        for (range, liquidity, is_withdraw) in ops {
            let position_mint = positions[range];
            if is_withdraw {
                let held = ctx.position(&position_mint).unwrap().liquidity;
                let amount = liquidity.min(held);
                if amount > 0 {
                    withdraw(&mut ctx, position_mint, owner, amount, 0);
                }
            } else {
                deposit(&mut ctx, position_mint, owner, liquidity, 0);
            }

            let registry = ctx.program.store().tick_arrays(&pool.address).unwrap();
            prop_assert_eq!(registry.liquidity_net_sum().unwrap(), 0);

            // Active liquidity is exactly the liquidity of ranges containing tick 0
            let active: u128 = positions
                .iter()
                .zip(RANGES)
                .filter(|(_, (lower, upper))| *lower <= 0 && 0 < *upper)
                .map(|(mint, _)| ctx.position(mint).unwrap().liquidity)
                .sum();
            prop_assert_eq!(ctx.pool(&pool).unwrap().liquidity, active);
        }
    }

    #[test]
    fn prop_growth_accumulators_never_decrease(swaps in prop::collection::vec(swap_op(), 1..24)) {
        let mut ctx = TestContext::new().unwrap();
        let pool = ctx.create_pool(MEDIUM_TICK_SPACING, MEDIUM_FEE_RATE, PRICE_ONE_SQRT_X64).unwrap();
        let lp = ctx.funded_account(&pool);
        let wide = ctx.provide_liquidity(&pool, lp, -5760, 5760, 100_000_000_000, 0).unwrap();
        let narrow = ctx.provide_liquidity(&pool, lp, -640, 640, 50_000_000_000, 0).unwrap();
        let trader = ctx.funded_account(&pool);

        let mut last = ctx.pool(&pool).unwrap();
        let mut owed = [(0u64, 0u64); 2];
        for (amount, a_to_b) in swaps {
            ctx.swap(&pool, trader, amount, true, a_to_b, 0, 0).unwrap();

            let next = ctx.pool(&pool).unwrap();
            prop_assert!(next.fee_growth_global_a >= last.fee_growth_global_a);
            prop_assert!(next.fee_growth_global_b >= last.fee_growth_global_b);
            last = next;

            for (i, mint) in [wide, narrow].iter().enumerate() {
                let position = ctx.program.update_fees_and_rewards(*mint, 0).unwrap().value;
                prop_assert!(position.fee_owed_a >= owed[i].0);
                prop_assert!(position.fee_owed_b >= owed[i].1);
                owed[i] = (position.fee_owed_a, position.fee_owed_b);
            }
        }
    }

    #[test]
    fn prop_reward_growth_never_decreases(ops in prop::collection::vec(timed_op(), 1..24)) {
        let mut ctx = TestContext::new().unwrap();
        let pool = ctx.create_pool(MEDIUM_TICK_SPACING, MEDIUM_FEE_RATE, PRICE_ONE_SQRT_X64).unwrap();
        let lp = ctx.funded_account(&pool);
        let wide = ctx.provide_liquidity(&pool, lp, -5760, 5760, 100_000_000_000, 0).unwrap();
        let narrow = ctx.provide_liquidity(&pool, lp, -640, 640, 50_000_000_000, 0).unwrap();
        let trader = ctx.funded_account(&pool);

        // Slot 0 emits one token per second, slot 1 half of that
        let authority = ctx.reward_emissions_super_authority;
        for (index, emissions) in [(0u8, Q64), (1u8, Q64 / 2)] {
            ctx.program
                .initialize_reward(pool.address, authority, index, Address::new_unique(), Address::new_unique())
                .unwrap();
            ctx.program
                .set_reward_emissions(pool.address, authority, index, emissions, u64::MAX, 0)
                .unwrap();
        }

        let mut timestamp = 0;
        let mut last_growth = [0u128; NUM_REWARDS];
        let mut owed = [[0u64; NUM_REWARDS]; 2];
        for (kind, amount, a_to_b, elapsed) in ops {
            timestamp += elapsed;
            match kind {
                0 => {
                    ctx.swap(&pool, trader, amount, true, a_to_b, 0, timestamp).unwrap();
                }
                1 => deposit(&mut ctx, narrow, lp, u128::from(amount) * 1_000, timestamp),
                _ => {
                    let held = ctx.position(&narrow).unwrap().liquidity;
                    if held > 1 {
                        withdraw(&mut ctx, narrow, lp, held / 2, timestamp);
                    }
                }
            }

            let state = ctx.pool(&pool).unwrap();
            for (i, reward) in state.reward_infos.iter().enumerate() {
                prop_assert!(reward.growth_global_x64 >= last_growth[i]);
                last_growth[i] = reward.growth_global_x64;
            }

            for (p, mint) in [wide, narrow].iter().enumerate() {
                let position = ctx.program.update_fees_and_rewards(*mint, timestamp).unwrap().value;
                for (i, reward) in position.reward_infos.iter().enumerate() {
                    prop_assert!(reward.amount_owed >= owed[p][i]);
                    owed[p][i] = reward.amount_owed;
                }
            }
        }
        prop_assert!(last_growth[0] >= last_growth[1]);
    }

    #[test]
    fn prop_round_trip_restores_checkpoints(
        swaps in prop::collection::vec(swap_op(), 0..8),
        range in 0usize..RANGES.len(),
        liquidity in 1u128..1_000_000_000_000,
    ) {
        let mut ctx = TestContext::new().unwrap();
        let pool = ctx.create_pool(MEDIUM_TICK_SPACING, MEDIUM_FEE_RATE, PRICE_ONE_SQRT_X64).unwrap();
        let lp = ctx.funded_account(&pool);
        ctx.provide_liquidity(&pool, lp, -5760, 5760, 100_000_000_000, 0).unwrap();
        let trader = ctx.funded_account(&pool);
        for (amount, a_to_b) in swaps {
            ctx.swap(&pool, trader, amount, true, a_to_b, 0, 0).unwrap();
        }

        let (lower, upper) = RANGES[range];
        let position_mint = ctx.provide_liquidity(&pool, lp, lower, upper, liquidity, 0).unwrap();
        let pool_before = ctx.pool(&pool).unwrap();
        let position_before = ctx.position(&position_mint).unwrap();

        withdraw(&mut ctx, position_mint, lp, liquidity, 0);
        deposit(&mut ctx, position_mint, lp, liquidity, 0);

        let position_after = ctx.position(&position_mint).unwrap();
        prop_assert_eq!(ctx.pool(&pool).unwrap().liquidity, pool_before.liquidity);
        prop_assert_eq!(position_after.liquidity, position_before.liquidity);
        prop_assert_eq!(position_after.fee_growth_checkpoint_a, position_before.fee_growth_checkpoint_a);
        prop_assert_eq!(position_after.fee_growth_checkpoint_b, position_before.fee_growth_checkpoint_b);
        prop_assert_eq!(position_after.reward_infos, position_before.reward_infos);
    }

    #[test]
    fn prop_vaults_cover_every_claim(swaps in prop::collection::vec(swap_op(), 1..16)) {
        let mut ctx = TestContext::new().unwrap();
        let pool = ctx.create_pool(MEDIUM_TICK_SPACING, MEDIUM_FEE_RATE, PRICE_ONE_SQRT_X64).unwrap();
        let alice = ctx.funded_account(&pool);
        let bob = ctx.funded_account(&pool);
        let positions = [
            (alice, ctx.provide_liquidity(&pool, alice, -5760, 5760, 100_000_000_000, 0).unwrap(), 100_000_000_000u128),
            (bob, ctx.provide_liquidity(&pool, bob, -640, 1280, 30_000_000_000, 0).unwrap(), 30_000_000_000u128),
        ];
        let trader = ctx.funded_account(&pool);
        for (amount, a_to_b) in swaps {
            ctx.swap(&pool, trader, amount, true, a_to_b, 0, 0).unwrap();
        }

        // Everyone leaves. The ledger would refuse any overdraft of a vault.
        for (owner, position_mint, liquidity) in positions {
            withdraw(&mut ctx, position_mint, owner, liquidity, 0);
            ctx.program.collect_fees(position_mint, owner, 0).unwrap();
            ctx.program.close_position(position_mint, owner).unwrap();
        }
        let treasury = Address::new_unique();
        ctx.program
            .collect_protocol_fees(pool.address, ctx.collect_protocol_fees_authority, treasury, treasury)
            .unwrap();

        let state = ctx.pool(&pool).unwrap();
        prop_assert_eq!(state.liquidity, 0);
        prop_assert_eq!(ctx.program.store().tick_arrays(&pool.address).unwrap().initialized_tick_count(), 0);
    }

    #[test]
    fn prop_fundable_emissions_never_wrap_within_a_window(
        emissions in 0u128..=((u64::MAX as u128) << 64) / 86_400,
        liquidity in 1u128..=u128::MAX,
    ) {
        // Any rate a u64 vault can cover for a day
        prop_assume!(emissions_over_window(86_400, emissions).is_ok());

        let growth = reward_growth_delta_x64(86_400, emissions, liquidity).unwrap();
        let owed = accrued_amount(growth, liquidity).unwrap();
        prop_assert!(owed <= emissions_over_window(86_400, emissions).unwrap());
    }

    #[test]
    fn prop_price_limit_is_respected(amount in 1u64..u64::MAX / 4, limit_tick in -5000i32..-1) {
        let mut ctx = TestContext::new().unwrap();
        let pool = ctx.create_pool(MEDIUM_TICK_SPACING, MEDIUM_FEE_RATE, PRICE_ONE_SQRT_X64).unwrap();
        let lp = ctx.funded_account(&pool);
        ctx.provide_liquidity(&pool, lp, -5760, 5760, 1_000_000_000, 0).unwrap();
        let trader = ctx.funded_account(&pool);

        let limit = sqrt_price_from_tick_index(limit_tick).unwrap();
        // A trader may not hold enough for the largest amounts; that is a clean rejection
        let _ = ctx.swap(&pool, trader, amount, true, true, limit, 0);
        prop_assert!(ctx.pool(&pool).unwrap().sqrt_price >= limit);
    }
}
