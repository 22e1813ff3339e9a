use anchor_lang::prelude::*;
use instructions::*;

pub mod error;
pub mod instructions;
pub mod state;

declare_id!("HDA9NQ9RVWkvvXdbe7hZ2iCfvg9Bon9uV7KB7Z3Hujq3");

#[program]
pub mod auto_raffle {
    use super::*;

    pub fn create_raffle(
        ctx: Context<CreateRaffle>,
        entrance_fee: u64,
        interval: i64,
    ) -> Result<()> {
        instructions::create_raffle::create_raffle(ctx, entrance_fee, interval)
    }

    pub fn enter_raffle(ctx: Context<EnterRaffle>, amount: u64) -> Result<()> {
        instructions::enter_raffle::enter_raffle(ctx, amount)
    }

    pub fn perform_upkeep(ctx: Context<PerformUpkeep>) -> Result<()> {
        instructions::perform_upkeep::perform_upkeep(ctx)
    }

    pub fn reveal_winner(ctx: Context<RevealWinner>) -> Result<()> {
        instructions::reveal_winner::reveal_winner(ctx)
    }
}
