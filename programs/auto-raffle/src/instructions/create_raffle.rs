use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    state::{Raffle, RaffleState, RAFFLE_ACCOUNT_SIZE},
};

/// Creates the raffle account and writes its immutable configuration.
///
/// The entrance fee and interval are fixed for the life of the raffle; every
/// later instruction reads them from this account rather than from ambient
/// state. The first round opens immediately at the current timestamp.
///
/// # Arguments
/// * `ctx` - The context object containing all required accounts
/// * `entrance_fee` - Minimum payment per entry, in lamports
/// * `interval` - Seconds a round must stay open before it becomes drawable
///
/// # Errors
/// - `InvalidEntranceFee` if `entrance_fee` is zero
/// - `InvalidInterval` if `interval` is not positive
pub fn create_raffle(ctx: Context<CreateRaffle>, entrance_fee: u64, interval: i64) -> Result<()> {
    require!(entrance_fee > 0, RaffleError::InvalidEntranceFee);
    require!(interval > 0, RaffleError::InvalidInterval);

    let clock = Clock::get()?;
    let raffle = &mut ctx.accounts.raffle;
    raffle.bump = ctx.bumps.raffle;
    raffle.entrance_fee = entrance_fee;
    raffle.interval = interval;
    raffle.raffle_state = RaffleState::Open;
    raffle.last_round_start = clock.unix_timestamp;
    raffle.pot = 0;
    raffle.players = Vec::new();
    raffle.randomness_account = None;
    raffle.randomness_requested_at = None;
    raffle.recent_winner = None;

    Ok(())
}

/// Accounts required for the create_raffle instruction
#[derive(Accounts)]
pub struct CreateRaffle<'info> {
    /// The raffle account holding the round ledger
    /// PDA with seeds ["raffle"]
    #[account(
        init,
        payer = payer,
        space = RAFFLE_ACCOUNT_SIZE,
        seeds = [b"raffle"],
        bump,
    )]
    pub raffle: Account<'info, Raffle>,

    /// The account paying for raffle account creation
    #[account(mut)]
    pub payer: Signer<'info>,

    /// Required for creating the raffle account
    pub system_program: Program<'info, System>,
}
