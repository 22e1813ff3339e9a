use anchor_lang::prelude::*;
use arrayref::array_ref;
use switchboard_on_demand::accounts::RandomnessAccountData;

use crate::{error::RaffleError, state::Raffle};

/// Event emitted when a winner is picked and paid
#[event]
pub struct WinnerPicked {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// The winning player
    pub winner: Pubkey,
    /// Index of the winning slot in the round's player list
    pub winning_index: u64,
    /// Pot paid out, in lamports
    pub pot: u64,
}

/// Instruction to consume the revealed randomness, pay the pot, and reopen
/// the round.
///
/// Permissionless, but honored only for the exact randomness account pinned
/// by `perform_upkeep`; a stale, duplicate, or forged reveal fails with
/// `UnknownRandomnessRequest` before the supplied account is even parsed.
/// The winner is the player at `random_value % player_count`
/// over the low 64 bits of the revealed value (a bare modulo; the bias is
/// negligible at these player counts and the policy is fixed).
///
/// The full pot moves to the winner before the ledger resets. If the payout
/// cannot be made the whole transaction aborts, which leaves the raffle in
/// `Drawing` with the pot and the pending request intact; the reveal can then
/// simply be retried. The round never reopens with an unpaid pot.
///
/// # Arguments
/// * `ctx` - The context object containing all required accounts
///
/// # Errors
/// - `UnknownRandomnessRequest` if no request is pending or the supplied
///   randomness account does not match it
/// - `InvalidRandomnessAccount` if the randomness account cannot be parsed
/// - `RandomnessNotResolved` if the oracle has not revealed a value yet
/// - `EmptyRound` if the player list is empty (unreachable while the upkeep
///   guard holds)
/// - `WinnerAccountMismatch` if the passed winner account is not the drawn
///   player
/// - `PayoutFailed` if moving the pot's lamports fails
pub fn reveal_winner(ctx: Context<RevealWinner>) -> Result<()> {
    // The request id is the sole authorization token for this transition;
    // match it before reading anything out of the supplied account.
    require!(
        ctx.accounts
            .raffle
            .is_pending_request(ctx.accounts.randomness_account_data.key()),
        RaffleError::UnknownRandomnessRequest
    );

    let clock = Clock::get()?;

    let randomness_data =
        RandomnessAccountData::parse(ctx.accounts.randomness_account_data.data.borrow())
            .map_err(|_| RaffleError::InvalidRandomnessAccount)?;
    let revealed = randomness_data
        .get_value(&clock)
        .map_err(|_| RaffleError::RandomnessNotResolved)?;
    let random_value = u64::from_le_bytes(*array_ref![revealed, 0, 8]);

    let raffle = &ctx.accounts.raffle;
    let (winning_index, winner) =
        raffle.select_winner(ctx.accounts.randomness_account_data.key(), random_value)?;
    require_keys_eq!(
        ctx.accounts.winner.key(),
        winner,
        RaffleError::WinnerAccountMismatch
    );

    // Pay out the full pot, then reset. The pot sits on top of the raffle
    // account's rent-exempt balance, so the subtraction cannot strand it
    // below rent.
    let pot = raffle.pot;
    let raffle_info = ctx.accounts.raffle.to_account_info();
    let new_raffle_lamports = raffle_info
        .lamports()
        .checked_sub(pot)
        .ok_or(RaffleError::PayoutFailed)?;
    let new_winner_lamports = ctx
        .accounts
        .winner
        .lamports()
        .checked_add(pot)
        .ok_or(RaffleError::PayoutFailed)?;
    **raffle_info.try_borrow_mut_lamports()? = new_raffle_lamports;
    **ctx.accounts.winner.try_borrow_mut_lamports()? = new_winner_lamports;

    let now = clock.unix_timestamp;
    ctx.accounts.raffle.complete_round(winner, now);

    msg!("Winner {} paid {} lamports", winner, pot);

    emit!(WinnerPicked {
        raffle: ctx.accounts.raffle.key(),
        winner,
        winning_index,
        pot,
    });

    Ok(())
}

/// Accounts required for the reveal_winner instruction
#[derive(Accounts)]
pub struct RevealWinner<'info> {
    /// The raffle account holding the round ledger
    #[account(
        mut,
        seeds = [b"raffle"],
        bump = raffle.bump,
    )]
    pub raffle: Account<'info, Raffle>,

    /// The Switchboard randomness account pinned by `perform_upkeep`.
    /// CHECK: Matched against the pending request within the handler.
    pub randomness_account_data: UncheckedAccount<'info>,

    /// The account receiving the pot.
    /// CHECK: Must equal the drawn player; validated within the handler.
    #[account(mut)]
    pub winner: UncheckedAccount<'info>,
}
