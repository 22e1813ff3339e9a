use anchor_lang::prelude::*;
use switchboard_on_demand::accounts::RandomnessAccountData;

use crate::{error::RaffleError, state::Raffle};

/// Event emitted when a winner selection is requested
#[event]
pub struct SelectionRequested {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// The randomness account pinned as the pending request
    pub randomness_account: Pubkey,
}

/// Instruction to close the round and issue a randomness request.
///
/// Permissionless: keepers watch the raffle account, evaluate
/// `Raffle::is_upkeep_due` off-chain, and crank this instruction once it
/// returns true. The supplied Switchboard randomness account must be seeded
/// at the immediately preceding slot, which proves its value has not been
/// revealed yet; committing to it here is the request-issuance half of the
/// two-call randomness protocol. Its pubkey is stored on the raffle and a
/// later `reveal_winner` is honored only for that exact account.
///
/// While the request is outstanding the raffle sits in `Drawing`, which
/// rejects new entries and blocks a second request. There is no timeout: a
/// slow oracle delays the reveal but cannot corrupt the round.
///
/// # Arguments
/// * `ctx` - The context object containing all required accounts
///
/// # Errors
/// - `UpkeepNotDue` if the round is not open, has no paid entries, or the
///   interval has not elapsed
/// - `InvalidRandomnessAccount` if the randomness account cannot be parsed
/// - `RandomnessAlreadyRevealed` if the randomness account is not committed
///   to the previous slot
pub fn perform_upkeep(ctx: Context<PerformUpkeep>) -> Result<()> {
    let clock = Clock::get()?;
    require!(
        ctx.accounts.raffle.is_upkeep_due(clock.unix_timestamp),
        RaffleError::UpkeepNotDue
    );

    let randomness_data =
        RandomnessAccountData::parse(ctx.accounts.randomness_account_data.data.borrow())
            .map_err(|_| RaffleError::InvalidRandomnessAccount)?;
    require!(
        randomness_data.seed_slot == clock.slot.saturating_sub(1),
        RaffleError::RandomnessAlreadyRevealed
    );

    let raffle = &mut ctx.accounts.raffle;
    raffle.begin_selection(
        ctx.accounts.randomness_account_data.key(),
        clock.unix_timestamp,
    )?;

    msg!(
        "Round closed for drawing, pot {} across {} players",
        raffle.pot,
        raffle.player_count()
    );

    emit!(SelectionRequested {
        raffle: ctx.accounts.raffle.key(),
        randomness_account: ctx.accounts.randomness_account_data.key(),
    });

    Ok(())
}

/// Accounts required for the perform_upkeep instruction
#[derive(Accounts)]
pub struct PerformUpkeep<'info> {
    /// The raffle account holding the round ledger
    #[account(
        mut,
        seeds = [b"raffle"],
        bump = raffle.bump,
    )]
    pub raffle: Account<'info, Raffle>,

    /// Switchboard randomness account to commit to for this round.
    /// CHECK: The account's data is validated manually within the handler.
    pub randomness_account_data: UncheckedAccount<'info>,

    /// The keeper cranking the upkeep
    #[account(mut)]
    pub payer: Signer<'info>,
}
