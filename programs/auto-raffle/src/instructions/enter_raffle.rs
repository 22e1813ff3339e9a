use anchor_lang::prelude::*;
use anchor_lang::system_program;

use crate::state::Raffle;

/// Event emitted when a player's entry is accepted
#[event]
pub struct PlayerEntered {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// The entering player
    pub player: Pubkey,
    /// Amount paid in lamports
    pub amount: u64,
    /// Pot total after this entry
    pub pot: u64,
}

/// Instruction to enter the current round.
///
/// The ledger is updated first and the payment is transferred afterwards;
/// both happen inside one transaction, so a failed transfer rolls the entry
/// back. Paying more than the entrance fee is allowed and the full amount
/// joins the pot, but buys no extra slots.
///
/// # Arguments
/// * `ctx` - The context object containing all required accounts
/// * `amount` - The payment in lamports
///
/// # Errors
/// - `RaffleNotOpen` if a winner selection is in progress
/// - `InsufficientEntranceFee` if `amount` is below the entrance fee
/// - `RaffleFull` if the round's player list is at capacity
pub fn enter_raffle(ctx: Context<EnterRaffle>, amount: u64) -> Result<()> {
    let raffle = &mut ctx.accounts.raffle;
    raffle.accept_entry(ctx.accounts.player.key(), amount)?;

    // Move the payment into the raffle account, on top of its rent.
    system_program::transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            system_program::Transfer {
                from: ctx.accounts.player.to_account_info(),
                to: ctx.accounts.raffle.to_account_info(),
            },
        ),
        amount,
    )?;

    emit!(PlayerEntered {
        raffle: ctx.accounts.raffle.key(),
        player: ctx.accounts.player.key(),
        amount,
        pot: ctx.accounts.raffle.pot,
    });

    Ok(())
}

/// Accounts required for the enter_raffle instruction
#[derive(Accounts)]
pub struct EnterRaffle<'info> {
    /// The raffle account holding the round ledger
    #[account(
        mut,
        seeds = [b"raffle"],
        bump = raffle.bump,
    )]
    pub raffle: Account<'info, Raffle>,

    /// The player entering the round and paying the entrance fee
    #[account(mut)]
    pub player: Signer<'info>,

    /// Required for the payment transfer
    pub system_program: Program<'info, System>,
}
