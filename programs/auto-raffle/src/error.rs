use anchor_lang::error_code;

#[error_code]
pub enum RaffleError {
    #[msg("Payment is below the entrance fee")]
    InsufficientEntranceFee,
    #[msg("The raffle is not open for entries")]
    RaffleNotOpen,
    #[msg("The player list for this round is full")]
    RaffleFull,
    #[msg("Upkeep conditions are not met")]
    UpkeepNotDue,
    #[msg("Randomness account does not match the pending request")]
    UnknownRandomnessRequest,
    #[msg("Randomness account was already revealed and cannot be committed")]
    RandomnessAlreadyRevealed,
    #[msg("Randomness has not been revealed yet")]
    RandomnessNotResolved,
    #[msg("Failed to parse the randomness account")]
    InvalidRandomnessAccount,
    #[msg("Winner account does not match the drawn player")]
    WinnerAccountMismatch,
    #[msg("Transferring the pot to the winner failed")]
    PayoutFailed,
    #[msg("A draw was attempted against an empty player list")]
    EmptyRound,
    #[msg("Arithmetic overflow")]
    Overflow,
    #[msg("Entrance fee must be greater than zero")]
    InvalidEntranceFee,
    #[msg("Interval must be greater than zero")]
    InvalidInterval,
}
