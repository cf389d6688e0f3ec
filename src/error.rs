use solana_program::{
    decode_error::DecodeError, msg, program_error::PrintProgramError,
    program_error::ProgramError,
};
use thiserror::Error;

/// Errors that may be returned by the Solotto program
#[derive(Error, Debug, Copy, Clone, PartialEq)]
pub enum LotteryError {
    /// Caller is not the configured operator
    #[error("Caller is not the lottery operator")]
    Unauthorized,

    /// Configuration change attempted mid-round
    #[error("Cannot reconfigure while a round is in progress")]
    RoundInProgress,

    /// Ticket purchase attempted with no tickets remaining
    #[error("All tickets for this round have been sold")]
    SoldOut,

    /// Attached value does not cover the tickets purchased
    #[error("Attached amount does not cover the ticket cost")]
    InsufficientPayment,

    /// Draw attempted while unsold tickets remain
    #[error("Round is not sold out yet")]
    RoundNotFinished,

    /// Instruction data does not decode to any defined operation
    #[error("Not allowed")]
    NotAllowed,
}

impl From<LotteryError> for ProgramError {
    fn from(e: LotteryError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for LotteryError {
    fn type_of() -> &'static str {
        "Lottery Error"
    }
}

impl PrintProgramError for LotteryError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}
