// Solotto Lottery Program - State
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    native_token::LAMPORTS_PER_SOL,
    program_error::ProgramError,
    program_pack::{IsInitialized, Sealed},
    pubkey::Pubkey,
};

use crate::error::LotteryError;

/// Number of player slots the lottery account is allocated for. The account
/// cannot grow after creation, so `max_tickets` is bounded by this.
pub const TICKET_CAPACITY: usize = 64;

/// Default price per ticket: one whole SOL
pub const DEFAULT_TICKET_COST: u64 = LAMPORTS_PER_SOL;

/// Default ticket supply per round
pub const DEFAULT_MAX_TICKETS: u64 = 5;

/// Lottery state
///
/// One account per deployment, living at the `[b"lottery"]` PDA. Holds the
/// round configuration and the buyers of the current round, and accumulates
/// the pot in its lamport balance.
#[derive(BorshSerialize, BorshDeserialize, Debug)]
pub struct Lottery {
    /// Is the account initialized
    pub is_initialized: bool,
    /// Identity allowed to reconfigure the lottery and trigger draws
    pub operator: Pubkey,
    /// Price per ticket in lamports
    pub ticket_cost: u64,
    /// Configured ticket supply per round
    pub max_tickets: u64,
    /// Tickets still unsold in the current round
    pub tickets_available: u64,
    /// Buyer of every sold ticket, in purchase order; the index is the
    /// ticket number. Dense: runs 0..len with no gaps.
    pub players: Vec<Pubkey>,
}

impl Sealed for Lottery {}

impl IsInitialized for Lottery {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Lottery {
    /// Serialized size: fixed header, borsh vec length prefix, and a full
    /// capacity of player slots.
    pub const LEN: usize = 1 + 32 + 8 + 8 + 8 + 4 + 32 * TICKET_CAPACITY;

    /// Create a fresh lottery with the default round configuration
    pub fn new(operator: Pubkey) -> Self {
        Self {
            is_initialized: true,
            operator,
            ticket_cost: DEFAULT_TICKET_COST,
            max_tickets: DEFAULT_MAX_TICKETS,
            tickets_available: DEFAULT_MAX_TICKETS,
            players: Vec::new(),
        }
    }

    /// A round is in progress once any ticket of the current supply has sold
    pub fn round_in_progress(&self) -> bool {
        self.tickets_available != self.max_tickets
    }

    fn verify_operator(&self, caller: &Pubkey) -> Result<(), ProgramError> {
        if *caller != self.operator {
            return Err(LotteryError::Unauthorized.into());
        }
        Ok(())
    }

    /// Change the ticket price. Operator only, and only between rounds.
    pub fn set_ticket_cost(
        &mut self,
        caller: &Pubkey,
        new_cost: u64,
    ) -> Result<(), ProgramError> {
        self.verify_operator(caller)?;
        if self.round_in_progress() {
            return Err(LotteryError::RoundInProgress.into());
        }
        self.ticket_cost = new_cost;
        Ok(())
    }

    /// Change the per-round ticket supply. Operator only, and only between
    /// rounds. Resets the available supply to the new maximum; a maximum of
    /// zero disables purchases until changed again.
    pub fn set_max_tickets(
        &mut self,
        caller: &Pubkey,
        new_max: u64,
    ) -> Result<(), ProgramError> {
        self.verify_operator(caller)?;
        if self.round_in_progress() {
            return Err(LotteryError::RoundInProgress.into());
        }
        self.max_tickets = new_max;
        self.tickets_available = new_max;
        Ok(())
    }

    /// Sell up to `requested` tickets to `buyer` against `amount` attached
    /// lamports. A request beyond the remaining supply is clamped to what is
    /// left rather than rejected; the buyer is charged for the clamped count
    /// only. Returns the refund owed back to the buyer.
    pub fn sell_tickets(
        &mut self,
        buyer: &Pubkey,
        requested: u64,
        amount: u64,
    ) -> Result<u64, ProgramError> {
        if self.tickets_available == 0 {
            return Err(LotteryError::SoldOut.into());
        }

        let actual = requested.min(self.tickets_available);
        let total_cost = actual
            .checked_mul(self.ticket_cost)
            .ok_or(ProgramError::InvalidArgument)?;
        if amount < total_cost {
            return Err(LotteryError::InsufficientPayment.into());
        }

        for _ in 0..actual {
            self.players.push(*buyer);
            self.tickets_available = self
                .tickets_available
                .checked_sub(1)
                .ok_or(ProgramError::InvalidArgument)?;
        }

        Ok(amount - total_cost)
    }

    /// Pick the winning ticket holder for a sold-out round. Pure lookup; the
    /// round reset happens separately, once the payout has gone through.
    pub fn draw_winner(
        &self,
        caller: &Pubkey,
        random_number: u64,
    ) -> Result<Pubkey, ProgramError> {
        self.verify_operator(caller)?;
        // max_tickets == 0 means there is no round that could ever finish
        if self.tickets_available != 0 || self.max_tickets == 0 {
            return Err(LotteryError::RoundNotFinished.into());
        }

        let winner_index = (random_number % self.max_tickets) as usize;
        self.players
            .get(winner_index)
            .copied()
            .ok_or(ProgramError::InvalidAccountData)
    }

    /// Start the next round: clear the ticket holders and restore the supply
    pub fn reset_round(&mut self) {
        self.players.clear();
        self.tickets_available = self.max_tickets;
    }
}

/// Find the program derived address of the lottery account
pub fn find_lottery_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"lottery"], program_id)
}
