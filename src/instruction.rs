// Solotto Lottery Program - Instructions
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::error::LotteryError;
use crate::state::find_lottery_address;

#[derive(Clone, Debug, PartialEq)]
pub enum LotteryInstruction {
    /// Create the lottery account and write the default round configuration
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The operator, pays for the lottery account
    /// 1. `[writable]` The lottery account (PDA, seed `"lottery"`)
    /// 2. `[]` The system program
    Initialize,

    /// Change the ticket price (operator only, between rounds)
    ///
    /// Accounts expected:
    /// 0. `[signer]` The operator
    /// 1. `[writable]` The lottery account
    SetTicketCost {
        /// New price per ticket in lamports
        new_cost: u64,
    },

    /// Change the per-round ticket supply (operator only, between rounds)
    ///
    /// Accounts expected:
    /// 0. `[signer]` The operator
    /// 1. `[writable]` The lottery account
    SetMaxTickets {
        /// New ticket supply; zero disables purchases
        new_max: u64,
    },

    /// Buy tickets for the current round
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The buyer, pays `amount` into the pot
    /// 1. `[writable]` The lottery account
    /// 2. `[]` The system program
    BuyTickets {
        /// Number of tickets requested; clamped to the remaining supply
        ticket_count: u64,
        /// Lamports attached to the purchase; the excess over the cost of
        /// the tickets actually sold is returned to the buyer
        amount: u64,
    },

    /// Pay the whole pot to one ticket holder and start the next round
    /// (operator only, round must be sold out)
    ///
    /// Accounts expected:
    /// 0. `[signer]` The operator
    /// 1. `[writable]` The lottery account
    /// 2. `[writable]` The winning ticket holder, receives the pot; must
    ///    match the holder of ticket `random_number % max_tickets`
    Draw {
        /// Operator-supplied randomness; fairness rests on this being
        /// unpredictable, the program only reduces it modulo the supply
        random_number: u64,
    },
}

impl LotteryInstruction {
    /// Unpacks a byte buffer into a LotteryInstruction.
    ///
    /// Anything that does not decode to a defined operation fails with
    /// `NotAllowed`.
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (tag, rest) = input.split_first().ok_or(LotteryError::NotAllowed)?;

        Ok(match tag {
            0 => Self::Initialize,
            1 => {
                let (new_cost, _) = Self::unpack_u64(rest)?;
                Self::SetTicketCost { new_cost }
            }
            2 => {
                let (new_max, _) = Self::unpack_u64(rest)?;
                Self::SetMaxTickets { new_max }
            }
            3 => {
                let (ticket_count, rest) = Self::unpack_u64(rest)?;
                let (amount, _) = Self::unpack_u64(rest)?;
                Self::BuyTickets {
                    ticket_count,
                    amount,
                }
            }
            4 => {
                let (random_number, _) = Self::unpack_u64(rest)?;
                Self::Draw { random_number }
            }
            _ => return Err(LotteryError::NotAllowed.into()),
        })
    }

    /// Packs a LotteryInstruction into a byte buffer
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + 2 * 8);
        match *self {
            Self::Initialize => buf.push(0),
            Self::SetTicketCost { new_cost } => {
                buf.push(1);
                buf.extend_from_slice(&new_cost.to_le_bytes());
            }
            Self::SetMaxTickets { new_max } => {
                buf.push(2);
                buf.extend_from_slice(&new_max.to_le_bytes());
            }
            Self::BuyTickets {
                ticket_count,
                amount,
            } => {
                buf.push(3);
                buf.extend_from_slice(&ticket_count.to_le_bytes());
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::Draw { random_number } => {
                buf.push(4);
                buf.extend_from_slice(&random_number.to_le_bytes());
            }
        }
        buf
    }

    fn unpack_u64(input: &[u8]) -> Result<(u64, &[u8]), ProgramError> {
        let value = input
            .get(..8)
            .and_then(|slice| slice.try_into().ok())
            .map(u64::from_le_bytes)
            .ok_or(LotteryError::NotAllowed)?;
        Ok((value, &input[8..]))
    }
}

/// Create an initialize instruction
pub fn initialize(program_id: &Pubkey, operator: &Pubkey) -> Instruction {
    let (lottery, _) = find_lottery_address(program_id);
    let accounts = vec![
        AccountMeta::new(*operator, true),
        AccountMeta::new(lottery, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: LotteryInstruction::Initialize.pack(),
    }
}

/// Create a set_ticket_cost instruction
pub fn set_ticket_cost(program_id: &Pubkey, operator: &Pubkey, new_cost: u64) -> Instruction {
    let (lottery, _) = find_lottery_address(program_id);
    let accounts = vec![
        AccountMeta::new_readonly(*operator, true),
        AccountMeta::new(lottery, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: LotteryInstruction::SetTicketCost { new_cost }.pack(),
    }
}

/// Create a set_max_tickets instruction
pub fn set_max_tickets(program_id: &Pubkey, operator: &Pubkey, new_max: u64) -> Instruction {
    let (lottery, _) = find_lottery_address(program_id);
    let accounts = vec![
        AccountMeta::new_readonly(*operator, true),
        AccountMeta::new(lottery, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: LotteryInstruction::SetMaxTickets { new_max }.pack(),
    }
}

/// Create a buy_tickets instruction
pub fn buy_tickets(
    program_id: &Pubkey,
    buyer: &Pubkey,
    ticket_count: u64,
    amount: u64,
) -> Instruction {
    let (lottery, _) = find_lottery_address(program_id);
    let accounts = vec![
        AccountMeta::new(*buyer, true),
        AccountMeta::new(lottery, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: LotteryInstruction::BuyTickets {
            ticket_count,
            amount,
        }
        .pack(),
    }
}

/// Create a draw instruction
pub fn draw(
    program_id: &Pubkey,
    operator: &Pubkey,
    winner: &Pubkey,
    random_number: u64,
) -> Instruction {
    let (lottery, _) = find_lottery_address(program_id);
    let accounts = vec![
        AccountMeta::new_readonly(*operator, true),
        AccountMeta::new(lottery, false),
        AccountMeta::new(*winner, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: LotteryInstruction::Draw { random_number }.pack(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tag_is_not_allowed() {
        assert_eq!(
            LotteryInstruction::unpack(&[42]),
            Err(LotteryError::NotAllowed.into())
        );
        assert_eq!(
            LotteryInstruction::unpack(&[]),
            Err(LotteryError::NotAllowed.into())
        );
    }

    #[test]
    fn truncated_payload_is_not_allowed() {
        // BuyTickets with only one of its two u64 fields
        let mut data = vec![3];
        data.extend_from_slice(&7u64.to_le_bytes());
        assert_eq!(
            LotteryInstruction::unpack(&data),
            Err(LotteryError::NotAllowed.into())
        );
    }
}
