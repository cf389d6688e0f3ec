// Solotto Lottery Program - Instruction Processor
use borsh::BorshSerialize;
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    borsh0_10::try_from_slice_unchecked,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_pack::IsInitialized,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
    sysvar::Sysvar,
};

use crate::instruction::LotteryInstruction;
use crate::state::{find_lottery_address, Lottery, TICKET_CAPACITY};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = LotteryInstruction::unpack(instruction_data)?;

        match instruction {
            LotteryInstruction::Initialize => {
                msg!("Instruction: Initialize");
                Self::process_initialize(accounts, program_id)
            }
            LotteryInstruction::SetTicketCost { new_cost } => {
                msg!("Instruction: Set Ticket Cost");
                Self::process_set_ticket_cost(accounts, new_cost, program_id)
            }
            LotteryInstruction::SetMaxTickets { new_max } => {
                msg!("Instruction: Set Max Tickets");
                Self::process_set_max_tickets(accounts, new_max, program_id)
            }
            LotteryInstruction::BuyTickets {
                ticket_count,
                amount,
            } => {
                msg!("Instruction: Buy Tickets");
                Self::process_buy_tickets(accounts, ticket_count, amount, program_id)
            }
            LotteryInstruction::Draw { random_number } => {
                msg!("Instruction: Draw");
                Self::process_draw(accounts, random_number, program_id)
            }
        }
    }

    /// Load and validate the lottery account
    fn load_lottery(
        lottery_info: &AccountInfo,
        program_id: &Pubkey,
    ) -> Result<Lottery, ProgramError> {
        if lottery_info.owner != program_id {
            msg!("Lottery account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }
        let lottery: Lottery = try_from_slice_unchecked(&lottery_info.data.borrow())?;
        if !lottery.is_initialized() {
            return Err(ProgramError::UninitializedAccount);
        }
        Ok(lottery)
    }

    /// Write the lottery state back to its account
    fn save_lottery(lottery: &Lottery, lottery_info: &AccountInfo) -> ProgramResult {
        lottery.serialize(&mut &mut lottery_info.data.borrow_mut()[..])?;
        Ok(())
    }

    /// Process the Initialize instruction
    ///
    /// Creates the lottery PDA and writes the default round configuration.
    /// Runs once per deployment.
    fn process_initialize(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let operator_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !operator_info.is_signer {
            msg!("Operator must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let (expected_lottery_pubkey, bump_seed) = find_lottery_address(program_id);
        if *lottery_info.key != expected_lottery_pubkey {
            msg!("Invalid lottery account address");
            return Err(ProgramError::InvalidArgument);
        }

        if lottery_info.owner != program_id {
            msg!("Creating lottery account");
            let rent = Rent::get()?;
            let rent_lamports = rent.minimum_balance(Lottery::LEN);

            invoke_signed(
                &system_instruction::create_account(
                    operator_info.key,
                    lottery_info.key,
                    rent_lamports,
                    Lottery::LEN as u64,
                    program_id,
                ),
                &[
                    operator_info.clone(),
                    lottery_info.clone(),
                    system_program_info.clone(),
                ],
                &[&[b"lottery", &[bump_seed]]],
            )?;
        }

        if let Ok(lottery) = try_from_slice_unchecked::<Lottery>(&lottery_info.data.borrow()) {
            if lottery.is_initialized {
                msg!("Lottery account is already initialized");
                return Err(ProgramError::AccountAlreadyInitialized);
            }
        }

        let lottery = Lottery::new(*operator_info.key);
        Self::save_lottery(&lottery, lottery_info)?;

        msg!(
            "Lottery initialized: Operator={}, TicketCost={} lamports, MaxTickets={}",
            operator_info.key,
            lottery.ticket_cost,
            lottery.max_tickets
        );
        Ok(())
    }

    /// Process the SetTicketCost instruction
    fn process_set_ticket_cost(
        accounts: &[AccountInfo],
        new_cost: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let operator_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;

        if !operator_info.is_signer {
            msg!("Operator must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut lottery = Self::load_lottery(lottery_info, program_id)?;
        lottery.set_ticket_cost(operator_info.key, new_cost)?;
        Self::save_lottery(&lottery, lottery_info)?;

        msg!("Ticket cost set to {} lamports", new_cost);
        Ok(())
    }

    /// Process the SetMaxTickets instruction
    fn process_set_max_tickets(
        accounts: &[AccountInfo],
        new_max: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let operator_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;

        if !operator_info.is_signer {
            msg!("Operator must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        // The account is allocated once, so the supply cannot outgrow it
        if new_max > TICKET_CAPACITY as u64 {
            msg!("Max tickets cannot exceed the capacity of {}", TICKET_CAPACITY);
            return Err(ProgramError::InvalidArgument);
        }

        let mut lottery = Self::load_lottery(lottery_info, program_id)?;
        lottery.set_max_tickets(operator_info.key, new_max)?;
        Self::save_lottery(&lottery, lottery_info)?;

        msg!("Max tickets set to {}", new_max);
        Ok(())
    }

    /// Process the BuyTickets instruction
    ///
    /// Moves the attached amount into the pot, records the buyer for every
    /// ticket sold, and returns the excess over the clamped cost.
    fn process_buy_tickets(
        accounts: &[AccountInfo],
        ticket_count: u64,
        amount: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let buyer_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !buyer_info.is_signer {
            msg!("Buyer must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut lottery = Self::load_lottery(lottery_info, program_id)?;

        if buyer_info.lamports() < amount {
            msg!(
                "Insufficient funds: attaching {} lamports, had {} lamports",
                amount,
                buyer_info.lamports()
            );
            return Err(ProgramError::InsufficientFunds);
        }

        let before = lottery.players.len() as u64;
        let refund = lottery.sell_tickets(buyer_info.key, ticket_count, amount)?;
        let sold = lottery.players.len() as u64 - before;

        // Deposit the full attached amount into the pot
        invoke(
            &system_instruction::transfer(buyer_info.key, lottery_info.key, amount),
            &[
                buyer_info.clone(),
                lottery_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        // Return the excess over the cost of the tickets actually sold
        if refund > 0 {
            let lottery_balance = lottery_info.lamports();
            **lottery_info.try_borrow_mut_lamports()? = lottery_balance
                .checked_sub(refund)
                .ok_or(ProgramError::InsufficientFunds)?;
            let buyer_balance = buyer_info.lamports();
            **buyer_info.try_borrow_mut_lamports()? = buyer_balance
                .checked_add(refund)
                .ok_or(ProgramError::InvalidArgument)?;
        }

        Self::save_lottery(&lottery, lottery_info)?;

        msg!(
            "Sold {} of {} requested tickets at {} lamports each, refunded {} lamports",
            sold,
            ticket_count,
            lottery.ticket_cost,
            refund
        );
        Ok(())
    }

    /// Process the Draw instruction
    ///
    /// Pays the whole pot to the holder of ticket `random_number %
    /// max_tickets` and resets the round. The payout and the reset commit
    /// together; any failure aborts both.
    fn process_draw(
        accounts: &[AccountInfo],
        random_number: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let operator_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        if !operator_info.is_signer {
            msg!("Operator must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut lottery = Self::load_lottery(lottery_info, program_id)?;

        let winner = lottery.draw_winner(operator_info.key, random_number)?;
        if winner != *winner_info.key {
            msg!(
                "Winning ticket is held by {}, not by the submitted account {}",
                winner,
                winner_info.key
            );
            return Err(ProgramError::InvalidArgument);
        }

        // The pot is everything above the rent-exempt reserve; the reserve
        // stays behind so the account survives into the next round
        let rent = Rent::get()?;
        let reserve = rent.minimum_balance(lottery_info.data_len());
        let pot = lottery_info
            .lamports()
            .checked_sub(reserve)
            .ok_or(ProgramError::InsufficientFunds)?;

        if pot > 0 {
            **lottery_info.try_borrow_mut_lamports()? = reserve;
            let winner_balance = winner_info.lamports();
            **winner_info.try_borrow_mut_lamports()? = winner_balance
                .checked_add(pot)
                .ok_or(ProgramError::InvalidArgument)?;
        }

        lottery.reset_round();
        Self::save_lottery(&lottery, lottery_info)?;

        msg!(
            "Ticket {} wins: paid {} lamports to {}",
            random_number % lottery.max_tickets,
            pot,
            winner_info.key
        );
        Ok(())
    }
}
