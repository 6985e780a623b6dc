//! # Token Service Seam
//!
//! The engine never moves tokens itself. Each operation hands the host one
//! batch of [`TokenInstruction`]s; the batch either executes completely or
//! the operation is abandoned with no state committed.

use borsh::{BorshDeserialize, BorshSerialize};
use thiserror::Error;

use crate::state::Address;

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferDirection {
    /// Counterparty pays into the vault
    Deposit,
    /// Vault pays out to the counterparty
    Withdraw,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum TokenInstruction {
    Transfer {
        mint: Address,
        vault: Address,
        counterparty: Address,
        amount: u64,
        direction: TransferDirection,
    },
    /// Issue the single receipt token that proves ownership of a position
    MintReceipt { position_mint: Address, owner: Address },
    BurnReceipt { position_mint: Address, owner: Address },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenServiceError {
    #[error("Insufficient balance of {mint} for {owner}: need {required}, have {available}")]
    InsufficientFunds {
        mint: Address,
        owner: Address,
        required: u64,
        available: u64,
    },

    #[error("Receipt {0} already exists")]
    ReceiptAlreadyMinted(Address),

    #[error("Receipt {0} not held by the burner")]
    ReceiptNotHeld(Address),

    #[error("Token service rejected the batch: {0}")]
    Rejected(String),
}

pub trait TokenService {
    /// Execute the whole batch or nothing.
    fn execute(&mut self, instructions: &[TokenInstruction]) -> Result<(), TokenServiceError>;

    /// Receipt tokens of `position_mint` held by `owner`.
    fn receipt_balance(&self, owner: &Address, position_mint: &Address) -> u64;
}

/// Collects the token side effects of one operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenBatch {
    instructions: Vec<TokenInstruction>,
}

impl TokenBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a transfer. Zero amounts are dropped.
    pub fn transfer(
        &mut self,
        mint: Address,
        vault: Address,
        counterparty: Address,
        amount: u64,
        direction: TransferDirection,
    ) -> &mut Self {
        if amount > 0 {
            self.instructions.push(TokenInstruction::Transfer {
                mint,
                vault,
                counterparty,
                amount,
                direction,
            });
        }
        self
    }

    pub fn push(&mut self, instruction: TokenInstruction) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[TokenInstruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<TokenInstruction> {
        self.instructions
    }
}
