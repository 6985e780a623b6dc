//! In-memory token service
//!
//! Holds balances per `(holder, mint)` and receipt ownership per position
//! mint. Vaults are ordinary holders. A batch is applied to a scratch copy
//! and swapped in only when every instruction succeeds.

use std::collections::BTreeMap;

use tracing::trace;
use yeveswap_core::{
    Address, TokenInstruction, TokenService, TokenServiceError, TransferDirection,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Balances {
    tokens: BTreeMap<(Address, Address), u64>,
    receipts: BTreeMap<Address, Address>,
}

impl Balances {
    fn balance(&self, holder: &Address, mint: &Address) -> u64 {
        self.tokens.get(&(*holder, *mint)).copied().unwrap_or(0)
    }

    fn debit(&mut self, holder: Address, mint: Address, amount: u64) -> Result<(), TokenServiceError> {
        let available = self.balance(&holder, &mint);
        let remaining = available
            .checked_sub(amount)
            .ok_or(TokenServiceError::InsufficientFunds {
                mint,
                owner: holder,
                required: amount,
                available,
            })?;
        self.tokens.insert((holder, mint), remaining);
        Ok(())
    }

    fn credit(&mut self, holder: Address, mint: Address, amount: u64) -> Result<(), TokenServiceError> {
        let next = self
            .balance(&holder, &mint)
            .checked_add(amount)
            .ok_or_else(|| TokenServiceError::Rejected(format!("balance overflow for {holder}")))?;
        self.tokens.insert((holder, mint), next);
        Ok(())
    }

    fn apply(&mut self, instruction: &TokenInstruction) -> Result<(), TokenServiceError> {
        match *instruction {
            TokenInstruction::Transfer {
                mint,
                vault,
                counterparty,
                amount,
                direction,
            } => {
                let (from, to) = match direction {
                    TransferDirection::Deposit => (counterparty, vault),
                    TransferDirection::Withdraw => (vault, counterparty),
                };
                self.debit(from, mint, amount)?;
                self.credit(to, mint, amount)
            }
            TokenInstruction::MintReceipt {
                position_mint,
                owner,
            } => {
                if self.receipts.contains_key(&position_mint) {
                    return Err(TokenServiceError::ReceiptAlreadyMinted(position_mint));
                }
                self.receipts.insert(position_mint, owner);
                Ok(())
            }
            TokenInstruction::BurnReceipt {
                position_mint,
                owner,
            } => {
                if self.receipts.get(&position_mint) != Some(&owner) {
                    return Err(TokenServiceError::ReceiptNotHeld(position_mint));
                }
                self.receipts.remove(&position_mint);
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TokenLedger {
    balances: Balances,
    rejection: Option<String>,
    executed_batches: usize,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` of `mint` out of thin air for `holder`.
    pub fn mint_to(&mut self, holder: Address, mint: Address, amount: u64) {
        let next = self.balance(&holder, &mint).saturating_add(amount);
        self.balances.tokens.insert((holder, mint), next);
    }

    pub fn balance(&self, holder: &Address, mint: &Address) -> u64 {
        self.balances.balance(holder, mint)
    }

    pub fn receipt_owner(&self, position_mint: &Address) -> Option<Address> {
        self.balances.receipts.get(position_mint).copied()
    }

    /// Hand a position receipt to someone else, outside of any engine operation.
    pub fn transfer_receipt(
        &mut self,
        position_mint: Address,
        from: Address,
        to: Address,
    ) -> Result<(), TokenServiceError> {
        if self.receipt_owner(&position_mint) != Some(from) {
            return Err(TokenServiceError::ReceiptNotHeld(position_mint));
        }
        self.balances.receipts.insert(position_mint, to);
        Ok(())
    }

    /// Make the next batch fail regardless of its content.
    pub fn reject_next_batch(&mut self, reason: impl Into<String>) {
        self.rejection = Some(reason.into());
    }

    pub fn executed_batches(&self) -> usize {
        self.executed_batches
    }
}

impl TokenService for TokenLedger {
    fn execute(&mut self, instructions: &[TokenInstruction]) -> Result<(), TokenServiceError> {
        if let Some(reason) = self.rejection.take() {
            return Err(TokenServiceError::Rejected(reason));
        }

        let mut scratch = self.balances.clone();
        for instruction in instructions {
            trace!(?instruction, "applying token instruction");
            scratch.apply(instruction)?;
        }
        self.balances = scratch;
        self.executed_batches += 1;
        Ok(())
    }

    fn receipt_balance(&self, owner: &Address, position_mint: &Address) -> u64 {
        u64::from(self.receipt_owner(position_mint) == Some(*owner))
    }
}
