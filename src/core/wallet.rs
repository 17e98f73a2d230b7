/// The player's money balance.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletEvent {
    Added(u64),
    Removed(u64),
    /// The new balance after any mutation.
    Changed(u64),
}

/// A non-negative money balance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    balance: u64,
}

impl Wallet {
    pub fn new(starting: u64) -> Self {
        Self { balance: starting }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn has_enough(&self, amount: u64) -> bool {
        self.balance >= amount
    }

    pub fn add(&mut self, amount: u64) -> Vec<WalletEvent> {
        if amount == 0 {
            return Vec::new();
        }
        self.balance = self.balance.saturating_add(amount);
        vec![WalletEvent::Added(amount), WalletEvent::Changed(self.balance)]
    }

    /// Take money out. The balance never drops below zero.
    pub fn remove(&mut self, amount: u64) -> Vec<WalletEvent> {
        if amount == 0 {
            return Vec::new();
        }
        self.balance = self.balance.saturating_sub(amount);
        vec![WalletEvent::Removed(amount), WalletEvent::Changed(self.balance)]
    }

    pub fn set(&mut self, amount: u64) -> Vec<WalletEvent> {
        self.balance = amount;
        vec![WalletEvent::Changed(self.balance)]
    }
}
