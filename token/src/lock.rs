//! The lock counter: tokens committed to live votes.

use crate::error::TokenError;
use crate::event::TokenEvent;
use crate::ledger::GovernanceToken;
use edao_types::{Authority, Principal};
use tracing::debug;

impl GovernanceToken {
    /// Lock `amount` of `owner`'s custody. Delegated-in tokens may be
    /// locked; only already-locked tokens are excluded.
    pub fn lock(&mut self, amount: u128, owner: &Principal) -> Result<(), TokenError> {
        if amount == 0 {
            return Err(TokenError::AmountToSendIsNonPositive);
        }
        let acct = self.accounts.entry(owner.clone()).or_default();
        let available = acct.unlocked();
        if amount > available {
            return Err(TokenError::InsufficientUnlockedTokens {
                needed: amount,
                available,
            });
        }
        acct.locked += amount;
        debug!(%owner, amount, locked = acct.locked, "locked");
        self.events.push(TokenEvent::Lock {
            amount,
            owner: owner.clone(),
        });
        Ok(())
    }

    pub fn unlock(&mut self, amount: u128, owner: &Principal) -> Result<(), TokenError> {
        if amount == 0 {
            return Err(TokenError::AmountToSendIsNonPositive);
        }
        let locked = self.get_locked(owner);
        if amount > locked {
            return Err(TokenError::UnlockingMoreThanLocked {
                requested: amount,
                locked,
            });
        }
        let acct = self.accounts.entry(owner.clone()).or_default();
        acct.locked -= amount;
        debug!(%owner, amount, locked = acct.locked, "unlocked");
        self.events.push(TokenEvent::Unlock {
            amount,
            owner: owner.clone(),
        });
        Ok(())
    }

    /// [`lock`](Self::lock) on behalf of an extension.
    pub fn edg_lock(
        &mut self,
        amount: u128,
        owner: &Principal,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TokenError> {
        self.ensure_authority(caller, auth)?;
        self.lock(amount, owner)
    }

    /// [`unlock`](Self::unlock) on behalf of an extension.
    pub fn edg_unlock(
        &mut self,
        amount: u128,
        owner: &Principal,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TokenError> {
        self.ensure_authority(caller, auth)?;
        self.unlock(amount, owner)
    }
}
