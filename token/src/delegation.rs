//! Delegation: custody moves to the delegate, attribution stays with the
//! delegator.
//!
//! Delegating `a` from D to P moves `a` of D's balance to P and records it in
//! three places: `D.delegated_out`, `P.total_delegated` and the pairwise
//! `delegating[(D, P)]`. Rescinding is the exact inverse, capped by the
//! custody P has not locked into votes.

use crate::error::TokenError;
use crate::event::TokenEvent;
use crate::ledger::GovernanceToken;
use edao_types::{Authority, Principal};
use tracing::debug;

impl GovernanceToken {
    /// Delegate `amount` of `delegator`'s tokens to `delegate`.
    pub fn edg_delegate(
        &mut self,
        amount: u128,
        delegate: &Principal,
        delegator: &Principal,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TokenError> {
        if caller != delegator && !auth.is_dao_or_extension(caller) {
            return Err(TokenError::NotTokenOwner);
        }
        if delegate == delegator {
            return Err(TokenError::SelfDelegation);
        }
        if amount == 0 {
            return Err(TokenError::AmountToSendIsNonPositive);
        }
        let available = self
            .account(delegator)
            .map(|a| a.undelegated_spendable())
            .unwrap_or(0);
        if amount > available {
            return Err(TokenError::InsufficientUndelegatedTokens {
                needed: amount,
                available,
            });
        }

        let key = (delegator.clone(), delegate.clone());
        let pair = self
            .delegating
            .get(&key)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let held = self
            .get_total_delegated(delegate)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let out = self
            .get_delegated_out(delegator)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        self.move_balance(amount, delegator, delegate)?;
        self.delegating.insert(key, pair);
        self.accounts.entry(delegate.clone()).or_default().total_delegated = held;
        self.accounts.entry(delegator.clone()).or_default().delegated_out = out;

        debug!(%delegator, %delegate, amount, "delegated");
        self.events.push(TokenEvent::Delegate {
            amount,
            delegator: delegator.clone(),
            delegate: delegate.clone(),
        });
        self.events.push(TokenEvent::Transfer {
            amount,
            sender: delegator.clone(),
            recipient: delegate.clone(),
            memo: None,
        });
        Ok(())
    }

    /// Return up to `amount` of delegated tokens from `delegate` to
    /// `delegator`.
    ///
    /// Only custody the delegate has not locked can come back, so the
    /// realised amount is `min(amount, delegate.balance - delegate.locked)`.
    /// Returns the realised amount; zero is an error.
    pub fn edg_rescind(
        &mut self,
        amount: u128,
        delegate: &Principal,
        delegator: &Principal,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<u128, TokenError> {
        if caller != delegator && !auth.is_dao_or_extension(caller) {
            return Err(TokenError::NotTokenOwner);
        }
        let key = (delegator.clone(), delegate.clone());
        let delegated = self.delegating.get(&key).copied().unwrap_or(0);
        if amount > delegated {
            return Err(TokenError::RescindingMoreThanDelegated {
                requested: amount,
                delegated,
            });
        }
        let unlocked = self.account(delegate).map(|a| a.unlocked()).unwrap_or(0);
        let returned = amount.min(unlocked);
        if returned == 0 {
            return Err(TokenError::AmountToSendIsNonPositive);
        }

        self.move_balance(returned, delegate, delegator)?;
        let remaining = delegated - returned;
        if remaining == 0 {
            self.delegating.remove(&key);
        } else {
            self.delegating.insert(key, remaining);
        }
        if let Some(acct) = self.accounts.get_mut(delegate) {
            acct.total_delegated = acct.total_delegated.saturating_sub(returned);
        }
        if let Some(acct) = self.accounts.get_mut(delegator) {
            acct.delegated_out = acct.delegated_out.saturating_sub(returned);
        }

        debug!(%delegator, %delegate, requested = amount, returned, "rescinded");
        self.events.push(TokenEvent::Rescind {
            amount: returned,
            delegator: delegator.clone(),
            delegate: delegate.clone(),
        });
        self.events.push(TokenEvent::Transfer {
            amount: returned,
            sender: delegate.clone(),
            recipient: delegator.clone(),
            memo: None,
        });
        Ok(returned)
    }
}
