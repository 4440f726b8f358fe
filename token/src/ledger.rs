//! The governance token ledger.
//!
//! Owns every account record, the pairwise delegation table, total supply and
//! the transfer-lock flag. Delegation lives in [`crate::delegation`] and the
//! lock counter in [`crate::lock`]; both extend [`GovernanceToken`].

use crate::account::Account;
use crate::error::TokenError;
use crate::event::TokenEvent;
use edao_types::{Authority, Principal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Descriptive token metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub token_uri: Option<String>,
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self {
            name: "EDAO Governance Token".to_string(),
            symbol: "EDG".to_string(),
            decimals: 6,
            token_uri: None,
        }
    }
}

/// The governance token.
#[derive(Clone, Debug)]
pub struct GovernanceToken {
    principal: Principal,
    metadata: TokenMetadata,
    pub(crate) accounts: HashMap<Principal, Account>,
    /// (delegator, delegate) -> amount currently delegated.
    pub(crate) delegating: HashMap<(Principal, Principal), u128>,
    pub(crate) total_supply: u128,
    transfer_lock: bool,
    pub(crate) events: Vec<TokenEvent>,
}

impl GovernanceToken {
    pub fn new(principal: Principal, metadata: TokenMetadata) -> Self {
        Self {
            principal,
            metadata,
            accounts: HashMap::new(),
            delegating: HashMap::new(),
            total_supply: 0,
            transfer_lock: false,
            events: Vec::new(),
        }
    }

    /// The contract principal of this token.
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn get_balance(&self, who: &Principal) -> u128 {
        self.accounts.get(who).map(|a| a.balance).unwrap_or(0)
    }

    pub fn get_locked(&self, who: &Principal) -> u128 {
        self.accounts.get(who).map(|a| a.locked).unwrap_or(0)
    }

    /// Tokens held by `who` on behalf of delegators.
    pub fn get_total_delegated(&self, who: &Principal) -> u128 {
        self.accounts.get(who).map(|a| a.total_delegated).unwrap_or(0)
    }

    /// Tokens `who` has delegated to others.
    pub fn get_delegated_out(&self, who: &Principal) -> u128 {
        self.accounts.get(who).map(|a| a.delegated_out).unwrap_or(0)
    }

    pub fn get_delegating(&self, delegator: &Principal, delegate: &Principal) -> u128 {
        self.delegating
            .get(&(delegator.clone(), delegate.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn get_total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn is_transfer_locked(&self) -> bool {
        self.transfer_lock
    }

    pub fn account(&self, who: &Principal) -> Option<&Account> {
        self.accounts.get(who)
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&Principal, &Account)> {
        self.accounts.iter()
    }

    /// Every non-zero (delegator, delegate, amount) entry.
    pub fn delegations(&self) -> impl Iterator<Item = (&Principal, &Principal, u128)> {
        self.delegating
            .iter()
            .filter(|(_, &amount)| amount > 0)
            .map(|((from, to), &amount)| (from, to, amount))
    }

    /// Drain the events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<TokenEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Transfers ────────────────────────────────────────────────────────

    /// Move `amount` from `sender` to `recipient`.
    ///
    /// `caller` must be the sender or the DAO / an enabled extension. The
    /// sender can only move tokens that are neither locked nor held for
    /// delegators.
    pub fn transfer(
        &mut self,
        amount: u128,
        sender: &Principal,
        recipient: &Principal,
        memo: Option<String>,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TokenError> {
        if self.transfer_lock {
            return Err(TokenError::TransferIsLocked);
        }
        if caller != sender && !auth.is_dao_or_extension(caller) {
            return Err(TokenError::NotTokenOwner);
        }
        self.checked_transfer(amount, sender, recipient, memo)
    }

    /// Privileged transfer, only for the DAO or an enabled extension.
    pub fn edg_transfer(
        &mut self,
        amount: u128,
        sender: &Principal,
        recipient: &Principal,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TokenError> {
        self.ensure_authority(caller, auth)?;
        if self.transfer_lock {
            return Err(TokenError::TransferIsLocked);
        }
        self.checked_transfer(amount, sender, recipient, None)
    }

    fn checked_transfer(
        &mut self,
        amount: u128,
        sender: &Principal,
        recipient: &Principal,
        memo: Option<String>,
    ) -> Result<(), TokenError> {
        if amount == 0 {
            return Err(TokenError::AmountToSendIsNonPositive);
        }
        let available = self
            .accounts
            .get(sender)
            .map(Account::undelegated_spendable)
            .unwrap_or(0);
        if amount > available {
            return Err(TokenError::InsufficientUndelegatedTokens {
                needed: amount,
                available,
            });
        }
        self.move_balance(amount, sender, recipient)?;
        debug!(%sender, %recipient, amount, "token transfer");
        self.events.push(TokenEvent::Transfer {
            amount,
            sender: sender.clone(),
            recipient: recipient.clone(),
            memo,
        });
        Ok(())
    }

    /// Move custody without any spendability check. Callers validate first.
    pub(crate) fn move_balance(
        &mut self,
        amount: u128,
        from: &Principal,
        to: &Principal,
    ) -> Result<(), TokenError> {
        if from == to {
            return Ok(());
        }
        let credited = self
            .get_balance(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let from_acct = self.accounts.entry(from.clone()).or_default();
        from_acct.balance = from_acct
            .balance
            .checked_sub(amount)
            .ok_or(TokenError::Overflow)?;
        self.accounts.entry(to.clone()).or_default().balance = credited;
        Ok(())
    }

    // ── Privileged supply management ─────────────────────────────────────

    pub fn set_transfer_lock(
        &mut self,
        locked: bool,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TokenError> {
        self.ensure_authority(caller, auth)?;
        self.transfer_lock = locked;
        debug!(locked, "transfer lock set");
        self.events.push(TokenEvent::TransferLock { locked });
        Ok(())
    }

    pub fn edg_mint(
        &mut self,
        amount: u128,
        recipient: &Principal,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TokenError> {
        self.ensure_authority(caller, auth)?;
        self.mint(amount, recipient)
    }

    /// Mint to several recipients. Either every mint applies or none does.
    pub fn edg_mint_many(
        &mut self,
        recipients: &[(u128, Principal)],
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TokenError> {
        self.ensure_authority(caller, auth)?;
        let mut total = self.total_supply;
        for (amount, _) in recipients {
            if *amount == 0 {
                return Err(TokenError::AmountToSendIsNonPositive);
            }
            total = total.checked_add(*amount).ok_or(TokenError::Overflow)?;
        }
        for (amount, recipient) in recipients {
            self.mint(*amount, recipient)?;
        }
        Ok(())
    }

    fn mint(&mut self, amount: u128, recipient: &Principal) -> Result<(), TokenError> {
        if amount == 0 {
            return Err(TokenError::AmountToSendIsNonPositive);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let acct = self.accounts.entry(recipient.clone()).or_default();
        acct.balance = acct.balance.checked_add(amount).ok_or(TokenError::Overflow)?;
        self.total_supply = supply;
        debug!(%recipient, amount, "minted");
        self.events.push(TokenEvent::Mint {
            amount,
            recipient: recipient.clone(),
        });
        Ok(())
    }

    /// Burn tokens the owner could otherwise spend.
    pub fn edg_burn(
        &mut self,
        amount: u128,
        owner: &Principal,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TokenError> {
        self.ensure_authority(caller, auth)?;
        if amount == 0 {
            return Err(TokenError::AmountToSendIsNonPositive);
        }
        let acct = self.accounts.entry(owner.clone()).or_default();
        let available = acct.undelegated_spendable();
        if amount > available {
            return Err(TokenError::InsufficientUndelegatedTokens {
                needed: amount,
                available,
            });
        }
        acct.balance -= amount;
        self.total_supply = self.total_supply.saturating_sub(amount);
        debug!(%owner, amount, "burned");
        self.events.push(TokenEvent::Burn {
            amount,
            owner: owner.clone(),
        });
        Ok(())
    }

    pub fn set_metadata(
        &mut self,
        metadata: TokenMetadata,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TokenError> {
        self.ensure_authority(caller, auth)?;
        self.metadata = metadata;
        Ok(())
    }

    pub(crate) fn ensure_authority(
        &self,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TokenError> {
        if auth.is_dao_or_extension(caller) {
            Ok(())
        } else {
            Err(TokenError::Unauthorised)
        }
    }
}

/// Serializable snapshot of the ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub principal: Principal,
    pub metadata: TokenMetadata,
    pub accounts: Vec<(Principal, Account)>,
    pub delegating: Vec<(Principal, Principal, u128)>,
    pub total_supply: u128,
    pub transfer_lock: bool,
}

impl GovernanceToken {
    pub fn snapshot(&self) -> TokenSnapshot {
        let mut accounts: Vec<_> = self
            .accounts
            .iter()
            .filter(|(_, a)| !a.is_empty())
            .map(|(p, a)| (p.clone(), a.clone()))
            .collect();
        accounts.sort_by(|a, b| a.0.cmp(&b.0));
        let mut delegating: Vec<_> = self
            .delegations()
            .map(|(from, to, amount)| (from.clone(), to.clone(), amount))
            .collect();
        delegating.sort();
        TokenSnapshot {
            principal: self.principal.clone(),
            metadata: self.metadata.clone(),
            accounts,
            delegating,
            total_supply: self.total_supply,
            transfer_lock: self.transfer_lock,
        }
    }

    pub fn from_snapshot(snapshot: TokenSnapshot) -> Self {
        Self {
            principal: snapshot.principal,
            metadata: snapshot.metadata,
            accounts: snapshot.accounts.into_iter().collect(),
            delegating: snapshot
                .delegating
                .into_iter()
                .map(|(from, to, amount)| ((from, to), amount))
                .collect(),
            total_supply: snapshot.total_supply,
            transfer_lock: snapshot.transfer_lock,
            events: Vec::new(),
        }
    }

    /// Serialize the ledger to bytes.
    pub fn save_state(&self) -> Result<Vec<u8>, TokenError> {
        bincode::serialize(&self.snapshot()).map_err(|e| TokenError::Snapshot(e.to_string()))
    }

    /// Restore a ledger from bytes produced by [`save_state`](Self::save_state).
    pub fn load_state(data: &[u8]) -> Result<Self, TokenError> {
        bincode::deserialize::<TokenSnapshot>(data)
            .map(Self::from_snapshot)
            .map_err(|e| TokenError::Snapshot(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edao_types::OpenAuthority;

    struct NoAuthority;

    impl Authority for NoAuthority {
        fn is_dao_or_extension(&self, _caller: &Principal) -> bool {
            false
        }
    }

    fn p(name: &str) -> Principal {
        Principal::new(name)
    }

    fn funded() -> GovernanceToken {
        let mut token = GovernanceToken::new(p("ST1DEPLOYER.edao-token"), TokenMetadata::default());
        let dao = p("ST1DEPLOYER.edao-core");
        for who in ["bobby", "daisy"] {
            token.edg_mint(1000, &p(who), &dao, &OpenAuthority).unwrap();
        }
        token.take_events();
        token
    }

    // ── Transfers ────────────────────────────────────────────────────────

    #[test]
    fn holder_can_transfer() {
        let mut token = funded();
        token
            .transfer(100, &p("bobby"), &p("daisy"), Some("hi".into()), &p("bobby"), &NoAuthority)
            .unwrap();
        assert_eq!(token.get_balance(&p("bobby")), 900);
        assert_eq!(token.get_balance(&p("daisy")), 1100);
        let events = token.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], TokenEvent::Transfer { memo: Some(m), .. } if m == "hi"));
    }

    #[test]
    fn stranger_cannot_move_funds() {
        let mut token = funded();
        let err = token
            .transfer(1, &p("bobby"), &p("daisy"), None, &p("daisy"), &NoAuthority)
            .unwrap_err();
        assert_eq!(err, TokenError::NotTokenOwner);
    }

    #[test]
    fn zero_transfer_rejected() {
        let mut token = funded();
        let err = token
            .transfer(0, &p("bobby"), &p("daisy"), None, &p("bobby"), &NoAuthority)
            .unwrap_err();
        assert_eq!(err, TokenError::AmountToSendIsNonPositive);
    }

    #[test]
    fn self_transfer_keeps_balance() {
        let mut token = funded();
        token
            .transfer(10, &p("bobby"), &p("bobby"), None, &p("bobby"), &NoAuthority)
            .unwrap();
        assert_eq!(token.get_balance(&p("bobby")), 1000);
    }

    #[test]
    fn transfer_lock_blocks_holders_and_dao() {
        let mut token = funded();
        let dao = p("dao");
        token.set_transfer_lock(true, &dao, &OpenAuthority).unwrap();
        let err = token
            .transfer(1, &p("bobby"), &p("daisy"), None, &p("bobby"), &NoAuthority)
            .unwrap_err();
        assert_eq!(err, TokenError::TransferIsLocked);
        let err = token
            .edg_transfer(1, &p("bobby"), &p("daisy"), &dao, &OpenAuthority)
            .unwrap_err();
        assert_eq!(err, TokenError::TransferIsLocked);

        token.set_transfer_lock(false, &dao, &OpenAuthority).unwrap();
        token
            .transfer(1, &p("bobby"), &p("daisy"), None, &p("bobby"), &NoAuthority)
            .unwrap();
    }

    #[test]
    fn only_authority_sets_transfer_lock() {
        let mut token = funded();
        let err = token
            .set_transfer_lock(true, &p("bobby"), &NoAuthority)
            .unwrap_err();
        assert_eq!(err, TokenError::Unauthorised);
        assert!(!token.is_transfer_locked());
    }

    #[test]
    fn edg_transfer_refuses_holder() {
        let mut token = funded();
        let err = token
            .edg_transfer(10, &p("bobby"), &p("daisy"), &p("bobby"), &NoAuthority)
            .unwrap_err();
        assert_eq!(err, TokenError::Unauthorised);
    }

    // ── Supply ───────────────────────────────────────────────────────────

    #[test]
    fn mint_many_is_all_or_nothing() {
        let mut token = funded();
        let dao = p("dao");
        let err = token
            .edg_mint_many(&[(5, p("ward")), (0, p("hunter"))], &dao, &OpenAuthority)
            .unwrap_err();
        assert_eq!(err, TokenError::AmountToSendIsNonPositive);
        assert_eq!(token.get_balance(&p("ward")), 0);
        assert_eq!(token.get_total_supply(), 2000);

        token
            .edg_mint_many(&[(5, p("ward")), (7, p("hunter"))], &dao, &OpenAuthority)
            .unwrap();
        assert_eq!(token.get_total_supply(), 2012);
    }

    #[test]
    fn burn_reduces_supply() {
        let mut token = funded();
        token
            .edg_burn(400, &p("daisy"), &p("dao"), &OpenAuthority)
            .unwrap();
        assert_eq!(token.get_balance(&p("daisy")), 600);
        assert_eq!(token.get_total_supply(), 1600);
        let err = token
            .edg_burn(601, &p("daisy"), &p("dao"), &OpenAuthority)
            .unwrap_err();
        assert!(matches!(err, TokenError::InsufficientUndelegatedTokens { .. }));
    }

    #[test]
    fn mint_overflow_detected() {
        let mut token = funded();
        let err = token
            .edg_mint(u128::MAX, &p("ward"), &p("dao"), &OpenAuthority)
            .unwrap_err();
        assert_eq!(err, TokenError::Overflow);
    }

    // ── Persistence ──────────────────────────────────────────────────────

    #[test]
    fn state_survives_save_and_load() {
        let mut token = funded();
        token
            .edg_delegate(100, &p("bobby"), &p("daisy"), &p("daisy"), &NoAuthority)
            .unwrap();
        token.lock(50, &p("bobby")).unwrap();

        let bytes = token.save_state().unwrap();
        let restored = GovernanceToken::load_state(&bytes).unwrap();
        assert_eq!(restored.get_balance(&p("bobby")), 1100);
        assert_eq!(restored.get_locked(&p("bobby")), 50);
        assert_eq!(restored.get_delegating(&p("daisy"), &p("bobby")), 100);
        assert_eq!(restored.get_total_supply(), 2000);
        assert_eq!(restored.principal(), token.principal());
    }

    #[test]
    fn load_rejects_garbage() {
        assert!(GovernanceToken::load_state(&[0xff, 0x01]).is_err());
    }
}
