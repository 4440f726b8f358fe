//! Sale state machine: `NotStarted -> Active -> Ended`.

use crate::error::SaleError;
use crate::event::SaleEvent;
use edao_token::GovernanceToken;
use edao_types::{Authority, BlockHeight, Principal, SaleParams};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SalePhase {
    NotStarted,
    Active,
    Ended,
}

#[derive(Clone, Debug)]
pub struct TokenSale {
    principal: Principal,
    params: SaleParams,
    start_height: Option<BlockHeight>,
    allocations: BTreeMap<Principal, u128>,
    claimed: BTreeSet<Principal>,
    total_allocation: u128,
    stx_raised: u128,
    events: Vec<SaleEvent>,
}

/// Serialisable sale state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleSnapshot {
    pub principal: Principal,
    pub params: SaleParams,
    pub start_height: Option<BlockHeight>,
    pub allocations: Vec<(Principal, u128)>,
    pub claimed: Vec<Principal>,
    pub total_allocation: u128,
    pub stx_raised: u128,
}

impl TokenSale {
    /// `principal` is the sale's own contract principal, presented to the
    /// token when minting claims.
    pub fn new(principal: Principal, params: SaleParams) -> Self {
        Self {
            principal,
            params,
            start_height: None,
            allocations: BTreeMap::new(),
            claimed: BTreeSet::new(),
            total_allocation: 0,
            stx_raised: 0,
            events: Vec::new(),
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn params(&self) -> &SaleParams {
        &self.params
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn get_start_height(&self) -> Option<BlockHeight> {
        self.start_height
    }

    pub fn get_end_height(&self) -> Option<BlockHeight> {
        self.start_height
            .map(|start| start.saturating_add(self.params.duration))
    }

    pub fn get_unclaimed_allocation(&self, who: &Principal) -> u128 {
        self.allocations.get(who).copied().unwrap_or(0)
    }

    /// Everything ever bought. Claims and refunds do not reduce it.
    pub fn get_total_allocation(&self) -> u128 {
        self.total_allocation
    }

    /// STX currently held by the sale.
    pub fn stx_raised(&self) -> u128 {
        self.stx_raised
    }

    pub fn phase(&self, height: BlockHeight) -> SalePhase {
        match self.get_end_height() {
            None => SalePhase::NotStarted,
            Some(end) if height < end => SalePhase::Active,
            Some(_) => SalePhase::Ended,
        }
    }

    /// Whether the minimum sale amount has been reached.
    pub fn succeeded(&self) -> bool {
        self.total_allocation >= u128::from(self.params.minimum_sale_amount)
    }

    pub fn take_events(&mut self) -> Vec<SaleEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Open the sale at `height`. Anyone may start it, once.
    pub fn start(&mut self, caller: &Principal, height: BlockHeight) -> Result<(), SaleError> {
        if self.start_height.is_some() {
            return Err(SaleError::SaleAlreadyStarted);
        }
        self.start_height = Some(height);
        let end_height = height.saturating_add(self.params.duration);
        info!(%caller, start = %height, end = %end_height, "token sale started");
        self.events.push(SaleEvent::Start {
            start_height: height,
            end_height,
        });
        Ok(())
    }

    /// Reserve `amount` tokens for `buyer`. Returns the STX cost taken.
    pub fn buy(
        &mut self,
        amount: u128,
        buyer: &Principal,
        height: BlockHeight,
    ) -> Result<u128, SaleError> {
        if self.phase(height) != SalePhase::Active {
            return Err(SaleError::SaleEnded);
        }
        let maximum = u128::from(self.params.maximum_allocation);
        let requested = self.get_unclaimed_allocation(buyer).saturating_add(amount);
        if amount == 0 || (maximum > 0 && requested > maximum) {
            return Err(SaleError::NoAllowance { requested, maximum });
        }
        let cost = amount
            .checked_mul(u128::from(self.params.price_per_token))
            .ok_or(SaleError::NoAllowance { requested, maximum })?;

        self.allocations.insert(buyer.clone(), requested);
        self.total_allocation = self.total_allocation.saturating_add(amount);
        self.stx_raised = self.stx_raised.saturating_add(cost);
        debug!(%buyer, amount, cost, "sale buy");
        self.events.push(SaleEvent::Buy {
            buyer: buyer.clone(),
            amount,
            cost,
        });
        Ok(cost)
    }

    /// Mint the claimer's allocation once a successful sale has ended.
    pub fn claim(
        &mut self,
        claimer: &Principal,
        ledger: &mut GovernanceToken,
        auth: &impl Authority,
        height: BlockHeight,
    ) -> Result<u128, SaleError> {
        let phase = self.phase(height);
        if phase == SalePhase::Active {
            return Err(SaleError::SaleNotEnded);
        }
        if phase == SalePhase::Ended && !self.succeeded() {
            return Err(SaleError::SaleFailed);
        }
        if self.claimed.contains(claimer) {
            return Err(SaleError::AlreadyClaimed);
        }
        let amount = self.get_unclaimed_allocation(claimer);
        if amount == 0 {
            return Err(SaleError::NothingToClaim);
        }

        ledger.edg_mint(amount, claimer, &self.principal, auth)?;
        self.allocations.remove(claimer);
        self.claimed.insert(claimer.clone());
        debug!(%claimer, amount, "sale claim");
        self.events.push(SaleEvent::Claim {
            claimer: claimer.clone(),
            amount,
        });
        Ok(amount)
    }

    /// Return the STX paid by `refundee` when the sale did not succeed.
    pub fn refund(&mut self, refundee: &Principal, height: BlockHeight) -> Result<u128, SaleError> {
        if self.phase(height) == SalePhase::Active {
            return Err(SaleError::SaleNotEnded);
        }
        if self.succeeded() {
            return Err(SaleError::SaleSucceeded);
        }
        let amount = self.get_unclaimed_allocation(refundee);
        if amount == 0 {
            return Err(SaleError::NothingToRefund);
        }
        let refunded = amount.saturating_mul(u128::from(self.params.price_per_token));

        self.allocations.remove(refundee);
        self.stx_raised = self.stx_raised.saturating_sub(refunded);
        debug!(%refundee, amount, refunded, "sale refund");
        self.events.push(SaleEvent::Refund {
            refundee: refundee.clone(),
            amount,
            refunded,
        });
        Ok(refunded)
    }

    /// Hand the proceeds of a successful sale to `recipient`. DAO only.
    pub fn withdraw_proceeds(
        &mut self,
        recipient: &Principal,
        caller: &Principal,
        auth: &impl Authority,
        height: BlockHeight,
    ) -> Result<u128, SaleError> {
        if !auth.is_dao_or_extension(caller) {
            return Err(SaleError::Unauthorised);
        }
        if self.phase(height) != SalePhase::Ended {
            return Err(SaleError::SaleNotEnded);
        }
        if !self.succeeded() {
            return Err(SaleError::SaleFailed);
        }
        let amount = self.stx_raised;
        if amount == 0 {
            return Err(SaleError::NothingToClaim);
        }
        self.stx_raised = 0;
        info!(%recipient, amount, "sale proceeds withdrawn");
        self.events.push(SaleEvent::Withdraw {
            recipient: recipient.clone(),
            amount,
        });
        Ok(amount)
    }

    // ── Persistence ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> SaleSnapshot {
        SaleSnapshot {
            principal: self.principal.clone(),
            params: self.params.clone(),
            start_height: self.start_height,
            allocations: self
                .allocations
                .iter()
                .map(|(p, &n)| (p.clone(), n))
                .collect(),
            claimed: self.claimed.iter().cloned().collect(),
            total_allocation: self.total_allocation,
            stx_raised: self.stx_raised,
        }
    }

    pub fn from_snapshot(snapshot: SaleSnapshot) -> Self {
        Self {
            principal: snapshot.principal,
            params: snapshot.params,
            start_height: snapshot.start_height,
            allocations: snapshot.allocations.into_iter().collect(),
            claimed: snapshot.claimed.into_iter().collect(),
            total_allocation: snapshot.total_allocation,
            stx_raised: snapshot.stx_raised,
            events: Vec::new(),
        }
    }
}
