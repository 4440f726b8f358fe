//! Treasury custody and transfers.

use crate::asset::{Asset, FtTransfer, NftTransfer, SftTransfer, StxTransfer};
use crate::error::TreasuryError;
use crate::event::TreasuryEvent;
use edao_token::GovernanceToken;
use edao_types::{Authority, Principal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct Treasury {
    principal: Principal,
    /// Asset -> amount held. NFTs are held with amount 1.
    holdings: BTreeMap<Asset, u128>,
    events: Vec<TreasuryEvent>,
}

/// Serialisable treasury state, sorted by asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasurySnapshot {
    pub principal: Principal,
    pub holdings: Vec<(Asset, u128)>,
}

impl Treasury {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            holdings: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn balance_of(&self, asset: &Asset) -> u128 {
        self.holdings.get(asset).copied().unwrap_or(0)
    }

    pub fn stx_balance(&self) -> u128 {
        self.balance_of(&Asset::Stx)
    }

    pub fn ft_balance(&self, contract: &Principal) -> u128 {
        self.balance_of(&Asset::Ft {
            contract: contract.clone(),
        })
    }

    pub fn owns_nft(&self, contract: &Principal, id: u128) -> bool {
        self.balance_of(&Asset::Nft {
            contract: contract.clone(),
            id,
        }) > 0
    }

    pub fn sft_balance(&self, contract: &Principal, id: u128) -> u128 {
        self.balance_of(&Asset::Sft {
            contract: contract.clone(),
            id,
        })
    }

    pub fn holdings(&self) -> impl Iterator<Item = (&Asset, u128)> {
        self.holdings.iter().map(|(a, &n)| (a, n))
    }

    pub fn take_events(&mut self) -> Vec<TreasuryEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Deposits ─────────────────────────────────────────────────────────

    /// Take custody of `amount` of `asset`. Open to anyone.
    ///
    /// An NFT already in custody cannot be deposited again. Zero-amount
    /// deposits are a no-op.
    pub fn deposit(
        &mut self,
        asset: Asset,
        amount: u128,
        sender: &Principal,
    ) -> Result<(), TreasuryError> {
        let amount = if asset.is_nft() {
            if self.balance_of(&asset) > 0 {
                return Err(TreasuryError::NotAssetOwner(asset));
            }
            1
        } else {
            amount
        };
        if amount == 0 {
            return Ok(());
        }
        let held = self.holdings.entry(asset.clone()).or_insert(0);
        *held = held.saturating_add(amount);
        debug!(%asset, amount, %sender, "treasury deposit");
        self.events.push(TreasuryEvent::Deposit {
            asset,
            amount,
            sender: sender.clone(),
        });
        Ok(())
    }

    // ── Transfers ────────────────────────────────────────────────────────

    pub fn stx_transfer(
        &mut self,
        transfer: &StxTransfer,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TreasuryError> {
        self.stx_transfer_many(std::slice::from_ref(transfer), caller, auth)
    }

    /// Pay out several STX transfers. All are validated before any applies.
    pub fn stx_transfer_many(
        &mut self,
        transfers: &[StxTransfer],
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TreasuryError> {
        self.ensure_authority(caller, auth)?;
        let payouts: Vec<_> = transfers
            .iter()
            .map(|t| (Asset::Stx, t.amount, t.recipient.clone(), t.memo.clone()))
            .collect();
        self.pay_out(payouts)
    }

    pub fn sip009_transfer(
        &mut self,
        transfer: &NftTransfer,
        asset: &Principal,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TreasuryError> {
        self.sip009_transfer_many(std::slice::from_ref(transfer), asset, caller, auth)
    }

    pub fn sip009_transfer_many(
        &mut self,
        transfers: &[NftTransfer],
        asset: &Principal,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TreasuryError> {
        self.ensure_authority(caller, auth)?;
        let payouts: Vec<_> = transfers
            .iter()
            .map(|t| {
                let nft = Asset::Nft {
                    contract: asset.clone(),
                    id: t.token_id,
                };
                (nft, 1, t.recipient.clone(), None)
            })
            .collect();
        self.pay_out(payouts)
    }

    /// Transfer a fungible token. Governance-token transfers are made on the
    /// ledger with the treasury as sender.
    pub fn sip010_transfer(
        &mut self,
        transfer: &FtTransfer,
        asset: &Principal,
        ledger: &mut GovernanceToken,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TreasuryError> {
        self.sip010_transfer_many(std::slice::from_ref(transfer), asset, ledger, caller, auth)
    }

    pub fn sip010_transfer_many(
        &mut self,
        transfers: &[FtTransfer],
        asset: &Principal,
        ledger: &mut GovernanceToken,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TreasuryError> {
        self.ensure_authority(caller, auth)?;
        if asset == ledger.principal() {
            let treasury = self.principal.clone();
            for t in transfers {
                ledger.transfer(
                    t.amount,
                    &treasury,
                    &t.recipient,
                    t.memo.clone(),
                    &treasury,
                    auth,
                )?;
            }
            return Ok(());
        }
        let payouts: Vec<_> = transfers
            .iter()
            .map(|t| {
                let ft = Asset::Ft {
                    contract: asset.clone(),
                };
                (ft, t.amount, t.recipient.clone(), t.memo.clone())
            })
            .collect();
        self.pay_out(payouts)
    }

    pub fn sip013_transfer(
        &mut self,
        transfer: &SftTransfer,
        asset: &Principal,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TreasuryError> {
        self.sip013_transfer_many(std::slice::from_ref(transfer), asset, caller, auth)
    }

    pub fn sip013_transfer_many(
        &mut self,
        transfers: &[SftTransfer],
        asset: &Principal,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TreasuryError> {
        self.ensure_authority(caller, auth)?;
        let payouts: Vec<_> = transfers
            .iter()
            .map(|t| {
                let sft = Asset::Sft {
                    contract: asset.clone(),
                    id: t.token_id,
                };
                (sft, t.amount, t.recipient.clone(), t.memo.clone())
            })
            .collect();
        self.pay_out(payouts)
    }

    fn ensure_authority(
        &self,
        caller: &Principal,
        auth: &impl Authority,
    ) -> Result<(), TreasuryError> {
        if auth.is_dao_or_extension(caller) {
            Ok(())
        } else {
            Err(TreasuryError::Unauthorised)
        }
    }

    /// Validate the summed demand per asset against custody, then apply.
    fn pay_out(
        &mut self,
        payouts: Vec<(Asset, u128, Principal, Option<String>)>,
    ) -> Result<(), TreasuryError> {
        let mut demand: BTreeMap<&Asset, u128> = BTreeMap::new();
        for (asset, amount, _, _) in &payouts {
            let d = demand.entry(asset).or_insert(0);
            *d = d.saturating_add(*amount);
        }
        for (asset, needed) in demand {
            let available = self.balance_of(asset);
            if needed > available {
                return Err(if asset.is_nft() {
                    TreasuryError::NotAssetOwner(asset.clone())
                } else {
                    TreasuryError::InsufficientBalance {
                        asset: asset.clone(),
                        needed,
                        available,
                    }
                });
            }
        }

        for (asset, amount, recipient, memo) in payouts {
            let remaining = self.balance_of(&asset) - amount;
            if remaining == 0 {
                self.holdings.remove(&asset);
            } else {
                self.holdings.insert(asset.clone(), remaining);
            }
            debug!(%asset, amount, %recipient, "treasury transfer");
            self.events.push(TreasuryEvent::Transfer {
                asset,
                amount,
                recipient,
                memo,
            });
        }
        Ok(())
    }

    // ── Persistence ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> TreasurySnapshot {
        TreasurySnapshot {
            principal: self.principal.clone(),
            holdings: self
                .holdings
                .iter()
                .map(|(a, &n)| (a.clone(), n))
                .collect(),
        }
    }

    pub fn from_snapshot(snapshot: TreasurySnapshot) -> Self {
        Self {
            principal: snapshot.principal,
            holdings: snapshot
                .holdings
                .into_iter()
                .filter(|(_, n)| *n > 0)
                .collect(),
            events: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edao_token::{TokenError, TokenMetadata};
    use edao_types::{ErrorCode, OpenAuthority};

    /// Only the DAO principal is authorised.
    struct DaoOnly(Principal);

    impl Authority for DaoOnly {
        fn is_dao_or_extension(&self, caller: &Principal) -> bool {
            caller == &self.0
        }
    }

    fn p(s: &str) -> Principal {
        Principal::new(s)
    }

    fn treasury() -> Treasury {
        Treasury::new(p("ST1DEPLOYER.edao-treasury"))
    }

    fn dao() -> Principal {
        p("ST1DEPLOYER.edao-core")
    }

    fn stx(amount: u128, to: &str) -> StxTransfer {
        StxTransfer {
            amount,
            recipient: p(to),
            memo: Some("random memo".into()),
        }
    }

    // ── Authorisation ────────────────────────────────────────────────────

    #[test]
    fn deployer_cannot_transfer() {
        let mut t = treasury();
        t.deposit(Asset::Stx, 1000, &p("ST1DAISY")).unwrap();
        let auth = DaoOnly(dao());
        let deployer = p("ST1DEPLOYER");

        let err = t.stx_transfer(&stx(100, "ST1DAISY"), &deployer, &auth).unwrap_err();
        assert_eq!(err.code(), 3000);
        let many = [stx(100, "ST1PHIL"), stx(100, "ST1DAISY")];
        assert_eq!(
            t.stx_transfer_many(&many, &deployer, &auth),
            Err(TreasuryError::Unauthorised)
        );
        assert_eq!(t.stx_balance(), 1000);
    }

    #[test]
    fn nft_owner_cannot_pull_through_treasury() {
        let mut t = treasury();
        let nft = p("ST1DEPLOYER.sip009-nft");
        t.deposit(Asset::Nft { contract: nft.clone(), id: 1 }, 1, &p("ST1DAISY"))
            .unwrap();
        let transfer = NftTransfer {
            token_id: 1,
            recipient: p("ST1BOBBY"),
        };
        let err = t
            .sip009_transfer(&transfer, &nft, &p("ST1DAISY"), &DaoOnly(dao()))
            .unwrap_err();
        assert_eq!(err, TreasuryError::Unauthorised);
        assert!(t.owns_nft(&nft, 1));
    }

    // ── STX ──────────────────────────────────────────────────────────────

    #[test]
    fn dao_pays_out_stx() {
        let mut t = treasury();
        t.deposit(Asset::Stx, 100_000_000, &p("ST1DAISY")).unwrap();
        let auth = DaoOnly(dao());
        t.stx_transfer_many(&[stx(100, "ST1PHIL"), stx(200, "ST1BOBBY")], &dao(), &auth)
            .unwrap();
        assert_eq!(t.stx_balance(), 100_000_000 - 300);

        let events = t.take_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], TreasuryEvent::Deposit { amount: 100_000_000, .. }));
    }

    #[test]
    fn many_is_all_or_nothing() {
        let mut t = treasury();
        t.deposit(Asset::Stx, 250, &p("ST1DAISY")).unwrap();
        let err = t
            .stx_transfer_many(
                &[stx(100, "ST1PHIL"), stx(100, "ST1DAISY"), stx(100, "ST1BOBBY")],
                &dao(),
                &OpenAuthority,
            )
            .unwrap_err();
        assert_eq!(err.code(), 3001);
        assert_eq!(t.stx_balance(), 250);
    }

    // ── SIP009 ───────────────────────────────────────────────────────────

    #[test]
    fn dao_transfers_nfts_once() {
        let mut t = treasury();
        let nft = p("ST1DEPLOYER.sip009-nft");
        for id in [1, 2] {
            t.deposit(Asset::Nft { contract: nft.clone(), id }, 1, &p("ST1DAISY"))
                .unwrap();
        }
        let to_hunter = |id| NftTransfer {
            token_id: id,
            recipient: p("ST1HUNTER"),
        };
        t.sip009_transfer_many(&[to_hunter(1), to_hunter(2)], &nft, &dao(), &OpenAuthority)
            .unwrap();
        assert!(!t.owns_nft(&nft, 1));
        assert!(!t.owns_nft(&nft, 2));

        let err = t
            .sip009_transfer(&to_hunter(1), &nft, &dao(), &OpenAuthority)
            .unwrap_err();
        assert_eq!(err.code(), 3002);
    }

    #[test]
    fn same_nft_twice_in_one_batch_is_refused() {
        let mut t = treasury();
        let nft = p("ST1DEPLOYER.sip009-nft");
        t.deposit(Asset::Nft { contract: nft.clone(), id: 7 }, 1, &p("ST1DAISY"))
            .unwrap();
        let to = |r: &str| NftTransfer {
            token_id: 7,
            recipient: p(r),
        };
        let err = t
            .sip009_transfer_many(&[to("ST1PHIL"), to("ST1BOBBY")], &nft, &dao(), &OpenAuthority)
            .unwrap_err();
        assert!(matches!(err, TreasuryError::NotAssetOwner(_)));
        assert!(t.owns_nft(&nft, 7));
    }

    #[test]
    fn duplicate_nft_deposit_is_refused() {
        let mut t = treasury();
        let asset = Asset::Nft {
            contract: p("ST1DEPLOYER.sip009-nft"),
            id: 1,
        };
        t.deposit(asset.clone(), 1, &p("ST1DAISY")).unwrap();
        assert!(t.deposit(asset, 1, &p("ST1BOBBY")).is_err());
    }

    // ── SIP010 ───────────────────────────────────────────────────────────

    #[test]
    fn foreign_ft_is_tracked_in_custody() {
        let mut t = treasury();
        let usd = p("ST1DEPLOYER.usd-token");
        t.deposit(Asset::Ft { contract: usd.clone() }, 500, &p("ST1PHIL"))
            .unwrap();
        let mut ledger = GovernanceToken::new(p("ST1DEPLOYER.edao-token"), TokenMetadata::default());
        let transfer = FtTransfer {
            amount: 120,
            recipient: p("ST1HUNTER"),
            memo: None,
        };
        t.sip010_transfer(&transfer, &usd, &mut ledger, &dao(), &OpenAuthority)
            .unwrap();
        assert_eq!(t.ft_balance(&usd), 380);
    }

    #[test]
    fn governance_token_moves_on_the_ledger() {
        let mut t = treasury();
        let token = p("ST1DEPLOYER.edao-token");
        let mut ledger = GovernanceToken::new(token.clone(), TokenMetadata::default());
        ledger
            .edg_mint(400, t.principal(), &dao(), &OpenAuthority)
            .unwrap();

        let transfers = [
            FtTransfer {
                amount: 100,
                recipient: p("ST1HUNTER"),
                memo: Some("send now".into()),
            },
            FtTransfer {
                amount: 100,
                recipient: p("ST1HUNTER"),
                memo: None,
            },
        ];
        t.sip010_transfer_many(&transfers, &token, &mut ledger, &dao(), &OpenAuthority)
            .unwrap();
        assert_eq!(ledger.get_balance(t.principal()), 200);
        assert_eq!(ledger.get_balance(&p("ST1HUNTER")), 200);
        assert_eq!(t.ft_balance(&token), 0);
    }

    #[test]
    fn governance_token_errors_keep_token_code() {
        let mut t = treasury();
        let token = p("ST1DEPLOYER.edao-token");
        let mut ledger = GovernanceToken::new(token.clone(), TokenMetadata::default());
        let transfer = FtTransfer {
            amount: 1,
            recipient: p("ST1HUNTER"),
            memo: None,
        };
        let err = t
            .sip010_transfer(&transfer, &token, &mut ledger, &dao(), &OpenAuthority)
            .unwrap_err();
        assert!(matches!(
            err,
            TreasuryError::Token(TokenError::InsufficientUndelegatedTokens { .. })
        ));
        assert_eq!(err.code(), 2002);
        assert_eq!(err.contract(), "edao-token");
    }

    // ── SIP013 ───────────────────────────────────────────────────────────

    #[test]
    fn dao_splits_sft_holdings() {
        let mut t = treasury();
        let sft = p("ST1DEPLOYER.sip013-sft");
        t.deposit(Asset::Sft { contract: sft.clone(), id: 1 }, 50, &p("ST1DAISY"))
            .unwrap();
        t.deposit(Asset::Sft { contract: sft.clone(), id: 2 }, 50, &p("ST1BOBBY"))
            .unwrap();
        let half = |id| SftTransfer {
            token_id: id,
            amount: 25,
            recipient: p("ST1HUNTER"),
            memo: None,
        };
        t.sip013_transfer_many(&[half(1), half(2)], &sft, &dao(), &OpenAuthority)
            .unwrap();
        assert_eq!(t.sft_balance(&sft, 1), 25);
        assert_eq!(t.sft_balance(&sft, 2), 25);

        let err = t
            .sip013_transfer(
                &SftTransfer {
                    amount: 26,
                    ..half(1)
                },
                &sft,
                &dao(),
                &OpenAuthority,
            )
            .unwrap_err();
        assert_eq!(err.code(), 3001);
    }

    #[test]
    fn snapshot_drops_empty_holdings() {
        let mut t = treasury();
        t.deposit(Asset::Stx, 10, &p("ST1DAISY")).unwrap();
        t.stx_transfer(&stx(10, "ST1PHIL"), &dao(), &OpenAuthority)
            .unwrap();
        t.deposit(Asset::Ft { contract: p("ST1X.ft") }, 3, &p("ST1DAISY"))
            .unwrap();
        let snap = t.snapshot();
        assert_eq!(snap.holdings.len(), 1);
        let restored = Treasury::from_snapshot(snap.clone());
        assert_eq!(restored.snapshot(), snap);
    }
}
