use proptest::prelude::*;

use edao_token::{GovernanceToken, TokenMetadata};
use edao_types::{OpenAuthority, Principal};

const HOLDERS: [&str; 4] = ["phil", "daisy", "bobby", "ward"];

#[derive(Clone, Debug)]
enum Op {
    Delegate { amount: u128, to: usize, from: usize },
    Rescind { amount: u128, from: usize, delegator: usize },
    Lock { amount: u128, owner: usize },
    Unlock { amount: u128, owner: usize },
    Transfer { amount: u128, from: usize, to: usize },
}

fn op() -> impl Strategy<Value = Op> {
    let idx = 0usize..HOLDERS.len();
    let amt = 0u128..1500;
    prop_oneof![
        (amt.clone(), idx.clone(), idx.clone()).prop_map(|(amount, to, from)| Op::Delegate { amount, to, from }),
        (amt.clone(), idx.clone(), idx.clone()).prop_map(|(amount, from, delegator)| Op::Rescind { amount, from, delegator }),
        (amt.clone(), idx.clone()).prop_map(|(amount, owner)| Op::Lock { amount, owner }),
        (amt.clone(), idx.clone()).prop_map(|(amount, owner)| Op::Unlock { amount, owner }),
        (amt, idx.clone(), idx).prop_map(|(amount, from, to)| Op::Transfer { amount, from, to }),
    ]
}

fn p(i: usize) -> Principal {
    Principal::new(HOLDERS[i])
}

fn setup() -> GovernanceToken {
    let mut token = GovernanceToken::new(Principal::new("ST1.edao-token"), TokenMetadata::default());
    let dao = Principal::new("ST1.edao-core");
    for (i, amount) in [1000u128, 1000, 1000, 0].iter().enumerate() {
        if *amount > 0 {
            token.edg_mint(*amount, &p(i), &dao, &OpenAuthority).unwrap();
        }
    }
    token
}

/// Applies one operation; failures are expected and ignored.
fn apply(token: &mut GovernanceToken, op: &Op) {
    let _ = match *op {
        Op::Delegate { amount, to, from } => token.edg_delegate(amount, &p(to), &p(from), &p(from), &OpenAuthority),
        Op::Rescind { amount, from, delegator } => token
            .edg_rescind(amount, &p(from), &p(delegator), &p(delegator), &OpenAuthority)
            .map(|_| ()),
        Op::Lock { amount, owner } => token.lock(amount, &p(owner)),
        Op::Unlock { amount, owner } => token.unlock(amount, &p(owner)),
        Op::Transfer { amount, from, to } => token.transfer(amount, &p(from), &p(to), None, &p(from), &OpenAuthority),
    };
}

fn check_invariants(token: &GovernanceToken) -> Result<(), TestCaseError> {
    let sum: u128 = (0..HOLDERS.len()).map(|i| token.get_balance(&p(i))).sum();
    prop_assert_eq!(sum, token.get_total_supply());
    prop_assert_eq!(sum, 3000);

    for i in 0..HOLDERS.len() {
        let who = p(i);
        prop_assert!(token.get_locked(&who) <= token.get_balance(&who));

        let out: u128 = (0..HOLDERS.len()).map(|j| token.get_delegating(&who, &p(j))).sum();
        prop_assert_eq!(out, token.get_delegated_out(&who));

        let held: u128 = (0..HOLDERS.len()).map(|j| token.get_delegating(&p(j), &who)).sum();
        prop_assert_eq!(held, token.get_total_delegated(&who));
    }
    Ok(())
}

proptest! {
    /// Balances, supply, the lock bound and both delegation sums hold after
    /// any sequence of operations.
    #[test]
    fn invariants_hold(ops in prop::collection::vec(op(), 1..60)) {
        let mut token = setup();
        for op in &ops {
            apply(&mut token, op);
            check_invariants(&token)?;
        }
    }

    /// A failed operation leaves the ledger untouched.
    #[test]
    fn failures_do_not_mutate(ops in prop::collection::vec(op(), 1..40)) {
        let mut token = setup();
        for op in &ops {
            let before = token.snapshot();
            let result = match *op {
                Op::Delegate { amount, to, from } => token.edg_delegate(amount, &p(to), &p(from), &p(from), &OpenAuthority),
                Op::Rescind { amount, from, delegator } => token
                    .edg_rescind(amount, &p(from), &p(delegator), &p(delegator), &OpenAuthority)
                    .map(|_| ()),
                Op::Lock { amount, owner } => token.lock(amount, &p(owner)),
                Op::Unlock { amount, owner } => token.unlock(amount, &p(owner)),
                Op::Transfer { amount, from, to } => token.transfer(amount, &p(from), &p(to), None, &p(from), &OpenAuthority),
            };
            if result.is_err() {
                let after = token.snapshot();
                prop_assert_eq!(before.accounts, after.accounts);
                prop_assert_eq!(before.delegating, after.delegating);
            }
        }
    }

    /// edg_rescind returns min(amount, balance - locked) whenever the amount
    /// is within the delegated claim, and fails iff that is zero.
    #[test]
    fn rescind_is_capped(delegated in 1u128..1000, locked in 0u128..2000, amount in 0u128..1000) {
        let mut token = setup();
        let (daisy, ward) = (p(1), p(3));
        token.edg_delegate(delegated, &ward, &daisy, &daisy, &OpenAuthority).unwrap();
        let locked = locked.min(delegated);
        if locked > 0 {
            token.lock(locked, &ward).unwrap();
        }
        let expected = amount.min(token.get_balance(&ward) - token.get_locked(&ward));
        let result = token.edg_rescind(amount, &ward, &daisy, &daisy, &OpenAuthority);
        if amount > delegated {
            prop_assert!(result.is_err());
        } else if expected == 0 {
            prop_assert!(result.is_err());
        } else {
            prop_assert_eq!(result.unwrap(), expected);
            prop_assert_eq!(token.get_delegating(&daisy, &ward), delegated - expected);
        }
    }
}
