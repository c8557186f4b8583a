//! Integration test: rejection paths
//!
//! Replay, forged claims and officer approvals, caps, soulbound badges,
//! grant reuse, settler and signer authorization. Every rejected operation must leave the state
//! digest and the event log exactly as they were.

use clubledger_engine::{Ledger, Operation};
use clubledger_types::*;
use ed25519_dalek::SigningKey;

const CLUB: ClubId = ClubId(1);

fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

fn officer(seed: u8) -> AccountId {
    AccountId::from_seed(seed)
}

fn alice() -> AccountId {
    AccountId::from_seed(1)
}

fn bob() -> AccountId {
    AccountId::from_seed(2)
}

fn settler() -> AccountId {
    AccountId::from_seed(9)
}

fn signer(n: u8) -> AccountId {
    AccountId::from_seed(20 + n)
}

fn gpu() -> ResourceType {
    ResourceType::new("GPU")
}

fn config() -> LedgerConfig {
    let mut cfg = LedgerConfig::default();
    cfg.treasury.signers = (1..=3).map(signer).collect();
    cfg.treasury.quorum_threshold = 2;
    cfg.genesis.epoch = EpochId(5);
    cfg.genesis.treasury = 100_000_000;
    cfg.genesis.allocations = [(alice(), 10_000)].into_iter().collect();
    cfg.genesis.clubs = vec![GenesisClub {
        id: CLUB,
        name: "Robotics".into(),
        officers: (11..=13)
            .map(|s| (officer(s), OfficerKey::from(signing_key(s).verifying_key())))
            .collect(),
        members: vec![alice(), bob()],
    }];
    cfg.genesis.settlers = vec![GenesisSettler {
        resource: gpu(),
        settler: settler(),
    }];
    cfg
}

fn ledger_with(cfg: &LedgerConfig) -> Ledger {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    Ledger::genesis(cfg).unwrap()
}

fn ledger() -> Ledger {
    ledger_with(&config())
}

fn claim(beneficiary: AccountId, amount: Amount, epoch: u64, nonce: u64, signer_seed: u8) -> AttestationClaim {
    AttestationClaim::unsigned(
        CLUB,
        beneficiary,
        amount,
        EpochId(epoch),
        nonce,
        officer(signer_seed),
    )
    .signed_with(&signing_key(signer_seed))
}

/// Officers `seeds` co-sign `action` in epoch 5 under approval `nonce`.
fn approve(action: &ApprovedAction, nonce: u64, seeds: &[u8]) -> OfficerApproval {
    seeds.iter().fold(OfficerApproval::new(EpochId(5), nonce), |approval, s| {
        approval.signed_by(CLUB, action, officer(*s), &signing_key(*s))
    })
}

/// `forger`'s key signing under each officer name in `names`.
fn forge(action: &ApprovedAction, nonce: u64, names: &[u8], forger: u8) -> OfficerApproval {
    names.iter().fold(OfficerApproval::new(EpochId(5), nonce), |approval, s| {
        approval.signed_by(CLUB, action, officer(*s), &signing_key(forger))
    })
}

fn issue_badge(owner: AccountId, tier: BadgeTier, soulbound: bool, approval: OfficerApproval) -> Operation {
    Operation::IssueBadge {
        club: CLUB,
        owner,
        tier,
        soulbound,
        metadata_hash: ContentDigest([2; 32]),
        approval,
    }
}

fn issue_action(owner: AccountId, tier: BadgeTier, soulbound: bool) -> ApprovedAction {
    ApprovedAction::IssueBadge {
        owner,
        tier,
        soulbound,
        metadata_hash: ContentDigest([2; 32]),
    }
}

/// Apply `op`, expect it rejected, and check nothing changed.
fn reject(ledger: &mut Ledger, op: Operation) -> LedgerError {
    let digest = ledger.state_digest();
    let events = ledger.events().len();
    let err = ledger.apply(op).unwrap_err();
    assert_eq!(ledger.state_digest(), digest, "state changed on {err}");
    assert_eq!(ledger.events().len(), events, "events emitted on {err}");
    err
}

// ============================================================================
// Claims
// ============================================================================

#[test]
fn replay_rejected_across_the_grace_window() {
    let mut ledger = ledger();
    let c = claim(bob(), 500, 5, 7, 11);
    ledger.apply(Operation::SubmitClaim(c.clone())).unwrap();

    // Prior-epoch grace keeps the nonce tracked.
    ledger.apply(Operation::AdvanceEpoch { to: EpochId(6) }).unwrap();
    assert!(matches!(
        reject(&mut ledger, Operation::SubmitClaim(c.clone())),
        LedgerError::NonceReplay { nonce: 7, .. }
    ));

    // Once pruned, the epoch window rejects it instead.
    ledger.apply(Operation::AdvanceEpoch { to: EpochId(7) }).unwrap();
    assert_eq!(
        reject(&mut ledger, Operation::SubmitClaim(c)),
        LedgerError::EpochExpired {
            claim_epoch: EpochId(5),
            current: EpochId(7)
        }
    );
    assert_eq!(ledger.available(&bob()), 500);
}

#[test]
fn forged_claims_rejected() {
    let mut ledger = ledger();

    // Signed by someone else's key.
    let forged = AttestationClaim::unsigned(CLUB, bob(), 500, EpochId(5), 1, officer(11))
        .signed_with(&signing_key(12));
    assert!(matches!(
        reject(&mut ledger, Operation::SubmitClaim(forged)),
        LedgerError::InvalidSignature { .. }
    ));

    // Amount changed after signing.
    let mut tampered = claim(bob(), 500, 5, 2, 11);
    tampered.amount = 50_000;
    assert!(matches!(
        reject(&mut ledger, Operation::SubmitClaim(tampered)),
        LedgerError::InvalidSignature { .. }
    ));

    // Truncated signature.
    let mut short = claim(bob(), 500, 5, 3, 11);
    short.signature.truncate(10);
    assert!(matches!(
        reject(&mut ledger, Operation::SubmitClaim(short)),
        LedgerError::InvalidSignature { .. }
    ));

    // A member who is not an officer.
    let member = AttestationClaim::unsigned(CLUB, bob(), 500, EpochId(5), 4, alice())
        .signed_with(&signing_key(1));
    assert!(matches!(
        reject(&mut ledger, Operation::SubmitClaim(member)),
        LedgerError::Unauthorized { .. }
    ));

    // Unknown club.
    let elsewhere = AttestationClaim::unsigned(ClubId(9), bob(), 500, EpochId(5), 5, officer(11))
        .signed_with(&signing_key(11));
    assert!(matches!(
        reject(&mut ledger, Operation::SubmitClaim(elsewhere)),
        LedgerError::Unauthorized { .. }
    ));

    assert!(matches!(
        reject(&mut ledger, Operation::SubmitClaim(claim(bob(), 0, 5, 6, 11))),
        LedgerError::InvalidAmount { .. }
    ));
    assert_eq!(ledger.available(&bob()), 0);
}

#[test]
fn future_and_stale_epochs_rejected() {
    let mut ledger = ledger();
    assert!(matches!(
        reject(&mut ledger, Operation::SubmitClaim(claim(bob(), 1, 6, 1, 11))),
        LedgerError::EpochExpired { .. }
    ));
    assert!(matches!(
        reject(&mut ledger, Operation::SubmitClaim(claim(bob(), 1, 3, 1, 11))),
        LedgerError::EpochExpired { .. }
    ));
    ledger
        .apply(Operation::SubmitClaim(claim(bob(), 1, 4, 1, 11)))
        .unwrap();
}

#[test]
fn beneficiary_epoch_cap_enforced() {
    let mut ledger = ledger();
    ledger
        .apply(Operation::SubmitClaim(claim(bob(), 60_000, 5, 1, 11)))
        .unwrap();
    ledger
        .apply(Operation::SubmitClaim(claim(bob(), 40_000, 5, 1, 12)))
        .unwrap();
    assert!(matches!(
        reject(&mut ledger, Operation::SubmitClaim(claim(bob(), 1, 5, 2, 13))),
        LedgerError::EpochCapExceeded { .. }
    ));

    // A fresh epoch has a fresh budget.
    ledger.apply(Operation::AdvanceEpoch { to: EpochId(6) }).unwrap();
    ledger
        .apply(Operation::SubmitClaim(claim(bob(), 1, 6, 2, 13)))
        .unwrap();
}

#[test]
fn failed_mint_leaves_nonce_unconsumed() {
    let mut cfg = config();
    cfg.supply_cap = Some(100_010_500);
    let mut ledger = ledger_with(&cfg);

    let c = claim(bob(), 1_000, 5, 7, 11);
    assert_eq!(
        reject(&mut ledger, Operation::SubmitClaim(c.clone())),
        LedgerError::SupplyCapExceeded {
            cap: 100_010_500,
            requested: 100_011_000
        }
    );
    assert!(!ledger.verifier().is_nonce_used(&officer(11), EpochId(5), 7));

    let raise = GovernanceGrant::dummy(
        1,
        GrantScope::RewardLedger,
        GrantAction::SetSupplyCap,
        GrantTarget::Ledger,
    );
    ledger
        .apply(Operation::SetSupplyCap {
            cap: Some(200_000_000),
            grant: raise,
        })
        .unwrap();
    ledger.apply(Operation::SubmitClaim(c)).unwrap();
    assert_eq!(ledger.available(&bob()), 1_000);
}

// ============================================================================
// Badges
// ============================================================================

#[test]
fn soulbound_badge_never_moves() {
    let mut ledger = ledger();
    let action = issue_action(alice(), BadgeTier::Basic, true);
    ledger
        .apply(issue_badge(alice(), BadgeTier::Basic, true, approve(&action, 1, &[11])))
        .unwrap();
    let id = ledger.badges().next().unwrap().id;

    assert_eq!(
        reject(
            &mut ledger,
            Operation::TransferBadge {
                id,
                from: alice(),
                to: bob(),
            }
        ),
        LedgerError::SoulboundViolation(id)
    );
    assert_eq!(ledger.badge(id).unwrap().owner, alice());
    assert!(ledger.badge(id).unwrap().transfers.is_empty());
}

#[test]
fn badge_issuance_requires_officers() {
    let mut ledger = ledger();
    let action = issue_action(bob(), BadgeTier::Elevated, false);
    // Alice is a member, not an officer.
    let mixed = approve(&action, 1, &[11]).signed_by(CLUB, &action, alice(), &signing_key(1));
    assert!(matches!(
        reject(&mut ledger, issue_badge(bob(), BadgeTier::Elevated, false, mixed)),
        LedgerError::Unauthorized { .. }
    ));
    // A single officer cannot stand in for an Elevated quorum.
    assert!(matches!(
        reject(
            &mut ledger,
            issue_badge(bob(), BadgeTier::Elevated, false, approve(&action, 1, &[11]))
        ),
        LedgerError::QuorumNotMet {
            required: 2,
            provided: 1
        }
    ));
}

// ============================================================================
// Officer approvals
// ============================================================================

#[test]
fn member_cannot_promote_itself_with_named_officers() {
    let mut ledger = ledger();
    let key = OfficerKey::from(signing_key(1).verifying_key());
    let action = ApprovedAction::GrantOfficer {
        account: alice(),
        key,
    };
    let promote = |approval| Operation::GrantOfficerRole {
        club: CLUB,
        account: alice(),
        key,
        authority: Authority::Officers(approval),
    };

    // Officer names with Alice's own signatures.
    assert!(matches!(
        reject(&mut ledger, promote(forge(&action, 1, &[11, 12], 1))),
        LedgerError::InvalidSignature { .. }
    ));
    // Officer names with no signature bytes at all.
    let mut blank = forge(&action, 1, &[11, 12], 1);
    for entry in &mut blank.signatures {
        entry.signature.clear();
    }
    assert!(matches!(
        reject(&mut ledger, promote(blank)),
        LedgerError::InvalidSignature { .. }
    ));
    // No signatures.
    assert!(matches!(
        reject(&mut ledger, promote(OfficerApproval::new(EpochId(5), 1))),
        LedgerError::Unauthorized { .. }
    ));
    assert!(!ledger.registry().is_officer(CLUB, &alice()));

    // Still not an officer, so her own claims and badges go nowhere.
    assert!(matches!(
        reject(
            &mut ledger,
            Operation::SubmitClaim(claim(alice(), 1_000, 5, 1, 1))
        ),
        LedgerError::Unauthorized { .. }
    ));
    let flagship = issue_action(alice(), BadgeTier::Flagship, true);
    assert!(matches!(
        reject(
            &mut ledger,
            issue_badge(alice(), BadgeTier::Flagship, true, approve(&flagship, 2, &[1]))
        ),
        LedgerError::Unauthorized { .. }
    ));
}

#[test]
fn forged_flagship_quorum_rejected() {
    let mut ledger = ledger();
    let action = issue_action(alice(), BadgeTier::Flagship, true);
    assert!(matches!(
        reject(
            &mut ledger,
            issue_badge(alice(), BadgeTier::Flagship, true, forge(&action, 1, &[11, 12, 13], 1))
        ),
        LedgerError::InvalidSignature { .. }
    ));
    // Two genuine signatures cannot carry a forged third.
    let partial = approve(&action, 1, &[11, 12]).signed_by(CLUB, &action, officer(13), &signing_key(2));
    assert!(matches!(
        reject(&mut ledger, issue_badge(alice(), BadgeTier::Flagship, true, partial)),
        LedgerError::InvalidSignature { .. }
    ));
    assert_eq!(ledger.badges().count(), 0);
}

#[test]
fn approval_bound_to_its_action() {
    let mut ledger = ledger();
    // Signed for a Basic badge to Bob; replayed as a Flagship and as a badge to Alice.
    let basic = approve(&issue_action(bob(), BadgeTier::Basic, true), 1, &[11, 12, 13]);
    assert!(matches!(
        reject(&mut ledger, issue_badge(bob(), BadgeTier::Flagship, true, basic.clone())),
        LedgerError::InvalidSignature { .. }
    ));
    assert!(matches!(
        reject(&mut ledger, issue_badge(alice(), BadgeTier::Basic, true, basic.clone())),
        LedgerError::InvalidSignature { .. }
    ));
    ledger
        .apply(issue_badge(bob(), BadgeTier::Basic, true, basic))
        .unwrap();
}

#[test]
fn approval_replay_rejected() {
    let mut ledger = ledger();
    let action = issue_action(bob(), BadgeTier::Elevated, true);
    let op = issue_badge(bob(), BadgeTier::Elevated, true, approve(&action, 7, &[11, 12]));
    ledger.apply(op.clone()).unwrap();
    assert!(matches!(
        reject(&mut ledger, op),
        LedgerError::NonceReplay { nonce: 7, .. }
    ));
    assert_eq!(ledger.badges().count(), 1);

    // The same nonce is spent for every co-signer.
    let other = issue_action(alice(), BadgeTier::Elevated, true);
    assert!(matches!(
        reject(
            &mut ledger,
            issue_badge(alice(), BadgeTier::Elevated, true, approve(&other, 7, &[12, 13]))
        ),
        LedgerError::NonceReplay { nonce: 7, .. }
    ));
    ledger
        .apply(issue_badge(alice(), BadgeTier::Elevated, true, approve(&other, 8, &[12, 13])))
        .unwrap();
}

#[test]
fn forged_claim_revocation_rejected() {
    let mut ledger = ledger();
    let action = ApprovedAction::RevokeClaim {
        officer: officer(11),
        epoch: EpochId(5),
        nonce: 3,
    };
    let op = |approval| Operation::RevokeClaim {
        club: CLUB,
        officer: officer(11),
        epoch: EpochId(5),
        nonce: 3,
        approval,
    };
    assert!(matches!(
        reject(&mut ledger, op(forge(&action, 1, &[11], 1))),
        LedgerError::InvalidSignature { .. }
    ));
    assert!(matches!(
        reject(&mut ledger, op(OfficerApproval::new(EpochId(5), 1))),
        LedgerError::Unauthorized { .. }
    ));
    // The claim still redeems.
    ledger
        .apply(Operation::SubmitClaim(claim(bob(), 100, 5, 3, 11)))
        .unwrap();
}

// ============================================================================
// Governance grants
// ============================================================================

#[test]
fn grant_is_single_use() {
    let mut ledger = ledger();
    let grant = GovernanceGrant::dummy(
        42,
        GrantScope::RewardLedger,
        GrantAction::MintReward,
        GrantTarget::Account(bob()),
    );
    ledger
        .apply(Operation::GovernanceMint {
            account: bob(),
            amount: 100,
            grant: grant.clone(),
        })
        .unwrap();
    assert!(ledger.grants().is_consumed(&GrantId(42)));

    assert_eq!(
        reject(
            &mut ledger,
            Operation::GovernanceMint {
                account: bob(),
                amount: 100,
                grant,
            }
        ),
        LedgerError::GrantAlreadyUsed(GrantId(42))
    );
    assert_eq!(ledger.available(&bob()), 100);
}

#[test]
fn rejected_grant_is_not_consumed() {
    let mut ledger = ledger();
    // Grant targets Bob; used for Alice.
    let grant = GovernanceGrant::dummy(
        7,
        GrantScope::RewardLedger,
        GrantAction::MintReward,
        GrantTarget::Account(bob()),
    );
    assert!(matches!(
        reject(
            &mut ledger,
            Operation::GovernanceMint {
                account: alice(),
                amount: 100,
                grant: grant.clone(),
            }
        ),
        LedgerError::Unauthorized { .. }
    ));
    assert!(!ledger.grants().is_consumed(&GrantId(7)));

    ledger
        .apply(Operation::GovernanceMint {
            account: bob(),
            amount: 100,
            grant,
        })
        .unwrap();
}

#[test]
fn expired_grant_rejected() {
    let mut ledger = ledger();
    let grant = GovernanceGrant {
        id: GrantId(1),
        scope: GrantScope::RewardLedger,
        action: GrantAction::MintReward,
        target: GrantTarget::Account(bob()),
        expires_at: EpochId(4),
    };
    assert!(matches!(
        reject(
            &mut ledger,
            Operation::GovernanceMint {
                account: bob(),
                amount: 100,
                grant,
            }
        ),
        LedgerError::Unauthorized { .. }
    ));
}

#[test]
fn grant_scope_must_match() {
    let mut ledger = ledger();
    let wrong_scope = GovernanceGrant::dummy(
        1,
        GrantScope::TreasuryController,
        GrantAction::AuthorizeSettler,
        GrantTarget::Resource(gpu()),
    );
    assert!(matches!(
        reject(
            &mut ledger,
            Operation::AuthorizeSettler {
                resource: gpu(),
                settler: bob(),
                grant: wrong_scope,
            }
        ),
        LedgerError::Unauthorized { .. }
    ));
}

// ============================================================================
// Reservations
// ============================================================================

#[test]
fn only_authorized_settler_settles_once() {
    let mut ledger = ledger();
    ledger
        .apply(Operation::Reserve {
            account: alice(),
            resource: gpu(),
            amount: 4_000,
            duration: 5,
        })
        .unwrap();
    let id = ledger.reservations().next().unwrap().id;

    assert!(matches!(
        reject(
            &mut ledger,
            Operation::Settle {
                id,
                disposition: Disposition::Spend,
                settler: bob(),
            }
        ),
        LedgerError::Unauthorized { .. }
    ));
    // Locked funds are not spendable.
    assert!(matches!(
        reject(
            &mut ledger,
            Operation::Transfer {
                from: alice(),
                to: bob(),
                amount: 6_001,
            }
        ),
        LedgerError::InsufficientBalance { .. }
    ));

    ledger
        .apply(Operation::Settle {
            id,
            disposition: Disposition::Refund,
            settler: settler(),
        })
        .unwrap();
    assert_eq!(
        reject(
            &mut ledger,
            Operation::Settle {
                id,
                disposition: Disposition::Spend,
                settler: settler(),
            }
        ),
        LedgerError::AlreadySettled {
            id,
            status: ReservationStatus::Refunded
        }
    );
    assert_eq!(ledger.available(&alice()), 10_000);
}

#[test]
fn settlement_after_sweep_rejected() {
    let mut ledger = ledger();
    ledger
        .apply(Operation::Reserve {
            account: alice(),
            resource: gpu(),
            amount: 1_000,
            duration: 2,
        })
        .unwrap();
    let id = ledger.reservations().next().unwrap().id;

    // The advance sweeps, so a late settlement finds it already expired.
    ledger.apply(Operation::AdvanceEpoch { to: EpochId(8) }).unwrap();
    assert_eq!(
        reject(
            &mut ledger,
            Operation::Settle {
                id,
                disposition: Disposition::Spend,
                settler: settler(),
            }
        ),
        LedgerError::AlreadySettled {
            id,
            status: ReservationStatus::Expired
        }
    );
    assert_eq!(ledger.available(&alice()), 10_000);
}

#[test]
fn revoked_settler_loses_access() {
    let mut ledger = ledger();
    let revoke = GovernanceGrant::dummy(
        1,
        GrantScope::ReservationManager,
        GrantAction::RevokeSettler,
        GrantTarget::Resource(gpu()),
    );
    ledger
        .apply(Operation::RevokeSettler {
            resource: gpu(),
            settler: settler(),
            grant: revoke,
        })
        .unwrap();
    ledger
        .apply(Operation::Reserve {
            account: alice(),
            resource: gpu(),
            amount: 1_000,
            duration: 2,
        })
        .unwrap();
    let id = ledger.reservations().next().unwrap().id;
    assert!(matches!(
        reject(
            &mut ledger,
            Operation::Settle {
                id,
                disposition: Disposition::Spend,
                settler: settler(),
            }
        ),
        LedgerError::Unauthorized { .. }
    ));
}

// ============================================================================
// Treasury
// ============================================================================

#[test]
fn treasury_rejects_outsiders_and_duplicates() {
    let mut ledger = ledger();
    assert!(matches!(
        reject(
            &mut ledger,
            Operation::ProposeWithdrawal {
                amount: 1_000,
                destination: bob(),
                proposer: bob(),
            }
        ),
        LedgerError::Unauthorized { .. }
    ));

    ledger
        .apply(Operation::ProposeWithdrawal {
            amount: 1_000,
            destination: bob(),
            proposer: signer(1),
        })
        .unwrap();
    let id = ledger.withdrawals().next().unwrap().id;

    assert!(matches!(
        reject(&mut ledger, Operation::ApproveWithdrawal { id, signer: bob() }),
        LedgerError::Unauthorized { .. }
    ));
    ledger
        .apply(Operation::ApproveWithdrawal { id, signer: signer(1) })
        .unwrap();
    assert_eq!(
        reject(&mut ledger, Operation::ApproveWithdrawal { id, signer: signer(1) }),
        LedgerError::DuplicateApproval(id)
    );
    assert!(matches!(
        reject(&mut ledger, Operation::ExecuteWithdrawal { id }),
        LedgerError::QuorumNotMet { .. }
    ));

    // Only the proposer may cancel.
    assert!(matches!(
        reject(&mut ledger, Operation::CancelWithdrawal { id, proposer: signer(2) }),
        LedgerError::Unauthorized { .. }
    ));
    ledger
        .apply(Operation::CancelWithdrawal { id, proposer: signer(1) })
        .unwrap();
    assert!(matches!(
        reject(&mut ledger, Operation::ApproveWithdrawal { id, signer: signer(2) }),
        LedgerError::InvalidTransition { .. }
    ));
    assert_eq!(ledger.treasury_balance(), 100_000_000);
}

#[test]
fn withdrawal_past_deadline_not_executed() {
    let mut cfg = config();
    cfg.treasury.timelock_epochs = 2;
    cfg.treasury.execution_window_epochs = 3;
    let mut ledger = ledger_with(&cfg);
    ledger
        .apply(Operation::ProposeWithdrawal {
            amount: 1_000,
            destination: bob(),
            proposer: signer(1),
        })
        .unwrap();
    let id = ledger.withdrawals().next().unwrap().id;
    for n in 1..=2 {
        ledger
            .apply(Operation::ApproveWithdrawal { id, signer: signer(n) })
            .unwrap();
    }
    let deadline = ledger.withdrawal(id).unwrap().deadline.unwrap();
    assert_eq!(deadline, EpochId(10));

    ledger.apply(Operation::AdvanceEpoch { to: EpochId(11) }).unwrap();
    assert_eq!(
        ledger.withdrawal(id).unwrap().status,
        WithdrawalStatus::Expired
    );
    assert!(matches!(
        reject(&mut ledger, Operation::ExecuteWithdrawal { id }),
        LedgerError::InvalidTransition { .. }
    ));
    assert_eq!(ledger.treasury_balance(), 100_000_000);
}

#[test]
fn withdrawal_beyond_treasury_rejected() {
    let mut cfg = config();
    cfg.genesis.treasury = 500;
    cfg.treasury.timelock_epochs = 0;
    let mut ledger = ledger_with(&cfg);
    ledger
        .apply(Operation::ProposeWithdrawal {
            amount: 1_000,
            destination: bob(),
            proposer: signer(1),
        })
        .unwrap();
    let id = ledger.withdrawals().next().unwrap().id;
    for n in 1..=2 {
        ledger
            .apply(Operation::ApproveWithdrawal { id, signer: signer(n) })
            .unwrap();
    }
    assert!(matches!(
        reject(&mut ledger, Operation::ExecuteWithdrawal { id }),
        LedgerError::InsufficientBalance { .. }
    ));
    assert_eq!(
        ledger.withdrawal(id).unwrap().status,
        WithdrawalStatus::Timelocked
    );
}

// ============================================================================
// Epochs
// ============================================================================

#[test]
fn epoch_never_moves_backwards() {
    let mut ledger = ledger();
    assert_eq!(
        reject(&mut ledger, Operation::AdvanceEpoch { to: EpochId(5) }),
        LedgerError::EpochRegression {
            current: EpochId(5),
            requested: EpochId(5)
        }
    );
    assert!(matches!(
        reject(&mut ledger, Operation::AdvanceEpoch { to: EpochId(2) }),
        LedgerError::EpochRegression { .. }
    ));
}
