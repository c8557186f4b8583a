//! Append-only record of committed state changes, for external indexers.

use serde::{Deserialize, Serialize};

use crate::{
    AccountId, Amount, ApprovalSource, BadgeId, BadgeTier, ClubId, EpochId, GrantId,
    MemberStatus, ReservationId, ReservationStatus, ResourceType, TierThresholds, WithdrawalId,
};

/// What caused a mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MintSource {
    Genesis,
    Claim { officer: AccountId, nonce: u64 },
    Governance(GrantId),
}

/// A committed state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    // --- Membership ---
    ClubCreated { club: ClubId, name: String },
    MembershipRegistered { account: AccountId, club: ClubId, attested_by: Option<AccountId> },
    OfficerGranted { club: ClubId, account: AccountId },
    OfficerRevoked { club: ClubId, account: AccountId },
    MemberStatusChanged { club: ClubId, account: AccountId, status: MemberStatus },
    OfficerQuorumSet { club: ClubId, quorum: usize },

    // --- Badges ---
    BadgeIssued { id: BadgeId, club: ClubId, owner: AccountId, tier: BadgeTier },
    BadgeRevoked { id: BadgeId },
    BadgeTransferred { id: BadgeId, from: AccountId, to: AccountId },
    TierThresholdsSet { club: ClubId, thresholds: TierThresholds },

    // --- Rewards ---
    Minted { account: AccountId, amount: Amount, source: MintSource },
    ClaimRevoked { club: ClubId, officer: AccountId, epoch: EpochId, nonce: u64 },
    Transferred { from: AccountId, to: AccountId, amount: Amount },
    Burned { account: AccountId, amount: Amount },
    TreasuryFunded { from: AccountId, amount: Amount },
    TreasurySeeded { amount: Amount },
    SupplyCapSet { cap: Option<Amount> },

    // --- Reservations ---
    ReservationCreated {
        id: ReservationId,
        account: AccountId,
        resource: ResourceType,
        amount: Amount,
        expires_at: EpochId,
    },
    ReservationSettled { id: ReservationId, status: ReservationStatus },
    SettlerAuthorized { resource: ResourceType, settler: AccountId },
    SettlerRevoked { resource: ResourceType, settler: AccountId },

    // --- Treasury ---
    WithdrawalProposed {
        id: WithdrawalId,
        amount: Amount,
        destination: AccountId,
        reproposal_of: Option<WithdrawalId>,
    },
    WithdrawalApproved { id: WithdrawalId, source: ApprovalSource, approvals: usize },
    WithdrawalTimelocked { id: WithdrawalId, timelock_until: EpochId, deadline: EpochId },
    WithdrawalExecuted { id: WithdrawalId, amount: Amount, destination: AccountId },
    WithdrawalCancelled { id: WithdrawalId, vetoed: bool },
    WithdrawalExpired { id: WithdrawalId },
    TreasuryThresholdSet { threshold: usize },
    TreasurySignerAdded { account: AccountId },
    TreasurySignerRemoved { account: AccountId },

    // --- Ledger ---
    GrantConsumed { grant: GrantId },
    EpochAdvanced { from: EpochId, to: EpochId },
}

/// A sequenced event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub epoch: EpochId,
    pub event: LedgerEvent,
}

/// Ordered event log. Sequence numbers start at 0 and have no gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn push(&mut self, epoch: EpochId, event: LedgerEvent) {
        let sequence = self.records.len() as u64;
        self.records.push(EventRecord {
            sequence,
            epoch,
            event,
        });
    }

    /// Records with `sequence >= from`.
    #[must_use]
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = usize::try_from(from).map_or(self.records.len(), |s| s.min(self.records.len()));
        &self.records[start..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sequence number the next record will receive.
    #[must_use]
    pub fn next_sequence(&self) -> u64 {
        self.records.len() as u64
    }
}
