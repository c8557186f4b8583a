//! Ledger configuration. Every field has a default from [`constants`], so a
//! config file only needs to name what it changes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    AccountId, Amount, ClubId, EpochId, LedgerError, OfficerKey, ResourceType, TierThresholds,
    constants,
};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub claims: ClaimConfig,
    pub badges: BadgeConfig,
    pub membership: MembershipConfig,
    pub reservations: ReservationConfig,
    pub treasury: TreasuryConfig,
    /// Optional ceiling on total supply.
    pub supply_cap: Option<Amount>,
    pub genesis: GenesisConfig,
}

/// Attestation claim acceptance rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimConfig {
    /// Cumulative amount one officer may attest per epoch.
    pub officer_epoch_cap: Amount,
    /// Cumulative amount one beneficiary may receive per epoch.
    pub beneficiary_epoch_cap: Amount,
    /// Accept claims for the epoch immediately before the current one.
    pub allow_prior_epoch: bool,
    /// Distinct nonces tracked per (officer, epoch) before further claims are refused.
    pub max_nonces_per_officer_epoch: usize,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            officer_epoch_cap: constants::DEFAULT_OFFICER_EPOCH_CAP,
            beneficiary_epoch_cap: constants::DEFAULT_BENEFICIARY_EPOCH_CAP,
            allow_prior_epoch: true,
            max_nonces_per_officer_epoch: constants::MAX_NONCES_PER_OFFICER_EPOCH,
        }
    }
}

/// Badge tier thresholds applied to newly created clubs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeConfig {
    pub default_thresholds: TierThresholds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MembershipConfig {
    /// Officer co-signers required for role changes in new clubs.
    pub default_officer_quorum: usize,
    pub max_officers_per_club: usize,
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            default_officer_quorum: constants::DEFAULT_OFFICER_QUORUM,
            max_officers_per_club: constants::MAX_OFFICERS_PER_CLUB,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationConfig {
    pub max_duration_epochs: u64,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            max_duration_epochs: constants::DEFAULT_MAX_RESERVATION_EPOCHS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreasuryConfig {
    /// Distinct approvals required to approve a withdrawal.
    pub quorum_threshold: usize,
    /// Epochs between approval and the first epoch execution is allowed.
    pub timelock_epochs: u64,
    /// Epochs after the timelock during which execution stays allowed.
    pub execution_window_epochs: u64,
    /// Accounts allowed to propose and approve withdrawals.
    pub signers: BTreeSet<AccountId>,
}

impl Default for TreasuryConfig {
    fn default() -> Self {
        Self {
            quorum_threshold: constants::DEFAULT_TREASURY_QUORUM,
            timelock_epochs: constants::DEFAULT_TIMELOCK_EPOCHS,
            execution_window_epochs: constants::DEFAULT_EXECUTION_WINDOW_EPOCHS,
            signers: BTreeSet::new(),
        }
    }
}

/// Initial ledger state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    pub epoch: EpochId,
    pub treasury: Amount,
    pub allocations: BTreeMap<AccountId, Amount>,
    pub clubs: Vec<GenesisClub>,
    pub settlers: Vec<GenesisSettler>,
}

impl GenesisConfig {
    /// Total supply minted at genesis.
    ///
    /// # Errors
    /// `Configuration` if the sum overflows.
    pub fn total_supply(&self) -> crate::Result<Amount> {
        self.allocations
            .values()
            .try_fold(self.treasury, |acc, v| acc.checked_add(*v))
            .ok_or_else(|| LedgerError::Configuration("genesis supply overflows".into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisClub {
    pub id: ClubId,
    pub name: String,
    /// Founding officers and their signing keys.
    pub officers: BTreeMap<AccountId, OfficerKey>,
    #[serde(default)]
    pub members: Vec<AccountId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisSettler {
    pub resource: ResourceType,
    pub settler: AccountId,
}

impl LedgerConfig {
    /// Parse and validate a JSON config.
    ///
    /// # Errors
    /// `Configuration` on malformed JSON or invalid values.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| LedgerError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject nonsensical values.
    ///
    /// # Errors
    /// `Configuration` naming the first offending field.
    pub fn validate(&self) -> crate::Result<()> {
        let fail = |msg: String| -> crate::Result<()> { Err(LedgerError::Configuration(msg)) };

        if self.claims.officer_epoch_cap == 0 || self.claims.beneficiary_epoch_cap == 0 {
            return fail("claims: epoch caps must be positive".into());
        }
        if self.claims.max_nonces_per_officer_epoch == 0 {
            return fail("claims.max_nonces_per_officer_epoch must be positive".into());
        }
        if !self.badges.default_thresholds.is_valid() {
            return fail(format!(
                "badges.default_thresholds invalid: {:?}",
                self.badges.default_thresholds
            ));
        }
        let max_officers = self.membership.max_officers_per_club;
        if max_officers == 0 || max_officers > constants::MAX_OFFICERS_PER_CLUB {
            return fail(format!(
                "membership.max_officers_per_club must be in 1..={}",
                constants::MAX_OFFICERS_PER_CLUB
            ));
        }
        if self.membership.default_officer_quorum == 0 {
            return fail("membership.default_officer_quorum must be positive".into());
        }
        if self.reservations.max_duration_epochs == 0 {
            return fail("reservations.max_duration_epochs must be positive".into());
        }
        // A governance grant counts as one approval on top of the signers.
        let reachable = self.treasury.signers.len() + 1;
        if self.treasury.quorum_threshold == 0 || self.treasury.quorum_threshold > reachable {
            return fail(format!(
                "treasury.quorum_threshold {} unreachable with {} signers",
                self.treasury.quorum_threshold,
                self.treasury.signers.len()
            ));
        }

        let supply = self.genesis.total_supply()?;
        if let Some(cap) = self.supply_cap {
            if supply > cap {
                return fail(format!("genesis supply {supply} exceeds supply_cap {cap}"));
            }
        }

        let mut seen = BTreeSet::new();
        for club in &self.genesis.clubs {
            if !seen.insert(club.id) {
                return fail(format!("genesis: duplicate {}", club.id));
            }
            if club.name.is_empty() || club.name.len() > constants::MAX_CLUB_NAME_LEN {
                return fail(format!("genesis: {} name length out of range", club.id));
            }
            if club.officers.is_empty() || club.officers.len() > max_officers {
                return fail(format!(
                    "genesis: {} needs 1..={max_officers} officers",
                    club.id
                ));
            }
            for key in club.officers.values() {
                key.verifying_key()
                    .map_err(|e| LedgerError::Configuration(format!("genesis: {}: {e}", club.id)))?;
            }
        }
        Ok(())
    }
}
