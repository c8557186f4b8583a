//! Membership registry: clubs, memberships and officer authority lists.
//!
//! Membership records are never deleted. Role and status changes overwrite
//! the current value and append to the record's history.

use std::collections::{BTreeMap, BTreeSet};

use clubledger_types::{
    AccountId, ApprovedAction, ChangeSource, Club, ClubId, ContentDigest, EpochId,
    GovernanceGrant, GrantAction, GrantScope, GrantTarget, LedgerError, MemberStatus, Membership,
    MembershipConfig, OfficerKey, Result, Role, constants,
};

use crate::ValidatedApproval;

/// Verified authority for an officer-role change.
#[derive(Debug, Clone, Copy)]
pub enum RoleAuthority<'a> {
    /// Officer co-signatures already checked by the attestation verifier.
    Officers(&'a ValidatedApproval),
    Governance(&'a GovernanceGrant),
}

impl RoleAuthority<'_> {
    /// How the resulting membership change is recorded in history.
    #[must_use]
    pub fn source(&self) -> ChangeSource {
        match self {
            Self::Officers(approval) => ChangeSource::OfficerQuorum(approval.approvers().clone()),
            Self::Governance(grant) => ChangeSource::Governance(grant.id),
        }
    }
}

/// Owns every club and membership record.
#[derive(Debug, Clone)]
pub struct MembershipRegistry {
    clubs: BTreeMap<ClubId, Club>,
    /// Keyed `(club, account)` so one club's members are a contiguous range.
    memberships: BTreeMap<(ClubId, AccountId), Membership>,
    config: MembershipConfig,
}

impl MembershipRegistry {
    #[must_use]
    pub fn new(config: MembershipConfig) -> Self {
        Self {
            clubs: BTreeMap::new(),
            memberships: BTreeMap::new(),
            config,
        }
    }

    // ── Club lifecycle ────────────────────────────────────────────────

    /// Create a club under a governance grant. Founders become officers.
    ///
    /// # Errors
    /// `Unauthorized` for a mismatched grant, `DuplicateClub`, or
    /// `InvalidInput` for a bad name or founder set.
    pub fn create_club(
        &mut self,
        id: ClubId,
        name: &str,
        founders: &BTreeMap<AccountId, OfficerKey>,
        metadata: Option<ContentDigest>,
        grant: &GovernanceGrant,
        now: EpochId,
    ) -> Result<()> {
        grant.check(
            GrantScope::MembershipRegistry,
            GrantAction::CreateClub,
            &GrantTarget::Club(id),
            now,
        )?;
        self.insert_club(id, name, founders, metadata, &ChangeSource::Governance(grant.id), now)
    }

    /// Create a club from genesis configuration, with optional plain members.
    ///
    /// # Errors
    /// Same validation as [`Self::create_club`], plus `DuplicateMembership`
    /// if a member is listed twice or is also a founder.
    pub fn bootstrap_club(
        &mut self,
        id: ClubId,
        name: &str,
        founders: &BTreeMap<AccountId, OfficerKey>,
        members: &[AccountId],
        now: EpochId,
    ) -> Result<()> {
        self.insert_club(id, name, founders, None, &ChangeSource::Genesis, now)?;
        for account in members {
            self.insert_membership(*account, id, Role::Member, None, ChangeSource::Genesis, now)?;
        }
        Ok(())
    }

    fn insert_club(
        &mut self,
        id: ClubId,
        name: &str,
        founders: &BTreeMap<AccountId, OfficerKey>,
        metadata: Option<ContentDigest>,
        source: &ChangeSource,
        now: EpochId,
    ) -> Result<()> {
        if self.clubs.contains_key(&id) {
            return Err(LedgerError::DuplicateClub(id));
        }
        if name.is_empty() || name.len() > constants::MAX_CLUB_NAME_LEN {
            return Err(LedgerError::invalid_input(format!(
                "club name must be 1..={} bytes",
                constants::MAX_CLUB_NAME_LEN
            )));
        }
        if founders.is_empty() || founders.len() > self.config.max_officers_per_club {
            return Err(LedgerError::invalid_input(format!(
                "club needs 1..={} founding officers, got {}",
                self.config.max_officers_per_club,
                founders.len()
            )));
        }
        for key in founders.values() {
            key.verifying_key()
                .map_err(|e| LedgerError::invalid_input(e.to_string()))?;
        }

        self.clubs.insert(
            id,
            Club {
                id,
                name: name.to_string(),
                officers: founders.clone(),
                officer_quorum: self.config.default_officer_quorum,
                member_count: 0,
                metadata,
                created_at: now,
            },
        );
        for account in founders.keys() {
            self.insert_membership(*account, id, Role::Officer, None, source.clone(), now)?;
        }

        tracing::info!(club = %id, name, officers = founders.len(), "Club created");
        Ok(())
    }

    /// Change the number of officers that must co-sign officer-role changes.
    ///
    /// # Errors
    /// `ClubNotFound`, `Unauthorized` for a mismatched grant, `InvalidInput` for zero.
    pub fn set_officer_quorum(
        &mut self,
        club: ClubId,
        quorum: usize,
        grant: &GovernanceGrant,
        now: EpochId,
    ) -> Result<()> {
        grant.check(
            GrantScope::MembershipRegistry,
            GrantAction::SetQuorumThreshold,
            &GrantTarget::Club(club),
            now,
        )?;
        if quorum == 0 {
            return Err(LedgerError::invalid_input("officer quorum must be positive"));
        }
        let entry = self.clubs.get_mut(&club).ok_or(LedgerError::ClubNotFound(club))?;
        entry.officer_quorum = quorum;
        tracing::info!(club = %club, quorum, "Officer quorum updated");
        Ok(())
    }

    // ── Memberships ───────────────────────────────────────────────────

    /// Register a plain membership, optionally vouched for by an officer.
    ///
    /// # Errors
    /// `ClubNotFound`, `DuplicateMembership`, or `Unauthorized` if
    /// `attested_by` is not a current officer of the club.
    pub fn register_membership(
        &mut self,
        account: AccountId,
        club: ClubId,
        attested_by: Option<AccountId>,
        now: EpochId,
    ) -> Result<()> {
        let entry = self.club(club)?;
        if self.memberships.contains_key(&(club, account)) {
            return Err(LedgerError::DuplicateMembership { account, club });
        }
        if let Some(officer) = attested_by {
            if !entry.is_officer(&officer) {
                tracing::warn!(club = %club, officer = %officer, "Attestation by non-officer rejected");
                return Err(LedgerError::unauthorized(format!(
                    "{officer} is not an officer of {club}"
                )));
            }
        }
        self.insert_membership(
            account,
            club,
            Role::Member,
            attested_by,
            ChangeSource::Attestation(attested_by),
            now,
        )?;
        tracing::info!(club = %club, account = %account, "Membership registered");
        Ok(())
    }

    fn insert_membership(
        &mut self,
        account: AccountId,
        club: ClubId,
        role: Role,
        attested_by: Option<AccountId>,
        source: ChangeSource,
        now: EpochId,
    ) -> Result<()> {
        let key = (club, account);
        if self.memberships.contains_key(&key) {
            return Err(LedgerError::DuplicateMembership { account, club });
        }
        let entry = self.clubs.get_mut(&club).ok_or(LedgerError::ClubNotFound(club))?;
        entry.member_count += 1;
        self.memberships.insert(
            key,
            Membership::new(account, club, role, attested_by, now, source),
        );
        Ok(())
    }

    /// Suspend, reinstate or remove a plain member. Officers leave through
    /// [`Self::revoke_officer_role`] first.
    ///
    /// # Errors
    /// `ClubNotFound`, `Unauthorized`, `MembershipNotFound`, or `InvalidInput`
    /// for a disallowed status change.
    pub fn set_member_status(
        &mut self,
        club: ClubId,
        account: AccountId,
        status: MemberStatus,
        officer: AccountId,
        now: EpochId,
    ) -> Result<()> {
        if !self.club(club)?.is_officer(&officer) {
            return Err(LedgerError::unauthorized(format!(
                "{officer} is not an officer of {club}"
            )));
        }
        let membership = self
            .memberships
            .get_mut(&(club, account))
            .ok_or(LedgerError::MembershipNotFound { account, club })?;
        if membership.role == Role::Officer {
            return Err(LedgerError::unauthorized(
                "officer status changes go through role revocation",
            ));
        }
        if !membership.status.can_transition_to(status) {
            return Err(LedgerError::invalid_input(format!(
                "cannot move membership from {} to {status}",
                membership.status
            )));
        }
        membership.record_change(Role::Member, status, now, ChangeSource::Officer(officer));
        tracing::info!(club = %club, account = %account, %status, "Member status changed");
        Ok(())
    }

    // ── Officer authority ─────────────────────────────────────────────

    /// Validate an officer-quorum or governance authority for a role change on
    /// `(club, account)`.
    fn check_authority(
        club: &Club,
        account: AccountId,
        authority: RoleAuthority<'_>,
        action: &ApprovedAction,
        grant_action: GrantAction,
        now: EpochId,
    ) -> Result<()> {
        match authority {
            RoleAuthority::Officers(approval) => {
                approval.ensure_covers(club.id, action)?;
                let approvers = approval.approvers();
                let strangers = club.non_officers(approvers);
                if let Some(stranger) = strangers.first() {
                    tracing::warn!(club = %club.id, approver = %stranger, "Non-officer in role-change quorum");
                    return Err(LedgerError::unauthorized(format!(
                        "{stranger} is not an officer of {}",
                        club.id
                    )));
                }
                let required = club.role_change_quorum();
                if approvers.len() < required {
                    return Err(LedgerError::unauthorized(format!(
                        "role change needs {required} officer approvals, got {}",
                        approvers.len()
                    )));
                }
                Ok(())
            }
            RoleAuthority::Governance(grant) => grant.check(
                GrantScope::MembershipRegistry,
                grant_action,
                &GrantTarget::Member {
                    club: club.id,
                    account,
                },
                now,
            ),
        }
    }

    /// Make `account` an officer of `club` with the given signing key.
    ///
    /// Creates the membership when missing; otherwise overwrites its role.
    ///
    /// # Errors
    /// `ClubNotFound`, `Unauthorized`, or `InvalidInput` if the account is
    /// already an officer, the key is malformed, the club is full, or the
    /// membership was removed.
    pub fn grant_officer_role(
        &mut self,
        club: ClubId,
        account: AccountId,
        key: OfficerKey,
        authority: RoleAuthority<'_>,
        now: EpochId,
    ) -> Result<()> {
        let entry = self.club(club)?;
        Self::check_authority(
            entry,
            account,
            authority,
            &ApprovedAction::GrantOfficer { account, key },
            GrantAction::GrantOfficer,
            now,
        )?;
        if entry.is_officer(&account) {
            return Err(LedgerError::invalid_input(format!(
                "{account} is already an officer of {club}"
            )));
        }
        if entry.officers.len() >= self.config.max_officers_per_club {
            return Err(LedgerError::invalid_input(format!(
                "{club} already has the maximum of {} officers",
                self.config.max_officers_per_club
            )));
        }
        key.verifying_key()
            .map_err(|e| LedgerError::invalid_input(e.to_string()))?;
        if let Some(existing) = self.memberships.get(&(club, account)) {
            if existing.status == MemberStatus::Removed {
                return Err(LedgerError::invalid_input(format!(
                    "{account} was removed from {club}"
                )));
            }
        }

        // Validation complete; mutate.
        let source = authority.source();
        match self.memberships.get_mut(&(club, account)) {
            Some(membership) => {
                membership.record_change(Role::Officer, MemberStatus::Active, now, source);
            }
            None => self.insert_membership(account, club, Role::Officer, None, source, now)?,
        }
        if let Some(entry) = self.clubs.get_mut(&club) {
            entry.officers.insert(account, key);
        }
        tracing::info!(club = %club, account = %account, "Officer role granted");
        Ok(())
    }

    /// Demote an officer to a plain member. The last officer cannot be removed.
    ///
    /// # Errors
    /// `ClubNotFound`, `Unauthorized`, or `InvalidInput` if the account is
    /// not an officer or is the last one.
    pub fn revoke_officer_role(
        &mut self,
        club: ClubId,
        account: AccountId,
        authority: RoleAuthority<'_>,
        now: EpochId,
    ) -> Result<()> {
        let entry = self.club(club)?;
        Self::check_authority(
            entry,
            account,
            authority,
            &ApprovedAction::RevokeOfficer { account },
            GrantAction::RevokeOfficer,
            now,
        )?;
        if !entry.is_officer(&account) {
            return Err(LedgerError::invalid_input(format!(
                "{account} is not an officer of {club}"
            )));
        }
        if entry.officers.len() == 1 {
            return Err(LedgerError::invalid_input(format!(
                "cannot remove the last officer of {club}"
            )));
        }

        let source = authority.source();
        if let Some(entry) = self.clubs.get_mut(&club) {
            entry.officers.remove(&account);
        }
        if let Some(membership) = self.memberships.get_mut(&(club, account)) {
            let status = membership.status;
            membership.record_change(Role::Member, status, now, source);
        }
        tracing::info!(club = %club, account = %account, "Officer role revoked");
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────

    /// # Errors
    /// `ClubNotFound`.
    pub fn club(&self, id: ClubId) -> Result<&Club> {
        self.clubs.get(&id).ok_or(LedgerError::ClubNotFound(id))
    }

    pub fn clubs(&self) -> impl Iterator<Item = &Club> {
        self.clubs.values()
    }

    #[must_use]
    pub fn is_officer(&self, club: ClubId, account: &AccountId) -> bool {
        self.clubs.get(&club).is_some_and(|c| c.is_officer(account))
    }

    #[must_use]
    pub fn officer_key(&self, club: ClubId, account: &AccountId) -> Option<&OfficerKey> {
        self.clubs.get(&club).and_then(|c| c.officer_key(account))
    }

    #[must_use]
    pub fn membership(&self, club: ClubId, account: &AccountId) -> Option<&Membership> {
        self.memberships.get(&(club, *account))
    }

    pub fn memberships(&self) -> impl Iterator<Item = &Membership> {
        self.memberships.values()
    }

    pub fn club_memberships(&self, club: ClubId) -> impl Iterator<Item = &Membership> {
        self.memberships
            .range((club, AccountId::from_bytes([0; 32]))..=(club, AccountId::from_bytes([0xff; 32])))
            .map(|(_, m)| m)
    }

    /// Ensure every approver is a current officer of `club`.
    ///
    /// # Errors
    /// `ClubNotFound`, or `Unauthorized` naming the first non-officer.
    pub fn check_officers(&self, club: ClubId, approvers: &BTreeSet<AccountId>) -> Result<&Club> {
        let entry = self.club(club)?;
        if let Some(stranger) = entry.non_officers(approvers).first() {
            tracing::warn!(club = %club, account = %stranger, "Approval by non-officer rejected");
            return Err(LedgerError::unauthorized(format!(
                "{stranger} is not an officer of {club}"
            )));
        }
        Ok(entry)
    }
}
