//! Treasury controller: multisig approval plus timelock for treasury outflows.
//!
//! ```text
//! propose ─▶ PROPOSED ──(threshold distinct approvals)──▶ APPROVED ─▶ TIMELOCKED
//!                                                                       │
//!                     execute in [timelock_until, deadline] ────────────┴─▶ EXECUTED
//! ```
//!
//! Reaching the threshold approves the request and starts its timelock in the
//! same step. A request that is never executed by its deadline is moved to
//! `EXPIRED` by the sweep and has to be re-proposed.

use std::collections::{BTreeMap, BTreeSet};

use clubledger_types::{
    AccountId, Amount, ApprovalSource, EpochId, GovernanceGrant, GrantAction, GrantScope,
    GrantTarget, LedgerError, Result, TreasuryConfig, WithdrawalId, WithdrawalRequest,
    WithdrawalStatus,
};

use crate::rewards::RewardLedger;

#[derive(Debug, Clone)]
pub struct TreasuryController {
    requests: BTreeMap<WithdrawalId, WithdrawalRequest>,
    signers: BTreeSet<AccountId>,
    quorum_threshold: usize,
    timelock_epochs: u64,
    execution_window_epochs: u64,
    next_id: u64,
}

impl TreasuryController {
    #[must_use]
    pub fn new(config: &TreasuryConfig) -> Self {
        Self {
            requests: BTreeMap::new(),
            signers: config.signers.clone(),
            quorum_threshold: config.quorum_threshold,
            timelock_epochs: config.timelock_epochs,
            execution_window_epochs: config.execution_window_epochs,
            next_id: 1,
        }
    }

    fn require_signer(&self, account: &AccountId) -> Result<()> {
        if !self.signers.contains(account) {
            tracing::warn!(account = %account, "Treasury action by non-signer rejected");
            return Err(LedgerError::unauthorized(format!(
                "{account} is not a treasury signer"
            )));
        }
        Ok(())
    }

    fn request(&self, id: WithdrawalId) -> Result<&WithdrawalRequest> {
        self.requests
            .get(&id)
            .ok_or(LedgerError::WithdrawalNotFound(id))
    }

    fn request_mut(&mut self, id: WithdrawalId) -> Result<&mut WithdrawalRequest> {
        self.requests
            .get_mut(&id)
            .ok_or(LedgerError::WithdrawalNotFound(id))
    }

    fn insert(
        &mut self,
        amount: Amount,
        destination: AccountId,
        proposer: AccountId,
        reproposal_of: Option<WithdrawalId>,
        now: EpochId,
    ) -> WithdrawalId {
        let id = WithdrawalId(self.next_id);
        self.next_id += 1;
        let mut request = WithdrawalRequest::new(
            id,
            amount,
            destination,
            proposer,
            self.quorum_threshold,
            now,
        );
        request.reproposal_of = reproposal_of;
        self.requests.insert(id, request);
        tracing::info!(
            withdrawal = %id,
            amount = %amount,
            destination = %destination,
            threshold = self.quorum_threshold,
            "Withdrawal proposed"
        );
        id
    }

    /// Open a new withdrawal request. The current threshold is captured on it.
    ///
    /// # Errors
    /// `Unauthorized` if `proposer` is not a signer, `InvalidAmount` for zero.
    pub fn propose(
        &mut self,
        amount: Amount,
        destination: AccountId,
        proposer: AccountId,
        now: EpochId,
    ) -> Result<WithdrawalId> {
        self.require_signer(&proposer)?;
        if amount == 0 {
            return Err(LedgerError::InvalidAmount {
                reason: "withdrawal amount must be positive".into(),
            });
        }
        Ok(self.insert(amount, destination, proposer, None, now))
    }

    /// Record a signer's approval.
    ///
    /// # Errors
    /// `WithdrawalNotFound`, `Unauthorized`, `DuplicateApproval`, or
    /// `InvalidTransition` once the request has left `Proposed`.
    pub fn approve(
        &mut self,
        id: WithdrawalId,
        signer: AccountId,
        now: EpochId,
    ) -> Result<WithdrawalStatus> {
        self.request(id)?;
        self.require_signer(&signer)?;
        self.add_approval(id, ApprovalSource::Signer(signer), now)
    }

    /// Record a governance approval. Counts as one distinct approval.
    ///
    /// # Errors
    /// As [`Self::approve`], with `Unauthorized` for a mismatched grant.
    pub fn approve_with_grant(
        &mut self,
        id: WithdrawalId,
        grant: &GovernanceGrant,
        now: EpochId,
    ) -> Result<WithdrawalStatus> {
        self.request(id)?;
        grant.check(
            GrantScope::TreasuryController,
            GrantAction::ApproveWithdrawal,
            &GrantTarget::Withdrawal(id),
            now,
        )?;
        self.add_approval(id, ApprovalSource::Governance, now)
    }

    fn add_approval(
        &mut self,
        id: WithdrawalId,
        source: ApprovalSource,
        now: EpochId,
    ) -> Result<WithdrawalStatus> {
        let timelock_until = now.after(self.timelock_epochs);
        let deadline = timelock_until.after(self.execution_window_epochs);
        let request = self.request_mut(id)?;
        if request.approvals.contains(&source) {
            return Err(LedgerError::DuplicateApproval(id));
        }
        if request.status != WithdrawalStatus::Proposed {
            return Err(LedgerError::InvalidTransition {
                id,
                from: request.status,
                to: WithdrawalStatus::Approved,
            });
        }

        request.approvals.insert(source);
        tracing::debug!(
            withdrawal = %id,
            approvals = request.approvals.len(),
            threshold = request.quorum_threshold,
            "Withdrawal approval recorded"
        );
        if request.has_quorum() {
            request.transition(WithdrawalStatus::Approved, now)?;
            request.transition(WithdrawalStatus::Timelocked, now)?;
            request.timelock_until = Some(timelock_until);
            request.deadline = Some(deadline);
            tracing::info!(
                withdrawal = %id,
                timelock_until = %timelock_until,
                deadline = %deadline,
                "Withdrawal approved, timelock started"
            );
        }
        Ok(request.status)
    }

    /// Pay out a timelocked request whose timelock has elapsed.
    ///
    /// # Errors
    /// `QuorumNotMet` before approval, `TimelockNotElapsed` before
    /// `timelock_until`, `WithdrawalExpired` after the deadline,
    /// `InsufficientBalance` if the treasury is short, `InvalidTransition`
    /// for a closed request.
    pub fn execute(
        &mut self,
        id: WithdrawalId,
        rewards: &mut RewardLedger,
        now: EpochId,
    ) -> Result<()> {
        let request = self.request(id)?;
        match request.status {
            WithdrawalStatus::Proposed => {
                return Err(LedgerError::QuorumNotMet {
                    required: request.quorum_threshold,
                    provided: request.approvals.len(),
                });
            }
            WithdrawalStatus::Timelocked => {}
            status => {
                return Err(LedgerError::InvalidTransition {
                    id,
                    from: status,
                    to: WithdrawalStatus::Executed,
                });
            }
        }
        let (Some(until), Some(deadline)) = (request.timelock_until, request.deadline) else {
            return Err(LedgerError::InvalidTransition {
                id,
                from: request.status,
                to: WithdrawalStatus::Executed,
            });
        };
        if now < until {
            return Err(LedgerError::TimelockNotElapsed { until, now });
        }
        if request.is_past_deadline(now) {
            return Err(LedgerError::WithdrawalExpired { id, deadline });
        }

        let (amount, destination) = (request.amount, request.destination);
        rewards.pay_from_treasury(destination, amount)?;
        self.request_mut(id)?
            .transition(WithdrawalStatus::Executed, now)?;
        tracing::info!(
            withdrawal = %id,
            amount = %amount,
            destination = %destination,
            "Withdrawal executed"
        );
        Ok(())
    }

    /// Withdraw a pending request. Only its proposer may do this.
    ///
    /// # Errors
    /// `WithdrawalNotFound`, `Unauthorized`, or `InvalidTransition` if closed.
    pub fn cancel(&mut self, id: WithdrawalId, proposer: AccountId, now: EpochId) -> Result<()> {
        let request = self.request_mut(id)?;
        if request.proposer != proposer {
            return Err(LedgerError::unauthorized(format!(
                "only the proposer of {id} may cancel it"
            )));
        }
        request.transition(WithdrawalStatus::Cancelled, now)?;
        tracing::info!(withdrawal = %id, "Withdrawal cancelled by proposer");
        Ok(())
    }

    /// Governance veto of a pending request.
    ///
    /// # Errors
    /// `WithdrawalNotFound`, `Unauthorized`, or `InvalidTransition` if closed.
    pub fn veto(&mut self, id: WithdrawalId, grant: &GovernanceGrant, now: EpochId) -> Result<()> {
        self.request(id)?;
        grant.check(
            GrantScope::TreasuryController,
            GrantAction::VetoWithdrawal,
            &GrantTarget::Withdrawal(id),
            now,
        )?;
        self.request_mut(id)?
            .transition(WithdrawalStatus::Cancelled, now)?;
        tracing::warn!(withdrawal = %id, grant = %grant.id, "Withdrawal vetoed");
        Ok(())
    }

    /// Move timelocked requests past their deadline to `Expired`. Idempotent.
    ///
    /// # Errors
    /// `InvalidTransition` only if a request is in an inconsistent state.
    pub fn sweep_expired(&mut self, now: EpochId) -> Result<Vec<WithdrawalId>> {
        let due: Vec<WithdrawalId> = self
            .requests
            .values()
            .filter(|r| r.status == WithdrawalStatus::Timelocked && r.is_past_deadline(now))
            .map(|r| r.id)
            .collect();
        for id in &due {
            self.request_mut(*id)?
                .transition(WithdrawalStatus::Expired, now)?;
            tracing::info!(withdrawal = %id, "Withdrawal expired");
        }
        Ok(due)
    }

    /// Open a fresh request copying a cancelled or expired one.
    ///
    /// The new request starts with no approvals and the current threshold.
    ///
    /// # Errors
    /// `WithdrawalNotFound`, `Unauthorized` for a non-signer, `InvalidInput`
    /// if the original is still open or was executed.
    pub fn repropose(
        &mut self,
        id: WithdrawalId,
        proposer: AccountId,
        now: EpochId,
    ) -> Result<WithdrawalId> {
        let original = self.request(id)?;
        if !matches!(
            original.status,
            WithdrawalStatus::Cancelled | WithdrawalStatus::Expired
        ) {
            return Err(LedgerError::invalid_input(format!(
                "{id} is {}, only cancelled or expired requests can be re-proposed",
                original.status
            )));
        }
        let (amount, destination) = (original.amount, original.destination);
        self.require_signer(&proposer)?;
        Ok(self.insert(amount, destination, proposer, Some(id), now))
    }

    // ── Signer set and threshold ──────────────────────────────────────

    /// Change the threshold for future proposals. Open requests keep theirs.
    ///
    /// # Errors
    /// `Unauthorized` for a mismatched grant, `InvalidInput` if the threshold
    /// is zero or unreachable.
    pub fn set_quorum_threshold(
        &mut self,
        threshold: usize,
        grant: &GovernanceGrant,
        now: EpochId,
    ) -> Result<()> {
        grant.check(
            GrantScope::TreasuryController,
            GrantAction::SetQuorumThreshold,
            &GrantTarget::Ledger,
            now,
        )?;
        Self::check_threshold(threshold, self.signers.len())?;
        self.quorum_threshold = threshold;
        tracing::info!(threshold, "Treasury threshold updated");
        Ok(())
    }

    // Governance supplies at most one approval on top of the signers.
    fn check_threshold(threshold: usize, signers: usize) -> Result<()> {
        if threshold == 0 || threshold > signers + 1 {
            return Err(LedgerError::invalid_input(format!(
                "threshold {threshold} unreachable with {signers} signers"
            )));
        }
        Ok(())
    }

    /// # Errors
    /// `Unauthorized` for a mismatched grant, `InvalidInput` if already a signer.
    pub fn add_signer(
        &mut self,
        account: AccountId,
        grant: &GovernanceGrant,
        now: EpochId,
    ) -> Result<()> {
        grant.check(
            GrantScope::TreasuryController,
            GrantAction::AddTreasurySigner,
            &GrantTarget::Account(account),
            now,
        )?;
        if !self.signers.insert(account) {
            return Err(LedgerError::invalid_input(format!(
                "{account} is already a treasury signer"
            )));
        }
        tracing::info!(account = %account, "Treasury signer added");
        Ok(())
    }

    /// Remove a signer. Approvals already given stay counted.
    ///
    /// # Errors
    /// `Unauthorized` for a mismatched grant, `InvalidInput` if not a signer
    /// or if the threshold would become unreachable.
    pub fn remove_signer(
        &mut self,
        account: AccountId,
        grant: &GovernanceGrant,
        now: EpochId,
    ) -> Result<()> {
        grant.check(
            GrantScope::TreasuryController,
            GrantAction::RemoveTreasurySigner,
            &GrantTarget::Account(account),
            now,
        )?;
        if !self.signers.contains(&account) {
            return Err(LedgerError::invalid_input(format!(
                "{account} is not a treasury signer"
            )));
        }
        Self::check_threshold(self.quorum_threshold, self.signers.len() - 1)?;
        self.signers.remove(&account);
        tracing::info!(account = %account, "Treasury signer removed");
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────

    #[must_use]
    pub fn get(&self, id: &WithdrawalId) -> Option<&WithdrawalRequest> {
        self.requests.get(id)
    }

    pub fn requests(&self) -> impl Iterator<Item = &WithdrawalRequest> {
        self.requests.values()
    }

    #[must_use]
    pub fn signers(&self) -> &BTreeSet<AccountId> {
        &self.signers
    }

    #[must_use]
    pub fn is_signer(&self, account: &AccountId) -> bool {
        self.signers.contains(account)
    }

    #[must_use]
    pub fn quorum_threshold(&self) -> usize {
        self.quorum_threshold
    }

    #[must_use]
    pub fn timelock_epochs(&self) -> u64 {
        self.timelock_epochs
    }

    #[must_use]
    pub fn execution_window_epochs(&self) -> u64 {
        self.execution_window_epochs
    }
}
