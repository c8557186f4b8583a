//! Building the initial [`Ledger`] from a [`LedgerConfig`].
//!
//! Genesis is the only path that mints without a claim or grant and creates
//! clubs without a governance grant. The resulting events are the first
//! entries of the log, so an indexer replaying from sequence 0 sees them.

use clubledger_authority::{AttestationVerifier, BadgeLedger, GrantGuard, MembershipRegistry};
use clubledger_funds::{ReservationManager, RewardLedger, TreasuryController};
use clubledger_types::{EventLog, LedgerConfig, LedgerEvent, MintSource, Result};

use crate::ledger::Ledger;

impl Ledger {
    /// Build the genesis state.
    ///
    /// # Errors
    /// `Configuration` for an invalid config, or any error the components
    /// raise while loading genesis clubs, allocations and settlers.
    pub fn genesis(config: &LedgerConfig) -> Result<Self> {
        config.validate()?;
        let genesis = &config.genesis;
        let mut ledger = Self {
            registry: MembershipRegistry::new(config.membership.clone()),
            verifier: AttestationVerifier::new(config.claims.clone()),
            badges: BadgeLedger::new(config.badges.default_thresholds),
            rewards: RewardLedger::new(config.supply_cap),
            reservations: ReservationManager::new(&config.reservations),
            treasury: TreasuryController::new(&config.treasury),
            grants: GrantGuard::new(),
            epoch: genesis.epoch,
            events: EventLog::default(),
        };

        for club in &genesis.clubs {
            ledger.registry.bootstrap_club(
                club.id,
                &club.name,
                &club.officers,
                &club.members,
                genesis.epoch,
            )?;
            ledger.emit(LedgerEvent::ClubCreated {
                club: club.id,
                name: club.name.clone(),
            });
            for account in club.officers.keys() {
                ledger.emit(LedgerEvent::OfficerGranted {
                    club: club.id,
                    account: *account,
                });
            }
            for account in &club.members {
                ledger.emit(LedgerEvent::MembershipRegistered {
                    account: *account,
                    club: club.id,
                    attested_by: None,
                });
            }
        }

        if genesis.treasury > 0 {
            ledger.rewards.genesis_treasury(genesis.treasury)?;
            ledger.emit(LedgerEvent::TreasurySeeded {
                amount: genesis.treasury,
            });
        }
        for (account, amount) in &genesis.allocations {
            if *amount == 0 {
                continue;
            }
            ledger.rewards.genesis_allocate(*account, *amount)?;
            ledger.emit(LedgerEvent::Minted {
                account: *account,
                amount: *amount,
                source: MintSource::Genesis,
            });
        }

        for s in &genesis.settlers {
            ledger
                .reservations
                .add_settler(s.resource.clone(), s.settler)?;
            ledger.emit(LedgerEvent::SettlerAuthorized {
                resource: s.resource.clone(),
                settler: s.settler,
            });
        }
        for account in &config.treasury.signers {
            ledger.emit(LedgerEvent::TreasurySignerAdded { account: *account });
        }

        ledger.verify_invariants()?;
        tracing::info!(
            epoch = %ledger.epoch,
            supply = %ledger.total_supply(),
            clubs = genesis.clubs.len(),
            digest = %ledger.state_digest_hex(),
            "Genesis ledger built"
        );
        Ok(ledger)
    }

    /// Parse a JSON config and build its genesis state.
    ///
    /// # Errors
    /// `Configuration` for malformed or invalid JSON, then as [`Self::genesis`].
    pub fn from_json_config(json: &str) -> Result<Self> {
        Self::genesis(&LedgerConfig::from_json_str(json)?)
    }
}
