//! # Simulate Subcommand
//!
//! Runs a scripted scenario through a [`FundingService`] wired to an
//! in-process root registry and wallet set. Each step's outcome and the
//! events it emitted are printed as one JSON line; the command exits
//! non-zero if any step's outcome differs from its `expect` field.
//!
//! ## Scenario Format
//!
//! ```yaml
//! config:
//!   service_address: "0x00000000000000000000000000000000000000f0"
//!   registry_address: "0x00000000000000000000000000000000000000aa"
//!   owner: "0x0000000000000000000000000000000000000001"
//! allowlist:
//!   - name: ETH/USD
//!     feed_id: "0x..."
//!     recipient: "0x..."
//! wallets:
//!   - address: "0x..."
//!     balance: "0.05"
//!     refuse_always: true
//! steps:
//!   - action: deposit
//!     from: "0x..."
//!     amount: "1"
//!   - action: fund
//!     caller: "0x..."
//!     entry: 0
//!     expect: ok
//!   - action: withdraw
//!     caller: "0x..."
//!     destination: "0x..."
//!     amount: "0.5"
//!     expect: NotOwner
//! ```
//!
//! The registry starts at the allowlist tree's root. `rotate-root` swaps in
//! a new allowlist (or a raw root); later `fund` steps use the new tree.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use topup_core::{amount::as_units, Address, Amount, Bytes32, IdentityTuple, ValidationError};
use topup_crypto::StandardMerkleTree;
use topup_funder::{
    EventRecord, FunderConfig, FundingService, InMemoryWallets, Refusal, StaticRootRegistry,
    TopupError,
};

use crate::allowlist::AllowlistEntry;

/// Arguments for the `topup simulate` subcommand.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Scenario YAML file.
    #[arg(value_name = "SCENARIO")]
    pub scenario: PathBuf,

    /// Also write the full report as JSON to this file.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// A scripted run of the funding service.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Service construction parameters.
    pub config: FunderConfig,
    /// Initial allowlist; its root seeds the registry.
    pub allowlist: Vec<AllowlistEntry>,
    /// Wallets other than the treasury.
    #[serde(default)]
    pub wallets: Vec<WalletSpec>,
    /// Steps, run in order.
    pub steps: Vec<Step>,
}

/// Initial state of one wallet.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WalletSpec {
    /// Wallet address.
    pub address: Address,
    /// Starting balance in whole units.
    #[serde(with = "as_units", default)]
    pub balance: Amount,
    /// Refuse every delivery.
    #[serde(default)]
    pub refuse_always: bool,
    /// Refuse deliveries made on behalf of these callers.
    #[serde(default)]
    pub refuse_from: Vec<Address>,
}

/// One scenario step.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// What to do.
    #[serde(flatten)]
    pub action: Action,
    /// `ok`, or the error code the step must fail with.
    #[serde(default)]
    pub expect: Option<String>,
}

/// A service operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    /// Send value to the treasury.
    Deposit {
        /// Sender.
        from: Address,
        /// Amount in whole units.
        #[serde(with = "as_units")]
        amount: Amount,
    },

    /// Call `fund`.
    Fund {
        /// Keeper submitting the call.
        caller: Address,
        /// Index into the current allowlist; selects the tuple and proof.
        entry: usize,
        /// Tuple override. A tuple in the tree gets its own proof; any
        /// other tuple gets the proof at `entry`, or an empty proof when
        /// `entry` is out of range.
        #[serde(default)]
        identity: Option<AllowlistEntry>,
        /// Root override; defaults to the current tree root.
        #[serde(default)]
        root: Option<Bytes32>,
        /// Proof override; replaces the proof chosen from the tree.
        #[serde(default)]
        proof: Option<Vec<Bytes32>>,
    },

    /// Call `withdraw`.
    Withdraw {
        /// Caller.
        caller: Address,
        /// Destination wallet.
        destination: Address,
        /// Amount in whole units.
        #[serde(with = "as_units")]
        amount: Amount,
    },

    /// Call `transfer_ownership`.
    TransferOwnership {
        /// Caller.
        caller: Address,
        /// Proposed owner.
        new_owner: Address,
    },

    /// Publish a new root at the registry.
    RotateRoot {
        /// New allowlist; the tree is rebuilt and its root published.
        #[serde(default)]
        allowlist: Option<Vec<AllowlistEntry>>,
        /// Raw root to publish; the local tree is kept.
        #[serde(default)]
        root: Option<Bytes32>,
    },
}

impl Action {
    /// The action's scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deposit { .. } => "deposit",
            Self::Fund { .. } => "fund",
            Self::Withdraw { .. } => "withdraw",
            Self::TransferOwnership { .. } => "transfer-ownership",
            Self::RotateRoot { .. } => "rotate-root",
        }
    }
}

/// What a successful step produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StepOutput {
    /// Treasury credited.
    Deposited {
        /// Treasury balance afterwards.
        balance: Amount,
    },
    /// Recipient topped up.
    Funded {
        /// Amount transferred.
        amount: Amount,
    },
    /// Treasury withdrawn.
    Withdrawn,
    /// Owner changed.
    OwnershipTransferred,
    /// Registry root replaced.
    RootRotated {
        /// The new root.
        root: Bytes32,
    },
}

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The operation succeeded.
    Ok {
        /// What it produced.
        output: StepOutput,
    },
    /// The operation failed.
    Error {
        /// Stable error code.
        code: String,
        /// Human-readable message.
        message: String,
    },
}

impl Outcome {
    fn matches(&self, expect: &str) -> bool {
        match self {
            Self::Ok { .. } => expect.eq_ignore_ascii_case("ok"),
            Self::Error { code, .. } => code == expect,
        }
    }
}

/// Report for one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// Zero-based step number.
    pub step: usize,
    /// Action name.
    pub action: &'static str,
    /// What happened.
    pub outcome: Outcome,
    /// The expectation, if any.
    pub expect: Option<String>,
    /// Whether the outcome met the expectation.
    pub matched: bool,
    /// Events the step emitted.
    pub events: Vec<EventRecord>,
}

/// Report for a whole scenario.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Per-step reports.
    pub steps: Vec<StepReport>,
    /// Treasury balance at the end.
    pub treasury_balance: Amount,
    /// Owner at the end.
    pub owner: Address,
    /// Whether every step matched.
    pub passed: bool,
}

/// A funding service wired to in-process collaborators.
pub struct Simulation {
    registry: Arc<StaticRootRegistry>,
    service: FundingService<Arc<StaticRootRegistry>>,
    wallets: InMemoryWallets,
    tree: StandardMerkleTree,
}

fn identities(entries: &[AllowlistEntry]) -> Result<Vec<IdentityTuple>, ValidationError> {
    entries.iter().map(AllowlistEntry::to_identity).collect()
}

impl Simulation {
    /// Build the service, registry and wallets a scenario describes.
    pub fn new(scenario: &Scenario) -> Result<Self, TopupError> {
        scenario.config.validate()?;
        let tree = StandardMerkleTree::of(identities(&scenario.allowlist)?)?;
        let registry = Arc::new(StaticRootRegistry::new(
            scenario.config.registry_address,
            tree.root(),
        ));
        let mut service = FundingService::from_config(Arc::clone(&registry), &scenario.config)?;
        service.drain_events();

        let mut wallets = InMemoryWallets::new();
        for spec in &scenario.wallets {
            wallets.set_balance(spec.address, spec.balance);
            if spec.refuse_always {
                wallets.refuse(spec.address, Refusal::Always);
            }
            for origin in &spec.refuse_from {
                wallets.refuse(spec.address, Refusal::FromOrigin(*origin));
            }
        }

        Ok(Self {
            registry,
            service,
            wallets,
            tree,
        })
    }

    /// The service under simulation.
    pub fn service(&self) -> &FundingService<Arc<StaticRootRegistry>> {
        &self.service
    }

    /// The wallet environment.
    pub fn wallets(&self) -> &InMemoryWallets {
        &self.wallets
    }

    /// Apply one action.
    pub fn apply(&mut self, action: &Action) -> Result<StepOutput, TopupError> {
        match action {
            Action::Deposit { from, amount } => {
                let balance = self.service.receive(*from, *amount)?;
                Ok(StepOutput::Deposited { balance })
            }
            Action::Fund {
                caller,
                entry,
                identity,
                root,
                proof,
            } => {
                let identity = match identity {
                    Some(explicit) => explicit.to_identity()?,
                    None => *self.tree.value(*entry)?,
                };
                let root = root.unwrap_or_else(|| self.tree.root());
                let proof = match proof {
                    Some(p) => p.clone(),
                    None => match self.tree.position(&identity) {
                        Some(index) => self.tree.proof(index)?,
                        None if *entry < self.tree.len() => self.tree.proof(*entry)?,
                        None => Vec::new(),
                    },
                };
                let amount =
                    self.service
                        .fund(&mut self.wallets, *caller, &identity, &root, &proof)?;
                Ok(StepOutput::Funded { amount })
            }
            Action::Withdraw {
                caller,
                destination,
                amount,
            } => {
                self.service
                    .withdraw(&mut self.wallets, *caller, *destination, *amount)?;
                Ok(StepOutput::Withdrawn)
            }
            Action::TransferOwnership { caller, new_owner } => {
                self.service.transfer_ownership(*caller, *new_owner)?;
                Ok(StepOutput::OwnershipTransferred)
            }
            Action::RotateRoot { allowlist, root } => {
                if let Some(entries) = allowlist {
                    self.tree = StandardMerkleTree::of(identities(entries)?)?;
                }
                let root = root.unwrap_or_else(|| self.tree.root());
                self.registry.set_root(root);
                Ok(StepOutput::RootRotated { root })
            }
        }
    }
}

/// Run every step of `scenario`.
///
/// Setup failures are returned as errors; step failures are recorded in
/// the report.
pub fn simulate(scenario: &Scenario) -> Result<SimulationReport, TopupError> {
    let mut sim = Simulation::new(scenario)?;
    let mut steps = Vec::with_capacity(scenario.steps.len());

    for (index, step) in scenario.steps.iter().enumerate() {
        let outcome = match sim.apply(&step.action) {
            Ok(output) => Outcome::Ok { output },
            Err(e) => Outcome::Error {
                code: e.code().to_string(),
                message: e.to_string(),
            },
        };
        let matched = step
            .expect
            .as_deref()
            .map_or(true, |expect| outcome.matches(expect));
        if !matched {
            tracing::warn!(
                step = index,
                action = step.action.name(),
                expect = step.expect.as_deref().unwrap_or_default(),
                "step outcome did not match expectation"
            );
        }
        steps.push(StepReport {
            step: index,
            action: step.action.name(),
            outcome,
            expect: step.expect.clone(),
            matched,
            events: sim.service.drain_events(),
        });
    }

    let passed = steps.iter().all(|s| s.matched);
    Ok(SimulationReport {
        steps,
        treasury_balance: sim.service.balance(),
        owner: sim.service.owner(),
        passed,
    })
}

/// Parse a scenario document.
pub fn parse_scenario(yaml: &str) -> Result<Scenario> {
    serde_yaml::from_str(yaml).context("invalid scenario document")
}

/// Execute the simulate subcommand.
pub fn run_simulate(args: &SimulateArgs) -> Result<u8> {
    let scenario = parse_scenario(&crate::read_file(&args.scenario)?)?;
    let report = simulate(&scenario)
        .with_context(|| format!("cannot set up scenario {}", args.scenario.display()))?;

    for step in &report.steps {
        println!(
            "{}",
            serde_json::to_string(step).context("failed to serialize step report")?
        );
    }
    if let Some(path) = &args.output {
        crate::write_json(&report, Some(path))?;
    }

    let failed = report.steps.iter().filter(|s| !s.matched).count();
    if report.passed {
        println!("OK: {} steps, treasury {}", report.steps.len(), report.treasury_balance);
        Ok(0)
    } else {
        println!("FAIL: {failed} of {} steps did not match", report.steps.len());
        Ok(1)
    }
}
