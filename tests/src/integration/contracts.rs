//! Test contract sandbox and chain harness.
//!
//! [`ContractRouter`] is a small [`ActionDispatcher`] implementing the three
//! contracts the integration scenarios need:
//!
//! - **asserter** (`procassert`): fails the transaction when its condition
//!   payload is false.
//! - **currency** (`issue`, `transfer`): a token ledger keeping one balance
//!   row per account under the currency scope.
//! - **proxy** (`setproxy`, on any scope): marks the receiving account as a
//!   forwarding proxy. A currency transfer into a proxy account schedules a
//!   deferred onward transfer to the configured owner; a proxy without an
//!   owner fails the incoming transfer.
//!
//! [`TestChain`] wraps a [`LedgerController`] over this sandbox with fixture
//! helpers for accounts, signing keys, and balances.

use serde::{Deserialize, Serialize};
use shared_types::{AccountName, Action, Asset, KeyId, PermissionLevel, Transaction};
use std::time::Duration;
use tl_authority::Authority;
use tl_controller::adapters::memory_store::MemoryStateStore;
use tl_controller::domain::receipts::TransactionReceipt;
use tl_controller::{ActionContext, ActionDispatcher, AssertionError, LedgerController, Result};
use tl_controller::ChainConfig;

/// The account hosting the token contract.
pub const CURRENCY: &str = "currency";

/// The account hosting the assertion contract.
pub const ASSERTER: &str = "asserter";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertPayload {
    pub condition: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuePayload {
    pub to: AccountName,
    pub quantity: Asset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferPayload {
    pub from: AccountName,
    pub to: AccountName,
    pub quantity: Asset,
}

/// Per-account forwarding configuration, stored under the proxy's own scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Forwarding target. `None` marks a proxy that is deployed but not yet
    /// configured; incoming transfers fail until an owner is set.
    pub owner: Option<AccountName>,
    /// Forwarding delay in milliseconds.
    pub delay_ms: u64,
}

fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> std::result::Result<T, AssertionError> {
    bincode::deserialize(bytes).map_err(|_| AssertionError::new("malformed action payload"))
}

fn encode<T: Serialize>(value: &T) -> Vec<u8> {
    bincode::serialize(value).unwrap_or_default()
}

fn balance_key(account: &AccountName) -> Vec<u8> {
    format!("balance:{account}").into_bytes()
}

fn read_balance(ctx: &ActionContext<'_>, account: &AccountName, symbol: &str) -> Asset {
    ctx.get(&AccountName::new(CURRENCY), &balance_key(account))
        .and_then(|raw| bincode::deserialize(&raw).ok())
        .unwrap_or_else(|| Asset::new(0, symbol))
}

fn write_balance(ctx: &mut ActionContext<'_>, account: &AccountName, balance: &Asset) {
    ctx.set(
        &AccountName::new(CURRENCY),
        &balance_key(account),
        encode(balance),
    );
}

/// Dispatcher routing actions to the test contracts by scope and name.
pub struct ContractRouter;

impl ContractRouter {
    fn procassert(
        &self,
        action: &Action,
    ) -> std::result::Result<(), AssertionError> {
        let payload: AssertPayload = decode(&action.data)?;
        if payload.condition {
            Ok(())
        } else {
            Err(AssertionError::new(payload.message))
        }
    }

    fn issue(
        &self,
        action: &Action,
        ctx: &mut ActionContext<'_>,
    ) -> std::result::Result<(), AssertionError> {
        let payload: IssuePayload = decode(&action.data)?;
        let balance = read_balance(ctx, &payload.to, &payload.quantity.symbol);
        let new_balance = balance
            .checked_add(&payload.quantity)
            .ok_or_else(|| AssertionError::new("integer overflow adding token balance"))?;
        write_balance(ctx, &payload.to, &new_balance);
        Ok(())
    }

    fn transfer(
        &self,
        action: &Action,
        ctx: &mut ActionContext<'_>,
    ) -> std::result::Result<(), AssertionError> {
        let payload: TransferPayload = decode(&action.data)?;
        let symbol = payload.quantity.symbol.clone();

        let from_balance = read_balance(ctx, &payload.from, &symbol);
        let new_from = from_balance
            .checked_sub(&payload.quantity)
            .filter(|balance| balance.amount >= 0)
            .ok_or_else(|| {
                AssertionError::new("integer underflow subtracting token balance")
            })?;
        write_balance(ctx, &payload.from, &new_from);

        let to_balance = read_balance(ctx, &payload.to, &symbol);
        let new_to = to_balance
            .checked_add(&payload.quantity)
            .ok_or_else(|| AssertionError::new("integer overflow adding token balance"))?;
        write_balance(ctx, &payload.to, &new_to);

        // Recipient-side proxy forwarding. The forwarded transfer is
        // contract-generated: it carries no declared authorization and runs
        // on the authority of the transaction that scheduled it.
        if let Some(raw) = ctx.get(&payload.to, b"proxy") {
            let config: ProxyConfig = decode(&raw)?;
            match config.owner {
                None => return Err(AssertionError::new("owner not configured")),
                Some(owner) => {
                    let forward = TransferPayload {
                        from: payload.to.clone(),
                        to: owner,
                        quantity: payload.quantity.clone(),
                    };
                    let onward = Transaction::new(vec![Action::new(
                        CURRENCY,
                        "transfer",
                        vec![],
                        encode(&forward),
                    )]);
                    ctx.send_deferred(onward, Duration::from_millis(config.delay_ms));
                }
            }
        }
        Ok(())
    }

    fn setproxy(
        &self,
        action: &Action,
        ctx: &mut ActionContext<'_>,
    ) -> std::result::Result<(), AssertionError> {
        let config: ProxyConfig = decode(&action.data)?;
        let receiver = ctx.receiver().clone();
        ctx.set(&receiver, b"proxy", encode(&config));
        Ok(())
    }
}

impl ActionDispatcher for ContractRouter {
    fn dispatch(
        &self,
        action: &Action,
        ctx: &mut ActionContext<'_>,
    ) -> std::result::Result<(), AssertionError> {
        match (action.scope.as_str(), action.name.as_str()) {
            (ASSERTER, "procassert") => self.procassert(action),
            (CURRENCY, "issue") => self.issue(action, ctx),
            (CURRENCY, "transfer") => self.transfer(action, ctx),
            (_, "setproxy") => self.setproxy(action, ctx),
            (scope, name) => Err(AssertionError::new(format!(
                "no handler for {scope}::{name}"
            ))),
        }
    }
}

/// Integration harness: a controller over the test contracts plus fixture
/// helpers.
pub struct TestChain {
    pub chain: LedgerController<ContractRouter, MemoryStateStore>,
}

impl TestChain {
    /// Boots a chain with the contract accounts plus `accounts`, each keyed
    /// by deterministic seeds `{name}@owner` / `{name}@active`.
    pub fn new(accounts: &[&str]) -> Self {
        Self::with_config(ChainConfig::default(), accounts)
    }

    pub fn with_config(config: ChainConfig, accounts: &[&str]) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
        let mut chain = LedgerController::new(config, ContractRouter, MemoryStateStore::new());
        for name in [CURRENCY, ASSERTER].iter().chain(accounts) {
            chain
                .create_account(
                    *name,
                    Authority::key(KeyId::from_seed(&format!("{name}@owner"))),
                    Authority::key(KeyId::from_seed(&format!("{name}@active"))),
                )
                .unwrap();
        }
        Self { chain }
    }

    pub fn active_key(name: &str) -> KeyId {
        KeyId::from_seed(&format!("{name}@active"))
    }

    pub fn owner_key(name: &str) -> KeyId {
        KeyId::from_seed(&format!("{name}@owner"))
    }

    pub fn asset(text: &str) -> Asset {
        Asset::from_string(text).unwrap()
    }

    pub fn produce_blocks(&mut self, count: u32) {
        for _ in 0..count {
            self.chain.produce_block();
        }
    }

    /// An `issue` transaction authorized by the currency contract account.
    pub fn issue_tx(to: &str, quantity: &str) -> Transaction {
        Transaction::new(vec![Action::new(
            CURRENCY,
            "issue",
            vec![PermissionLevel::new(CURRENCY, "active")],
            encode(&IssuePayload {
                to: to.into(),
                quantity: Self::asset(quantity),
            }),
        )])
        .signed_by(vec![Self::active_key(CURRENCY)])
    }

    /// A `transfer` transaction authorized and signed by `from`.
    pub fn transfer_tx(from: &str, to: &str, quantity: &str) -> Transaction {
        Transaction::new(vec![Action::new(
            CURRENCY,
            "transfer",
            vec![PermissionLevel::new(from, "active")],
            encode(&TransferPayload {
                from: from.into(),
                to: to.into(),
                quantity: Self::asset(quantity),
            }),
        )])
        .signed_by(vec![Self::active_key(from)])
    }

    /// The onward transfer a proxy schedules for an incoming deposit, byte
    /// for byte as the currency contract generates it (no declared
    /// authorization, no signers). Reconstructing it yields the deferred
    /// entry's id.
    pub fn forwarded_transfer_tx(from: &str, to: &str, quantity: &str) -> Transaction {
        Transaction::new(vec![Action::new(
            CURRENCY,
            "transfer",
            vec![],
            encode(&TransferPayload {
                from: from.into(),
                to: to.into(),
                quantity: Self::asset(quantity),
            }),
        )])
    }

    /// A `setproxy` transaction authorized and signed by the proxy account.
    pub fn setproxy_tx(account: &str, owner: Option<&str>, delay: Duration) -> Transaction {
        Transaction::new(vec![Action::new(
            account,
            "setproxy",
            vec![PermissionLevel::new(account, "active")],
            encode(&ProxyConfig {
                owner: owner.map(AccountName::from),
                delay_ms: delay.as_millis() as u64,
            }),
        )])
        .signed_by(vec![Self::active_key(account)])
    }

    /// A `procassert` transaction authorized by the asserter account.
    pub fn assert_tx(condition: bool, message: &str) -> Transaction {
        Transaction::new(vec![Action::new(
            ASSERTER,
            "procassert",
            vec![PermissionLevel::new(ASSERTER, "active")],
            encode(&AssertPayload {
                condition,
                message: message.into(),
            }),
        )])
        .signed_by(vec![Self::active_key(ASSERTER)])
    }

    pub fn push(&mut self, transaction: &Transaction) -> Result<TransactionReceipt> {
        self.chain.push_transaction(transaction)
    }

    /// Committed token balance, zero if the account has no row.
    pub fn balance(&self, account: &str) -> Asset {
        self.chain
            .state_value(&AccountName::new(CURRENCY), &balance_key(&account.into()))
            .and_then(|raw| bincode::deserialize(&raw).ok())
            .unwrap_or_else(|| Asset::new(0, "EOS"))
    }
}
