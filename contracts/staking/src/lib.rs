#![no_std]

pub mod accrual;
pub mod events;
pub mod guard;
pub mod pause_gate;

use common::access_control::{self, RoleChange};
use soroban_sdk::{contract, contractimpl, contracttype, symbol_short, Address, Env, Symbol};

use guard::ReentrancyLock;

pub use accrual::{DEFAULT_ANNUAL_RATE_BPS, MAX_ANNUAL_RATE_BPS, SECONDS_PER_YEAR};
pub use common::access_control::Role;

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const TOKEN: Symbol = symbol_short!("TOKEN");
const ANNUAL_RATE: Symbol = symbol_short!("RATE_BPS");
const TOTAL_STAKED: Symbol = symbol_short!("TOT_STK");
const REWARD_POOL: Symbol = symbol_short!("RWD_POOL");

// Per-user persistent storage uses tuple keys:  (prefix, user_address)
const USER_STAKE: Symbol = symbol_short!("STK");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidAmount = 4,
    InsufficientStake = 5,
    InsufficientRewardPool = 6,
    TransferFailed = 7,
    ContractPaused = 8,
    ReentrantCall = 9,
    AlreadyPaused = 10,
    NotPaused = 11,
    TimeRegression = 12,
    ArithmeticOverflow = 13,
    InvalidRate = 14,
}

// ── Public-facing types (re-exported for test consumers) ─────────────────────

/// Per-account staking position.
///
/// Created on the first stake and never deleted; `amount` may fall back to
/// zero while `unclaimed_rewards` is still claimable.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StakeRecord {
    /// Staked principal in token base units.
    pub amount: i128,
    /// Ledger timestamp of the last settlement.
    pub last_update: u64,
    /// Settled rewards not yet paid out.
    pub unclaimed_rewards: i128,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakingContract;

#[contractimpl]
impl StakingContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the contract.
    ///
    /// * `admin`           – receives the `Admin` and `Pauser` roles.
    /// * `token`           – SAC address of the token that is both staked and
    ///                       paid out as rewards.
    /// * `annual_rate_bps` – fixed reward rate in basis points of principal
    ///                       per 365-day year (`1_000` = 10%).
    pub fn initialize(
        env: Env,
        admin: Address,
        token: Address,
        annual_rate_bps: u32,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        admin.require_auth();

        if annual_rate_bps > MAX_ANNUAL_RATE_BPS {
            return Err(ContractError::InvalidRate);
        }

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&TOKEN, &token);
        env.storage().instance().set(&ANNUAL_RATE, &annual_rate_bps);
        // TOTAL_STAKED and REWARD_POOL start at zero;
        // unwrap_or(0) handles absent keys, so no explicit init needed.

        access_control::set_role(&env, Role::Admin, &admin);
        access_control::set_role(&env, Role::Pauser, &admin);
        Self::extend_instance_ttl(&env);

        events::publish_initialized(&env, admin, token, annual_rate_bps);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` tokens from `staker`.
    ///
    /// The record is settled first so rewards on the new deposit only accrue
    /// from now on. Returns the staker's new staked amount.
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<i128, ContractError> {
        pause_gate::require_not_paused(&env)?;
        Self::require_initialized(&env)?;
        let _lock = ReentrancyLock::acquire(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        // 1. Settle against the principal staked so far.
        let previous = Self::load_stake(&env, &staker);
        let mut record = previous.clone().unwrap_or(StakeRecord {
            amount: 0,
            last_update: env.ledger().timestamp(),
            unclaimed_rewards: 0,
        });
        accrual::settle(&mut record, Self::rate(&env), env.ledger().timestamp())?;

        // 2. Apply the deposit.
        record.amount = record
            .amount
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        let prev_total = Self::get_total_staked(env.clone());
        let new_total = prev_total
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;

        Self::save_stake(&env, &staker, &record);
        env.storage().instance().set(&TOTAL_STAKED, &new_total);

        // 3. Pull the tokens; undo the effects if the token refuses.
        let token = Self::token_address(&env)?;
        let custody = env.current_contract_address();
        if let Err(e) = Self::transfer(&env, &token, &staker, &custody, amount) {
            Self::restore_stake(&env, &staker, previous);
            env.storage().instance().set(&TOTAL_STAKED, &prev_total);
            return Err(e);
        }

        Self::extend_instance_ttl(&env);
        events::publish_staked(&env, staker, amount, record.amount, new_total);

        Ok(record.amount)
    }

    /// Return `amount` staked tokens to `staker`.
    ///
    /// Accrued rewards stay in the record and remain claimable even when the
    /// stake drops to zero. Returns the staker's remaining staked amount.
    pub fn withdraw(env: Env, staker: Address, amount: i128) -> Result<i128, ContractError> {
        pause_gate::require_not_paused(&env)?;
        Self::require_initialized(&env)?;
        let _lock = ReentrancyLock::acquire(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let previous = Self::load_stake(&env, &staker);
        let mut record = previous.clone().ok_or(ContractError::InsufficientStake)?;
        if amount > record.amount {
            return Err(ContractError::InsufficientStake);
        }

        // 1. Settle before reducing the principal.
        accrual::settle(&mut record, Self::rate(&env), env.ledger().timestamp())?;

        // 2. Reduce the record and the global total (checks-effects-interactions).
        record.amount -= amount;
        let prev_total = Self::get_total_staked(env.clone());
        let new_total = prev_total.saturating_sub(amount);

        Self::save_stake(&env, &staker, &record);
        env.storage().instance().set(&TOTAL_STAKED, &new_total);

        // 3. Send the tokens back; roll the decrement back on failure.
        let token = Self::token_address(&env)?;
        let custody = env.current_contract_address();
        if let Err(e) = Self::transfer(&env, &token, &custody, &staker, amount) {
            Self::restore_stake(&env, &staker, previous);
            env.storage().instance().set(&TOTAL_STAKED, &prev_total);
            return Err(e);
        }

        Self::extend_instance_ttl(&env);
        events::publish_withdrawn(&env, staker, amount, record.amount, new_total);

        Ok(record.amount)
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Deposit `amount` tokens into the reward pool.
    ///
    /// Requires the `RewardFunder` role. Returns the new pool balance.
    pub fn fund_rewards(env: Env, funder: Address, amount: i128) -> Result<i128, ContractError> {
        pause_gate::require_not_paused(&env)?;
        Self::require_initialized(&env)?;
        let _lock = ReentrancyLock::acquire(&env)?;
        funder.require_auth();

        if !access_control::has_role(&env, Role::RewardFunder, &funder) {
            return Err(ContractError::Unauthorized);
        }
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let prev_pool = Self::reward_pool(env.clone());
        let new_pool = prev_pool
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        env.storage().instance().set(&REWARD_POOL, &new_pool);

        let token = Self::token_address(&env)?;
        let custody = env.current_contract_address();
        if let Err(e) = Self::transfer(&env, &token, &funder, &custody, amount) {
            env.storage().instance().set(&REWARD_POOL, &prev_pool);
            return Err(e);
        }

        Self::extend_instance_ttl(&env);
        events::publish_rewards_funded(&env, funder, amount, new_pool);

        Ok(new_pool)
    }

    /// Pay out everything `staker` has accrued.
    ///
    /// Returns the amount paid. With nothing accrued this is a no-op that
    /// returns `0`. The pool must cover the full amount; partial payouts are
    /// never made.
    pub fn claim_rewards(env: Env, staker: Address) -> Result<i128, ContractError> {
        pause_gate::require_not_paused(&env)?;
        Self::require_initialized(&env)?;
        let _lock = ReentrancyLock::acquire(&env)?;
        staker.require_auth();

        let previous = match Self::load_stake(&env, &staker) {
            Some(record) => record,
            None => return Ok(0),
        };

        // 1. Settle.
        let mut record = previous.clone();
        accrual::settle(&mut record, Self::rate(&env), env.ledger().timestamp())?;

        let payout = record.unclaimed_rewards;
        if payout <= 0 {
            // Nothing to claim; return without reverting.
            return Ok(0);
        }

        // 2. The pool must cover the whole payout.
        let prev_pool = Self::reward_pool(env.clone());
        if prev_pool < payout {
            return Err(ContractError::InsufficientRewardPool);
        }

        // 3. Zero the record and debit the pool before paying out.
        record.unclaimed_rewards = 0;
        let new_pool = prev_pool - payout;
        Self::save_stake(&env, &staker, &record);
        env.storage().instance().set(&REWARD_POOL, &new_pool);

        let token = Self::token_address(&env)?;
        let custody = env.current_contract_address();
        if let Err(e) = Self::transfer(&env, &token, &custody, &staker, payout) {
            Self::save_stake(&env, &staker, &previous);
            env.storage().instance().set(&REWARD_POOL, &prev_pool);
            return Err(e);
        }

        Self::extend_instance_ttl(&env);
        events::publish_reward_claimed(&env, staker, payout, new_pool);

        Ok(payout)
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Return the stored record for `account` (all zero if it never staked).
    pub fn stakes(env: Env, account: Address) -> StakeRecord {
        Self::load_stake(&env, &account).unwrap_or_default()
    }

    /// Return the settled but unpaid rewards stored for `account`.
    pub fn rewards(env: Env, account: Address) -> i128 {
        Self::load_stake(&env, &account)
            .map(|r| r.unclaimed_rewards)
            .unwrap_or(0)
    }

    /// Return real-time pending rewards for `account` without mutating state.
    pub fn get_pending_rewards(env: Env, account: Address) -> i128 {
        match Self::load_stake(&env, &account) {
            Some(record) => {
                accrual::pending(&record, Self::rate(&env), env.ledger().timestamp())
            }
            None => 0,
        }
    }

    /// Return the sum of all currently staked tokens.
    pub fn get_total_staked(env: Env) -> i128 {
        env.storage().instance().get(&TOTAL_STAKED).unwrap_or(0)
    }

    /// Return the funded rewards not yet paid out.
    pub fn reward_pool(env: Env) -> i128 {
        env.storage().instance().get(&REWARD_POOL).unwrap_or(0)
    }

    /// Return the fixed annual reward rate in basis points.
    pub fn annual_rate_bps(env: Env) -> u32 {
        Self::rate(&env)
    }

    pub fn token(env: Env) -> Result<Address, ContractError> {
        Self::token_address(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    // ── Pause gate ───────────────────────────────────────────────────────────

    /// Block `stake`, `withdraw`, `fund_rewards` and `claim_rewards`.
    /// Requires the `Pauser` role.
    pub fn pause(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        pause_gate::pause(&env, &caller)?;
        Self::extend_instance_ttl(&env);
        Ok(())
    }

    /// Lift a previous `pause`. Requires the `Pauser` role.
    pub fn unpause(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        pause_gate::unpause(&env, &caller)?;
        Self::extend_instance_ttl(&env);
        Ok(())
    }

    pub fn paused(env: Env) -> bool {
        pause_gate::is_paused(&env)
    }

    // ── Role management ──────────────────────────────────────────────────────

    pub fn has_role(env: Env, role: Role, account: Address) -> bool {
        access_control::has_role(&env, role, &account)
    }

    pub fn get_role_admin(env: Env, role: Role) -> Role {
        access_control::get_role_admin(&env, role)
    }

    /// Grant `role` to `account`. The caller must hold the role's admin role.
    pub fn grant_role(
        env: Env,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        match access_control::grant_role(&env, &caller, role, &account) {
            RoleChange::Denied => Err(ContractError::Unauthorized),
            RoleChange::Unchanged => {
                Self::extend_instance_ttl(&env);
                Ok(())
            }
            RoleChange::Applied => {
                Self::extend_instance_ttl(&env);
                events::publish_role_granted(&env, role, account, caller);
                Ok(())
            }
        }
    }

    /// Revoke `role` from `account`. The caller must hold the role's admin role.
    pub fn revoke_role(
        env: Env,
        caller: Address,
        role: Role,
        account: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        match access_control::revoke_role(&env, &caller, role, &account) {
            RoleChange::Denied => Err(ContractError::Unauthorized),
            RoleChange::Unchanged => {
                Self::extend_instance_ttl(&env);
                Ok(())
            }
            RoleChange::Applied => {
                Self::extend_instance_ttl(&env);
                events::publish_role_revoked(&env, role, account, caller);
                Ok(())
            }
        }
    }

    /// Drop one of the caller's own roles. Always permitted.
    pub fn renounce_role(env: Env, caller: Address, role: Role) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if access_control::clear_role(&env, role, &caller) {
            events::publish_role_revoked(&env, role, caller.clone(), caller);
        }
        Self::extend_instance_ttl(&env);
        Ok(())
    }

    /// Hand administration of `role` to holders of `admin_role`.
    /// The caller must hold the current admin role of `role`.
    pub fn set_role_admin(
        env: Env,
        caller: Address,
        role: Role,
        admin_role: Role,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        let previous = access_control::get_role_admin(&env, role);
        if !access_control::set_role_admin(&env, &caller, role, admin_role) {
            return Err(ContractError::Unauthorized);
        }
        Self::extend_instance_ttl(&env);
        events::publish_role_admin_changed(&env, role, previous, admin_role);
        Ok(())
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Guard: revert if the contract is not yet initialized.
    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    fn token_address(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&TOKEN)
            .ok_or(ContractError::NotInitialized)
    }

    fn rate(env: &Env) -> u32 {
        env.storage().instance().get(&ANNUAL_RATE).unwrap_or(0)
    }

    fn load_stake(env: &Env, account: &Address) -> Option<StakeRecord> {
        let key = (USER_STAKE, account.clone());
        let record: Option<StakeRecord> = env.storage().persistent().get(&key);
        if record.is_some() {
            env.storage()
                .persistent()
                .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        }
        record
    }

    fn save_stake(env: &Env, account: &Address, record: &StakeRecord) {
        let key = (USER_STAKE, account.clone());
        env.storage().persistent().set(&key, record);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }

    /// Put a record back to its state before the current call, removing it
    /// if the call was the account's first stake.
    fn restore_stake(env: &Env, account: &Address, previous: Option<StakeRecord>) {
        match previous {
            Some(record) => Self::save_stake(env, account, &record),
            None => env.storage().persistent().remove(&(USER_STAKE, account.clone())),
        }
    }

    /// Move tokens through the token contract, mapping any failure inside it
    /// (error, panic or refused auth) to `TransferFailed`.
    fn transfer(
        env: &Env,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        match soroban_sdk::token::Client::new(env, token).try_transfer(from, to, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => Err(ContractError::TransferFailed),
        }
    }

    fn extend_instance_ttl(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────





#[cfg(test)]
mod test_roles;
