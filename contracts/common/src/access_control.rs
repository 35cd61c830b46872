use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

// ── Storage Keys ─────────────────────────────────────────────────────────────

const ROLE_MEMBER_PREFIX: Symbol = symbol_short!("ROLE_MBR");
const ROLE_ADMIN_PREFIX: Symbol = symbol_short!("ROLE_ADM");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

// ── Role Enum ────────────────────────────────────────────────────────────────

/// Roles recognised by the staking ledger.
///
/// - `Admin`        – Administers every role (including itself) unless the
///                    role's admin has been reassigned.
/// - `RewardFunder` – May deposit tokens into the reward pool.
/// - `Pauser`       – May pause and unpause the mutating entry points.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Role {
    Admin = 0,
    RewardFunder = 1,
    Pauser = 2,
}

// ── Storage Helpers ──────────────────────────────────────────────────────────

fn member_key(role: Role, account: &Address) -> (Symbol, Role, Address) {
    (ROLE_MEMBER_PREFIX, role, account.clone())
}

fn role_admin_key(role: Role) -> (Symbol, Role) {
    (ROLE_ADMIN_PREFIX, role)
}

fn extend_ttl(env: &Env, key: &(Symbol, Role, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Queries ──────────────────────────────────────────────────────────────────

/// Returns `true` if `account` currently holds `role`.
pub fn has_role(env: &Env, role: Role, account: &Address) -> bool {
    let key = member_key(role, account);
    let held: bool = env.storage().persistent().get(&key).unwrap_or(false);
    if held {
        extend_ttl(env, &key);
    }
    held
}

/// Returns the role whose holders may grant and revoke `role`.
pub fn get_role_admin(env: &Env, role: Role) -> Role {
    env.storage()
        .instance()
        .get(&role_admin_key(role))
        .unwrap_or(Role::Admin)
}

// ── Unchecked mutations ──────────────────────────────────────────────────────

/// Adds `account` to `role` without any authorization check.
/// Only callable internally; callers must verify authorization beforehand.
///
/// Returns `true` if the membership changed.
pub fn set_role(env: &Env, role: Role, account: &Address) -> bool {
    if has_role(env, role, account) {
        return false;
    }
    let key = member_key(role, account);
    env.storage().persistent().set(&key, &true);
    extend_ttl(env, &key);
    true
}

/// Removes `account` from `role` without any authorization check.
///
/// Returns `true` if the membership changed.
pub fn clear_role(env: &Env, role: Role, account: &Address) -> bool {
    if !has_role(env, role, account) {
        return false;
    }
    env.storage().persistent().remove(&member_key(role, account));
    true
}

// ── Checked mutations ────────────────────────────────────────────────────────

/// Outcome of a checked role mutation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoleChange {
    /// The caller lacks the admin role of the target role. Nothing changed.
    Denied,
    /// Authorized, but the membership was already in the requested state.
    Unchanged,
    /// Authorized and applied.
    Applied,
}

/// Returns `true` if `caller` holds the admin role of `role`.
pub fn can_administer(env: &Env, caller: &Address, role: Role) -> bool {
    has_role(env, get_role_admin(env, role), caller)
}

/// Grants `role` to `account`.
///
/// The caller must hold the admin role of `role` and must already have been
/// authenticated via `require_auth()`.
pub fn grant_role(env: &Env, caller: &Address, role: Role, account: &Address) -> RoleChange {
    if !can_administer(env, caller, role) {
        return RoleChange::Denied;
    }
    if set_role(env, role, account) {
        RoleChange::Applied
    } else {
        RoleChange::Unchanged
    }
}

/// Revokes `role` from `account`.
///
/// The caller must hold the admin role of `role` and must already have been
/// authenticated via `require_auth()`.
pub fn revoke_role(env: &Env, caller: &Address, role: Role, account: &Address) -> RoleChange {
    if !can_administer(env, caller, role) {
        return RoleChange::Denied;
    }
    if clear_role(env, role, account) {
        RoleChange::Applied
    } else {
        RoleChange::Unchanged
    }
}

/// Reassigns the admin role of `role` to `admin_role`.
///
/// The caller must hold the *current* admin role of `role`.
/// Returns `false` if the caller is not authorized.
pub fn set_role_admin(env: &Env, caller: &Address, role: Role, admin_role: Role) -> bool {
    if !can_administer(env, caller, role) {
        return false;
    }
    env.storage().instance().set(&role_admin_key(role), &admin_role);
    true
}
