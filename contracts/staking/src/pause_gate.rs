use common::access_control::{self, Role};
use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::{events, ContractError};

// ── Storage Keys ─────────────────────────────────────────────

const PAUSED: Symbol = symbol_short!("PAUSED");

// ── Gate ─────────────────────────────────────────────────────

pub fn is_paused(env: &Env) -> bool {
    env.storage().instance().get(&PAUSED).unwrap_or(false)
}

/// Fails fast with `ContractPaused` while the gate is closed.
/// Called before any ledger state is read.
pub fn require_not_paused(env: &Env) -> Result<(), ContractError> {
    if is_paused(env) {
        return Err(ContractError::ContractPaused);
    }
    Ok(())
}

fn require_pauser(env: &Env, caller: &Address) -> Result<(), ContractError> {
    if !access_control::has_role(env, Role::Pauser, caller) {
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}

/// Closes the gate. Requires the `Pauser` role.
pub fn pause(env: &Env, caller: &Address) -> Result<(), ContractError> {
    require_pauser(env, caller)?;
    if is_paused(env) {
        return Err(ContractError::AlreadyPaused);
    }

    env.storage().instance().set(&PAUSED, &true);

    events::publish_paused(env, caller.clone());

    Ok(())
}

/// Re-opens the gate. Requires the `Pauser` role.
pub fn unpause(env: &Env, caller: &Address) -> Result<(), ContractError> {
    require_pauser(env, caller)?;
    if !is_paused(env) {
        return Err(ContractError::NotPaused);
    }

    env.storage().instance().set(&PAUSED, &false);

    events::publish_unpaused(env, caller.clone());

    Ok(())
}
