use soroban_sdk::{symbol_short, Env, Symbol};

use crate::ContractError;

pub(crate) const LOCKED: Symbol = symbol_short!("LOCKED");

/// Single-flight lock shared by every mutating entry point.
///
/// Acquired with [`ReentrancyLock::acquire`] and released when the value is
/// dropped, so early returns through `?` release it as well.
pub struct ReentrancyLock<'a> {
    env: &'a Env,
}

impl<'a> ReentrancyLock<'a> {
    /// Take the lock, or fail with `ReentrantCall` if a call is already in
    /// flight. Nothing is written when the lock is refused.
    pub fn acquire(env: &'a Env) -> Result<Self, ContractError> {
        if is_locked(env) {
            return Err(ContractError::ReentrantCall);
        }
        env.storage().instance().set(&LOCKED, &true);
        Ok(Self { env })
    }
}

impl Drop for ReentrancyLock<'_> {
    fn drop(&mut self) {
        self.env.storage().instance().remove(&LOCKED);
    }
}

pub fn is_locked(env: &Env) -> bool {
    env.storage().instance().get(&LOCKED).unwrap_or(false)
}
