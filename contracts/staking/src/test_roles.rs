extern crate std;

use common::access_control::Role;
use soroban_sdk::{testutils::Address as _, token::StellarAssetClient, Address, Env};

use crate::{ContractError, StakingContract, StakingContractClient, DEFAULT_ANNUAL_RATE_BPS};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn setup() -> (Env, StakingContractClient<'static>, Address, Address) {
    let env = Env::default();
    env.mock_all_auths();

    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let contract_id = env.register(StakingContract, ());
    let client = StakingContractClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    client.initialize(&admin, &token, &DEFAULT_ANNUAL_RATE_BPS);

    (env, client, admin, token)
}

fn expect_unauthorized<T, E>(result: Result<T, Result<ContractError, E>>) {
    match result {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
}

// ── Deployer bootstrapped on initialize ──────────────────────────────────────

#[test]
fn test_deployer_roles_after_init() {
    let (_env, client, admin, _) = setup();

    assert!(client.has_role(&Role::Admin, &admin));
    assert!(client.has_role(&Role::Pauser, &admin));
    assert!(!client.has_role(&Role::RewardFunder, &admin));
}

#[test]
fn test_every_role_is_administered_by_admin() {
    let (_env, client, _, _) = setup();

    assert_eq!(client.get_role_admin(&Role::Admin), Role::Admin);
    assert_eq!(client.get_role_admin(&Role::RewardFunder), Role::Admin);
    assert_eq!(client.get_role_admin(&Role::Pauser), Role::Admin);
}

// ── Admin can grant and revoke ───────────────────────────────────────────────

#[test]
fn test_admin_grants_and_revokes_funder() {
    let (env, client, admin, _) = setup();
    let target = Address::generate(&env);

    client.grant_role(&admin, &Role::RewardFunder, &target);
    assert!(client.has_role(&Role::RewardFunder, &target));

    // Granting again is a no-op, not an error.
    client.grant_role(&admin, &Role::RewardFunder, &target);
    assert!(client.has_role(&Role::RewardFunder, &target));

    client.revoke_role(&admin, &Role::RewardFunder, &target);
    assert!(!client.has_role(&Role::RewardFunder, &target));
}

#[test]
fn test_admin_can_appoint_another_admin() {
    let (env, client, admin, _) = setup();
    let second = Address::generate(&env);
    let target = Address::generate(&env);

    client.grant_role(&admin, &Role::Admin, &second);
    client.grant_role(&second, &Role::Pauser, &target);
    assert!(client.has_role(&Role::Pauser, &target));

    // Admin administers itself: the new admin can remove the original one.
    client.revoke_role(&second, &Role::Admin, &admin);
    assert!(!client.has_role(&Role::Admin, &admin));
    expect_unauthorized(client.try_grant_role(&admin, &Role::Pauser, &admin));
}

#[test]
fn test_revoked_funder_loses_access_immediately() {
    let (env, client, admin, token) = setup();
    let funder = Address::generate(&env);
    StellarAssetClient::new(&env, &token).mint(&funder, &1_000);

    client.grant_role(&admin, &Role::RewardFunder, &funder);
    client.fund_rewards(&funder, &400);

    client.revoke_role(&admin, &Role::RewardFunder, &funder);
    expect_unauthorized(client.try_fund_rewards(&funder, &400));
    assert_eq!(client.reward_pool(), 400);
}

// ── Non-admins cannot grant or revoke ────────────────────────────────────────

#[test]
fn test_non_admin_cannot_grant() {
    let (env, client, _admin, _) = setup();
    let intruder = Address::generate(&env);

    expect_unauthorized(client.try_grant_role(&intruder, &Role::RewardFunder, &intruder));
    assert!(!client.has_role(&Role::RewardFunder, &intruder));

    expect_unauthorized(client.try_grant_role(&intruder, &Role::Admin, &intruder));
    assert!(!client.has_role(&Role::Admin, &intruder));
}

#[test]
fn test_non_admin_cannot_revoke() {
    let (env, client, admin, _) = setup();
    let intruder = Address::generate(&env);

    expect_unauthorized(client.try_revoke_role(&intruder, &Role::Admin, &admin));
    assert!(client.has_role(&Role::Admin, &admin));
}

#[test]
fn test_pauser_cannot_grant_roles() {
    let (env, client, admin, _) = setup();
    let pauser = Address::generate(&env);
    let target = Address::generate(&env);

    client.grant_role(&admin, &Role::Pauser, &pauser);
    expect_unauthorized(client.try_grant_role(&pauser, &Role::Pauser, &target));
}

// ── Renounce ─────────────────────────────────────────────────────────────────

#[test]
fn test_renounce_drops_only_own_role() {
    let (env, client, admin, _) = setup();
    let funder = Address::generate(&env);

    client.grant_role(&admin, &Role::RewardFunder, &funder);
    client.renounce_role(&funder, &Role::RewardFunder);
    assert!(!client.has_role(&Role::RewardFunder, &funder));

    // Renouncing a role that is not held is harmless.
    client.renounce_role(&funder, &Role::Admin);
    assert!(client.has_role(&Role::Admin, &admin));
}

// ── Role admin reassignment ──────────────────────────────────────────────────

#[test]
fn test_reassigned_role_admin() {
    let (env, client, admin, _) = setup();
    let funder_manager = Address::generate(&env);
    let funder = Address::generate(&env);

    // Pauser holders now administer RewardFunder.
    client.set_role_admin(&admin, &Role::RewardFunder, &Role::Pauser);
    assert_eq!(client.get_role_admin(&Role::RewardFunder), Role::Pauser);

    client.grant_role(&admin, &Role::Pauser, &funder_manager);
    client.grant_role(&funder_manager, &Role::RewardFunder, &funder);
    assert!(client.has_role(&Role::RewardFunder, &funder));

    // Admin without Pauser no longer administers RewardFunder.
    client.renounce_role(&admin, &Role::Pauser);
    expect_unauthorized(client.try_revoke_role(&admin, &Role::RewardFunder, &funder));
    assert!(client.has_role(&Role::RewardFunder, &funder));
}

#[test]
fn test_non_admin_cannot_reassign_role_admin() {
    let (env, client, _admin, _) = setup();
    let intruder = Address::generate(&env);

    expect_unauthorized(client.try_set_role_admin(&intruder, &Role::Pauser, &Role::RewardFunder));
    assert_eq!(client.get_role_admin(&Role::Pauser), Role::Admin);
}

#[test]
fn test_role_calls_before_initialize_fail() {
    let env = Env::default();
    env.mock_all_auths();
    let client = StakingContractClient::new(&env, &env.register(StakingContract, ()));
    let someone = Address::generate(&env);

    let res = client.try_grant_role(&someone, &Role::Admin, &someone);
    assert_eq!(res.unwrap_err().unwrap(), ContractError::NotInitialized);
    assert!(!client.has_role(&Role::Admin, &someone));
}
