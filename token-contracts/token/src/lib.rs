#![no_std]
use soroban_sdk::{contract, contractimpl, contracttype, Address, Env, String};

mod errors;
mod events;

pub use errors::TokenError;
use events::Events;

/// Supply minted to the owner at construction. Never changes afterwards.
pub const TOTAL_SUPPLY: i128 = 1_000_000;
pub const NAME: &str = "My Soroban Token";
pub const SYMBOL: &str = "MST";

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Owner,
    TotalSupply,
    Balance(Address),
}

/// Fixed-supply fungible token. The deploying account owns the whole
/// supply and balances only move through `transfer`.
#[contract]
pub struct Token;

#[contractimpl]
impl Token {
    /// Runs once at deployment with the deploying account as `owner`.
    pub fn __constructor(env: Env, owner: Address) {
        env.storage().instance().set(&DataKey::Owner, &owner);
        env.storage()
            .instance()
            .set(&DataKey::TotalSupply, &TOTAL_SUPPLY);
        write_balance(&env, &owner, TOTAL_SUPPLY);
    }

    pub fn owner(env: Env) -> Address {
        env.storage()
            .instance()
            .get(&DataKey::Owner)
            .expect("token is constructed with an owner")
    }

    pub fn name(env: Env) -> String {
        String::from_str(&env, NAME)
    }

    pub fn symbol(env: Env) -> String {
        String::from_str(&env, SYMBOL)
    }

    pub fn total_supply(env: Env) -> i128 {
        env.storage()
            .instance()
            .get(&DataKey::TotalSupply)
            .unwrap_or(0)
    }

    /// Zero for accounts that never held tokens.
    pub fn balance_of(env: Env, account: Address) -> i128 {
        read_balance(&env, &account)
    }

    /// Move `amount` from `from` to `to`. `from` must authorize the call.
    ///
    /// A rejected transfer leaves every balance untouched and publishes
    /// no event.
    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), TokenError> {
        from.require_auth();

        if amount < 0 {
            return Err(TokenError::NegativeAmount);
        }

        let from_balance = read_balance(&env, &from);
        if from_balance < amount {
            return Err(TokenError::NotEnoughTokens);
        }
        write_balance(&env, &from, from_balance - amount);

        // Read after the debit so a self-transfer nets to zero.
        let to_balance = read_balance(&env, &to);
        write_balance(&env, &to, to_balance + amount);

        #[cfg(feature = "logging")]
        {
            soroban_sdk::log!(&env, "transfer", from, to, amount);
        }

        Events::transfer(&env, from, to, amount);
        Ok(())
    }
}

fn read_balance(env: &Env, account: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Balance(account.clone()))
        .unwrap_or(0)
}

fn write_balance(env: &Env, account: &Address, amount: i128) {
    env.storage()
        .persistent()
        .set(&DataKey::Balance(account.clone()), &amount);
}
