use soroban_sdk::{symbol_short, Address, Env};

pub struct Events;

impl Events {
    /// Topics `("transfer", from, to)`, data `amount`.
    pub fn transfer(env: &Env, from: Address, to: Address, amount: i128) {
        env.events()
            .publish((symbol_short!("transfer"), from, to), amount);
    }
}
