//! Contract bindings and method dispatch

mod args;
mod binding;
mod client;

pub use args::CallArgs;
pub use binding::{ContractBinding, Method, PreparedCall};
pub use client::{Client, Contract};
