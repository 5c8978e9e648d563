//! ABI-driven call client for remotely deployed actors
//!
//! An ABI describes an actor's functions and composite types as data. A
//! [`ContractBinding`](contract::ContractBinding) built from it validates
//! caller values against the declared types, encodes them as CBOR, hands
//! them to a [`Transport`](infrastructure::Transport), and validates the
//! decoded response against the declared returns.

pub mod config;
pub mod contract;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use contract::{CallArgs, Client, Contract, ContractBinding};
pub use crate::core::{Context, NodeConfig};
pub use domain::abi::{AbiError, AbiLoadError, AbiRegistry, AbiValue, CallOutput, TypeExpr};
pub use infrastructure::{Account, SubmitRequest, Transport};
