//! Scripts for deploying and upgrading the collection platform's smart contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod cli;
mod commands;
pub mod config;
pub mod constants;
pub mod deployer;
pub mod errors;
pub mod plan;
pub mod sequencer;
mod solidity;
pub mod types;
pub mod utils;
