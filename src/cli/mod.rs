//! CLI module for the PMP auth service
//!
//! Provides subcommands:
//! - `serve`: run the token issuance HTTP server
//! - `keygen`: generate a fresh RSA key pair for deployment

pub mod keygen;
pub mod serve;

use clap::{Parser, Subcommand};

/// PMP Auth Service - JWT token issuance and verification
#[derive(Parser)]
#[command(name = "pmp-auth-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Generate an RSA key pair and print it as PEM
    Keygen(keygen::KeygenArgs),
}
