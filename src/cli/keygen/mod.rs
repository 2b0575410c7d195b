//! Keygen command - generates RSA key pairs for deployment
//!
//! Prints the private and public key as PEM, ready to paste into the
//! `JWT_PRIVATE_KEY` and `JWT_PUBLIC_KEY` environment variables.

use anyhow::Context;
use clap::Args;
use rsa::{
    pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding},
    RsaPrivateKey,
};

#[derive(Args)]
pub struct KeygenArgs {
    /// RSA modulus size in bits
    #[arg(long, default_value_t = 2048)]
    pub bits: usize,
}

pub async fn run(args: KeygenArgs) -> anyhow::Result<()> {
    if args.bits < 2048 {
        anyhow::bail!("RSA keys below 2048 bits are not acceptable for signing");
    }

    let (private_pem, public_pem) = generate_key_pair(args.bits)?;

    println!("{}", private_pem);
    println!("{}", public_pem);

    Ok(())
}

/// Generate an RSA key pair, returning (private PEM, public PEM)
pub fn generate_key_pair(bits: usize) -> anyhow::Result<(String, String)> {
    let mut rng = rand::rngs::OsRng;

    let private_key =
        RsaPrivateKey::new(&mut rng, bits).context("Failed to generate RSA private key")?;

    let private_pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .context("Failed to encode private key as PEM")?
        .to_string();
    let public_pem = private_key
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .context("Failed to encode public key as PEM")?;

    Ok((private_pem, public_pem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_key_pair() {
        let (private_pem, public_pem) = generate_key_pair(2048).unwrap();

        assert!(private_pem.contains("BEGIN PRIVATE KEY"));
        assert!(public_pem.contains("BEGIN PUBLIC KEY"));
    }
}
