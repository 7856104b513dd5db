// Copyright (c) 2026 Covenant
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]

//! Generate a cert-issuer key pair.
//!
//! Writes the 32-byte secret as hex to `<dir>/<name>.secret` (mode 0600)
//! and prints the public identity as hex: the Ed25519 public key, or the
//! 20-byte address with `--eth`. The secret file is what the platform's
//! signing tools load with `KeyPair::ed25519_from_seed` /
//! `KeyPair::eth_from_secret`.

use anyhow::{anyhow, bail, Result};
use covenant::crypto::keys::KeyPair;
use ring::rand::{SecureRandom, SystemRandom};
use std::path::PathBuf;
use zeroize::Zeroize;

struct Args {
    dir: String,
    name: String,
    eth: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args { dir: "data".to_string(), name: "owner".to_string(), eth: false };
    let mut positional = 0usize;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--eth" => args.eth = true,
            flag if flag.starts_with("--") => bail!("unknown flag {}", flag),
            value => {
                match positional {
                    0 => args.dir = value.to_string(),
                    1 => args.name = value.to_string(),
                    _ => bail!("too many arguments"),
                }
                positional += 1;
            }
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    let args = parse_args()?;

    let rng = SystemRandom::new();
    let mut secret = [0u8; 32];
    rng.fill(&mut secret).map_err(|_| anyhow!("system rng failure"))?;

    let keypair = if args.eth {
        KeyPair::eth_from_secret(&secret)?
    } else {
        KeyPair::ed25519_from_seed(&secret)?
    };

    let dir = PathBuf::from(&args.dir);
    std::fs::create_dir_all(&dir)?;
    let secret_path = dir.join(format!("{}.secret", args.name));
    if secret_path.exists() {
        bail!("{} already exists, refusing to overwrite", secret_path.display());
    }

    let mut encoded = hex::encode(secret);
    secret.zeroize();
    std::fs::write(&secret_path, &encoded)?;
    encoded.zeroize();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(&secret_path, std::fs::Permissions::from_mode(0o600));
    }

    println!("{}", hex::encode(keypair.public_key()));
    Ok(())
}
