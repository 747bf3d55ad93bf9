use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::io::{self, Read};
use std::path::PathBuf;
use zeroize::Zeroizing;

use turion_wallet::log_warn;
use turion_wallet::utils::logging;
use turion_wallet::wallet::AccountInfo;
use turion_wallet::{WalletConfig, WalletRecord, WalletSession};

const LOG_MODULE: &str = "cli";

/// Turion wallet: derive, encrypt and unlock a single recovery phrase
#[derive(Parser)]
#[command(name = "turion-wallet", version, about)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the encrypted wallet slot (overrides the config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a new wallet and store its phrase encrypted
    Create {
        #[command(flatten)]
        password: PasswordArg,
    },

    /// Restore a wallet from a 12-word recovery phrase
    ///
    /// The phrase is read from stdin when `--phrase` is not given.
    Restore {
        /// Recovery phrase (prefer stdin)
        ///
        /// A phrase passed here is visible to other local users in the process list.
        #[arg(long)]
        phrase: Option<String>,

        #[command(flatten)]
        password: PasswordArg,
    },

    /// Check the password and show the stored wallet's address
    Unlock {
        #[command(flatten)]
        password: PasswordArg,
    },

    /// Show the recovery phrase and private key (WIF)
    Reveal {
        #[command(flatten)]
        password: PasswordArg,
    },

    /// Delete the stored wallet
    Logout,

    /// Show whether a wallet is stored
    Status,

    /// Show derivation paths, address and account xpub
    ///
    /// Uses `--phrase` when given, otherwise unlocks the stored wallet.
    Inspect {
        /// Recovery phrase to inspect instead of the stored wallet
        ///
        /// A phrase passed here is visible to other local users in the process list.
        #[arg(long)]
        phrase: Option<String>,

        /// Also print the account extended private key (xprv)
        #[arg(long)]
        private: bool,

        #[command(flatten)]
        password: PasswordArg,
    },
}

#[derive(clap::Args)]
struct PasswordArg {
    /// Wallet password (prefer TURION_WALLET_PASSWORD)
    ///
    /// A password passed as --password is visible to other local users in the process list.
    #[arg(long, env = "TURION_WALLET_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl PasswordArg {
    fn require(self) -> Result<SecretString> {
        self.password
            .map(SecretString::from)
            .ok_or_else(|| anyhow!("A password is required (--password or TURION_WALLET_PASSWORD)"))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => WalletConfig::load(path).context("Failed to load configuration")?,
        None => WalletConfig::standard(),
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }

    logging::set_debug(cli.verbose || config.logging.debug);
    for warning in config.warnings() {
        log_warn!(LOG_MODULE, "weak configuration", reason = warning);
    }

    let session = WalletSession::from_config(&config).context("Failed to open wallet storage")?;
    let json = cli.json;

    match cli.command {
        Command::Create { password } => {
            let password = password.require()?;
            let record = session
                .create(password.expose_secret())
                .context("Wallet creation failed")?;
            print_summary(&record, json)?;
            if !json {
                println!("Run `turion-wallet reveal` to back up the recovery phrase.");
            }
        }
        Command::Restore { phrase, password } => {
            let password = password.require()?;
            let phrase = read_phrase(phrase)?;
            let record = session
                .restore(&phrase, password.expose_secret())
                .context("Wallet restore failed")?;
            print_summary(&record, json)?;
        }
        Command::Unlock { password } => {
            let password = password.require()?;
            let record = session
                .unlock(password.expose_secret())
                .context("Unlock failed")?;
            print_summary(&record, json)?;
        }
        Command::Reveal { password } => {
            let password = password.require()?;
            let record = session
                .reveal_secrets(password.expose_secret())
                .context("Reveal failed")?;
            print_secrets(&record, json)?;
        }
        Command::Logout => {
            session.logout().context("Logout failed")?;
            if json {
                println!("{}", json!({ "status": session.status()? }));
            } else {
                println!("Wallet removed.");
            }
        }
        Command::Status => {
            let status = session.status()?;
            if json {
                println!("{}", json!({ "status": status }));
            } else {
                println!("Status: {}", status);
            }
        }
        Command::Inspect { phrase, private, password } => {
            let (info, xprv) = match phrase {
                Some(phrase) => {
                    let phrase = Zeroizing::new(phrase);
                    let assembler = session.assembler();
                    let xprv = if private { Some(assembler.account_xprv(&phrase)?) } else { None };
                    (assembler.account_info(&phrase)?, xprv)
                }
                None => {
                    let password = password.require()?;
                    session.unlock(password.expose_secret()).context("Unlock failed")?;
                    let xprv = if private {
                        Some(
                            session
                                .reveal_account_xprv(password.expose_secret())
                                .context("Reveal failed")?,
                        )
                    } else {
                        None
                    };
                    (session.account_info()?, xprv)
                }
            };
            print_account(&info, xprv.as_ref().map(|k| k.as_str()), json)?;
        }
    }

    Ok(())
}

fn read_phrase(arg: Option<String>) -> Result<Zeroizing<String>> {
    if let Some(phrase) = arg {
        return Ok(Zeroizing::new(phrase));
    }
    let mut buffer = Zeroizing::new(String::new());
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read recovery phrase from stdin")?;
    Ok(buffer)
}

fn print_summary(record: &WalletRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&record.summary())?);
    } else {
        println!("Address: {}", record.address());
        println!("Balance: {}", record.balance());
    }
    Ok(())
}

fn print_secrets(record: &WalletRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        println!("Recovery phrase: {}", record.mnemonic());
        println!("Private key (WIF): {}", record.private_key_wif());
        println!("Address: {}", record.address());
    }
    Ok(())
}

fn print_account(info: &AccountInfo, xprv: Option<&str>, json: bool) -> Result<()> {
    if json {
        let mut value = serde_json::to_value(info)?;
        if let Some(xprv) = xprv {
            value["account_xprv"] = json!(xprv);
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Network: {}", info.network);
        println!("Address: {} ({})", info.address, info.leaf_path);
        println!("Account xpub: {} ({})", info.account_xpub, info.account_path);
        if let Some(xprv) = xprv {
            println!("Account xprv: {}", xprv);
        }
    }
    Ok(())
}
