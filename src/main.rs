mod config;
mod entry;
mod error;
mod mfa;
mod password;
mod pin;
mod sampler;
mod store;
mod totp;

use clap::{Parser, Subcommand};

use crate::entry::{MfaEntry, PasswordEntry, PinEntry};
use crate::sampler::{CharsetSpec, SpecialChars};
use crate::store::{Record, Store};

#[derive(Parser, Debug)]
#[command(name = "keyfob", version, about = "Local TOTP, password and PIN helper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// TOTP codes for MFA accounts
    Mfa {
        #[command(subcommand)]
        cmd: MfaCommands,
    },

    /// Generated passwords
    Pass {
        #[command(subcommand)]
        cmd: PassCommands,
    },

    /// Generated numeric PINs
    Pin {
        #[command(subcommand)]
        cmd: PinCommands,
    },
}

#[derive(Subcommand, Debug)]
enum MfaCommands {
    /// Register or update an MFA secret
    ///
    /// Examples:
    ///   keyfob mfa setup --account google --name alice@gmail.com -k "rfg3 oi7l zdiy 2yha"
    ///   keyfob mfa setup --account github --name alice -k "otpauth://totp/..." -s 60
    Setup {
        /// Account the secret belongs to, e.g. "google"
        #[arg(long)]
        account: String,
        /// Name or email within the account
        #[arg(long)]
        name: String,
        /// Base32 secret or otpauth:// URI
        #[arg(short, long)]
        key: String,
        /// Time step in seconds (overrides a URI period; default 30)
        #[arg(short, long, allow_negative_numbers = true)]
        seconds: Option<i64>,
    },

    /// List registered accounts
    List,

    /// Print the current code
    Generate {
        #[arg(long)]
        account: String,
        #[arg(long)]
        name: String,
        /// Shift the clock by this many seconds
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,
        /// Also print the codes at -60, -30, +30 and +60 seconds
        #[arg(long)]
        window: bool,
    },
}

#[derive(Subcommand, Debug)]
enum PassCommands {
    /// Generate and store a password
    ///
    /// With no class flags at all, every class is used.
    ///
    /// Examples:
    ///   keyfob pass add --name google --account alice -l 20 -a -A -d --default-special
    ///   keyfob pass add --name github --account alice -l 16 -s "!@#$"
    Add {
        /// Service the password is for
        #[arg(long)]
        name: String,
        /// Account or username at that service
        #[arg(long)]
        account: String,
        /// Password length
        #[arg(short, long, default_value_t = 16, allow_negative_numbers = true)]
        length: i64,
        /// Include lowercase letters
        #[arg(short = 'a', long)]
        lower: bool,
        /// Include uppercase letters
        #[arg(short = 'A', long)]
        upper: bool,
        /// Include digits
        #[arg(short = 'd', long)]
        digits: bool,
        /// Custom special characters to include
        #[arg(short = 's', long, conflicts_with = "default_special")]
        special: Option<String>,
        /// Include the built-in special character set
        #[arg(long)]
        default_special: bool,
    },

    /// List stored passwords
    List,
}

#[derive(Subcommand, Debug)]
enum PinCommands {
    /// Generate and store a numeric PIN
    Add {
        /// Service the PIN is for
        #[arg(long)]
        name: String,
        /// Account or username at that service
        #[arg(long)]
        account: String,
        /// PIN length
        #[arg(short, long, default_value_t = 4, allow_negative_numbers = true)]
        length: i64,
    },

    /// Show one stored PIN
    Get {
        #[arg(long)]
        name: String,
        #[arg(long)]
        account: String,
    },

    /// List stored PINs
    List,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Mfa { cmd } => match cmd {
            MfaCommands::Setup {
                account,
                name,
                key,
                seconds,
            } => cmd_mfa_setup(&account, &name, &key, seconds)?,
            MfaCommands::List => cmd_mfa_list()?,
            MfaCommands::Generate {
                account,
                name,
                offset,
                window,
            } => cmd_mfa_generate(&account, &name, offset, window)?,
        },
        Commands::Pass { cmd } => match cmd {
            PassCommands::Add {
                name,
                account,
                length,
                lower,
                upper,
                digits,
                special,
                default_special,
            } => {
                let spec = CharsetSpec {
                    lower,
                    upper,
                    digits,
                    special: special_from_flags(special, default_special),
                };
                cmd_pass_add(&name, &account, length, &spec)?
            }
            PassCommands::List => cmd_pass_list()?,
        },
        Commands::Pin { cmd } => match cmd {
            PinCommands::Add {
                name,
                account,
                length,
            } => cmd_pin_add(&name, &account, length)?,
            PinCommands::Get { name, account } => cmd_pin_get(&name, &account)?,
            PinCommands::List => cmd_pin_list()?,
        },
    }

    Ok(())
}

fn special_from_flags(special: Option<String>, default_special: bool) -> SpecialChars {
    if default_special {
        return SpecialChars::Default;
    }
    match special {
        Some(s) if !s.is_empty() => SpecialChars::Custom(s),
        _ => SpecialChars::None,
    }
}

fn open_store<R: Record>() -> Result<Store<R>, error::Error> {
    Ok(Store::open(&config::config_dir()?))
}

fn cmd_mfa_setup(
    account: &str,
    name: &str,
    key: &str,
    seconds: Option<i64>,
) -> anyhow::Result<()> {
    let input = mfa::parse_key_input(key)?;
    let period = seconds
        .or(input.period.map(|p| p as i64))
        .unwrap_or(30);

    let store = open_store::<MfaEntry>()?;
    let entry = mfa::setup(&store, account, name, &input.secret, period)?;
    println!("MFA setup successful for {} ({})", entry.name, entry.account);
    Ok(())
}

fn cmd_mfa_list() -> anyhow::Result<()> {
    let store = open_store::<MfaEntry>()?;
    let entries = mfa::list(&store)?;
    if entries.is_empty() {
        println!("No MFA entries found");
        return Ok(());
    }

    println!("MFA Accounts:");
    for e in entries {
        println!(
            "  Account: {}, Name: {}, Period: {}s",
            e.account, e.name, e.period
        );
    }
    Ok(())
}

fn cmd_mfa_generate(account: &str, name: &str, offset: i64, window: bool) -> anyhow::Result<()> {
    let store = open_store::<MfaEntry>()?;

    if window {
        for (off, code) in mfa::generate_window(&store, account, name)? {
            println!("  {off:+4}s  {} (valid for {}s)", code.code, code.remaining);
        }
        return Ok(());
    }

    let code = mfa::generate(&store, account, name, offset)?;
    println!("MFA Code: {} (valid for {} seconds)", code.code, code.remaining);
    Ok(())
}

fn cmd_pass_add(name: &str, account: &str, length: i64, spec: &CharsetSpec) -> anyhow::Result<()> {
    let store = open_store::<PasswordEntry>()?;
    let (entry, replaced) = password::add(&store, name, account, length, spec)?;
    let verb = if replaced { "updated" } else { "generated" };
    println!(
        "Password {verb} for {} ({}): {}",
        entry.name, entry.account, entry.password
    );
    Ok(())
}

fn cmd_pass_list() -> anyhow::Result<()> {
    let store = open_store::<PasswordEntry>()?;
    let entries = password::list(&store)?;
    if entries.is_empty() {
        println!("No passwords found");
        return Ok(());
    }

    println!("Stored Passwords:");
    println!("=================");
    for (i, e) in entries.iter().enumerate() {
        println!("{}. Name: {}", i + 1, e.name);
        println!("   Account: {}", e.account);
        println!("   Password: {}", e.password);
        println!("   Length: {} characters", e.length);
        println!("   Config: {}", e.config);
        println!();
    }
    Ok(())
}

fn cmd_pin_add(name: &str, account: &str, length: i64) -> anyhow::Result<()> {
    let store = open_store::<PinEntry>()?;
    let (entry, replaced) = pin::add(&store, name, account, length)?;
    let verb = if replaced { "updated" } else { "generated" };
    println!(
        "PIN {verb} for {} ({}): {}",
        entry.name, entry.account, entry.pin
    );
    Ok(())
}

fn cmd_pin_get(name: &str, account: &str) -> anyhow::Result<()> {
    let store = open_store::<PinEntry>()?;
    let entry = pin::get(&store, name, account)?;
    println!("PIN for {} ({}): {}", entry.name, entry.account, entry.pin);
    Ok(())
}

fn cmd_pin_list() -> anyhow::Result<()> {
    let store = open_store::<PinEntry>()?;
    let entries = pin::list(&store)?;
    if entries.is_empty() {
        println!("No PIN entries found");
        return Ok(());
    }

    println!("PIN Entries:");
    for e in entries {
        println!("  Name: {}, Account: {}, PIN: {}", e.name, e.account, e.pin);
    }
    Ok(())
}
