use std::error::Error;
use std::fs;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use mls_core::pr_sz;
use mls_hash::{Ripemd128Capability, Sha256Capability};
use rand::RngCore;
use tracing::{error, info};

use mls_cli::report::{BenchmarkReport, RunMetrics};
use mls_cli::wrapper::{recover_root, OwnedKeyPair};

#[derive(Parser)]
#[command(name = "mls-cli")]
#[command(about = "Merkle/Lamport one-time-signature engine: keygen, public root, sign, recover", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum HashKind {
    Sha256,
    Ripemd128,
}

impl HashKind {
    fn height(self) -> u32 {
        match self {
            HashKind::Sha256 => 5,
            HashKind::Ripemd128 => 4,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh private key of size PrSz(h, s) from the OS CSPRNG.
    Keygen {
        #[arg(long, default_value = "sha256")]
        hash: HashKind,
        /// number of one-time signing slots, as 2^signings
        #[arg(short, long, default_value = "4")]
        signings: u32,
        #[arg(short, long)]
        output: String,
    },
    /// Compute and print the Merkle root over a private key.
    Public {
        #[arg(long, default_value = "sha256")]
        hash: HashKind,
        #[arg(short, long, default_value = "4")]
        signings: u32,
        #[arg(short, long)]
        key: String,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Sign a message hash with one of the private key's one-time slots.
    Sign {
        #[arg(long, default_value = "sha256")]
        hash: HashKind,
        #[arg(short, long, default_value = "4")]
        signings: u32,
        #[arg(short, long)]
        key: String,
        #[arg(short, long)]
        message: String,
        #[arg(long)]
        offset: u32,
        #[arg(short, long)]
        output: String,
        /// append timing metrics to a JSON benchmark report
        #[arg(long)]
        report: Option<String>,
    },
    /// Recover the Merkle root a signature resolves to.
    Recover {
        #[arg(long, default_value = "sha256")]
        hash: HashKind,
        #[arg(short, long)]
        message: String,
        #[arg(short, long)]
        signature: String,
        #[arg(short, long)]
        output: Option<String>,
        #[arg(long)]
        report: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Keygen { hash, signings, output } => run_keygen(hash, signings, &output),
        Commands::Public { hash, signings, key, output } => run_public(hash, signings, &key, output.as_deref()),
        Commands::Sign {
            hash,
            signings,
            key,
            message,
            offset,
            output,
            report,
        } => run_sign(hash, signings, &key, &message, offset, &output, report.as_deref()),
        Commands::Recover {
            hash,
            message,
            signature,
            output,
            report,
        } => run_recover(hash, &message, &signature, output.as_deref(), report.as_deref()),
    }
}

fn run_keygen(hash: HashKind, signings: u32, output: &str) -> Result<(), Box<dyn Error>> {
    let h = hash.height();
    let len = pr_sz(h, signings);
    if len == 0 {
        error!("PrSz(h={}, s={}) overflows Sz", h, signings);
        return Err("key parameters overflow the private-key size oracle".into());
    }
    info!("generating private key: h={}, s={}, {} bytes", h, signings, len);
    let mut private = vec![0u8; len as usize];
    rand::thread_rng().fill_bytes(&mut private);
    fs::write(output, &private)?;
    info!("private key written to {}", output);
    Ok(())
}

fn run_public(hash: HashKind, signings: u32, key_path: &str, output: Option<&str>) -> Result<(), Box<dyn Error>> {
    let h = hash.height();
    let private = fs::read(key_path)?;
    info!("loaded private key from {} ({} bytes)", key_path, private.len());

    let root = match hash {
        HashKind::Sha256 => {
            let mut kp = OwnedKeyPair::from_private_key(Sha256Capability, h, signings, private)?;
            kp.public_root()?
        }
        HashKind::Ripemd128 => {
            let mut kp = OwnedKeyPair::from_private_key(Ripemd128Capability, h, signings, private)?;
            kp.public_root()?
        }
    };
    info!("public root computed ({} bytes)", root.len());

    if let Some(path) = output {
        fs::write(path, &root)?;
        info!("public root written to {}", path);
    } else {
        println!("{}", to_hex(&root));
    }
    Ok(())
}

fn run_sign(
    hash: HashKind,
    signings: u32,
    key_path: &str,
    message_path: &str,
    offset: u32,
    output: &str,
    report_path: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let h = hash.height();
    let private = fs::read(key_path)?;
    let message = fs::read(message_path)?;
    info!("loaded private key ({} bytes) and message ({} bytes)", private.len(), message.len());

    let (elapsed, sig) = match hash {
        HashKind::Sha256 => {
            let mut kp = OwnedKeyPair::from_private_key(Sha256Capability, h, signings, private)?;
            RunMetrics::measure_time(move || kp.sign(&message, offset))
        }
        HashKind::Ripemd128 => {
            let mut kp = OwnedKeyPair::from_private_key(Ripemd128Capability, h, signings, private)?;
            RunMetrics::measure_time(move || kp.sign(&message, offset))
        }
    };
    let sig = match sig {
        Ok(sig) => sig,
        Err(err) => {
            error!("signing failed: {}", err);
            return Err(Box::new(err));
        }
    };
    info!("signature written: {} bytes in {:?}", sig.len(), elapsed);
    fs::write(output, &sig)?;

    if let Some(path) = report_path {
        append_report(path, "sign", h, signings, elapsed, sig.len())?;
    }
    Ok(())
}

fn run_recover(
    hash: HashKind,
    message_path: &str,
    signature_path: &str,
    output: Option<&str>,
    report_path: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let h = hash.height();
    let message = fs::read(message_path)?;
    let sig = fs::read(signature_path)?;
    info!("loaded message ({} bytes) and signature ({} bytes)", message.len(), sig.len());

    let (elapsed, root) = match hash {
        HashKind::Sha256 => RunMetrics::measure_time(|| recover_root(&Sha256Capability, h, &message, &sig)),
        HashKind::Ripemd128 => RunMetrics::measure_time(|| recover_root(&Ripemd128Capability, h, &message, &sig)),
    };
    let root = match root {
        Ok(root) => root,
        Err(err) => {
            error!("recovery failed: {}", err);
            return Err(Box::new(err));
        }
    };
    info!("root recovered ({} bytes) in {:?}", root.len(), elapsed);

    if let Some(path) = output {
        fs::write(path, &root)?;
    } else {
        println!("{}", to_hex(&root));
    }

    if let Some(path) = report_path {
        append_report(path, "recover", h, 0, elapsed, sig.len())?;
    }
    Ok(())
}

fn append_report(path: &str, operation: &str, h: u32, s: u32, elapsed: Duration, bytes: usize) -> Result<(), Box<dyn Error>> {
    let mut report = BenchmarkReport::load_json(path)?;
    report.add_metrics(RunMetrics::new(operation, h, s, elapsed, bytes));
    report.save_json(path)?;
    info!("benchmark report appended to {}", path);
    Ok(())
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
