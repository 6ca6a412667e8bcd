use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rand_core::OsRng;
use tlock_age::{Beacon, ChainInfo, Error, InMemoryBeacons};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Tlock(#[from] Error),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    tlock_age::logging::init_tracing(get_str(&args, "--log").as_deref());

    let Some(cmd) = args.first() else {
        usage();
        return ExitCode::FAILURE;
    };
    let rest = &args[1..];

    let res = match cmd.as_str() {
        "encrypt" => cmd_encrypt(rest),
        "decrypt" => cmd_decrypt(rest).await,
        "round" => cmd_round(rest),
        _ => {
            usage();
            return ExitCode::FAILURE;
        }
    };
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn usage() {
    eprintln!("tlock <cmd> [args] [--log <filter>]\n");
    eprintln!("Commands:");
    eprintln!("  encrypt --chain <info.json> (--round <n> | --at <unix-ms>) [--in <file>] [--out <file>] [--binary]");
    eprintln!("  decrypt --chain <info.json> --beacon <beacon.json> [--in <file>] [--out <file>]");
    eprintln!("  round --chain <info.json> --at <unix-ms>");
}

fn cmd_encrypt(args: &[String]) -> Result<(), CliError> {
    let chain = load_chain(args)?;
    let round = match (get_u64(args, "--round")?, get_u64(args, "--at")?) {
        (Some(round), None) => round,
        (None, Some(at)) => chain.round_at(at)?,
        _ => return Err(CliError::Usage("pass exactly one of --round or --at".into())),
    };

    let plaintext = read_input(get_path(args, "--in").as_deref())?;
    let out = if has_flag(args, "--binary") {
        tlock_age::encrypt_binary(&chain, round, &plaintext, &mut OsRng)?
    } else {
        tlock_age::encrypt(&chain, round, &plaintext, &mut OsRng)?.into_bytes()
    };
    tracing::info!(round, available_at = chain.round_time(round), "encrypted");
    write_output(get_path(args, "--out").as_deref(), &out)
}

async fn cmd_decrypt(args: &[String]) -> Result<(), CliError> {
    let chain = load_chain(args)?;
    let beacon_path = get_path(args, "--beacon").ok_or_else(|| CliError::Usage("missing --beacon".into()))?;
    let beacon = Beacon::from_json(&fs::read_to_string(beacon_path)?)?;
    let provider = InMemoryBeacons::new(chain.clone()).with_beacon(beacon)?;

    let input = read_input(get_path(args, "--in").as_deref())?;
    let plaintext = tlock_age::decrypt(&chain, &provider, &input).await?;
    write_output(get_path(args, "--out").as_deref(), &plaintext)
}

fn cmd_round(args: &[String]) -> Result<(), CliError> {
    let chain = load_chain(args)?;
    let at = get_u64(args, "--at")?.ok_or_else(|| CliError::Usage("missing --at".into()))?;
    println!("{}", chain.round_at(at)?);
    Ok(())
}

fn load_chain(args: &[String]) -> Result<ChainInfo, CliError> {
    let path = get_path(args, "--chain").ok_or_else(|| CliError::Usage("missing --chain".into()))?;
    Ok(ChainInfo::from_json(&fs::read_to_string(path)?)?)
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>, CliError> {
    match path {
        Some(p) => Ok(fs::read(p)?),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<(), CliError> {
    match path {
        Some(p) => fs::write(p, bytes)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn get_str(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .map(|v| v.to_string())
}

fn get_path(args: &[String], key: &str) -> Option<PathBuf> {
    get_str(args, key).map(PathBuf::from)
}

fn get_u64(args: &[String], key: &str) -> Result<Option<u64>, CliError> {
    get_str(args, key)
        .map(|v| {
            v.parse()
                .map_err(|_| CliError::Usage(format!("{key} expects a non-negative integer, got {v:?}")))
        })
        .transpose()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}
