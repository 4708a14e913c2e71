use clap::{Arg, Command};
use sshtrust::host::*;
use sshtrust::ledger::*;
use sshtrust::token::*;
use sshtrust::user::*;
use sshtrust::util::BoxFuture;
use sshtrust::x509::*;
use std::error::Error;
use std::io::Write;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Asks on the terminal. Anything but `yes` declines.
struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn confirm(&self, message: &str) -> BoxFuture<bool> {
        let message = message.to_string();
        Box::pin(async move {
            let answer = tokio::task::spawn_blocking(move || {
                let mut stderr = std::io::stderr();
                loop {
                    let _ = write!(stderr, "{}", message);
                    let _ = stderr.flush();
                    let mut line = String::new();
                    match std::io::stdin().read_line(&mut line) {
                        Ok(0) | Err(_) => return false,
                        Ok(_) => match line.trim() {
                            "yes" => return true,
                            "no" => return false,
                            _ => (),
                        },
                    }
                    let _ = write!(stderr, "Please type 'yes' or 'no': ");
                }
            });
            answer.await.unwrap_or(false)
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(main_async())
}

async fn main_async() -> Result<(), Box<dyn Error>> {
    let config = Command::new("check-host")
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .arg(
            Arg::new("log")
                .help("Log level")
                .long("log")
                .takes_value(true)
                .default_value("info"),
        )
        .arg(
            Arg::new("anchors")
                .help("Directory of trusted anchor certificates")
                .long("anchors")
                .takes_value(true)
                .env("SSH_TRUSTED_ANCHORS")
                .default_value(ValidationContext::DEFAULT_ANCHOR_DIR),
        )
        .subcommand(
            Command::new("host")
                .about("Decide whether to trust a server's host key or certificate")
                .arg(Arg::new("name").help("Host name").required(true))
                .arg(Arg::new("addr").help("IP address").required(true))
                .arg(Arg::new("key").help("Public key or certificate file").required(true))
                .arg(
                    Arg::new("strict")
                        .help("Strict host key checking")
                        .long("strict")
                        .takes_value(true)
                        .possible_values(["yes", "no", "ask"])
                        .default_value("ask"),
                )
                .arg(
                    Arg::new("known-hosts")
                        .help("User known hosts file")
                        .long("known-hosts")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("hash")
                        .help("Hash host names of new entries")
                        .long("hash"),
                ),
        )
        .subcommand(
            Command::new("user")
                .about("Decide whether to accept a user's key or certificate")
                .arg(Arg::new("name").help("User name").required(true))
                .arg(Arg::new("key").help("Public key or certificate file").required(true))
                .arg(
                    Arg::new("home")
                        .help("Home directory holding .ssh/authorized_keys")
                        .long("home")
                        .takes_value(true)
                        .env("HOME"),
                ),
        )
        .get_matches();

    let filters = config.value_of("log").unwrap_or("info");
    env_logger::Builder::new().parse_filters(filters).init();

    let anchors = PathBuf::from(config.value_of("anchors").unwrap_or_default());
    let parser = X509Parser;

    match config.subcommand() {
        Some(("host", args)) => {
            let name = args.value_of("name").unwrap_or_default();
            let addr: IpAddr = args.value_of("addr").unwrap_or_default().parse()?;
            let key_file = Path::new(args.value_of("key").unwrap_or_default());
            let key = load_public_key(key_file, &parser).await?;
            let mut host_config = HostTrustConfig {
                strict_host_key_checking: match args.value_of("strict") {
                    Some("yes") => StrictHostKeyChecking::StrictReject,
                    Some("no") => StrictHostKeyChecking::Disabled,
                    _ => StrictHostKeyChecking::InteractiveConfirm,
                },
                hash_known_hosts: args.is_present("hash"),
                trusted_anchor_dir: anchors,
                ..Default::default()
            };
            if let Some(file) = args.value_of("known-hosts") {
                host_config.user_hostfile = file.into();
            }
            let validation = ValidationContext::init(&host_config.session_policy()).await?;
            let trust = HostTrust {
                config: &host_config,
                validation: &validation,
                parser: &parser,
                ledger: &KnownHostsFiles,
                prompter: &ConsolePrompter,
            };
            let report = host_trust_decision(&trust, name, addr, &key).await?;
            for warning in &report.warnings {
                eprintln!("{}", warning);
            }
            if report.restrictions.any() {
                println!("restrictions: {:?}", report.restrictions);
            }
            match report.decision {
                TrustDecision::Accept => println!("accepted (certificate)"),
                TrustDecision::AcceptViaLedger(key) => {
                    println!("accepted (known hosts): {} {}", key.key_type(), key.fingerprint())
                }
                TrustDecision::Reject(reason) => {
                    println!("rejected: {}", reason);
                    std::process::exit(1)
                }
            }
        }
        Some(("user", args)) => {
            let name = args.value_of("name").unwrap_or_default();
            let key_file = Path::new(args.value_of("key").unwrap_or_default());
            let key = load_public_key(key_file, &parser).await?;
            let validation = ValidationContext::new(ValidationPolicy::default(), anchors);
            let user_config = match args.value_of("home") {
                Some(home) => UserAuthConfig::for_home(Path::new(home)),
                None => UserAuthConfig::default(),
            };
            let auth = UserAuth {
                config: &user_config,
                validation: &validation,
                parser: &parser,
                authorized: &AuthorizedKeysFiles,
            };
            match user_identity_decision(&auth, name, &key).await? {
                UserDecision::Accept => println!("accepted"),
                UserDecision::Reject(reason) => {
                    println!("rejected: {}", reason);
                    std::process::exit(1)
                }
            }
        }
        _ => log::error!("no subcommand given, try --help"),
    }
    Ok(())
}
