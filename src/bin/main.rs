//! Starklink CLI - wallet session simulator
//!
//! Runs the session controller against scripted in-memory wallets:
//!   starklink simulate --wallet starknet_argentX=argentX:approve:SN_MAIN
//!   starklink simulate --wallet braavos:reject --late starknet=keplr:approve
//!   starklink probes             → default probe list
//!   starklink short <address>    → display form of an address
//!
//! Wallet specs: `[slot=]id:behavior[:arg[:address]]`
//!   approve[:chain[:address]]   grant access on `chain` (default: expected network)
//!   reject                      user closes the popup
//!   fail[:detail]               wallet throws
//!   hang                        wallet never answers (pair with --timeout-ms)
//! Without `slot=` the wallet is host-registered instead of slot-injected.
//!
//! Output format:
//!   --json     Output raw JSON (default for non-tty)
//!   --pretty   Pretty-print JSON (default for tty)

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use starklink::logging::init_logging;
use starklink::{
    default_probes, project, Account, Delay, MemoryHost, Network, Script, ScriptedProvider, SessionConfig,
    SessionController, TokioDelay, WalletProvider,
};
use std::cell::RefCell;
use std::env;
use std::io::IsTerminal;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_ADDRESS: &str = "0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7";

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("starklink {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = match opts.command.as_deref() {
        Some("simulate") | Some("sim") => cmd_simulate(&opts),
        Some("probes") => cmd_probes(&opts),
        Some("short") => cmd_short(&opts),
        Some(cmd) => Err(anyhow!("Unknown command: {}", cmd)),
        None => {
            print_usage();
            return;
        }
    };

    let pretty = opts.pretty || (!opts.json && std::io::stdout().is_terminal());
    match result {
        Ok(output) => println!("{}", format_json(&output, pretty)),
        Err(e) => {
            eprintln!("{}", format_json(&json!({"error": format!("{:#}", e)}), pretty));
            std::process::exit(1);
        }
    }
}

fn format_json(value: &Value, pretty: bool) -> String {
    let rendered = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    rendered.unwrap_or_else(|_| value.to_string())
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    positional: Vec<String>,
    // Simulation options
    wallets: Vec<String>,
    late: Vec<String>,
    network: Option<String>,
    config: Option<String>,
    connector: Option<String>,
    timeout_ms: Option<u64>,
    recheck_ms: Option<u64>,
    disconnect: bool,
    // Output options
    json: bool,
    pretty: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            let next = args.get(i + 1).cloned();
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--json" => opts.json = true,
                "--pretty" => opts.pretty = true,
                "--disconnect" => opts.disconnect = true,
                "--wallet" | "-w" => {
                    if let Some(value) = next {
                        opts.wallets.push(value);
                        i += 1;
                    }
                }
                "--late" | "-l" => {
                    if let Some(value) = next {
                        opts.late.push(value);
                        i += 1;
                    }
                }
                "--network" | "-n" => {
                    opts.network = next;
                    i += 1;
                }
                "--config" | "-c" => {
                    opts.config = next;
                    i += 1;
                }
                "--connector" => {
                    opts.connector = next;
                    i += 1;
                }
                "--timeout-ms" => {
                    opts.timeout_ms = next.and_then(|s| s.parse().ok());
                    i += 1;
                }
                "--recheck-ms" => {
                    opts.recheck_ms = next.and_then(|s| s.parse().ok());
                    i += 1;
                }
                _ if !arg.starts_with('-') => positional.push(arg.clone()),
                _ => {} // Ignore unknown flags
            }
            i += 1;
        }

        if !positional.is_empty() {
            opts.command = Some(positional.remove(0));
        }
        opts.positional = positional;
        opts
    }
}

fn print_usage() {
    println!(
        r#"starklink - Starknet wallet session simulator

USAGE:
    starklink <command> [args] [options]

COMMANDS:
    simulate                Detect and connect against scripted wallets
    probes                  Print the default probe list
    short <address>         Print the display form of an address

SIMULATE OPTIONS:
    --wallet, -w <spec>     Wallet present at page load (can repeat)
    --late, -l <spec>       Wallet that injects during the re-check window (can repeat)
    --network, -n <net>     Expected network: mainnet|sepolia|<chain id> (env: STARKLINK_NETWORK)
    --config, -c <path>     JSON session config
    --connector <id>        Connector to pick (default: recommended)
    --timeout-ms <ms>       Give up on a silent wallet (env: STARKLINK_CONNECT_TIMEOUT_MS)
    --recheck-ms <ms>       Late-injection window (default: 2000, env: STARKLINK_RECHECK_MS)
    --disconnect            Disconnect after connecting

WALLET SPECS:
    [slot=]id:approve[:chain[:address]]
    [slot=]id:reject
    [slot=]id:fail[:detail]
    [slot=]id:hang

OUTPUT OPTIONS:
    --json                  Raw JSON output
    --pretty                Pretty-print JSON
    --version, -V           Print version

EXAMPLES:
    # Argent X on the wrong network
    starklink simulate -w starknet_argentX=argentX:approve:SN_MAIN

    # Braavos shows up late; user rejects
    starklink simulate -l starknet_braavos=braavos:reject --recheck-ms 100

    # Wallet never answers
    starklink simulate -w starknet=keplr:hang --timeout-ms 500

LOGGING:
    RUST_LOG=debug starklink simulate ...
    STARKLINK_LOG_JSON=1 for JSON log lines
"#
    );
}

/// A parsed `--wallet` / `--late` value
struct WalletSpec {
    slot: Option<String>,
    provider: ScriptedProvider,
}

impl WalletSpec {
    fn parse(raw: &str, expected: &Network) -> Result<Self> {
        let (slot, rest) = match raw.split_once('=') {
            Some((slot, rest)) => (Some(slot.trim().to_string()), rest),
            None => (None, raw),
        };
        let mut parts = rest.splitn(4, ':');
        let id = parts.next().map(str::trim).filter(|s| !s.is_empty());
        let Some(id) = id else { bail!("wallet spec '{}' has no id", raw) };
        let behavior = parts.next().unwrap_or("approve");

        let script = match behavior {
            "approve" => {
                let chain = parts.next().filter(|s| !s.is_empty()).unwrap_or(expected.chain_id());
                let address = parts.next().filter(|s| !s.is_empty()).unwrap_or(DEFAULT_ADDRESS);
                Script::Approve(Account::new(address, Some(chain.to_string())))
            }
            "reject" => Script::Reject,
            "fail" => {
                let detail: Vec<&str> = parts.collect();
                let detail = if detail.is_empty() { "wallet error".to_string() } else { detail.join(":") };
                Script::Fail(detail)
            }
            "hang" => Script::Hang,
            other => bail!("unknown wallet behavior '{}' in '{}'", other, raw),
        };

        Ok(Self { slot, provider: ScriptedProvider::new(id, script) })
    }

    fn install(self, host: &MemoryHost) {
        let provider: Rc<dyn WalletProvider> = Rc::new(self.provider);
        match self.slot {
            Some(slot) => host.inject(&slot, provider),
            None => host.register(provider),
        }
    }
}

/// Sleeps like `TokioDelay`, injecting the late wallets first.
struct LateInjection {
    host: Rc<MemoryHost>,
    pending: RefCell<Vec<WalletSpec>>,
}

#[async_trait(?Send)]
impl Delay for LateInjection {
    async fn sleep(&self, duration: Duration) {
        let late: Vec<WalletSpec> = self.pending.borrow_mut().drain(..).collect();
        for spec in late {
            debug!(slot = ?spec.slot, "late wallet injected");
            spec.install(&self.host);
        }
        TokioDelay.sleep(duration).await;
    }
}

fn load_config(opts: &ParsedArgs) -> Result<SessionConfig> {
    let config = match &opts.config {
        Some(path) => SessionConfig::load(Path::new(path)).with_context(|| format!("loading {}", path))?,
        None => SessionConfig::default(),
    };
    let mut config = config.apply_env()?;

    if let Some(network) = &opts.network {
        config.expected_network =
            Network::from_config(network).ok_or_else(|| anyhow!("invalid network: {}", network))?;
    }
    if let Some(ms) = opts.timeout_ms {
        config.connect_timeout_ms = if ms == 0 { None } else { Some(ms) };
    }
    if let Some(ms) = opts.recheck_ms {
        config.recheck_delay_ms = ms;
    }
    Ok(config)
}

fn cmd_simulate(opts: &ParsedArgs) -> Result<Value> {
    let config = load_config(opts)?;
    info!(app = %config.app, network = %config.expected_network, "simulating wallet session");

    let host = Rc::new(MemoryHost::new());
    for raw in &opts.wallets {
        WalletSpec::parse(raw, &config.expected_network)?.install(&host);
    }
    let late = opts
        .late
        .iter()
        .map(|raw| WalletSpec::parse(raw, &config.expected_network))
        .collect::<Result<Vec<_>>>()?;

    let delay = Rc::new(LateInjection { host: host.clone(), pending: RefCell::new(late) });
    let controller = SessionController::from_config(&config, host, delay);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    rt.block_on(async {
        let connectors = controller.detect_with_recheck().await;
        let outcome = controller.connect(opts.connector.as_deref()).await;
        let connected = controller.session();
        if opts.disconnect {
            controller.disconnect().await;
        }
        let session = controller.session();

        Ok::<_, anyhow::Error>(json!({
            "connectors": serde_json::to_value(&connectors)?,
            "outcome": outcome.as_str(),
            "connected": project(&connected).short_address,
            "session": serde_json::to_value(&session)?,
            "view": serde_json::to_value(controller.view())?,
        }))
    })
}

fn cmd_probes(_opts: &ParsedArgs) -> Result<Value> {
    Ok(serde_json::to_value(default_probes())?)
}

fn cmd_short(opts: &ParsedArgs) -> Result<Value> {
    let address = opts.positional.first().ok_or_else(|| anyhow!("Address required"))?;
    Ok(json!({ "address": address, "short": starklink::session::short_address(address) }))
}
