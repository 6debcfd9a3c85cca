//! chainauth-node — the authorization oracle's JSON-RPC server binary.
//!
//! Startup sequence:
//!   1. Load configuration (TOML file, overridden by CLI flags)
//!   2. Initialize tracing
//!   3. Wire the decision pipeline and receipt verifier against their
//!      collaborators
//!   4. Start the JSON-RPC 2.0 server and wait for shutdown
//!
//! Concrete `SpaceContract` / `WalletLinkContract` / `RuleEvaluator` /
//! `ChainClientRegistry` implementations that actually reach a chain are
//! explicitly out of scope (§1: "the concrete blockchain RPC clients,
//! contract ABI codecs" are external collaborators). This binary wires the
//! in-memory collaborators from `chainauth_chain::mock` so the oracle is
//! runnable end-to-end for local development; production deployments plug
//! real collaborators in at the same seam (`PipelineDeps`, `ReceiptVerifier::new`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use chainauth_cache::Caches;
use chainauth_chain::mock::{MockChainClientRegistry, MockRuleEvaluator, MockSpaceContract, MockWalletLinkContract};
use chainauth_core::ChainAuthConfig;
use chainauth_pipeline::{DecisionPipeline, PipelineDeps};
use chainauth_receipt::ReceiptVerifier;
use chainauth_rpc::{RpcServer, RpcServerState};

#[derive(Parser, Debug)]
#[command(
    name = "chainauth-node",
    version,
    about = "chainauth authorization oracle — JSON-RPC server"
)]
struct Args {
    /// Path to a TOML config file (§6 Configuration). Unset fields fall
    /// back to the built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON-RPC listen address.
    #[arg(long, default_value = "127.0.0.1:8645")]
    rpc_addr: SocketAddr,

    /// Override `linkedWalletsLimit` from the config file.
    #[arg(long)]
    linked_wallets_limit: Option<usize>,

    /// Override `contractCallsTimeoutMs` from the config file.
    #[arg(long)]
    contract_calls_timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chainauth=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    info!("chainauth oracle starting");

    let config = load_config(&args)?;

    // ── Caches (C1) ───────────────────────────────────────────────────────────
    let caches = Caches::new(&config);

    // ── Collaborators (§6) ───────────────────────────────────────────────────
    // See the module doc comment: these are the mock, in-memory doubles;
    // real deployments supply live chain clients at this same seam.
    info!("wiring in-memory mock collaborators — replace with live chain clients for production use");
    let space_contract = Arc::new(MockSpaceContract::new());
    let wallet_link_contract = Arc::new(MockWalletLinkContract::new());
    let rule_evaluator = Arc::new(MockRuleEvaluator);
    let chain_client_registry = Arc::new(MockChainClientRegistry::new());

    // ── Decision pipeline (C2-C7) ────────────────────────────────────────────
    let pipeline_deps = PipelineDeps {
        space_contract,
        wallet_link_contract: Some(wallet_link_contract),
        rule_evaluator,
    };
    let pipeline = Arc::new(DecisionPipeline::new(pipeline_deps, &caches, &config));

    // ── Receipt verifier (C8) ────────────────────────────────────────────────
    let receipt_verifier = Arc::new(ReceiptVerifier::new(chain_client_registry));

    // ── RPC server ────────────────────────────────────────────────────────────
    let rpc_state = Arc::new(RpcServerState {
        pipeline,
        receipt_verifier,
    });
    let rpc_handle = RpcServer::new(rpc_state)
        .start(args.rpc_addr)
        .await
        .context("starting RPC server")?;

    info!("chainauth oracle ready");
    tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
    info!("shutting down");
    rpc_handle.stop().ok();

    Ok(())
}

/// Load configuration from `--config`, falling back to defaults, then apply
/// the CLI overrides on top (§6 Configuration).
fn load_config(args: &Args) -> anyhow::Result<ChainAuthConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config from {}", path.display()))?;
            toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ChainAuthConfig::default(),
    };

    if let Some(limit) = args.linked_wallets_limit {
        config.linked_wallets_limit = limit;
    }
    if let Some(timeout) = args.contract_calls_timeout_ms {
        config.contract_calls_timeout_ms = timeout;
    }

    Ok(config)
}
