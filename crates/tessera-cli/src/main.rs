// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Tessera binary: provision a shared-volume workload and wait for it to run.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tessera_config::{LoggingConfig, TesseraConfig};
use tessera_k8s::{ClusterClient, KubeClient};
use tessera_provisioner::{Orchestrator, PodLister};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod plan;

use plan::Overrides;

/// Tessera - shared-volume workload provisioning for Kubernetes.
#[derive(Parser, Debug)]
#[command(
	name = "tessera",
	about = "Provision a shared-volume workload and wait for it to converge",
	version
)]
struct Args {
	/// Config file (default: /etc/tessera/tessera.toml if present)
	#[arg(long, global = true, env = "TESSERA_CONFIG")]
	config: Option<PathBuf>,

	/// Target namespace, overriding configuration
	#[arg(long, global = true)]
	namespace: Option<String>,

	/// Log filter directive (RUST_LOG still wins)
	#[arg(long, global = true)]
	log_level: Option<String>,

	/// Emit logs as JSON
	#[arg(long, global = true)]
	json_logs: bool,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Create the claim and workload, wait for readiness, then list and update (default)
	Run(RunArgs),
	/// List pod names in the namespace
	Pods,
}

#[derive(ClapArgs, Debug, Default)]
struct RunArgs {
	/// Give up waiting for readiness after this many seconds
	#[arg(long)]
	timeout_secs: Option<u64>,

	/// Do not update the workload after it is ready
	#[arg(long)]
	skip_update: bool,

	/// Do not list pods after the workload is ready
	#[arg(long)]
	no_list: bool,
}

fn init_tracing(logging: &LoggingConfig) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
	let registry = tracing_subscriber::registry().with(filter);
	if logging.json {
		registry.with(tracing_subscriber::fmt::layer().json()).init();
	} else {
		registry.with(tracing_subscriber::fmt::layer()).init();
	}
}

fn load(args: &Args, run: &RunArgs) -> anyhow::Result<TesseraConfig> {
	let mut config = match &args.config {
		Some(path) => tessera_config::load_config_with_file(path)
			.with_context(|| format!("loading configuration from {}", path.display()))?,
		None => tessera_config::load_config().context("loading configuration")?,
	};

	Overrides {
		namespace: args.namespace.clone(),
		log_level: args.log_level.clone(),
		json_logs: args.json_logs,
		timeout_secs: run.timeout_secs,
		skip_update: run.skip_update,
	}
	.apply(&mut config)?;

	Ok(config)
}

/// Cancel `token` on Ctrl-C.
fn cancel_on_interrupt(token: CancellationToken) {
	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			tracing::warn!("Interrupt received, cancelling");
			token.cancel();
		}
	});
}

async fn run(
	client: Arc<dyn ClusterClient>,
	config: &TesseraConfig,
	list_pods: bool,
) -> anyhow::Result<()> {
	let cancel = CancellationToken::new();
	cancel_on_interrupt(cancel.clone());

	let orchestrator = Orchestrator::new(client, plan::provisioner_config(config));
	let report = orchestrator
		.run(&plan::provision_plan(config, list_pods), &cancel)
		.await
		.context("provisioning run failed")?;

	println!(
		"{} and {} ready: {} pod(s) running",
		report.claim_name, report.workload_name, report.ready_pods
	);
	for name in &report.pod_names {
		println!("{name}");
	}
	if report.updated {
		println!("{} updated", report.workload_name);
	}
	Ok(())
}

async fn pods(client: Arc<dyn ClusterClient>, namespace: &str) {
	for name in PodLister::new(client).list(namespace).await {
		println!("{name}");
	}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	dotenvy::dotenv().ok();

	let args = Args::parse();

	let default_run = RunArgs::default();
	let run_args = match &args.command {
		Some(Command::Run(run)) => run,
		_ => &default_run,
	};
	let config = load(&args, run_args)?;
	init_tracing(&config.logging);
	config.log_summary();

	let connection = plan::connection(&config.cluster);
	tracing::info!(
		mode = %connection,
		namespace = %config.workload.namespace,
		"starting tessera"
	);

	let client: Arc<dyn ClusterClient> = Arc::new(
		KubeClient::connect(&connection)
			.await
			.with_context(|| format!("connecting to cluster ({connection})"))?,
	);

	match &args.command {
		Some(Command::Pods) => pods(client, &config.workload.namespace).await,
		_ => run(client, &config, !run_args.no_list).await?,
	}

	Ok(())
}
