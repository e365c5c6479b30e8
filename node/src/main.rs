use anyhow::Context;
use bridge::{routes, run_timer, BridgeState};
use clap::Parser;
use generator::scenario::{build_input, load_input, ScenarioConfig};
use log::{error, info};
use std::fs;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::NodeConfig;
use workflow::runner::Runner;

mod bridge;
mod generator;
mod nodes;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Radar-to-detected-object fusion node")]
struct Args {
    /// Load the node config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override node_params.update_rate_hz
    #[arg(long)]
    update_rate_hz: Option<f64>,
    /// Fuse a single frame and print a summary (the default without --serve)
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// JSON input frame for --offline; a synthetic scenario is used otherwise
    #[arg(long)]
    input: Option<PathBuf>,
    /// Seed of the synthetic scenario
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Write the offline output as JSON
    #[arg(long)]
    report: Option<PathBuf>,
    /// Serve the HTTP bridge and run the timer loop until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
}

impl Args {
    fn runs_offline(&self) -> bool {
        self.offline || !self.serve
    }
}

fn run_offline(runner: &Runner, args: &Args) -> anyhow::Result<()> {
    let input = match &args.input {
        Some(path) => load_input(path)?,
        None => build_input(&ScenarioConfig {
            seed: args.seed,
            ..Default::default()
        })?,
    };
    let output = runner.execute(&input).context("fusing offline frame")?;

    println!(
        "Offline run -> objects in {}, radars {}, objects out {}",
        input.objects.objects.len(),
        input.radars.len(),
        output.objects.objects.len()
    );
    for object in &output.objects.objects {
        let twist = &object.kinematics.twist_with_covariance.twist;
        let position = &object.kinematics.pose_with_covariance.pose.position;
        println!(
            "  ({:.2}, {:.2}) probability {:.2} twist ({:.2}, {:.2})",
            position.x,
            position.y,
            object.probability(),
            twist.linear.x,
            twist.linear.y
        );
    }

    if let Some(report_path) = &args.report {
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let report = serde_json::to_string_pretty(&output).context("encoding offline output")?;
        fs::write(report_path, report)
            .with_context(|| format!("writing report {}", report_path.display()))?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => NodeConfig::load(path)?,
        None => NodeConfig::default(),
    };
    if let Some(rate) = args.update_rate_hz {
        config.node_params.update_rate_hz = rate;
        config.validate().context("applying --update-rate-hz")?;
    }

    let runner = Runner::new(&config.fusion_params);
    info!("fusion params {:?}", runner.param()?);

    if args.runs_offline() {
        run_offline(&runner, &args)?;
    }
    if args.serve {
        let address = config.node_params.bind_address;
        let state = BridgeState::new(config, runner);
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for the fusion node")?;
        runtime.block_on(async move {
            let (bound, server) = warp::serve(routes(state.clone()))
                .try_bind_with_graceful_shutdown(address, async {
                    if let Err(err) = signal::ctrl_c().await {
                        error!("awaiting Ctrl+C failed: {}", err);
                    }
                })
                .with_context(|| format!("binding HTTP bridge on {}", address))?;
            info!("fusion node listening on {} (Ctrl+C to stop)", bound);

            let timer = tokio::spawn(run_timer(state));
            server.await;
            timer.abort();
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
