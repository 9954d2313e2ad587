//! Container entrypoint: starts the voice worker in the background, runs the
//! web gateway in the foreground and exits with the gateway's status.

use clap::Parser;
use tracing::info;

use helpline::launcher::{supervise, CommandSpec, StartupPlan};

#[derive(Parser, Debug)]
#[command(name = "helpline-launcher", about = "Two-process startup launcher")]
struct Args {
    /// Voice worker binary (background task).
    #[arg(long, env = "HELPLINE_AGENT_BIN", default_value = "helpline-agent")]
    agent_bin: String,

    /// Web gateway binary (foreground task).
    #[arg(long, env = "HELPLINE_GATEWAY_BIN", default_value = "helpline-gateway")]
    gateway_bin: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    helpline::logging::init_tracing(false);

    let plan = StartupPlan {
        background: CommandSpec::new(args.agent_bin),
        foreground: CommandSpec::new(args.gateway_bin),
    };

    info!(
        "Launching {} (background) then {} (foreground)",
        plan.background.program, plan.foreground.program
    );

    let code = supervise(&plan).await;
    std::process::exit(code);
}
