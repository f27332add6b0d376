use clap::Parser;
use log::{error, info};
use std::sync::Arc;

use matterbridge_supervisor::cli::Cli;
use matterbridge_supervisor::config::load_dotenv;
use matterbridge_supervisor::frontend::NullFrontend;
use matterbridge_supervisor::supervisor::Supervisor;

#[tokio::main]
async fn main() {
    load_dotenv();
    let cli = Cli::parse();

    // No UI transport is part of this crate (§1 Non-goals) — every
    // snackbar/refresh/attribute-changed notification is discarded. A real
    // deployment wires its own `Frontend` impl in here.
    let frontend: Arc<dyn matterbridge_supervisor::frontend::Frontend> = Arc::new(NullFrontend);

    let supervisor = match Supervisor::bootstrap(cli, frontend).await {
        Ok(Some(supervisor)) => supervisor,
        Ok(None) => return,
        Err(e) => {
            error!("failed to initialize supervisor: {e}");
            std::process::exit(1);
        }
    };

    info!("supervisor initialized, state = {:?}", supervisor.state());

    if let Err(e) = supervisor.run().await {
        error!("supervisor run failed: {e}");
        std::process::exit(1);
    }

    // The SIGINT/SIGTERM handlers registered during bootstrap each drive a
    // `cleanup` sequence to completion; once it reaches `Terminated` there
    // is nothing left for this process to do.
    supervisor.wait_until_terminated().await;
}
