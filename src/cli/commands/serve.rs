//! kata serve - Run the practice API server

use clap::Args;
use tracing::info;

use crate::app::AppContext;
use crate::error::Result;
use crate::server;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address (overrides config)
    #[arg(long, value_name = "ADDR")]
    pub addr: Option<String>,
}

pub fn run(ctx: &AppContext, args: &ServeArgs) -> Result<()> {
    let addr = args
        .addr
        .clone()
        .unwrap_or_else(|| ctx.config.server.addr.clone());

    info!(%addr, db = %ctx.kata_root.join("kata.db").display(), "starting server");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::serve(&addr, ctx.store.clone(), ctx.config.clone()))
}
