use basinwx_uploader::cli::{run, Cli};
use basinwx_uploader::error::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
