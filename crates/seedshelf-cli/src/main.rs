//! Binary entrypoint for the Seedshelf terminal client.

use std::process;

#[tokio::main]
async fn main() {
    let exit_code = seedshelf_cli::run().await;
    process::exit(exit_code);
}
