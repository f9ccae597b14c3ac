use clap::Parser;
use deploy_scripts::{chain::RpcChainClient, cli::Cli, config::NetworksFile, errors::ScriptError};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    tracing_subscriber::fmt().pretty().init();

    run(Cli::parse()).await.inspect_err(|e| error!("{e}"))
}

/// Resolve the selected network and run the requested script against it
async fn run(cli: Cli) -> Result<(), ScriptError> {
    let deployments_path = cli.deployments_path();
    let poll_interval = cli.poll_interval();
    let Cli { networks, network, rpc_url, priv_key, max_polls, command, .. } = cli;

    let network = NetworksFile::load(&networks)?.resolve(
        &network,
        rpc_url.as_deref(),
        priv_key.as_deref(),
    )?;
    info!("running against network `{}` at {}", network.name, network.url);

    let client = RpcChainClient::new(&network)?.with_polling(poll_interval, max_polls);

    command.run(&client, network.allow_unlimited_contract_size, &deployments_path).await
}
