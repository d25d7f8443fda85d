use rpcload_runtime::RpcLoadRuntime;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rpcload=info,rpcload_runtime=info")),
        )
        .init();

    let summaries = RpcLoadRuntime::new().with_args()?.run().await?;
    for summary in &summaries {
        println!("{summary}");
    }
    Ok(())
}
