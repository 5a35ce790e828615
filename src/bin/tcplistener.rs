use std::net::Ipv4Addr;

use anyhow::Context;
use httpfromtcp::ServerConfig;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env().context("load config")?;
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.port))
        .await
        .with_context(|| format!("bind port {}", config.port))?;
    log::info!("listening on {}", listener.local_addr()?);

    loop {
        let (mut stream, peer) = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    log::warn!("accept failed: {e}");
                    continue;
                }
            },
        };
        log::info!("accepted connection from {peer}");

        let decoded = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            decoded = httpfromtcp::decode_with_config(&mut stream, &config.decoder) => decoded,
        };
        match decoded {
            Ok(request) => {
                let line = request.request_line();
                println!("Request line:");
                println!("- Method: {}", line.method());
                println!("- Target: {}", line.target());
                println!("- Version: {}", line.http_version());
                println!("Headers:");
                for (name, value) in request.headers().iter() {
                    println!("- {name}: {value}");
                }
            }
            Err(e) => log::warn!("bad request from {peer}: {e}"),
        }

        log::info!("connection to {peer} closed");
    }
    Ok(())
}
