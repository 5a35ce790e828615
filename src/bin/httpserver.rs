use anyhow::Context;
use httpfromtcp::http::StatusCode;
use httpfromtcp::{HandlerError, Request, Server, ServerConfig};

fn handler(request: &Request, body: &mut Vec<u8>) -> Result<(), HandlerError> {
    match request.request_line().target() {
        "/yourproblem" => Err(HandlerError::new(
            StatusCode::BadRequest,
            "Your problem is not my problem\n",
        )),
        "/myproblem" => Err(HandlerError::new(
            StatusCode::InternalServerError,
            "Woopsie, my bad!\n",
        )),
        _ => {
            body.extend_from_slice(b"All good, frfr\n");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env().context("load server config")?;
    let server = Server::serve(config, handler).await?;
    log::info!("server started on port {}", server.local_addr().port());

    tokio::signal::ctrl_c()
        .await
        .context("wait for shutdown signal")?;
    server.close().await?;
    log::info!("server gracefully stopped");
    Ok(())
}
