use rpc_dispatch::shared::LoggingUtils;
use rpc_dispatch::{AppConfig, AppResult, HttpServer, RequestContext, ServiceDescriptor};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Operands of a binary arithmetic call
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Args {
    #[serde(rename = "A")]
    a: i64,
    #[serde(rename = "B")]
    b: i64,
}

#[derive(Debug, Default, Serialize)]
struct Quotient {
    #[serde(rename = "Quo")]
    quo: i64,
    #[serde(rename = "Rem")]
    rem: i64,
}

/// Demonstration service
struct Arith;

impl Arith {
    fn multiply(&self, ctx: &RequestContext, args: &Args, reply: &mut i64) -> anyhow::Result<()> {
        debug!(request_id = %ctx.request_id, "multiply");
        *reply = args
            .a
            .checked_mul(args.b)
            .ok_or_else(|| anyhow::anyhow!("multiplication overflow"))?;
        Ok(())
    }

    fn divide(&self, ctx: &RequestContext, args: &Args, reply: &mut Quotient) -> anyhow::Result<()> {
        debug!(request_id = %ctx.request_id, "divide");
        if args.b == 0 {
            anyhow::bail!("divide by zero");
        }
        reply.quo = args
            .a
            .checked_div(args.b)
            .ok_or_else(|| anyhow::anyhow!("division overflow"))?;
        reply.rem = args.a.wrapping_rem(args.b);
        Ok(())
    }
}

fn build_server(config: AppConfig) -> AppResult<HttpServer<Arith>> {
    let mut builder = ServiceDescriptor::builder(Arith)
        .method("Multiply", Arith::multiply)
        .method("Divide", Arith::divide);
    if let Some(name) = &config.rpc.service_name {
        builder = builder.name(name.clone());
    }

    HttpServer::from_config(config, builder.build()?)
}

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    if let Err(e) = LoggingUtils::initialize(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }
    info!("Configuration loaded successfully");

    let server = match build_server(config) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to initialize server: {}", e);
            std::process::exit(1);
        }
    };

    info!("Server starting on {}", server.config().socket_addr());

    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
