//! Example custom handler with sample functions.
//!
//! Run `custom-handler manifests` to print the `function.json` document of
//! every sample function.

use custom_handler::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Greets the caller by name.
struct HelloFunction;

#[async_trait]
impl Function<HttpTrigger> for HelloFunction {
    async fn run(&self, ctx: &mut Context, req: HttpTrigger) -> Result<(), FunctionError> {
        let name = req
            .query
            .get("name")
            .cloned()
            .unwrap_or_else(|| "World".to_string());

        let counter = ctx
            .service::<AtomicU64>("counter")
            .ok_or_else(|| FunctionError::new("counter service missing"))?;
        let count = counter.fetch_add(1, Ordering::SeqCst) + 1;

        let body = serde_json::json!({
            "message": format!("Hello, {}!", name),
            "method": req.method,
            "invocation": ctx.invocation_id().to_string(),
            "count": count,
        });

        ctx.log(format!("greeted {}", name));
        let http = ctx.output.http();
        http.set_header("Content-Type", "application/json");
        http.write(serde_json::to_vec(&body)?);
        Ok(())
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct Order {
    id: String,
    quantity: u32,
}

fn copy_order(ctx: &mut Context, trigger: QueueTrigger) -> Result<(), FunctionError> {
    let order: Order = trigger.parse()?;
    if order.quantity == 0 {
        return Err(FunctionError::with_code(400, "order has no items"));
    }

    ctx.output.binding("processed").write_json(&order)?;
    ctx.output.set_return_value(order.id.clone());
    Ok(())
}

fn tick(ctx: &mut Context, trigger: TimerTrigger) -> Result<(), FunctionError> {
    if trigger.is_past_due {
        ctx.log("timer is running late");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let registry = FunctionRegistry::builder()
        .service("counter", AtomicU64::new(0))
        .function(
            FunctionDefinition::http("hello", HelloFunction).with_output(HttpOutput::new()),
        )?
        .function(
            FunctionDefinition::queue("copy-order", "order", handler_fn(copy_order))
                .with_output(GenericOutput::queue("processed")),
        )?
        .function(FunctionDefinition::timer("tick", handler_fn(tick)))?
        .build()?;

    if std::env::args().nth(1).as_deref() == Some("manifests") {
        for (name, manifest) in registry.manifests() {
            println!("{}/function.json\n{}", name, manifest.to_json_pretty()?);
        }
        return Ok(());
    }

    let config = HandlerConfig::from_env()?;
    tracing::info!("Starting custom handler on {}", config.bind_addr());
    FunctionApp::new(config, registry).run().await?;
    Ok(())
}
