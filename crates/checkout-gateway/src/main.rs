//! # Checkout Widget Demo
//!
//! Opens the embeddable gateway against a running backend and walks a
//! scripted UPI payment through the checkout session.
//!
//! ## Usage
//!
//! ```bash
//! # Point at the backend and pick an order
//! export CHECKOUT_API_URL=http://localhost:8000/api/v1
//!
//! checkout-widget order_Nxa93k
//! ```

use checkout_client::BackendClient;
use checkout_core::{MethodPayload, PaymentMethod};
use checkout_gateway::{CheckoutGateway, GatewayConfig, LoggingGatewayEvents};
use checkout_session::ViewState;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let order_id = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("ORDER_ID").ok())
        .ok_or_else(|| anyhow::anyhow!("Usage: checkout-widget <order_id> (or set ORDER_ID)"))?;

    let api = Arc::new(BackendClient::from_env()?);
    let config = GatewayConfig::from_env();

    info!("Backend: {}", api.config().api_base_url);
    info!("Checkout origin: {}", config.checkout_origin);

    let handle = CheckoutGateway::new(order_id, api, Arc::new(LoggingGatewayEvents))
        .with_config(&config)
        .open();

    let mut driver = handle
        .driver()
        .ok_or_else(|| anyhow::anyhow!("frame closed before it could be driven"))?;

    // Scripted walkthrough: pay by UPI with the demo VPA
    let vpa = std::env::var("DEMO_VPA").unwrap_or_else(|_| "demo@upi".to_string());

    let snapshot = driver
        .wait_for(|s| !matches!(s.view, ViewState::Loading))
        .await?;
    if let Some(order) = snapshot.order {
        info!(
            "Order {}: {} {}",
            order.id,
            order.display_amount(),
            order.currency
        );
        driver.select_method(PaymentMethod::Upi).await?;
        driver.submit(MethodPayload::upi(vpa)).await?;
        info!("Submitted; waiting for the bank...");
    }

    let outcome = driver.wait_for(|s| s.view.is_terminal()).await?;
    match outcome.view {
        ViewState::Success { payment } => {
            info!("✅ Payment {} confirmed", payment.id);
            driver.finish().await.ok();
        }
        ViewState::Error { message } => {
            info!("❌ Payment failed: {}", message);
            driver.cancel().await.ok();
        }
        _ => {}
    }

    handle.closed().await;
    info!("Widget closed");

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  💳 Checkout Widget RS 💳
  ━━━━━━━━━━━━━━━━━━━━━━━━
  Embeddable payment checkout
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
