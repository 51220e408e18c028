pub mod api;
pub mod config;
pub mod currency;
pub mod docs;
pub mod error;
pub mod ledger;
pub mod panel;
pub mod paystack;
pub mod phone;
pub mod servers;
pub mod tiers;
pub mod wallet;

use std::sync::Arc;
use tokio::sync::Mutex;

use config::Config;
use ledger::SpendingLedger;
use panel::{PanelClient, PanelError};
use paystack::{PaystackClient, PaystackError};

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("paystack client: {0}")]
    Paystack(#[from] PaystackError),
    #[error("panel client: {0}")]
    Panel(#[from] PanelError),
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub paystack: PaystackClient,
    pub panel: PanelClient,
    pub ledger: SpendingLedger,
    pub purchase_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, InitError> {
        let paystack = PaystackClient::new(
            &config.paystack_base_url,
            &config.paystack_secret_key,
            config.http_timeout,
        )?;
        let panel = PanelClient::new(&config.panel_base_url, &config.panel_api_key, config.http_timeout)?;
        let ledger = SpendingLedger::new(&config.spending_file);

        Ok(Self {
            config: Arc::new(config),
            paystack,
            panel,
            ledger,
            purchase_lock: Arc::new(Mutex::new(())),
        })
    }
}
