use crate::clock::Clock;
use crate::models::WeeklyLedgerState;
use crate::service::LedgerService;
use crate::storage::KeyValueStore;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type SharedStore = Arc<dyn KeyValueStore>;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LedgerService<SharedStore>>,
    pub ledger: Arc<Mutex<WeeklyLedgerState>>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(service: LedgerService<SharedStore>, clock: Arc<dyn Clock>) -> Self {
        let ledger = service.load(clock.now());
        Self {
            service: Arc::new(service),
            ledger: Arc::new(Mutex::new(ledger)),
            clock,
        }
    }
}
