use crate::auth::Authenticator;
use crate::config::UiConfig;
use crate::storage::HabitStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HabitStore>,
    pub auth: Arc<Authenticator>,
    pub ui: Arc<UiConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn HabitStore>, auth: Authenticator, ui: UiConfig) -> Self {
        Self {
            store,
            auth: Arc::new(auth),
            ui: Arc::new(ui),
        }
    }
}
