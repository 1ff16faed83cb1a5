use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::events::{register_handlers, InProcessEventBus, Notifier};
use crate::parameters::{ParameterKeys, ParameterStore};
use crate::telegram::BotApi;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub parameters: Arc<dyn ParameterStore>,
    pub notifier: Arc<Notifier>,
    pub bus: Arc<InProcessEventBus>,
    pub start_time: Instant,
}

impl AppState {
    /// Wire the notifier and register the event handlers on a fresh bus.
    pub fn new(settings: Settings, parameters: Arc<dyn ParameterStore>, api: Arc<dyn BotApi>) -> Self {
        let keys = ParameterKeys::from_settings(&settings.parameters);
        let notifier = Arc::new(Notifier::new(parameters.clone(), api, keys));
        let bus = Arc::new(InProcessEventBus::new());
        register_handlers(bus.as_ref(), notifier.clone(), &settings.dispatch);

        Self {
            settings: Arc::new(settings),
            parameters,
            notifier,
            bus,
            start_time: Instant::now(),
        }
    }
}
