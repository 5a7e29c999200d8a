use std::sync::Arc;
use crate::{
    config::Settings,
    payments::PayHereGateway,
    service::ServiceContext,
};

#[derive(Clone)]
pub struct AppState {
    pub service_context: Arc<ServiceContext>,
    pub gateway: Option<Arc<PayHereGateway>>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        service_context: Arc<ServiceContext>,
        gateway: Option<Arc<PayHereGateway>>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            service_context,
            gateway,
            settings,
        }
    }
}
