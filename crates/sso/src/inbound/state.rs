use std::sync::Arc;

use app_core::config::Config;

use crate::usecase::sso::SsoUseCase;

#[derive(Clone)]
pub struct SsoState {
    pub config: Arc<Config>,
    pub sso: Arc<dyn SsoUseCase>,
}

impl SsoState {
    pub fn new(config: Arc<Config>, sso: Arc<dyn SsoUseCase>) -> Self {
        Self { config, sso }
    }
}
