use crate::config::AppConfig;
use crate::services::graph::GraphApi;
use crate::store::JsonStore;

pub struct AppState {
    pub config: AppConfig,
    pub store: JsonStore,
    pub graph: Box<dyn GraphApi>,
}
