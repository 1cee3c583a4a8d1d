use std::sync::Arc;

use crate::db::{DbPool, OrmConn};
use crate::mailer::Mailer;
use crate::storage::StorageClient;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub storage: Arc<dyn StorageClient>,
    pub mailer: Arc<dyn Mailer>,
}
