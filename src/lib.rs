pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::db::DbPool;
use crate::error::AppResult;
use crate::services::checkin_service::CheckinService;
use crate::services::diary_service::DiaryService;
use crate::services::history_service::HistoryService;
use crate::services::progress_service::ProgressService;
use crate::services::task_service::TaskService;
use crate::services::tip_service::TipService;

/// Wires the core services over one database pool. UI collaborators
/// (screens, notification dispatchers) hold one `AppState` and call into
/// the services; every operation takes the acting user id explicitly.
#[derive(Clone)]
pub struct AppState {
    db_pool: DbPool,
    checkin_service: Arc<CheckinService>,
    task_service: Arc<TaskService>,
    progress_service: Arc<ProgressService>,
    history_service: Arc<HistoryService>,
    diary_service: Arc<DiaryService>,
    tip_service: Arc<TipService>,
}

impl AppState {
    pub fn new(db_pool: DbPool) -> AppResult<Self> {
        let progress_service = Arc::new(ProgressService::new(db_pool.clone()));
        let checkin_service = Arc::new(CheckinService::new(db_pool.clone()));
        let task_service = Arc::new(TaskService::new(
            db_pool.clone(),
            Arc::clone(&progress_service),
        ));
        let history_service = Arc::new(HistoryService::new(db_pool.clone()));
        let diary_service = Arc::new(DiaryService::new(db_pool.clone()));
        let tip_service = Arc::new(TipService::new(
            db_pool.clone(),
            Arc::clone(&progress_service),
        )?);

        Ok(Self {
            db_pool,
            checkin_service,
            task_service,
            progress_service,
            history_service,
            diary_service,
            tip_service,
        })
    }

    pub fn checkins(&self) -> Arc<CheckinService> {
        Arc::clone(&self.checkin_service)
    }

    pub fn tasks(&self) -> Arc<TaskService> {
        Arc::clone(&self.task_service)
    }

    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress_service)
    }

    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history_service)
    }

    pub fn diary(&self) -> Arc<DiaryService> {
        Arc::clone(&self.diary_service)
    }

    pub fn tips(&self) -> Arc<TipService> {
        Arc::clone(&self.tip_service)
    }

    pub fn db(&self) -> DbPool {
        self.db_pool.clone()
    }
}
