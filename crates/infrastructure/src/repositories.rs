use crate::record_store::JsonDocumentStore;
use domain::{AttendanceBook, TaskBook};
use shared::Config;
use std::path::Path;

pub type AttendanceStore = JsonDocumentStore<AttendanceBook>;
pub type TaskStore = JsonDocumentStore<TaskBook>;

/// 出勤記録とタスク記録の2つのストア
#[derive(Clone)]
pub struct RecordStores {
    pub attendance: AttendanceStore,
    pub tasks: TaskStore,
}

impl RecordStores {
    pub fn new(config: &Config) -> Self {
        Self {
            attendance: AttendanceStore::new(config.attendance_path()),
            tasks: TaskStore::new(config.tasks_path()),
        }
    }

    /// 指定ディレクトリ配下の既定ファイル名で開く
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            attendance: AttendanceStore::new(data_dir.join(shared::ATTENDANCE_FILE)),
            tasks: TaskStore::new(data_dir.join(shared::TASKS_FILE)),
        }
    }
}
