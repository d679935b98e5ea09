//! Task results and lifecycle status

/// Task-specific code explaining a failure
pub type ExitCode = u8;

/// Outcome of one supervisory tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskResult {
    /// The task reached its goal
    Success,
    /// The task cannot continue
    Failure(ExitCode),
    /// The task keeps running
    InProgress,
}

impl TaskResult {
    pub const fn success() -> Self {
        Self::Success
    }

    pub const fn failure(code: ExitCode) -> Self {
        Self::Failure(code)
    }

    pub const fn in_progress() -> Self {
        Self::InProgress
    }

    /// Check whether this result ends the task's lifecycle
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskResult::InProgress)
    }
}

/// Lifecycle status of a task
///
/// Monotonic: once `Finished` or `Failed`, the status never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskStatus {
    Running,
    Finished,
    Failed(ExitCode),
}

/// Encoded form of "no task" in [`TaskStatus::encode_slot`]
const NO_TASK: u16 = 0xFFFF;
const FAILED_TAG: u16 = 0x0100;

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Running)
    }

    /// Status after a tick returned `result`
    ///
    /// Terminal statuses are sticky.
    pub fn after(self, result: TaskResult) -> Self {
        match (self, result) {
            (TaskStatus::Running, TaskResult::Success) => TaskStatus::Finished,
            (TaskStatus::Running, TaskResult::Failure(code)) => TaskStatus::Failed(code),
            (status, _) => status,
        }
    }

    /// Pack an optional status into a word for lock-free publication
    pub const fn encode_slot(status: Option<TaskStatus>) -> u16 {
        match status {
            None => NO_TASK,
            Some(TaskStatus::Running) => 0,
            Some(TaskStatus::Finished) => 1,
            Some(TaskStatus::Failed(code)) => FAILED_TAG | code as u16,
        }
    }

    /// Inverse of [`TaskStatus::encode_slot`]
    pub fn decode_slot(word: u16) -> Option<TaskStatus> {
        match word {
            0 => Some(TaskStatus::Running),
            1 => Some(TaskStatus::Finished),
            w if w & 0xFF00 == FAILED_TAG => Some(TaskStatus::Failed(w as u8)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_results() {
        assert!(TaskResult::success().is_terminal());
        assert!(TaskResult::failure(3).is_terminal());
        assert!(!TaskResult::in_progress().is_terminal());
    }

    #[test]
    fn test_status_transitions() {
        let s = TaskStatus::Running;
        assert_eq!(s.after(TaskResult::InProgress), TaskStatus::Running);
        assert_eq!(s.after(TaskResult::Success), TaskStatus::Finished);
        assert_eq!(s.after(TaskResult::Failure(9)), TaskStatus::Failed(9));
    }

    #[test]
    fn test_status_is_monotonic() {
        let finished = TaskStatus::Finished;
        assert_eq!(finished.after(TaskResult::Failure(1)), TaskStatus::Finished);
        assert_eq!(finished.after(TaskResult::InProgress), TaskStatus::Finished);

        let failed = TaskStatus::Failed(1);
        assert_eq!(failed.after(TaskResult::Success), TaskStatus::Failed(1));
        assert_eq!(failed.after(TaskResult::Failure(2)), TaskStatus::Failed(1));
    }

    #[test]
    fn test_slot_encoding() {
        let slots = [
            None,
            Some(TaskStatus::Running),
            Some(TaskStatus::Finished),
            Some(TaskStatus::Failed(0)),
            Some(TaskStatus::Failed(255)),
        ];
        for slot in slots {
            assert_eq!(TaskStatus::decode_slot(TaskStatus::encode_slot(slot)), slot);
        }
    }
}
