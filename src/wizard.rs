//! Step controller for the reception wizard
use super::notify::{Notification, Notifier};

/// Forward/back/jump navigation over an ordered list of steps `0..N-1`,
/// gated by per-step validity and by the completed-reception lock supplied
/// by the caller as `can_go_back = !is_reception_completed`.
#[derive(Debug)]
pub struct Wizard {
    current_step: usize,
    step_count: usize,
    show_confirm_dialog: bool,
}

impl Wizard {
    /// `step_count` must be at least 1.
    pub fn new(step_count: usize) -> Self {
        assert!(step_count > 0, "wizard needs at least one step");
        Self {
            current_step: 0,
            step_count,
            show_confirm_dialog: false,
        }
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn is_first_step(&self) -> bool {
        self.current_step == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step + 1 == self.step_count
    }

    pub fn confirm_pending(&self) -> bool {
        self.show_confirm_dialog
    }

    /// Advance one step. When a confirmation callback is supplied the wizard
    /// does not move; it raises the dialog and hands the decision to the
    /// caller (used when advancing triggers an irreversible action such as
    /// the receive submission).
    pub fn handle_next<F: FnOnce()>(&mut self, confirm: Option<F>) {
        if let Some(confirm) = confirm {
            self.show_confirm_dialog = true;
            confirm();
            return;
        }
        self.current_step = (self.current_step + 1).min(self.step_count - 1);
    }

    /// Close a pending confirmation dialog, advancing iff the operator
    /// confirmed.
    pub fn confirm_resolved(&mut self, advance: bool) {
        self.show_confirm_dialog = false;
        if advance {
            self.current_step = (self.current_step + 1).min(self.step_count - 1);
        }
    }

    /// Step back one. Blocked with a warning when `can_go_back` is false
    /// (the reception has been recorded and entry steps are locked).
    pub fn handle_previous(&mut self, can_go_back: bool, notifier: &impl Notifier) {
        if !can_go_back {
            notifier.notify(Notification::warning(
                "Reception already recorded; earlier steps are locked",
            ));
            return;
        }
        self.current_step = self.current_step.saturating_sub(1);
    }

    /// Jump to a clicked step index. Backward jumps are free except into
    /// step 0 once navigation back is locked; the immediate next step needs
    /// the current step to be valid; skipping further ahead is ignored.
    pub fn handle_step_click(&mut self, target: usize, can_navigate_back: bool, is_step_valid: bool) {
        if target >= self.step_count {
            return;
        }
        if target < self.current_step {
            if target == 0 && !can_navigate_back && self.current_step > 0 {
                return;
            }
            self.current_step = target;
            return;
        }
        if target == self.current_step + 1 && is_step_valid {
            self.current_step = target;
        }
    }
}
