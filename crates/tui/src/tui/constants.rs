use std::time::Duration;

pub(crate) const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub(crate) const TICK_RATE: Duration = Duration::from_millis(200);
pub(crate) const STATUS_TTL: Duration = Duration::from_secs(5);

pub(crate) const STATUS_LOADING: &str = "Loading tasks…";
pub(crate) const STATUS_ENTER_DATE: &str =
    "Show tasks due on a day: YYYY-MM-DD • empty Enter clears • Esc cancels";
pub(crate) const STATUS_INVALID_DATE: &str = "Invalid date, expected YYYY-MM-DD";
pub(crate) const STATUS_NO_SELECTION: &str = "No task selected";
pub(crate) const STATUS_TOGGLE_PENDING: &str = "Still saving the previous change to this task";
pub(crate) const STATUS_CONFIRM_DELETE: &str = "Confirm deletion — y/Enter deletes, n/Esc keeps";
