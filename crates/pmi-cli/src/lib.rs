//! Terminal front end for PM Insight Copilot

mod history;
mod session;
mod ui;

pub use history::{export_path, export_report, AnalysisHistory, HistoryEntry, HISTORY_CAPACITY};
pub use session::SessionCommand;
pub use ui::{
    display_banner, handle_input_with_history, print_help, render_error, render_history,
    render_outcome, render_warnings,
};

// Re-export core types
pub use pmi_core::{Error, Result};
