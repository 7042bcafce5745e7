use ratatui::Frame;

use crate::app::{App, Screen};
use crate::ui::{counter::render_counter, history::render_history};

/// A UI screen boundary: responsible for drawing one `Screen`
pub trait ScreenView {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Counter screen - stopwatches, total, keypad and the confirm dialog
pub struct CounterScreen;

impl ScreenView for CounterScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let area = f.area();
        render_counter(app, area, f.buffer_mut());
    }
}

/// History screen - summary and the stored session table
pub struct HistoryScreen;

impl ScreenView for HistoryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let area = f.area();
        render_history(app, area, f.buffer_mut());
    }
}

/// Helper to construct the view for the current screen
pub fn current_screen(screen: Screen) -> Box<dyn ScreenView> {
    match screen {
        Screen::Counter => Box::new(CounterScreen),
        Screen::History => Box::new(HistoryScreen),
    }
}
