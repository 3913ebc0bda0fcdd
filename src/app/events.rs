//! Event processing from backend

use super::MurmurApp;
use crate::events;

impl MurmurApp {
    pub fn process_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            for action in events::process_single_event(&mut self.state, event) {
                self.dispatch(action);
            }
        }
    }
}
