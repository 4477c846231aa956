//! Command line stand-ins for the browser.

use dashpage_core::Navigator;

/// Prints URLs instead of opening them.
#[derive(Debug, Default)]
pub struct StdoutNavigator;

impl Navigator for StdoutNavigator {
    fn open_in_new_context(&mut self, url: &str) {
        println!("open {url}");
    }
}
