use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use pretty_assertions::assert_eq;

use super::*;

#[derive(Default)]
struct CountingControl {
    setup_calls: AtomicUsize,
}

impl WaitControl for CountingControl {
    fn setup_complete(&self) {
        self.setup_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn confirm(&self) {}

    fn reject(&self) {}
}

fn spec() -> SurfaceSpec {
    SurfaceSpec {
        show_bad_countdown: true,
        show_good_countdown: false,
        click_through: false,
        show_value: true,
        action_text: None,
        expectation_lines: 1,
    }
}

#[test]
fn null_surface_completes_setup_on_attach() {
    let control = Arc::new(CountingControl::default());
    let surface = NullSurface;

    surface.attach(&spec(), control.clone());

    assert_eq!(control.setup_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn null_surface_ignores_notifications() {
    let surface = NullSurface;
    surface.value_changed("42");
    surface.truth_changed(true);
    surface.tick(None, Some(Duration::from_secs(1)));
    surface.close();
}
