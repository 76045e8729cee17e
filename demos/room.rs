//! The room vignette: click the canon, the bible, or the desktop.
//!
//! Run with `cargo run --example room`.

fn main() {
    env_logger::init();
    diorama::room().run();
}
