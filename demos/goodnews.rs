//! The goodnews vignette: click the letter on the desk to read it.
//!
//! Run with `cargo run --example goodnews`.

fn main() {
    env_logger::init();
    diorama::goodnews().run();
}
