//! src/main.rs
//!
//! Entrypoint delegating to `app::run()`.

mod app;
mod game;
mod logging;
mod net;
mod panels;
mod program;
mod ui;
mod world;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    app::run()
}
