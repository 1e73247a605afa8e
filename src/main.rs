mod app;
mod audio;
mod config;
mod error;
mod library;
mod metadata;
mod mpris;
mod pairing;
mod runtime;
mod ui;
mod volumes;
mod watchdog;

#[cfg(test)]
mod testing;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
