use kalkops::{Config, run};
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> anyhow::Result<()> {
    // Lets a local .env provide RUST_LOG and friends before config loads.
    dotenvy::dotenv().ok();

    let threads = Config::load()?.general.worker_threads;

    let mut runtime = tokio::runtime::Builder::new_multi_thread();
    runtime.enable_all();
    if threads > 0 {
        runtime.worker_threads(threads);
    }

    runtime.build()?.block_on(run())
}
