#[tokio::main]
async fn main() {
    if let Err(e) = find_my_pg::run().await {
        eprintln!("find-my-pg failed to start: {e}");
        std::process::exit(1);
    }
}
