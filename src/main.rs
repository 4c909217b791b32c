#[tokio::main]
async fn main() {
    bites::start_server().await;
}
