#[tokio::main]
async fn main() {
    gymclass_backend::run().await;
}
