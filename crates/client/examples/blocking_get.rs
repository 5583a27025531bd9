use std::time::Duration;

use ferry_binding::{Body, HttpConfig, Message};
use ferry_client::HttpEndpoint;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

// cargo run --example blocking_get -- https://example.org/
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let target = std::env::args().nth(1).unwrap_or_else(|| "https://example.org/".to_owned());

    let mut config = HttpConfig::parse(&target)?;
    config.set_response_timeout(Duration::from_secs(10));

    let endpoint = HttpEndpoint::builder(config).build()?;
    let producer = endpoint.blocking_producer()?;

    let mut message = Message::new();
    producer.send(&mut message)?;

    println!(
        "{} {}",
        message.header("Ferry-Http-Response-Code").unwrap_or("?"),
        message.header("Ferry-Http-Response-Text").unwrap_or(""),
    );
    for (name, value) in message.headers().iter() {
        println!("{}: {}", name.as_str(), value.first().unwrap_or(""));
    }

    if let Body::Stream(stream) = message.take_body() {
        let bytes = futures::executor::block_on(stream.collect())?;
        println!("\nbody: {} bytes", bytes.len());
    }
    Ok(())
}
