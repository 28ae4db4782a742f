//! End-to-end tests over real TCP sockets.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use quill::handler::Handler;
use quill::http::request::Request;
use quill::http::response::Response;
use quill::server::Server;
use quill::server::shutdown;

async fn exchange(addr: std::net::SocketAddr, chunks: &[&[u8]]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    for chunk in chunks {
        stream.write_all(chunk).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    response
}

fn echo_uri() -> Arc<dyn Handler> {
    Arc::new(|req: &Request| Response::ok(req.uri.clone(), "text/plain"))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_serves_concurrent_connections() {
    let server = Server::bind("127.0.0.1:0".parse().unwrap(), echo_uri()).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (trigger, signal) = shutdown::channel();
    let serving = tokio::spawn(server.serve(signal));

    let clients: Vec<_> = (0..8)
        .map(|i| {
            tokio::spawn(async move {
                let request = format!("GET /item/{i} HTTP/1.0\r\nHost: test\r\n\r\n");
                let (head, tail) = request.as_bytes().split_at(10);
                exchange(addr, &[head, tail]).await
            })
        })
        .collect();

    for (i, client) in clients.into_iter().enumerate() {
        let response = client.await.unwrap();
        assert!(response.starts_with(b"HTTP/1.0 200 Ok\r\n"));
        assert!(response.ends_with(format!("/item/{i}").as_bytes()));
    }

    trigger.trigger();
    serving.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_malformed_request_over_tcp() {
    let server = Server::bind("127.0.0.1:0".parse().unwrap(), echo_uri()).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (trigger, signal) = shutdown::channel();
    let serving = tokio::spawn(server.serve(signal));

    let response = exchange(addr, &[b"GARBAGE\r\n\r\n"]).await;
    assert!(response.starts_with(b"HTTP/1.0 400 Bad Request\r\n"));

    trigger.trigger();
    serving.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let server = Server::bind("127.0.0.1:0".parse().unwrap(), echo_uri()).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (trigger, signal) = shutdown::channel();
    let serving = tokio::spawn(server.serve(signal));

    trigger.trigger();
    serving.await.unwrap().unwrap();

    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_stalled_connection_is_aborted_after_grace() {
    let server = Server::bind("127.0.0.1:0".parse().unwrap(), echo_uri())
        .await
        .unwrap()
        .with_shutdown_grace(Duration::from_millis(50));
    let addr = server.local_addr().unwrap();
    let (trigger, signal) = shutdown::channel();
    let serving = tokio::spawn(server.serve(signal));

    // never finishes its request line
    let mut stalled = TcpStream::connect(addr).await.unwrap();
    stalled.write_all(b"GET /slow").await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    trigger.trigger();
    tokio::time::timeout(Duration::from_secs(5), serving)
        .await
        .expect("serve should return after the grace period")
        .unwrap()
        .unwrap();

    let mut rest = Vec::new();
    let n = stalled.read_to_end(&mut rest).await.unwrap_or(0);
    assert_eq!(n, 0);
}

#[tokio::test]
async fn test_bind_conflict_is_an_error() {
    let first = Server::bind("127.0.0.1:0".parse().unwrap(), echo_uri()).await.unwrap();
    let addr = first.local_addr().unwrap();

    assert!(Server::bind(addr, echo_uri()).await.is_err());
}
