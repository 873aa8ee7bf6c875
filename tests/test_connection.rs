use reqecho::config::Config;
use reqecho::http::connection::Connection;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};
use tokio::task::JoinHandle;

fn spawn_connection(cfg: Config) -> (DuplexStream, JoinHandle<anyhow::Result<usize>>) {
    let (client, server) = duplex(64 * 1024);
    let handle = tokio::spawn(async move {
        let mut conn = Connection::new(server, &cfg);
        conn.run().await?;
        Ok(conn.responses())
    });
    (client, handle)
}

/// Reads one response, using its Content-Length to find the end.
async fn read_response(client: &mut DuplexStream) -> (String, String) {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    while !buf.ends_with(b"\r\n\r\n") {
        client.read_exact(&mut byte).await.unwrap();
        buf.push(byte[0]);
    }
    let head = String::from_utf8(buf).unwrap();
    let len: usize = head
        .lines()
        .find_map(|l| l.strip_prefix("Content-Length: "))
        .unwrap()
        .parse()
        .unwrap();

    let mut body = vec![0u8; len];
    client.read_exact(&mut body).await.unwrap();
    (head, String::from_utf8(body).unwrap())
}

#[tokio::test]
async fn test_single_request_gets_echo_page() {
    let (mut client, handle) = spawn_connection(Config::default());

    client
        .write_all(b"GET /hello HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();
    let (head, body) = read_response(&mut client).await;

    assert!(head.starts_with("HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n"));
    assert!(body.contains("<p>Method: GET Path: /hello Protocol: HTTP/1.1</p>"));
    assert!(body.contains("<tr><td>Host</td><td>localhost</td></tr>"));

    drop(client);
    assert_eq!(handle.await.unwrap().unwrap(), 1);
}

#[tokio::test]
async fn test_keep_alive_with_split_writes() {
    let (mut client, handle) = spawn_connection(Config::default());

    client.write_all(b"POST /form HT").await.unwrap();
    tokio::task::yield_now().await;
    client
        .write_all(b"TP/1.1\r\nX-First: yes\r\nContent-Length: 9\r\n\r\nname")
        .await
        .unwrap();
    tokio::task::yield_now().await;
    client.write_all(b"=<b>").await.unwrap();
    client.write_all(b"!").await.unwrap();

    let (_, first) = read_response(&mut client).await;
    assert!(first.contains("<pre>name=&lt;b&gt;!</pre>"));

    client.write_all(b"GET /again HTTP/1.1\r\n\r\n").await.unwrap();
    let (_, second) = read_response(&mut client).await;
    assert!(second.contains("Path: /again"));
    assert!(!second.contains("X-First"));
    assert!(!second.contains("Request-Body"));

    drop(client);
    assert_eq!(handle.await.unwrap().unwrap(), 2);
}

#[tokio::test]
async fn test_back_to_back_requests_in_one_write() {
    let (mut client, handle) = spawn_connection(Config::default());

    client
        .write_all(b"GET /one HTTP/1.1\r\n\r\nGET /two HTTP/1.1\r\n\r\n")
        .await
        .unwrap();
    let (_, first) = read_response(&mut client).await;
    let (_, second) = read_response(&mut client).await;

    assert!(first.contains("Path: /one"));
    assert!(second.contains("Path: /two"));

    drop(client);
    assert_eq!(handle.await.unwrap().unwrap(), 2);
}

#[tokio::test]
async fn test_malformed_request_line_closes_silently() {
    let (mut client, handle) = spawn_connection(Config::default());

    client.write_all(b"GET / HTTP/1.1 extra\r\n\r\n").await.unwrap();

    let mut rest = Vec::new();
    client.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
    assert!(handle.await.unwrap().is_err());
}

#[tokio::test]
async fn test_invalid_content_length_closes_silently() {
    let (mut client, handle) = spawn_connection(Config::default());

    client
        .write_all(b"POST / HTTP/1.1\r\nContent-Length: abc\r\n\r\n")
        .await
        .unwrap();

    let mut rest = Vec::new();
    client.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
    assert!(handle.await.unwrap().is_err());
}

#[tokio::test]
async fn test_malformed_header_answered_with_400_when_configured() {
    let mut cfg = Config::default();
    cfg.parser.reject_with_bad_request = true;
    let (mut client, handle) = spawn_connection(cfg);

    client
        .write_all(b"GET / HTTP/1.1\r\nBadHeaderNoColon\r\n\r\n")
        .await
        .unwrap();

    let mut rest = Vec::new();
    client.read_to_end(&mut rest).await.unwrap();
    assert_eq!(
        rest,
        b"HTTP/1.1 400 Bad Request\r\nConnection: close\r\nContent-Length: 0\r\n\r\n".to_vec()
    );
    assert!(handle.await.unwrap().is_err());
}

#[tokio::test]
async fn test_disconnect_mid_body_sends_nothing() {
    let (mut client, handle) = spawn_connection(Config::default());

    client
        .write_all(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc")
        .await
        .unwrap();
    client.shutdown().await.unwrap();

    let mut rest = Vec::new();
    client.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
    assert_eq!(handle.await.unwrap().unwrap(), 0);
}

#[tokio::test]
async fn test_tiny_read_buffer_is_reused_across_reads() {
    let mut cfg = Config::default();
    cfg.server.read_buffer_size = 3;
    let (mut client, handle) = spawn_connection(cfg);

    client
        .write_all(b"POST /small HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello world")
        .await
        .unwrap();
    let (_, body) = read_response(&mut client).await;
    assert!(body.contains("<pre>hello world</pre>"));

    client.write_all(b"GET /next HTTP/1.1\r\n\r\n").await.unwrap();
    let (_, body) = read_response(&mut client).await;
    assert!(body.contains("Path: /next"));

    drop(client);
    assert_eq!(handle.await.unwrap().unwrap(), 2);
}
