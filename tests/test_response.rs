use trickle::http::request::RequestBuilder;
use trickle::http::response::{Response, ResponseBuilder, StatusCode};
use trickle::http::writer::{serialize_response, ResponseWriter};

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::BadRequest.reason_phrase(), "Bad Request");
}

#[test]
fn test_response_builder_auto_content_length() {
    let body = b"This is the body".to_vec();
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(body.clone())
        .build();

    assert_eq!(response.header("Content-Length"), Some("16"));
}

#[test]
fn test_response_builder_preserves_custom_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("content-length", "999")
        .body(b"test".to_vec())
        .build();

    assert_eq!(response.headers.len(), 1);
    assert_eq!(response.header("Content-Length"), Some("999"));
}

#[test]
fn test_response_builder_header_replaces_and_keeps_order() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("B", "1")
        .header("A", "2")
        .header("b", "3")
        .build();

    assert_eq!(
        response.headers,
        vec![
            ("B".to_string(), "3".to_string()),
            ("A".to_string(), "2".to_string()),
            ("Content-Length".to_string(), "0".to_string()),
        ]
    );
}

#[test]
fn test_echo_headers_body_and_length() {
    let req = RequestBuilder::new()
        .request_line("GET / HTTP/1.1")
        .header("Host", "x")
        .header("Accept", "*/*")
        .body(&b"ignored"[..])
        .build()
        .unwrap();

    let response = Response::echo_headers(&req);

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body, b"Host: x\r\nAccept: */*\r\n".to_vec());
    assert_eq!(response.header("Content-Length"), Some("22"));
}

#[test]
fn test_echo_with_no_headers() {
    let req = RequestBuilder::new().request_line("GET / HTTP/1.1").build().unwrap();

    let bytes = serialize_response(&Response::echo_headers(&req));

    assert_eq!(bytes, b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n".to_vec());
}

#[test]
fn test_serialize_echo_response() {
    let req = RequestBuilder::new()
        .request_line("GET / HTTP/1.1")
        .header("Host", "x")
        .build()
        .unwrap();

    let bytes = serialize_response(&Response::echo_headers(&req));

    assert_eq!(
        bytes,
        b"HTTP/1.1 200 OK\r\nContent-Length: 9\r\n\r\nHost: x\r\n".to_vec()
    );
}

#[test]
fn test_serialize_bad_request_is_exact() {
    let bytes = serialize_response(&Response::bad_request());

    assert_eq!(bytes, b"HTTP/1.1 400 Bad Request\r\n\r\n".to_vec());
}

#[tokio::test]
async fn test_response_writer_writes_everything() {
    let (mut client, mut server) = tokio::io::duplex(4);
    let mut writer = ResponseWriter::new(&Response::ok("hello"));
    assert_eq!(writer.remaining(), 43);

    let reader = tokio::spawn(async move {
        use tokio::io::AsyncReadExt;
        let mut out = Vec::new();
        client.read_to_end(&mut out).await.unwrap();
        out
    });

    writer.write_to_stream(&mut server).await.unwrap();
    assert_eq!(writer.remaining(), 0);
    drop(server);

    let out = reader.await.unwrap();
    assert_eq!(out, b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello".to_vec());
}
