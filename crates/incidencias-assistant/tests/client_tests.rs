// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use incidencias_app::CompletionBackend;
use incidencias_assistant::Client;
use std::io::Read;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};

fn json_header() -> Header {
    Header::from_bytes("Content-Type", "application/json").expect("valid content type header")
}

#[test]
fn ask_error_contains_actionable_remediation() {
    let client = Client::new("http://127.0.0.1:1", Duration::from_millis(50))
        .expect("client should initialize");

    let error = client
        .ask("hola")
        .expect_err("ask should fail for unreachable endpoint");
    let message = error.to_string();
    assert!(message.contains("[assistant].base_url"));
}

#[test]
fn ask_posts_message_and_decodes_the_reply() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/chat");
        assert_eq!(request.method().as_str(), "POST");

        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("readable body");
        assert_eq!(body, r#"{"message":"hola"}"#);

        let reply = r#"{"response":"Con gusto te ayudo.","timestamp":"2026-01-09T12:00:00Z"}"#;
        let response = Response::from_string(reply)
            .with_status_code(200)
            .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let reply = client.ask("hola")?;
    assert_eq!(reply.response, "Con gusto te ayudo.");
    assert_eq!(reply.timestamp.year(), 2026);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn server_error_envelope_surfaces_in_the_error() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let response = Response::from_string(r#"{"error":"Error interno del servidor"}"#)
            .with_status_code(500)
            .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let error = client
        .ask("hola")
        .expect_err("500 response should surface as error");
    assert!(error.to_string().contains("Error interno del servidor"));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn health_check_decodes_status_and_timestamp() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/api/chat");
        assert_eq!(request.method().as_str(), "GET");
        let body = r#"{"status":"Chat API funcionando","timestamp":"2026-01-09T12:00:00Z"}"#;
        let response = Response::from_string(body)
            .with_status_code(200)
            .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let health = client.health()?;
    assert_eq!(health.status, "Chat API funcionando");

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn completion_backend_returns_the_reply_text() -> Result<()> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}", server.server_addr());

    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        let reply = r#"{"response":"Respuesta breve.","timestamp":"2026-01-09T12:00:00Z"}"#;
        let response = Response::from_string(reply)
            .with_status_code(200)
            .with_header(json_header());
        request.respond(response).expect("response should succeed");
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    assert_eq!(client.complete("hola")?, "Respuesta breve.");

    handle.join().expect("server thread should join");
    Ok(())
}
