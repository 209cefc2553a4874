use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use market_sentiment::{Dashboard, LlmClient};

use crate::config::ServerConfig;
use crate::error::RpcError;
use crate::handler::DashboardHandler;
use crate::protocol::*;

/// JSON-RPC server for the market sentiment dashboard
pub struct RpcServer {
    config: ServerConfig,
    handler: Arc<DashboardHandler>,
}

impl RpcServer {
    /// Create a new RPC server
    pub fn new(config: ServerConfig) -> Result<Self> {
        tracing::info!("Initializing dashboard components...");

        let client =
            LlmClient::new(config.llm.clone()).context("Failed to initialize LLM client")?;
        let dashboard = Arc::new(Dashboard::new(config.dashboard.clone(), Arc::new(client)));
        let handler = Arc::new(DashboardHandler::new(dashboard));

        tracing::info!("✅ Dashboard components initialized successfully");

        Ok(Self { config, handler })
    }

    /// Start the server and handle connections
    pub async fn run(&self) -> Result<()> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .context(format!("Failed to bind to {}", addr))?;

        tracing::info!("✅ Dashboard JSON-RPC Server listening on {}", addr);

        if self.config.refresh_on_start {
            tracing::info!("Loading initial market data in the background");
            self.handler.spawn_refresh();
        }

        tracing::info!("Ready to accept connections");

        loop {
            match listener.accept().await {
                Ok((socket, addr)) => {
                    tracing::debug!("New connection from {}", addr);
                    let handler = Arc::clone(&self.handler);

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(socket, handler).await {
                            tracing::error!("Connection error from {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}

/// Handle a single TCP connection
async fn handle_connection(mut socket: TcpStream, handler: Arc<DashboardHandler>) -> Result<()> {
    let (reader, mut writer) = socket.split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            // Connection closed
            break;
        }

        if line.trim().is_empty() {
            continue;
        }

        tracing::debug!("Received request: {}", line.trim());

        let reply = process_request(&line, &handler).await;

        let reply_json = serde_json::to_string(&reply)?;
        writer.write_all(reply_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        tracing::debug!(
            "Sent {} ({} bytes)",
            if reply.is_error() { "error" } else { "result" },
            reply_json.len()
        );
    }

    Ok(())
}

/// Process a JSON-RPC request
async fn process_request(line: &str, handler: &DashboardHandler) -> JsonRpcReply {
    let raw: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => return create_error_response(None, RpcError::ParseError(e.to_string())),
    };

    let id = raw.get("id").cloned();

    let request: JsonRpcRequest = match serde_json::from_value(raw) {
        Ok(req) => req,
        Err(e) => return create_error_response(id, RpcError::InvalidRequest(e.to_string())),
    };

    // Validate JSON-RPC version
    if request.jsonrpc != "2.0" {
        return create_error_response(
            request.id,
            RpcError::InvalidRequest("JSON-RPC version must be 2.0".to_string()),
        );
    }

    // Route to method handler
    match request.method.as_str() {
        METHOD_SNAPSHOT => create_response(request.id, handler.handle_snapshot()),
        METHOD_REFRESH => handle_refresh(request, handler).await,
        _ => create_error_response(request.id, RpcError::MethodNotFound(request.method.clone())),
    }
}

/// Handle dashboard.refresh method
async fn handle_refresh(request: JsonRpcRequest, handler: &DashboardHandler) -> JsonRpcReply {
    // Params are optional; null counts as absent
    let params = match request.params {
        None | Some(Value::Null) => RefreshParams::default(),
        Some(params) => match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return create_error_response(request.id, RpcError::InvalidParams(e.to_string()));
            }
        },
    };

    let result = handler.handle_refresh(params).await;
    create_response(request.id, result)
}

/// Create a success response
fn create_response<T: Serialize>(id: Option<Value>, result: T) -> JsonRpcReply {
    match serde_json::to_value(result) {
        Ok(result) => JsonRpcReply::Success(JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id,
            result,
        }),
        Err(e) => create_error_response(id, e.into()),
    }
}

/// Create an error response
fn create_error_response(id: Option<Value>, error: RpcError) -> JsonRpcReply {
    tracing::warn!("Request failed with {}: {}", error.code(), error);

    JsonRpcReply::Failure(JsonRpcError {
        jsonrpc: "2.0".to_string(),
        id,
        error: ErrorObject {
            code: error.code(),
            message: error.to_string(),
            data: error.data(),
        },
    })
}
