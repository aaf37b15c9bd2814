//! Newline-delimited JSON-RPC over stdin/stdout.
//!
//! Each inbound line is one request. Requests are dispatched on their own
//! task so a slow handler does not hold up later frames; a single writer
//! task serializes responses, one line each.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::server::Server;
use crate::types::{
    new_error_response, JsonRpcRequest, JsonRpcResponse, McpError, ERR_CODE_INVALID_REQ, ERR_CODE_PARSE,
};

/// Serve the process's stdin/stdout until stdin closes.
pub async fn serve_stdio(server: Server) -> Result<(), McpError> {
    serve(Arc::new(server), tokio::io::stdin(), tokio::io::stdout()).await
}

/// Serve requests read from `reader`, writing responses to `writer`.
///
/// Returns once the reader reaches EOF and every in-flight request has
/// been answered.
pub async fn serve<R, W>(server: Arc<Server>, reader: R, writer: W) -> Result<(), McpError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
    let writer_task = tokio::spawn(write_loop(writer, rx));

    let mut reader = BufReader::new(reader);
    let mut frame = Vec::new();
    let mut in_flight = JoinSet::new();

    loop {
        frame.clear();
        if reader.read_until(b'\n', &mut frame).await? == 0 {
            break;
        }
        if frame.trim_ascii().is_empty() {
            continue;
        }

        let req = match decode_frame(&frame) {
            Ok(r) => r,
            Err(resp) => {
                let _ = tx.send(resp);
                continue;
            }
        };

        let server = Arc::clone(&server);
        let tx = tx.clone();
        in_flight.spawn(async move {
            let resp = server.handle(req).await;
            if !resp.is_notification() {
                let _ = tx.send(resp);
            }
        });

        // Reap finished tasks so the set does not grow unbounded.
        while in_flight.try_join_next().is_some() {}
    }

    tracing::info!("input closed, draining in-flight requests");
    while in_flight.join_next().await.is_some() {}
    drop(tx);

    writer_task
        .await
        .map_err(|e| McpError::Other(format!("writer task: {}", e)))?
}

/// Decode one frame. Malformed JSON is a parse error; well-formed JSON that
/// is not a request is an invalid request, echoing its id when it has one.
fn decode_frame(frame: &[u8]) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_slice(frame).map_err(|e| {
        tracing::warn!(error = %e, "unparseable frame");
        new_error_response(None, ERR_CODE_PARSE, format!("parse error: {}", e))
    })?;
    let id = value.get("id").cloned();
    serde_json::from_value(value).map_err(|e| {
        tracing::warn!(error = %e, "invalid request");
        new_error_response(id, ERR_CODE_INVALID_REQ, format!("invalid request: {}", e))
    })
}

async fn write_loop<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>) -> Result<(), McpError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(resp) = rx.recv().await {
        let mut buf = serde_json::to_vec(&resp)?;
        buf.push(b'\n');
        writer.write_all(&buf).await?;
        writer.flush().await?;
    }
    Ok(())
}
