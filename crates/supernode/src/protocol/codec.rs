//! Framing for routing messages on a stream.
//!
//! Each frame is a 4-byte big-endian length followed by the JSON-encoded
//! [`RoutingMessage`].

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::types::RoutingMessage;

/// Largest frame accepted from a peer (4 MiB)
pub const MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

/// Read one framed message
pub async fn read_message<T>(io: &mut T) -> io::Result<RoutingMessage>
where
    T: AsyncRead + Unpin + Send,
{
    let len = io.read_u32().await? as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("routing message of {len} bytes exceeds limit of {MAX_MESSAGE_SIZE}"),
        ));
    }

    let mut buf = vec![0u8; len];
    io.read_exact(&mut buf).await?;

    serde_json::from_slice(&buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Write one framed message and flush
pub async fn write_message<T>(io: &mut T, message: &RoutingMessage) -> io::Result<()>
where
    T: AsyncWrite + Unpin + Send,
{
    let json_data =
        serde_json::to_vec(message).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if json_data.len() > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("routing message of {} bytes exceeds limit of {MAX_MESSAGE_SIZE}", json_data.len()),
        ));
    }

    io.write_u32(json_data.len() as u32).await?;
    io.write_all(&json_data).await?;
    io.flush().await?;

    Ok(())
}
