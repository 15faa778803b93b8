//! Wire framing.
//!
//! ```text
//! +------+---------+----------------+-------------------+
//! | SMBX | version | length (u32 BE)| JSON body         |
//! +------+---------+----------------+-------------------+
//!   4 B     1 B         4 B           `length` bytes
//! ```
//!
//! A frame is assembled in memory and written with a single `write_all`
//! followed by `flush`, so a reader never sees a frame that is only partly
//! written by this side.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{PipeError, PipeResult};

/// Frame magic.
pub const MAGIC: [u8; 4] = *b"SMBX";

/// Protocol version written into every frame.
pub const VERSION: u8 = 1;

/// Header length in bytes.
pub const HEADER_LEN: usize = 9;

/// Serializes a message into a frame body.
///
/// # Errors
/// Returns a protocol error if the message cannot be serialized.
pub fn to_body<T: Serialize>(message: &T) -> PipeResult<Vec<u8>> {
    serde_json::to_vec(message).map_err(|e| PipeError::protocol(format!("encode failed: {e}")))
}

/// Deserializes a frame body.
///
/// # Errors
/// Returns a protocol error if the body is not a valid message.
pub fn from_body<T: DeserializeOwned>(body: &[u8]) -> PipeResult<T> {
    serde_json::from_slice(body).map_err(|e| PipeError::protocol(format!("decode failed: {e}")))
}

/// Wraps a body into a complete frame.
///
/// # Errors
/// Returns [`PipeError::FrameTooLarge`] if the body exceeds `max_body`.
pub fn encode_frame(body: &[u8], max_body: usize) -> PipeResult<Vec<u8>> {
    check_size(body.len(), max_body)?;
    let len = u32::try_from(body.len()).map_err(|_| PipeError::FrameTooLarge {
        size: body.len(),
        max: max_body,
    })?;
    let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
    frame.extend_from_slice(&MAGIC);
    frame.push(VERSION);
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(body);
    Ok(frame)
}

/// Writes one frame and flushes it.
///
/// # Errors
/// Returns an error if the body is too large or the write fails.
pub async fn write_frame<W>(writer: &mut W, body: &[u8], max_body: usize) -> PipeResult<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let frame = encode_frame(body, max_body)?;
    writer.write_all(&frame).await.map_err(map_write_error)?;
    writer.flush().await.map_err(map_write_error)?;
    Ok(())
}

/// Reads one frame and returns its body.
///
/// End of stream before the first byte is [`PipeError::Closed`]; end of
/// stream anywhere later is a truncated frame and a protocol error.
///
/// # Errors
/// Returns an error on end of stream, bad header, oversize body or I/O
/// failure.
pub async fn read_frame<R>(reader: &mut R, max_body: usize) -> PipeResult<Vec<u8>>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut header = [0u8; HEADER_LEN];
    if reader.read(&mut header[..1]).await? == 0 {
        return Err(PipeError::closed("end of stream"));
    }
    reader
        .read_exact(&mut header[1..])
        .await
        .map_err(map_read_error)?;

    if header[..4] != MAGIC {
        return Err(PipeError::protocol(format!(
            "bad frame magic {:02x?}",
            &header[..4]
        )));
    }
    if header[4] != VERSION {
        return Err(PipeError::protocol(format!(
            "unsupported frame version {}",
            header[4]
        )));
    }
    let len = u32::from_be_bytes([header[5], header[6], header[7], header[8]]) as usize;
    check_size(len, max_body)?;

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await.map_err(map_read_error)?;
    Ok(body)
}

fn check_size(size: usize, max: usize) -> PipeResult<()> {
    if size > max {
        return Err(PipeError::FrameTooLarge { size, max });
    }
    Ok(())
}

fn map_read_error(err: std::io::Error) -> PipeError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        PipeError::protocol("truncated frame")
    } else {
        PipeError::Io(err)
    }
}

fn map_write_error(err: std::io::Error) -> PipeError {
    if err.kind() == std::io::ErrorKind::BrokenPipe {
        PipeError::closed("reader went away")
    } else {
        PipeError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Dataset, StatusRequest};

    #[test]
    fn test_encode_header() {
        let frame = encode_frame(b"{}", 16).unwrap();
        assert_eq!(&frame[..4], b"SMBX");
        assert_eq!(frame[4], VERSION);
        assert_eq!(&frame[5..9], &2u32.to_be_bytes());
        assert_eq!(&frame[9..], b"{}");
    }

    #[test]
    fn test_encode_rejects_oversize() {
        assert!(matches!(
            encode_frame(&[0u8; 17], 16),
            Err(PipeError::FrameTooLarge { size: 17, max: 16 })
        ));
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let request = StatusRequest::new(Dataset::Shares);
        let body = to_body(&request).unwrap();
        let mut buffer = Vec::new();
        write_frame(&mut buffer, &body, 1024).await.unwrap();

        let mut reader = buffer.as_slice();
        let read = read_frame(&mut reader, 1024).await.unwrap();
        let decoded: StatusRequest = from_body(&read).unwrap();
        assert_eq!(decoded, request);
    }

    #[tokio::test]
    async fn test_two_frames_stay_apart() {
        let mut buffer = Vec::new();
        write_frame(&mut buffer, b"first", 64).await.unwrap();
        write_frame(&mut buffer, b"second", 64).await.unwrap();

        let mut reader = buffer.as_slice();
        assert_eq!(read_frame(&mut reader, 64).await.unwrap(), b"first");
        assert_eq!(read_frame(&mut reader, 64).await.unwrap(), b"second");
        assert!(matches!(
            read_frame(&mut reader, 64).await,
            Err(PipeError::Closed(_))
        ));
    }

    #[tokio::test]
    async fn test_truncated_frame_is_protocol_error() {
        let frame = encode_frame(b"0123456789", 64).unwrap();
        let mut reader = &frame[..frame.len() - 3];
        assert!(matches!(
            read_frame(&mut reader, 64).await,
            Err(PipeError::Protocol(msg)) if msg.contains("truncated")
        ));

        let mut reader = &frame[..4];
        assert!(matches!(
            read_frame(&mut reader, 64).await,
            Err(PipeError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn test_bad_magic_and_version() {
        let mut frame = encode_frame(b"{}", 64).unwrap();
        frame[0] = b'X';
        assert!(matches!(
            read_frame(&mut frame.as_slice(), 64).await,
            Err(PipeError::Protocol(msg)) if msg.contains("magic")
        ));

        let mut frame = encode_frame(b"{}", 64).unwrap();
        frame[4] = 9;
        assert!(matches!(
            read_frame(&mut frame.as_slice(), 64).await,
            Err(PipeError::Protocol(msg)) if msg.contains("version")
        ));
    }

    #[tokio::test]
    async fn test_read_rejects_oversize_before_body() {
        let frame = encode_frame(&[b'a'; 100], 1000).unwrap();
        assert!(matches!(
            read_frame(&mut frame.as_slice(), 10).await,
            Err(PipeError::FrameTooLarge { size: 100, max: 10 })
        ));
    }

    #[test]
    fn test_from_body_rejects_garbage() {
        let result: PipeResult<StatusRequest> = from_body(b"not json");
        assert!(matches!(result, Err(PipeError::Protocol(_))));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        const MAX: usize = 4096;

        fn block_on<F: std::future::Future>(future: F) -> F::Output {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap()
                .block_on(future)
        }

        proptest! {
            /// Any body within the limit comes back byte for byte.
            #[test]
            fn frame_roundtrip(body in proptest::collection::vec(any::<u8>(), 0..=MAX)) {
                let frame = encode_frame(&body, MAX).unwrap();
                prop_assert_eq!(frame.len(), HEADER_LEN + body.len());
                let read = block_on(read_frame(&mut frame.as_slice(), MAX)).unwrap();
                prop_assert_eq!(read, body);
            }

            /// Every strict prefix of a frame is an error, never a body.
            #[test]
            fn truncated_frame_is_error(
                body in proptest::collection::vec(any::<u8>(), 0..256),
                cut in any::<prop::sample::Index>(),
            ) {
                let frame = encode_frame(&body, MAX).unwrap();
                let cut = cut.index(frame.len());
                let result = block_on(read_frame(&mut &frame[..cut], MAX));
                if cut == 0 {
                    prop_assert!(matches!(result, Err(PipeError::Closed(_))));
                } else {
                    prop_assert!(matches!(result, Err(PipeError::Protocol(_))));
                }
            }

            /// Arbitrary bytes never panic the reader.
            #[test]
            fn arbitrary_input_does_not_panic(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
                let _ = block_on(read_frame(&mut bytes.as_slice(), 32));
            }
        }
    }
}
