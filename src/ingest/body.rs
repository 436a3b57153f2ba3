use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};

/// Declared lengths are attacker-controlled; never preallocate more than this.
const INITIAL_CAPACITY_CAP: u64 = 64 * 1024;

const CHUNK: usize = 8 * 1024;

/// Drains up to `declared` bytes from `source` into memory.
///
/// The transport may deliver the body in arbitrarily small chunks, so this
/// loops until the declared length has accumulated or the source reaches
/// end-of-stream. Bytes past `declared` are never read. The buffer may come
/// back short; the caller compares its length against `declared` and treats a
/// short buffer as truncated input.
pub async fn read_declared<R>(mut source: R, declared: u64) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(declared.min(INITIAL_CAPACITY_CAP) as usize);
    let mut chunk = [0u8; CHUNK];
    let mut remaining = declared;

    while remaining > 0 {
        let want = remaining.min(CHUNK as u64) as usize;
        let n = source.read(&mut chunk[..want]).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        remaining -= n as u64;
    }

    Ok(buf)
}
