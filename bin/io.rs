use std::{fmt::Display, io};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tracing::instrument;

/// Exchanges lines of text over an async reader and writer.
#[derive(Debug)]
pub struct Pipe<W: AsyncWrite, R: AsyncRead> {
    writer: W,
    reader: Lines<BufReader<R>>,
}

impl<W: AsyncWrite, R: AsyncRead> Pipe<W, R> {
    pub fn new(writer: W, reader: R) -> Self {
        Pipe {
            writer,
            reader: BufReader::new(reader).lines(),
        }
    }
}

impl<W: AsyncWrite + Send + Unpin, R: AsyncRead + Send + Unpin> Pipe<W, R> {
    /// The next line, or `None` once the input is exhausted.
    ///
    /// A line that isn't valid UTF-8 fails with [`io::ErrorKind::InvalidData`],
    /// but the lines after it can still be read.
    /// Cancelling it never loses a line.
    #[instrument(level = "trace", skip(self), ret, err)]
    pub async fn recv(&mut self) -> io::Result<Option<String>> {
        self.reader.next_line().await
    }

    /// Writes a line and flushes it right away.
    #[instrument(level = "trace", skip(self, line), err, fields(%line))]
    pub async fn send<T: Display>(&mut self, line: T) -> io::Result<()> {
        let mut buf = line.to_string();
        buf.push('\n');
        self.writer.write_all(buf.as_bytes()).await?;
        self.writer.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str;
    use test_strategy::proptest;
    use tokio::io::{duplex, AsyncReadExt};
    use tokio::runtime;

    #[proptest]
    fn recv_reads_one_line_at_a_time(
        #[strategy("[^\r\n]*")] a: String,
        #[strategy("[^\r\n]*")] b: String,
    ) {
        let rt = runtime::Builder::new_multi_thread().build()?;

        let (writer, _) = duplex(1);
        let (mut tx, reader) = duplex(a.len() + b.len() + 2);
        rt.block_on(tx.write_all(format!("{a}\n{b}\n").as_bytes()))?;

        let mut pipe = Pipe::new(writer, reader);
        assert_eq!(rt.block_on(pipe.recv())?, Some(a));
        assert_eq!(rt.block_on(pipe.recv())?, Some(b));
    }

    #[proptest]
    fn recv_yields_nothing_at_end_of_input() {
        let rt = runtime::Builder::new_multi_thread().build()?;

        let (writer, _) = duplex(1);
        let (tx, reader) = duplex(1);
        drop(tx);

        let mut pipe = Pipe::new(writer, reader);
        assert_eq!(rt.block_on(pipe.recv())?, None);
    }

    #[proptest]
    fn recv_recovers_from_malformed_lines(#[strategy("[^\r\n]*")] s: String) {
        let rt = runtime::Builder::new_multi_thread().build()?;

        let (writer, _) = duplex(1);
        let (mut tx, reader) = duplex(s.len() + 4);
        rt.block_on(tx.write_all(b"\xff\n"))?;
        rt.block_on(tx.write_all(format!("{s}\n").as_bytes()))?;

        let mut pipe = Pipe::new(writer, reader);
        assert_eq!(
            rt.block_on(pipe.recv()).map_err(|e| e.kind()),
            Err(io::ErrorKind::InvalidData)
        );

        assert_eq!(rt.block_on(pipe.recv())?, Some(s));
    }

    #[proptest]
    fn send_appends_line_break(s: String) {
        let rt = runtime::Builder::new_multi_thread().build()?;

        let (writer, mut rx) = duplex(s.len() + 1);
        let (_, reader) = duplex(1);

        let expected = format!("{s}\n");

        let mut pipe = Pipe::new(writer, reader);
        rt.block_on(pipe.send(&s))?;

        let mut buf = vec![0u8; expected.len()];
        rt.block_on(rx.read_exact(&mut buf))?;

        assert_eq!(str::from_utf8(&buf)?, expected);
    }
}
