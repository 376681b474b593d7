//! Decoder incrementale per risposte `text/event-stream`
//!
//! Il trasporto consegna i byte in blocchi arbitrari: una riga può arrivare
//! spezzata in più letture, e così pure un carattere UTF-8 multi-byte.
//! [`LineDecoder`] accumula i byte ed emette solo righe complete, [`parse_frame`]
//! classifica ogni riga, [`StreamDecoder`] combina le due cose.
//! La sequenza di frame prodotta non dipende da come l'input è stato spezzato.

use crate::dto::StreamFrame;

/// Payload che chiude lo stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// Bufferizza byte grezzi ed emette righe complete terminate da `\n`
#[derive(Debug, Default)]
pub struct LineDecoder {
    buf: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggiunge un blocco e ritorna le righe completate, senza terminatore.
    /// La riga parziale finale resta nel buffer.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.buf[start..].iter().position(|b| *b == b'\n') {
            let end = start + pos;
            lines.push(decode_line(&self.buf[start..end]));
            start = end + 1;
        }
        self.buf.drain(..start);
        lines
    }

    /// Svuota il buffer: l'ultima riga, se non terminata, viene emessa comunque
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let line = decode_line(&self.buf);
        self.buf.clear();
        Some(line)
    }

    pub fn buffered(&self) -> usize {
        self.buf.len()
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Frammento di testo della risposta
    Content(String),
    Done,
    /// Riga `data:` con un payload inatteso; contiene il payload grezzo
    Malformed(String),
}

/// Classifica una riga dello stream.
///
/// Ritorna `None` per righe vuote, commenti (`:`) e campi diversi da `data`.
pub fn parse_frame(line: &str) -> Option<Frame> {
    let (field, value) = line.split_once(':').unwrap_or((line, ""));
    if field != "data" {
        return None;
    }

    let payload = value.strip_prefix(' ').unwrap_or(value);
    if payload.trim() == DONE_SENTINEL {
        return Some(Frame::Done);
    }

    match serde_json::from_str::<StreamFrame>(payload) {
        Ok(frame) => Some(Frame::Content(frame.content)),
        Err(_) => Some(Frame::Malformed(payload.to_string())),
    }
}

/// Decoder completo: righe + classificazione dei frame.
/// Dopo `Done` ogni ulteriore input viene ignorato.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    lines: LineDecoder,
    done: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        if self.done {
            return Vec::new();
        }
        let lines = self.lines.push(chunk);
        self.frames(lines)
    }

    pub fn finish(&mut self) -> Vec<Frame> {
        if self.done {
            return Vec::new();
        }
        let rest = self.lines.finish();
        self.frames(rest)
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    fn frames(&mut self, lines: impl IntoIterator<Item = String>) -> Vec<Frame> {
        let mut frames = Vec::new();
        for line in lines {
            if self.done {
                break;
            }
            if let Some(frame) = parse_frame(&line) {
                self.done = frame == Frame::Done;
                frames.push(frame);
            }
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM: &str = "data: {\"content\":\"Ciao \"}\n\n\
                          : keep-alive\n\
                          data: {\"content\":\"è \"}\r\n\r\n\
                          event: message\n\
                          data:{\"content\":\"ok\"}\n\n\
                          data: [DONE]\n\n\
                          data: {\"content\":\"late\"}\n\n";

    fn decode_in_chunks(bytes: &[u8], cuts: &[usize]) -> Vec<Frame> {
        let mut decoder = StreamDecoder::new();
        let mut frames = Vec::new();
        let mut start = 0;
        for &cut in cuts {
            frames.extend(decoder.push(&bytes[start..cut]));
            start = cut;
        }
        frames.extend(decoder.push(&bytes[start..]));
        frames.extend(decoder.finish());
        frames
    }

    fn expected() -> Vec<Frame> {
        vec![
            Frame::Content("Ciao ".into()),
            Frame::Content("è ".into()),
            Frame::Content("ok".into()),
            Frame::Done,
        ]
    }

    #[test]
    fn decodes_a_whole_stream() {
        assert_eq!(decode_in_chunks(STREAM.as_bytes(), &[]), expected());
    }

    #[test]
    fn output_does_not_depend_on_chunk_boundaries() {
        let bytes = STREAM.as_bytes();
        for i in 0..=bytes.len() {
            assert_eq!(decode_in_chunks(bytes, &[i]), expected(), "single cut at {i}");
            for j in i..=bytes.len() {
                assert_eq!(decode_in_chunks(bytes, &[i, j]), expected(), "cuts at {i},{j}");
            }
        }
    }

    #[test]
    fn byte_by_byte_keeps_multibyte_characters() {
        let bytes = STREAM.as_bytes();
        let cuts: Vec<usize> = (1..bytes.len()).collect();
        assert_eq!(decode_in_chunks(bytes, &cuts), expected());
    }

    #[test]
    fn malformed_frame_is_reported_and_skipped() {
        let input = "data: {\"content\":\"a\"}\ndata: {not json\ndata: {\"content\":\"b\"}\n";
        let frames = decode_in_chunks(input.as_bytes(), &[]);
        assert_eq!(
            frames,
            vec![
                Frame::Content("a".into()),
                Frame::Malformed("{not json".into()),
                Frame::Content("b".into()),
            ]
        );
    }

    #[test]
    fn unterminated_last_line_is_flushed_on_finish() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder.push(b"data: {\"content\":\"tail\"}").is_empty());
        assert_eq!(decoder.finish(), vec![Frame::Content("tail".into())]);
    }

    #[test]
    fn input_after_done_is_ignored() {
        let mut decoder = StreamDecoder::new();
        assert_eq!(decoder.push(b"data: [DONE]\n"), vec![Frame::Done]);
        assert!(decoder.is_done());
        assert!(decoder.push(b"data: {\"content\":\"x\"}\n").is_empty());
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn non_data_lines_produce_nothing() {
        for line in ["", ": comment", "event: update", "id: 7", "retry: 1000"] {
            assert_eq!(parse_frame(line), None, "{line:?}");
        }
    }

    #[test]
    fn line_decoder_retains_partial_line() {
        let mut lines = LineDecoder::new();
        assert_eq!(lines.push(b"one\ntw"), vec!["one".to_string()]);
        assert_eq!(lines.buffered(), 2);
        assert_eq!(lines.push(b"o\r\n"), vec!["two".to_string()]);
        assert_eq!(lines.finish(), None);
    }
}
