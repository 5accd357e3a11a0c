//! Change-event source seam.
//!
//! The upstream watcher is an external collaborator that delivers edit
//! events one at a time; the service only depends on this pull contract.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

use crate::common::EditEvent;

#[async_trait]
pub trait EventSource: Send {
    /// The next event, or `None` once the source is exhausted.
    async fn next_event(&mut self) -> Option<EditEvent>;
}

/// Line-delimited JSON events from any async reader.
///
/// Malformed lines are logged and skipped; the stream only ends on EOF or
/// a read error.
pub struct JsonlEventSource<R> {
    lines: Lines<BufReader<R>>,
}

impl JsonlEventSource<tokio::io::Stdin> {
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin())
    }
}

impl<R: AsyncRead + Unpin> JsonlEventSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> EventSource for JsonlEventSource<R> {
    async fn next_event(&mut self) -> Option<EditEvent> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<EditEvent>(line) {
                        Ok(event) => return Some(event),
                        Err(e) => {
                            tracing::warn!(error = %e, "skipping malformed event line");
                        }
                    }
                }
                Ok(None) => return None,
                Err(e) => {
                    tracing::error!(error = %e, "event source read failed");
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parses_events_and_skips_garbage() {
        let input = concat!(
            r#"{"page":"Foo","editor":"Bar","source_url":"https://en.site.org/w/d","site":"en.site.org"}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"page":"Baz","editor":"1.2.3.4","source_url":"https://de.site.org/w/d","site":"de.site.org"}"#,
            "\n",
        );

        let mut source = JsonlEventSource::new(input.as_bytes());

        let first = source.next_event().await.unwrap();
        assert_eq!(first.page, "Foo");

        let second = source.next_event().await.unwrap();
        assert_eq!(second.editor, "1.2.3.4");

        assert!(source.next_event().await.is_none());
    }
}
