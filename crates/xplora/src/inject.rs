// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Streaming injection of the stylesheet link and live reload scripts.
//!
//! [`HtmlInjector`] is a small state machine fed with arbitrary byte chunks.
//! It inserts:
//!
//! - the stylesheet `<link>` right before the first `</head>`, unless the
//!   document already referenced the stylesheet before that point;
//! - the live reload scripts right before the first `</body>`, or at the very
//!   end if the document has no `</body>`.
//!
//! Between chunks it only retains the few bytes that could still be the start
//! of a tag it is looking for, so memory stays bounded no matter how large the
//! document is, and the output does not depend on where chunks were split.

use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};

/// Public URL of the compiled stylesheet.
pub const STYLESHEET_HREF: &str = "/assets/style.css";

/// Global the client runtime reads the WebSocket port from.
pub const WS_PORT_GLOBAL: &str = "__XPLORA_WS_PORT__";

const HEAD_CLOSE: &[u8] = b"</head>";
const BODY_CLOSE: &[u8] = b"</body>";

/// What to inject into documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectOptions {
    /// Stylesheet URL linked in the head.
    pub stylesheet_href: String,
    /// Markup inserted before `</body>`; may be empty.
    pub scripts: String,
}

impl InjectOptions {
    /// Options for the dev server. Scripts are only injected when `hmr` is on.
    pub fn dev(ws_port: u16, hmr: bool) -> Self {
        Self {
            stylesheet_href: STYLESHEET_HREF.to_string(),
            scripts: if hmr {
                live_reload_scripts(ws_port)
            } else {
                String::new()
            },
        }
    }

    /// Options for static output: stylesheet only.
    pub fn production() -> Self {
        Self {
            stylesheet_href: STYLESHEET_HREF.to_string(),
            scripts: String::new(),
        }
    }

    /// The `<link>` tag for the stylesheet.
    pub fn stylesheet_link(&self) -> String {
        format!(r#"<link rel="stylesheet" href="{}"/>"#, self.stylesheet_href)
    }
}

/// Bootstrap scripts for the live reload client.
pub fn live_reload_scripts(ws_port: u16) -> String {
    format!(
        concat!(
            "<script>window.{} = {};</script>",
            r#"<script type="module" src="/client/hmr.js"></script>"#,
            r#"<script type="module" src="/client/refresh.js"></script>"#,
        ),
        WS_PORT_GLOBAL, ws_port
    )
}

enum Tag {
    Head(usize),
    Body(usize),
}

/// Incremental stylesheet/script injector.
#[derive(Debug)]
pub struct HtmlInjector {
    link: Vec<u8>,
    href: Vec<u8>,
    scripts: Vec<u8>,
    pending: Vec<u8>,
    head_done: bool,
    body_done: bool,
    stylesheet_seen: bool,
    finished: bool,
}

impl HtmlInjector {
    /// Creates an injector for one document.
    pub fn new(options: &InjectOptions) -> Self {
        Self {
            link: options.stylesheet_link().into_bytes(),
            href: options.stylesheet_href.as_bytes().to_vec(),
            scripts: options.scripts.as_bytes().to_vec(),
            pending: Vec::new(),
            head_done: false,
            body_done: false,
            stylesheet_seen: options.stylesheet_href.is_empty(),
            finished: false,
        }
    }

    /// Feeds one chunk and returns the bytes that are safe to emit.
    ///
    /// The result may be empty when the whole chunk could still be part of a
    /// tag.
    pub fn push(&mut self, chunk: &[u8]) -> Bytes {
        if self.finished {
            return Bytes::copy_from_slice(chunk);
        }
        self.pending.extend_from_slice(chunk);
        let mut out = Vec::with_capacity(self.pending.len());
        self.drain(&mut out, false);
        Bytes::from(out)
    }

    /// Flushes retained bytes, appending the scripts if `</body>` never came.
    ///
    /// Only the first call produces output.
    pub fn finish(&mut self) -> Bytes {
        if self.finished {
            return Bytes::new();
        }
        self.finished = true;
        let mut out = Vec::with_capacity(self.pending.len() + self.scripts.len());
        self.drain(&mut out, true);
        Bytes::from(out)
    }

    /// Bytes currently held back.
    pub fn buffered_len(&self) -> usize {
        self.pending.len()
    }

    /// How many trailing bytes may still begin a pattern we search for.
    fn lookbehind(&self) -> usize {
        let mut longest = 0;
        if !self.head_done {
            longest = longest.max(HEAD_CLOSE.len());
            if !self.stylesheet_seen {
                longest = longest.max(self.href.len());
            }
        }
        if !self.body_done {
            longest = longest.max(BODY_CLOSE.len());
        }
        longest.saturating_sub(1)
    }

    fn drain(&mut self, out: &mut Vec<u8>, at_end: bool) {
        loop {
            let head = if self.head_done {
                None
            } else {
                find(&self.pending, HEAD_CLOSE)
            };
            let body = if self.body_done {
                None
            } else {
                find(&self.pending, BODY_CLOSE)
            };

            if !self.head_done && !self.stylesheet_seen {
                if let Some(pos) = find(&self.pending, &self.href) {
                    if head.map_or(true, |h| pos < h) {
                        self.stylesheet_seen = true;
                    }
                }
            }

            let next = match (head, body) {
                (Some(h), Some(b)) if h < b => Some(Tag::Head(h)),
                (_, Some(b)) => Some(Tag::Body(b)),
                (Some(h), None) => Some(Tag::Head(h)),
                (None, None) => None,
            };

            match next {
                Some(Tag::Head(pos)) => {
                    out.extend_from_slice(&self.pending[..pos]);
                    if !self.stylesheet_seen {
                        out.extend_from_slice(&self.link);
                    }
                    out.extend_from_slice(HEAD_CLOSE);
                    self.pending.drain(..pos + HEAD_CLOSE.len());
                    self.head_done = true;
                }
                Some(Tag::Body(pos)) => {
                    out.extend_from_slice(&self.pending[..pos]);
                    out.extend_from_slice(&self.scripts);
                    out.extend_from_slice(BODY_CLOSE);
                    self.pending.drain(..pos + BODY_CLOSE.len());
                    self.body_done = true;
                }
                None => {
                    if at_end {
                        out.append(&mut self.pending);
                        if !self.body_done {
                            out.extend_from_slice(&self.scripts);
                            self.body_done = true;
                        }
                    } else {
                        let keep = self.lookbehind().min(self.pending.len());
                        let flush = self.pending.len() - keep;
                        out.extend(self.pending.drain(..flush));
                    }
                    return;
                }
            }
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Injects into a complete document.
pub fn inject_str(html: &str, options: &InjectOptions) -> String {
    let mut injector = HtmlInjector::new(options);
    let mut out = injector.push(html.as_bytes()).to_vec();
    out.extend_from_slice(&injector.finish());
    match String::from_utf8(out) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// Wraps a chunk stream with an injector.
///
/// An error from the inner stream is forwarded and ends the output; retained
/// bytes are flushed only when the inner stream completes normally.
pub fn inject_stream<S, E>(input: S, options: InjectOptions) -> impl Stream<Item = Result<Bytes, E>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + Unpin + 'static,
    E: Send + 'static,
{
    let injector = HtmlInjector::new(&options);
    stream::unfold(Some((input, injector)), |state| async move {
        let (mut input, mut injector) = state?;
        loop {
            match input.next().await {
                Some(Ok(chunk)) => {
                    let out = injector.push(&chunk);
                    if !out.is_empty() {
                        return Some((Ok(out), Some((input, injector))));
                    }
                }
                Some(Err(e)) => return Some((Err(e), None)),
                None => {
                    let tail = injector.finish();
                    if tail.is_empty() {
                        return None;
                    }
                    return Some((Ok(tail), None));
                }
            }
        }
    })
}
