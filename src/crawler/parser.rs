//! Streaming HTML link extraction
//!
//! Pages are tokenized as their bytes arrive instead of after the whole body
//! has been buffered. Only start tags matter:
//!
//! **Collected:**
//! - `<a href="...">`
//! - `<link href="...">`
//! - `<script src="...">`
//!
//! Every reference is resolved against the page URL with its fragment
//! removed. Empty and malformed references are dropped silently. Scope
//! filtering is left to the coordinator.

use crate::url::resolve_link;
use bytes::Bytes;
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
    TokenizerResult,
};
use tokio::sync::mpsc;
use url::Url;

/// Token sink collecting resolved link targets
struct LinkSink {
    base: Url,
    links: Vec<Url>,
}

impl LinkSink {
    fn collect(&mut self, tag: &Tag) {
        let wanted = match &*tag.name {
            "a" | "link" => "href",
            "script" => "src",
            _ => return,
        };

        let reference = tag
            .attrs
            .iter()
            .find(|attr| &*attr.name.local == wanted)
            .map(|attr| &*attr.value);

        if let Some(url) = reference.and_then(|r| resolve_link(r, &self.base)) {
            self.links.push(url);
        }
    }
}

impl TokenSink for LinkSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        if let Token::TagToken(tag) = token {
            if tag.kind == TagKind::StartTag {
                self.collect(&tag);
                if let Some(kind) = raw_text_kind(&tag) {
                    return TokenSinkResult::RawData(kind);
                }
            }
        }
        TokenSinkResult::Continue
    }
}

/// Elements whose content is text, not markup
///
/// Without a tree builder the tokenizer needs to be told, or markup-looking
/// strings inside a script would be reported as links.
fn raw_text_kind(tag: &Tag) -> Option<RawKind> {
    if tag.self_closing {
        return None;
    }
    match &*tag.name {
        "script" => Some(RawKind::ScriptData),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => Some(RawKind::Rawtext),
        "title" | "textarea" => Some(RawKind::Rcdata),
        _ => None,
    }
}

/// Incremental link extractor fed with raw body bytes
///
/// Bytes are decoded as UTF-8 on the fly. A multi-byte sequence split
/// across two chunks is held back until the rest arrives; invalid bytes are
/// replaced with U+FFFD.
pub struct LinkExtractor {
    tokenizer: Tokenizer<LinkSink>,
    queue: BufferQueue,
    pending: Vec<u8>,
}

impl LinkExtractor {
    /// Creates an extractor resolving links against `base`
    pub fn new(base: Url) -> Self {
        let sink = LinkSink {
            base,
            links: Vec::new(),
        };
        Self {
            tokenizer: Tokenizer::new(sink, TokenizerOpts::default()),
            queue: BufferQueue::new(),
            pending: Vec::new(),
        }
    }

    /// Feeds the next chunk of the body
    pub fn feed(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        let text = drain_utf8(&mut self.pending);
        self.push_text(&text);
    }

    /// Ends the input and returns every link found
    pub fn finish(mut self) -> Vec<Url> {
        if !self.pending.is_empty() {
            let rest = String::from_utf8_lossy(&self.pending).into_owned();
            self.pending.clear();
            self.push_text(&rest);
        }
        self.tokenizer.end();
        self.tokenizer.sink.links
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.queue.push_back(StrTendril::from_slice(text));
        // `Script` pauses the tokenizer with input left in the queue; keep
        // feeding until all of it has been consumed.
        while let TokenizerResult::Script(()) = self.tokenizer.feed(&mut self.queue) {}
    }
}

/// Takes the longest decodable prefix out of `pending`
///
/// An incomplete sequence at the very end stays in `pending`.
fn drain_utf8(pending: &mut Vec<u8>) -> String {
    let mut out = String::with_capacity(pending.len());
    let mut consumed = 0;

    loop {
        match std::str::from_utf8(&pending[consumed..]) {
            Ok(text) => {
                out.push_str(text);
                consumed = pending.len();
                break;
            }
            Err(err) => {
                let valid_end = consumed + err.valid_up_to();
                out.push_str(std::str::from_utf8(&pending[consumed..valid_end]).unwrap_or_default());
                match err.error_len() {
                    Some(len) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        consumed = valid_end + len;
                    }
                    None => {
                        consumed = valid_end;
                        break;
                    }
                }
            }
        }
    }

    pending.drain(..consumed);
    out
}

/// Extracts links from a complete HTML document
///
/// # Example
///
/// ```
/// use site_mirror::crawler::extract_links;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/pkg/").unwrap();
/// let links = extract_links(r#"<a href="strings/">strings</a>"#, &base);
/// assert_eq!(links[0].as_str(), "https://example.com/pkg/strings/");
/// ```
pub fn extract_links(html: &str, base: &Url) -> Vec<Url> {
    let mut extractor = LinkExtractor::new(base.clone());
    extractor.feed(html.as_bytes());
    extractor.finish()
}

/// Runs an extractor over chunks arriving on a channel
///
/// Blocks the calling thread until the sender side is dropped, so it must
/// run on a plain OS thread, never on an async worker. Extraction ends
/// when the channel closes, which is also how an interrupted body stops it:
/// whatever was collected up to that point is returned.
pub fn extract_links_from_channel(mut chunks: mpsc::Receiver<Bytes>, base: Url) -> Vec<Url> {
    let mut extractor = LinkExtractor::new(base);
    while let Some(chunk) = chunks.blocking_recv() {
        extractor.feed(&chunk);
    }
    extractor.finish()
}
