use std::ops::Range;

use memchr::{memchr, memrchr};

/// Byte ranges of the five pattern parts inside a source string. Absent parts
/// are `None`; the splitter never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSpans {
    pub protocol: Option<Range<usize>>,
    pub hostname: Option<Range<usize>>,
    pub port: Option<Range<usize>>,
    pub pathname: Option<Range<usize>>,
    pub search: Option<Range<usize>>,
}

/// Slices a raw pattern source into its parts: the search substring is
/// everything after the first `?`; `://` introduces a protocol and host
/// region; the port is a trailing all-digit run after the last `:` of the
/// host region (a non-digit suffix stays part of the hostname); the rest,
/// minus one leading `/`, is the pathname.
pub fn split(source: &str) -> SourceSpans {
    let mut spans = SourceSpans::default();
    let bytes = source.as_bytes();

    let mut end = bytes.len();
    if let Some(search_start) = memchr(b'?', bytes) {
        spans.search = Some(search_start + 1..bytes.len());
        end = search_start;
    }

    let mut index = 0;
    if let Some(solidus) = memchr::memmem::find(&bytes[..end], b"://") {
        if solidus != 0 {
            spans.protocol = Some(0..solidus);
        }
        index = solidus + 3;

        let host_end = memchr(b'/', &bytes[index..end])
            .map(|rel| index + rel)
            .unwrap_or(end);
        match memrchr(b':', &bytes[..host_end]) {
            Some(colon) if colon >= index => {
                let port = &bytes[colon + 1..host_end];
                if !port.is_empty() && port.iter().all(u8::is_ascii_digit) {
                    spans.hostname = Some(index..colon);
                    spans.port = Some(colon + 1..host_end);
                } else {
                    spans.hostname = Some(index..host_end);
                }
            }
            _ => {
                spans.hostname = Some(index..host_end);
            }
        }
        index = if host_end == end { host_end } else { host_end + 1 };
    }

    if index != end {
        if bytes[index] == b'/' {
            index += 1;
        }
        spans.pathname = Some(index..end);
    }

    spans
}
