//! Line ending helpers.
//!
//! Lines are stored without terminators. The session's [`LineEnding`] is only used when lines
//! are joined into a flat string (serialization, undo snapshots) and when such a string is
//! split back into lines.

use std::fmt;

/// The newline sequence used to join the document's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    /// Unix-style LF (`'\n'`).
    #[default]
    Lf,
    /// Classic Mac CR (`'\r'`).
    Cr,
    /// Windows-style CRLF (`"\r\n"`).
    Crlf,
}

impl LineEnding {
    /// The marker as a string slice.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Cr => "\r",
            Self::Crlf => "\r\n",
        }
    }

    /// Length of the marker in characters.
    pub fn char_len(self) -> usize {
        self.as_str().len()
    }

    /// Detect the dominant line ending from a source text.
    ///
    /// Policy: any CRLF wins, then any lone CR, otherwise LF.
    pub fn detect_in_text(text: &str) -> Self {
        if text.contains("\r\n") {
            Self::Crlf
        } else if text.contains('\r') {
            Self::Cr
        } else {
            Self::Lf
        }
    }

    /// Join `lines` with this marker.
    pub fn join<S: AsRef<str>>(self, lines: &[S]) -> String {
        let marker = self.as_str();
        let total: usize = lines.iter().map(|l| l.as_ref().len()).sum::<usize>()
            + marker.len() * lines.len().saturating_sub(1);
        let mut out = String::with_capacity(total);
        for (idx, line) in lines.iter().enumerate() {
            if idx > 0 {
                out.push_str(marker);
            }
            out.push_str(line.as_ref());
        }
        out
    }

    /// Split a string previously produced by [`LineEnding::join`] back into exactly
    /// `line_count` lines. A count of zero yields no lines at all, which is how an empty span
    /// is told apart from a span holding one empty line.
    pub fn split_joined(self, text: &str, line_count: usize) -> Vec<String> {
        if line_count == 0 {
            return Vec::new();
        }
        let lines: Vec<String> = text.split(self.as_str()).map(str::to_string).collect();
        debug_assert_eq!(lines.len(), line_count, "joined snapshot has wrong line count");
        lines
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lf => "LF",
            Self::Cr => "CR",
            Self::Crlf => "CRLF",
        };
        f.write_str(name)
    }
}

/// Split arbitrary input text into line fragments.
///
/// `"\r\n"`, lone `'\r'` and `'\n'` all count as a single break, so pasted text from any
/// platform lands as the same lines. `N` breaks always produce `N + 1` fragments, including
/// trailing empty ones.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\n' => {
                fragments.push(&text[start..idx]);
                idx += 1;
                start = idx;
            }
            b'\r' => {
                fragments.push(&text[start..idx]);
                idx += if bytes.get(idx + 1) == Some(&b'\n') { 2 } else { 1 };
                start = idx;
            }
            _ => idx += 1,
        }
    }
    fragments.push(&text[start..]);
    fragments
}

/// Returns `true` if `text` contains any line break character.
pub fn has_line_break(text: &str) -> bool {
    text.contains(['\n', '\r'])
}
