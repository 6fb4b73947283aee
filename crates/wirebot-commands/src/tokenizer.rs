//! Argument tokenizer
//!
//! Splits prefixed message content into a lowercase command name and its
//! argument tokens. Double-quoted spans re-join whitespace-separated tokens
//! into one argument with the quotes stripped; an unterminated quote
//! absorbs everything to the end of the input (documented incomplete-match
//! policy, not an error).

/// A tokenized command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokenized {
    /// Lowercased command name; empty when nothing followed the prefix
    pub name: String,
    /// Argument tokens in order, quotes resolved
    pub args: Vec<String>,
}

/// Tokenize message content against a command prefix
///
/// Returns None when the content does not start with the prefix. An empty
/// `name` means the prefix stood alone; callers treat that as
/// "not a command" and take no action.
pub fn tokenize(content: &str, prefix: &str) -> Option<Tokenized> {
    let rest = content.strip_prefix(prefix)?.trim();

    let mut tokens = rest.split_whitespace();
    let Some(first) = tokens.next() else {
        return Some(Tokenized {
            name: String::new(),
            args: Vec::new(),
        });
    };

    let name = first.to_lowercase();
    let mut args = Vec::new();
    // Tokens accumulated since an opening quote, None outside a span
    let mut quoted: Option<Vec<String>> = None;

    for token in tokens {
        match quoted.as_mut() {
            Some(span) => {
                if let Some(stripped) = token.strip_suffix('"') {
                    span.push(stripped.to_string());
                    args.push(span.join(" "));
                    quoted = None;
                } else {
                    span.push(token.to_string());
                }
            }
            None => {
                if let Some(opened) = token.strip_prefix('"') {
                    match opened.strip_suffix('"') {
                        // Both quotes in one token: a complete argument
                        Some(inner) => args.push(inner.to_string()),
                        None => quoted = Some(vec![opened.to_string()]),
                    }
                } else {
                    args.push(token.to_string());
                }
            }
        }
    }

    // Unterminated quote: the span becomes the final argument as-is
    if let Some(span) = quoted {
        args.push(span.join(" "));
    }

    Some(Tokenized { name, args })
}
