//! Localized delegation hints
//!
//! Only the `en-US` resource table ships. Arguments substitute `{0}`, `{1}`
//! placeholders; `{{` and `}}` in a template are literal braces.

use crate::binding::ErrorResourceKey;

pub const SUGGEST_REMOTE_EXECUTION_HINT: ErrorResourceKey =
    ErrorResourceKey("SuggestRemoteExecutionHint");

pub const OP_NOT_SUPPORTED_BY_COLUMN: ErrorResourceKey =
    ErrorResourceKey("OpNotSupportedByColumnSuggestionMessage_OpNotSupportedByColumn");

pub const OP_NOT_SUPPORTED_BY_SERVICE: ErrorResourceKey =
    ErrorResourceKey("OpNotSupportedByServiceSuggestionMessage_OpNotSupportedByService");

/// Locale of the shipped resource table
pub const DEFAULT_LOCALE: &str = "en-US";

const EN_US: &[(&str, &str)] = &[
    (
        "SuggestRemoteExecutionHint",
        "Delegation warning. The highlighted part of this formula might not work correctly on large data sets. The \"{0}\" operation is not supported by this data source.",
    ),
    (
        "OpNotSupportedByColumnSuggestionMessage_OpNotSupportedByColumn",
        "Delegation warning. The highlighted part of this formula might not work correctly with column \"{0}\" on large data sets.",
    ),
    (
        "OpNotSupportedByServiceSuggestionMessage_OpNotSupportedByService",
        "Delegation warning. The \"{0}\" operation is not supported by this data source and might not work correctly on large data sets.",
    ),
];

/// Whether a resource table exists for the locale
pub fn is_supported_locale(locale: &str) -> bool {
    locale.eq_ignore_ascii_case(DEFAULT_LOCALE)
}

/// Template for a resource key, if known
pub fn template(key: ErrorResourceKey) -> Option<&'static str> {
    EN_US.iter().find(|(k, _)| *k == key.0).map(|(_, t)| *t)
}

/// Formats a template with positional arguments.
///
/// Placeholders without a matching argument are left as written.
pub fn format_template(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len() + 32);
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut digits = String::new();
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                    digits.push(d);
                    chars.next();
                }
                let arg = digits.parse::<usize>().ok().and_then(|i| args.get(i));
                match (arg, chars.peek()) {
                    (Some(arg), Some('}')) => {
                        chars.next();
                        out.push_str(arg);
                    }
                    _ => {
                        out.push('{');
                        out.push_str(&digits);
                    }
                }
            }
            c => out.push(c),
        }
    }

    out
}

/// Escapes braces so a name can be embedded in a format string
pub fn make_safe_for_format_string(name: &str) -> String {
    name.replace('{', "{{").replace('}', "}}")
}

/// A resolved hint ready to attach to a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub key: ErrorResourceKey,
    pub message: String,
}

impl Hint {
    pub fn new(key: ErrorResourceKey, args: &[&str]) -> Self {
        let message = match template(key) {
            Some(t) => format_template(t, args),
            None => key.0.to_string(),
        };
        Self { key, message }
    }

    /// Generic hint naming the enclosing function
    pub fn suggest_remote_execution(function: &str) -> Self {
        Self::new(SUGGEST_REMOTE_EXECUTION_HINT, &[function])
    }

    /// Column lacks the required capability or operator
    pub fn op_not_supported_by_column(column: &str) -> Self {
        let safe = make_safe_for_format_string(column);
        Self::new(OP_NOT_SUPPORTED_BY_COLUMN, &[&safe])
    }

    /// The source does not evaluate the operation at all
    pub fn op_not_supported_by_service(operation: &str) -> Self {
        Self::new(OP_NOT_SUPPORTED_BY_SERVICE, &[operation])
    }
}
