use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"([A-Za-z0-9._%+-])[A-Za-z0-9._%+-]*@([A-Za-z0-9])[A-Za-z0-9.-]*(\.[A-Za-z]{2,})",
        )
        .expect("email pattern is valid")
    })
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\+?\d{1,2}[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}")
            .expect("phone pattern is valid")
    })
}

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Z][a-z]+ [A-Z][a-z]+\b").expect("name pattern is valid")
    })
}

/// Heuristic PII scrub applied to anything destined for a logging sink.
///
/// Emails keep the first character of the local part and of the domain plus
/// the top-level domain ("john.doe@acme.com" -> "j***@a***.com"); two
/// consecutive capitalized words become "[name]"; phone-shaped digit runs
/// become "[phone]". The transform is idempotent. Capitalization-based name
/// detection will both miss names and hit non-names ("New York"); it is a
/// best-effort layer, not a guaranteed scrubber.
#[derive(Clone, Copy, Debug)]
pub struct Redactor {
    enabled: bool,
}

impl Default for Redactor {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Redactor {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// A pass-through redactor. Raw text reaches the sinks; an explicit
    /// operational trade-off, not an error condition.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn redact(&self, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        let pass = email_re().replace_all(text, "${1}***@${2}***${3}");
        let pass = phone_re().replace_all(&pass, "[phone]");
        let pass = name_re().replace_all(&pass, "[name]");
        pass.into_owned()
    }

    /// Strings are redacted; any other JSON value passes through unchanged.
    pub fn redact_value(&self, value: &Value) -> Value {
        match value {
            Value::String(text) => Value::String(self.redact(text)),
            other => other.clone(),
        }
    }
}
