use crate::render::placeholder::{placeholders, resolve};
use crate::report::Warning;
use crate::variables::VariableMap;

/// Text after placeholder substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub text: String,
    /// True iff `text` differs byte-for-byte from the input.
    pub changed: bool,
    pub warnings: Vec<Warning>,
}

/// Replace every placeholder in `text` with its resolved value.
pub fn rewrite(text: &str, variables: &VariableMap) -> Rewritten {
    let mut out = String::with_capacity(text.len());
    let mut warnings = Vec::new();
    let mut last = 0;

    for (range, placeholder) in placeholders(text) {
        out.push_str(&text[last..range.start]);
        let resolved = resolve(&placeholder, variables);
        out.push_str(&resolved.text);
        warnings.extend(resolved.warning);
        last = range.end;
    }
    out.push_str(&text[last..]);

    // Compare, don't count matches: unresolved placeholders resolve to themselves.
    let changed = out != text;

    Rewritten {
        text: out,
        changed,
        warnings,
    }
}
