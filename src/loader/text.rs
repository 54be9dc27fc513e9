//! Line handling shared by the OBJ and MTL readers.

use anyhow::{anyhow, Context, Result};

/// Splits a line into its keyword and the trimmed rest. Blank lines and comments give `None`.
pub(super) fn directive(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(
        line.split_once(char::is_whitespace)
            .map(|(keyword, rest)| (keyword, rest.trim()))
            .unwrap_or((line, "")),
    )
}

/// Reads the next token as a number. `line` counts from 1.
pub(super) fn next_f32<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
    what: &str,
) -> Result<f32> {
    let token = tokens
        .next()
        .ok_or_else(|| anyhow!("Missing {} on line {}", what, line))?;
    token
        .parse::<f32>()
        .with_context(|| format!("Failed to parse {} '{}' on line {}", what, token, line))
}

/// Reads one number per entry of `names`.
pub(super) fn next_f32s<'a, const N: usize>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
    names: [&str; N],
) -> Result<[f32; N]> {
    let mut values = [0.0; N];
    for (value, name) in values.iter_mut().zip(names) {
        *value = next_f32(tokens, line, name)?;
    }
    Ok(values)
}
