use proc_macro::{TokenStream, TokenTree};

/// Splits a `TokenStream` into comma-separated arguments.
///
/// Each argument is returned as a `Vec<TokenTree>`. Only top-level commas
/// separate arguments: commas inside groups stay inside their group token.
pub(crate) fn split_args(input: TokenStream) -> Vec<Vec<TokenTree>> {
    let mut args = Vec::new();
    let mut current = Vec::new();

    for token in input {
        match &token {
            TokenTree::Punct(p) if p.as_char() == ',' => {
                if !current.is_empty() {
                    args.push(current);
                    current = Vec::new();
                }
            }
            _ => current.push(token),
        }
    }

    if !current.is_empty() {
        args.push(current);
    }

    args
}

/// Converts a slice of tokens into a Rust source string.
///
/// Token order is preserved. A space separates two consecutive words
/// (identifiers or literals) so they cannot merge, as in `x as u8`.
pub(crate) fn tokens_to_string(tokens: &[TokenTree]) -> String {
    let mut out = String::new();
    let mut prev_was_word = false;

    for t in tokens {
        let is_word = matches!(t, TokenTree::Ident(_) | TokenTree::Literal(_));

        if prev_was_word && is_word {
            out.push(' ');
        }

        out.push_str(&t.to_string());
        prev_was_word = is_word;
    }

    out
}

/// Returns `true` if the tokens at position `i` form a `->` arrow.
pub(crate) fn is_arrow(tokens: &[TokenTree], i: usize) -> bool {
    if i + 1 >= tokens.len() {
        return false;
    }

    matches!(
        (&tokens[i], &tokens[i + 1]),
        (TokenTree::Punct(p1), TokenTree::Punct(p2))
            if p1.as_char() == '-' && p2.as_char() == '>'
    )
}

/// Parses `key = value` pairs from an attribute's arguments.
///
/// Values keep their source form, so string literals keep their quotes.
/// Parts without `=` are returned with an empty value.
pub(crate) fn parse_attr_args(attr: &str) -> Vec<(String, String)> {
    attr.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
            None => (part.to_string(), String::new()),
        })
        .collect()
}

/// Extracts `T` from a return type written as `impl Coroutine<Output = T>`.
///
/// Returns `None` when the type has no `Output = ...` binding.
pub(crate) fn coroutine_output(ret: &str) -> Option<String> {
    let start = ret.find("Output")? + "Output".len();
    let rest = ret[start..].trim_start().strip_prefix('=')?;

    let mut depth = 0usize;
    let mut prev = ' ';

    for (i, c) in rest.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            // `->` in a function type is not a closing bracket.
            '>' if prev == '-' => {}
            '>' if depth == 0 => return non_empty(&rest[..i]),
            '>' => depth -= 1,
            ',' if depth == 0 => return non_empty(&rest[..i]),
            _ => {}
        }

        prev = c;
    }

    None
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_args_are_split_on_commas() {
        let args = parse_attr_args("worker_threads = 4, name = \"boot\"");

        assert_eq!(
            args,
            vec![
                ("worker_threads".to_string(), "4".to_string()),
                ("name".to_string(), "\"boot\"".to_string()),
            ]
        );
    }

    #[test]
    fn empty_attr_has_no_args() {
        assert!(parse_attr_args("").is_empty());
        assert!(parse_attr_args("  ").is_empty());
    }

    #[test]
    fn output_of_simple_coroutine() {
        let ret = "impl stepwise :: Coroutine < Output = u32 >";
        assert_eq!(coroutine_output(ret).as_deref(), Some("u32"));
    }

    #[test]
    fn output_with_nested_generics() {
        let ret = "impl Coroutine < Output = Vec < (String , u8) > >";
        assert_eq!(
            coroutine_output(ret).as_deref(),
            Some("Vec < (String , u8) >")
        );
    }

    #[test]
    fn output_followed_by_other_bounds() {
        let ret = "impl Coroutine < Output = String , > + Send";
        assert_eq!(coroutine_output(ret).as_deref(), Some("String"));
    }

    #[test]
    fn output_containing_function_type() {
        let ret = "impl Coroutine < Output = Arc < dyn Fn () -> u8 + Send + Sync > >";
        assert_eq!(
            coroutine_output(ret).as_deref(),
            Some("Arc < dyn Fn () -> u8 + Send + Sync >")
        );
    }

    #[test]
    fn concrete_type_has_no_output_binding() {
        assert_eq!(coroutine_output("Retry < Connect >"), None);
    }
}
