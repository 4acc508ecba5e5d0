use proc_macro::{Delimiter, Spacing, TokenStream, TokenTree};

/// Splits a `TokenStream` into comma-separated arguments.
///
/// Each argument is returned as a `Vec<TokenTree>`.
/// Commas at the top level are used as separators; commas inside groups
/// stay inside their group token.
pub(crate) fn split_args(input: TokenStream) -> Vec<Vec<TokenTree>> {
    let mut args = Vec::new();
    let mut current = Vec::new();
    let mut angle_depth = 0usize;

    for token in input {
        match &token {
            TokenTree::Punct(p) if p.as_char() == ',' && angle_depth == 0 => {
                if !current.is_empty() {
                    args.push(current);
                    current = Vec::new();
                }
            }
            TokenTree::Punct(p) => {
                // Generic arguments are not groups, so `Rc<A, B>` needs tracking.
                match p.as_char() {
                    '<' => angle_depth += 1,
                    '>' if !is_arrow_tail(&current) => angle_depth = angle_depth.saturating_sub(1),
                    _ => {}
                }
                current.push(token);
            }
            _ => current.push(token),
        }
    }

    if !current.is_empty() {
        args.push(current);
    }

    args
}

/// Returns `true` if the last token is the `-` of a `->` arrow.
fn is_arrow_tail(tokens: &[TokenTree]) -> bool {
    matches!(
        tokens.last(),
        Some(TokenTree::Punct(p)) if p.as_char() == '-' && p.spacing() == Spacing::Joint
    )
}

/// Converts a slice of tokens into a Rust source string.
///
/// This function preserves token order and inserts spaces
/// between consecutive identifiers to avoid accidental
/// token merging (e.g. `foo bar` vs `foobar`).
pub(crate) fn tokens_to_string(tokens: &[TokenTree]) -> String {
    let mut out = String::new();
    let mut prev_was_ident = false;

    for t in tokens {
        let s = t.to_string();

        let needs_space = prev_was_ident && matches!(t, TokenTree::Ident(_));

        if needs_space {
            out.push(' ');
        }

        out.push_str(&s);
        prev_was_ident = matches!(t, TokenTree::Ident(_));
    }

    out
}

/// Splits a `key = value` argument into its key and value tokens.
pub(crate) fn split_key_value(arg: &[TokenTree]) -> Option<(String, String)> {
    match arg {
        [TokenTree::Ident(key), TokenTree::Punct(eq), value @ ..]
            if eq.as_char() == '=' && !value.is_empty() =>
        {
            Some((key.to_string(), tokens_to_string(value)))
        }
        _ => None,
    }
}

/// Splits a function parameter `pattern: Type` at its top-level colon.
///
/// Path separators (`::`) inside the type are left alone.
pub(crate) fn split_param(param: &[TokenTree]) -> Option<(String, String)> {
    let colon = param.iter().enumerate().position(|(i, t)| {
        let TokenTree::Punct(p) = t else {
            return false;
        };

        let prev_is_colon = i > 0
            && matches!(&param[i - 1], TokenTree::Punct(prev) if prev.as_char() == ':' && prev.spacing() == Spacing::Joint);

        p.as_char() == ':' && p.spacing() == Spacing::Alone && !prev_is_colon
    })?;

    let pattern = tokens_to_string(&param[..colon]);
    let ty = tokens_to_string(&param[colon + 1..]);

    (!pattern.is_empty() && !ty.is_empty()).then_some((pattern, ty))
}

/// Returns the position of the last brace-delimited group: the function body.
pub(crate) fn body_position(tokens: &[TokenTree]) -> Option<usize> {
    tokens
        .iter()
        .rposition(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace))
}

/// Returns the declared return type: the tokens between `->` and the body.
///
/// `where` clauses are not supported and end up in the returned string.
pub(crate) fn return_type(tokens: &[TokenTree], body_pos: usize) -> Option<String> {
    let arrow = tokens[..body_pos].windows(2).position(|pair| {
        matches!(
            pair,
            [TokenTree::Punct(dash), TokenTree::Punct(gt)]
                if dash.as_char() == '-' && dash.spacing() == Spacing::Joint && gt.as_char() == '>'
        )
    })?;

    let ty = tokens_to_string(&tokens[arrow + 2..body_pos]);
    (!ty.is_empty()).then_some(ty)
}

/// Returns the position of the parameter list, right after the function name.
pub(crate) fn params_position(tokens: &[TokenTree]) -> Option<usize> {
    let fn_pos = tokens
        .iter()
        .position(|t| matches!(t, TokenTree::Ident(id) if id.to_string() == "fn"))?;

    tokens
        .iter()
        .skip(fn_pos)
        .position(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Parenthesis))
        .map(|offset| fn_pos + offset)
}

/// Builds a `compile_error!` invocation carrying `message`.
pub(crate) fn compile_error(message: &str) -> TokenStream {
    format!("::core::compile_error!({message:?});")
        .parse()
        .unwrap_or_default()
}
