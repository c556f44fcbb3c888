mod utils;

use proc_macro::{Delimiter, Group, TokenStream, TokenTree};

/// Joins futures of possibly different types into a future of a tuple.
///
/// Every argument must evaluate to a `stepwise::Future<T>`. The result is a
/// `stepwise::Future<(T1, T2, ...)>` that fails as soon as one member does.
#[proc_macro]
pub fn join(input: TokenStream) -> TokenStream {
    let args = utils::split_args(input);
    let count = args.len();

    if count == 0 {
        return "::stepwise::Future::ready(())".parse().unwrap();
    }

    let mut output = String::new();
    output.push_str("{\n");

    for (i, expr_tokens) in args.iter().enumerate() {
        let idx = i + 1;
        let expr = utils::tokens_to_string(expr_tokens);
        output.push_str(&format!(
            "let __f{idx} = {expr};\n\
             let __slot{idx} = ::stepwise::join::Slot::of(&__f{idx});\n"
        ));
    }

    let members = (1..=count)
        .map(|i| format!("__f{i}.erase()"))
        .collect::<Vec<_>>()
        .join(", ");

    output.push_str(&format!(
        "::stepwise::join_all(::std::vec![{members}])\n"
    ));
    output.push_str("    .try_map(move |__values| {\n");
    output.push_str("        let mut __values = __values.into_iter();\n");
    output.push_str("        ::std::result::Result::Ok((\n");

    for i in 1..=count {
        output.push_str(&format!(
            "            __slot{i}.take(&mut __values)?,\n"
        ));
    }

    output.push_str("        ))\n");
    output.push_str("    })\n");
    output.push_str("}\n");

    match output.parse::<TokenStream>() {
        Ok(ts) => ts,
        Err(err) => compile_error(&format!("join macro error: {err}")),
    }
}

/// Turns a function returning a coroutine into one returning a started
/// `stepwise::Sequence`.
///
/// The function must declare its return type, either as
/// `impl Coroutine<Output = T>` or as a concrete coroutine type. The
/// sequence is named after the function unless `name = "..."` is given.
///
/// ```rust,ignore
/// #[stepwise::sequence]
/// fn greet() -> impl Coroutine<Output = String> {
///     let mut done = false;
///     move |input: Resume| { /* ... */ }
/// }
///
/// let sequence: Sequence<String> = greet();
/// ```
#[proc_macro_attribute]
pub fn sequence(attr: TokenStream, item: TokenStream) -> TokenStream {
    let tokens: Vec<TokenTree> = item.into_iter().collect();

    let mut name = None;
    for (key, value) in utils::parse_attr_args(&attr.to_string()) {
        match key.as_str() {
            "name" => name = Some(value),
            other => {
                return compile_error(&format!("unknown sequence argument `{other}`"));
            }
        }
    }

    let Some(fn_pos) = tokens
        .iter()
        .position(|t| matches!(t, TokenTree::Ident(id) if id.to_string() == "fn"))
    else {
        return compile_error("#[sequence] can only be applied to functions");
    };

    let fn_name = match tokens.get(fn_pos + 1) {
        Some(TokenTree::Ident(id)) => id.to_string(),
        _ => return compile_error("#[sequence] expects a named function"),
    };

    let Some(body_pos) = tokens
        .iter()
        .rposition(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace))
    else {
        return compile_error("#[sequence] expects a function body");
    };

    let Some(arrow) = (fn_pos..body_pos).find(|&i| utils::is_arrow(&tokens, i)) else {
        return compile_error("#[sequence] functions must declare the coroutine they return");
    };

    let ret_end = tokens[arrow + 2..body_pos]
        .iter()
        .position(|t| matches!(t, TokenTree::Ident(id) if id.to_string() == "where"))
        .map_or(body_pos, |offset| arrow + 2 + offset);

    let ret = utils::tokens_to_string(&tokens[arrow + 2..ret_end]);
    let output_type = utils::coroutine_output(&ret)
        .unwrap_or_else(|| format!("<{ret} as ::stepwise::Coroutine>::Output"));

    let body = match &tokens[body_pos] {
        TokenTree::Group(g) => g.stream().to_string(),
        _ => unreachable!(),
    };

    let name = name.unwrap_or_else(|| format!("\"{fn_name}\""));

    let new_block = format!(
        "{{
            let __coroutine = (move || {{ {body} }})();
            ::stepwise::SequenceBuilder::new()
                .name({name})
                .start(__coroutine)
        }}"
    );

    let mut output: Vec<TokenTree> = tokens[..arrow + 2].to_vec();
    output.extend(
        format!("::stepwise::Sequence<{output_type}>")
            .parse::<TokenStream>()
            .unwrap(),
    );
    output.extend(tokens[ret_end..body_pos].iter().cloned());
    output.push(TokenTree::Group(Group::new(
        Delimiter::Brace,
        new_block.parse().unwrap(),
    )));
    output.extend(tokens[body_pos + 1..].iter().cloned());

    output.into_iter().collect()
}

#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut tokens: Vec<TokenTree> = item.into_iter().collect();

    let builder = match runtime_builder(&attr.to_string()) {
        Ok(builder) => builder,
        Err(err) => return compile_error(&err),
    };

    let Some(pos) = tokens
        .iter()
        .rposition(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace))
    else {
        return TokenStream::new();
    };

    let block = match &tokens[pos] {
        TokenTree::Group(g) => g.stream().to_string(),
        _ => unreachable!(),
    };

    let new_block = format!(
        "{{
            let runtime = {builder}
                .expect(\"failed to build the stepwise runtime\");
            runtime.enter(move || {{
                {block}
            }})
        }}"
    );

    tokens[pos] = TokenTree::Group(Group::new(Delimiter::Brace, new_block.parse().unwrap()));

    tokens.into_iter().collect()
}

#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut tokens = item.into_iter().collect::<Vec<_>>();

    let builder = match runtime_builder(&attr.to_string()) {
        Ok(builder) => builder,
        Err(err) => return compile_error(&err),
    };

    let block_pos = tokens
        .iter()
        .rposition(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace));

    let Some(pos) = block_pos else {
        return TokenStream::new();
    };

    let block = match &tokens[pos] {
        TokenTree::Group(g) => g.stream().to_string(),
        _ => unreachable!(),
    };

    let new_block = format!(
        "{{
        let runtime = {builder}
            .expect(\"failed to build the stepwise runtime\");
        runtime.enter(move || {{ {block} }})
    }}"
    );

    tokens[pos] = TokenTree::Group(Group::new(Delimiter::Brace, new_block.parse().unwrap()));

    let test_attr: TokenStream = "#[test]".parse().unwrap();
    let mut result: Vec<TokenTree> = test_attr.into_iter().collect();
    result.extend(tokens);

    result.into_iter().collect()
}

/// Builds the `RuntimeBuilder` expression for `#[main]` and `#[test]`.
fn runtime_builder(attr: &str) -> Result<String, String> {
    let mut builder = String::from("::stepwise::RuntimeBuilder::new()");

    for (key, value) in utils::parse_attr_args(attr) {
        match key.as_str() {
            "worker_threads" => {
                let n = value
                    .parse::<usize>()
                    .map_err(|_| format!("invalid worker_threads value `{value}`"))?;
                builder.push_str(&format!(".worker_threads({n})"));
            }
            "thread_name" => builder.push_str(&format!(".thread_name({value})")),
            other => return Err(format!("unknown runtime argument `{other}`")),
        }
    }

    builder.push_str(".build()");
    Ok(builder)
}

fn compile_error(msg: &str) -> TokenStream {
    format!("compile_error!({msg:?});").parse().unwrap()
}
