//! Procedural macros for the Promissa promise runtime.
//!
//! - `#[promissa::main]` turns an `async fn main` into a synchronous one
//!   that builds an event loop, runs the body as a routine and blocks on it.
//! - `#[promissa::test]` does the same for a test function and adds
//!   `#[test]`.
//!
//! Both accept `clock = real | virtual` and `microtask_budget = N`. The
//! function may take a single parameter whose type converts from a
//! `LoopHandle` (a `LoopHandle` or a `Scheduler`), bound to the loop that
//! runs the body. The return type is unrestricted: the body's output is
//! handed back through a slot, not through a promise, so it does not need
//! to be `Clone`. It must be a nameable type (no `impl Trait`).

mod utils;

use proc_macro::{Delimiter, Group, TokenStream, TokenTree};

/// Event loop settings read from the attribute arguments.
#[derive(Default)]
struct LoopConfig {
    clock: Option<&'static str>,
    microtask_budget: Option<usize>,
}

impl LoopConfig {
    fn parse(attr: TokenStream) -> Result<Self, String> {
        let mut config = Self::default();

        for arg in utils::split_args(attr) {
            let Some((key, value)) = utils::split_key_value(&arg) else {
                return Err(format!(
                    "expected `key = value`, found `{}`",
                    utils::tokens_to_string(&arg)
                ));
            };

            match key.as_str() {
                "clock" => {
                    config.clock = Some(match value.as_str() {
                        "real" => "Real",
                        "virtual" => "Virtual",
                        other => return Err(format!("unknown clock `{other}`, expected `real` or `virtual`")),
                    });
                }
                "microtask_budget" => {
                    let budget = value
                        .parse::<usize>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| format!("microtask_budget must be a positive integer, found `{value}`"))?;
                    config.microtask_budget = Some(budget);
                }
                other => return Err(format!("unknown argument `{other}`")),
            }
        }

        Ok(config)
    }

    fn builder(&self) -> String {
        let mut builder = String::from("::promissa::EventLoopBuilder::new()");

        if let Some(clock) = self.clock {
            builder.push_str(&format!(".clock(::promissa::ClockMode::{clock})"));
        }

        if let Some(n) = self.microtask_budget {
            builder.push_str(&format!(".microtask_budget({n})"));
        }

        builder.push_str(".build()");
        builder
    }
}

/// Rewrites an `async fn` so its body runs as a routine on a fresh event loop.
fn expand(attr: TokenStream, item: TokenStream) -> Result<TokenStream, String> {
    let config = LoopConfig::parse(attr)?;

    let mut tokens: Vec<TokenTree> = item.into_iter().collect();

    if let Some(async_pos) = tokens
        .iter()
        .position(|t| matches!(t, TokenTree::Ident(id) if id.to_string() == "async"))
    {
        tokens.remove(async_pos);
    }

    let body_pos = utils::body_position(&tokens).ok_or("expected a function body")?;

    let body = match &tokens[body_pos] {
        TokenTree::Group(g) => g.stream().to_string(),
        _ => return Err("expected a function body".into()),
    };

    let output = utils::return_type(&tokens, body_pos).unwrap_or_else(|| "()".to_string());

    let mut binding = String::new();

    if let Some(params_pos) = utils::params_position(&tokens) {
        let params = match &tokens[params_pos] {
            TokenTree::Group(g) => utils::split_args(g.stream()),
            _ => Vec::new(),
        };

        match params.as_slice() {
            [] => {}
            [param] => {
                let (pattern, ty) =
                    utils::split_param(param).ok_or("expected a parameter of the form `name: Type`")?;
                binding = format!("let {pattern}: {ty} = ::core::convert::From::from(__event_loop.handle());");
            }
            _ => return Err("the function may take at most one parameter".into()),
        }

        tokens[params_pos] = TokenTree::Group(Group::new(Delimiter::Parenthesis, TokenStream::new()));
    }

    let new_block = format!(
        "{{
            let __event_loop = {builder};
            {binding}
            let __output_slot = ::std::rc::Rc::new(::core::cell::RefCell::new(::core::option::Option::None));
            let __slot = ::std::rc::Rc::clone(&__output_slot);
            let __routine = ::promissa::spawn_async(__event_loop.scheduler(), async move {{
                fn __returning<F: ::core::future::Future<Output = {output}>>(body: F) -> F {{ body }}
                let __output = __returning(async move {{ {body} }}).await;
                *__slot.borrow_mut() = ::core::option::Option::Some(__output);
                ::core::result::Result::Ok::<(), ::core::convert::Infallible>(())
            }});
            match __event_loop.block_on(&__routine) {{
                ::core::result::Result::Ok(::core::result::Result::Ok(())) => {{}}
                ::core::result::Result::Ok(::core::result::Result::Err(__never)) => match __never {{}},
                ::core::result::Result::Err(__error) => ::core::panic!(\"{{}}\", __error),
            }}
            let __output = __output_slot.borrow_mut().take();
            match __output {{
                ::core::option::Option::Some(__output) => __output,
                ::core::option::Option::None => ::core::panic!(\"routine finished without output\"),
            }}
        }}",
        builder = config.builder(),
    );

    let block = new_block
        .parse::<TokenStream>()
        .map_err(|err| format!("failed to expand the function body: {err}"))?;

    tokens[body_pos] = TokenTree::Group(Group::new(Delimiter::Brace, block));

    Ok(tokens.into_iter().collect())
}

/// Runs an `async fn main` on a Promissa event loop.
///
/// # Examples
///
/// ```rust,ignore
/// #[promissa::main(clock = real)]
/// async fn main(handle: promissa::LoopHandle) {
///     promissa::time::sleep::<()>(&handle, Duration::from_millis(10)).await.ok();
/// }
/// ```
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item).unwrap_or_else(|message| utils::compile_error(&message))
}

/// Runs an `async fn` test on a fresh Promissa event loop.
///
/// The test fails if the body panics, or if the loop runs out of work
/// before the body completes.
///
/// # Examples
///
/// ```rust,ignore
/// #[promissa::test]
/// async fn doubles(scheduler: promissa::Scheduler) {
///     let v = promissa::Promise::<i32, ()>::resolve(&scheduler, 21).await;
///     assert_eq!(v, Ok(21));
/// }
/// ```
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let expanded = match expand(attr, item) {
        Ok(expanded) => expanded,
        Err(message) => return utils::compile_error(&message),
    };

    let test_attr: TokenStream = "#[test]".parse().unwrap_or_default();
    let mut result: Vec<TokenTree> = test_attr.into_iter().collect();
    result.extend(expanded);

    result.into_iter().collect()
}
