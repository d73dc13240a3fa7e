use classpeek_api::{CONSTRUCTOR_MARKER, STATIC_INITIALIZER_MARKER};
use std::borrow::Cow;
use std::collections::HashSet;

/// How a method body came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Declared,
    Synthetic,
    /// Compiler bridge that forwards to a declared method of the same name.
    Bridge,
}

const LAMBDA_PREFIX: &str = "lambda$";

/// Classifies a method from its flags and name. Lambda bodies count as
/// synthetic even when a compiler forgets the flag.
pub fn origin(name: &str, synthetic: bool, bridge: bool) -> Origin {
    if bridge {
        Origin::Bridge
    } else if synthetic || name.starts_with(LAMBDA_PREFIX) {
        Origin::Synthetic
    } else {
        Origin::Declared
    }
}

/// Name of the lexical construct a generated body implements.
///
/// `lambda$doSomething$0` and `lambda$doSomething$1` both map to
/// `doSomething`. Each `access$NNN` accessor reaches a different member,
/// so it is its own construct.
pub fn construct_key(name: &str, origin: Origin) -> Cow<'_, str> {
    if origin == Origin::Declared {
        return Cow::Borrowed(name);
    }
    if let Some(rest) = name.strip_prefix(LAMBDA_PREFIX) {
        let enclosing = match rest.rsplit_once('$') {
            Some((enclosing, n)) if n.chars().all(|c| c.is_ascii_digit()) => enclosing,
            _ => rest,
        };
        return match enclosing {
            "new" => Cow::Borrowed(CONSTRUCTOR_MARKER),
            "static" => Cow::Borrowed(STATIC_INITIALIZER_MARKER),
            other => Cow::Borrowed(other),
        };
    }
    Cow::Borrowed(name)
}

/// Picks the method bodies that survive collapsing, as indexes into
/// `methods` in declaration order.
///
/// Declared methods always survive. A generated body is absorbed when its
/// construct key names a declared method; otherwise the first body of each
/// construct is kept as its single representative.
pub fn collapse(methods: &[(&str, Origin)]) -> Vec<usize> {
    let declared: HashSet<&str> = methods
        .iter()
        .filter(|(_, origin)| *origin == Origin::Declared)
        .map(|(name, _)| *name)
        .collect();

    let mut represented: HashSet<Cow<'_, str>> = HashSet::new();
    let mut retained = Vec::with_capacity(methods.len());
    for (index, (name, origin)) in methods.iter().enumerate() {
        if *origin == Origin::Declared {
            retained.push(index);
            continue;
        }
        let key = construct_key(name, *origin);
        if declared.contains(key.as_ref()) {
            continue;
        }
        if represented.insert(key) {
            retained.push(index);
        }
    }
    retained
}
