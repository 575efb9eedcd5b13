use crate::expression::Expr;
use std::borrow::Cow;
use std::fmt::{Debug, Display};

/// The call shapes every operator of the grammar falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// One argument: `{ $name: arg }`.
    Identity,
    /// Positional arguments: `{ $name: [a1, ..., aN] }`.
    Variadic,
    /// One structured argument: `{ $name: { ...options } }`.
    Options,
    /// Identity with one argument, variadic otherwise. Used by operators that are
    /// both a unary accumulator and an N-ary expression (`$sum`, `$max`, ...).
    Flexible,
    /// No arguments: `{ $name: {} }`.
    Nullary,
}

/// Rewrites the argument list before the shape is applied.
pub type PreHook = fn(Vec<Expr>) -> Vec<Expr>;

/// Rewrites the built `{ $name: payload }` record.
pub type PostHook = fn(Expr) -> Expr;

/// An operator keyword bound to a call shape.
///
/// Operators are plain values: build one with [`identity`], [`variadic`],
/// [`options`], [`flexible`] or [`nullary`] and apply it with [`Operator::call`].
/// The catalog functions (`add`, `size`, `sum`, ...) are thin wrappers over these.
///
/// ```rust,ignore
/// use quarry::operator::{identity, variadic};
///
/// let size = identity("size").call(vec!["$tags".into()]);   // { $size: "$tags" }
/// let add = variadic("add").call(vec![1.into(), 2.into()]); // { $add: [1, 2] }
/// ```
#[derive(Clone)]
pub struct Operator {
    keyword: Cow<'static, str>,
    shape: Shape,
    pre: Option<PreHook>,
    post: Option<PostHook>,
}

impl Operator {
    pub fn new(name: impl Into<Cow<'static, str>>, shape: Shape) -> Self {
        let name = name.into();
        let keyword = if name.starts_with('$') {
            name
        } else {
            Cow::Owned(format!("${}", name))
        };
        Operator {
            keyword,
            shape,
            pre: None,
            post: None,
        }
    }

    /// Attaches a hook run on the arguments before the shape is applied.
    pub fn with_pre(mut self, hook: PreHook) -> Self {
        self.pre = Some(hook);
        self
    }

    /// Attaches a hook run on the built operator record.
    pub fn with_post(mut self, hook: PostHook) -> Self {
        self.post = Some(hook);
        self
    }

    /// The `$`-prefixed keyword.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Applies the operator to its arguments.
    ///
    /// The result is an expression node; arguments are resolved later, together with
    /// the tree the node ends up in. Arity is not checked: an identity or options
    /// operator given several arguments forwards them as an array and the server
    /// reports the mistake.
    pub fn call(&self, args: Vec<Expr>) -> Expr {
        let args = match self.pre {
            Some(hook) => hook(args),
            None => args,
        };

        let payload = match self.shape {
            Shape::Identity | Shape::Options => single(args),
            Shape::Variadic => Expr::Array(args),
            Shape::Flexible if args.len() == 1 => single(args),
            Shape::Flexible => Expr::Array(args),
            Shape::Nullary => Expr::record(),
        };

        let built = Expr::record().with(self.keyword.clone().into_owned(), payload);
        let built = match self.post {
            Some(hook) => hook(built),
            None => built,
        };
        Expr::node(built)
    }

    /// Applies the operator to a single argument.
    pub fn call1(&self, arg: impl Into<Expr>) -> Expr {
        self.call(vec![arg.into()])
    }
}

fn single(mut args: Vec<Expr>) -> Expr {
    match args.len() {
        0 => Expr::default(),
        1 => args.remove(0),
        _ => Expr::Array(args),
    }
}

impl Debug for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operator")
            .field("keyword", &self.keyword)
            .field("shape", &self.shape)
            .field("pre", &self.pre.is_some())
            .field("post", &self.post.is_some())
            .finish()
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword)
    }
}

/// One argument: `{ $name: arg }`.
pub fn identity(name: impl Into<Cow<'static, str>>) -> Operator {
    Operator::new(name, Shape::Identity)
}

/// Positional arguments: `{ $name: [args...] }`.
pub fn variadic(name: impl Into<Cow<'static, str>>) -> Operator {
    Operator::new(name, Shape::Variadic)
}

/// One structured argument: `{ $name: options }`.
pub fn options(name: impl Into<Cow<'static, str>>) -> Operator {
    Operator::new(name, Shape::Options)
}

/// Identity for one argument, variadic for any other count.
pub fn flexible(name: impl Into<Cow<'static, str>>) -> Operator {
    Operator::new(name, Shape::Flexible)
}

/// No arguments: `{ $name: {} }`.
pub fn nullary(name: impl Into<Cow<'static, str>>) -> Operator {
    Operator::new(name, Shape::Nullary)
}
