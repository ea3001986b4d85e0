use crate::{
    ast::{Expr, Method, Parameter, Type},
    value::Value,
};

/// Composes a query operator chain over a data source.
///
/// Each operator wraps the chain built so far as the first argument of a
/// static call on [`Type::Queryable`], with its lambda argument quoted,
/// mirroring the shape a query provider receives.
///
/// # Examples
///
/// ```
/// use seqwire::{Expr, QueryBuilder, Type, BinaryOp, Value};
///
/// let person = Type::named("Person");
/// let query = QueryBuilder::from_source("people", person.clone())
///     .filter(|x| {
///         Expr::binary(
///             BinaryOp::GreaterThan,
///             Expr::member(x.clone(), "Age", person.clone(), Type::Int32),
///             Expr::constant(Value::Int32(5)),
///         )
///     })
///     .take(10)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    expr: Expr,
    element: Type,
    parameter: String,
}

impl QueryBuilder {
    /// Starts a chain at a constant data source whose elements are `element`.
    pub fn from_source(name: impl Into<String>, element: Type) -> Self {
        let source_type = Self::queryable_of(&element);
        QueryBuilder {
            expr: Expr::typed_constant(Value::Source(name.into()), source_type),
            element,
            parameter: "x".to_string(),
        }
    }

    /// Name given to the per-element parameter of subsequent lambdas.
    pub fn parameter_name(mut self, name: impl Into<String>) -> Self {
        self.parameter = name.into();
        self
    }

    pub fn filter(self, predicate: impl FnOnce(&Expr) -> Expr) -> Self {
        self.with_lambda("Where", predicate)
    }

    pub fn order_by(self, key: impl FnOnce(&Expr) -> Expr) -> Self {
        self.with_lambda("OrderBy", key)
    }

    pub fn order_by_descending(self, key: impl FnOnce(&Expr) -> Expr) -> Self {
        self.with_lambda("OrderByDescending", key)
    }

    pub fn then_by(self, key: impl FnOnce(&Expr) -> Expr) -> Self {
        self.with_lambda("ThenBy", key)
    }

    pub fn then_by_descending(self, key: impl FnOnce(&Expr) -> Expr) -> Self {
        self.with_lambda("ThenByDescending", key)
    }

    /// Projection; the element type becomes the selector's result type.
    pub fn select(self, selector: impl FnOnce(&Expr) -> Expr) -> Self {
        let parameter = self.element_parameter();
        let body = selector(&Expr::Parameter(parameter.clone()));
        let element = body.static_type();
        let lambda = Expr::quote(Expr::lambda(vec![parameter], body));
        let mut next = self.apply("Select", vec![lambda]);
        next.element = element.clone();
        if let Expr::MethodCall { method, .. } = &mut next.expr {
            method.return_type = Self::queryable_of(&element);
        }
        next
    }

    pub fn skip(self, count: i32) -> Self {
        self.apply("Skip", vec![Expr::constant(Value::Int32(count))])
    }

    pub fn take(self, count: i32) -> Self {
        self.apply("Take", vec![Expr::constant(Value::Int32(count))])
    }

    /// Appends an arbitrary operator call on the queryable provider.
    pub fn apply(mut self, operator: &str, extra_args: Vec<Expr>) -> Self {
        let method = Method::new(Type::Queryable, operator, Self::queryable_of(&self.element));
        let mut args = Vec::with_capacity(extra_args.len() + 1);
        args.push(self.expr);
        args.extend(extra_args);
        self.expr = Expr::static_call(method, args);
        self
    }

    pub fn build(self) -> Expr {
        self.expr
    }

    fn with_lambda(self, operator: &str, body: impl FnOnce(&Expr) -> Expr) -> Self {
        let parameter = self.element_parameter();
        let body = body(&Expr::Parameter(parameter.clone()));
        let lambda = Expr::quote(Expr::lambda(vec![parameter], body));
        self.apply(operator, vec![lambda])
    }

    fn element_parameter(&self) -> Parameter {
        Parameter {
            name: self.parameter.clone(),
            ty: self.element.clone(),
        }
    }

    fn queryable_of(element: &Type) -> Type {
        Type::named(format!("IQueryable<{}>", element.name()))
    }
}
